//! Detector abstractions shared by the analysis pipeline.
//!
//! The face, pose and emotion models are consumed through the traits in this
//! module so the pipeline logic can be exercised with fixture-backed test
//! doubles. The ONNX Runtime backends live in the submodules.

/// ONNX face detector backend
pub mod face;

/// ONNX pose estimator backend
pub mod pose;

/// ONNX emotion classifier backend
pub mod emotion;

use crate::constants::NUM_POSE_LANDMARKS;
use crate::Result;
use opencv::core::{Mat, Rect};

/// A face bounding box in fractions of the frame dimensions,
/// independent of resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeBBox {
    /// Left edge as a fraction of frame width
    pub xmin: f32,
    /// Top edge as a fraction of frame height
    pub ymin: f32,
    /// Width as a fraction of frame width
    pub width: f32,
    /// Height as a fraction of frame height
    pub height: f32,
}

impl RelativeBBox {
    /// Convert to absolute pixel coordinates for a frame of the given size
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn to_pixels(&self, frame_width: i32, frame_height: i32) -> Rect {
        Rect::new(
            (self.xmin * frame_width as f32) as i32,
            (self.ymin * frame_height as f32) as i32,
            (self.width * frame_width as f32) as i32,
            (self.height * frame_height as f32) as i32,
        )
    }
}

/// One face detection result
#[derive(Debug, Clone)]
pub struct FaceCandidate {
    /// Relative bounding box of the detected face
    pub bbox: RelativeBBox,
    /// Confidence score of the detection
    pub score: f32,
}

/// Body landmark indices, following the 33-point MediaPipe layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    /// Index of this landmark in the model output
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single body point in normalized frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    /// Horizontal position in [0, 1]
    pub x: f32,
    /// Vertical position in [0, 1]; smaller values are higher on screen
    pub y: f32,
    /// Landmark visibility score
    pub visibility: f32,
}

/// Full-body landmark set for one frame
#[derive(Debug, Clone, Default)]
pub struct PoseLandmarks {
    points: Vec<NormalizedPoint>,
}

impl PoseLandmarks {
    /// Build a landmark set from raw points, in model index order
    pub fn from_points(points: Vec<NormalizedPoint>) -> Self {
        Self { points }
    }

    /// Look up a named landmark.
    ///
    /// Returns `None` when the model did not produce the point or its
    /// coordinates fall outside the normalized frame.
    pub fn get(&self, landmark: PoseLandmark) -> Option<NormalizedPoint> {
        let point = self.points.get(landmark.index()).copied()?;
        if (0.0..=1.0).contains(&point.x) && (0.0..=1.0).contains(&point.y) {
            Some(point)
        } else {
            None
        }
    }

    /// Number of points produced by the model
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set carries no points at all
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the set carries the full 33-point layout
    pub fn is_complete(&self) -> bool {
        self.points.len() == NUM_POSE_LANDMARKS
    }
}

/// Fixed emotion vocabulary, in the classifier's output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    /// All emotions, in classifier output order
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// Label used in overlays and the summary report
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one emotion classification over a face crop
#[derive(Debug, Clone)]
pub struct EmotionPrediction {
    /// The emotion with the highest confidence
    pub dominant: Emotion,
    /// Confidence of the dominant emotion, in [0, 1]
    pub confidence: f32,
    /// Full per-emotion confidence mapping, in vocabulary order
    pub scores: Vec<(Emotion, f32)>,
}

/// Face detection capability.
///
/// Implementations return only candidates at or above their configured
/// confidence threshold.
pub trait FaceDetector {
    /// Detect faces in a frame
    fn detect(&mut self, frame: &Mat) -> Result<Vec<FaceCandidate>>;
}

/// Body pose estimation capability.
///
/// `Ok(None)` means no legible pose was found in the frame.
pub trait PoseEstimator {
    /// Estimate body landmarks for a frame
    fn estimate(&mut self, frame: &Mat) -> Result<Option<PoseLandmarks>>;
}

/// Emotion classification capability over a cropped face region.
///
/// `Ok(None)` is the explicit no-detection outcome: the classifier could not
/// find a confident face inside the crop. Callers treat it as a missed
/// observation, not an error.
pub trait EmotionClassifier {
    /// Classify the dominant emotion of a face crop
    fn classify(&mut self, face: &Mat) -> Result<Option<EmotionPrediction>>;
}
