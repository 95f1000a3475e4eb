//! Pose-based activity classification.
//!
//! Evaluates a fixed-priority rule set over the normalized wrist, nose and
//! shoulder positions of a single subject. The rule order is a contract:
//! conditions overlap, and the first match wins.

use crate::constants::{DANCING_WRIST_MAX_SPREAD, READING_WRIST_NOSE_MAX_GAP};
use crate::detect::{PoseEstimator, PoseLandmark, PoseLandmarks};
use crate::Result;
use opencv::core::Mat;

/// Closed set of activities the classifier can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    /// Both hands held near the face, as when holding a book
    Reading,
    /// One arm raised toward the camera
    Waving,
    /// Both arms down, swinging close together
    Dancing,
    /// A hand raised above head height
    UsingPhone,
    /// Landmarks present but no rule matched
    Unidentified,
}

impl Activity {
    /// Label used in overlays and the summary report
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Reading => "Pessoa lendo",
            Activity::Waving => "Pessoa acenando para a câmera",
            Activity::Dancing => "Pessoa dançando",
            Activity::UsingPhone => "Pessoa mexendo no celular",
            Activity::Unidentified => "Atividade não identificada",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The matched activity, or `None` when no usable landmarks were found
    pub activity: Option<Activity>,
    /// Whether the frame counts toward the anomaly tally
    pub anomalous: bool,
}

impl Classification {
    fn anomaly() -> Self {
        Self {
            activity: None,
            anomalous: true,
        }
    }
}

/// Pose-activity classifier driving a pose estimator backend
pub struct ActivityClassifier {
    estimator: Box<dyn PoseEstimator>,
}

impl ActivityClassifier {
    /// Create a classifier over the given pose estimator
    pub fn new(estimator: Box<dyn PoseEstimator>) -> Self {
        Self { estimator }
    }

    /// Classify the activity of the subject in a frame.
    ///
    /// A frame with no legible pose, or with any of the required landmarks
    /// missing, classifies as anomalous with no activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the pose estimator fails outright.
    pub fn classify(&mut self, frame: &Mat) -> Result<Classification> {
        let Some(landmarks) = self.estimator.estimate(frame)? else {
            return Ok(Classification::anomaly());
        };

        Ok(classify_landmarks(&landmarks))
    }
}

/// Evaluate the activity rules over an extracted landmark set.
///
/// Pure with respect to the landmarks, so the rule table can be tested
/// without a pose backend. Normalized y grows downward: smaller y is higher
/// on screen.
pub fn classify_landmarks(landmarks: &PoseLandmarks) -> Classification {
    let required = (
        landmarks.get(PoseLandmark::LeftWrist),
        landmarks.get(PoseLandmark::RightWrist),
        landmarks.get(PoseLandmark::Nose),
        landmarks.get(PoseLandmark::LeftShoulder),
        landmarks.get(PoseLandmark::RightShoulder),
    );

    let (Some(left_wrist), Some(right_wrist), Some(nose), Some(left_shoulder), Some(right_shoulder)) = required
    else {
        return Classification::anomaly();
    };

    let left_hand_y = left_wrist.y;
    let right_hand_y = right_wrist.y;
    let head_y = nose.y;

    let activity = if (left_hand_y - head_y).abs() < READING_WRIST_NOSE_MAX_GAP
        && (right_hand_y - head_y).abs() < READING_WRIST_NOSE_MAX_GAP
    {
        Activity::Reading
    } else if left_hand_y < left_shoulder.y && right_hand_y > right_shoulder.y {
        Activity::Waving
    } else if left_hand_y > left_shoulder.y
        && right_hand_y > right_shoulder.y
        && (left_hand_y - right_hand_y).abs() < DANCING_WRIST_MAX_SPREAD
    {
        Activity::Dancing
    } else if left_hand_y < head_y || right_hand_y < head_y {
        Activity::UsingPhone
    } else {
        Activity::Unidentified
    };

    Classification {
        activity: Some(activity),
        anomalous: activity == Activity::Unidentified,
    }
}
