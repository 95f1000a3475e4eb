//! Stub-backed tests for the per-frame pipeline.
//!
//! The detector traits are implemented with fixture-returning stubs so the
//! annotator, the activity classifier and the aggregation logic can be
//! exercised without model files or video I/O.

use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::prelude::*;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use video_activity_analyzer::activity::{Activity, ActivityClassifier};
use video_activity_analyzer::aggregates::RunAggregates;
use video_activity_analyzer::annotate::FaceEmotionAnnotator;
use video_activity_analyzer::detect::{
    Emotion, EmotionClassifier, EmotionPrediction, FaceCandidate, FaceDetector, NormalizedPoint, PoseEstimator,
    PoseLandmark, PoseLandmarks, RelativeBBox,
};
use video_activity_analyzer::{Error, Result};

/// Face detector stub returning fixed candidates
struct StubFaceDetector {
    candidates: Vec<FaceCandidate>,
}

impl FaceDetector for StubFaceDetector {
    fn detect(&mut self, _frame: &Mat) -> Result<Vec<FaceCandidate>> {
        Ok(self.candidates.clone())
    }
}

/// Emotion classifier stub returning a fixed outcome and counting calls
struct StubEmotionClassifier {
    outcome: Result<Option<EmotionPrediction>>,
    calls: Rc<Cell<usize>>,
}

impl EmotionClassifier for StubEmotionClassifier {
    fn classify(&mut self, _face: &Mat) -> Result<Option<EmotionPrediction>> {
        self.calls.set(self.calls.get() + 1);
        match &self.outcome {
            Ok(prediction) => Ok(prediction.clone()),
            Err(_) => Err(Error::ModelError("stub failure".to_string())),
        }
    }
}

/// Pose estimator stub replaying a fixed per-frame sequence
struct StubPoseEstimator {
    outputs: VecDeque<Option<PoseLandmarks>>,
}

impl PoseEstimator for StubPoseEstimator {
    fn estimate(&mut self, _frame: &Mat) -> Result<Option<PoseLandmarks>> {
        Ok(self.outputs.pop_front().unwrap_or(None))
    }
}

fn test_frame() -> Mat {
    Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(0.0)).unwrap()
}

fn frame_bytes(frame: &Mat) -> Vec<u8> {
    frame.data_bytes().unwrap().to_vec()
}

fn candidate(xmin: f32, width: f32) -> FaceCandidate {
    FaceCandidate {
        bbox: RelativeBBox {
            xmin,
            ymin: 0.2,
            width,
            height: 0.3,
        },
        score: 0.9,
    }
}

fn prediction(dominant: Emotion, confidence: f32) -> EmotionPrediction {
    let scores = Emotion::ALL
        .iter()
        .map(|&emotion| (emotion, if emotion == dominant { confidence } else { 0.0 }))
        .collect();
    EmotionPrediction {
        dominant,
        confidence,
        scores,
    }
}

fn annotator(
    candidates: Vec<FaceCandidate>,
    outcome: Result<Option<EmotionPrediction>>,
) -> (FaceEmotionAnnotator, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let annotator = FaceEmotionAnnotator::new(
        Box::new(StubFaceDetector { candidates }),
        Box::new(StubEmotionClassifier {
            outcome,
            calls: Rc::clone(&calls),
        }),
    );
    (annotator, calls)
}

fn landmarks_with(
    left_wrist_y: f32,
    right_wrist_y: f32,
    nose_y: f32,
    left_shoulder_y: f32,
    right_shoulder_y: f32,
) -> PoseLandmarks {
    let mut points = vec![
        NormalizedPoint {
            x: 0.5,
            y: 0.5,
            visibility: 1.0,
        };
        33
    ];
    points[PoseLandmark::LeftWrist.index()].y = left_wrist_y;
    points[PoseLandmark::RightWrist.index()].y = right_wrist_y;
    points[PoseLandmark::Nose.index()].y = nose_y;
    points[PoseLandmark::LeftShoulder.index()].y = left_shoulder_y;
    points[PoseLandmark::RightShoulder.index()].y = right_shoulder_y;
    PoseLandmarks::from_points(points)
}

#[test]
fn no_face_leaves_frame_untouched() {
    let (mut annotator, calls) = annotator(Vec::new(), Ok(Some(prediction(Emotion::Happy, 0.95))));
    let mut frame = test_frame();
    let before = frame_bytes(&frame);

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert!(emotions.is_empty());
    assert_eq!(frame_bytes(&frame), before, "frame must be pixel-identical");
    assert_eq!(calls.get(), 0, "emotion classifier must not run");
}

#[test]
fn off_center_face_is_skipped_entirely() {
    // Left edge at 0.05 * 640 = 32, well outside the central band
    let (mut annotator, calls) = annotator(
        vec![candidate(0.05, 0.2)],
        Ok(Some(prediction(Emotion::Happy, 0.95))),
    );
    let mut frame = test_frame();
    let before = frame_bytes(&frame);

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert!(emotions.is_empty());
    assert_eq!(frame_bytes(&frame), before);
    assert_eq!(calls.get(), 0);
}

#[test]
fn face_touching_right_band_is_skipped() {
    // Right edge at (0.4 + 0.35) * 640 = 480 > 0.7 * 640
    let (mut annotator, calls) = annotator(
        vec![candidate(0.4, 0.35)],
        Ok(Some(prediction(Emotion::Happy, 0.95))),
    );
    let mut frame = test_frame();
    let before = frame_bytes(&frame);

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert!(emotions.is_empty());
    assert_eq!(frame_bytes(&frame), before);
    assert_eq!(calls.get(), 0);
}

#[test]
fn centered_face_records_confident_emotion() {
    // Band for a 640-wide frame is (192, 448); box spans 224..352
    let (mut annotator, calls) = annotator(
        vec![candidate(0.35, 0.2)],
        Ok(Some(prediction(Emotion::Happy, 0.92))),
    );
    let mut frame = test_frame();
    let before = frame_bytes(&frame);

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert_eq!(emotions, vec![Emotion::Happy]);
    assert_ne!(frame_bytes(&frame), before, "overlays must be drawn");
    assert_eq!(calls.get(), 1);
}

#[test]
fn low_confidence_emotion_is_discarded() {
    let (mut annotator, calls) = annotator(
        vec![candidate(0.35, 0.2)],
        Ok(Some(prediction(Emotion::Sad, 0.79))),
    );
    let mut frame = test_frame();
    let before = frame_bytes(&frame);

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert!(emotions.is_empty());
    // The bounding box is still drawn; only the label is withheld
    assert_ne!(frame_bytes(&frame), before);
    assert_eq!(calls.get(), 1);
}

#[test]
fn widest_face_wins_even_when_off_center() {
    // The wide face is off-center, the narrow face is centered. The widest
    // is the subject, so the frame is skipped.
    let (mut annotator, calls) = annotator(
        vec![candidate(0.35, 0.2), candidate(0.02, 0.4)],
        Ok(Some(prediction(Emotion::Happy, 0.95))),
    );
    let mut frame = test_frame();
    let before = frame_bytes(&frame);

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert!(emotions.is_empty());
    assert_eq!(frame_bytes(&frame), before);
    assert_eq!(calls.get(), 0);
}

#[test]
fn widest_centered_face_is_annotated_over_narrower_ones() {
    let (mut annotator, _calls) = annotator(
        vec![candidate(0.05, 0.1), candidate(0.35, 0.2)],
        Ok(Some(prediction(Emotion::Surprise, 0.9))),
    );
    let mut frame = test_frame();

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert_eq!(emotions, vec![Emotion::Surprise]);
}

#[test]
fn classifier_no_detection_contributes_no_emotion() {
    let (mut annotator, calls) = annotator(vec![candidate(0.35, 0.2)], Ok(None));
    let mut frame = test_frame();

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert!(emotions.is_empty());
    assert_eq!(calls.get(), 1);
}

#[test]
fn classifier_failure_is_absorbed() {
    let (mut annotator, calls) = annotator(
        vec![candidate(0.35, 0.2)],
        Err(Error::ModelError("stub failure".to_string())),
    );
    let mut frame = test_frame();

    let emotions = annotator.annotate(&mut frame).unwrap();

    assert!(emotions.is_empty(), "a classifier failure is a missed observation");
    assert_eq!(calls.get(), 1);
}

#[test]
fn no_landmarks_classifies_as_anomalous() {
    let mut classifier = ActivityClassifier::new(Box::new(StubPoseEstimator {
        outputs: VecDeque::from([None]),
    }));
    let frame = test_frame();

    let result = classifier.classify(&frame).unwrap();

    assert_eq!(result.activity, None);
    assert!(result.anomalous);
}

#[test]
fn reading_scenario_from_landmarks() {
    let landmarks = landmarks_with(0.50, 0.52, 0.50, 0.40, 0.40);
    let mut classifier = ActivityClassifier::new(Box::new(StubPoseEstimator {
        outputs: VecDeque::from([Some(landmarks)]),
    }));
    let frame = test_frame();

    let result = classifier.classify(&frame).unwrap();

    assert_eq!(result.activity, Some(Activity::Reading));
    assert!(!result.anomalous);
}

#[test]
fn aggregates_track_a_whole_run() {
    // Frame sequence: no pose, reading, reading, waving, unidentified
    let per_frame = VecDeque::from([
        None,
        Some(landmarks_with(0.50, 0.52, 0.50, 0.40, 0.40)),
        Some(landmarks_with(0.50, 0.52, 0.50, 0.40, 0.40)),
        Some(landmarks_with(0.20, 0.70, 0.25, 0.40, 0.40)),
        Some(landmarks_with(0.45, 0.95, 0.20, 0.40, 0.40)),
    ]);
    let frame_count = per_frame.len();
    let mut classifier = ActivityClassifier::new(Box::new(StubPoseEstimator { outputs: per_frame }));

    let frame = test_frame();
    let mut aggregates = RunAggregates::new();
    let mut first_occurrences = 0;
    for _ in 0..frame_count {
        let result = classifier.classify(&frame).unwrap();
        if let Some(activity) = result.activity {
            if aggregates.record_activity(activity) {
                first_occurrences += 1;
            }
        }
        if result.anomalous {
            aggregates.record_anomaly();
        }
        aggregates.record_frame();
    }

    // Reading is recorded once despite appearing twice
    assert_eq!(
        aggregates.activities(),
        &[Activity::Reading, Activity::Waving, Activity::Unidentified]
    );
    assert_eq!(first_occurrences, 3);
    // One no-pose frame plus one unidentified frame
    assert_eq!(aggregates.anomaly_count(), 2);
    assert_eq!(aggregates.total_frames(), frame_count as u64);
}
