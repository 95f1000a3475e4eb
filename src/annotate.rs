//! Face selection and emotion annotation.
//!
//! Picks the single widest detected face, accepts it only when it sits in
//! the central band of the frame, and burns a bounding box plus the
//! dominant-emotion label into the frame. The pipeline models exactly one
//! subject per frame; background faces and faces near the frame edges are
//! ignored.

use crate::constants::{
    BOX_THICKNESS, CENTER_BAND_LEFT, CENTER_BAND_RIGHT, EMOTION_CONFIDENCE_THRESHOLD, EMOTION_TEXT_SCALE,
    EMOTION_TEXT_Y_OFFSET,
};
use crate::detect::{Emotion, EmotionClassifier, FaceDetector};
use crate::Result;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8};
use opencv::prelude::*;

/// Face-emotion annotator driving a face detector and an emotion classifier
pub struct FaceEmotionAnnotator {
    detector: Box<dyn FaceDetector>,
    classifier: Box<dyn EmotionClassifier>,
}

impl FaceEmotionAnnotator {
    /// Create an annotator over the given backends
    pub fn new(detector: Box<dyn FaceDetector>, classifier: Box<dyn EmotionClassifier>) -> Self {
        Self { detector, classifier }
    }

    /// Annotate the dominant centered face and collect its accepted emotion.
    ///
    /// Mutates the frame in place with the overlays. Frames with no face, or
    /// whose widest face is off-center, are left untouched. A classifier
    /// failure contributes no emotion; it is a missed observation, not a
    /// fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if the face detector fails or an overlay cannot be
    /// drawn.
    pub fn annotate(&mut self, frame: &mut Mat) -> Result<Vec<Emotion>> {
        let mut candidates = self.detector.detect(frame)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // Keep only the widest face as the subject
        candidates.sort_by(|a, b| {
            b.bbox
                .width
                .partial_cmp(&a.bbox.width)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let subject = &candidates[0];

        let frame_width = frame.cols();
        let frame_height = frame.rows();
        let bbox = subject.bbox.to_pixels(frame_width, frame_height);

        if !is_centered(bbox, frame_width) {
            return Ok(Vec::new());
        }

        imgproc::rectangle(
            frame,
            bbox,
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            BOX_THICKNESS,
            LINE_8,
            0,
        )?;

        // The crop is taken from the already-annotated frame
        let crop_rect = clamp_to_frame(bbox, frame_width, frame_height);
        if crop_rect.width <= 0 || crop_rect.height <= 0 {
            return Ok(Vec::new());
        }
        let face = Mat::roi(frame, crop_rect)?.try_clone()?;

        let mut emotions = Vec::new();
        match self.classifier.classify(&face) {
            Ok(Some(prediction)) if prediction.confidence > EMOTION_CONFIDENCE_THRESHOLD => {
                emotions.push(prediction.dominant);
                imgproc::put_text(
                    frame,
                    prediction.dominant.as_str(),
                    Point::new(bbox.x, bbox.y - EMOTION_TEXT_Y_OFFSET),
                    FONT_HERSHEY_SIMPLEX,
                    EMOTION_TEXT_SCALE,
                    Scalar::new(255.0, 0.0, 0.0, 0.0),
                    BOX_THICKNESS,
                    LINE_8,
                    false,
                )?;
            }
            Ok(Some(prediction)) => {
                log::debug!(
                    "Discarding low-confidence emotion {} ({:.2})",
                    prediction.dominant,
                    prediction.confidence
                );
            }
            Ok(None) => {
                log::debug!("No confident face in crop, skipping emotion");
            }
            Err(e) => {
                log::debug!("Emotion classification failed: {e}");
            }
        }

        Ok(emotions)
    }
}

/// Whether a face box sits fully inside the central horizontal band
fn is_centered(bbox: Rect, frame_width: i32) -> bool {
    let left = bbox.x as f32;
    let right = (bbox.x + bbox.width) as f32;
    let width = frame_width as f32;
    left > width * CENTER_BAND_LEFT && right < width * CENTER_BAND_RIGHT
}

/// Intersect a box with the frame so the crop stays in bounds
fn clamp_to_frame(bbox: Rect, frame_width: i32, frame_height: i32) -> Rect {
    let x = bbox.x.max(0);
    let y = bbox.y.max(0);
    let width = ((bbox.x + bbox.width).min(frame_width) - x).max(0);
    let height = ((bbox.y + bbox.height).min(frame_height) - y).max(0);
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_face_accepted() {
        // 640-wide frame: band is (192, 448)
        assert!(is_centered(Rect::new(200, 50, 200, 200), 640));
    }

    #[test]
    fn test_left_edge_face_rejected() {
        assert!(!is_centered(Rect::new(100, 50, 200, 200), 640));
    }

    #[test]
    fn test_right_edge_face_rejected() {
        // Right edge at 460 > 448
        assert!(!is_centered(Rect::new(260, 50, 200, 200), 640));
    }

    #[test]
    fn test_band_boundaries_are_exclusive() {
        // left == 0.3w and right == 0.7w must both be rejected
        assert!(!is_centered(Rect::new(192, 0, 100, 100), 640));
        assert!(!is_centered(Rect::new(248, 0, 200, 100), 640));
    }

    #[test]
    fn test_clamp_to_frame() {
        let clamped = clamp_to_frame(Rect::new(-10, -5, 100, 50), 640, 480);
        assert_eq!(clamped, Rect::new(0, 0, 90, 45));

        let clamped = clamp_to_frame(Rect::new(600, 400, 100, 100), 640, 480);
        assert_eq!(clamped, Rect::new(600, 400, 40, 80));
    }
}
