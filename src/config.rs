//! Configuration management for the video analyzer

use crate::constants::{
    DEFAULT_FRAME_SKIP_INTERVAL, EMOTION_CONFIDENCE_THRESHOLD, FACE_CONFIDENCE_THRESHOLD, FACE_NMS_THRESHOLD,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model file paths
    pub models: ModelConfig,

    /// Detection thresholds
    pub detection: DetectionConfig,

    /// Output artifact paths
    pub output: OutputConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the face detection ONNX model
    pub face_detector: PathBuf,

    /// Path to the pose estimation ONNX model
    pub pose_estimator: PathBuf,

    /// Path to the emotion classification ONNX model
    pub emotion_classifier: PathBuf,
}

/// Detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Confidence threshold for face detection (0.0-1.0)
    pub face_confidence_threshold: f32,

    /// IOU threshold for face non-maximum suppression (0.0-1.0)
    pub face_nms_threshold: f32,

    /// Confidence threshold for accepting a dominant emotion (0.0-1.0)
    pub emotion_confidence_threshold: f32,

    /// Require a confident face inside the crop before classifying emotion
    pub require_face_in_crop: bool,

    /// Sampling interval, in frames. Consulted by the driver loop but
    /// skipping is disabled: every frame is fully analyzed.
    pub frame_skip_interval: u64,
}

/// Output artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the annotated output video
    pub video: PathBuf,

    /// Path of the text summary report
    pub summary: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelConfig::default(),
            detection: DetectionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_detector: PathBuf::from("assets/face_detector.onnx"),
            pose_estimator: PathBuf::from("assets/pose_estimator.onnx"),
            emotion_classifier: PathBuf::from("assets/emotion_classifier.onnx"),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            face_confidence_threshold: FACE_CONFIDENCE_THRESHOLD,
            face_nms_threshold: FACE_NMS_THRESHOLD,
            emotion_confidence_threshold: EMOTION_CONFIDENCE_THRESHOLD,
            require_face_in_crop: true,
            frame_skip_interval: DEFAULT_FRAME_SKIP_INTERVAL,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            video: PathBuf::from("annotated.mp4"),
            summary: PathBuf::from("video_summary.txt"),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or written.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.face_confidence_threshold) {
            return Err(Error::ConfigError(
                "Face confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.face_nms_threshold) {
            return Err(Error::ConfigError(
                "Face NMS threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.emotion_confidence_threshold) {
            return Err(Error::ConfigError(
                "Emotion confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detection.frame_skip_interval == 0 {
            return Err(Error::ConfigError(
                "Frame skip interval must be greater than 0".to_string(),
            ));
        }

        if !self.models.face_detector.exists() {
            return Err(Error::ConfigError(format!(
                "Face detector model not found: {}",
                self.models.face_detector.display()
            )));
        }
        if !self.models.pose_estimator.exists() {
            return Err(Error::ConfigError(format!(
                "Pose estimator model not found: {}",
                self.models.pose_estimator.display()
            )));
        }
        if !self.models.emotion_classifier.exists() {
            return Err(Error::ConfigError(format!(
                "Emotion classifier model not found: {}",
                self.models.emotion_classifier.display()
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Video activity analyzer configuration

# Model paths
models:
  face_detector: "assets/face_detector.onnx"
  pose_estimator: "assets/pose_estimator.onnx"
  emotion_classifier: "assets/emotion_classifier.onnx"

# Detection parameters
detection:
  face_confidence_threshold: 0.7
  face_nms_threshold: 0.4
  emotion_confidence_threshold: 0.8
  require_face_in_crop: true
  frame_skip_interval: 10

# Output artifacts
output:
  video: "annotated.mp4"
  summary: "video_summary.txt"
"#;
