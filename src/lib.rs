//! Offline video activity and emotion analysis library.
//!
//! This library processes a video file frame by frame:
//! - Face detection locates the dominant centered face and an emotion
//!   classifier labels it
//! - Pose estimation extracts body landmarks and a fixed-priority rule set
//!   classifies the subject's activity
//! - Each frame is annotated in place and written to an output video
//! - A text report summarizes activities, emotions and anomalies for the
//!   whole run
//!
//! The face, pose and emotion models are ONNX networks consumed through the
//! traits in [`detect`], so the pipeline logic can also run against test
//! doubles.
//!
//! # Examples
//!
//! ## Analyzing a video file
//!
//! ```no_run
//! use std::path::Path;
//! use video_activity_analyzer::{app::VideoAnalyzer, config::Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut analyzer = VideoAnalyzer::new(config, Path::new("input.mp4"))?;
//!
//! let aggregates = analyzer.run()?;
//! println!(
//!     "Analyzed {} frames, {} anomalies",
//!     aggregates.total_frames(),
//!     aggregates.anomaly_count()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Classifying a landmark set directly
//!
//! ```
//! use video_activity_analyzer::activity::classify_landmarks;
//! use video_activity_analyzer::detect::{NormalizedPoint, PoseLandmarks};
//!
//! // Both wrists at nose height: the subject is reading
//! let points = vec![
//!     NormalizedPoint {
//!         x: 0.5,
//!         y: 0.5,
//!         visibility: 1.0,
//!     };
//!     33
//! ];
//! let landmarks = PoseLandmarks::from_points(points);
//!
//! let result = classify_landmarks(&landmarks);
//! assert!(result.activity.is_some());
//! assert!(!result.anomalous);
//! ```

/// Detector traits, detection data types and the ONNX backends
pub mod detect;

/// Face selection and emotion annotation
pub mod annotate;

/// Pose-based activity classification
pub mod activity;

/// Run-wide accumulators
pub mod aggregates;

/// Aggregate counting and the final text report
pub mod summary;

/// Frame pipeline driver
pub mod app;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
