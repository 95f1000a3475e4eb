//! Frame pipeline driver.
//!
//! Owns the video capture and writer, iterates frames strictly
//! sequentially, and feeds the per-frame results into the run aggregates.
//! Per-frame detector failures are absorbed here; only the initial open of
//! the input video is fatal.

use crate::{
    activity::{Activity, ActivityClassifier, Classification},
    aggregates::RunAggregates,
    annotate::FaceEmotionAnnotator,
    config::Config,
    constants::{ACTIVITY_TEXT_ORIGIN, ACTIVITY_TEXT_SCALE, BOX_THICKNESS},
    detect::{emotion::OnnxEmotionClassifier, face::OnnxFaceDetector, pose::OnnxPoseEstimator},
    error::{Error, Result},
    summary,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use opencv::{
    core::{Mat, Point, Scalar, Size},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use std::path::Path;

/// Offline video analyzer
pub struct VideoAnalyzer {
    config: Config,
    capture: VideoCapture,
    writer: VideoWriter,
    annotator: FaceEmotionAnnotator,
    classifier: ActivityClassifier,
    total_frames: u64,
}

impl VideoAnalyzer {
    /// Open the input video and set up the pipeline.
    ///
    /// The input is opened before anything else: an unreadable video aborts
    /// the run before any output artifact is produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the input video cannot be opened, the output
    /// writer cannot be created, or a model fails to load.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(config: Config, input: &Path) -> Result<Self> {
        info!("Opening video file: {}", input.display());
        let input_str = input
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("Non-UTF-8 input path: {}", input.display())))?;
        let capture = VideoCapture::from_file(input_str, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::VideoError(format!(
                "Failed to open video file: {}",
                input.display()
            )));
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let total_frames = capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64;
        info!("Input: {width}x{height} at {fps:.2} fps, {total_frames} frames");

        let output_str = config
            .output
            .video
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("Non-UTF-8 output path: {}", config.output.video.display())))?;
        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let writer = VideoWriter::new(output_str, fourcc, fps, Size::new(width, height), true)?;
        if !writer.is_opened()? {
            return Err(Error::VideoError(format!(
                "Failed to create output video: {}",
                config.output.video.display()
            )));
        }

        let face_detector = OnnxFaceDetector::new(
            &config.models.face_detector,
            config.detection.face_confidence_threshold,
            config.detection.face_nms_threshold,
        )?;
        let emotion_classifier =
            OnnxEmotionClassifier::new(&config.models.emotion_classifier, config.detection.require_face_in_crop)?;
        let pose_estimator = OnnxPoseEstimator::new(&config.models.pose_estimator)?;

        let annotator = FaceEmotionAnnotator::new(Box::new(face_detector), Box::new(emotion_classifier));
        let classifier = ActivityClassifier::new(Box::new(pose_estimator));

        Ok(Self {
            config,
            capture,
            writer,
            annotator,
            classifier,
            total_frames,
        })
    }

    /// Run the analysis loop over the whole video.
    ///
    /// Returns the run aggregates after the summary file has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if a frame cannot be read or written, or the
    /// summary file cannot be created. Per-frame detection failures are
    /// absorbed and logged.
    pub fn run(&mut self) -> Result<RunAggregates> {
        info!("Starting analysis loop");
        let mut aggregates = RunAggregates::new();
        let progress = ProgressBar::new(self.total_frames)
            .with_style(ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len}"));
        progress.set_message("Processando vídeo");

        let mut frame = Mat::default();
        let mut current_frame: u64 = 0;
        loop {
            if !self.capture.read(&mut frame)? || frame.empty() {
                break;
            }

            if current_frame % self.config.detection.frame_skip_interval != 0 {
                // Skipping is disabled: off-interval frames are analyzed like any other
                log::trace!("Frame {current_frame} is off the sampling interval");
            }

            self.process_frame(&mut frame, current_frame, &mut aggregates);

            self.writer.write(&frame)?;
            aggregates.record_frame();
            progress.inc(1);
            current_frame += 1;
        }
        progress.finish();

        self.capture.release()?;
        self.writer.release()?;

        summary::write_summary(&self.config.output.summary, &aggregates)?;
        info!("Annotated video written to {}", self.config.output.video.display());
        info!("Summary written to {}", self.config.output.summary.display());

        Ok(aggregates)
    }

    /// Analyze one frame and fold the results into the aggregates.
    ///
    /// The face/emotion pass completes before the pose pass begins.
    fn process_frame(&mut self, frame: &mut Mat, current_frame: u64, aggregates: &mut RunAggregates) {
        let emotions = match self.annotator.annotate(frame) {
            Ok(emotions) => emotions,
            Err(e) => {
                debug!("Face/emotion step failed on frame {current_frame}: {e}");
                Vec::new()
            }
        };
        if !emotions.is_empty() {
            aggregates.record_emotions(&emotions);
        }

        let classification = match self.classifier.classify(frame) {
            Ok(classification) => classification,
            Err(e) => {
                debug!("Activity step failed on frame {current_frame}: {e}");
                Classification {
                    activity: None,
                    anomalous: true,
                }
            }
        };

        if let Some(activity) = classification.activity {
            // The label overlay is drawn only on the frame where the
            // activity is first observed
            if aggregates.record_activity(activity) {
                if let Err(e) = draw_activity_label(frame, activity) {
                    debug!("Failed to draw activity label on frame {current_frame}: {e}");
                }
            }
        }
        if classification.anomalous {
            aggregates.record_anomaly();
        }
    }
}

/// Burn the first-occurrence activity label into a frame
fn draw_activity_label(frame: &mut Mat, activity: Activity) -> Result<()> {
    let (x, y) = ACTIVITY_TEXT_ORIGIN;
    imgproc::put_text(
        frame,
        &format!("Atividade: {activity}"),
        Point::new(x, y),
        FONT_HERSHEY_SIMPLEX,
        ACTIVITY_TEXT_SCALE,
        Scalar::new(255.0, 0.0, 255.0, 0.0),
        BOX_THICKNESS,
        LINE_8,
        false,
    )?;
    Ok(())
}
