use crate::constants::{NUM_POSE_LANDMARKS, POSE_LANDMARK_STRIDE, POSE_PRESENCE_THRESHOLD};
use crate::detect::{NormalizedPoint, PoseEstimator, PoseLandmarks};
use crate::Result;
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Default pose model input side length
const DEFAULT_POSE_INPUT_SIZE: i32 = 256;

/// Body pose estimator using ONNX Runtime.
///
/// The model takes a square RGB crop of the whole frame and emits a flat
/// 33x5 landmark tensor (x, y, z, visibility, presence per point, with x and
/// y in input-pixel units) followed by a scalar pose-presence score. Frames
/// whose presence score falls below the threshold yield no landmarks.
pub struct OnnxPoseEstimator {
    session: Session,
    #[allow(dead_code)] // Reserved for future named tensor support
    input_name: String,
    input_size: i32,
    presence_threshold: f32,
}

impl OnnxPoseEstimator {
    /// Create a new pose estimator from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        log::info!(
            "Initializing pose estimator with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("pose_estimator")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_name = session
            .inputs
            .first()
            .ok_or_else(|| crate::error::Error::ModelError("Model has no inputs".to_string()))?
            .name
            .clone();

        Ok(Self {
            session,
            input_name,
            input_size: DEFAULT_POSE_INPUT_SIZE,
            presence_threshold: POSE_PRESENCE_THRESHOLD,
        })
    }

    /// Preprocess a frame for the pose model
    #[allow(clippy::cast_sign_loss)] // OpenCV dimensions are positive
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        // Normalize to [0, 1]
        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let size = self.input_size as usize;
        let channels = 3;
        let mut data = vec![0.0f32; size * size * channels];

        for row in 0..size {
            for col in 0..size {
                for ch in 0..channels {
                    let pixel = float_image.at_2d::<opencv::core::Vec3f>(row as i32, col as i32)?[ch];
                    data[(row * size + col) * channels + ch] = pixel;
                }
            }
        }

        let array = Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| crate::error::Error::ModelError(format!("Failed to create array: {e}")))?;

        Ok(array.permuted_axes([0, 3, 1, 2]))
    }

    /// Run the model, returning the landmark tensor and the presence score
    fn forward(&mut self, inputs: Array4<f32>) -> Result<(Vec<f32>, f32)> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        if outputs.len() < 2 {
            return Err(crate::error::Error::ModelOutputError(format!(
                "Pose model produced {} outputs, expected landmarks and presence",
                outputs.len()
            )));
        }

        let landmarks_output = outputs[0].try_extract::<f32>()?;
        let landmarks_view = landmarks_output.view();
        let landmarks = landmarks_view
            .as_slice()
            .ok_or_else(|| crate::error::Error::ModelOutputError("Failed to read landmark output".to_string()))?
            .to_vec();

        let presence_output = outputs[1].try_extract::<f32>()?;
        let presence_view = presence_output.view();
        let presence = presence_view
            .as_slice()
            .and_then(|s| s.first().copied())
            .ok_or_else(|| crate::error::Error::ModelOutputError("Failed to read presence output".to_string()))?;

        Ok((landmarks, presence))
    }

    /// Convert the raw landmark tensor to normalized points
    #[allow(clippy::cast_precision_loss)] // Precision loss acceptable for coordinates
    fn postprocess(&self, raw: &[f32]) -> PoseLandmarks {
        let n_points = (raw.len() / POSE_LANDMARK_STRIDE).min(NUM_POSE_LANDMARKS);
        let scale = self.input_size as f32;

        let points = (0..n_points)
            .map(|i| {
                let base = i * POSE_LANDMARK_STRIDE;
                NormalizedPoint {
                    x: raw[base] / scale,
                    y: raw[base + 1] / scale,
                    visibility: sigmoid(raw[base + 3]),
                }
            })
            .collect();

        PoseLandmarks::from_points(points)
    }
}

impl PoseEstimator for OnnxPoseEstimator {
    fn estimate(&mut self, frame: &Mat) -> Result<Option<PoseLandmarks>> {
        let inputs = self.preprocess(frame)?;
        let (raw, presence) = self.forward(inputs)?;

        if sigmoid(presence) < self.presence_threshold {
            return Ok(None);
        }

        Ok(Some(self.postprocess(&raw)))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
