use crate::constants::{IMAGE_NORMALIZATION_OFFSET, IMAGE_NORMALIZATION_SCALE};
use crate::detect::{FaceCandidate, FaceDetector, RelativeBBox};
use crate::Result;
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Default detector input size when the model does not declare one
const DEFAULT_INPUT_SIZE: (i32, i32) = (320, 240);

/// Face detector using ONNX Runtime.
///
/// The model is expected to emit two outputs: per-candidate confidence
/// scores and already-decoded corner boxes normalized to [0, 1]. Candidates
/// below the confidence threshold are discarded and the survivors are
/// de-duplicated with non-maximum suppression.
pub struct OnnxFaceDetector {
    session: Session,
    #[allow(dead_code)] // Reserved for future named tensor support
    input_name: String,
    input_size: (i32, i32),
    conf_threshold: f32,
    nms_threshold: f32,
}

impl OnnxFaceDetector {
    /// Create a new face detector from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model file cannot be loaded or the ONNX
    /// runtime environment cannot be created.
    pub fn new<P: AsRef<Path>>(model_path: P, conf_threshold: f32, nms_threshold: f32) -> Result<Self> {
        log::info!(
            "Initializing face detector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("face_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_meta = session
            .inputs
            .first()
            .ok_or_else(|| crate::error::Error::ModelError("Model has no inputs".to_string()))?;

        let input_name = input_meta.name.clone();
        let input_shape = &input_meta.dimensions;

        // Extract input size from shape [batch, channels, height, width]
        let input_size = if input_shape.len() >= 4 {
            let height = input_shape[2].unwrap_or(240) as i32;
            let width = input_shape[3].unwrap_or(320) as i32;
            (width, height)
        } else {
            DEFAULT_INPUT_SIZE
        };

        Ok(Self {
            session,
            input_name,
            input_size,
            conf_threshold,
            nms_threshold,
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<FaceCandidate>> {
        let inputs = self.preprocess(frame)?;
        let (scores, boxes) = self.forward(inputs)?;
        Ok(self.postprocess(&scores, &boxes))
    }
}

impl OnnxFaceDetector {
    /// Preprocess a frame for the detector input
    #[allow(clippy::cast_sign_loss)] // OpenCV dimensions are positive
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let (input_width, input_height) = self.input_size;

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(input_width, input_height),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        // Convert BGR to RGB and normalize around the channel midpoint
        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0, 0.0)?;

        let height = input_height as usize;
        let width = input_width as usize;
        let channels = 3;
        let mut data = vec![0.0f32; height * width * channels];

        for row in 0..height {
            for col in 0..width {
                for ch in 0..channels {
                    let pixel = float_image.at_2d::<opencv::core::Vec3f>(row as i32, col as i32)?[ch];
                    let idx = (row * width + col) * channels + ch;
                    data[idx] = (pixel - IMAGE_NORMALIZATION_OFFSET) / IMAGE_NORMALIZATION_SCALE;
                }
            }
        }

        let array = Array4::from_shape_vec((1, height, width, channels), data)
            .map_err(|e| crate::error::Error::ModelError(format!("Failed to create array: {e}")))?;

        // Transpose from NHWC to NCHW
        Ok(array.permuted_axes([0, 3, 1, 2]))
    }

    /// Run the model and extract the raw score and box tensors
    fn forward(&mut self, inputs: Array4<f32>) -> Result<(Vec<f32>, Vec<f32>)> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        if outputs.len() < 2 {
            return Err(crate::error::Error::ModelOutputError(format!(
                "Face model produced {} outputs, expected scores and boxes",
                outputs.len()
            )));
        }

        let scores_output = outputs[0].try_extract::<f32>()?;
        let scores_view = scores_output.view();
        let scores = scores_view
            .as_slice()
            .ok_or_else(|| crate::error::Error::ModelOutputError("Failed to read score output".to_string()))?
            .to_vec();

        let boxes_output = outputs[1].try_extract::<f32>()?;
        let boxes_view = boxes_output.view();
        let boxes = boxes_view
            .as_slice()
            .ok_or_else(|| crate::error::Error::ModelOutputError("Failed to read box output".to_string()))?
            .to_vec();

        Ok((scores, boxes))
    }

    /// Turn raw tensors into thresholded, suppressed face candidates
    fn postprocess(&self, scores: &[f32], boxes: &[f32]) -> Vec<FaceCandidate> {
        let n_boxes = boxes.len() / 4;
        let n_candidates = scores.len().min(n_boxes);

        // Filter by threshold and sort by score descending
        let mut order: Vec<usize> = (0..n_candidates)
            .filter(|&i| scores[i] >= self.conf_threshold)
            .collect();
        order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal));

        let corners = |i: usize| -> [f32; 4] {
            [boxes[i * 4], boxes[i * 4 + 1], boxes[i * 4 + 2], boxes[i * 4 + 3]]
        };

        let keep = self.nms(&order, &corners);

        keep.into_iter()
            .map(|i| {
                let [x1, y1, x2, y2] = corners(i);
                let xmin = x1.clamp(0.0, 1.0);
                let ymin = y1.clamp(0.0, 1.0);
                FaceCandidate {
                    bbox: RelativeBBox {
                        xmin,
                        ymin,
                        width: (x2.clamp(0.0, 1.0) - xmin).max(0.0),
                        height: (y2.clamp(0.0, 1.0) - ymin).max(0.0),
                    },
                    score: scores[i],
                }
            })
            .collect()
    }

    /// Non-maximum suppression over normalized corner boxes
    fn nms(&self, order: &[usize], corners: &impl Fn(usize) -> [f32; 4]) -> Vec<usize> {
        let mut keep = Vec::new();
        let mut order = order.to_vec();

        while !order.is_empty() {
            let i = order[0];
            keep.push(i);

            if order.len() == 1 {
                break;
            }

            let [x1_i, y1_i, x2_i, y2_i] = corners(i);
            let area_i = (x2_i - x1_i).max(0.0) * (y2_i - y1_i).max(0.0);

            let mut remaining = Vec::new();
            for &j in order.iter().skip(1) {
                let [x1_j, y1_j, x2_j, y2_j] = corners(j);
                let area_j = (x2_j - x1_j).max(0.0) * (y2_j - y1_j).max(0.0);

                let w = (x2_i.min(x2_j) - x1_i.max(x1_j)).max(0.0);
                let h = (y2_i.min(y2_j) - y1_i.max(y1_j)).max(0.0);
                let inter = w * h;
                let union = area_i + area_j - inter;
                let iou = if union > 0.0 { inter / union } else { 0.0 };

                if iou <= self.nms_threshold {
                    remaining.push(j);
                }
            }

            order = remaining;
        }

        keep
    }
}
