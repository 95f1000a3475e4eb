use crate::constants::{MIN_EMOTION_CROP_SIDE, NUM_EMOTION_CLASSES};
use crate::detect::{Emotion, EmotionClassifier, EmotionPrediction};
use crate::Result;
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Default emotion model input side length
const DEFAULT_EMOTION_INPUT_SIZE: i32 = 48;

/// Facial emotion classifier using ONNX Runtime.
///
/// The model takes a grayscale face crop and emits one logit per emotion in
/// the fixed vocabulary. With `require_detection` set, crops too small to
/// plausibly contain a face produce the explicit no-detection outcome
/// instead of a prediction.
pub struct OnnxEmotionClassifier {
    session: Session,
    #[allow(dead_code)] // Reserved for future named tensor support
    input_name: String,
    input_size: i32,
    require_detection: bool,
}

impl OnnxEmotionClassifier {
    /// Create a new emotion classifier from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(model_path: P, require_detection: bool) -> Result<Self> {
        log::info!(
            "Initializing emotion classifier with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("emotion_classifier")
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
            input_size: DEFAULT_EMOTION_INPUT_SIZE,
            require_detection,
        })
    }

    /// Preprocess a face crop for the emotion model
    #[allow(clippy::cast_sign_loss)] // OpenCV dimensions are positive
    fn preprocess(&self, face: &Mat) -> Result<Array4<f32>> {
        let mut gray = Mat::default();
        imgproc::cvt_color(face, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        let mut resized = Mat::default();
        imgproc::resize(
            &gray,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        // Normalize to [0, 1]
        let mut float_image = Mat::default();
        resized.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let size = self.input_size as usize;
        let mut data = vec![0.0f32; size * size];

        for row in 0..size {
            for col in 0..size {
                data[row * size + col] = *float_image.at_2d::<f32>(row as i32, col as i32)?;
            }
        }

        Array4::from_shape_vec((1, 1, size, size), data)
            .map_err(|e| crate::error::Error::ModelError(format!("Failed to create array: {e}")))
    }

    /// Run the model and extract the emotion logits
    fn forward(&mut self, inputs: Array4<f32>) -> Result<Vec<f32>> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        let logits_output = outputs
            .first()
            .ok_or_else(|| crate::error::Error::ModelOutputError("No output from model".to_string()))?
            .try_extract::<f32>()?;
        let logits_view = logits_output.view();
        let logits = logits_view
            .as_slice()
            .ok_or_else(|| crate::error::Error::ModelOutputError("Failed to read logit output".to_string()))?
            .to_vec();

        if logits.len() < NUM_EMOTION_CLASSES {
            return Err(crate::error::Error::ModelOutputError(format!(
                "Emotion model produced {} values, expected {NUM_EMOTION_CLASSES}",
                logits.len()
            )));
        }

        Ok(logits)
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&mut self, face: &Mat) -> Result<Option<EmotionPrediction>> {
        if face.empty() {
            return Ok(None);
        }
        if self.require_detection && (face.cols() < MIN_EMOTION_CROP_SIDE || face.rows() < MIN_EMOTION_CROP_SIDE) {
            // Too small to plausibly contain a face
            return Ok(None);
        }

        let inputs = self.preprocess(face)?;
        let logits = self.forward(inputs)?;
        Ok(Some(prediction_from_logits(&logits)))
    }
}

/// Build a prediction from raw logits via softmax
pub(crate) fn prediction_from_logits(logits: &[f32]) -> EmotionPrediction {
    let probabilities = softmax(&logits[..NUM_EMOTION_CLASSES]);

    let scores: Vec<(Emotion, f32)> = Emotion::ALL.iter().copied().zip(probabilities).collect();

    // Strict comparison: ties go to the earliest label in the vocabulary
    let (dominant, confidence) = scores
        .iter()
        .fold((Emotion::Angry, f32::MIN), |(best, best_score), &(emotion, score)| {
            if score > best_score {
                (emotion, score)
            } else {
                (best, best_score)
            }
        });

    EmotionPrediction {
        dominant,
        confidence,
        scores,
    }
}

fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
