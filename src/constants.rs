//! Constants used throughout the application

/// Minimum confidence for a face detection to be considered at all
pub const FACE_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Minimum confidence for a dominant emotion to be recorded
pub const EMOTION_CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Left edge of the accepted horizontal band, as a fraction of frame width.
/// Faces whose left edge falls at or before this fraction are ignored.
pub const CENTER_BAND_LEFT: f32 = 0.3;

/// Right edge of the accepted horizontal band, as a fraction of frame width.
/// Faces whose right edge falls at or beyond this fraction are ignored.
pub const CENTER_BAND_RIGHT: f32 = 0.7;

/// Maximum normalized distance between a wrist and the nose for "reading"
pub const READING_WRIST_NOSE_MAX_GAP: f32 = 0.15;

/// Maximum normalized spread between the two wrists for "dancing"
pub const DANCING_WRIST_MAX_SPREAD: f32 = 0.3;

/// Sampling interval, in frames. Consulted by the driver loop but skipping
/// is disabled: every frame is fully analyzed.
pub const DEFAULT_FRAME_SKIP_INTERVAL: u64 = 10;

/// IOU threshold for face detection non-maximum suppression
pub const FACE_NMS_THRESHOLD: f32 = 0.4;

/// Minimum pose presence score for landmarks to be trusted
pub const POSE_PRESENCE_THRESHOLD: f32 = 0.5;

/// Number of body landmarks produced by the pose model
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Values per pose landmark in the model output (x, y, z, visibility, presence)
pub const POSE_LANDMARK_STRIDE: usize = 5;

/// Number of emotion classes in the classifier vocabulary
pub const NUM_EMOTION_CLASSES: usize = 7;

/// Smallest face crop side, in pixels, the emotion classifier will accept
pub const MIN_EMOTION_CROP_SIDE: i32 = 8;

/// Image normalization constants for the detector inputs
pub const IMAGE_NORMALIZATION_OFFSET: f32 = 127.5;
pub const IMAGE_NORMALIZATION_SCALE: f32 = 128.0;

/// Bounding box overlay thickness, in pixels
pub const BOX_THICKNESS: i32 = 2;

/// Font scale for the emotion label drawn above the face box
pub const EMOTION_TEXT_SCALE: f64 = 0.9;

/// Vertical offset of the emotion label above the face box, in pixels
pub const EMOTION_TEXT_Y_OFFSET: i32 = 10;

/// Font scale for the first-occurrence activity label
pub const ACTIVITY_TEXT_SCALE: f64 = 1.0;

/// Origin of the first-occurrence activity label
pub const ACTIVITY_TEXT_ORIGIN: (i32, i32) = (10, 50);
