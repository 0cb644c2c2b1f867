pub const MODEL_NAME: &str = "firewatch-yolov8n.onnx";

/// Class list baked into the shipped weights. Index = model class id.
pub const CLASS_NAMES: &[&str] = &["fire", "smoke"];

/// Box/label colors per class id (RGB), cycled for out-of-range ids.
pub const CLASS_COLORS: &[[u8; 3]] = &[[255, 69, 58], [142, 142, 147]];

/// Confidence threshold applied to every inference call.
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Fallback model input resolution when the model doesn't specify dimensions.
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// The default system camera. There is no device selection UI.
pub const DEFAULT_CAMERA_INDEX: u32 = 0;

/// Camera refresh interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 30;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
