use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("failed to read frame: {0}")]
    ReadFailure(String),
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to decode image: {0}")]
    DecodeFailure(String),
}

/// A live handle to an open camera device.
///
/// At most one session exists at a time; the viewer owns it exclusively and
/// both the timer tick and the stop action run on the UI thread, so no
/// locking is involved.
pub trait CameraSession: Send {
    /// Pulls one frame from the device.
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the device. Safe to call when already closed.
    fn close(&mut self);
}

/// Produces frames from either a one-shot image load or a camera device.
pub trait FrameSource: Send {
    /// Decodes a PNG or JPEG file into a frame.
    fn load_image(&self, path: &Path) -> Result<Frame, CaptureError>;

    /// Opens a capture device and hands ownership of the session to the
    /// caller.
    fn open_camera(&self, device_index: u32) -> Result<Box<dyn CameraSession>, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_strings() {
        let err = CaptureError::DeviceUnavailable("index 0".to_string());
        assert!(err.to_string().contains("camera device unavailable"));

        let err = CaptureError::ReadFailure("stream ended".to_string());
        assert!(err.to_string().contains("failed to read frame"));

        let err = CaptureError::FileNotFound(PathBuf::from("/tmp/missing.png"));
        assert!(err.to_string().contains("/tmp/missing.png"));

        let err = CaptureError::DecodeFailure("truncated jpeg".to_string());
        assert!(err.to_string().contains("failed to decode image"));
    }
}
