use std::path::Path;

use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{VideoCapture, CAP_ANY};

use crate::capture::domain::frame_source::{CameraSession, CaptureError, FrameSource};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Frame source backed by the `image` crate for file decode and OpenCV
/// `videoio` for live capture.
pub struct OpencvFrameSource;

impl OpencvFrameSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OpencvFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for OpencvFrameSource {
    fn load_image(&self, path: &Path) -> Result<Frame, CaptureError> {
        if !path.exists() {
            return Err(CaptureError::FileNotFound(path.to_path_buf()));
        }
        if !has_supported_extension(path) {
            return Err(CaptureError::DecodeFailure(format!(
                "unsupported image format: {}",
                path.display()
            )));
        }

        let img = image::open(path)
            .map_err(|e| CaptureError::DecodeFailure(e.to_string()))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height, 3))
    }

    fn open_camera(&self, device_index: u32) -> Result<Box<dyn CameraSession>, CaptureError> {
        let capture = VideoCapture::new(device_index as i32, CAP_ANY)
            .map_err(|e| CaptureError::DeviceUnavailable(e.message))?;

        let opened = capture
            .is_opened()
            .map_err(|e| CaptureError::DeviceUnavailable(e.message))?;
        if !opened {
            return Err(CaptureError::DeviceUnavailable(format!(
                "camera {device_index} failed to open"
            )));
        }

        log::info!("camera {device_index} opened");
        Ok(Box::new(OpencvCameraSession {
            capture: Some(capture),
        }))
    }
}

/// Live capture handle; releases the device on `close` or drop.
pub struct OpencvCameraSession {
    capture: Option<VideoCapture>,
}

impl CameraSession for OpencvCameraSession {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let capture = self
            .capture
            .as_mut()
            .ok_or_else(|| CaptureError::ReadFailure("camera is closed".to_string()))?;

        let mut bgr = Mat::default();
        let got = capture
            .read(&mut bgr)
            .map_err(|e| CaptureError::ReadFailure(e.message))?;
        if !got {
            return Err(CaptureError::ReadFailure(
                "no frame from device".to_string(),
            ));
        }

        mat_to_frame(&bgr)
    }

    fn close(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                log::warn!("failed to release camera: {e}");
            } else {
                log::info!("camera released");
            }
        }
    }
}

impl Drop for OpencvCameraSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Convert a BGR capture Mat into an RGB [`Frame`].
fn mat_to_frame(bgr: &Mat) -> Result<Frame, CaptureError> {
    let (width, height) = (bgr.cols(), bgr.rows());
    if width <= 0 || height <= 0 {
        return Err(CaptureError::ReadFailure(
            "empty frame from device".to_string(),
        ));
    }

    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
        .map_err(|e| CaptureError::ReadFailure(e.message))?;

    let data = rgb
        .data_bytes()
        .map_err(|e| CaptureError::ReadFailure(e.message))?
        .to_vec();

    Ok(Frame::new(data, width as u32, height as u32, 3))
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
