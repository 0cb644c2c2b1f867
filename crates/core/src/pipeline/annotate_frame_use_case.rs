use crate::detection::domain::object_detector::ObjectDetector;
use crate::detection::domain::overlay::Overlay;
use crate::shared::frame::Frame;

/// Runs the detector over one frame and paints the results into it.
///
/// This is the whole inference path of the viewer: exactly one `detect`
/// call per executed frame, overlay drawn in place, annotated frame
/// returned for display.
pub struct AnnotateFrameUseCase {
    detector: Box<dyn ObjectDetector>,
    overlay: Overlay,
}

impl AnnotateFrameUseCase {
    pub fn new(detector: Box<dyn ObjectDetector>) -> Self {
        Self {
            detector,
            overlay: Overlay::new(),
        }
    }

    pub fn execute(&mut self, frame: Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        let detections = self.detector.detect(&frame)?;
        log::debug!(
            "{} detection(s) in {}x{} frame",
            detections.len(),
            frame.width(),
            frame.height()
        );
        Ok(self.overlay.draw(frame, &detections))
    }
}
