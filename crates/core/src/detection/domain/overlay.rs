use ab_glyph::{FontRef, PxScale};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

const FONT_BYTES: &[u8] = include_bytes!("../../../assets/DejaVuSans-Bold.ttf");

const BORDER_THICKNESS: i32 = 2;
const LABEL_TEXT_SIZE: f32 = 14.0;
const LABEL_PADDING: i32 = 3;

/// Paints detection boxes and label tags directly into a frame's pixels.
pub struct Overlay {
    font: FontRef<'static>,
}

impl Overlay {
    pub fn new() -> Self {
        Self {
            font: FontRef::try_from_slice(FONT_BYTES).expect("embedded font must parse"),
        }
    }

    /// Draw every detection as a hollow rectangle plus a filled
    /// "label score%" tag, consuming the frame and returning the annotated
    /// one. The output is always exactly the input's size.
    pub fn draw(&self, frame: Frame, detections: &[Detection]) -> Frame {
        if detections.is_empty() {
            return frame;
        }

        let (width, height) = (frame.width(), frame.height());
        let mut img: RgbImage = ImageBuffer::from_raw(width, height, frame.into_data())
            .expect("valid frame dimensions");

        for det in detections {
            self.draw_detection(&mut img, det);
        }

        Frame::new(img.into_raw(), width, height, 3)
    }

    fn draw_detection(&self, img: &mut RgbImage, det: &Detection) {
        let (iw, ih) = (img.width() as i32, img.height() as i32);

        let x = (det.x1.round() as i32).clamp(0, iw - 1);
        let y = (det.y1.round() as i32).clamp(0, ih - 1);
        let w = (det.width().round() as i32).min(iw - x);
        let h = (det.height().round() as i32).min(ih - y);
        if w <= 1 || h <= 1 {
            return;
        }

        let color = Rgb(det.color());

        // Nested 1px rectangles give a thicker border without a stroke API.
        for inset in 0..BORDER_THICKNESS {
            let (bw, bh) = (w - 2 * inset, h - 2 * inset);
            if bw <= 0 || bh <= 0 {
                break;
            }
            let rect = Rect::at(x + inset, y + inset).of_size(bw as u32, bh as u32);
            draw_hollow_rect_mut(img, rect, color);
        }

        self.draw_label(img, det, x, y, color);
    }

    fn draw_label(&self, img: &mut RgbImage, det: &Detection, x: i32, y: i32, color: Rgb<u8>) {
        let text = format!("{} {:.0}%", det.label(), det.score * 100.0);
        let scale = PxScale::from(LABEL_TEXT_SIZE);
        let (tw, th) = text_size(scale, &self.font, &text);
        let (tw, th) = (tw as i32, th as i32);

        let tag_w = tw + 2 * LABEL_PADDING;
        let tag_h = th + 2 * LABEL_PADDING;

        // Tag sits above the box, or inside its top edge when clipped.
        let tag_y = if y - tag_h >= 0 { y - tag_h } else { y };
        let tag_x = x.min(img.width() as i32 - tag_w).max(0);
        if tag_w <= 0 || tag_h <= 0 {
            return;
        }

        let tag = Rect::at(tag_x, tag_y).of_size(tag_w as u32, tag_h as u32);
        draw_filled_rect_mut(img, tag, color);
        draw_text_mut(
            img,
            Rgb([255, 255, 255]),
            tag_x + LABEL_PADDING,
            tag_y + LABEL_PADDING,
            scale,
            &self.font,
            &text,
        );
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::CLASS_COLORS;

    fn blank_frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0u8; (width * height * 3) as usize], width, height, 3)
    }

    fn detection(x1: f64, y1: f64, x2: f64, y2: f64) -> Detection {
        Detection {
            x1,
            y1,
            x2,
            y2,
            class_id: 0,
            score: 0.8,
        }
    }

    #[test]
    fn test_draw_preserves_dimensions() {
        let overlay = Overlay::new();
        let annotated = overlay.draw(blank_frame(120, 90), &[detection(10.0, 10.0, 60.0, 50.0)]);
        assert_eq!(annotated.width(), 120);
        assert_eq!(annotated.height(), 90);
        assert_eq!(annotated.channels(), 3);
    }

    #[test]
    fn test_draw_no_detections_leaves_pixels_untouched() {
        let overlay = Overlay::new();
        let annotated = overlay.draw(blank_frame(32, 32), &[]);
        assert!(annotated.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_draw_paints_border_in_class_color() {
        let overlay = Overlay::new();
        let annotated = overlay.draw(blank_frame(100, 100), &[detection(20.0, 40.0, 80.0, 90.0)]);

        // A pixel on the left border edge, below the label tag.
        let arr = annotated.as_ndarray();
        let [r, g, b] = CLASS_COLORS[0];
        assert_eq!(arr[[60, 20, 0]], r);
        assert_eq!(arr[[60, 20, 1]], g);
        assert_eq!(arr[[60, 20, 2]], b);
    }

    #[test]
    fn test_draw_changes_pixels_somewhere() {
        let overlay = Overlay::new();
        let annotated = overlay.draw(blank_frame(64, 64), &[detection(5.0, 20.0, 60.0, 60.0)]);
        assert!(annotated.data().iter().any(|&b| b != 0));
    }

    #[test]
    fn test_draw_partially_off_frame_does_not_panic() {
        let overlay = Overlay::new();
        let annotated = overlay.draw(
            blank_frame(50, 50),
            &[detection(-20.0, -20.0, 70.0, 70.0), detection(40.0, 40.0, 200.0, 200.0)],
        );
        assert_eq!(annotated.width(), 50);
    }

    #[test]
    fn test_draw_degenerate_box_is_skipped() {
        let overlay = Overlay::new();
        let annotated = overlay.draw(blank_frame(32, 32), &[detection(10.0, 10.0, 10.0, 10.0)]);
        assert!(annotated.data().iter().all(|&b| b == 0));
    }
}
