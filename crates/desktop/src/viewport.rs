use iced::widget::{container, image, text};
use iced::{ContentFit, Element, Length};

use firewatch_core::shared::frame::Frame;

/// What the display area currently shows: either a status line or the most
/// recently rendered frame. Replaced wholesale on every update; the
/// viewport holds no other state.
#[derive(Debug, Clone)]
pub enum Display {
    Message(String),
    Frame(image::Handle),
}

impl Display {
    pub fn placeholder() -> Self {
        Display::Message("The display will appear here.".to_string())
    }

    pub fn message(status: impl Into<String>) -> Self {
        Display::Message(status.into())
    }

    pub fn cleared() -> Self {
        Display::Message(String::new())
    }

    /// Convert an RGB frame into a displayable image handle.
    pub fn from_frame(frame: &Frame) -> Self {
        let rgba = rgb_to_rgba(frame.data());
        Display::Frame(image::Handle::from_rgba(
            frame.width(),
            frame.height(),
            rgba,
        ))
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, Display::Frame(_))
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            Display::Message(status) => Some(status),
            Display::Frame(_) => None,
        }
    }
}

/// The display area: a black surface showing either the status text or the
/// current frame, letterboxed to fit.
pub fn view<'a, Message: 'a>(display: &Display) -> Element<'a, Message> {
    let content: Element<'a, Message> = match display {
        Display::Message(status) => text(status.clone()).size(15.0).into(),
        Display::Frame(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
    };

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(iced::Color::BLACK.into()),
            text_color: Some(iced::Color::WHITE),
            ..container::Style::default()
        })
        .into()
}

fn rgb_to_rgba(data: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(data.len() / 3 * 4);
    for px in data.chunks_exact(3) {
        rgba.extend_from_slice(px);
        rgba.push(255);
    }
    rgba
}
