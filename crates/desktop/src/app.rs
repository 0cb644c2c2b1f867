use std::path::{Path, PathBuf};
use std::time::Duration;

use iced::widget::{button, column, container, row, text, vertical_rule};
use iced::{Element, Length, Subscription, Task, Theme};

use firewatch_core::capture::domain::frame_source::{CameraSession, FrameSource};
use firewatch_core::capture::infrastructure::opencv_source::OpencvFrameSource;
use firewatch_core::detection::infrastructure::onnx_detector::OnnxDetector;
use firewatch_core::pipeline::annotate_frame_use_case::AnnotateFrameUseCase;
use firewatch_core::shared::constants::{
    DEFAULT_CAMERA_INDEX, DEFAULT_CONFIDENCE, IMAGE_EXTENSIONS, TICK_INTERVAL_MS,
};

use crate::theme;
use crate::viewport::{self, Display};

const CAMERA_OFF: &str = "Camera off.";
const CAMERA_NOT_DETECTED: &str = "Camera not detected.";
const READ_FAILURE: &str = "Failed to read frame from camera.";

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    LoadImage,
    ImageSelected(Option<PathBuf>),
    StartCamera,
    StopCamera,
    Tick,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Viewer state. The running variant owns the camera handle, so at most one
/// session can exist at a time.
enum Viewer {
    Idle,
    ShowingImage,
    CameraRunning(Box<dyn CameraSession>),
}

pub struct App {
    source: Box<dyn FrameSource>,
    pipeline: Option<AnnotateFrameUseCase>,
    viewer: Viewer,
    display: Display,
}

impl App {
    pub fn new(model_path: PathBuf) -> (Self, Task<Message>) {
        match OnnxDetector::new(&model_path, DEFAULT_CONFIDENCE) {
            Ok(detector) => (
                Self::with_parts(
                    Box::new(OpencvFrameSource::new()),
                    AnnotateFrameUseCase::new(Box::new(detector)),
                ),
                Task::none(),
            ),
            Err(e) => {
                // The weights file exists (checked at startup) but didn't
                // load; nothing useful can run without a detector.
                log::error!("failed to load model {}: {e}", model_path.display());
                (
                    Self {
                        source: Box::new(OpencvFrameSource::new()),
                        pipeline: None,
                        viewer: Viewer::Idle,
                        display: Display::placeholder(),
                    },
                    iced::exit(),
                )
            }
        }
    }

    fn with_parts(source: Box<dyn FrameSource>, pipeline: AnnotateFrameUseCase) -> Self {
        Self {
            source,
            pipeline: Some(pipeline),
            viewer: Viewer::Idle,
            display: Display::placeholder(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadImage => {
                self.stop_camera();
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select image")
                            .add_filter("Image Files", IMAGE_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::ImageSelected,
                );
            }
            Message::ImageSelected(Some(path)) => self.show_image(&path),
            Message::ImageSelected(None) => {}
            Message::StartCamera => self.start_camera(),
            Message::StopCamera => self.stop_camera(),
            Message::Tick => self.refresh_frame(),
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let controls = column![
            text("Controls").size(13.0),
            button(text("Load Image").size(14.0))
                .on_press(Message::LoadImage)
                .padding([10, 16])
                .width(Length::Fill),
            button(text("Start Camera").size(14.0))
                .on_press(Message::StartCamera)
                .padding([10, 16])
                .width(Length::Fill),
            button(text("Stop Camera").size(14.0))
                .on_press(Message::StopCamera)
                .padding([10, 16])
                .width(Length::Fill)
                .style(button::secondary),
        ]
        .spacing(10)
        .width(Length::FillPortion(1));

        let display = container(viewport::view(&self.display))
            .width(Length::FillPortion(4))
            .height(Length::Fill);

        row![controls, vertical_rule(1), display]
            .spacing(16)
            .padding(16)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme()
    }

    /// The periodic camera refresh. Only exists while a session is open;
    /// each tick runs to completion before the next may fire.
    pub fn subscription(&self) -> Subscription<Message> {
        if self.is_camera_running() {
            iced::time::every(Duration::from_millis(TICK_INTERVAL_MS)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn is_camera_running(&self) -> bool {
        matches!(self.viewer, Viewer::CameraRunning(_))
    }

    fn show_image(&mut self, path: &Path) {
        match self.source.load_image(path) {
            Ok(frame) => {
                let Some(pipeline) = self.pipeline.as_mut() else {
                    return;
                };
                match pipeline.execute(frame) {
                    Ok(annotated) => {
                        self.display = Display::from_frame(&annotated);
                        self.viewer = Viewer::ShowingImage;
                    }
                    Err(e) => log::error!("inference failed for {}: {e}", path.display()),
                }
            }
            // Load failures (missing file, bad decode) stay silent: nothing
            // replaces the current display.
            Err(e) => log::warn!("could not load {}: {e}", path.display()),
        }
    }

    fn start_camera(&mut self) {
        // Releases any previous handle before acquiring a new one.
        self.stop_camera();

        match self.source.open_camera(DEFAULT_CAMERA_INDEX) {
            Ok(session) => {
                self.display = Display::cleared();
                self.viewer = Viewer::CameraRunning(session);
            }
            Err(e) => {
                log::warn!("{e}");
                self.display = Display::message(CAMERA_NOT_DETECTED);
            }
        }
    }

    /// Safe to call from any state, repeatedly.
    fn stop_camera(&mut self) {
        if let Viewer::CameraRunning(session) = &mut self.viewer {
            session.close();
        }
        self.viewer = Viewer::Idle;
        self.display = Display::message(CAMERA_OFF);
    }

    fn refresh_frame(&mut self) {
        let Viewer::CameraRunning(session) = &mut self.viewer else {
            return;
        };

        match session.read_frame() {
            Ok(frame) => {
                let Some(pipeline) = self.pipeline.as_mut() else {
                    return;
                };
                match pipeline.execute(frame) {
                    Ok(annotated) => self.display = Display::from_frame(&annotated),
                    Err(e) => {
                        log::error!("inference failed: {e}");
                        self.display = Display::message(e.to_string());
                    }
                }
            }
            Err(e) => {
                // The timer keeps firing; the next tick tries another read.
                log::warn!("{e}");
                self.display = Display::message(READ_FAILURE);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
