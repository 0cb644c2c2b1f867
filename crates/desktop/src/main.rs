mod app;
mod theme;
mod viewport;

use std::path::Path;
use std::process;

use firewatch_core::shared::constants::MODEL_NAME;
use firewatch_core::shared::model_resolver;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    // Missing weights are a fatal startup error; everything after this
    // point assumes the model file exists.
    let model_path = match model_resolver::resolve(MODEL_NAME, Some(Path::new("models"))) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    iced::application(
        move || App::new(model_path.clone()),
        App::update,
        App::view,
    )
    .title("Firewatch")
    .theme(App::theme)
    .subscription(App::subscription)
    .window(iced::window::Settings {
        size: iced::Size::new(1200.0, 700.0),
        ..Default::default()
    })
    .run()
}
