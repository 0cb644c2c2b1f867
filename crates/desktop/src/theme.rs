use iced::color;
use iced::theme::Palette;
use iced::Theme;

/// Fixed dark palette; there is no appearance setting to switch on.
pub fn resolve_theme() -> Theme {
    Theme::custom("Firewatch", palette())
}

fn palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0xff, 0x6b, 0x2c),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}
