use ratatui::style::{Color, Modifier, Style};
use term_color_support::ColorSupport;

/// What the attached terminal can display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    TrueColor,
    Ansi256,
    Basic,
}

impl ColorDepth {
    /// Detect the color capabilities of stdout
    pub fn detect() -> ColorDepth {
        let support = ColorSupport::stdout();
        if support.has_16m {
            ColorDepth::TrueColor
        } else if support.has_256 {
            ColorDepth::Ansi256
        } else {
            ColorDepth::Basic
        }
    }

    /// Map an RGB triple to the closest color this terminal can show
    pub fn rgb(self, r: u8, g: u8, b: u8) -> Color {
        match self {
            // 1. TrueColor support: exact value
            ColorDepth::TrueColor => Color::Rgb(r, g, b),
            // 2. 256 colors: nearest entry of the 6x6x6 cube (indices 16-231)
            ColorDepth::Ansi256 => {
                let q = |c: u8| ((c as u16 * 5 + 127) / 255) as u8;
                Color::Indexed(16 + 36 * q(r) + 6 * q(g) + q(b))
            }
            // 3. Basic colors: threshold each channel
            ColorDepth::Basic => {
                let on = |c: u8| c >= 128;
                match (on(r), on(g), on(b)) {
                    (false, false, false) => Color::Black,
                    (true, false, false) => Color::Red,
                    (false, true, false) => Color::Green,
                    (true, true, false) => Color::Yellow,
                    (false, false, true) => Color::Blue,
                    (true, false, true) => Color::Magenta,
                    (false, true, true) => Color::Cyan,
                    (true, true, true) => Color::White,
                }
            }
        }
    }
}

/// Menu palette, a blue theme resolved once for the current terminal
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub title_bg: Color,
    pub title_fg: Color,
    pub widget_fg: Color,
    pub focus_bg: Color,
    pub focus_fg: Color,
}

impl Theme {
    pub fn blue(depth: ColorDepth) -> Theme {
        Theme {
            background: depth.rgb(228, 230, 246),
            title_bg: depth.rgb(62, 149, 195),
            title_fg: depth.rgb(228, 230, 246),
            widget_fg: depth.rgb(61, 61, 61),
            focus_bg: depth.rgb(62, 149, 195),
            focus_fg: depth.rgb(255, 255, 255),
        }
    }
}

/// Turn a catalog font value ("bold italic", "plain", ...) into a text style
/// Unknown words are ignored
pub fn font_style(font: &str) -> Style {
    let mut modifier = Modifier::empty();
    for word in font.split_whitespace() {
        match word.to_ascii_lowercase().as_str() {
            "bold" => modifier |= Modifier::BOLD,
            "italic" => modifier |= Modifier::ITALIC,
            "underlined" | "underline" => modifier |= Modifier::UNDERLINED,
            "dim" => modifier |= Modifier::DIM,
            _ => {}
        }
    }
    Style::default().add_modifier(modifier)
}
