//! Session-wide facts the decoration layer depends on.

use std::fmt;

/// The lowest DPI wmdecor will accept from the screen.
pub const MIN_DPI: u32 = 30;
/// The DPI assumed when the screen does not report one.
pub const DEFAULT_DPI: u32 = 96;

/// A font, as far as decorations care about it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    /// The font family.
    pub family: String,
    /// The font size in pixels.
    pub pixel_size: i32,
}

impl Font {
    /// Creates a new Font.
    pub fn new<S: Into<String>>(family: S, pixel_size: i32) -> Self {
        Self { family: family.into(), pixel_size }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Noto Sans CJK SC", 15)
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}px", self.family, self.pixel_size)
    }
}

/// A snapshot of the session: primary screen, desktop style and fonts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnv {
    /// The DPI reported by the primary screen, if any.
    pub primary_dpi: Option<u32>,
    /// The height of the primary screen in pixels.
    pub screen_height: i32,
    /// The name of the desktop style, e.g. "ukui-dark".
    pub style_name: Option<String>,
    /// The system title font.
    pub title_font: Font,
}

impl Default for SessionEnv {
    fn default() -> Self {
        Self {
            primary_dpi: None,
            screen_height: 1080,
            style_name: None,
            title_font: Font::default(),
        }
    }
}

impl SessionEnv {
    /// The DPI decorations are created with.
    ///
    /// Missing values become [`DEFAULT_DPI`], and anything lower than
    /// [`MIN_DPI`] is raised to it.
    pub fn dpi(&self) -> u32 {
        self.primary_dpi.unwrap_or(DEFAULT_DPI).max(MIN_DPI)
    }

    /// The theme id derived from the desktop style: 1 for the dark
    /// style, 0 for everything else.
    pub fn theme_id(&self) -> i32 {
        theme_id_for_style(self.style_name.as_deref())
    }
}

/// Maps a desktop style name to a theme id.
pub fn theme_id_for_style(style: Option<&str>) -> i32 {
    match style {
        Some("ukui-dark") => 1,
        _ => 0,
    }
}
