//! Per-window decorations.
//!
//! A decoration is created by the live backend for every decorated window,
//! and lives until the window is undecorated or closed, or until the backend
//! is swapped out from under it. All decorations implement the [`Decoration`]
//! trait, which is how the rest of wmdecor talks to them.
//!
//! Decorations never observe anything on their own. Whatever happens to their
//! window is delivered to them as a [`DecorationEvent`], and they report
//! back what needs doing as an [`Update`].
//!
//! The decoration shipped with wmdecor is [`WindowDecorationState`].

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::platform::{Capabilities, Font, PropertyStore};
use crate::shadow::{ShadowCache, ShadowResource};
use crate::types::{Margins, Point, Rectangle, WindowId};

pub mod buttons;
mod state;

#[doc(inline)]
pub use buttons::{ButtonType, Button, ButtonGroup, ButtonColors, Side};
#[doc(inline)]
pub use state::{WindowDecorationState, Metrics, Palette, BorderSize, CURSOR_BORDER};

/// The immutable bundle of startup parameters every decoration is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationParams {
    /// The DPI of the primary screen.
    pub dpi: u32,
    /// The theme id: 1 for dark, 0 for light.
    pub theme_id: i32,
    /// The title font family.
    pub font_family: String,
    /// The title font size in pixels.
    pub font_size: i32,
    /// The theme name, for themeable backends.
    pub theme: Option<String>,
}

impl DecorationParams {
    /// The title font.
    pub fn font(&self) -> Font {
        Font::new(self.font_family.clone(), self.font_size)
    }
}

impl Default for DecorationParams {
    fn default() -> Self {
        let font = Font::default();
        Self {
            dpi: crate::platform::session::DEFAULT_DPI,
            theme_id: 0,
            font_family: font.family,
            font_size: font.pixel_size,
            theme: None,
        }
    }
}

/// The collaborators a decoration needs at construction.
///
/// Only the shadow cache outlives construction: decorations keep a handle to
/// it so that they can request new shadows as they change shape.
#[derive(Debug, Clone, Copy)]
pub struct DecorationContext<'a> {
    /// Access to the window's properties.
    pub properties: &'a dyn PropertyStore,
    /// The process-wide shadow cache.
    pub shadows: &'a Arc<ShadowCache>,
    /// The configured buttons on the left of the titlebar.
    pub buttons_left: &'a [ButtonType],
    /// The configured buttons on the right of the titlebar.
    pub buttons_right: &'a [ButtonType],
    /// The configured border size.
    pub border_size: BorderSize,
}

/// Something that happened to a decorated window, or to the
/// environment it is drawn in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecorationEvent {
    /// The client was resized.
    Resized {
        /// The new client width.
        width: i32,
        /// The new client height.
        height: i32,
    },
    /// The window was maximized or restored.
    MaximizedChanged(bool),
    /// The window gained or lost focus.
    ActiveChanged(bool),
    /// The window title changed.
    CaptionChanged(String),
    /// The operations the window supports changed.
    CapabilitiesChanged(Capabilities),
    /// The desktop theme changed.
    ThemeChanged(i32),
    /// The title font changed.
    FontChanged(Font),
    /// The configured button layout changed.
    ButtonsChanged {
        /// The new left buttons.
        left: Vec<ButtonType>,
        /// The new right buttons.
        right: Vec<ButtonType>,
    },
    /// The pointer moved over the decoration, or left it.
    PointerMoved(Option<Point>),
    /// A pointer button went down over the decoration.
    PointerPressed(Point),
    /// A pointer button was released over the decoration.
    PointerReleased(Point),
}

bitflags! {
    /// What changed on a decoration after it handled an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Update: u8 {
        /// Borders, titlebar or buttons moved.
        const GEOMETRY = 1 << 0;
        /// The decoration was assigned a different shadow.
        const SHADOW = 1 << 1;
        /// The decoration needs to be repainted.
        const REPAINT = 1 << 2;
        /// A button was clicked, see [`Decoration::take_action`].
        const ACTION = 1 << 3;
    }
}

/// A decoration around a single window.
pub trait Decoration: Debug {
    /// The window this decoration belongs to.
    fn window(&self) -> WindowId;

    /// Handles an event, returning what changed as a result.
    fn handle_event(&mut self, event: &DecorationEvent) -> Update;

    /// How far the decoration extends past the client on each side.
    fn borders(&self) -> Margins;

    /// The extra area around the decoration that only acts as a resize handle.
    fn resize_only_borders(&self) -> Margins;

    /// The titlebar, relative to the decoration.
    fn title_bar(&self) -> Rectangle;

    /// The shadow currently assigned to this decoration, if any.
    fn shadow(&self) -> Option<&Arc<ShadowResource>>;

    /// Takes the last button clicked, if any.
    fn take_action(&mut self) -> Option<ButtonType> {
        None
    }

    /// Returns self as a `dyn Any`, to downcast to the concrete decoration.
    fn as_any(&self) -> &dyn Any;
}
