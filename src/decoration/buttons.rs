//! Decoration buttons and their compact configuration encoding.
//!
//! Button layouts are stored in configuration as strings with one character
//! per button, e.g. `"MS"` for a menu button followed by an on-all-desktops
//! button. Characters that do not name a button are skipped.

use strum::*;

use crate::platform::Capabilities;
use crate::types::{Color, Rectangle};

/// The kinds of button a decoration can show.
#[derive(AsRefStr, Display, EnumIter, EnumIs, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ButtonType {
    /// The window menu.
    Menu,
    /// The application menu.
    ApplicationMenu,
    /// Toggles the window between one desktop and all desktops.
    OnAllDesktops,
    /// Enters context help mode.
    ContextHelp,
    /// Minimizes the window.
    Minimize,
    /// Maximizes or restores the window.
    Maximize,
    /// Closes the window.
    Close,
    /// Keeps the window above others.
    KeepAbove,
    /// Keeps the window below others.
    KeepBelow,
    /// Shades the window.
    Shade,
}

impl ButtonType {
    /// The character encoding this button in configuration.
    pub fn code(&self) -> char {
        use ButtonType::*;
        match self {
            Menu => 'M',
            ApplicationMenu => 'N',
            OnAllDesktops => 'S',
            ContextHelp => 'H',
            Minimize => 'I',
            Maximize => 'A',
            Close => 'X',
            KeepAbove => 'F',
            KeepBelow => 'B',
            Shade => 'L',
        }
    }

    /// The button encoded by `code`, if any.
    pub fn from_code(code: char) -> Option<Self> {
        ButtonType::iter().find(|b| b.code() == code)
    }

    /// Whether this button is shown on a window with the given capabilities.
    pub fn is_visible(&self, caps: Capabilities) -> bool {
        use ButtonType::*;
        match self {
            Menu | KeepAbove | KeepBelow => true,
            ApplicationMenu => caps.contains(Capabilities::HAS_APPLICATION_MENU),
            OnAllDesktops => caps.contains(Capabilities::ON_ALL_DESKTOPS_AVAILABLE),
            ContextHelp => caps.contains(Capabilities::PROVIDES_CONTEXT_HELP),
            Minimize => caps.contains(Capabilities::MINIMIZEABLE),
            Maximize => caps.contains(Capabilities::MAXIMIZEABLE),
            Close => caps.contains(Capabilities::CLOSEABLE),
            Shade => caps.contains(Capabilities::SHADEABLE),
        }
    }
}

/// Encodes a button list into its compact string form.
pub fn encode_buttons(buttons: &[ButtonType]) -> String {
    buttons.iter().map(ButtonType::code).collect()
}

/// Decodes a compact button string. Unknown characters contribute no button.
pub fn decode_buttons(raw: &str) -> Vec<ButtonType> {
    raw.chars().filter_map(ButtonType::from_code).collect()
}

/// The buttons on the left of the titlebar when nothing is configured.
pub fn default_buttons_left() -> Vec<ButtonType> {
    vec![ButtonType::Menu, ButtonType::OnAllDesktops]
}

/// The buttons on the right of the titlebar when nothing is configured.
pub fn default_buttons_right() -> Vec<ButtonType> {
    vec![
        ButtonType::ContextHelp,
        ButtonType::Minimize,
        ButtonType::Maximize,
        ButtonType::Close,
    ]
}

/// Which side of the titlebar a button group sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left group.
    Left,
    /// The right group.
    Right,
}

/// A single button of a decoration.
///
/// Buttons do not know their owning decoration. Colors are looked up through
/// the decoration by side and index, see
/// [`WindowDecorationState::button_colors`](super::WindowDecorationState::button_colors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// What the button does.
    pub kind: ButtonType,
    /// Where the button is drawn, relative to the decoration.
    pub geometry: Rectangle,
    /// Whether the pointer is over the button.
    pub hovered: bool,
    /// Whether the button is held down.
    pub pressed: bool,
}

impl Button {
    /// Creates a new idle button with no geometry.
    pub fn new(kind: ButtonType) -> Self {
        Self {
            kind,
            geometry: Rectangle::zeroed(),
            hovered: false,
            pressed: false,
        }
    }
}

/// The visible buttons on one side of the titlebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonGroup {
    side: Side,
    configured: Vec<ButtonType>,
    buttons: Vec<Button>,
}

impl ButtonGroup {
    /// Creates a group from its configured buttons, keeping only
    /// those visible under `caps`.
    pub fn new(side: Side, configured: &[ButtonType], caps: Capabilities) -> Self {
        let mut group = Self {
            side,
            configured: configured.to_vec(),
            buttons: Vec::new(),
        };
        group.update_visibility(caps);
        group
    }

    /// Re-evaluates which configured buttons are visible.
    ///
    /// Returns true if the set of visible buttons changed.
    pub fn update_visibility(&mut self, caps: Capabilities) -> bool {
        let visible: Vec<ButtonType> = self.configured
            .iter()
            .copied()
            .filter(|b| b.is_visible(caps))
            .collect();

        if visible.iter().eq(self.buttons.iter().map(|b| &b.kind)) {
            return false
        }
        self.buttons = visible.into_iter().map(Button::new).collect();
        true
    }

    /// Which side of the titlebar this group is on.
    pub fn side(&self) -> Side {
        self.side
    }

    /// The number of visible buttons.
    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    /// Whether no buttons are visible.
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// The visible buttons, in order.
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub(crate) fn buttons_mut(&mut self) -> &mut [Button] {
        &mut self.buttons
    }

    /// The index of the button under (x, y), if any.
    pub fn button_at(&self, x: i32, y: i32) -> Option<usize> {
        self.buttons
            .iter()
            .position(|b| b.geometry.contains_point((x, y).into()))
    }
}

/// The colors to draw a button with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonColors {
    /// The button background.
    pub fill: Color,
    /// The button icon.
    pub foreground: Color,
}

/// Background of a pressed close button.
pub const CLOSE_PRESSED: Color = Color::from_rgb(205, 0, 0);
/// Background of a hovered close button.
pub const CLOSE_HOVERED: Color = Color::from_rgb(255, 0, 0);
/// Background of any other pressed button.
pub const BUTTON_PRESSED: Color = Color::from_rgb(0, 0, 205);
/// Background of any other hovered button.
pub const BUTTON_HOVERED: Color = Color::from_rgb(0, 0, 255);

/// Computes button colors from its state and the decoration's current palette.
pub fn button_colors(button: &Button, frame: Color, font: Color) -> ButtonColors {
    let (pressed, hovered) = if button.kind.is_close() {
        (CLOSE_PRESSED, CLOSE_HOVERED)
    } else {
        (BUTTON_PRESSED, BUTTON_HOVERED)
    };

    if button.pressed {
        ButtonColors { fill: pressed, foreground: frame }
    } else if button.hovered {
        ButtonColors { fill: hovered, foreground: frame }
    } else {
        ButtonColors { fill: frame, foreground: font }
    }
}
