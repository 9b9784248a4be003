//! Per-window properties.
//!
//! Properties are exchanged as lists of 32-bit cardinals, the way they are
//! stored on the display server. The typed views in this module ([`MotifHints`]
//! and [`CornerRadii`]) convert to and from that representation; anything
//! missing or malformed converts to `None` rather than an error, and the
//! caller substitutes its own default.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;

use strum::*;
use strum_macros::EnumIter;

use crate::types::WindowId;

/// Properties wmdecor reads from or writes to client windows.
#[derive(AsRefStr, Display, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum WindowProperty {
    /// _MOTIF_WM_HINTS
    #[strum(serialize = "_MOTIF_WM_HINTS")]
    MotifWmHints,
    /// _UNITY_GTK_BORDER_RADIUS
    #[strum(serialize = "_UNITY_GTK_BORDER_RADIUS")]
    BorderRadius,
    /// _KWIN_UKUI_DECORAION
    ///
    /// Set on every window wmdecor decorates with its own chrome.
    #[strum(serialize = "_KWIN_UKUI_DECORAION")]
    DecorationMarker,
}

/// Access to the properties of client windows.
///
/// Writes are one-way: nothing in wmdecor reads back a property
/// it has written.
pub trait PropertyStore: Debug {
    /// Reads a property as a list of cardinals.
    ///
    /// Returns `None` if the property is not set on the window.
    fn get(&self, window: WindowId, prop: WindowProperty) -> Option<Vec<u32>>;

    /// Replaces a property on the window.
    fn set(&self, window: WindowId, prop: WindowProperty, values: &[u32]);

    /// Convenience method for reading the Motif hints of a window.
    fn motif_hints(&self, window: WindowId) -> Option<MotifHints> {
        self.get(window, WindowProperty::MotifWmHints)
            .and_then(|raw| MotifHints::from_raw(&raw))
    }

    /// Convenience method for reading the corner radii of a window.
    fn corner_radii(&self, window: WindowId) -> Option<CornerRadii> {
        self.get(window, WindowProperty::BorderRadius)
            .and_then(|raw| CornerRadii::from_raw(&raw))
    }
}

/// The Motif hint flag indicating that `decorations` is valid.
pub const MWM_HINTS_DECORATIONS: u32 = 1 << 1;
/// The Motif decoration value for a border and nothing else.
pub const MWM_DECOR_BORDER: u32 = 1 << 1;

/// The largest corner radius accepted, from a client or anywhere else.
pub const MAX_CORNER_RADIUS: i32 = 128;

/// The Motif window manager hints (_MOTIF_WM_HINTS).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotifHints {
    /// Which of the following fields are valid.
    pub flags: u32,
    /// Allowed window manager functions.
    pub functions: u32,
    /// Requested decorations.
    pub decorations: u32,
    /// Input mode.
    pub input_mode: i32,
    /// Status.
    pub status: u32,
}

impl MotifHints {
    /// Parses the hints from their raw property form.
    ///
    /// Returns None if fewer than three fields are present.
    pub fn from_raw(raw: &[u32]) -> Option<Self> {
        if raw.len() < 3 {
            return None
        }
        Some(Self {
            flags: raw[0],
            functions: raw[1],
            decorations: raw[2],
            input_mode: raw.get(3).copied().unwrap_or(0) as i32,
            status: raw.get(4).copied().unwrap_or(0),
        })
    }

    /// Returns the hints in their raw property form.
    pub fn to_raw(&self) -> [u32; 5] {
        [self.flags, self.functions, self.decorations, self.input_mode as u32, self.status]
    }

    /// Whether the client asks for a border and no other decorations.
    pub fn is_border_only(&self) -> bool {
        self.flags & MWM_HINTS_DECORATIONS != 0 && self.decorations == MWM_DECOR_BORDER
    }
}

/// The four corner radii of a window (_UNITY_GTK_BORDER_RADIUS).
///
/// Radii are signed: a misbehaving client can set anything, and it is up to
/// the consumer to reject values that make no sense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CornerRadii {
    /// Top left.
    pub top_left: i32,
    /// Top right.
    pub top_right: i32,
    /// Bottom left.
    pub bottom_left: i32,
    /// Bottom right.
    pub bottom_right: i32,
}

impl CornerRadii {
    /// Creates a new set of radii.
    pub const fn new(top_left: i32, top_right: i32, bottom_left: i32, bottom_right: i32) -> Self {
        Self { top_left, top_right, bottom_left, bottom_right }
    }

    /// The same radius on every corner.
    pub const fn uniform(radius: i32) -> Self {
        Self::new(radius, radius, radius, radius)
    }

    /// Parses radii from their raw property form.
    ///
    /// The property must hold exactly four values.
    pub fn from_raw(raw: &[u32]) -> Option<Self> {
        match raw {
            [tl, tr, bl, br] => Some(Self::new(*tl as i32, *tr as i32, *bl as i32, *br as i32)),
            _ => None,
        }
    }

    /// Returns the radii in their raw property form.
    pub fn to_raw(&self) -> [u32; 4] {
        [
            self.top_left as u32,
            self.top_right as u32,
            self.bottom_left as u32,
            self.bottom_right as u32,
        ]
    }

    /// Replaces every radius outside `1..=MAX_CORNER_RADIUS` with `default`.
    pub fn or_default_each(self, default: i32) -> Self {
        let fix = |r: i32| if (1..=MAX_CORNER_RADIUS).contains(&r) { r } else { default };
        Self::new(
            fix(self.top_left),
            fix(self.top_right),
            fix(self.bottom_left),
            fix(self.bottom_right),
        )
    }

    /// The largest of the four radii.
    pub fn max(&self) -> i32 {
        self.top_left
            .max(self.top_right)
            .max(self.bottom_left)
            .max(self.bottom_right)
    }
}

/// An in-memory [`PropertyStore`].
#[derive(Debug, Default)]
pub struct MemoryProperties {
    props: RefCell<HashMap<(WindowId, WindowProperty), Vec<u32>>>,
}

impl MemoryProperties {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a single property.
    pub fn with(self, window: WindowId, prop: WindowProperty, values: &[u32]) -> Self {
        self.set(window, prop, values);
        self
    }

    /// Removes every property set on `window`.
    pub fn forget(&self, window: WindowId) {
        self.props.borrow_mut().retain(|(id, _), _| *id != window);
    }
}

impl PropertyStore for MemoryProperties {
    fn get(&self, window: WindowId, prop: WindowProperty) -> Option<Vec<u32>> {
        self.props.borrow().get(&(window, prop)).cloned()
    }

    fn set(&self, window: WindowId, prop: WindowProperty, values: &[u32]) {
        self.props.borrow_mut().insert((window, prop), values.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_only_hints() {
        let border = MotifHints {
            flags: MWM_HINTS_DECORATIONS,
            decorations: MWM_DECOR_BORDER,
            ..Default::default()
        };
        let full = MotifHints { decorations: 1, ..border };
        let unflagged = MotifHints { flags: 0, ..border };

        assert!(border.is_border_only());
        assert!(!full.is_border_only());
        assert!(!unflagged.is_border_only());
    }

    #[test]
    fn test_property_store_views() {
        let props = MemoryProperties::new()
            .with(1, WindowProperty::BorderRadius, &[4, 4, 0, 0])
            .with(2, WindowProperty::BorderRadius, &[4, 4])
            .with(1, WindowProperty::MotifWmHints, &[2, 0, 2, 0, 0]);

        assert_eq!(props.corner_radii(1), Some(CornerRadii::new(4, 4, 0, 0)));
        assert_eq!(props.corner_radii(2), None);
        assert_eq!(props.corner_radii(3), None);
        assert!(props.motif_hints(1).is_some_and(|h| h.is_border_only()));

        props.forget(1);
        assert_eq!(props.corner_radii(1), None);
    }

    #[test]
    fn test_radii_defaults() {
        let radii = CornerRadii::new(0, -3, 8, 2).or_default_each(6);

        assert_eq!(radii, CornerRadii::new(6, 6, 8, 2));
        assert_eq!(radii.max(), 8);

        let radii = CornerRadii::new(i32::MAX, MAX_CORNER_RADIUS, MAX_CORNER_RADIUS + 1, 1).or_default_each(6);
        assert_eq!(radii, CornerRadii::new(6, MAX_CORNER_RADIUS, 6, 1));
    }

    #[test]
    fn test_atom_names() {
        assert_eq!(WindowProperty::BorderRadius.as_ref(), "_UNITY_GTK_BORDER_RADIUS");
        assert_eq!("_MOTIF_WM_HINTS".parse::<WindowProperty>().ok(), Some(WindowProperty::MotifWmHints));
    }
}
