//! The decoration state machine.

use std::any::Any;
use std::sync::Arc;

use strum::*;
use tracing::debug;

use crate::platform::{Capabilities, CornerRadii, DecoratedWindow, Font, PropertyStore, WindowProperty};
use crate::shadow::{ShadowCache, ShadowResource, ShapeKey};
use crate::types::{Color, Margins, Point, Rectangle, WindowId};

use super::buttons::{self, ButtonColors, ButtonGroup, ButtonType, Side};
use super::{Decoration, DecorationContext, DecorationEvent, DecorationParams, Update};

/// The resize-only margin around a restored decoration. Not scaled with DPI.
pub const CURSOR_BORDER: i32 = 10;

/// The DPI at which metrics are defined.
const BASE_DPI: f64 = 96.0;

/// Corner radii of the shadow around full chrome.
pub const CHROME_RADII: CornerRadii = CornerRadii::new(6, 6, 3, 3);
/// The radius substituted for unset or out of range corner radii.
pub const DEFAULT_RADIUS: i32 = 6;
/// The width of the shadow halo.
pub const SHADOW_BORDER: i32 = 30;
/// Shadow darkness of the focused window.
pub const ACTIVE_DARKNESS: f64 = 1.0;
/// Shadow darkness of unfocused windows.
pub const INACTIVE_DARKNESS: f64 = 0.6;

/// Border size policies, by configuration name.
///
/// Unknown names map to [`BorderSize::Normal`].
#[derive(AsRefStr, Display, EnumString, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderSize {
    /// No borders at all.
    None,
    /// No side borders, with a normal bottom border.
    NoSides,
    /// Tiny borders.
    Tiny,
    /// Normal borders.
    #[default]
    Normal,
    /// Large borders.
    Large,
    /// Very large borders.
    VeryLarge,
    /// Huge borders.
    Huge,
    /// Very huge borders.
    VeryHuge,
    /// Oversized borders.
    Oversized,
}

impl BorderSize {
    /// Parses a border size by name, returning Normal on nonsense.
    pub fn parse_or_normal(name: &str) -> Self {
        name.trim().parse().unwrap_or_default()
    }

    /// The width of the left and right borders at 96 DPI.
    pub fn side_width(&self) -> i32 {
        use BorderSize::*;
        match self {
            None | NoSides => 0,
            Tiny => 1,
            Normal => 3,
            Large => 4,
            VeryLarge => 6,
            Huge => 8,
            VeryHuge => 10,
            Oversized => 14,
        }
    }

    /// The width of the bottom border at 96 DPI.
    pub fn bottom_width(&self) -> i32 {
        match self {
            BorderSize::NoSides => BorderSize::Normal.side_width(),
            other => other.side_width(),
        }
    }
}

/// Decoration metrics at a given DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// The integer scale factor, at least 1.
    pub scale: i32,
    /// The full-chrome borders.
    pub borders: Margins,
    /// The side of a right-hand button.
    pub button_width: i32,
    /// The side of a left-hand button.
    pub left_button_width: i32,
    /// The margin above the right-hand buttons.
    pub button_margin: i32,
    /// The spacing between buttons.
    pub spacing: i32,
}

impl Metrics {
    /// The metrics at `dpi`, scaled by `round(dpi / 96)`.
    pub fn for_dpi(dpi: u32) -> Self {
        let scale = ((dpi as f64 / BASE_DPI).round() as i32).max(1);
        Self {
            scale,
            borders: Margins::new(scale, 38 * scale, scale, scale),
            button_width: 30 * scale,
            left_button_width: 24 * scale,
            button_margin: 4 * scale,
            spacing: 4 * scale,
        }
    }

    /// Replaces the side and bottom borders with those of `size`.
    pub fn with_border_size(mut self, size: BorderSize) -> Self {
        let side = size.side_width() * self.scale;
        self.borders.left = side;
        self.borders.right = side;
        self.borders.bottom = size.bottom_width() * self.scale;
        self
    }
}

/// Frame and font colors of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// The frame background.
    pub frame: Color,
    /// Title and icon color of the focused window.
    pub font_active: Color,
    /// Title and icon color of unfocused windows.
    pub font_inactive: Color,
}

impl Palette {
    /// The palette of theme `id`: 1 is dark, everything else is light.
    pub fn for_theme(id: i32) -> Self {
        match id {
            1 => Self {
                frame: Color::from_rgb(31, 32, 34),
                font_active: Color::from_rgb(207, 207, 207),
                font_inactive: Color::from_rgb(105, 105, 105),
            },
            _ => Self {
                frame: Color::WHITE,
                font_active: Color::BLACK,
                font_inactive: Color::from_rgb(105, 105, 105),
            },
        }
    }

    /// The font color for the given focus state.
    pub fn font_color(&self, active: bool) -> Color {
        if active { self.font_active } else { self.font_inactive }
    }
}

/// The decoration of a single window.
///
/// A decoration runs in one of two modes, decided once at construction from the
/// window's Motif hints:
///
/// - **Chrome**: borders, a titlebar and buttons. Geometry follows the
///   window's size and maximized state.
/// - **Border-only**: the client draws its own titlebar, so the decoration
///   only contributes a resize area and a shadow shaped after the client's
///   own corner radii.
///
/// Both modes request their shadow from the shared [`ShadowCache`], and hold on
/// to it until their shape or focus changes.
#[derive(Debug)]
pub struct WindowDecorationState {
    window: WindowId,
    border_only: bool,

    width: i32,
    height: i32,
    maximized: bool,
    active: bool,
    caption: String,
    capabilities: Capabilities,

    theme_id: i32,
    theme: Option<String>,
    font: Font,
    palette: Palette,
    metrics: Metrics,

    borders: Margins,
    resize_only_borders: Margins,
    title_bar: Rectangle,
    left: ButtonGroup,
    right: ButtonGroup,
    action: Option<ButtonType>,

    client_radii: CornerRadii,
    shape_key: ShapeKey,
    shadow: Option<Arc<ShadowResource>>,
    shadows: Arc<ShadowCache>,
}

impl WindowDecorationState {
    /// Creates the decoration of `window`, ignoring the configured border size.
    pub fn new(window: &DecoratedWindow, params: &DecorationParams, ctx: &DecorationContext<'_>) -> Self {
        Self::build(window, params, ctx, None)
    }

    /// Creates the decoration of `window`, with side and bottom borders
    /// following the configured border size.
    pub fn new_sized(window: &DecoratedWindow, params: &DecorationParams, ctx: &DecorationContext<'_>) -> Self {
        Self::build(window, params, ctx, Some(ctx.border_size))
    }

    fn build(
        window: &DecoratedWindow,
        params: &DecorationParams,
        ctx: &DecorationContext<'_>,
        border_size: Option<BorderSize>,
    ) -> Self {
        let border_only = ctx.properties
            .motif_hints(window.id)
            .is_some_and(|hints| hints.is_border_only());

        let client_radii = ctx.properties
            .corner_radii(window.id)
            .unwrap_or_default()
            .or_default_each(DEFAULT_RADIUS);

        let mut metrics = Metrics::for_dpi(params.dpi);
        if let Some(size) = border_size {
            metrics = metrics.with_border_size(size);
        }

        let (left, right) = if border_only {
            (
                ButtonGroup::new(Side::Left, &[], window.capabilities),
                ButtonGroup::new(Side::Right, &[], window.capabilities),
            )
        } else {
            ctx.properties.set(window.id, WindowProperty::DecorationMarker, &[1]);
            (
                ButtonGroup::new(Side::Left, ctx.buttons_left, window.capabilities),
                ButtonGroup::new(Side::Right, ctx.buttons_right, window.capabilities),
            )
        };

        let mut state = Self {
            window: window.id,
            border_only,
            width: window.width,
            height: window.height,
            maximized: window.maximized,
            active: window.active,
            caption: window.caption.clone(),
            capabilities: window.capabilities,
            theme_id: params.theme_id,
            theme: params.theme.clone(),
            font: params.font(),
            palette: Palette::for_theme(params.theme_id),
            metrics,
            borders: Margins::zeroed(),
            resize_only_borders: Margins::zeroed(),
            title_bar: Rectangle::zeroed(),
            left,
            right,
            action: None,
            client_radii,
            shape_key: ShapeKey::new(Color::BLACK, CHROME_RADII, ACTIVE_DARKNESS, SHADOW_BORDER),
            shadow: None,
            shadows: Arc::clone(ctx.shadows),
        };

        state.update_borders();
        state.update_layout();
        state.update_shadow();

        debug!(
            "decorated window {} ({} mode)",
            state.window,
            if border_only { "border-only" } else { "chrome" }
        );

        state
    }

    /// Whether the client draws its own titlebar.
    pub fn is_border_only(&self) -> bool {
        self.border_only
    }

    /// Whether the window is maximized.
    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    /// Whether the window is focused.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The window title.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// The current theme id.
    pub fn theme_id(&self) -> i32 {
        self.theme_id
    }

    /// The theme name this decoration was created with, if any.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// The title font.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// The current palette.
    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// The color of the title and icons, depending on focus.
    pub fn font_color(&self) -> Color {
        self.palette.font_color(self.active)
    }

    /// The metrics this decoration was created with.
    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// The visible buttons on the given side.
    pub fn buttons(&self, side: Side) -> &ButtonGroup {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn group_mut(&mut self, side: Side) -> &mut ButtonGroup {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// The colors to draw the `index`th button of `side` with.
    pub fn button_colors(&self, side: Side, index: usize) -> Option<ButtonColors> {
        let button = self.buttons(side).buttons().get(index)?;
        Some(buttons::button_colors(button, self.palette.frame, self.font_color()))
    }

    /// The key of the current shadow.
    pub fn shape_key(&self) -> &ShapeKey {
        &self.shape_key
    }

    /// The width of the decoration, including side borders.
    pub fn frame_width(&self) -> i32 {
        self.width + self.borders.horizontal()
    }

    fn update_borders(&mut self) {
        if self.border_only {
            self.borders = Margins::zeroed();
            self.resize_only_borders = Margins::uniform(CURSOR_BORDER);
        } else if self.maximized {
            self.borders = Margins::new(0, self.metrics.borders.top, 0, 0);
            self.resize_only_borders = Margins::zeroed();
        } else {
            self.borders = self.metrics.borders;
            self.resize_only_borders = Margins::uniform(CURSOR_BORDER);
        }
    }

    fn update_layout(&mut self) {
        if self.border_only {
            return
        }

        let Metrics { button_width, left_button_width, button_margin, spacing, .. } = self.metrics;
        let inset = button_margin + spacing;
        let frame_width = self.frame_width();
        let n_left = self.left.len() as i32;
        let n_right = self.right.len() as i32;

        for (i, button) in self.left.buttons_mut().iter_mut().enumerate() {
            button.geometry = Rectangle::new(
                inset + i as i32 * (left_button_width + spacing),
                inset,
                left_button_width,
                left_button_width,
            );
        }

        let right_x = frame_width - n_right * (button_width + spacing);
        for (i, button) in self.right.buttons_mut().iter_mut().enumerate() {
            button.geometry = Rectangle::new(
                right_x + i as i32 * (button_width + spacing),
                button_margin,
                button_width,
                button_width,
            );
        }

        let x = inset * 2 + n_left * left_button_width;
        let width = frame_width - inset * 2 - n_left * left_button_width - n_right * (button_width + spacing);
        self.title_bar = Rectangle::new(x, 0, width.max(0), self.borders.top);
    }

    /// Requests the shadow for the current shape, returning whether it changed.
    fn update_shadow(&mut self) -> bool {
        let radii = if self.border_only { self.client_radii } else { CHROME_RADII };
        let darkness = if self.active { ACTIVE_DARKNESS } else { INACTIVE_DARKNESS };

        let key = ShapeKey::new(Color::BLACK, radii, darkness, SHADOW_BORDER);
        let shadow = self.shadows.get(&key);
        let changed = !self.shadow.as_ref().is_some_and(|old| Arc::ptr_eq(old, &shadow));

        self.shape_key = key;
        self.shadow = Some(shadow);
        changed
    }

    fn shadow_update(&mut self) -> Update {
        if self.update_shadow() {
            Update::SHADOW
        } else {
            Update::empty()
        }
    }

    fn relayout(&mut self) -> Update {
        if self.border_only {
            return Update::empty()
        }
        self.update_layout();
        Update::GEOMETRY | Update::REPAINT
    }

    fn hover(&mut self, at: Option<Point>) -> Update {
        let mut changed = false;
        for side in [Side::Left, Side::Right] {
            for button in self.group_mut(side).buttons_mut() {
                let hovered = at.is_some_and(|p| button.geometry.contains_point(p));
                changed |= button.hovered != hovered;
                button.hovered = hovered;
            }
        }
        if changed { Update::REPAINT } else { Update::empty() }
    }

    fn press(&mut self, at: Point) -> Update {
        for side in [Side::Left, Side::Right] {
            let group = self.group_mut(side);
            if let Some(idx) = group.button_at(at.x, at.y) {
                group.buttons_mut()[idx].pressed = true;
                return Update::REPAINT
            }
        }
        Update::empty()
    }

    fn release(&mut self, at: Point) -> Update {
        let mut update = Update::empty();
        let mut clicked = None;
        for side in [Side::Left, Side::Right] {
            for button in self.group_mut(side).buttons_mut() {
                if !button.pressed {
                    continue
                }
                button.pressed = false;
                update |= Update::REPAINT;
                if button.geometry.contains_point(at) {
                    clicked = Some(button.kind);
                }
            }
        }
        if clicked.is_some() {
            self.action = clicked;
            update |= Update::ACTION;
        }
        update
    }
}

impl Decoration for WindowDecorationState {
    fn window(&self) -> WindowId {
        self.window
    }

    fn handle_event(&mut self, event: &DecorationEvent) -> Update {
        use DecorationEvent::*;

        match event {
            Resized { width, height } => {
                self.width = *width;
                self.height = *height;
                self.relayout()
            }
            MaximizedChanged(maximized) => {
                if self.maximized == *maximized {
                    return Update::empty()
                }
                self.maximized = *maximized;
                self.update_borders();
                self.relayout() | Update::GEOMETRY
            }
            ActiveChanged(active) => {
                self.active = *active;
                self.shadow_update() | Update::REPAINT
            }
            CaptionChanged(caption) => {
                self.caption = caption.clone();
                if self.border_only { Update::empty() } else { Update::REPAINT }
            }
            CapabilitiesChanged(caps) => {
                self.capabilities = *caps;
                let left = self.left.update_visibility(*caps);
                let right = self.right.update_visibility(*caps);
                if left || right { self.relayout() } else { Update::empty() }
            }
            ThemeChanged(id) => {
                self.theme_id = *id;
                self.palette = Palette::for_theme(*id);
                self.shadow_update() | Update::REPAINT
            }
            FontChanged(font) => {
                self.font = font.clone();
                Update::REPAINT
            }
            ButtonsChanged { left, right } => {
                if self.border_only {
                    return Update::empty()
                }
                self.left = ButtonGroup::new(Side::Left, left, self.capabilities);
                self.right = ButtonGroup::new(Side::Right, right, self.capabilities);
                self.relayout()
            }
            PointerMoved(at) => self.hover(*at),
            PointerPressed(at) => self.press(*at),
            PointerReleased(at) => self.release(*at),
        }
    }

    fn borders(&self) -> Margins {
        self.borders
    }

    fn resize_only_borders(&self) -> Margins {
        self.resize_only_borders
    }

    fn title_bar(&self) -> Rectangle {
        self.title_bar
    }

    fn shadow(&self) -> Option<&Arc<ShadowResource>> {
        self.shadow.as_ref()
    }

    fn take_action(&mut self) -> Option<ButtonType> {
        self.action.take()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoration::buttons::{default_buttons_left, default_buttons_right, CLOSE_HOVERED};
    use crate::platform::property::{MemoryProperties, MWM_DECOR_BORDER, MWM_HINTS_DECORATIONS};

    struct Fixture {
        props: MemoryProperties,
        shadows: Arc<ShadowCache>,
        left: Vec<ButtonType>,
        right: Vec<ButtonType>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                props: MemoryProperties::new(),
                shadows: Arc::new(ShadowCache::new()),
                left: default_buttons_left(),
                right: default_buttons_right(),
            }
        }

        fn ctx(&self) -> DecorationContext<'_> {
            DecorationContext {
                properties: &self.props,
                shadows: &self.shadows,
                buttons_left: &self.left,
                buttons_right: &self.right,
                border_size: BorderSize::Normal,
            }
        }

        fn decorate(&self, window: &DecoratedWindow, dpi: u32) -> WindowDecorationState {
            let params = DecorationParams { dpi, ..Default::default() };
            WindowDecorationState::new(window, &params, &self.ctx())
        }
    }

    fn border_only_hints() -> [u32; 5] {
        [MWM_HINTS_DECORATIONS, 0, MWM_DECOR_BORDER, 0, 0]
    }

    #[test]
    fn test_chrome_titlebar_layout() {
        let fx = Fixture::new();
        // default capabilities: 1 visible left button, 3 visible right buttons
        let deco = fx.decorate(&DecoratedWindow::new(1, 800, 600), 96);

        assert!(!deco.is_border_only());
        assert_eq!(deco.buttons(Side::Left).len(), 1);
        assert_eq!(deco.buttons(Side::Right).len(), 3);
        assert_eq!(deco.borders(), Margins::new(1, 38, 1, 1));
        assert_eq!(deco.resize_only_borders(), Margins::uniform(CURSOR_BORDER));
        // x = (4 + 4) * 2 + 24, width = 802 - 16 - 24 - 3 * 34
        assert_eq!(deco.title_bar(), Rectangle::new(40, 0, 660, 38));

        let left = &deco.buttons(Side::Left).buttons()[0];
        assert_eq!(left.geometry, Rectangle::new(8, 8, 24, 24));
        let right = deco.buttons(Side::Right).buttons();
        assert_eq!(right[0].geometry, Rectangle::new(700, 4, 30, 30));
        assert_eq!(right[2].kind, ButtonType::Close);
        assert_eq!(right[2].geometry, Rectangle::new(768, 4, 30, 30));
        assert_eq!(fx.props.get(1, WindowProperty::DecorationMarker), Some(vec![1]));
    }

    #[test]
    fn test_metrics_scale_with_dpi() {
        let fx = Fixture::new();
        let deco = fx.decorate(&DecoratedWindow::new(1, 800, 600), 192);

        assert_eq!(deco.metrics().scale, 2);
        assert_eq!(deco.borders(), Margins::new(2, 76, 2, 2));
        // the cursor border does not scale
        assert_eq!(deco.resize_only_borders(), Margins::uniform(CURSOR_BORDER));
        assert_eq!(Metrics::for_dpi(30).scale, 1);
    }

    #[test]
    fn test_maximize_restore_cycles() {
        let fx = Fixture::new();
        let mut deco = fx.decorate(&DecoratedWindow::new(1, 800, 600), 96);
        let borders = deco.borders();
        let resize = deco.resize_only_borders();
        let title = deco.title_bar();

        for _ in 0..5 {
            let update = deco.handle_event(&DecorationEvent::MaximizedChanged(true));
            assert!(update.contains(Update::GEOMETRY));
            assert_eq!(deco.borders(), Margins::new(0, 38, 0, 0));
            assert_eq!(deco.resize_only_borders(), Margins::zeroed());

            deco.handle_event(&DecorationEvent::MaximizedChanged(false));
        }

        assert_eq!(deco.borders(), borders);
        assert_eq!(deco.resize_only_borders(), resize);
        assert_eq!(deco.title_bar(), title);
        assert!(deco.handle_event(&DecorationEvent::MaximizedChanged(false)).is_empty());
    }

    #[test]
    fn test_resize_relayouts() {
        let fx = Fixture::new();
        let mut deco = fx.decorate(&DecoratedWindow::new(1, 800, 600), 96);

        let update = deco.handle_event(&DecorationEvent::Resized { width: 1000, height: 600 });
        assert!(update.contains(Update::GEOMETRY));
        assert_eq!(deco.title_bar(), Rectangle::new(40, 0, 860, 38));
    }

    #[test]
    fn test_border_only_mode() {
        let fx = Fixture::new();
        fx.props.set(2, WindowProperty::MotifWmHints, &border_only_hints());
        fx.props.set(2, WindowProperty::BorderRadius, &[12, 12, 0, 0]);

        let mut deco = fx.decorate(&DecoratedWindow::new(2, 400, 300), 96);

        assert!(deco.is_border_only());
        assert_eq!(deco.borders(), Margins::zeroed());
        assert_eq!(deco.resize_only_borders(), Margins::uniform(CURSOR_BORDER));
        assert!(deco.buttons(Side::Right).is_empty());
        assert_eq!(deco.shape_key().radii(), CornerRadii::new(12, 12, 6, 6));
        assert_eq!(fx.props.get(2, WindowProperty::DecorationMarker), None);

        // border-only windows have no layout to redo
        assert!(deco.handle_event(&DecorationEvent::Resized { width: 10, height: 10 }).is_empty());
        deco.handle_event(&DecorationEvent::MaximizedChanged(true));
        assert_eq!(deco.resize_only_borders(), Margins::uniform(CURSOR_BORDER));
    }

    #[test]
    fn test_non_positive_radii_use_default() {
        let fx = Fixture::new();
        fx.props.set(3, WindowProperty::MotifWmHints, &border_only_hints());
        fx.props.set(3, WindowProperty::BorderRadius, &[0, (-4i32) as u32, 0, 0]);
        let deco = fx.decorate(&DecoratedWindow::new(3, 400, 300), 96);
        assert_eq!(deco.shape_key().radii(), CornerRadii::uniform(DEFAULT_RADIUS));

        // and likewise when the property is missing altogether
        fx.props.set(4, WindowProperty::MotifWmHints, &border_only_hints());
        let deco = fx.decorate(&DecoratedWindow::new(4, 400, 300), 96);
        assert_eq!(deco.shape_key().radii(), CornerRadii::uniform(DEFAULT_RADIUS));
    }

    #[test]
    fn test_oversized_radii_use_default() {
        let fx = Fixture::new();
        fx.props.set(5, WindowProperty::MotifWmHints, &border_only_hints());
        fx.props.set(5, WindowProperty::BorderRadius, &[0x7fff_ffff, 1, 1, 1]);

        let deco = fx.decorate(&DecoratedWindow::new(5, 400, 300), 96);

        assert!(deco.is_border_only());
        assert_eq!(deco.shape_key().radii(), CornerRadii::new(DEFAULT_RADIUS, 1, 1, 1));
        let shadow = deco.shadow().map(|s| s.buffer.width());
        assert_eq!(shadow, Some((2 * 12 + 2 * SHADOW_BORDER + 100) as u32));
    }

    #[test]
    fn test_left_buttons_are_spaced() {
        let fx = Fixture::new();
        let window = DecoratedWindow::new(1, 800, 600).with_capabilities(Capabilities::all());
        let deco = fx.decorate(&window, 96);

        let left = deco.buttons(Side::Left).buttons();
        assert_eq!(left.len(), 2);
        assert_eq!(left[0].geometry, Rectangle::new(8, 8, 24, 24));
        // one button width plus spacing further along
        assert_eq!(left[1].geometry, Rectangle::new(36, 8, 24, 24));
        assert!(left[0].geometry.point.x + left[0].geometry.size.width < left[1].geometry.point.x);
        // the titlebar starts after both left buttons
        assert_eq!(deco.title_bar().point.x, 8 * 2 + 2 * 24);
    }

    #[test]
    fn test_focus_swaps_shadow() {
        let fx = Fixture::new();
        let mut deco = fx.decorate(&DecoratedWindow::new(1, 800, 600), 96);
        let inactive = Arc::clone(deco.shadow().expect("no shadow"));
        assert_eq!(deco.shape_key().darkness(), INACTIVE_DARKNESS);
        assert_eq!(deco.shape_key().radii(), CHROME_RADII);

        let update = deco.handle_event(&DecorationEvent::ActiveChanged(true));
        assert!(update.contains(Update::SHADOW));
        assert_eq!(deco.shape_key().darkness(), ACTIVE_DARKNESS);

        deco.handle_event(&DecorationEvent::ActiveChanged(false));
        let again = deco.shadow().expect("no shadow");
        assert!(Arc::ptr_eq(&inactive, again));
        assert_eq!(fx.shadows.rasterizations(), 2);

        let other = fx.decorate(&DecoratedWindow::new(9, 300, 300), 96);
        assert!(Arc::ptr_eq(&inactive, other.shadow().expect("no shadow")));
        assert_eq!(fx.shadows.rasterizations(), 2);
    }

    #[test]
    fn test_theme_changes_last_wins() {
        let fx = Fixture::new();
        let mut deco = fx.decorate(&DecoratedWindow::new(1, 800, 600), 96);

        deco.handle_event(&DecorationEvent::ThemeChanged(1));
        assert_eq!(deco.palette().frame, Color::from_rgb(31, 32, 34));
        deco.handle_event(&DecorationEvent::ThemeChanged(0));

        assert_eq!(deco.palette(), Palette::for_theme(0));
        assert_eq!(deco.font_color(), Color::from_rgb(105, 105, 105));
        deco.handle_event(&DecorationEvent::ActiveChanged(true));
        assert_eq!(deco.font_color(), Color::BLACK);
    }

    #[test]
    fn test_capabilities_change_relayouts() {
        let fx = Fixture::new();
        let mut deco = fx.decorate(&DecoratedWindow::new(1, 800, 600), 96);

        let caps = Capabilities::default() | Capabilities::PROVIDES_CONTEXT_HELP;
        let update = deco.handle_event(&DecorationEvent::CapabilitiesChanged(caps));

        assert!(update.contains(Update::GEOMETRY));
        assert_eq!(deco.buttons(Side::Right).len(), 4);
        assert_eq!(deco.title_bar().width(), 660 - 34);
        assert!(deco.handle_event(&DecorationEvent::CapabilitiesChanged(caps)).is_empty());
    }

    #[test]
    fn test_button_click() {
        let fx = Fixture::new();
        let mut deco = fx.decorate(&DecoratedWindow::new(1, 800, 600), 96);
        let close = Point::new(770, 10);

        deco.handle_event(&DecorationEvent::PointerMoved(Some(close)));
        let colors = deco.button_colors(Side::Right, 2).expect("no close button");
        assert_eq!(colors.fill, CLOSE_HOVERED);

        deco.handle_event(&DecorationEvent::PointerPressed(close));
        let update = deco.handle_event(&DecorationEvent::PointerReleased(close));
        assert!(update.contains(Update::ACTION));
        assert_eq!(deco.take_action(), Some(ButtonType::Close));
        assert_eq!(deco.take_action(), None);

        // releasing elsewhere cancels the click
        deco.handle_event(&DecorationEvent::PointerPressed(close));
        let update = deco.handle_event(&DecorationEvent::PointerReleased(Point::new(0, 300)));
        assert!(!update.contains(Update::ACTION));
        assert!(deco.button_colors(Side::Right, 7).is_none());
    }

    #[test]
    fn test_border_size_policy() {
        assert_eq!(BorderSize::parse_or_normal("Huge"), BorderSize::Huge);
        assert_eq!(BorderSize::parse_or_normal("enormous"), BorderSize::Normal);

        let fx = Fixture::new();
        let mut ctx = fx.ctx();
        ctx.border_size = BorderSize::NoSides;
        let deco = WindowDecorationState::new_sized(
            &DecoratedWindow::new(1, 800, 600), &DecorationParams::default(), &ctx
        );
        assert_eq!(deco.borders(), Margins::new(0, 38, 0, 3));
    }
}
