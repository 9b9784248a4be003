//! The decoration settings shared by every decoration.
//!
//! [`DecorationSettings`] is a read-mostly view of the configuration that is
//! recomputed wholesale whenever the configuration or the backend changes.
//! Anything that observes it is told about individual values changing through
//! the [`Signal`]s it emits, which are only emitted if the recomputed value
//! actually differs from the previous one.

use tracing::{debug, warn};

use crate::config::keys::{
    DecorationOptions,
    BUTTONS_ON_LEFT, BUTTONS_ON_RIGHT,
    COLORS_VIEW_SECTION, COLORS_WINDOW_SECTION,
};
use crate::config::{ConfigSection, SharedConfig};
use crate::decoration::buttons::{decode_buttons, default_buttons_left, default_buttons_right};
use crate::decoration::{BorderSize, ButtonType, Palette};
use crate::manager::{Signal, Signals};
use crate::platform::{Font, SessionEnv, Workspace};
use crate::types::Color;

/// The base title font size, before scaling.
pub const BASE_FONT_SIZE: i32 = 15;

/// Screens at least this tall are scaled by 2.
pub const HIDPI_SCREEN_HEIGHT: i32 = 2000;

/// Settings shared by all decorations.
///
/// The values tagged as keys are exposed by name through [`ConfigSection`].
#[derive(Debug, wmdecor_macro::ConfigSection)]
pub struct DecorationSettings {
    #[key]
    buttons_left: Vec<ButtonType>,
    #[key]
    buttons_right: Vec<ButtonType>,
    #[key]
    border_size: BorderSize,
    #[key]
    border_size_auto: bool,
    #[key]
    close_on_double_click_on_menu: bool,
    #[key]
    font: Font,
    #[key]
    app_menu_enabled: bool,
    #[key]
    alpha_channel_supported: bool,
    #[key]
    on_all_desktops_available: bool,
    #[key]
    scale: i32,
    #[key]
    theme_id: i32,

    pushed_font: Option<Font>,
    palette: Palette,
    options: DecorationOptions,
    signals: Signals,
}

impl DecorationSettings {
    /// Creates settings holding the documented defaults.
    ///
    /// Nothing is read from `config` until the first [`recompute`](Self::recompute).
    pub fn new(config: SharedConfig, signals: Signals) -> Self {
        Self {
            buttons_left: default_buttons_left(),
            buttons_right: default_buttons_right(),
            border_size: BorderSize::Normal,
            border_size_auto: true,
            close_on_double_click_on_menu: false,
            font: Font::default(),
            app_menu_enabled: false,
            alpha_channel_supported: true,
            on_all_desktops_available: false,
            scale: 1,
            theme_id: 0,
            pushed_font: None,
            palette: Palette::for_theme(0),
            options: DecorationOptions::new(config),
            signals,
        }
    }

    /// Re-reads every setting from the configuration and the session.
    ///
    /// `recommended` is the border size recommended by the live backend, used
    /// if the border size is set to follow it. A signal is emitted for each value
    /// that changed, followed by [`Signal::Reconfigured`].
    pub fn recompute(&mut self, recommended: Option<&str>, workspace: &dyn Workspace, env: &SessionEnv) {
        self.scale = if env.screen_height >= HIDPI_SCREEN_HEIGHT { 2 } else { 1 };

        let left = self.options.buttons(BUTTONS_ON_LEFT)
            .map(|raw| decode_buttons(&raw))
            .unwrap_or_else(default_buttons_left);
        if left != self.buttons_left {
            self.buttons_left = left;
            self.signals.emit(Signal::ButtonsLeftChanged(self.buttons_left.clone()));
        }

        let right = self.options.buttons(BUTTONS_ON_RIGHT)
            .map(|raw| decode_buttons(&raw))
            .unwrap_or_else(default_buttons_right);
        if right != self.buttons_right {
            self.buttons_right = right;
            self.signals.emit(Signal::ButtonsRightChanged(self.buttons_right.clone()));
        }

        self.app_menu_enabled = self.buttons_left.iter()
            .chain(self.buttons_right.iter())
            .any(ButtonType::is_application_menu);

        let close = self.options.close_on_double_click_on_menu();
        if close != self.close_on_double_click_on_menu {
            self.close_on_double_click_on_menu = close;
            self.signals.emit(Signal::CloseOnDoubleClickChanged(close));
        }

        self.border_size_auto = self.options.border_size_auto();
        let size = self.resolve_border_size(recommended);
        if size != self.border_size {
            self.border_size = size;
            self.signals.emit(Signal::BorderSizeChanged(size));
        }

        let font = self.pushed_font.clone().unwrap_or_else(|| {
            Font::new(env.title_font.family.clone(), BASE_FONT_SIZE * self.scale)
        });
        self.set_font(font);

        self.alpha_channel_supported = workspace.compositing();
        self.on_all_desktops_available = workspace.desktop_count() > 1;

        debug!("recomputed decoration settings: {:?}", self);
        self.signals.emit(Signal::Reconfigured);
    }

    fn resolve_border_size(&self, recommended: Option<&str>) -> BorderSize {
        let name = if self.border_size_auto {
            recommended.map(str::to_string)
        } else {
            self.options.border_size_name()
        };
        name.map(|n| BorderSize::parse_or_normal(&n)).unwrap_or_default()
    }

    fn set_font(&mut self, font: Font) {
        if font != self.font {
            self.font = font;
            self.signals.emit(Signal::FontChanged(self.font.clone()));
        }
    }

    /// Applies a font pushed by the session.
    ///
    /// A pushed font takes precedence over the one derived from the session
    /// on every later recompute.
    pub fn font_changed(&mut self, family: &str, size: i32) {
        let font = Font::new(family, size * self.scale);
        self.pushed_font = Some(font.clone());
        self.set_font(font);
    }

    /// Applies a theme pushed by the session, and exports its colors
    /// to the configuration.
    pub fn theme_changed(&mut self, theme_id: i32) {
        self.theme_id = theme_id;
        self.palette = Palette::for_theme(theme_id);
        self.export_colors();
    }

    fn export_colors(&self) {
        let config = self.options.config();
        let p = self.palette;
        let entries: [(&str, &str, Color); 5] = [
            (COLORS_VIEW_SECTION, "BackgroundNormal", p.frame),
            (COLORS_VIEW_SECTION, "ForegroundNormal", p.font_active),
            (COLORS_WINDOW_SECTION, "BackgroundNormal", p.frame),
            (COLORS_WINDOW_SECTION, "ForegroundNormal", p.font_active),
            (COLORS_WINDOW_SECTION, "ForegroundInactive", p.font_inactive),
        ];
        for (section, key, color) in entries {
            config.write(section, key, color);
        }
        if let Err(e) = config.sync() {
            warn!("could not export color scheme: {}", e);
        }
    }

    /// The buttons on the left of the titlebar.
    pub fn buttons_left(&self) -> &[ButtonType] {
        &self.buttons_left
    }

    /// The buttons on the right of the titlebar.
    pub fn buttons_right(&self) -> &[ButtonType] {
        &self.buttons_right
    }

    /// The effective border size.
    pub fn border_size(&self) -> BorderSize {
        self.border_size
    }

    /// Whether the border size follows the backend's recommendation.
    pub fn border_size_auto(&self) -> bool {
        self.border_size_auto
    }

    /// Whether double clicking the menu button closes the window.
    pub fn close_on_double_click_on_menu(&self) -> bool {
        self.close_on_double_click_on_menu
    }

    /// The title font.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Whether the application menu button is configured on either side.
    pub fn is_app_menu_enabled(&self) -> bool {
        self.app_menu_enabled
    }

    /// Whether decorations may be translucent.
    pub fn is_alpha_channel_supported(&self) -> bool {
        self.alpha_channel_supported
    }

    /// Whether there is more than one desktop to be on.
    pub fn is_on_all_desktops_available(&self) -> bool {
        self.on_all_desktops_available
    }

    /// The screen scale factor.
    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// The current theme id.
    pub fn theme_id(&self) -> i32 {
        self.theme_id
    }

    /// The current palette.
    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// The title color for the given focus state.
    pub fn font_color(&self, active: bool) -> Color {
        self.palette.font_color(active)
    }

    /// The value of a setting by name, formatted for display.
    pub fn describe(&self, key: &str) -> Option<String> {
        let value = self.get_key(key)?;
        if let Some(b) = value.downcast_ref::<bool>() {
            Some(b.to_string())
        } else if let Some(i) = value.downcast_ref::<i32>() {
            Some(i.to_string())
        } else if let Some(size) = value.downcast_ref::<BorderSize>() {
            Some(size.to_string())
        } else if let Some(buttons) = value.downcast_ref::<Vec<ButtonType>>() {
            Some(buttons.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))
        } else {
            value.downcast_ref::<Font>().map(ToString::to_string)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys::{BORDER_SIZE, BORDER_SIZE_AUTO, DECORATION_SECTION};
    use crate::config::MemoryConfig;
    use crate::platform::{DecoratedWindow, TestWorkspace};

    fn settings() -> (DecorationSettings, SharedConfig, Signals) {
        let config = SharedConfig::new(MemoryConfig::new());
        let signals = Signals::new();
        (DecorationSettings::new(config.clone(), signals.clone()), config, signals)
    }

    fn workspace() -> TestWorkspace {
        TestWorkspace::new(vec![DecoratedWindow::new(1, 800, 600)])
    }

    #[test]
    fn test_defaults_emit_only_reconfigured() {
        let (mut s, _, signals) = settings();
        s.recompute(None, &workspace(), &SessionEnv::default());

        assert_eq!(signals.drain(), vec![Signal::Reconfigured]);
        assert_eq!(s.buttons_left(), default_buttons_left());
        assert_eq!(s.buttons_right(), default_buttons_right());
        assert_eq!(s.border_size(), BorderSize::Normal);
        assert_eq!(s.font().pixel_size, BASE_FONT_SIZE);
        assert!(!s.is_app_menu_enabled());
    }

    #[test]
    fn test_signals_only_on_change() {
        let (mut s, config, signals) = settings();
        let ws = workspace();
        let env = SessionEnv::default();
        s.recompute(None, &ws, &env);
        signals.drain();

        config.write(DECORATION_SECTION, BUTTONS_ON_LEFT, "MN");
        s.recompute(None, &ws, &env);
        assert_eq!(
            signals.drain(),
            vec![
                Signal::ButtonsLeftChanged(vec![ButtonType::Menu, ButtonType::ApplicationMenu]),
                Signal::Reconfigured,
            ]
        );
        assert!(s.is_app_menu_enabled());

        // same again, nothing changed
        s.recompute(None, &ws, &env);
        assert_eq!(signals.drain(), vec![Signal::Reconfigured]);
    }

    #[test]
    fn test_border_size_policy() {
        let (mut s, config, signals) = settings();
        let ws = workspace();
        let env = SessionEnv::default();

        s.recompute(Some("Large"), &ws, &env);
        assert_eq!(s.border_size(), BorderSize::Large);
        assert!(signals.drain().contains(&Signal::BorderSizeChanged(BorderSize::Large)));

        // nonsense recommendations fall back to normal
        s.recompute(Some("Gigantic"), &ws, &env);
        assert_eq!(s.border_size(), BorderSize::Normal);

        config.write(DECORATION_SECTION, BORDER_SIZE_AUTO, false);
        config.write(DECORATION_SECTION, BORDER_SIZE, "Tiny");
        s.recompute(Some("Large"), &ws, &env);
        assert_eq!(s.border_size(), BorderSize::Tiny);
        assert!(!s.border_size_auto());
    }

    #[test]
    fn test_font_scaling_and_push() {
        let (mut s, _, signals) = settings();
        let ws = workspace();
        let env = SessionEnv { screen_height: 2160, ..Default::default() };

        s.recompute(None, &ws, &env);
        assert_eq!(s.scale(), 2);
        assert_eq!(s.font().pixel_size, 30);
        assert!(signals.drain().contains(&Signal::FontChanged(s.font().clone())));

        s.font_changed("Sans", 11);
        assert_eq!(s.font(), &Font::new("Sans", 22));

        // the pushed font survives a recompute
        s.recompute(None, &ws, &env);
        assert_eq!(s.font(), &Font::new("Sans", 22));
    }

    #[test]
    fn test_workspace_derived() {
        let (mut s, _, _) = settings();
        let mut ws = workspace();
        ws.desktops = 4;
        ws.compositing = false;

        s.recompute(None, &ws, &SessionEnv::default());
        assert!(s.is_on_all_desktops_available());
        assert!(!s.is_alpha_channel_supported());
    }

    #[test]
    fn test_theme_last_write_wins() {
        let (mut s, config, _) = settings();

        s.theme_changed(1);
        assert_eq!(s.font_color(true), Color::from_rgb(207, 207, 207));
        s.theme_changed(0);

        assert_eq!(s.theme_id(), 0);
        assert_eq!(s.palette(), Palette::for_theme(0));
        assert_eq!(s.font_color(true), Palette::for_theme(0).font_active);
        assert_eq!(
            config.read(COLORS_WINDOW_SECTION, "BackgroundNormal").as_deref(),
            Some("255,255,255")
        );
    }

    #[test]
    fn test_keys() {
        let (s, _, _) = settings();

        assert_eq!(s.keys().first(), Some(&"buttons_left"));
        assert_eq!(s.describe("buttons_left").as_deref(), Some("Menu, OnAllDesktops"));
        assert_eq!(s.describe("border_size").as_deref(), Some("Normal"));
        assert_eq!(s.get_key_static::<i32>("scale"), Some(&1));
        assert!(s.describe("palette").is_none());
    }
}
