//! Configuration keys understood by wmdecor, and their defaults.
//!
//! Unknown keys are ignored. Every key here has a default that applies
//! when it is missing, and when its value cannot be parsed.

use super::{ConfigGroup, SharedConfig};

/// The section holding decoration plugin options.
pub const DECORATION_SECTION: &str = "org.kde.kdecoration2";
/// The section holding compositing options.
pub const COMPOSITING_SECTION: &str = "Compositing";
/// The section holding per-effect enablement.
pub const PLUGINS_SECTION: &str = "Plugins";
/// The color scheme section for view colors.
pub const COLORS_VIEW_SECTION: &str = "Colors:View";
/// The color scheme section for window colors.
pub const COLORS_WINDOW_SECTION: &str = "Colors:Window";

/// The plugin to load. Defaults to the platform default plugin.
pub const LIBRARY: &str = "library";
/// The theme to pass to themeable plugins. Defaults to the plugin's default theme.
pub const THEME: &str = "theme";
/// Disables decorations altogether. Defaults to false.
pub const NO_PLUGIN: &str = "NoPlugin";
/// Whether decoration buttons show tooltips. Defaults to true.
pub const SHOW_TOOLTIPS: &str = "ShowToolTips";
/// Buttons on the left of the titlebar, in compact form. Defaults to "MS".
pub const BUTTONS_ON_LEFT: &str = "ButtonsOnLeft";
/// Buttons on the right of the titlebar, in compact form. Defaults to "HIAX".
pub const BUTTONS_ON_RIGHT: &str = "ButtonsOnRight";
/// Whether double clicking the menu button closes the window. Defaults to false.
pub const CLOSE_ON_DOUBLE_CLICK_ON_MENU: &str = "CloseOnDoubleClickOnMenu";
/// The border size, by name. Defaults to "Normal".
pub const BORDER_SIZE: &str = "BorderSize";
/// Whether the border size is taken from the plugin's recommendation. Defaults to true.
pub const BORDER_SIZE_AUTO: &str = "BorderSizeAuto";
/// The compositing backend. Defaults to "OpenGL".
pub const COMPOSITING_BACKEND: &str = "Backend";

/// The default compositing backend name.
pub const DEFAULT_COMPOSITING_BACKEND: &str = "OpenGL";

/// The key under which a plugin is flagged as unsafe to initialize.
pub fn unsafe_plugin_key(plugin: &str) -> String {
    format!("{}IsUnsafe", plugin)
}

/// The key under which an effect is enabled or disabled.
pub fn effect_enabled_key(effect: &str) -> String {
    format!("{}Enabled", effect)
}

/// Typed accessors over the keys in this module.
///
/// This is a thin convenience layer over [`SharedConfig`], and is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct DecorationOptions {
    config: SharedConfig,
}

impl DecorationOptions {
    /// Creates a new set of accessors over `config`.
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// The underlying configuration handle.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// The decoration section.
    pub fn decoration(&self) -> ConfigGroup {
        self.config.group(DECORATION_SECTION)
    }

    /// The compositing section.
    pub fn compositing(&self) -> ConfigGroup {
        self.config.group(COMPOSITING_SECTION)
    }

    /// The configured plugin, or `default` if none is configured.
    pub fn library(&self, default: &str) -> String {
        self.decoration().read_entry(LIBRARY, default.to_string())
    }

    /// The configured theme, or `default` if none is configured.
    pub fn theme(&self, default: &str) -> String {
        self.decoration().read_entry(THEME, default.to_string())
    }

    /// Whether decorations are disabled.
    pub fn no_plugin(&self) -> bool {
        self.decoration().read_entry(NO_PLUGIN, false)
    }

    /// Whether decoration buttons show tooltips.
    pub fn show_tooltips(&self) -> bool {
        self.decoration().read_entry(SHOW_TOOLTIPS, true)
    }

    /// Whether double clicking the menu button closes the window.
    pub fn close_on_double_click_on_menu(&self) -> bool {
        self.decoration().read_entry(CLOSE_ON_DOUBLE_CLICK_ON_MENU, false)
    }

    /// Whether the border size follows the plugin's recommendation.
    pub fn border_size_auto(&self) -> bool {
        self.decoration().read_entry(BORDER_SIZE_AUTO, true)
    }

    /// The raw configured border size name, if any.
    pub fn border_size_name(&self) -> Option<String> {
        self.decoration().read_string(BORDER_SIZE)
    }

    /// The raw compact button string for the given key, if any.
    pub fn buttons(&self, key: &str) -> Option<String> {
        self.decoration().read_string(key)
    }

    /// The configured compositing backend.
    pub fn compositing_backend(&self) -> String {
        self.compositing()
            .read_entry(COMPOSITING_BACKEND, DEFAULT_COMPOSITING_BACKEND.to_string())
    }

    /// Whether `plugin` is flagged as unsafe to initialize.
    pub fn plugin_is_unsafe(&self, plugin: &str) -> bool {
        self.compositing().read_entry(&unsafe_plugin_key(plugin), false)
    }

    /// Whether the named effect is enabled, or `default` if unset.
    pub fn effect_enabled(&self, effect: &str, default: bool) -> bool {
        self.config
            .group(PLUGINS_SECTION)
            .read_entry(&effect_enabled_key(effect), default)
    }
}
