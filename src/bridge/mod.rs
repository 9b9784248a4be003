//! The bridge between wmdecor and its decoration backend.
//!
//! # Loading
//!
//! Backends are looked up by name in a [`PluginRegistry`]. At startup, the
//! [`DecorationBridge`] walks a fallback chain:
//!
//! 1. the plugin named in the configuration,
//! 2. the platform default plugin ([`DEFAULT_PLUGIN`]), and
//! 3. the universal fallback ([`FALLBACK_PLUGIN`]),
//!
//! and keeps the first backend that loads. If none does, decorations are
//! disabled and windows are drawn borderless; this is never fatal.
//!
//! # Swapping
//!
//! At most one backend is live at any time. Replacing it is done by loading the
//! new backend on the side, and only swapping it in once it has loaded
//! successfully. If the new backend fails to load, the old one stays live,
//! untouched.
//!
//! # Freeze protection
//!
//! Every load is guarded by a [`FreezeWatchdog`](watchdog::FreezeWatchdog).
//! Backends that hung a previous instance of the window manager are skipped.

use std::time::Duration;

use custom_debug_derive::Debug;
use strum::*;
use tracing::{debug, info, warn};

use crate::config::keys::DecorationOptions;
use crate::config::{ConfigSection, SharedConfig};
use crate::decoration::{Decoration, DecorationContext, DecorationParams};
use crate::manager::{Signal, Signals};
use crate::platform::{DecoratedWindow, Font, SessionEnv, Workspace};
use crate::settings::DecorationSettings;
use crate::{DecorError, Result};

mod backend;
pub mod builtin;
pub mod watchdog;

#[doc(inline)]
pub use backend::{BackendDescriptor, BackendMetadata, DecorationBackend, PluginLoader, PluginRegistry};

use watchdog::{FreezeHandler, FreezeWatchdog, SafePoint};

/// The plugin used when none is configured.
pub const DEFAULT_PLUGIN: &str = builtin::UKUI_PLUGIN;
/// The plugin tried when everything else fails.
pub const FALLBACK_PLUGIN: &str = builtin::AURORAE_PLUGIN;

/// Whether the window manager draws decorations for its windows.
#[derive(AsRefStr, Display, std::fmt::Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationMode {
    /// Windows are decorated by wmdecor.
    Server,
    /// Windows are drawn without decorations.
    None,
}

#[derive(Debug)]
struct LiveBackend {
    descriptor: BackendDescriptor,
    backend: Box<dyn DecorationBackend>,
}

/// Loads and owns the decoration backend, along with the session-wide
/// parameters every decoration is created with.
#[derive(Debug)]
pub struct DecorationBridge {
    registry: PluginRegistry,
    options: DecorationOptions,
    live: Option<LiveBackend>,
    no_plugin: bool,
    show_tooltips: bool,
    theme: Option<String>,
    mode: DecorationMode,

    dpi: u32,
    theme_id: i32,
    font: Font,

    watchdog_timeout: Duration,
    #[debug(skip)]
    on_freeze: FreezeHandler,
    signals: Signals,
}

impl DecorationBridge {
    /// Creates a new bridge with no backend loaded.
    ///
    /// Nothing is loaded until [`init`](Self::init) is called.
    pub fn new(registry: PluginRegistry, config: SharedConfig, signals: Signals) -> Self {
        let env = SessionEnv::default();
        Self {
            registry,
            options: DecorationOptions::new(config),
            live: None,
            no_plugin: false,
            show_tooltips: true,
            theme: None,
            mode: DecorationMode::None,
            dpi: env.dpi(),
            theme_id: env.theme_id(),
            font: env.title_font,
            watchdog_timeout: watchdog::DEFAULT_TIMEOUT,
            on_freeze: watchdog::abort_on_freeze(),
            signals,
        }
    }

    /// Replaces the freeze watchdog's timeout and handler.
    pub fn with_watchdog(mut self, timeout: Duration, on_freeze: FreezeHandler) -> Self {
        self.watchdog_timeout = timeout;
        self.on_freeze = on_freeze;
        self
    }

    /// Reads the session parameters and loads the first backend of the
    /// fallback chain that loads successfully.
    pub fn init(&mut self, env: &SessionEnv) {
        self.dpi = env.dpi();
        self.theme_id = env.theme_id();
        self.font = env.title_font.clone();
        self.show_tooltips = self.options.show_tooltips();
        debug!("decoration bridge using dpi {}, theme id {}", self.dpi, self.theme_id);

        self.init_plugin();
    }

    fn init_plugin(&mut self) {
        self.no_plugin = self.options.no_plugin();
        if self.no_plugin {
            info!("decorations are disabled by configuration");
            self.set_mode(DecorationMode::None);
            return
        }

        let configured = self.options.library(DEFAULT_PLUGIN);
        let mut chain = vec![configured];
        for name in [DEFAULT_PLUGIN, FALLBACK_PLUGIN] {
            if !chain.iter().any(|c| c == name) {
                chain.push(name.to_string());
            }
        }

        for name in &chain {
            match self.reload(name) {
                Ok(()) => break,
                Err(e) => warn!("{}, trying next plugin", e),
            }
        }

        if self.live.is_none() {
            warn!("no decoration plugin could be loaded, windows will be undecorated");
            self.set_mode(DecorationMode::None);
        }
    }

    /// Switches to the backend registered under `name`.
    ///
    /// If `name` is already live, only its theme is re-read, and
    /// [`Signal::ThemeChanged`] is emitted if it changed. Otherwise the
    /// backend is loaded on the side and swapped in once it has loaded,
    /// emitting [`Signal::MetadataReloaded`]. If it fails to load, the live
    /// backend is left untouched and the error is returned.
    ///
    /// Fails with [`DecorError::NoPlugin`] while decorations are disabled.
    pub fn reload(&mut self, name: &str) -> Result<()> {
        if self.no_plugin {
            return Err(DecorError::NoPlugin)
        }
        if self.plugin_name() == Some(name) {
            self.refresh_theme();
            return Ok(())
        }

        let staged = self.load_guarded(name)?;
        let meta = staged.metadata();
        let descriptor = BackendDescriptor::from_metadata(name, &meta);

        self.theme = self.resolve_theme(&descriptor);
        if let Some(old) = self.live.replace(LiveBackend { descriptor, backend: staged }) {
            info!("replaced decoration plugin {} with {}", old.descriptor.plugin_name, name);
        } else {
            info!("loaded decoration plugin {}", name);
        }

        self.set_mode(DecorationMode::Server);
        self.signals.emit(Signal::MetadataReloaded);
        Ok(())
    }

    fn load_guarded(&self, name: &str) -> Result<Box<dyn DecorationBackend>> {
        if !self.registry.contains(name) {
            return Err(DecorError::PluginNotFound(name.to_string()))
        }
        if self.options.plugin_is_unsafe(name) {
            return Err(DecorError::HangDuringPluginInit(name.to_string()))
        }

        let mut watchdog = FreezeWatchdog::new(
            name,
            self.options.config().clone(),
            self.watchdog_timeout,
            self.on_freeze.clone(),
        );

        watchdog.safe_point(SafePoint::PreInit);
        let loaded = self.registry.load(name);
        watchdog.safe_point(SafePoint::PostInit);
        watchdog.safe_point(SafePoint::PostLastGuardedFrame);

        loaded
    }

    fn resolve_theme(&self, descriptor: &BackendDescriptor) -> Option<String> {
        let default = descriptor.default_theme_name.as_deref()?;
        Some(self.options.theme(default))
    }

    /// Re-reads the theme of the live backend, returning whether it changed.
    fn refresh_theme(&mut self) -> bool {
        let Some(live) = &self.live else {
            return false
        };
        let theme = self.resolve_theme(&live.descriptor);
        if theme == self.theme {
            return false
        }
        debug!("decoration theme changed from {:?} to {:?}", self.theme, theme);
        self.theme = theme;
        self.signals.emit(Signal::ThemeChanged(self.theme.clone()));
        true
    }

    fn set_mode(&mut self, mode: DecorationMode) {
        if self.mode != mode {
            self.mode = mode;
            self.signals.emit(Signal::DecorationModeChanged(mode));
        }
    }

    /// Re-reads the configuration and applies whatever changed.
    ///
    /// Every window in `workspace` is redecorated if decorations were enabled
    /// or disabled, if the backend was swapped, or if its theme changed. An error
    /// is returned if a newly configured backend failed to load, in which case
    /// the old one stays live.
    pub fn reconfigure(&mut self, workspace: &dyn Workspace) -> Result<()> {
        self.show_tooltips = self.options.show_tooltips();

        if self.options.no_plugin() != self.no_plugin {
            if self.no_plugin {
                info!("decorations enabled");
                self.init_plugin();
            } else {
                info!("decorations disabled");
                self.no_plugin = true;
                self.live = None;
                self.theme = None;
                self.set_mode(DecorationMode::None);
            }
            redecorate_all(workspace);
            return Ok(())
        }

        if self.no_plugin {
            return Ok(())
        }

        let configured = self.options.library(DEFAULT_PLUGIN);
        if self.plugin_name() != Some(configured.as_str()) {
            self.reload(&configured)?;
            redecorate_all(workspace);
        } else if self.refresh_theme() {
            redecorate_all(workspace);
        }
        Ok(())
    }

    /// Creates a decoration for `window` with the live backend.
    ///
    /// Returns None if decorations are disabled, or if the backend
    /// declines to decorate the window.
    pub fn create_decoration(
        &self,
        window: &DecoratedWindow,
        ctx: &DecorationContext<'_>,
    ) -> Option<Box<dyn Decoration>> {
        if self.no_plugin {
            return None
        }
        let live = self.live.as_ref()?;
        let deco = live.backend.create_decoration(window, &self.params(), ctx);
        if deco.is_none() {
            debug!("{} declined to decorate window {}", live.descriptor.plugin_name, window.id);
        }
        deco
    }

    /// The parameters new decorations are created with.
    pub fn params(&self) -> DecorationParams {
        DecorationParams {
            dpi: self.dpi,
            theme_id: self.theme_id,
            font_family: self.font.family.clone(),
            font_size: self.font.pixel_size,
            theme: self.theme.clone(),
        }
    }

    /// Records a theme change pushed by the session.
    pub fn theme_changed(&mut self, theme_id: i32) {
        self.theme_id = theme_id;
    }

    /// Records a font change pushed by the session.
    pub fn font_changed(&mut self, family: &str, size: i32) {
        self.font = Font::new(family, size);
    }

    /// Records a change in screen DPI, clamping it like the startup value.
    pub fn dpi_changed(&mut self, dpi: u32) {
        self.dpi = SessionEnv { primary_dpi: Some(dpi), ..Default::default() }.dpi();
    }

    /// The live backend, if any.
    pub fn descriptor(&self) -> Option<&BackendDescriptor> {
        self.live.as_ref().map(|live| &live.descriptor)
    }

    /// The name of the live backend, if any.
    pub fn plugin_name(&self) -> Option<&str> {
        self.descriptor().map(|d| d.plugin_name.as_str())
    }

    /// The live backend's metadata, if any.
    pub fn metadata(&self) -> Option<BackendMetadata> {
        self.live.as_ref().map(|live| live.backend.metadata())
    }

    /// The border size recommended by the live backend, if any.
    pub fn recommended_border_size(&self) -> Option<&str> {
        self.descriptor()?.recommended_border_size.as_deref()
    }

    /// Whether the live backend asks for blur.
    pub fn blur(&self) -> bool {
        self.descriptor().is_some_and(|d| d.declared_blur_hint)
    }

    /// The current theme name, for themeable backends.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// The current theme id.
    pub fn theme_id(&self) -> i32 {
        self.theme_id
    }

    /// The current DPI.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// The current title font.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Whether decorations are disabled by configuration.
    pub fn is_no_plugin(&self) -> bool {
        self.no_plugin
    }

    /// Whether decoration buttons show tooltips.
    pub fn show_tooltips(&self) -> bool {
        self.show_tooltips
    }

    /// Whether windows are currently decorated.
    pub fn decoration_mode(&self) -> DecorationMode {
        self.mode
    }

    /// A human-readable report of the live backend and the current settings.
    pub fn support_information(&self, settings: &DecorationSettings) -> String {
        let mut b = String::new();
        b.push_str(&format!("Plugin: {}\n", self.plugin_name().unwrap_or_default()));
        b.push_str(&format!("Theme: {}\n", self.theme().unwrap_or_default()));
        b.push_str(&format!(
            "Plugin recommends border size: {}\n",
            self.recommended_border_size().unwrap_or("No")
        ));
        b.push_str(&format!("Blur: {}\n", self.blur()));
        for key in settings.keys() {
            if let Some(value) = settings.describe(key) {
                b.push_str(&format!("{}: {}\n", key, value));
            }
        }
        b
    }
}

fn redecorate_all(workspace: &dyn Workspace) {
    for window in workspace.windows() {
        workspace.request_redecorate(window.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys::{unsafe_plugin_key, COMPOSITING_SECTION, DECORATION_SECTION};
    use crate::config::MemoryConfig;
    use crate::decoration::BorderSize;
    use crate::decoration::buttons::{default_buttons_left, default_buttons_right};
    use crate::platform::{MemoryProperties, TestWorkspace};
    use crate::shadow::ShadowCache;
    use builtin::{UkuiBackend, AURORAE_DEFAULT_THEME};

    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    #[derive(std::fmt::Debug)]
    struct NamedBackend(&'static str);

    impl DecorationBackend for NamedBackend {
        fn metadata(&self) -> BackendMetadata {
            BackendMetadata {
                blur: true,
                recommended_border_size: Some("Large".into()),
                ..Default::default()
            }
        }

        fn create_decoration(
            &self,
            window: &DecoratedWindow,
            params: &DecorationParams,
            ctx: &DecorationContext<'_>,
        ) -> Option<Box<dyn Decoration>> {
            UkuiBackend.create_decoration(window, params, ctx)
        }
    }

    fn registry(loads: &Rc<Cell<usize>>) -> PluginRegistry {
        let mut registry = PluginRegistry::with_builtins();
        let counter = Rc::clone(loads);
        registry.register("pluginA", move || {
            counter.set(counter.get() + 1);
            Ok(Box::new(NamedBackend("pluginA")))
        });
        registry.register("pluginB", || Err(DecorError::PluginLoad {
            name: "pluginB".into(),
            reason: "missing symbol".into(),
        }));
        registry
    }

    fn bridge_with(config: MemoryConfig) -> (DecorationBridge, Signals, Rc<Cell<usize>>) {
        let loads = Rc::new(Cell::new(0));
        let signals = Signals::new();
        let bridge = DecorationBridge::new(registry(&loads), SharedConfig::new(config), signals.clone());
        (bridge, signals, loads)
    }

    fn create(bridge: &DecorationBridge) -> Option<Box<dyn Decoration>> {
        let props = MemoryProperties::new();
        let shadows = Arc::new(ShadowCache::new());
        let (left, right) = (default_buttons_left(), default_buttons_right());
        let ctx = DecorationContext {
            properties: &props,
            shadows: &shadows,
            buttons_left: &left,
            buttons_right: &right,
            border_size: BorderSize::Normal,
        };
        bridge.create_decoration(&DecoratedWindow::new(1, 800, 600), &ctx)
    }

    #[test_log::test]
    fn test_init_uses_default_plugin() {
        let (mut bridge, signals, _) = bridge_with(MemoryConfig::new());
        bridge.init(&SessionEnv::default());

        assert_eq!(bridge.plugin_name(), Some(DEFAULT_PLUGIN));
        assert_eq!(bridge.decoration_mode(), DecorationMode::Server);
        assert_eq!(
            signals.drain(),
            vec![Signal::DecorationModeChanged(DecorationMode::Server), Signal::MetadataReloaded]
        );
        // the load cleared its unsafe flag on the way out
        let unsafe_flag = bridge.options.config().read(COMPOSITING_SECTION, &unsafe_plugin_key(DEFAULT_PLUGIN));
        assert_eq!(unsafe_flag.as_deref(), Some("false"));
    }

    #[test_log::test]
    fn test_init_falls_back() {
        let config = MemoryConfig::new()
            .with_entry(DECORATION_SECTION, "library", "pluginB")
            .with_entry(COMPOSITING_SECTION, &unsafe_plugin_key(DEFAULT_PLUGIN), true);
        let (mut bridge, _, _) = bridge_with(config);
        bridge.init(&SessionEnv::default());

        // pluginB fails, the default is flagged unsafe, so the fallback is used
        assert_eq!(bridge.plugin_name(), Some(FALLBACK_PLUGIN));
        assert_eq!(bridge.theme(), Some(AURORAE_DEFAULT_THEME));
        assert_eq!(bridge.params().theme.as_deref(), Some(AURORAE_DEFAULT_THEME));
    }

    #[test]
    fn test_init_no_plugin() {
        let config = MemoryConfig::new().with_entry(DECORATION_SECTION, "NoPlugin", true);
        let (mut bridge, signals, loads) = bridge_with(config);
        bridge.init(&SessionEnv::default());

        assert!(bridge.is_no_plugin());
        assert_eq!(bridge.decoration_mode(), DecorationMode::None);
        assert!(create(&bridge).is_none());

        // an explicit reload does not bring decorations back
        assert!(matches!(bridge.reload("pluginA"), Err(DecorError::NoPlugin)));
        assert_eq!(bridge.decoration_mode(), DecorationMode::None);
        assert!(bridge.plugin_name().is_none());
        assert_eq!(loads.get(), 0);
        assert!(signals.drain().is_empty());
    }

    #[test]
    fn test_init_all_fail() {
        let (mut bridge, _, _) = bridge_with(MemoryConfig::new());
        bridge.registry = PluginRegistry::new();
        bridge.init(&SessionEnv::default());

        assert!(bridge.plugin_name().is_none());
        assert_eq!(bridge.decoration_mode(), DecorationMode::None);
        assert!(create(&bridge).is_none());
    }

    #[test]
    fn test_reload_same_name_is_idempotent() {
        let (mut bridge, signals, loads) = bridge_with(MemoryConfig::new());

        bridge.reload("pluginA").expect("pluginA failed to load");
        assert_eq!(loads.get(), 1);
        signals.drain();

        bridge.reload("pluginA").expect("reloading pluginA failed");
        bridge.reload("pluginA").expect("reloading pluginA failed");

        assert_eq!(loads.get(), 1);
        assert!(!signals.drain().contains(&Signal::MetadataReloaded));
    }

    #[test_log::test]
    fn test_failed_reload_keeps_live_backend() {
        let (mut bridge, signals, _) = bridge_with(MemoryConfig::new());

        bridge.reload("pluginA").expect("pluginA failed to load");
        signals.drain();

        let err = bridge.reload("pluginB").expect_err("pluginB should not load");
        assert!(matches!(err, DecorError::PluginLoad { .. }));
        assert!(matches!(bridge.reload("nonexistent"), Err(DecorError::PluginNotFound(_))));

        assert_eq!(bridge.plugin_name(), Some("pluginA"));
        assert!(bridge.blur());
        assert!(signals.drain().is_empty());
        assert!(create(&bridge).is_some());
    }

    #[test]
    fn test_reconfigure() {
        let config = SharedConfig::new(MemoryConfig::new());
        let loads = Rc::new(Cell::new(0));
        let signals = Signals::new();
        let mut bridge = DecorationBridge::new(registry(&loads), config.clone(), signals.clone());
        let ws = TestWorkspace::new(vec![
            DecoratedWindow::new(1, 100, 100),
            DecoratedWindow::new(2, 100, 100),
        ]);
        bridge.init(&SessionEnv::default());

        // nothing changed
        bridge.reconfigure(&ws).expect("reconfigure failed");
        assert!(ws.take_redecorated().is_empty());

        // plugin changed
        config.write(DECORATION_SECTION, "library", FALLBACK_PLUGIN);
        bridge.reconfigure(&ws).expect("reconfigure failed");
        assert_eq!(bridge.plugin_name(), Some(FALLBACK_PLUGIN));
        assert_eq!(ws.take_redecorated(), vec![1, 2]);

        // theme changed
        signals.drain();
        config.write(DECORATION_SECTION, "theme", "plastik");
        bridge.reconfigure(&ws).expect("reconfigure failed");
        assert_eq!(bridge.theme(), Some("plastik"));
        assert_eq!(signals.drain(), vec![Signal::ThemeChanged(Some("plastik".into()))]);
        assert_eq!(ws.take_redecorated(), vec![1, 2]);

        // broken plugin configured
        config.write(DECORATION_SECTION, "library", "pluginB");
        assert!(bridge.reconfigure(&ws).is_err());
        assert_eq!(bridge.plugin_name(), Some(FALLBACK_PLUGIN));
        assert!(ws.take_redecorated().is_empty());

        // decorations disabled, then enabled again
        config.write(DECORATION_SECTION, "NoPlugin", true);
        bridge.reconfigure(&ws).expect("reconfigure failed");
        assert_eq!(bridge.decoration_mode(), DecorationMode::None);
        assert!(bridge.plugin_name().is_none());
        assert_eq!(ws.take_redecorated(), vec![1, 2]);

        config.write(DECORATION_SECTION, "NoPlugin", false);
        config.write(DECORATION_SECTION, "library", "pluginA");
        bridge.reconfigure(&ws).expect("reconfigure failed");
        assert_eq!(bridge.plugin_name(), Some("pluginA"));
        assert_eq!(bridge.decoration_mode(), DecorationMode::Server);
    }

    #[test]
    fn test_session_parameters() {
        let (mut bridge, _, _) = bridge_with(MemoryConfig::new());
        let env = SessionEnv {
            primary_dpi: Some(10),
            style_name: Some("ukui-dark".into()),
            ..Default::default()
        };
        bridge.init(&env);

        assert_eq!(bridge.dpi(), 30);
        assert_eq!(bridge.theme_id(), 1);

        bridge.theme_changed(0);
        bridge.font_changed("Sans", 11);
        bridge.dpi_changed(144);
        let params = bridge.params();
        assert_eq!(params.theme_id, 0);
        assert_eq!(params.font_family, "Sans");
        assert_eq!(params.font_size, 11);
        assert_eq!(params.dpi, 144);
    }

    #[test]
    fn test_support_information() {
        let (mut bridge, _, _) = bridge_with(MemoryConfig::new());
        bridge.reload("pluginA").expect("pluginA failed to load");
        let settings = DecorationSettings::new(bridge.options.config().clone(), Signals::new());

        let info = bridge.support_information(&settings);
        assert!(info.starts_with("Plugin: pluginA\nTheme: \n"));
        assert!(info.contains("Plugin recommends border size: Large\n"));
        assert!(info.contains("Blur: true\n"));
        assert!(info.contains("buttons_right: ContextHelp, Minimize, Maximize, Close\n"));
    }
}
