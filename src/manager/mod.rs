//! The process-wide decoration context.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::instrument;
use tracing::{debug, warn};

use crate::bridge::watchdog::FreezeHandler;
use crate::bridge::{DecorationBridge, DecorationMode, PluginRegistry};
use crate::config::SharedConfig;
use crate::decoration::{Decoration, DecorationContext, DecorationEvent, Update};
use crate::platform::{DecoratedWindow, PropertyStore, SessionEnv, Workspace};
use crate::settings::DecorationSettings;
use crate::shadow::{CornerTextureCache, PixelBuffer, ShadowCache};
use crate::types::WindowId;

mod event;

#[doc(inline)]
pub use event::{Event, Signal, Signals, Listener};

/// Owns everything the decoration layer keeps for the lifetime of the process,
/// and routes [`Event`]s to it.
///
/// # Event Routing
///
/// Every event has an explicit set of recipients:
///
/// | Event | Recipients |
/// |---|---|
/// | window events | that window's decoration |
/// | theme and font changes | the bridge, the settings, every decoration |
/// | DPI changes | the bridge, then both caches are flushed and every window is redecorated |
/// | configuration reloads | the bridge, then the settings |
/// | backend metadata reloads | the settings |
///
/// Whatever the recipients report back is turned into [`Signal`]s, which are
/// delivered to the listeners connected with [`connect`](Self::connect)
/// once the event has been fully handled.
#[derive(Debug)]
pub struct DecorationManager {
    config: SharedConfig,
    env: SessionEnv,
    bridge: DecorationBridge,
    shadows: Arc<ShadowCache>,
    corners: Arc<CornerTextureCache>,
    settings: DecorationSettings,
    properties: Box<dyn PropertyStore>,
    decorations: IndexMap<WindowId, Box<dyn Decoration>>,
    signals: Signals,
}

impl DecorationManager {
    /// Creates a new manager.
    ///
    /// No backend is loaded and nothing is decorated until
    /// [`init`](Self::init) is called.
    pub fn new<P>(registry: PluginRegistry, config: SharedConfig, properties: P) -> Self
    where
        P: PropertyStore + 'static,
    {
        let signals = Signals::new();
        Self {
            bridge: DecorationBridge::new(registry, config.clone(), signals.clone()),
            settings: DecorationSettings::new(config.clone(), signals.clone()),
            config,
            env: SessionEnv::default(),
            shadows: Arc::new(ShadowCache::new()),
            corners: Arc::new(CornerTextureCache::new()),
            properties: Box::new(properties),
            decorations: IndexMap::new(),
            signals,
        }
    }

    /// Replaces the timeout and handler of the watchdog guarding backend loads.
    pub fn with_watchdog(mut self, timeout: Duration, on_freeze: FreezeHandler) -> Self {
        self.bridge = self.bridge.with_watchdog(timeout, on_freeze);
        self
    }

    /// Loads the backend, computes the settings, and decorates every window
    /// in `workspace`.
    pub fn init(&mut self, env: SessionEnv, workspace: &dyn Workspace) {
        self.bridge.init(&env);
        self.settings.theme_changed(env.theme_id());
        self.env = env;
        self.recompute_settings(workspace);
        self.sync_font();

        for window in workspace.windows() {
            self.decorate(&window);
        }
        self.signals.flush();
    }

    /// Creates a decoration for `window` with the live backend, replacing
    /// any decoration it already has.
    ///
    /// Returns whether the window is now decorated.
    pub fn decorate(&mut self, window: &DecoratedWindow) -> bool {
        let ctx = DecorationContext {
            properties: &*self.properties,
            shadows: &self.shadows,
            buttons_left: self.settings.buttons_left(),
            buttons_right: self.settings.buttons_right(),
            border_size: self.settings.border_size(),
        };

        match self.bridge.create_decoration(window, &ctx) {
            Some(deco) => {
                if deco.shadow().is_some() {
                    self.signals.emit(Signal::ShadowUpdated(window.id));
                }
                self.signals.emit(Signal::RepaintRequested(window.id));
                self.decorations.insert(window.id, deco);
                true
            }
            None => {
                self.decorations.shift_remove(&window.id);
                false
            }
        }
    }

    /// Removes the decoration of a window, returning it.
    pub fn undecorate(&mut self, id: WindowId) -> Option<Box<dyn Decoration>> {
        self.decorations.shift_remove(&id)
    }

    /// Handles an event, then delivers any resulting signals.
    #[instrument(level = "debug", skip(self, workspace))]
    pub fn handle_event(&mut self, event: Event, workspace: &dyn Workspace) {
        use Event::*;

        match event {
            ThemeChanged(id) => {
                self.bridge.theme_changed(id);
                self.settings.theme_changed(id);
                self.broadcast(&DecorationEvent::ThemeChanged(id));
            }
            FontChanged { family, size } => {
                self.settings.font_changed(&family, size);
                self.sync_font();
                let font = self.settings.font().clone();
                self.broadcast(&DecorationEvent::FontChanged(font));
            }
            DpiChanged(dpi) => {
                self.bridge.dpi_changed(dpi);
                self.env.primary_dpi = Some(dpi);
                self.flush_caches();
                self.redecorate(workspace);
            }
            WindowResized { window, width, height } => {
                self.dispatch(window, &DecorationEvent::Resized { width, height })
            }
            MaximizedChanged { window, maximized } => {
                self.dispatch(window, &DecorationEvent::MaximizedChanged(maximized))
            }
            ActiveChanged { window, active } => {
                self.dispatch(window, &DecorationEvent::ActiveChanged(active))
            }
            CaptionChanged { window, caption } => {
                self.dispatch(window, &DecorationEvent::CaptionChanged(caption))
            }
            CapabilitiesChanged { window, capabilities } => {
                self.dispatch(window, &DecorationEvent::CapabilitiesChanged(capabilities))
            }
            PointerMoved { window, position } => {
                self.dispatch(window, &DecorationEvent::PointerMoved(position))
            }
            PointerPressed { window, position } => {
                self.dispatch(window, &DecorationEvent::PointerPressed(position))
            }
            PointerReleased { window, position } => {
                self.dispatch(window, &DecorationEvent::PointerReleased(position))
            }
            BackendMetadataReloaded => {
                let size = self.settings.border_size();
                let buttons = self.recompute_settings(workspace);
                if size != self.settings.border_size() {
                    self.redecorate(workspace);
                } else if buttons {
                    self.broadcast_buttons();
                }
            }
            ConfigReloaded => self.reconfigure(workspace),
        }

        self.signals.flush();
    }

    fn reconfigure(&mut self, workspace: &dyn Workspace) {
        let before = self.backend_state();
        if let Err(e) = self.bridge.reconfigure(workspace) {
            warn!("could not apply decoration configuration: {}", e);
        }
        let size = self.settings.border_size();
        let buttons = self.recompute_settings(workspace);

        if before != self.backend_state() {
            debug!("decoration backend changed, redecorating all windows");
            self.flush_caches();
            self.redecorate(workspace);
        } else if size != self.settings.border_size() {
            self.redecorate(workspace);
        } else if buttons {
            self.broadcast_buttons();
        }
    }

    fn backend_state(&self) -> (Option<String>, Option<String>, DecorationMode) {
        (
            self.bridge.plugin_name().map(str::to_string),
            self.bridge.theme().map(str::to_string),
            self.bridge.decoration_mode(),
        )
    }

    /// Recomputes the settings, returning whether the button layout changed.
    fn recompute_settings(&mut self, workspace: &dyn Workspace) -> bool {
        let left = self.settings.buttons_left().to_vec();
        let right = self.settings.buttons_right().to_vec();

        self.settings.recompute(self.bridge.recommended_border_size(), workspace, &self.env);

        left != self.settings.buttons_left() || right != self.settings.buttons_right()
    }

    // new decorations are created with the scaled font the settings hold
    fn sync_font(&mut self) {
        let font = self.settings.font();
        self.bridge.font_changed(&font.family, font.pixel_size);
    }

    fn flush_caches(&self) {
        self.shadows.invalidate_all();
        self.corners.release();
    }

    fn redecorate(&mut self, workspace: &dyn Workspace) {
        for window in workspace.windows() {
            self.decorate(&window);
        }
    }

    fn dispatch(&mut self, id: WindowId, event: &DecorationEvent) {
        let Some(deco) = self.decorations.get_mut(&id) else {
            trace!("window {} is not decorated, dropping {:?}", id, event);
            return
        };
        let update = deco.handle_event(event);
        report(&self.signals, &mut **deco, update);
    }

    fn broadcast(&mut self, event: &DecorationEvent) {
        for deco in self.decorations.values_mut() {
            let update = deco.handle_event(event);
            report(&self.signals, &mut **deco, update);
        }
    }

    fn broadcast_buttons(&mut self) {
        let event = DecorationEvent::ButtonsChanged {
            left: self.settings.buttons_left().to_vec(),
            right: self.settings.buttons_right().to_vec(),
        };
        self.broadcast(&event);
    }

    /// Adds a listener to the signal bus.
    pub fn connect(&self, listener: Listener) {
        self.signals.connect(listener);
    }

    /// The signal bus.
    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    /// The configuration.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// The backend bridge.
    pub fn bridge(&self) -> &DecorationBridge {
        &self.bridge
    }

    /// The decoration settings.
    pub fn settings(&self) -> &DecorationSettings {
        &self.settings
    }

    /// The shadow cache.
    pub fn shadows(&self) -> &Arc<ShadowCache> {
        &self.shadows
    }

    /// The rounded corner mask of the given radius.
    pub fn corner_texture(&self, radius: i32) -> Arc<PixelBuffer> {
        self.corners.get(radius)
    }

    /// The rounded corner mask cache.
    pub fn corner_textures(&self) -> &Arc<CornerTextureCache> {
        &self.corners
    }

    /// The decoration of a window, if it is decorated.
    pub fn decoration(&self, id: WindowId) -> Option<&dyn Decoration> {
        self.decorations.get(&id).map(|deco| &**deco)
    }

    /// Every decoration, in the order they were created.
    pub fn decorations(&self) -> impl Iterator<Item = &dyn Decoration> {
        self.decorations.values().map(|deco| &**deco)
    }

    /// A human-readable report of the backend and the current settings.
    pub fn support_information(&self) -> String {
        self.bridge.support_information(&self.settings)
    }

    /// Dumps the internal state of the manager to stderr.
    pub fn dump_internal_state(&self) {
        eprintln!("============== | INTERNAL STATE DUMP | ==============");
        eprintln!("{:#?}", &self);
        eprintln!("====================| END DUMP |=====================")
    }
}

fn report(signals: &Signals, deco: &mut dyn Decoration, update: Update) {
    let id = deco.window();
    if update.contains(Update::SHADOW) {
        signals.emit(Signal::ShadowUpdated(id));
    }
    if update.intersects(Update::GEOMETRY | Update::REPAINT) {
        signals.emit(Signal::RepaintRequested(id));
    }
    if update.contains(Update::ACTION) {
        if let Some(button) = deco.take_action() {
            signals.emit(Signal::ButtonClicked { window: id, button });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DEFAULT_PLUGIN;
    use crate::config::keys::{BUTTONS_ON_RIGHT, DECORATION_SECTION, NO_PLUGIN};
    use crate::config::MemoryConfig;
    use crate::decoration::{ButtonType, Side, WindowDecorationState};
    use crate::listener;
    use crate::platform::{MemoryProperties, TestWorkspace};
    use crate::types::Point;

    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        manager: DecorationManager,
        workspace: TestWorkspace,
        seen: Rc<RefCell<Vec<Signal>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let config = SharedConfig::new(MemoryConfig::new());
            let mut manager = DecorationManager::new(
                PluginRegistry::with_builtins(),
                config,
                MemoryProperties::new(),
            );
            let workspace = TestWorkspace::new(vec![
                DecoratedWindow::new(1, 800, 600).with_caption("one"),
                DecoratedWindow::new(2, 640, 480).with_caption("two"),
            ]);

            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&seen);
            manager.connect(listener!(move |sig| {
                sink.borrow_mut().push(sig.clone());
            }));

            manager.init(SessionEnv::default(), &workspace);
            Self { manager, workspace, seen }
        }

        fn handle(&mut self, event: Event) -> Vec<Signal> {
            self.seen.borrow_mut().clear();
            self.manager.handle_event(event, &self.workspace);
            self.seen.borrow().clone()
        }

        fn state(&self, id: WindowId) -> &WindowDecorationState {
            self.manager
                .decoration(id)
                .and_then(|deco| deco.as_any().downcast_ref::<WindowDecorationState>())
                .expect("window is not decorated by the native backend")
        }
    }

    #[test_log::test]
    fn test_init_decorates_everything() {
        let fx = Fixture::new();

        assert_eq!(fx.manager.bridge().plugin_name(), Some(DEFAULT_PLUGIN));
        assert_eq!(fx.manager.decorations().count(), 2);

        let seen = fx.seen.borrow();
        assert!(seen.contains(&Signal::MetadataReloaded));
        assert!(seen.contains(&Signal::Reconfigured));
        assert!(seen.contains(&Signal::ShadowUpdated(2)));

        // both windows are inactive chrome, so they share one shadow
        assert_eq!(fx.manager.shadows().rasterizations(), 1);
        let one = fx.manager.decoration(1).and_then(|d| d.shadow()).expect("no shadow");
        let two = fx.manager.decoration(2).and_then(|d| d.shadow()).expect("no shadow");
        assert!(Arc::ptr_eq(one, two));
    }

    #[test]
    fn test_window_events_reach_one_decoration() {
        let mut fx = Fixture::new();

        let signals = fx.handle(Event::ActiveChanged { window: 1, active: true });
        assert!(signals.contains(&Signal::ShadowUpdated(1)));
        assert!(!signals.contains(&Signal::ShadowUpdated(2)));
        assert!(fx.state(1).is_active());
        assert!(!fx.state(2).is_active());

        let signals = fx.handle(Event::MaximizedChanged { window: 2, maximized: true });
        assert_eq!(signals, vec![Signal::RepaintRequested(2)]);
        assert_eq!(fx.manager.decoration(2).map(|d| d.borders().left), Some(0));

        // unknown windows are ignored
        assert!(fx.handle(Event::CaptionChanged { window: 9, caption: "nine".into() }).is_empty());
    }

    #[test]
    fn test_button_click() {
        let mut fx = Fixture::new();
        let close = Point::new(770, 10);

        fx.handle(Event::PointerPressed { window: 1, position: close });
        let signals = fx.handle(Event::PointerReleased { window: 1, position: close });

        assert!(signals.contains(&Signal::ButtonClicked { window: 1, button: ButtonType::Close }));
    }

    #[test]
    fn test_theme_and_font_reach_everything() {
        let mut fx = Fixture::new();

        fx.handle(Event::ThemeChanged(1));
        fx.handle(Event::ThemeChanged(0));
        fx.handle(Event::FontChanged { family: "Sans".into(), size: 12 });

        assert_eq!(fx.manager.settings().theme_id(), 0);
        assert_eq!(fx.manager.bridge().theme_id(), 0);
        for id in [1, 2] {
            assert_eq!(fx.state(id).theme_id(), 0);
            assert_eq!(fx.state(id).font().family, "Sans");
        }
    }

    #[test]
    fn test_dpi_change_redecorates() {
        let mut fx = Fixture::new();
        let before = Arc::clone(fx.manager.decoration(1).and_then(|d| d.shadow()).expect("no shadow"));

        fx.handle(Event::DpiChanged(192));

        assert_eq!(fx.manager.bridge().dpi(), 192);
        assert_eq!(fx.manager.decoration(1).map(|d| d.borders().top), Some(76));
        let after = fx.manager.decoration(1).and_then(|d| d.shadow()).expect("no shadow");
        assert!(!Arc::ptr_eq(&before, after));
    }

    #[test]
    fn test_config_reload_buttons() {
        let mut fx = Fixture::new();
        fx.manager.config().write(DECORATION_SECTION, BUTTONS_ON_RIGHT, "X");

        let signals = fx.handle(Event::ConfigReloaded);

        assert!(signals.contains(&Signal::ButtonsRightChanged(vec![ButtonType::Close])));
        assert_eq!(fx.state(1).buttons(Side::Right).len(), 1);
        assert_eq!(fx.state(2).buttons(Side::Right).len(), 1);
    }

    #[test]
    fn test_config_reload_no_plugin() {
        let mut fx = Fixture::new();
        fx.manager.config().write(DECORATION_SECTION, NO_PLUGIN, true);

        let signals = fx.handle(Event::ConfigReloaded);

        assert!(signals.contains(&Signal::DecorationModeChanged(DecorationMode::None)));
        assert_eq!(fx.manager.decorations().count(), 0);
        assert_eq!(fx.workspace.take_redecorated(), vec![1, 2]);
    }

    #[test]
    fn test_undecorate_and_support_info() {
        let mut fx = Fixture::new();

        assert!(fx.manager.undecorate(2).is_some());
        assert!(fx.manager.decoration(2).is_none());
        assert!(fx.manager.undecorate(2).is_none());

        let info = fx.manager.support_information();
        assert!(info.starts_with(&format!("Plugin: {}\n", DEFAULT_PLUGIN)));
        assert!(info.contains("Plugin recommends border size: No\n"));

        let corner = fx.manager.corner_texture(6);
        assert!(Arc::ptr_eq(&corner, &fx.manager.corner_texture(6)));
    }
}
