//! A walk through wmdecor's functionality against in-memory collaborators.
//!
//! A real window manager would implement `PropertyStore` and `Workspace` on top
//! of its display server connection, and feed the manager events as they come
//! in. Here, a handful of windows are decorated and poked at, and the resulting
//! signals are logged.

use std::error::Error;

use tracing::{info, Level};
use tracing_subscriber::{fmt as logger, fmt::format::FmtSpan};

use wmdecor::bridge::PluginRegistry;
use wmdecor::config::keys::{BUTTONS_ON_RIGHT, DECORATION_SECTION};
use wmdecor::config::{MemoryConfig, SharedConfig};
use wmdecor::platform::property::{MWM_DECOR_BORDER, MWM_HINTS_DECORATIONS};
use wmdecor::platform::{
    CornerRadii, DecoratedWindow, MemoryProperties, MotifHints, SessionEnv, TestWorkspace, WindowProperty,
};
use wmdecor::types::Point;
use wmdecor::{listener, DecorationManager, Event};

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    logger::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_max_level(Level::DEBUG)
        .without_time()
        .try_init()?;

    let config = SharedConfig::new(MemoryConfig::new());

    // window 3 draws its own titlebar, with rounded top corners
    let hints = MotifHints {
        flags: MWM_HINTS_DECORATIONS,
        decorations: MWM_DECOR_BORDER,
        ..Default::default()
    };
    let properties = MemoryProperties::new()
        .with(3, WindowProperty::MotifWmHints, &hints.to_raw())
        .with(3, WindowProperty::BorderRadius, &CornerRadii::new(12, 12, 0, 0).to_raw());

    let workspace = TestWorkspace::new(vec![
        DecoratedWindow::new(1, 800, 600).with_caption("terminal"),
        DecoratedWindow::new(2, 1024, 768).with_caption("browser"),
        DecoratedWindow::new(3, 640, 480).with_caption("media player"),
    ]);

    let mut manager = DecorationManager::new(PluginRegistry::with_builtins(), config.clone(), properties);
    manager.connect(listener!(|signal| {
        info!("signal: {:?}", signal);
    }));

    let env = SessionEnv {
        primary_dpi: Some(96),
        style_name: Some("ukui-dark".into()),
        ..Default::default()
    };
    manager.init(env, &workspace);

    let events = vec![
        Event::ActiveChanged { window: 1, active: true },
        Event::MaximizedChanged { window: 2, maximized: true },
        Event::WindowResized { window: 1, width: 900, height: 700 },
        Event::PointerMoved { window: 1, position: Some(Point::new(870, 10)) },
        Event::PointerPressed { window: 1, position: Point::new(870, 10) },
        Event::PointerReleased { window: 1, position: Point::new(870, 10) },
        Event::ThemeChanged(0),
        Event::FontChanged { family: "Noto Sans".into(), size: 13 },
        Event::DpiChanged(192),
    ];
    for event in events {
        manager.handle_event(event, &workspace);
    }

    config.write(DECORATION_SECTION, BUTTONS_ON_RIGHT, "IAX");
    manager.handle_event(Event::ConfigReloaded, &workspace);

    for deco in manager.decorations() {
        info!(
            "window {}: borders {:?}, titlebar {:?}",
            deco.window(),
            deco.borders(),
            deco.title_bar()
        );
    }
    info!(
        "{} shadows rasterized, {} cached",
        manager.shadows().rasterizations(),
        manager.shadows().len()
    );

    print!("{}", manager.support_information());

    Ok(())
}
