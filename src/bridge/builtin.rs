//! Backends built into wmdecor.

use crate::decoration::{Decoration, DecorationContext, DecorationParams, WindowDecorationState};
use crate::platform::DecoratedWindow;

use super::backend::{BackendMetadata, DecorationBackend, PluginRegistry};

/// The name of the native backend.
pub const UKUI_PLUGIN: &str = "org.ukui.kwin.ukui";
/// The name of the themeable fallback backend.
pub const AURORAE_PLUGIN: &str = "org.ukui.kwin.aurorae";

/// The default theme of the themeable backend.
pub const AURORAE_DEFAULT_THEME: &str = "__aurorae__svg__ukui";

/// Registers every built-in backend.
pub fn register_all(registry: &mut PluginRegistry) {
    registry.register(UKUI_PLUGIN, || Ok(Box::new(UkuiBackend)));
    registry.register(AURORAE_PLUGIN, || Ok(Box::new(AuroraeBackend)));
}

/// The native backend.
///
/// Its decorations have fixed side borders and ignore the configured
/// border size.
#[derive(Debug, Clone, Copy, Default)]
pub struct UkuiBackend;

impl DecorationBackend for UkuiBackend {
    fn metadata(&self) -> BackendMetadata {
        BackendMetadata::default()
    }

    fn create_decoration(
        &self,
        window: &DecoratedWindow,
        params: &DecorationParams,
        ctx: &DecorationContext<'_>,
    ) -> Option<Box<dyn Decoration>> {
        Some(Box::new(WindowDecorationState::new(window, params, ctx)))
    }
}

/// The themeable fallback backend.
///
/// Its decorations follow the configured border size.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuroraeBackend;

impl DecorationBackend for AuroraeBackend {
    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            blur: false,
            recommended_border_size: Some("Normal".into()),
            themes: true,
            default_theme: Some(AURORAE_DEFAULT_THEME.into()),
        }
    }

    fn create_decoration(
        &self,
        window: &DecoratedWindow,
        params: &DecorationParams,
        ctx: &DecorationContext<'_>,
    ) -> Option<Box<dyn Decoration>> {
        Some(Box::new(WindowDecorationState::new_sized(window, params, ctx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = PluginRegistry::with_builtins();

        assert_eq!(registry.names().collect::<Vec<_>>(), vec![UKUI_PLUGIN, AURORAE_PLUGIN]);
        let aurorae = registry.load(AURORAE_PLUGIN).expect("aurorae failed to load");
        assert_eq!(aurorae.metadata().default_theme.as_deref(), Some(AURORAE_DEFAULT_THEME));
        assert!(registry.load("org.kde.breeze").is_err());
    }
}
