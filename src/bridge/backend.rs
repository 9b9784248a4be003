//! Decoration backends and the registry they are looked up in.

use std::fmt::Debug;

use indexmap::IndexMap;
use tracing::debug;

use crate::decoration::{Decoration, DecorationContext, DecorationParams};
use crate::platform::DecoratedWindow;
use crate::{DecorError, Result};

/// What a backend declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendMetadata {
    /// Whether decorations should be drawn over a blurred background.
    pub blur: bool,
    /// The border size the backend recommends, by name.
    pub recommended_border_size: Option<String>,
    /// Whether the backend supports themes.
    pub themes: bool,
    /// The theme used when none is configured. Ignored unless `themes` is set.
    pub default_theme: Option<String>,
}

/// The live backend, as seen by the rest of wmdecor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    /// The name the backend was loaded under.
    pub plugin_name: String,
    /// Whether the backend is loaded.
    pub loaded: bool,
    /// Whether the backend asks for blur.
    pub declared_blur_hint: bool,
    /// The border size the backend recommends.
    pub recommended_border_size: Option<String>,
    /// The backend's default theme.
    pub default_theme_name: Option<String>,
}

impl BackendDescriptor {
    /// Describes a freshly loaded backend from its metadata.
    pub fn from_metadata(plugin_name: &str, meta: &BackendMetadata) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            loaded: true,
            declared_blur_hint: meta.blur,
            recommended_border_size: meta.recommended_border_size.clone(),
            default_theme_name: if meta.themes { meta.default_theme.clone() } else { None },
        }
    }
}

/// A decoration backend.
///
/// The backend decides what decorations look like. It is loaded by name from a
/// [`PluginRegistry`], and creates one [`Decoration`] per decorated window.
pub trait DecorationBackend: Debug {
    /// The backend's metadata.
    fn metadata(&self) -> BackendMetadata;

    /// Creates a decoration for `window`.
    ///
    /// Returns None if the backend cannot decorate this window, in which
    /// case the window is left undecorated.
    fn create_decoration(
        &self,
        window: &DecoratedWindow,
        params: &DecorationParams,
        ctx: &DecorationContext<'_>,
    ) -> Option<Box<dyn Decoration>>;
}

/// Loads a backend.
pub type PluginLoader = Box<dyn Fn() -> Result<Box<dyn DecorationBackend>>>;

/// A name-keyed registry of backend loaders.
///
/// Loaders are kept in registration order. Registering a name twice
/// replaces the earlier loader.
#[derive(Default)]
pub struct PluginRegistry {
    loaders: IndexMap<String, PluginLoader>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the backends built into wmdecor.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register_all(&mut registry);
        registry
    }

    /// Registers a loader under `name`.
    pub fn register<F>(&mut self, name: &str, loader: F)
    where
        F: Fn() -> Result<Box<dyn DecorationBackend>> + 'static,
    {
        debug!("registering decoration plugin {}", name);
        self.loaders.insert(name.to_string(), Box::new(loader));
    }

    /// Whether a loader is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }

    /// The registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }

    /// Runs the loader registered under `name`.
    pub fn load(&self, name: &str) -> Result<Box<dyn DecorationBackend>> {
        let Some(loader) = self.loaders.get(name) else {
            return Err(DecorError::PluginNotFound(name.to_string()))
        };
        debug!("trying to load decoration plugin {}", name);
        loader()
    }
}

impl Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.loaders.keys()).finish()
    }
}
