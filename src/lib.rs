//! # wmdecor - window decorations for a compositing window manager
//!
//! wmdecor is the decoration layer of a window manager: it draws the borders, titlebars,
//! buttons and drop shadows around client windows, and it loads the decoration backend
//! that decides what those look like. It does not talk to the display server itself;
//! the window manager supplies the handful of collaborators wmdecor needs through the
//! traits in [`platform`], and feeds it [`Event`]s as things change.
//!
//! ## Design
//!
//! The crate revolves around a single process-scoped context, the [`DecorationManager`],
//! which owns everything with process lifetime:
//!
//! - the [`DecorationBridge`], which discovers, loads and hot-swaps the decoration
//!   backend through a name-keyed [`PluginRegistry`][1],
//! - the [`ShadowCache`] and [`CornerTextureCache`], which memoize rasterized shadows
//!   and rounded-corner masks so that every distinct shape is only rasterized once,
//! - the [`DecorationSettings`] facade, a recomputed-wholesale view of the button
//!   layout, border size policy and title font, and
//! - one [`Decoration`] per decorated window, created by the live backend.
//!
//! There are no ambient globals: each of these is passed explicitly to whatever
//! needs it. The caches are reference counted and internally synchronized, so that
//! every decoration can hold on to the same shadow without copying pixel data.
//!
//! ### Event Flow
//!
//! All work happens synchronously on the thread that delivers events. The window manager
//! hands an [`Event`] to [`DecorationManager::handle_event`], which routes it to its
//! recipients (the bridge, the settings facade, and one or all decorations), and then
//! flushes any resulting [`Signal`]s to the listeners connected on the manager's
//! [`Signals`] bus.
//!
//! The only other thread wmdecor ever spawns is the freeze watchdog that guards backend
//! initialization; see [`bridge::watchdog`].
//!
//! [1]: crate::bridge::PluginRegistry

#![warn(
    missing_debug_implementations,
    missing_docs
)]

#[macro_use]
extern crate bitflags;

#[macro_use]
mod log;

pub mod config;
pub mod core;
pub mod platform;
pub mod shadow;
pub mod bridge;
pub mod decoration;
pub mod settings;
pub mod manager;

pub use crate::core::types;
#[doc(inline)]
pub use crate::manager::{DecorationManager, Event, Signal, Signals};
#[doc(inline)]
pub use crate::bridge::DecorationBridge;
#[doc(inline)]
pub use crate::decoration::{Decoration, WindowDecorationState};
#[doc(inline)]
pub use crate::settings::DecorationSettings;
#[doc(inline)]
pub use crate::shadow::{ShadowCache, CornerTextureCache, ShapeKey};

use thiserror::Error;

/// Everything that could possibly go wrong in the decoration layer.
///
/// Most failures in this crate are recovered locally by falling back to a
/// documented default, and never reach the caller. The ones that do are
/// listed here.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DecorError {
    /// No plugin with this name is registered.
    #[error("no decoration plugin named {0}")]
    PluginNotFound(String),

    /// The plugin was found, but its loader failed.
    #[error("failed to load decoration plugin {name}: {reason}")]
    PluginLoad {
        /// The plugin that failed to load.
        name: String,
        /// Why it failed.
        reason: String,
    },

    /// Decorations are disabled by configuration.
    #[error("decorations are disabled")]
    NoPlugin,

    /// A plugin was previously marked unsafe after hanging during initialization.
    #[error("decoration plugin {0} hung during initialization and is marked unsafe")]
    HangDuringPluginInit(String),
}

/// The general result type used by wmdecor.
pub type Result<T> = ::core::result::Result<T, DecorError>;
