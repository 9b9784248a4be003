//! Types and helpers for reading and writing decoration configuration.
//!
//! wmdecor never touches configuration files itself. Instead, it reads and writes
//! section-scoped string keys through the [`ConfigStore`] trait, and converts
//! them into typed values with [`ConfigGroup`], falling back to a documented
//! default whenever a key is missing or holds a value that does not parse.
//!
//! The keys wmdecor understands, along with their defaults, live in [`keys`].

mod section;
mod store;

pub mod keys;

#[doc(inline)]
pub use section::ConfigSection;
#[doc(inline)]
pub use store::{ConfigStore, ConfigGroup, MemoryConfig, SharedConfig};
