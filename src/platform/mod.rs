//! The window manager's side of the decoration layer.
//!
//! wmdecor does not speak to the display server, and has no model of clients,
//! desktops or screens of its own. Everything it needs to know about the world
//! outside comes through the collaborators in this module:
//!
//! - [`PropertyStore`], for reading and writing per-window properties
//!   such as corner radii and Motif hints,
//! - [`Workspace`], for enumerating windows and asking for them to be
//!   redecorated, and
//! - [`SessionEnv`], a snapshot of session-wide facts such as the screen DPI
//!   and the title font.
//!
//! Each collaborator comes with a simple in-memory implementation, which is
//! what the demo binary and the tests run against.

pub mod property;
pub mod session;
pub mod workspace;

#[doc(inline)]
pub use property::{PropertyStore, WindowProperty, MotifHints, CornerRadii, MemoryProperties, MAX_CORNER_RADIUS};
#[doc(inline)]
pub use session::{SessionEnv, Font};
#[doc(inline)]
pub use workspace::{Workspace, DecoratedWindow, Capabilities, TestWorkspace};
