//! The window manager's model of its windows, as seen by wmdecor.

use std::cell::RefCell;

use crate::types::WindowId;

bitflags! {
    /// What the user is allowed to do with a window.
    ///
    /// Decoration buttons are only shown for the operations a window supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// The window can be closed.
        const CLOSEABLE = 1 << 0;
        /// The window can be minimized.
        const MINIMIZEABLE = 1 << 1;
        /// The window can be maximized.
        const MAXIMIZEABLE = 1 << 2;
        /// The window can be shaded.
        const SHADEABLE = 1 << 3;
        /// The window provides context help.
        const PROVIDES_CONTEXT_HELP = 1 << 4;
        /// The window exports an application menu.
        const HAS_APPLICATION_MENU = 1 << 5;
        /// The window can be placed on all desktops.
        const ON_ALL_DESKTOPS_AVAILABLE = 1 << 6;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::CLOSEABLE | Capabilities::MINIMIZEABLE | Capabilities::MAXIMIZEABLE
    }
}

/// A snapshot of the window attributes a decoration is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedWindow {
    /// The window's identifier.
    pub id: WindowId,
    /// The client width, excluding decorations.
    pub width: i32,
    /// The client height, excluding decorations.
    pub height: i32,
    /// Whether the window is maximized.
    pub maximized: bool,
    /// Whether the window has input focus.
    pub active: bool,
    /// The window title.
    pub caption: String,
    /// What the user can do with the window.
    pub capabilities: Capabilities,
}

impl DecoratedWindow {
    /// Creates a restored, inactive window with default capabilities.
    pub fn new(id: WindowId, width: i32, height: i32) -> Self {
        Self {
            id,
            width,
            height,
            maximized: false,
            active: false,
            caption: String::new(),
            capabilities: Capabilities::default(),
        }
    }

    /// Builder-style setter for the caption.
    pub fn with_caption<S: Into<String>>(mut self, caption: S) -> Self {
        self.caption = caption.into();
        self
    }

    /// Builder-style setter for the capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// The window manager's workspace: the set of managed windows.
///
/// wmdecor never keeps its own copy of the window list. Whenever it needs
/// to act on every window (for example, after a backend swap), it asks
/// the workspace.
pub trait Workspace {
    /// Every managed window, in stacking order.
    fn windows(&self) -> Vec<DecoratedWindow>;

    /// Finds the first window matching `pred`.
    fn find_window(&self, pred: &dyn Fn(&DecoratedWindow) -> bool) -> Option<DecoratedWindow> {
        self.windows().into_iter().find(|w| pred(w))
    }

    /// Asks the window manager to throw away the decoration of `window`
    /// and decorate it afresh.
    fn request_redecorate(&self, window: WindowId);

    /// The number of virtual desktops.
    fn desktop_count(&self) -> usize {
        1
    }

    /// Whether a compositor is active.
    fn compositing(&self) -> bool {
        true
    }
}

/// A [`Workspace`] backed by a plain list of windows.
///
/// Redecoration requests are recorded rather than acted upon.
#[derive(Debug, Default)]
pub struct TestWorkspace {
    /// The managed windows.
    pub windows: Vec<DecoratedWindow>,
    /// The number of virtual desktops.
    pub desktops: usize,
    /// Whether a compositor is active.
    pub compositing: bool,
    redecorated: RefCell<Vec<WindowId>>,
}

impl TestWorkspace {
    /// Creates a new workspace with a single desktop and compositing enabled.
    pub fn new(windows: Vec<DecoratedWindow>) -> Self {
        Self {
            windows,
            desktops: 1,
            compositing: true,
            redecorated: RefCell::new(Vec::new()),
        }
    }

    /// Drains the redecoration requests made so far.
    pub fn take_redecorated(&self) -> Vec<WindowId> {
        self.redecorated.take()
    }
}

impl Workspace for TestWorkspace {
    fn windows(&self) -> Vec<DecoratedWindow> {
        self.windows.clone()
    }

    fn request_redecorate(&self, window: WindowId) {
        self.redecorated.borrow_mut().push(window);
    }

    fn desktop_count(&self) -> usize {
        self.desktops
    }

    fn compositing(&self) -> bool {
        self.compositing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_window() {
        let ws = TestWorkspace::new(vec![
            DecoratedWindow::new(1, 100, 100).with_caption("terminal"),
            DecoratedWindow::new(2, 300, 200).with_caption("browser"),
        ]);

        let found = ws.find_window(&|w| w.caption == "browser");
        assert_eq!(found.map(|w| w.id), Some(2));
        assert!(ws.find_window(&|w| w.width > 1000).is_none());
    }

    #[test]
    fn test_redecorate_requests_are_recorded() {
        let ws = TestWorkspace::new(vec![DecoratedWindow::new(7, 10, 10)]);

        for w in ws.windows() {
            ws.request_redecorate(w.id);
        }
        assert_eq!(ws.take_redecorated(), vec![7]);
        assert!(ws.take_redecorated().is_empty());
    }
}
