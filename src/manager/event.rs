//! Events flowing into and signals flowing out of the decoration layer.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::bridge::DecorationMode;
use crate::decoration::{BorderSize, ButtonType};
use crate::platform::{Capabilities, Font};
use crate::types::{Point, WindowId};

/// Something that happened in the window manager or the desktop session.
///
/// Events are handed to [`DecorationManager::handle_event`][1], which routes
/// each of them to an explicit set of recipients.
///
/// [1]: super::DecorationManager::handle_event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The desktop theme changed.
    ThemeChanged(i32),
    /// The system title font changed.
    FontChanged {
        /// The font family.
        family: String,
        /// The unscaled font size.
        size: i32,
    },
    /// The DPI of the primary screen changed.
    DpiChanged(u32),
    /// A window was resized.
    WindowResized {
        /// The window.
        window: WindowId,
        /// The new client width.
        width: i32,
        /// The new client height.
        height: i32,
    },
    /// A window was maximized or restored.
    MaximizedChanged {
        /// The window.
        window: WindowId,
        /// Whether it is now maximized.
        maximized: bool,
    },
    /// A window gained or lost focus.
    ActiveChanged {
        /// The window.
        window: WindowId,
        /// Whether it is now focused.
        active: bool,
    },
    /// A window title changed.
    CaptionChanged {
        /// The window.
        window: WindowId,
        /// The new title.
        caption: String,
    },
    /// The operations a window supports changed.
    CapabilitiesChanged {
        /// The window.
        window: WindowId,
        /// The new capabilities.
        capabilities: Capabilities,
    },
    /// The pointer moved over a window's decoration, or left it.
    PointerMoved {
        /// The window.
        window: WindowId,
        /// Where the pointer is, relative to the decoration.
        position: Option<Point>,
    },
    /// A pointer button went down over a window's decoration.
    PointerPressed {
        /// The window.
        window: WindowId,
        /// Where the pointer is, relative to the decoration.
        position: Point,
    },
    /// A pointer button was released over a window's decoration.
    PointerReleased {
        /// The window.
        window: WindowId,
        /// Where the pointer is, relative to the decoration.
        position: Point,
    },
    /// The backend's metadata was reloaded.
    BackendMetadataReloaded,
    /// The configuration was changed on disk and should be re-read.
    ConfigReloaded,
}

impl Event {
    /// The window this event concerns, if it concerns a single window.
    pub fn window(&self) -> Option<WindowId> {
        use Event::*;
        match self {
            WindowResized { window, .. }
            | MaximizedChanged { window, .. }
            | ActiveChanged { window, .. }
            | CaptionChanged { window, .. }
            | CapabilitiesChanged { window, .. }
            | PointerMoved { window, .. }
            | PointerPressed { window, .. }
            | PointerReleased { window, .. } => Some(*window),
            _ => None,
        }
    }
}

/// A notification emitted by the decoration layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A new backend was loaded and its metadata applied.
    MetadataReloaded,
    /// The buttons on the left of the titlebar changed.
    ButtonsLeftChanged(Vec<ButtonType>),
    /// The buttons on the right of the titlebar changed.
    ButtonsRightChanged(Vec<ButtonType>),
    /// The border size changed.
    BorderSizeChanged(BorderSize),
    /// The title font changed.
    FontChanged(Font),
    /// Whether double clicking the menu button closes the window changed.
    CloseOnDoubleClickChanged(bool),
    /// The decoration settings were recomputed.
    Reconfigured,
    /// The theme of the live backend changed.
    ThemeChanged(Option<String>),
    /// Whether windows get server-side decorations changed.
    DecorationModeChanged(DecorationMode),
    /// A window was assigned a different shadow.
    ShadowUpdated(WindowId),
    /// A window's decoration needs repainting.
    RepaintRequested(WindowId),
    /// A decoration button was clicked.
    ButtonClicked {
        /// The window.
        window: WindowId,
        /// The button.
        button: ButtonType,
    },
}

/// A listener on a [`Signals`] bus.
///
/// A `Listener` is just a wrapper around a boxed trait object
/// implementing [`FnMut`]. You would generally create one through
/// the [`listener`](crate::listener) macro.
pub type Listener = Box<dyn FnMut(&Signal)>;

/// Macro for creating a [`Listener`].
///
/// It accepts closure syntax, for example:
///
/// ## Example
/// ```rust
/// use wmdecor::{listener, Signals};
///
/// let signals = Signals::new();
/// signals.connect(listener!(|signal| {
///     println!("got {:?}", signal);
/// }));
/// ```
#[macro_export]
macro_rules! listener {
    (|$sig:ident| $code:tt) => {
        Box::new(|$sig: &$crate::Signal| $code)
        as Box<dyn FnMut(&$crate::Signal)>
    };
    (move |$sig:ident| $code:tt) => {
        Box::new(move |$sig: &$crate::Signal| $code)
        as Box<dyn FnMut(&$crate::Signal)>
    }
}

#[derive(Default)]
struct Bus {
    queue: VecDeque<Signal>,
    listeners: Vec<Listener>,
}

/// A queue of emitted [`Signal`]s and the listeners they are delivered to.
///
/// Emitting only queues a signal. Queued signals are delivered in order when
/// the bus is flushed, which the manager does once at the end of every event.
/// Listeners may emit further signals while being called; these are delivered
/// within the same flush.
///
/// Cloning a `Signals` is shallow: all clones share the same queue and listeners.
#[derive(Clone, Default)]
pub struct Signals {
    bus: Rc<RefCell<Bus>>,
}

impl Signals {
    /// Creates a new bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener.
    pub fn connect(&self, listener: Listener) {
        self.bus.borrow_mut().listeners.push(listener);
    }

    /// Queues a signal for delivery.
    pub fn emit(&self, signal: Signal) {
        trace!("emitting {:?}", signal);
        self.bus.borrow_mut().queue.push_back(signal);
    }

    /// The number of signals waiting to be delivered.
    pub fn pending(&self) -> usize {
        self.bus.borrow().queue.len()
    }

    /// Removes and returns every queued signal without delivering it.
    pub fn drain(&self) -> Vec<Signal> {
        self.bus.borrow_mut().queue.drain(..).collect()
    }

    /// Delivers every queued signal to every listener, returning how
    /// many signals were delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let Some(signal) = self.bus.borrow_mut().queue.pop_front() else {
                break
            };

            // listeners are taken out for the duration of the call so they can emit
            let mut listeners = std::mem::take(&mut self.bus.borrow_mut().listeners);
            for listener in listeners.iter_mut() {
                listener(&signal);
            }

            let mut bus = self.bus.borrow_mut();
            listeners.append(&mut bus.listeners);
            bus.listeners = listeners;
            delivered += 1;
        }
        delivered
    }
}

impl fmt::Debug for Signals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bus = self.bus.borrow();
        f.debug_struct("Signals")
            .field("queue", &bus.queue)
            .field("listeners", &bus.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_delivers_in_order() {
        let signals = Signals::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        signals.connect(listener!(move |sig| {
            sink.borrow_mut().push(sig.clone());
        }));

        signals.emit(Signal::Reconfigured);
        signals.emit(Signal::ShadowUpdated(3));
        assert_eq!(signals.pending(), 2);
        assert!(seen.borrow().is_empty());

        assert_eq!(signals.flush(), 2);
        assert_eq!(*seen.borrow(), vec![Signal::Reconfigured, Signal::ShadowUpdated(3)]);
        assert_eq!(signals.pending(), 0);
    }

    #[test]
    fn test_listeners_can_emit() {
        let signals = Signals::new();
        let bus = signals.clone();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);

        signals.connect(listener!(move |sig| {
            *counter.borrow_mut() += 1;
            if let Signal::MetadataReloaded = sig {
                bus.emit(Signal::Reconfigured);
            }
        }));

        signals.emit(Signal::MetadataReloaded);
        assert_eq!(signals.flush(), 2);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_event_window() {
        assert_eq!(Event::ActiveChanged { window: 4, active: true }.window(), Some(4));
        assert_eq!(Event::ThemeChanged(1).window(), None);
    }
}
