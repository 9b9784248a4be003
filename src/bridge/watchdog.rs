//! Freeze protection for backend initialization.
//!
//! Some backends talk to the graphics driver while they initialize, and a
//! broken driver can hang that forever. Since a hung window manager is worse
//! than a crashed one, every backend load is bracketed by [`SafePoint`]s of a
//! [`FreezeWatchdog`]:
//!
//! - At [`SafePoint::PreInit`], the backend is flagged as unsafe in the
//!   configuration, and the watchdog is armed.
//! - At [`SafePoint::PostInit`], the flag is cleared again, and the watchdog is
//!   disarmed.
//!
//! If the watchdog is not disarmed within its timeout, it assumes the load has
//! hung: it persists the unsafe flag (in case the hang corrupted the earlier
//! write), logs an error, and calls its freeze handler, which by default aborts
//! the process. On the next start, the bridge sees the flag and skips the backend.
//!
//! The watchdog runs on its own thread, which is the only thread wmdecor spawns.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::keys::{unsafe_plugin_key, COMPOSITING_SECTION};
use crate::config::SharedConfig;

/// How long a backend may take to initialize before it is considered hung.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Called on the watchdog thread when a freeze is detected, with the name
/// of the backend that froze.
pub type FreezeHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// The default freeze handler: aborts the process.
pub fn abort_on_freeze() -> FreezeHandler {
    Arc::new(|plugin| {
        error!("aborting after freeze in initialization of {}", plugin);
        std::process::abort()
    })
}

/// Points in a guarded operation at which the watchdog is notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafePoint {
    /// Initialization is about to start.
    PreInit,
    /// A guarded frame is about to start.
    PreFrame,
    /// Initialization finished.
    PostInit,
    /// A guarded frame finished.
    PostFrame,
    /// No more frames will be guarded; the watchdog thread exits.
    PostLastGuardedFrame,
}

enum Command {
    Arm,
    Disarm,
    Quit,
}

/// Guards a backend against freezing during initialization.
pub struct FreezeWatchdog {
    plugin: String,
    config: SharedConfig,
    timeout: Duration,
    on_freeze: FreezeHandler,
    worker: Option<(Sender<Command>, JoinHandle<()>)>,
}

impl FreezeWatchdog {
    /// Creates a watchdog for `plugin`. No thread is spawned until the
    /// first PreInit or PreFrame.
    pub fn new(plugin: &str, config: SharedConfig, timeout: Duration, on_freeze: FreezeHandler) -> Self {
        Self {
            plugin: plugin.to_string(),
            config,
            timeout,
            on_freeze,
            worker: None,
        }
    }

    /// Notifies the watchdog that a safe point was reached.
    pub fn safe_point(&mut self, point: SafePoint) {
        match point {
            SafePoint::PreInit => {
                self.persist_unsafe(true);
                self.arm();
            }
            SafePoint::PreFrame => self.arm(),
            SafePoint::PostInit => {
                self.persist_unsafe(false);
                self.send(Command::Disarm);
            }
            SafePoint::PostFrame => self.send(Command::Disarm),
            SafePoint::PostLastGuardedFrame => self.shutdown(),
        }
    }

    /// Whether the watchdog thread is running.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    fn persist_unsafe(&self, value: bool) {
        persist(&self.config, &self.plugin, value);
    }

    fn arm(&mut self) {
        if self.worker.is_none() {
            self.worker = Some(self.spawn());
        }
        self.send(Command::Arm);
    }

    fn send(&self, cmd: Command) {
        if let Some((tx, _)) = &self.worker {
            // the worker only hangs up after a freeze, when there is nothing left to tell it
            let _ = tx.send(cmd);
        }
    }

    fn spawn(&self) -> (Sender<Command>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel();
        let plugin = self.plugin.clone();
        let config = self.config.clone();
        let timeout = self.timeout;
        let on_freeze = Arc::clone(&self.on_freeze);

        debug!("starting freeze watchdog for {}", plugin);
        let handle = thread::spawn(move || {
            let mut armed = false;
            loop {
                let cmd = if armed {
                    match rx.recv_timeout(timeout) {
                        Ok(cmd) => cmd,
                        Err(RecvTimeoutError::Timeout) => {
                            persist(&config, &plugin, true);
                            error!("freeze detected during initialization of {}", plugin);
                            on_freeze(&plugin);
                            armed = false;
                            continue
                        }
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                } else {
                    match rx.recv() {
                        Ok(cmd) => cmd,
                        Err(_) => return,
                    }
                };

                match cmd {
                    Command::Arm => armed = true,
                    Command::Disarm => armed = false,
                    Command::Quit => return,
                }
            }
        });

        (tx, handle)
    }

    fn shutdown(&mut self) {
        if let Some((tx, handle)) = self.worker.take() {
            let _ = tx.send(Command::Quit);
            if handle.join().is_err() {
                warn!("freeze watchdog for {} panicked", self.plugin);
            }
        }
    }
}

fn persist(config: &SharedConfig, plugin: &str, value: bool) {
    let group = config.group(COMPOSITING_SECTION);
    group.write_entry(&unsafe_plugin_key(plugin), value);
    if let Err(e) = group.sync() {
        warn!("could not persist unsafe flag for {}: {}", plugin, e);
    }
}

impl Drop for FreezeWatchdog {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for FreezeWatchdog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreezeWatchdog")
            .field("plugin", &self.plugin)
            .field("timeout", &self.timeout)
            .field("running", &self.is_running())
            .finish()
    }
}
