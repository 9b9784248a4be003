//! Logging macros internal to wmdecor.

/// Traces only in debug builds.
///
/// Used on hot paths such as cache hits, where even a disabled
/// `tracing` callsite is not worth paying for in release builds.
macro_rules! trace {
    ($fmt:expr) => {
        #[cfg(debug_assertions)]
        tracing::trace!($fmt)
    };
    ($fmt:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        tracing::trace!($fmt, $($arg)*)
    }
}
