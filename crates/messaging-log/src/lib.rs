//! Logging macros shared across the registry and server crates.
//!
//! These are thin wrappers over `tracing` so call sites read as
//! `log_warn!("...")` instead of repeating the `tracing` crate name, and so a
//! single place can later change the backend without touching call sites.
//!
//! ## Usage
//!
//! ```rust
//! use messaging_log::{log_debug, log_error, log_warn};
//!
//! log_warn!("duplicate subscription to {}", "room/1");
//! log_debug!("subscribed {} to {}", "conn-1", "room/1");
//! log_error!("close hook fired for untracked connection {}", "conn-1");
//! ```

#[doc(hidden)]
pub use tracing;

/// Log an info-level message.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::tracing::trace!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_compile_and_run() {
        log_info!("info {}", 1);
        log_warn!("warn {}", 2);
        log_debug!("debug {:?}", vec![1, 2, 3]);
        log_error!("error {}", "oops");
        log_trace!("trace");
    }
}
