#![deny(missing_docs)]
//! Shared logging utilities for the Waldo workspace.
//!
//! This crate provides the `waldo_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the session tag of the current thread so that log lines from
//! one extraction job can be told apart from the next.

use std::cell::RefCell;

thread_local! {
    /// Session identifier the current thread is working on, if any.
    static SESSION_TAG: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Placeholder written in place of the session tag when none is set.
pub const NO_SESSION: &str = "-";

/// Sets the session tag for the current thread.
/// The orchestrator calls this once the server has accepted a job.
pub fn set_session_tag(tag: impl Into<String>) {
    let tag = tag.into();
    SESSION_TAG.with(|v| *v.borrow_mut() = Some(tag));
}

/// Clears the session tag for the current thread.
pub fn clear_session_tag() {
    SESSION_TAG.with(|v| *v.borrow_mut() = None);
}

/// Retrieves the session tag for the current thread.
/// Returns [`NO_SESSION`] if no tag has been set.
pub fn session_tag() -> String {
    SESSION_TAG.with(|v| v.borrow().clone().unwrap_or_else(|| NO_SESSION.to_string()))
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! waldo_trace {
    ($($arg:tt)*) => {{
        log::trace!("[{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! waldo_info {
    ($($arg:tt)*) => {{
        log::info!("[{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! waldo_debug {
    ($($arg:tt)*) => {{
        log::debug!("[{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! waldo_warn {
    ($($arg:tt)*) => {{
        log::warn!("[{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! waldo_error {
    ($($arg:tt)*) => {{
        log::error!("[{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
