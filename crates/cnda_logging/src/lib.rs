#![deny(missing_docs)]
//! Shared logging utilities for the CNDA downloader workspace.
//!
//! This crate provides the `cnda_*` logging macros used across the codebase,
//! a thread-local job scope that prefixes log lines with the download job
//! being handled, and a minimal test initializer for the global logger.

use std::cell::RefCell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Job identifier the current thread is working on, if any.
    static JOB_SCOPE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the job scope for the current thread.
pub fn set_job_scope(job: impl ToString) {
    let job = job.to_string();
    JOB_SCOPE.with(|scope| *scope.borrow_mut() = Some(job));
}

/// Clears the job scope for the current thread.
pub fn clear_job_scope() {
    JOB_SCOPE.with(|scope| *scope.borrow_mut() = None);
}

/// Returns the job scope of the current thread, if one is set.
pub fn current_job_scope() -> Option<String> {
    JOB_SCOPE.with(|scope| scope.borrow().clone())
}

/// Enters a job scope that is restored to its previous value on drop.
pub fn enter_job_scope(job: impl ToString) -> JobScopeGuard {
    let previous = current_job_scope();
    set_job_scope(job);
    JobScopeGuard { previous }
}

/// Restores the previous job scope when dropped.
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct JobScopeGuard {
    previous: Option<String>,
}

impl Drop for JobScopeGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => set_job_scope(previous),
            None => clear_job_scope(),
        }
    }
}

/// Prefix prepended by the logging macros.
#[doc(hidden)]
pub fn scope_prefix() -> String {
    match current_job_scope() {
        Some(job) => format!("[job {job}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! cnda_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! cnda_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! cnda_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! cnda_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! cnda_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
