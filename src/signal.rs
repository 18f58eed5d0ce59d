//! Ctrl+C handling for cancelling long operations.
//!
//! One `AtomicBool` is shared between the signal hook and every worker
//! (walker, hashing pool, disk usage and search walks). Workers poll it and
//! stop early; the command then fails with an interrupted error, which the
//! binary maps to exit code 130.
//!
//! ```rust,no_run
//! use utilbox::signal::install_handler;
//! use utilbox::duplicates::FinderConfig;
//!
//! let handler = install_handler();
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clone of the flag for workers that outlive the call (hashing pool).
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Borrow the flag for synchronous walks.
    #[must_use]
    pub fn flag(&self) -> &AtomicBool {
        &self.flag
    }

    /// Clear the flag so the handler can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal hook registration.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// The Ctrl+C hook could not be registered.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Register the Ctrl+C hook that raises `handler`'s flag.
///
/// # Errors
///
/// Fails when a hook is already registered for this process.
pub fn hook(handler: &ShutdownHandler) -> Result<(), SignalError> {
    let flag = handler.get_flag();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\nInterrupted. Stopping...");
        let _ = stderr.flush();
        log::info!("Shutdown signal received");
    })?;
    Ok(())
}

/// The process-wide handler, hooked to Ctrl+C on first use.
///
/// Every call clears the flag first, so repeated `run_app` calls in one
/// process start uncancelled. If hooking fails the handler still works for
/// manual shutdown, and Ctrl+C falls back to terminating the process.
pub fn install_handler() -> ShutdownHandler {
    let handler = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        if let Err(e) = hook(&handler) {
            log::warn!("{}; Ctrl+C will terminate immediately", e);
        }
        handler
    });
    handler.reset();
    handler.clone()
}
