//! Error taxonomy for connection orchestration.
//!
//! Each variant encodes its handling policy: initialization failures are
//! fatal for the process, connect failures abort one reconciliation pass,
//! settings failures are logged and swallowed, and listener failures
//! terminate a single listener loop. Errors never propagate uncaught out of
//! a listener loop.

use thiserror::Error;

/// Errors surfaced by the connection orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Transport initialization failed.
    ///
    /// Fatal for this process lifetime: nothing is retried and all later
    /// chat operations refuse to run. The hosting application decides
    /// whether to prompt the user or abort.
    #[error("transport initialization failed: {0}")]
    Init(String),

    /// A connect attempt resolved as failure.
    ///
    /// Aborts the current reconciliation pass; the next qualifying trigger
    /// (foreground, connectivity restored, explicit request) retries from
    /// scratch.
    #[error("chat connect failed: {0}")]
    ConnectFailed(String),

    /// A post-connect settings call was rejected.
    ///
    /// Logged by the caller; the established connection stays usable.
    #[error("transport settings rejected: {0}")]
    Settings(String),

    /// An event-source subscription failed or its queue closed unexpectedly.
    ///
    /// Terminates that listener loop only.
    #[error("event source failed: {0}")]
    Listener(String),
}
