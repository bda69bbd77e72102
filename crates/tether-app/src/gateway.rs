//! Gateway trait abstracting the chat/VoIP transport SDK.
//!
//! The [`Gateway`] trait decouples the orchestrator from the vendor SDK. The
//! orchestrator issues commands through it and observes asynchronous connect
//! outcomes through [`Gateway::connect_outcomes`]; the transport protocol
//! itself stays opaque.
//!
//! The gateway is assumed to serialize its own internal operations, so the
//! orchestrator never wraps calls in an extra lock.

use std::future::Future;

use tether_core::{
    CredentialSecret, MediaSessionId, StreamManagementConfig, TransportConfig, UserId,
};

use crate::{SourceError, Subscription};

/// Outcome of a previously issued connect command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Transport session established.
    Succeeded,
    /// Connect attempt failed.
    Failed {
        /// SDK-reported failure reason.
        reason: String,
    },
}

impl ConnectOutcome {
    /// Whether this outcome reports an established session.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Abstracts the external chat/VoIP SDK for the orchestrator.
///
/// Every method is a suspension point: the cooperative scheduler may run
/// other pending tasks, including another reconciliation pass, while a call
/// is in flight.
///
/// # Implementations
///
/// - Production: a thin binding over the vendor SDK
/// - Tests: `ScriptedGateway` in the harness crate
pub trait Gateway: Send + Sync {
    /// SDK-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// One-time transport initialization at process start.
    ///
    /// # Errors
    ///
    /// Failure is fatal for this process lifetime; the orchestrator never
    /// retries it.
    fn initialize(
        &self,
        config: &TransportConfig,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Issue a connect command for the given account.
    ///
    /// Returns once the command is accepted; the result arrives later on
    /// [`Gateway::connect_outcomes`].
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be issued at all.
    fn connect(
        &self,
        user_id: UserId,
        secret: &CredentialSecret,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Tear down the chat transport session.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK rejects the teardown.
    fn disconnect(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Authoritative probe of the current transport session.
    ///
    /// The orchestrator trusts this over its own cached state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK cannot answer the probe.
    fn connection_status(&self) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Apply stream-management parameters (auto-reconnect, ack timeout).
    ///
    /// # Errors
    ///
    /// Non-fatal; the caller logs and keeps the connection.
    fn configure_stream_management(
        &self,
        config: &StreamManagementConfig,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Mirror sent/received messages across the account's devices.
    ///
    /// # Errors
    ///
    /// Non-fatal; the caller logs and keeps the connection.
    fn enable_message_carbons(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Toggle transport-level automatic reconnection.
    ///
    /// # Errors
    ///
    /// Non-fatal; the caller logs and keeps the connection.
    fn set_auto_reconnect(
        &self,
        enabled: bool,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Initialize the real-time media subsystem.
    ///
    /// Idempotent on the gateway side. Returns the handle of the live media
    /// session when a call is in progress, `None` when the subsystem is
    /// merely ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the media subsystem cannot start.
    fn init_media_session(
        &self,
    ) -> impl Future<Output = Result<Option<MediaSessionId>, Self::Error>> + Send;

    /// Release the media subsystem.
    ///
    /// `None` performs idle cleanup; `Some` releases the given live session.
    ///
    /// # Errors
    ///
    /// Returns an error if the release fails.
    fn release_media_session(
        &self,
        session: Option<MediaSessionId>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Subscribe to connect outcome events.
    ///
    /// Outcomes are delivered in emission order; the orchestrator's outcome
    /// listener loop is the sole consumer.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the SDK cannot register the listener.
    fn connect_outcomes(&self) -> Result<Subscription<ConnectOutcome>, SourceError>;
}
