//! Connection orchestrator.
//!
//! Consumes lifecycle, connectivity, and connect-outcome events, reads and
//! writes the [`ConnectionStore`], and issues commands to the [`Gateway`]:
//! connect/disconnect the chat transport, init/release the media subsystem,
//! and apply the fixed post-connect transport settings.
//!
//! All decisions flow through [`Orchestrator::reconcile`], invoked by any
//! trigger that believes a connection should exist (app foreground, network
//! restored, explicit request). Passes may interleave at every gateway call;
//! the store's connect-pending guard keeps at most one connect command
//! outstanding, and late passes wait on the shared outcome fan-out instead
//! of issuing their own connect.

use std::sync::Arc;

use tether_core::{
    LifecycleState, OrchestratorError, Session, StreamManagementConfig, TransportConfig,
};
use tokio::sync::broadcast;

use crate::{
    ConnectOutcome, ConnectionStore, EventSource, Gateway, Navigator, Route, UiNotifier,
};

/// Capacity of the outcome fan-out channel. Waiting passes only ever care
/// about the next outcome, so a small buffer suffices.
const OUTCOME_FANOUT_CAPACITY: usize = 16;

/// Reconciles event streams into transport and media commands.
///
/// Shared as `Arc<Self>` between the host and its listener loops; every
/// operation takes `&self`.
pub struct Orchestrator<G, U, N>
where
    G: Gateway,
    U: UiNotifier,
    N: Navigator,
{
    gateway: G,
    ui: U,
    navigator: N,
    store: ConnectionStore,
    outcome_fanout: broadcast::Sender<ConnectOutcome>,
}

impl<G, U, N> Orchestrator<G, U, N>
where
    G: Gateway,
    U: UiNotifier,
    N: Navigator,
{
    /// Create an orchestrator around the given gateway and UI collaborators.
    pub fn new(gateway: G, ui: U, navigator: N) -> Self {
        let (outcome_fanout, _) = broadcast::channel(OUTCOME_FANOUT_CAPACITY);
        Self { gateway, ui, navigator, store: ConnectionStore::new(), outcome_fanout }
    }

    /// Shared view of the connection state store.
    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    /// Record a successful login.
    pub fn set_session(&self, session: Session) {
        self.store.set_session(session);
    }

    /// Record a logout. Events are no-ops until the next login.
    pub fn clear_session(&self) {
        self.store.clear_session();
    }

    /// One-time transport initialization at process start.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Init`] when the SDK rejects the
    /// configuration. The failure is fatal for this process: nothing is
    /// retried and every later reconciliation pass refuses to run. The host
    /// decides whether to prompt the user or abort.
    pub async fn start(&self, config: &TransportConfig) -> Result<(), OrchestratorError> {
        self.gateway
            .initialize(config)
            .await
            .map_err(|e| OrchestratorError::Init(e.to_string()))?;
        self.store.mark_transport_ready();
        tracing::debug!("transport gateway initialized");
        Ok(())
    }

    /// One reconciliation pass: decide whether the chat transport and media
    /// session should be established, and establish them.
    ///
    /// Safe to invoke concurrently from any trigger. Overlapping passes share
    /// a single outstanding connect command: whichever claims the guard
    /// issues it, the rest wait for the same outcome.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::ConnectFailed`] when the connect outcome
    /// is failure (or the status probe cannot be answered); the pass aborts
    /// without touching media or settings and the next qualifying trigger
    /// retries from scratch.
    pub async fn reconcile(&self) -> Result<(), OrchestratorError> {
        let Some(session) = self.store.session() else {
            return Ok(());
        };
        if !self.store.transport_ready() {
            return Ok(());
        }

        // Authoritative probe; the cached store state may be stale.
        let chat_connected = self
            .gateway
            .connection_status()
            .await
            .map_err(|e| OrchestratorError::ConnectFailed(e.to_string()))?;

        if !self.store.network_reachable() {
            return Ok(());
        }

        if chat_connected {
            self.store.mark_connected();
        } else {
            // Subscribe before the guard check so an outcome resolved between
            // the check and the wait cannot be missed.
            let mut outcomes = self.outcome_fanout.subscribe();
            if self.store.begin_connect() {
                tracing::debug!(user_id = %session.user_id, "issuing chat connect");
                if let Err(e) = self.gateway.connect(session.user_id, &session.secret).await {
                    // A command that never went out produces no gateway
                    // outcome. Fail it here so the guard clears and racing
                    // passes parked on the fan-out wake up.
                    self.handle_connect_outcome(ConnectOutcome::Failed {
                        reason: e.to_string(),
                    });
                    return Err(OrchestratorError::ConnectFailed(e.to_string()));
                }
            }
            match self.next_outcome(&mut outcomes).await? {
                ConnectOutcome::Succeeded => {},
                ConnectOutcome::Failed { reason } => {
                    return Err(OrchestratorError::ConnectFailed(reason));
                },
            }
        }

        match self.gateway.init_media_session().await {
            Ok(live_session) => self.store.set_media(live_session),
            Err(e) => tracing::warn!(error = %e, "media subsystem init failed"),
        }

        if let Err(e) = self.apply_transport_settings().await {
            tracing::warn!(error = %e, "post-connect settings not applied");
        }

        self.ui.refresh_dialog_list();
        if let Route::Messages { dialog_id } = self.navigator.current_route() {
            self.ui.refresh_messages(&dialog_id);
        }
        Ok(())
    }

    /// React to a host lifecycle transition.
    ///
    /// Going inactive or background tears down an idle chat connection; a
    /// live media session keeps the transport alive instead. Returning to
    /// the foreground runs a reconciliation pass.
    pub async fn handle_lifecycle(&self, next: LifecycleState) {
        if self.store.session().is_none() {
            return;
        }
        if next.is_foreground() {
            if let Err(e) = self.reconcile().await {
                tracing::warn!(error = %e, "foreground reconnect failed");
            }
            return;
        }

        let snapshot = self.store.snapshot();
        if snapshot.chat.is_connected() && !snapshot.media_active {
            // Disconnect and media release always travel together; chat is
            // never torn down alone underneath a live media session.
            if let Err(e) = self.gateway.disconnect().await {
                tracing::warn!(error = %e, "background disconnect failed");
            }
            let media = self.store.take_media();
            if let Err(e) = self.gateway.release_media_session(media).await {
                tracing::warn!(error = %e, "media release failed");
            }
            self.store.mark_disconnected();
        }
    }

    /// React to a network reachability transition.
    ///
    /// Restoration while chat is down triggers a reconciliation pass. Loss
    /// while connected is left to the transport's own auto-reconnect; no
    /// forced disconnect.
    pub async fn handle_connectivity(&self, reachable: bool) {
        self.store.set_network_reachable(reachable);
        if reachable && !self.store.snapshot().chat.is_connected() {
            if let Err(e) = self.reconcile().await {
                tracing::warn!(error = %e, "reconnect after network restore failed");
            }
        }
    }

    /// Record a connect outcome and wake waiting passes.
    ///
    /// The pending guard is cleared on success and failure alike, so a
    /// failed attempt can never wedge future connects.
    pub fn handle_connect_outcome(&self, outcome: ConnectOutcome) {
        self.store.finish_connect(outcome.is_success());
        // No receiver just means no pass is currently waiting.
        let _ = self.outcome_fanout.send(outcome);
    }

    /// Consume lifecycle transitions until the source closes.
    ///
    /// Registration failure is logged and terminates this loop only.
    pub async fn run_lifecycle_listener<S>(self: Arc<Self>, source: S)
    where
        S: EventSource<LifecycleState>,
    {
        let mut subscription = match source.subscribe() {
            Ok(subscription) => subscription,
            Err(e) => {
                let e = OrchestratorError::Listener(e.to_string());
                tracing::error!(error = %e, "lifecycle listener not started");
                return;
            },
        };
        while let Some(state) = subscription.recv().await {
            self.handle_lifecycle(state).await;
        }
        tracing::debug!("lifecycle source closed");
    }

    /// Consume network reachability transitions until the source closes.
    ///
    /// Registration failure is logged and terminates this loop only.
    pub async fn run_connectivity_listener<S>(self: Arc<Self>, source: S)
    where
        S: EventSource<bool>,
    {
        let mut subscription = match source.subscribe() {
            Ok(subscription) => subscription,
            Err(e) => {
                let e = OrchestratorError::Listener(e.to_string());
                tracing::error!(error = %e, "connectivity listener not started");
                return;
            },
        };
        while let Some(reachable) = subscription.recv().await {
            self.handle_connectivity(reachable).await;
        }
        tracing::debug!("connectivity source closed");
    }

    /// Consume connect outcomes from the gateway until its stream closes.
    ///
    /// Must be running before any reconciliation pass issues a connect;
    /// registration failure is logged and terminates this loop only.
    pub async fn run_outcome_listener(self: Arc<Self>) {
        let mut subscription = match self.gateway.connect_outcomes() {
            Ok(subscription) => subscription,
            Err(e) => {
                let e = OrchestratorError::Listener(e.to_string());
                tracing::error!(error = %e, "outcome listener not started");
                return;
            },
        };
        while let Some(outcome) = subscription.recv().await {
            self.handle_connect_outcome(outcome);
        }
        tracing::debug!("connect outcome source closed");
    }

    /// First connect outcome to arrive wins; the loser is disregarded.
    async fn next_outcome(
        &self,
        outcomes: &mut broadcast::Receiver<ConnectOutcome>,
    ) -> Result<ConnectOutcome, OrchestratorError> {
        loop {
            match outcomes.recv().await {
                Ok(outcome) => return Ok(outcome),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "connect outcome fan-out lagged");
                },
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(OrchestratorError::ConnectFailed(
                        "outcome stream closed".into(),
                    ));
                },
            }
        }
    }

    /// Apply the fixed post-connect transport settings: stream management
    /// with auto-reconnect and a 10s ack timeout, message carbons, and the
    /// transport-level auto-reconnect flag.
    ///
    /// # Errors
    ///
    /// The first rejected call aborts the remainder and is reported as
    /// [`OrchestratorError::Settings`]; the caller logs it and keeps the
    /// already-established connection.
    async fn apply_transport_settings(&self) -> Result<(), OrchestratorError> {
        let stream_management = StreamManagementConfig::default();
        self.gateway
            .configure_stream_management(&stream_management)
            .await
            .map_err(|e| OrchestratorError::Settings(e.to_string()))?;
        self.gateway
            .enable_message_carbons()
            .await
            .map_err(|e| OrchestratorError::Settings(e.to_string()))?;
        self.gateway
            .set_auto_reconnect(true)
            .await
            .map_err(|e| OrchestratorError::Settings(e.to_string()))?;
        Ok(())
    }
}
