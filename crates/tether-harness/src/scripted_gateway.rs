//! Scripted gateway for deterministic orchestration tests.
//!
//! [`ScriptedGateway`] records every command the orchestrator issues, in
//! order, and resolves connect commands according to a configurable
//! [`ConnectPolicy`]: immediately succeed, immediately fail, or hold them
//! until the test resolves the race by hand.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use tether_app::{ConnectOutcome, Gateway, SourceError, Subscription};
use tether_core::{
    CredentialSecret, MediaSessionId, StreamManagementConfig, TransportConfig, UserId,
};
use tokio::sync::mpsc;

/// Error returned by scripted gateway operations.
#[derive(Debug, Clone)]
pub struct GatewayError(pub String);

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GatewayError: {}", self.0)
    }
}

impl std::error::Error for GatewayError {}

/// How the scripted gateway resolves connect commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectPolicy {
    /// Emit `Succeeded` immediately after each connect command.
    #[default]
    AutoSucceed,
    /// Emit `Failed` immediately after each connect command.
    AutoFail,
    /// Hold connects until the test calls
    /// [`ScriptedGateway::resolve_connect`].
    Manual,
}

/// A command issued by the orchestrator, recorded in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// One-time transport initialization.
    Initialize,
    /// Chat connect for a user.
    Connect(UserId),
    /// Chat transport teardown.
    Disconnect,
    /// Stream-management configuration.
    ConfigureStreamManagement,
    /// Message carbons enable.
    EnableCarbons,
    /// Transport auto-reconnect toggle.
    SetAutoReconnect(bool),
    /// Media subsystem init.
    InitMedia,
    /// Media subsystem release.
    ReleaseMedia(Option<MediaSessionId>),
}

#[derive(Default)]
struct State {
    commands: Vec<Command>,
    connected: bool,
    policy: ConnectPolicy,
    outcome_listeners: Vec<mpsc::UnboundedSender<ConnectOutcome>>,
    outcomes_emitted: usize,
    fail_initialize: bool,
    fail_connects: bool,
    fail_settings: bool,
    refuse_outcome_subscriptions: bool,
    active_call: Option<MediaSessionId>,
}

/// Scripted [`Gateway`] recording commands and emitting scripted outcomes.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    state: Arc<Mutex<State>>,
}

impl ScriptedGateway {
    /// Gateway that resolves every connect as success.
    pub fn auto_succeed() -> Self {
        Self::with_policy(ConnectPolicy::AutoSucceed)
    }

    /// Gateway that resolves every connect as failure.
    pub fn auto_fail() -> Self {
        Self::with_policy(ConnectPolicy::AutoFail)
    }

    /// Gateway that holds connects until the test resolves them.
    pub fn manual() -> Self {
        Self::with_policy(ConnectPolicy::Manual)
    }

    /// Gateway with an explicit connect policy.
    pub fn with_policy(policy: ConnectPolicy) -> Self {
        let gateway = Self::default();
        gateway.locked().policy = policy;
        gateway
    }

    fn locked(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Commands issued so far, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.locked().commands.clone()
    }

    /// Number of connect commands issued so far.
    pub fn connect_count(&self) -> usize {
        self.locked()
            .commands
            .iter()
            .filter(|command| matches!(command, Command::Connect(_)))
            .count()
    }

    /// Number of connect outcomes emitted so far.
    pub fn outcomes_emitted(&self) -> usize {
        self.locked().outcomes_emitted
    }

    /// Force the authoritative status probe to report `connected`.
    pub fn set_connected(&self, connected: bool) {
        self.locked().connected = connected;
    }

    /// Script the live media session the next init-media call reports.
    pub fn set_active_call(&self, session: Option<MediaSessionId>) {
        self.locked().active_call = session;
    }

    /// Make the one-time initialization fail.
    pub fn fail_initialize(&self) {
        self.locked().fail_initialize = true;
    }

    /// Reject every connect command at issuance instead of resolving it.
    pub fn fail_connects(&self) {
        self.locked().fail_connects = true;
    }

    /// Make every post-connect settings call fail.
    pub fn fail_settings(&self) {
        self.locked().fail_settings = true;
    }

    /// Refuse connect-outcome listener registration.
    pub fn refuse_outcome_subscriptions(&self) {
        self.locked().refuse_outcome_subscriptions = true;
    }

    /// Resolve an outstanding manually-held connect.
    pub fn resolve_connect(&self, success: bool) {
        if success {
            self.locked().connected = true;
        }
        self.emit(if success {
            ConnectOutcome::Succeeded
        } else {
            ConnectOutcome::Failed { reason: "scripted connect failure".into() }
        });
    }

    fn emit(&self, outcome: ConnectOutcome) {
        let listeners = {
            let mut state = self.locked();
            state.outcomes_emitted += 1;
            state.outcome_listeners.clone()
        };
        for listener in listeners {
            let _ = listener.send(outcome.clone());
        }
    }
}

impl Gateway for ScriptedGateway {
    type Error = GatewayError;

    async fn initialize(&self, _config: &TransportConfig) -> Result<(), GatewayError> {
        if self.locked().fail_initialize {
            return Err(GatewayError("scripted initialization failure".into()));
        }
        self.locked().commands.push(Command::Initialize);
        Ok(())
    }

    async fn connect(
        &self,
        user_id: UserId,
        _secret: &CredentialSecret,
    ) -> Result<(), GatewayError> {
        if self.locked().fail_connects {
            // Suspend once so a racing pass can park on the outcome wait
            // before the rejection comes back.
            tokio::task::yield_now().await;
            return Err(GatewayError("scripted connect rejection".into()));
        }
        let policy = {
            let mut state = self.locked();
            state.commands.push(Command::Connect(user_id));
            state.policy
        };
        match policy {
            ConnectPolicy::AutoSucceed => {
                self.locked().connected = true;
                self.emit(ConnectOutcome::Succeeded);
            },
            ConnectPolicy::AutoFail => {
                self.emit(ConnectOutcome::Failed { reason: "scripted connect failure".into() });
            },
            ConnectPolicy::Manual => {},
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), GatewayError> {
        let mut state = self.locked();
        state.commands.push(Command::Disconnect);
        state.connected = false;
        Ok(())
    }

    async fn connection_status(&self) -> Result<bool, GatewayError> {
        Ok(self.locked().connected)
    }

    async fn configure_stream_management(
        &self,
        _config: &StreamManagementConfig,
    ) -> Result<(), GatewayError> {
        let mut state = self.locked();
        if state.fail_settings {
            return Err(GatewayError("scripted settings failure".into()));
        }
        state.commands.push(Command::ConfigureStreamManagement);
        Ok(())
    }

    async fn enable_message_carbons(&self) -> Result<(), GatewayError> {
        let mut state = self.locked();
        if state.fail_settings {
            return Err(GatewayError("scripted settings failure".into()));
        }
        state.commands.push(Command::EnableCarbons);
        Ok(())
    }

    async fn set_auto_reconnect(&self, enabled: bool) -> Result<(), GatewayError> {
        let mut state = self.locked();
        if state.fail_settings {
            return Err(GatewayError("scripted settings failure".into()));
        }
        state.commands.push(Command::SetAutoReconnect(enabled));
        Ok(())
    }

    async fn init_media_session(&self) -> Result<Option<MediaSessionId>, GatewayError> {
        let mut state = self.locked();
        state.commands.push(Command::InitMedia);
        Ok(state.active_call)
    }

    async fn release_media_session(
        &self,
        session: Option<MediaSessionId>,
    ) -> Result<(), GatewayError> {
        let mut state = self.locked();
        state.commands.push(Command::ReleaseMedia(session));
        state.active_call = None;
        Ok(())
    }

    fn connect_outcomes(&self) -> Result<Subscription<ConnectOutcome>, SourceError> {
        let mut state = self.locked();
        if state.refuse_outcome_subscriptions {
            return Err(SourceError::new("scripted registration failure"));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        state.outcome_listeners.push(tx);
        Ok(Subscription::from_receiver(rx))
    }
}
