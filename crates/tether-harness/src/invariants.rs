//! Invariant checking for connection orchestration.
//!
//! Invariants are properties that must always hold during execution. Unlike
//! example-based tests that check specific scenarios, invariants verify
//! behavioral properties across all possible event interleavings.
//!
//! Observable state is captured into a [`SystemSnapshot`] (store snapshot
//! plus gateway command/outcome counters), then registered [`Invariant`]
//! checks run against it between events.

use tether_app::ConnectionSnapshot;
use tether_core::ChatConnectionState;

use crate::ScriptedGateway;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Observable state of the orchestrator and gateway at one point in time.
#[derive(Debug, Clone, Copy)]
pub struct SystemSnapshot {
    /// Connection store snapshot.
    pub connection: ConnectionSnapshot,
    /// Total connect commands issued to the gateway.
    pub connect_commands: usize,
    /// Total connect outcomes emitted by the gateway.
    pub connect_outcomes: usize,
}

impl SystemSnapshot {
    /// Capture a snapshot from the store and a scripted gateway.
    pub fn capture(connection: ConnectionSnapshot, gateway: &ScriptedGateway) -> Self {
        Self {
            connection,
            connect_commands: gateway.connect_count(),
            connect_outcomes: gateway.outcomes_emitted(),
        }
    }
}

/// An invariant that can be checked against system state.
///
/// Invariants capture WHAT must be true, not specific test scenarios.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// A live media session requires an established chat transport.
///
/// Media never initializes without chat; teardown releases both together.
pub struct MediaImpliesChat;

impl Invariant for MediaImpliesChat {
    fn name(&self) -> &'static str {
        "MediaImpliesChat"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.connection.media_active
            && state.connection.chat != ChatConnectionState::Connected
        {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "media session live while chat is {:?}",
                    state.connection.chat
                ),
            });
        }
        Ok(())
    }
}

/// At most one connect command may be outstanding at a time.
///
/// Every connect beyond the first must wait for the previous outcome.
pub struct SingleOutstandingConnect;

impl Invariant for SingleOutstandingConnect {
    fn name(&self) -> &'static str {
        "SingleOutstandingConnect"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let in_flight = state.connect_commands.saturating_sub(state.connect_outcomes);
        if in_flight > 1 {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{in_flight} connect commands outstanding ({} issued, {} resolved)",
                    state.connect_commands, state.connect_outcomes
                ),
            });
        }
        Ok(())
    }
}

/// The connect-pending guard is released once every outcome has arrived.
///
/// A guard left set after its outcome would wedge all future connects.
pub struct GuardReleasedWhenIdle;

impl Invariant for GuardReleasedWhenIdle {
    fn name(&self) -> &'static str {
        "GuardReleasedWhenIdle"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.connect_commands == state.connect_outcomes && state.connection.connect_pending {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "connect pending with no outstanding command ({} issued and resolved)",
                    state.connect_commands
                ),
            });
        }
        Ok(())
    }
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Registry with the stock connection invariants.
    ///
    /// Includes:
    /// - [`MediaImpliesChat`]: live media requires connected chat
    /// - [`SingleOutstandingConnect`]: one connect in flight at most
    /// - [`GuardReleasedWhenIdle`]: the pending guard never outlives its
    ///   outcome
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(MediaImpliesChat);
        registry.add(SingleOutstandingConnect);
        registry.add(GuardReleasedWhenIdle);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all registered invariants, stopping at the first violation.
    pub fn check_all(&self, state: &SystemSnapshot) -> InvariantResult {
        for invariant in &self.invariants {
            invariant.check(state)?;
        }
        Ok(())
    }
}
