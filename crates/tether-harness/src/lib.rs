//! Deterministic test harness for the Tether connection orchestrator.
//!
//! Scripted implementations of the [`tether_app::Gateway`],
//! [`tether_app::EventSource`], and UI collaborator traits, so the same
//! orchestration code that runs in production can be driven through exact
//! event interleavings and asserted on command-by-command.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties (WHAT must be true
//! across all execution paths, not specific scenarios) against
//! [`SystemSnapshot`]s captured between events. Use
//! [`InvariantRegistry::standard()`] for the stock connection invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod scripted_gateway;
pub mod scripted_source;
pub mod scripted_ui;

pub use invariants::{
    GuardReleasedWhenIdle, Invariant, InvariantRegistry, InvariantResult, MediaImpliesChat,
    SingleOutstandingConnect, SystemSnapshot, Violation,
};
pub use scripted_gateway::{Command, ConnectPolicy, GatewayError, ScriptedGateway};
pub use scripted_source::ScriptedSource;
pub use scripted_ui::{FixedNavigator, RecordingUi};
