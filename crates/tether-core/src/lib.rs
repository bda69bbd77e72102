//! Core types for the Tether connection-lifecycle orchestrator.
//!
//! Shared, dependency-light building blocks: the authenticated [`Session`]
//! driving all connection decisions, transport configuration, connection and
//! lifecycle state enums, and the error taxonomy used at orchestration
//! boundaries.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod identity;
pub mod state;

pub use config::{DEFAULT_MESSAGE_TIMEOUT, StreamManagementConfig, TransportConfig};
pub use error::OrchestratorError;
pub use identity::{CredentialSecret, DialogId, MediaSessionId, Session, UserId};
pub use state::{ChatConnectionState, LifecycleState};
