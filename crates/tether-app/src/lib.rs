//! Connection-lifecycle orchestration for the Tether chat client.
//!
//! Reconciles independently-arriving event streams (app lifecycle, network
//! reachability, chat connect outcomes) into one decision: should the chat
//! transport and real-time media session be established, torn down, or left
//! alone.
//!
//! # Components
//!
//! - [`Orchestrator`]: decision logic and listener loops
//! - [`Gateway`]: trait over the external chat/VoIP SDK
//! - [`ConnectionStore`]: shared connection state, mutated only by the
//!   orchestrator
//! - [`EventSource`] / [`Subscription`]: push-style listener registration
//!   adapted to awaitable, order-preserving queues
//! - [`UiNotifier`] / [`Navigator`]: outbound refresh signals and a
//!   read-only view of the host's navigation state

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod gateway;
mod orchestrator;
mod source;
mod store;
mod ui;

pub use gateway::{ConnectOutcome, Gateway};
pub use orchestrator::Orchestrator;
pub use source::{EventSource, SourceError, Subscription, subscription_pair};
pub use store::{ConnectionSnapshot, ConnectionStore};
pub use ui::{Navigator, Route, UiNotifier};
