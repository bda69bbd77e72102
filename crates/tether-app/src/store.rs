//! Shared connection state store.
//!
//! Holds current knowledge of {authenticated session, network reachability,
//! chat connection, media session, transport readiness}. All listener loops
//! and reconciliation passes read it; only the orchestrator mutates it.
//!
//! A `std` mutex guards the fields. No lock is ever held across a suspension
//! point, so check-and-set operations such as [`ConnectionStore::begin_connect`]
//! stay atomic even on a preemptive multi-threaded runtime.

use std::sync::{Arc, Mutex, MutexGuard};

use tether_core::{ChatConnectionState, MediaSessionId, Session};

/// Consistent copy of the store for decisions and invariant checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    /// An authenticated session is present.
    pub has_session: bool,
    /// Network currently reachable.
    pub network_reachable: bool,
    /// Cached chat connection state.
    pub chat: ChatConnectionState,
    /// A connect command is outstanding.
    pub connect_pending: bool,
    /// A live media session handle is held.
    pub media_active: bool,
    /// One-time transport initialization completed.
    pub transport_ready: bool,
}

#[derive(Debug, Default)]
struct StoreInner {
    session: Option<Session>,
    // Assumed unreachable until the connectivity source reports otherwise.
    network_reachable: bool,
    chat: ChatConnectionState,
    connect_pending: bool,
    media: Option<MediaSessionId>,
    transport_ready: bool,
}

/// Cloneable handle to the shared connection state.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl ConnectionStore {
    /// Create an empty store: no session, network unreachable, disconnected.
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, StoreInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record a successful login.
    pub fn set_session(&self, session: Session) {
        self.locked().session = Some(session);
    }

    /// Record a logout.
    pub fn clear_session(&self) {
        self.locked().session = None;
    }

    /// Current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.locked().session.clone()
    }

    /// Record the latest network reachability report.
    pub fn set_network_reachable(&self, reachable: bool) {
        self.locked().network_reachable = reachable;
    }

    /// Whether the network is currently reachable.
    pub fn network_reachable(&self) -> bool {
        self.locked().network_reachable
    }

    /// Mark one-time transport initialization as completed.
    pub fn mark_transport_ready(&self) {
        self.locked().transport_ready = true;
    }

    /// Whether transport initialization has completed.
    pub fn transport_ready(&self) -> bool {
        self.locked().transport_ready
    }

    /// Claim the right to issue a connect command.
    ///
    /// Returns `true` iff no connect was pending; exactly one of any set of
    /// concurrent callers receives `true` and must issue the command. The
    /// check and the set happen under a single lock acquisition, which is
    /// what keeps at most one connect outstanding per session.
    pub fn begin_connect(&self) -> bool {
        let mut inner = self.locked();
        if inner.connect_pending {
            return false;
        }
        inner.connect_pending = true;
        inner.chat = ChatConnectionState::Connecting;
        true
    }

    /// Record a connect outcome.
    ///
    /// Clears the pending guard on both the success and the failure path; a
    /// failed attempt must never leave the guard set or no later pass could
    /// ever connect again.
    pub fn finish_connect(&self, success: bool) {
        let mut inner = self.locked();
        inner.connect_pending = false;
        inner.chat = if success {
            ChatConnectionState::Connected
        } else {
            ChatConnectionState::Disconnected
        };
    }

    /// Cache an authoritative "already connected" probe result.
    pub fn mark_connected(&self) {
        self.locked().chat = ChatConnectionState::Connected;
    }

    /// Record a completed chat teardown.
    pub fn mark_disconnected(&self) {
        self.locked().chat = ChatConnectionState::Disconnected;
    }

    /// Record the live media session reported by the gateway, or its absence.
    pub fn set_media(&self, session: Option<MediaSessionId>) {
        self.locked().media = session;
    }

    /// Take the live media session handle, leaving none.
    pub fn take_media(&self) -> Option<MediaSessionId> {
        self.locked().media.take()
    }

    /// Whether a live media session is held.
    pub fn media_active(&self) -> bool {
        self.locked().media.is_some()
    }

    /// Consistent copy of all fields for decisions and invariant checks.
    pub fn snapshot(&self) -> ConnectionSnapshot {
        let inner = self.locked();
        ConnectionSnapshot {
            has_session: inner.session.is_some(),
            network_reachable: inner.network_reachable,
            chat: inner.chat,
            connect_pending: inner.connect_pending,
            media_active: inner.media.is_some(),
            transport_ready: inner.transport_ready,
        }
    }
}
