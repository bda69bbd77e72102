//! Connection and lifecycle state enums.

/// Chat transport connection state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatConnectionState {
    /// No transport session.
    #[default]
    Disconnected,
    /// Connect command issued, outcome pending.
    Connecting,
    /// Transport session established.
    Connected,
}

impl ChatConnectionState {
    /// Whether a transport session is established.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Host process foreground status.
///
/// Only the latest value and the transition matter; no history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Foregrounded and interactive.
    Active,
    /// Transitioning or obscured (incoming call, app switcher).
    Inactive,
    /// Fully backgrounded.
    Background,
}

impl LifecycleState {
    /// Whether the process is foregrounded and interactive.
    pub fn is_foreground(self) -> bool {
        matches!(self, Self::Active)
    }
}
