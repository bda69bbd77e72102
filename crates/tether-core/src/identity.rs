//! Identity types driving connection decisions.

use std::fmt;

/// Numeric account identifier assigned by the chat backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a chat dialog (one-to-one or group thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DialogId(String);

impl DialogId {
    /// Create a dialog ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Dialog ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque credential used once to authenticate the chat transport.
///
/// Redacted from debug output so sessions can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialSecret(String);

impl CredentialSecret {
    /// Wrap a credential value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw credential, for handing to the transport gateway.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialSecret(<redacted>)")
    }
}

/// Authenticated identity driving all connection decisions.
///
/// Set on successful application login and cleared on logout, both outside
/// this core. While no session is present every connection event is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Account the transport authenticates as.
    pub user_id: UserId,
    /// One-shot transport credential.
    pub secret: CredentialSecret,
}

impl Session {
    /// Create a session for the given account.
    pub fn new(user_id: UserId, secret: CredentialSecret) -> Self {
        Self { user_id, secret }
    }
}

/// Opaque handle to a live real-time media session.
///
/// Presence of a handle marks an active call; the media subsystem itself is
/// managed by the transport gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaSessionId(pub u64);

impl fmt::Display for MediaSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_secret_is_redacted_in_debug() {
        let session = Session::new(UserId(7), CredentialSecret::new("hunter2"));
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn credential_secret_exposes_raw_value() {
        let secret = CredentialSecret::new("hunter2");
        assert_eq!(secret.expose(), "hunter2");
    }
}
