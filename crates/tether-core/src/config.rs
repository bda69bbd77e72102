//! Transport configuration.
//!
//! [`TransportConfig`] is supplied once at process start and handed verbatim
//! to the gateway's one-time initialization. [`StreamManagementConfig`]
//! carries the fixed post-connect settings applied after every successful
//! connect.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default delivery-acknowledgment timeout for stream management.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// One-time transport initialization parameters.
///
/// Field shape follows the hosted chat backend's application credentials;
/// endpoint overrides are only needed for dedicated deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Application identifier.
    pub app_id: String,
    /// Authorization key paired with the application.
    pub auth_key: String,
    /// Authorization secret paired with the key.
    pub auth_secret: String,
    /// Account-level key for the credentials endpoint.
    pub account_key: String,
    /// REST endpoint override.
    #[serde(default)]
    pub api_endpoint: Option<String>,
    /// Chat endpoint override.
    #[serde(default)]
    pub chat_endpoint: Option<String>,
}

/// Stream-management parameters applied after every successful connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamManagementConfig {
    /// Reconnect automatically after transport-level drops.
    pub auto_reconnect: bool,
    /// How long to wait for a delivery acknowledgment.
    pub message_timeout: Duration,
}

impl Default for StreamManagementConfig {
    fn default() -> Self {
        Self { auto_reconnect: true, message_timeout: DEFAULT_MESSAGE_TIMEOUT }
    }
}
