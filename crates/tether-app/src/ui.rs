//! Outbound UI signals and read-only navigation queries.
//!
//! The orchestrator tells the UI layer when cached chat data went stale
//! (fire-and-forget) and asks which screen is displayed to decide whether a
//! message refresh is warranted. Both collaborators are injected traits, not
//! globals.

use tether_core::DialogId;

/// Screen currently displayed by the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The dialog list.
    DialogList,
    /// The message thread of one dialog.
    Messages {
        /// Dialog whose thread is open.
        dialog_id: DialogId,
    },
    /// Any other screen.
    Other,
}

/// Fire-and-forget refresh signals to the UI layer.
pub trait UiNotifier: Send + Sync {
    /// The dialog list should re-fetch.
    fn refresh_dialog_list(&self);

    /// Messages for the given dialog should re-fetch.
    fn refresh_messages(&self, dialog_id: &DialogId);
}

/// Read-only view of the host's navigation state.
///
/// The orchestrator only ever queries it, never drives navigation.
pub trait Navigator: Send + Sync {
    /// Screen currently displayed.
    fn current_route(&self) -> Route;
}
