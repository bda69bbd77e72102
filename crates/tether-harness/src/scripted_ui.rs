//! Recording UI collaborators.

use std::sync::{Arc, Mutex, MutexGuard};

use tether_app::{Navigator, Route, UiNotifier};
use tether_core::DialogId;

#[derive(Debug, Default)]
struct UiState {
    dialog_list_refreshes: usize,
    message_refreshes: Vec<DialogId>,
}

/// Counts the refresh signals emitted by the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    state: Arc<Mutex<UiState>>,
}

impl RecordingUi {
    /// Create a recorder with no signals observed.
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, UiState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// How many dialog-list refresh signals were observed.
    pub fn dialog_list_refreshes(&self) -> usize {
        self.locked().dialog_list_refreshes
    }

    /// Message refresh signals observed, in order.
    pub fn message_refreshes(&self) -> Vec<DialogId> {
        self.locked().message_refreshes.clone()
    }
}

impl UiNotifier for RecordingUi {
    fn refresh_dialog_list(&self) {
        self.locked().dialog_list_refreshes += 1;
    }

    fn refresh_messages(&self, dialog_id: &DialogId) {
        self.locked().message_refreshes.push(dialog_id.clone());
    }
}

/// Navigator pinned to a test-controlled route.
#[derive(Debug, Clone)]
pub struct FixedNavigator {
    route: Arc<Mutex<Route>>,
}

impl FixedNavigator {
    /// Create a navigator showing the given route.
    pub fn new(route: Route) -> Self {
        Self { route: Arc::new(Mutex::new(route)) }
    }

    /// Change the displayed route.
    pub fn set_route(&self, route: Route) {
        if let Ok(mut current) = self.route.lock() {
            *current = route;
        }
    }
}

impl Navigator for FixedNavigator {
    fn current_route(&self) -> Route {
        match self.route.lock() {
            Ok(route) => route.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
