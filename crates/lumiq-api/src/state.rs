//! Application state shared by all handlers.

use lumiq_core::Config;
use lumiq_relay::{LeadDispatcher, StatusStore};
use std::sync::Arc;

/// Main application state: injected configuration plus the two lead-flow
/// services (dispatcher and status store).
pub struct AppState {
    pub config: Config,
    pub dispatcher: LeadDispatcher,
    pub status_store: Arc<StatusStore>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
