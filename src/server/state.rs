use std::sync::Arc;

use crate::events::EventAdapter;
use crate::store::UserStore;
use crate::types::BuildInfo;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub events: Arc<EventAdapter>,
    pub build: Arc<BuildInfo>,
}

impl AppState {
    pub fn new(store: Arc<UserStore>, events: Arc<EventAdapter>, build: BuildInfo) -> Self {
        Self {
            store,
            events,
            build: Arc::new(build),
        }
    }
}
