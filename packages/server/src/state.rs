use std::sync::Arc;

use crate::config::EventConfig;
use crate::dispatch::InferenceDispatcher;
use crate::lifecycle::EventManager;
use crate::orchestrator::Orchestrator;
use crate::store::EventStore;

/// Shared handles for everything driving change events.
///
/// `events` is the client-facing entry point; `orchestrator` is shared
/// with the result consumer and the sweeper.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub events: Arc<EventManager>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EventStore>,
        dispatcher: Arc<dyn InferenceDispatcher>,
        event_config: &EventConfig,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(store, dispatcher));
        let events = Arc::new(EventManager::new(
            Arc::clone(&orchestrator),
            event_config.timeout(),
        ));
        Self {
            orchestrator,
            events,
        }
    }
}
