pub mod config;
pub mod consumers;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod locks;
pub mod orchestrator;
pub mod results;
pub mod state;
pub mod store;
pub mod sweeper;

pub use error::TryOnError;
pub use lifecycle::EventManager;
pub use orchestrator::{Orchestrator, Reconciliation};
pub use results::{RenderedHairstyle, ResultsView};
pub use state::AppState;

/// Fresh identifier for events and inference sub-events: time-sortable
/// UUIDv7, so ids sort by creation time.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
