use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{EventStatus, Hairstyle, UploadPicture};
use tracing::{error, info, instrument};

use crate::entity::ChangeEvent;
use crate::error::{Result, TryOnError};
use crate::orchestrator::{Orchestrator, settle_continuation};
use crate::results::{ResultsView, results_view};

/// Client-facing side of a change event: creation, fact submission and
/// result polling. Every operation checks that the account owns the event.
pub struct EventManager {
    orchestrator: Arc<Orchestrator>,
    event_timeout: Duration,
}

impl EventManager {
    pub fn new(orchestrator: Arc<Orchestrator>, event_timeout: Duration) -> Self {
        Self {
            orchestrator,
            event_timeout,
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    #[instrument(skip(self))]
    pub async fn create_event(&self, account_id: &str) -> Result<String> {
        let event_id = crate::new_id();
        let event = ChangeEvent::new(
            event_id.clone(),
            account_id.to_string(),
            Utc::now(),
            self.event_timeout,
        );
        self.orchestrator.store().put(&event).await?;

        info!(event_id = %event_id, deadline = %event.deadline, "Change event created");
        Ok(event_id)
    }

    /// Record the uploaded photo and kick off embedding.
    ///
    /// Embedding start is best-effort here: a failure to dispatch is logged
    /// and retried on the next client action or sweep.
    #[instrument(skip(self, picture))]
    pub async fn set_photo(
        &self,
        account_id: &str,
        event_id: &str,
        picture: UploadPicture,
    ) -> Result<()> {
        let _guard = self.orchestrator.locks().acquire(event_id).await;
        let mut event = self.load_active(account_id, event_id).await?;

        event.set_picture(picture, Utc::now())?;
        self.orchestrator.store().put(&event).await?;
        info!("Picture uploaded");

        let outcome = self.orchestrator.start_embedding_locked(&mut event).await;
        log_deferred("start embedding", outcome);
        Ok(())
    }

    /// Record the picked hairstyles and kick off whatever inference can run.
    ///
    /// Blending legitimately cannot start before the embedding result is in;
    /// the embedding result will start it then.
    #[instrument(skip(self, hairstyles), fields(hairstyles = hairstyles.len()))]
    pub async fn set_hairstyles(
        &self,
        account_id: &str,
        event_id: &str,
        hairstyles: Vec<Hairstyle>,
    ) -> Result<()> {
        let _guard = self.orchestrator.locks().acquire(event_id).await;
        let mut event = self.load_active(account_id, event_id).await?;

        event.set_hairstyles(hairstyles, Utc::now())?;
        self.orchestrator.store().put(&event).await?;
        info!("Hairstyles picked");

        let outcome = self.orchestrator.start_embedding_locked(&mut event).await;
        log_deferred("start embedding", outcome);
        let outcome = self.orchestrator.start_blending_locked(&mut event).await;
        log_deferred("start blending", outcome);
        Ok(())
    }

    /// Poll for results. An expired event reports `TimedOut`.
    #[instrument(skip(self))]
    pub async fn get_results(&self, account_id: &str, event_id: &str) -> Result<ResultsView> {
        let _guard = self.orchestrator.locks().acquire(event_id).await;
        let mut event = self.load_owned(account_id, event_id).await?;
        let now = Utc::now();

        if event.is_expired(now) {
            self.expire(&mut event).await?;
            return Ok(ResultsView::TimedOut);
        }

        let was_finished = event.finished_at.is_some();
        let view = results_view(&mut event, now);
        if !was_finished && event.finished_at.is_some() {
            self.orchestrator.store().put(&event).await?;
            info!("Event completed");
        }
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn status(&self, account_id: &str, event_id: &str) -> Result<EventStatus> {
        let _guard = self.orchestrator.locks().acquire(event_id).await;
        let mut event = self.load_owned(account_id, event_id).await?;
        let now = Utc::now();

        if event.is_expired(now) {
            self.expire(&mut event).await?;
        }
        Ok(event.status(now))
    }

    /// Load an event the account owns. Foreign events look nonexistent.
    async fn load_owned(&self, account_id: &str, event_id: &str) -> Result<ChangeEvent> {
        match self.orchestrator.store().get(event_id).await? {
            Some(event) if event.is_owned_by(account_id) => Ok(event),
            _ => Err(TryOnError::NotFound(format!(
                "Account {account_id} has no event {event_id}"
            ))),
        }
    }

    /// Like `load_owned`, but an expired event is timed out and rejected.
    async fn load_active(&self, account_id: &str, event_id: &str) -> Result<ChangeEvent> {
        let mut event = self.load_owned(account_id, event_id).await?;
        if event.is_expired(Utc::now()) {
            self.expire(&mut event).await?;
            return Err(TryOnError::Expired(event.event_id));
        }
        Ok(event)
    }

    async fn expire(&self, event: &mut ChangeEvent) -> Result<()> {
        if event.mark_expired(Utc::now()) {
            self.orchestrator.store().put(event).await?;
            info!(event_id = %event.event_id, "Event expired");
        }
        Ok(())
    }
}

/// The fact was stored either way, so unexpected failures are logged rather
/// than returned.
fn log_deferred(step: &'static str, outcome: Result<()>) {
    if let Err(e) = settle_continuation(step, outcome) {
        error!(step, error = %e, code = e.code(), "Deferred inference start failed");
    }
}
