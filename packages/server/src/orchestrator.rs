//! Inference orchestration for change events.
//!
//! Each event runs two tracks. The embedding track starts as soon as a
//! photo is known. The blending track needs both the picked hairstyles and
//! a finished embedding, so it is attempted from both ends (hairstyle pick
//! and embedding result) and whichever arrives second actually starts it.
//! The dedup guard in [`Orchestrator::start_blending`] makes the double
//! attempt harmless.

use std::sync::Arc;

use chrono::Utc;
use common::{BlendingResult, EmbeddingResult, InferenceJob};
use tracing::{debug, error, info, instrument, warn};

use crate::dispatch::InferenceDispatcher;
use crate::entity::{BlendingInference, ChangeEvent, EmbeddingInference};
use crate::error::{Result, TryOnError};
use crate::locks::EventLocks;
use crate::store::EventStore;

/// What a reconciliation pass did to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The deadline passed and the timeout side-effect was applied now.
    Expired,
    /// Expired or completed before this pass; nothing to do.
    Settled,
    /// Still in progress; pending work was (re)attempted.
    InProgress,
}

pub struct Orchestrator {
    store: Arc<dyn EventStore>,
    dispatcher: Arc<dyn InferenceDispatcher>,
    locks: EventLocks,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn EventStore>, dispatcher: Arc<dyn InferenceDispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            locks: EventLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    pub fn locks(&self) -> &EventLocks {
        &self.locks
    }

    pub(crate) async fn load(&self, event_id: &str) -> Result<ChangeEvent> {
        self.store
            .get(event_id)
            .await?
            .ok_or_else(|| TryOnError::NotFound(format!("Event {event_id} does not exist")))
    }

    /// Start the embedding inference for an event.
    ///
    /// `AlreadyExists` means embedding is already running or done.
    pub async fn start_embedding(&self, event_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(event_id).await;
        let mut event = self.load(event_id).await?;
        self.start_embedding_locked(&mut event).await
    }

    #[instrument(skip_all, fields(event_id = %event.event_id))]
    pub(crate) async fn start_embedding_locked(&self, event: &mut ChangeEvent) -> Result<()> {
        let Some(picture) = event.uploaded_picture.clone() else {
            return Err(TryOnError::MissingPrerequisite(
                "There is no uploaded picture to embed".into(),
            ));
        };
        if event.embedding.is_some() {
            return Err(TryOnError::AlreadyExists(
                "Embedding has already started".into(),
            ));
        }

        let mut inference = EmbeddingInference::new(Utc::now());
        let job = InferenceJob::embedding(&event.event_id, &inference.inference_id, picture);
        self.dispatcher.enqueue(&job).await?;

        inference.mark_queued(Utc::now());
        let inference_id = inference.inference_id.clone();
        event.embedding = Some(inference);
        self.store.put(event).await?;

        info!(inference_id = %inference_id, "Embedding started");
        Ok(())
    }

    /// Start blending for every picked hairstyle that has no blending job yet.
    ///
    /// `EmbeddingNotFinished` is a timing condition that resolves itself once
    /// the embedding result arrives. `AlreadyExists` means every hairstyle is
    /// already covered and nothing was dispatched.
    pub async fn start_blending(&self, event_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(event_id).await;
        let mut event = self.load(event_id).await?;
        self.start_blending_locked(&mut event).await
    }

    #[instrument(skip_all, fields(event_id = %event.event_id))]
    pub(crate) async fn start_blending_locked(&self, event: &mut ChangeEvent) -> Result<()> {
        if event.hairstyles.is_none() {
            return Err(TryOnError::MissingPrerequisite(
                "There are no hairstyles to blend".into(),
            ));
        }
        let Some(embedding) = event
            .embedding
            .as_ref()
            .and_then(|e| e.result.as_ref())
            .map(EmbeddingResult::output)
        else {
            return Err(TryOnError::EmbeddingNotFinished);
        };

        let pending = event.pending_hairstyles();
        if pending.is_empty() {
            return Err(TryOnError::AlreadyExists(
                "Blending has already started for every hairstyle".into(),
            ));
        }

        // Only dispatched jobs are recorded; a failed publish stops the batch
        // and leaves the remaining hairstyles pending for the next attempt.
        let mut dispatched = 0usize;
        let mut failure = None;
        for hairstyle in pending {
            let mut blending = BlendingInference::new(hairstyle, Utc::now());
            let job = InferenceJob::blending(
                &event.event_id,
                blending.inference_id(),
                blending.hairstyle.clone(),
                embedding.clone(),
            );

            if let Err(e) = self.dispatcher.enqueue(&job).await {
                failure = Some(e);
                break;
            }
            blending.inference.mark_queued(Utc::now());
            event.blendings.push(blending);
            dispatched += 1;
        }

        if dispatched > 0 {
            self.store.put(event).await?;
        }

        match failure {
            Some(e) => {
                error!(dispatched, error = %e, "Blending batch stopped on dispatch failure");
                Err(e.into())
            }
            None => {
                info!(dispatched, "Blending started");
                Ok(())
            }
        }
    }

    /// Record an embedding result, then try to start blending.
    #[instrument(skip_all, fields(event_id = %result.event_id, inference_id = %result.inference_id))]
    pub async fn ingest_embedding_result(&self, result: EmbeddingResult) -> Result<()> {
        let _guard = self.locks.acquire(&result.event_id).await;
        let mut event = self.load(&result.event_id).await?;

        let Some(embedding) = event
            .embedding
            .as_mut()
            .filter(|e| e.inference_id == result.inference_id)
        else {
            return Err(TryOnError::NotFound(format!(
                "Event {} has no embedding inference {}",
                result.event_id, result.inference_id
            )));
        };

        if result.errored {
            warn!("Worker reported a failed embedding");
        }
        embedding.record_result(result, Utc::now())?;
        self.store.put(&event).await?;
        info!("Embedding result recorded");

        // Hairstyles may not be picked yet; the pick will start blending then.
        let outcome = self.start_blending_locked(&mut event).await;
        if let Err(e) = settle_continuation("start blending", outcome) {
            error!(error = %e, "Could not start blending after embedding finished");
        }

        Ok(())
    }

    /// Record one blending result and stamp completion once all are in.
    #[instrument(skip_all, fields(event_id = %result.event_id, inference_id = %result.inference_id))]
    pub async fn ingest_blending_result(&self, result: BlendingResult) -> Result<()> {
        let _guard = self.locks.acquire(&result.event_id).await;
        let mut event = self.load(&result.event_id).await?;

        let Some(blending) = event.blending_mut(&result.inference_id) else {
            return Err(TryOnError::NotFound(format!(
                "Event {} has no blending inference {}",
                result.event_id, result.inference_id
            )));
        };

        if result.errored {
            warn!(
                hairstyle_id = blending.hairstyle.hairstyle_id,
                "Worker reported a failed blending"
            );
        }
        let now = Utc::now();
        blending.inference.record_result(result, now)?;

        let completed = event.all_blendings_resolved() && event.mark_finished(now);
        self.store.put(&event).await?;

        if completed {
            info!(results = event.blendings.len(), "Event completed");
        } else {
            debug!("Blending result recorded");
        }
        Ok(())
    }

    /// Apply the timeout side-effect to an expired event, or re-attempt
    /// whatever work it is still waiting on.
    pub async fn reconcile(&self, event_id: &str) -> Result<Reconciliation> {
        let _guard = self.locks.acquire(event_id).await;
        let mut event = self.load(event_id).await?;
        let now = Utc::now();

        if event.is_expired(now) {
            if event.mark_expired(now) {
                self.store.put(&event).await?;
                info!(event_id, "Event expired");
                return Ok(Reconciliation::Expired);
            }
            return Ok(Reconciliation::Settled);
        }
        if event.status(now).is_final() {
            return Ok(Reconciliation::Settled);
        }

        settle_continuation("start embedding", self.start_embedding_locked(&mut event).await)?;
        settle_continuation("start blending", self.start_blending_locked(&mut event).await)?;
        Ok(Reconciliation::InProgress)
    }
}

/// Filter the outcome of a best-effort step: benign outcomes become `Ok`,
/// everything else is handed back to the caller.
pub(crate) fn settle_continuation(step: &'static str, outcome: Result<()>) -> Result<()> {
    match outcome {
        Err(e) if e.is_benign() => {
            debug!(step, reason = %e, "Nothing to do yet");
            Ok(())
        }
        other => other,
    }
}
