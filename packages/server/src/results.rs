use chrono::{DateTime, Utc};
use common::{BlendingResult, Hairstyle};
use serde::Serialize;

use crate::entity::ChangeEvent;

/// One rendered hairstyle, as shown to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedHairstyle {
    pub hairstyle: Hairstyle,
    pub result: BlendingResult,
}

/// What a client polling for results gets back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum ResultsView {
    NotReady,
    /// One entry per picked hairstyle, in pick order.
    Ready(Vec<RenderedHairstyle>),
    TimedOut,
}

impl ResultsView {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Compute the client-visible view of an event.
///
/// Past the deadline this is always `TimedOut`; the caller owns the
/// timeout side-effect. When every result is present the completion time
/// is stamped if it was not already.
pub fn results_view(event: &mut ChangeEvent, now: DateTime<Utc>) -> ResultsView {
    if event.is_expired(now) {
        return ResultsView::TimedOut;
    }

    let Some(rendered) = collect_rendered(event) else {
        return ResultsView::NotReady;
    };

    event.mark_finished(now);
    ResultsView::Ready(rendered)
}

fn collect_rendered(event: &ChangeEvent) -> Option<Vec<RenderedHairstyle>> {
    event.uploaded_picture.as_ref()?;
    event.embedding.as_ref()?;
    let hairstyles = event.hairstyles.as_ref()?;
    if event.blendings.len() != hairstyles.len() {
        return None;
    }

    hairstyles
        .iter()
        .map(|hairstyle| {
            let key = hairstyle.key();
            let blending = event.blendings.iter().find(|b| b.hairstyle.key() == key)?;
            let result = blending.inference.result.clone()?;
            Some(RenderedHairstyle {
                hairstyle: hairstyle.clone(),
                result,
            })
        })
        .collect()
}
