//! Wound-photo lookup for the patient currently selected in a list view.
//!
//! Rapid re-selection is coalesced with a short debounce. Only the newest
//! selection issues a fetch; older ones resolve to `Superseded`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::error::{require_id, EngineError};
use crate::config::EngineConfig;
use crate::gateway::DataGateway;
use crate::models::HealthSample;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WoundPhoto {
    pub sample_id: String,
    pub url: String,
    pub submitted_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PhotoLookup {
    Found(WoundPhoto),
    NoPhoto,
    /// A newer selection arrived before this one was fetched.
    Superseded,
}

/// Newest sample carrying a displayable wound photo, ties broken by sample id.
/// Blank references count for compliance but have nothing to show.
pub fn latest_wound_photo(samples: &[HealthSample]) -> Option<WoundPhoto> {
    samples
        .iter()
        .filter_map(|s| {
            let url = s.wound_photo_url.as_deref()?.trim();
            (!url.is_empty()).then_some((s, url))
        })
        .max_by(|(a, _), (b, _)| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|(s, url)| WoundPhoto {
            sample_id: s.id.clone(),
            url: url.to_string(),
            submitted_at: s.submitted_at,
        })
}

#[derive(Debug)]
pub struct SelectionDebouncer {
    generation: AtomicU64,
    delay: Duration,
}

impl SelectionDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            generation: AtomicU64::new(0),
            delay,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(Duration::from_millis(config.selection_debounce_ms))
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Select `patient_id` and, if no newer selection follows within the
    /// debounce delay, look up its latest wound photo.
    pub async fn latest_wound_photo<G>(
        &self,
        gateway: &G,
        patient_id: &str,
    ) -> Result<PhotoLookup, EngineError>
    where
        G: DataGateway + ?Sized,
    {
        require_id(patient_id, "patient")?;
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if !self.is_current(ticket) {
            tracing::debug!(patient_id, "Selection superseded before fetch");
            return Ok(PhotoLookup::Superseded);
        }

        let samples = gateway.all_health_samples(patient_id).await?;
        if !self.is_current(ticket) {
            return Ok(PhotoLookup::Superseded);
        }

        Ok(match latest_wound_photo(&samples) {
            Some(photo) => PhotoLookup::Found(photo),
            None => PhotoLookup::NoPhoto,
        })
    }
}
