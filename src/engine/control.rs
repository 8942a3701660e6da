//! Action loop: search each candidate, filter, reply to at most one item,
//! record it, cool down.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use opentelemetry::KeyValue;
use tokio::sync::Notify;
use tracing::{Instrument, info, warn};
use uuid::Uuid;

use super::reply;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::model::{CandidateRecord, LedgerEntry, ObservedItem};
use crate::source::{ActionSink, ItemSource};
use crate::telemetry::metrics;
use crate::telemetry::work::{record_state_transition, start_candidate_span};

/// Pacing for the action loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingConfig {
    /// Pause after every candidate.
    pub search_sleep: Duration,
    /// Extra pause after a reply was posted.
    pub post_sleep: Duration,
    /// Maximum items requested per search.
    pub batch_size: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            search_sleep: Duration::from_secs(10),
            post_sleep: Duration::from_secs(60),
            batch_size: 100,
        }
    }
}

impl PacingConfig {
    /// No sleeps at all (for testing).
    pub fn immediate() -> Self {
        Self {
            search_sleep: Duration::ZERO,
            post_sleep: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// What happened to a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// A reply was posted and recorded.
    Replied { item_id: String, reply_id: String },
    /// Nothing left after filtering.
    NoneEligible,
    /// The post was rejected; nothing was recorded.
    PostFailed { item_id: String, error: String },
}

/// Totals for one pass over the candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub candidates: usize,
    pub replied: usize,
    pub post_failures: usize,
    pub skipped_reshares: usize,
    pub skipped_duplicates: usize,
    /// Stopped early by a shutdown request.
    pub interrupted: bool,
}

/// Result of filtering one search batch.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    pub item: Option<&'a ObservedItem>,
    pub reshares: usize,
    pub duplicates: usize,
}

/// First item in source order that is neither a re-share nor already in
/// the ledger. Items after it are not inspected.
pub fn select_item<'a>(items: &'a [ObservedItem], ledger: &Ledger) -> Selection<'a> {
    let mut selection = Selection::default();
    for item in items {
        if item.is_reshare {
            info!(url = %item.url(), "skipping re-share");
            selection.reshares += 1;
            continue;
        }
        if let Some(entry) = ledger.get(&item.id) {
            info!(url = %item.url(), reply_id = %entry.reply_tweet_id, "already replied");
            selection.duplicates += 1;
            continue;
        }
        selection.item = Some(item);
        break;
    }
    selection
}

/// Requests a running [`ActionLoop`] to stop. Cheap to clone.
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    /// Stop before the next candidate, cutting short any cooldown in progress.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless shutdown is requested first.
    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let notified = self.notify.notified();
        if self.is_shutdown() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = notified => {}
        }
    }
}

/// The action loop. Owns the ledger for the lifetime of the run.
pub struct ActionLoop {
    search: Arc<dyn ItemSource>,
    sink: Arc<dyn ActionSink>,
    ledger: Ledger,
    pacing: PacingConfig,
    run_id: Uuid,
    shutdown: ShutdownHandle,
    summary: RunSummary,
}

impl ActionLoop {
    pub fn new(
        search: Arc<dyn ItemSource>,
        sink: Arc<dyn ActionSink>,
        ledger: Ledger,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            search,
            sink,
            ledger,
            pacing,
            run_id: Uuid::new_v4(),
            shutdown: ShutdownHandle::default(),
            summary: RunSummary::default(),
        }
    }

    /// Handle for stopping the loop from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Process every candidate in order, pausing between them.
    ///
    /// Returns early with an error if a search or a ledger write fails;
    /// replies already recorded stay recorded.
    pub async fn run(&mut self, candidates: Vec<CandidateRecord>) -> Result<RunSummary> {
        self.summary = RunSummary::default();
        info!(run_id = %self.run_id, candidates = candidates.len(), "action loop started");

        for candidate in &candidates {
            if self.shutdown.is_shutdown() {
                info!("shutdown requested, stopping before next candidate");
                self.summary.interrupted = true;
                break;
            }

            let outcome = self.process_candidate(candidate).await?;
            self.summary.candidates += 1;

            if matches!(outcome, CandidateOutcome::Replied { .. }) {
                info!(duration = ?self.pacing.post_sleep, "sleeping after reply");
                self.shutdown.sleep(self.pacing.post_sleep).await;
            }
            info!(duration = ?self.pacing.search_sleep, "sleeping before next candidate");
            self.shutdown.sleep(self.pacing.search_sleep).await;
        }

        info!(
            run_id = %self.run_id,
            processed = self.summary.candidates,
            replied = self.summary.replied,
            post_failures = self.summary.post_failures,
            "action loop finished"
        );
        Ok(self.summary.clone())
    }

    /// Search, filter, and reply to at most one item for `candidate`.
    pub async fn process_candidate(
        &mut self,
        candidate: &CandidateRecord,
    ) -> Result<CandidateOutcome> {
        let span = start_candidate_span(&self.run_id, &candidate.search_key);

        async {
            record_state_transition(&span, "pending", "searching");
            let items = self
                .search
                .search(&candidate.search_key, self.pacing.batch_size)
                .await?;
            metrics::searches().add(1, &[]);
            if !items.is_empty() {
                info!(
                    found = items.len(),
                    domain = %candidate.search_key,
                    locality = %candidate.locality,
                    site = %candidate.details.site_name,
                    "found items"
                );
            }

            record_state_transition(&span, "searching", "filtering");
            let selection = select_item(&items, &self.ledger);
            self.summary.skipped_reshares += selection.reshares;
            self.summary.skipped_duplicates += selection.duplicates;
            record_skips(&selection);

            let Some(item) = selection.item else {
                record_state_transition(&span, "filtering", "none_eligible");
                return Ok(CandidateOutcome::NoneEligible);
            };

            record_state_transition(&span, "filtering", "acting");
            let text = reply::render(candidate, &item.author);
            let receipt = match self.sink.post(&text, &item.id).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    warn!(url = %item.url(), error = %e, "reply failed, moving on");
                    metrics::replies().add(1, &[KeyValue::new("result", "failed")]);
                    self.summary.post_failures += 1;
                    return Ok(CandidateOutcome::PostFailed {
                        item_id: item.id.clone(),
                        error: e.to_string(),
                    });
                }
            };
            metrics::replies().add(1, &[KeyValue::new("result", "posted")]);
            info!(reply = %receipt.url(), in_reply_to = %item.url(), "reply posted");

            self.ledger
                .append(LedgerEntry::for_reply(candidate, item, &receipt))?;
            metrics::ledger_appends().add(1, &[]);
            self.summary.replied += 1;

            record_state_transition(&span, "acting", "cooldown");
            Ok(CandidateOutcome::Replied {
                item_id: item.id.clone(),
                reply_id: receipt.id,
            })
        }
        .instrument(span.clone())
        .await
    }
}

fn record_skips(selection: &Selection<'_>) {
    if selection.reshares > 0 {
        metrics::items_skipped().add(
            selection.reshares as u64,
            &[KeyValue::new("reason", "reshare")],
        );
    }
    if selection.duplicates > 0 {
        metrics::items_skipped().add(
            selection.duplicates as u64,
            &[KeyValue::new("reason", "duplicate")],
        );
    }
}
