//! Pipeline orchestration: one run from subjects to ranked reports.
//!
//! # Run pipeline
//!
//! 1. Validate configuration — the only fatal error class
//! 2. Fan out one search per subject concurrently with
//!    [`futures::future::join_all`]; the shared interval limiter is the
//!    backpressure point, so issuing every subject at once is safe
//! 3. Log per-subject search failures at warn level; a failed subject
//!    contributes an empty result set, never aborts the batch
//! 4. Deduplicate sequentially against one run-scoped seen-set, subjects
//!    in input order — a URL surfaced by several subjects is evaluated
//!    once, attributed to the first subject that returned it
//! 5. Evaluate every unique survivor concurrently, throttled only by the
//!    shared timed-release semaphore; failures are isolated per item
//! 6. Rank each subject's kept items and truncate to the per-subject cap
//!
//! Every input subject ends up with a report entry, possibly empty. A
//! cancellation token stops new searches and evaluations from being
//! issued; in-flight calls complete and held limiter slots drain normally.

use std::collections::{HashMap, HashSet};
use std::fmt;

use futures::future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::eval::{Evaluator, ReasoningProvider};
use crate::pipeline::{dedup, rank};
use crate::search::SearchProvider;
use crate::types::{EvaluatedItem, NewsItem, ResearchReport};

/// Phase of a pipeline run. Advances strictly forward; `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Run accepted, nothing issued yet.
    Pending,
    /// Per-subject search fan-out in flight.
    Searching,
    /// Sequential merge against the run's seen-set.
    Deduping,
    /// Concurrent per-item evaluation in flight.
    Evaluating,
    /// Per-subject ranking and truncation.
    Ranking,
    /// Report assembled.
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Searching => "searching",
            Self::Deduping => "deduping",
            Self::Evaluating => "evaluating",
            Self::Ranking => "ranking",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// The research pipeline over a search backend and a reasoning provider.
#[derive(Debug)]
pub struct ResearchPipeline<S, R> {
    config: PipelineConfig,
    search: S,
    evaluator: Evaluator<R>,
}

impl<S: SearchProvider, R: ReasoningProvider> ResearchPipeline<S, R> {
    /// Assemble a pipeline from its collaborators.
    pub fn new(search: S, evaluator: Evaluator<R>, config: PipelineConfig) -> Self {
        Self {
            config,
            search,
            evaluator,
        }
    }

    /// Run the pipeline with a fresh seen-set and no external cancellation.
    pub async fn run(&self, subjects: &[String]) -> Result<ResearchReport> {
        let mut seen = HashSet::new();
        self.run_with(subjects, &mut seen, CancellationToken::new())
            .await
    }

    /// Run the pipeline against a caller-owned seen-set.
    ///
    /// `seen` may be pre-seeded with canonical URL keys from earlier runs
    /// (carry-forward dedup) and is updated in place for the caller to
    /// persist. Triggering `cancel` stops new work from being issued;
    /// already-started calls finish and the report covers whatever
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ResearchError::Config`] if the configuration is
    /// invalid — the only error that aborts a run.
    pub async fn run_with(
        &self,
        subjects: &[String],
        seen: &mut HashSet<String>,
        cancel: CancellationToken,
    ) -> Result<ResearchReport> {
        let run_id = Uuid::new_v4();
        let mut phase = RunPhase::Pending;

        self.config.validate()?;

        // 1. Search every subject concurrently.
        self.advance(run_id, &mut phase, RunPhase::Searching);
        let searches = subjects.iter().map(|subject| {
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    debug!(subject = %subject, "cancelled before search");
                    return Vec::new();
                }
                match self.search.search(subject).await {
                    Ok(items) => items,
                    Err(err) => {
                        warn!(subject = %subject, error = %err, "search failed, subject contributes no results");
                        Vec::new()
                    }
                }
            }
        });
        let batches: Vec<Vec<NewsItem>> = future::join_all(searches).await;

        // 2. Merge against the run's seen-set, subjects in input order.
        self.advance(run_id, &mut phase, RunPhase::Deduping);
        let mut unique: Vec<(usize, NewsItem)> = Vec::new();
        for (index, batch) in batches.into_iter().enumerate() {
            for item in dedup::dedupe(seen, batch) {
                unique.push((index, item));
            }
        }
        debug!(run = %run_id, unique = unique.len(), "deduplicated result set");

        // 3. Evaluate all unique items concurrently.
        self.advance(run_id, &mut phase, RunPhase::Evaluating);
        let evaluations = unique.into_iter().map(|(index, item)| {
            let cancel = cancel.clone();
            let subject = subjects[index].as_str();
            async move {
                if cancel.is_cancelled() {
                    debug!(url = %item.url, "cancelled before evaluation");
                    return None;
                }
                Some((index, self.evaluator.evaluate(subject, item).await))
            }
        });
        let evaluated = future::join_all(evaluations).await;

        // 4. Rank per subject; every subject gets an entry.
        self.advance(run_id, &mut phase, RunPhase::Ranking);
        let mut buckets: Vec<Vec<EvaluatedItem>> = vec![Vec::new(); subjects.len()];
        for (index, item) in evaluated.into_iter().flatten() {
            buckets[index].push(item);
        }

        let mut reports = HashMap::with_capacity(subjects.len());
        for (index, subject) in subjects.iter().enumerate() {
            let ranked = rank::rank(
                std::mem::take(&mut buckets[index]),
                self.config.max_per_subject,
            );
            reports.insert(subject.clone(), ranked);
        }

        self.advance(run_id, &mut phase, RunPhase::Done);
        let report = ResearchReport {
            run_id,
            subjects: reports,
        };
        info!(
            run = %run_id,
            subjects = subjects.len(),
            kept = report.total_kept(),
            "research run complete"
        );
        Ok(report)
    }

    fn advance(&self, run_id: Uuid, phase: &mut RunPhase, next: RunPhase) {
        debug!(run = %run_id, from = %phase, to = %next, "run phase");
        *phase = next;
    }
}
