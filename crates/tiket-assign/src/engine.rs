//! Batched assignment engine.
//!
//! Jobs are buffered in FIFO order and decided in batches. A batch is
//! flushed when the buffer reaches the batch size, on every tick of the
//! flush timer, or on an explicit [`AssignmentEngine::flush_pending`] call.
//! Only one flush runs at a time; background triggers that find a flush in
//! progress skip, since the running flush keeps going while a full batch
//! is waiting.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tiket_model::{
    AssignmentDecision, AssignmentJob, AssignmentMetrics, AssignmentStrategy, TechnicianId,
    TechnicianProfile,
};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::EngineConfig;
use crate::directory::TechnicianDirectory;
use crate::fallback::FallbackSelector;
use crate::filter::{CandidatePool, candidate_pool};
use crate::metrics::EngineMetrics;
use crate::rank::{RankError, Ranker};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("assignment engine is stopped")]
    Stopped,
}

/// Decisions produced by size- and timer-triggered flushes.
pub type DecisionStream = mpsc::UnboundedReceiver<AssignmentDecision>;

/// State left behind by [`AssignmentEngine::stop`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShutdownReport {
    /// Jobs still buffered at shutdown; never handed to a flush.
    pub abandoned: Vec<AssignmentJob>,
    pub metrics: AssignmentMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Size,
    Timer,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Timer => "timer",
        }
    }
}

struct Shared {
    directory: Arc<TechnicianDirectory>,
    config: EngineConfig,
    ranker: Arc<dyn Ranker>,
    fallback: Arc<dyn FallbackSelector>,
    queue: Mutex<VecDeque<AssignmentJob>>,
    flush_gate: tokio::sync::Mutex<()>,
    metrics: EngineMetrics,
    decisions: mpsc::UnboundedSender<AssignmentDecision>,
    stopped: AtomicBool,
}

impl Shared {
    fn queue(&self) -> MutexGuard<'_, VecDeque<AssignmentJob>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn queue_depth(&self) -> usize {
        self.queue().len()
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn take_batch(&self) -> Vec<AssignmentJob> {
        let mut queue = self.queue();
        let count = self.config.batch_size.min(queue.len());
        queue.drain(..count).collect()
    }

    /// Flush started by the size threshold or the timer.
    ///
    /// Skips when another flush holds the gate. After releasing the gate the
    /// buffer is checked again so a batch filled during the flush is not
    /// left waiting for the next tick.
    async fn background_flush(&self, trigger: Trigger) {
        let mut partial_allowed = trigger == Trigger::Timer;
        loop {
            let Ok(gate) = self.flush_gate.try_lock() else {
                debug!(trigger = trigger.as_str(), "flush already in flight");
                return;
            };
            loop {
                if self.is_stopped() {
                    return;
                }
                let depth = self.queue_depth();
                if depth == 0 || (depth < self.config.batch_size && !partial_allowed) {
                    break;
                }
                partial_allowed = false;
                for decision in self.flush_batch().await {
                    if self.decisions.send(decision).is_err() {
                        debug!("decision stream closed");
                    }
                }
            }
            drop(gate);
            if self.queue_depth() < self.config.batch_size {
                return;
            }
        }
    }

    /// Removes up to one batch from the buffer and decides every job in it.
    async fn flush_batch(&self) -> Vec<AssignmentDecision> {
        let batch = self.take_batch();
        if batch.is_empty() {
            return Vec::new();
        }
        self.metrics.record_batch_size(batch.len());
        let span = info_span!("batch", size = batch.len());
        async {
            info!("batch started");
            let technicians = self.directory.snapshot();
            let decisions = join_all(batch.iter().map(|job| self.decide(job, &technicians))).await;
            self.metrics.record_processed(decisions.len());
            info!(remaining = self.queue_depth(), "batch finished");
            decisions
        }
        .instrument(span)
        .await
    }

    async fn decide(
        &self,
        job: &AssignmentJob,
        technicians: &[TechnicianProfile],
    ) -> AssignmentDecision {
        let pool = candidate_pool(job, technicians);
        if pool.is_empty() {
            return self.hard_stop(job, &pool, technicians.len());
        }
        let candidate_ids: Vec<TechnicianId> =
            pool.candidates.iter().map(|t| t.id.clone()).collect();

        match self.rank(job, &pool.candidates).await {
            Ok(chosen) => {
                debug!(ticket = %job.ticket_id, technician = %chosen, "ranked");
                AssignmentDecision {
                    ticket_id: job.ticket_id.clone(),
                    rationale: format!(
                        "{} ranked {chosen} first among {} eligible technicians",
                        self.ranker.name(),
                        candidate_ids.len()
                    ),
                    technician_id: Some(chosen),
                    strategy: AssignmentStrategy::MlRanking,
                    candidate_pool: candidate_ids,
                    notes: None,
                }
            }
            Err(err) => {
                self.metrics.record_ml_failure();
                warn!(ticket = %job.ticket_id, error = %err, "ranking failed, using fallback");
                match self.fallback.select(job, &pool.candidates) {
                    Some(technician) => {
                        self.metrics.record_fallback();
                        AssignmentDecision {
                            ticket_id: job.ticket_id.clone(),
                            technician_id: Some(technician.id.clone()),
                            strategy: AssignmentStrategy::DeterministicFallback,
                            rationale: format!(
                                "Fallback chose {} with workload {}/{} ({})",
                                technician.id,
                                technician.workload,
                                technician.max_workload,
                                technician.tier
                            ),
                            candidate_pool: candidate_ids,
                            notes: Some(vec![err.to_string()]),
                        }
                    }
                    None => {
                        let mut decision = self.hard_stop(job, &pool, technicians.len());
                        decision.candidate_pool = candidate_ids;
                        decision.rationale =
                            "Fallback selector returned no technician".to_string();
                        decision
                    }
                }
            }
        }
    }

    async fn rank(
        &self,
        job: &AssignmentJob,
        candidates: &[TechnicianProfile],
    ) -> Result<TechnicianId, RankError> {
        let limit = self.config.rank_timeout;
        let ranking = timeout(limit, self.ranker.rank(job, candidates))
            .await
            .map_err(|_| RankError::Timeout(limit))??;
        let first = ranking.into_iter().next().ok_or(RankError::EmptyRanking)?;
        if candidates.iter().any(|t| t.id == first) {
            Ok(first)
        } else {
            Err(RankError::UnknownCandidate(first))
        }
    }

    fn hard_stop(
        &self,
        job: &AssignmentJob,
        pool: &CandidatePool,
        directory_size: usize,
    ) -> AssignmentDecision {
        self.metrics.record_hard_stop();
        warn!(ticket = %job.ticket_id, "no eligible technician");
        let notes = pool.exclusion_notes();
        AssignmentDecision {
            ticket_id: job.ticket_id.clone(),
            technician_id: None,
            strategy: AssignmentStrategy::HardStop,
            rationale: format!(
                "None of the {directory_size} technicians satisfies the hard constraints for project {}",
                job.project_id
            ),
            candidate_pool: Vec::new(),
            notes: (!notes.is_empty()).then_some(notes),
        }
    }
}

async fn run_timer(shared: Arc<Shared>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => shared.background_flush(Trigger::Timer).await,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    debug!("flush timer stopped");
}

/// Assigns buffered jobs to technicians in batches.
pub struct AssignmentEngine {
    shared: Arc<Shared>,
    shutdown: watch::Sender<bool>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl AssignmentEngine {
    /// Starts the engine.
    ///
    /// The flush timer runs on the current Tokio runtime; without one, only
    /// explicit flushes happen.
    pub fn start(
        directory: Arc<TechnicianDirectory>,
        config: EngineConfig,
        ranker: Arc<dyn Ranker>,
        fallback: Arc<dyn FallbackSelector>,
    ) -> (Self, DecisionStream) {
        // struct literals bypass `with_batch_size`
        let config = EngineConfig {
            batch_size: config.batch_size.max(1),
            ..config
        };
        let (decisions, stream) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let shared = Arc::new(Shared {
            directory,
            config,
            ranker,
            fallback,
            queue: Mutex::new(VecDeque::new()),
            flush_gate: tokio::sync::Mutex::new(()),
            metrics: EngineMetrics::default(),
            decisions,
            stopped: AtomicBool::new(false),
        });

        let timer = if config.timer_enabled() {
            match Handle::try_current() {
                Ok(handle) => Some(handle.spawn(run_timer(
                    Arc::clone(&shared),
                    config.flush_interval,
                    shutdown_rx,
                ))),
                Err(_) => {
                    warn!("no async runtime, flush timer disabled");
                    None
                }
            }
        } else {
            None
        };
        info!(
            batch_size = config.batch_size,
            flush_interval_ms = config.flush_interval.as_millis() as u64,
            rank_timeout_ms = config.rank_timeout.as_millis() as u64,
            "assignment engine started"
        );

        let engine = Self {
            shared,
            shutdown,
            timer: Mutex::new(timer),
        };
        (engine, stream)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn directory(&self) -> &Arc<TechnicianDirectory> {
        &self.shared.directory
    }

    /// Buffers a job. A full buffer schedules a background flush.
    pub fn enqueue(&self, job: AssignmentJob) -> Result<(), EngineError> {
        if self.shared.is_stopped() {
            return Err(EngineError::Stopped);
        }
        let depth = {
            let mut queue = self.shared.queue();
            queue.push_back(job);
            queue.len()
        };
        self.shared.metrics.record_enqueued();

        if depth >= self.shared.config.batch_size {
            match Handle::try_current() {
                Ok(handle) => {
                    let shared = Arc::clone(&self.shared);
                    handle.spawn(async move { shared.background_flush(Trigger::Size).await });
                }
                Err(_) => warn!(depth, "no async runtime, full batch waits for the next flush"),
            }
        }
        Ok(())
    }

    /// Decides everything currently buffered, batch by batch.
    ///
    /// Waits for an in-flight flush first. The decisions are returned here
    /// and not published on the decision stream.
    pub async fn flush_pending(&self) -> Vec<AssignmentDecision> {
        let _gate = self.shared.flush_gate.lock().await;
        let mut decisions = Vec::new();
        loop {
            let batch = self.shared.flush_batch().await;
            if batch.is_empty() {
                break;
            }
            decisions.extend(batch);
        }
        decisions
    }

    /// Counters with the live buffer depth.
    pub fn metrics(&self) -> AssignmentMetrics {
        self.shared.metrics.snapshot(self.shared.queue_depth())
    }

    /// Stops the timer, waits for an in-flight flush and hands back the
    /// jobs that were never flushed.
    pub async fn stop(&self) -> ShutdownReport {
        self.shared.stopped.store(true, Ordering::SeqCst);
        // receiver may already be gone with the timer task
        let _ = self.shutdown.send(true);

        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = timer
            && let Err(err) = handle.await
        {
            warn!(error = %err, "flush timer task failed");
        }

        let _gate = self.shared.flush_gate.lock().await;
        let abandoned: Vec<AssignmentJob> = self.shared.queue().drain(..).collect();
        if !abandoned.is_empty() {
            warn!(jobs = abandoned.len(), "jobs left in the buffer at shutdown");
        }
        info!("assignment engine stopped");
        ShutdownReport {
            abandoned,
            metrics: self.metrics(),
        }
    }
}

impl Drop for AssignmentEngine {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}
