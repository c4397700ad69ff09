use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tiket_assign::{
    AssignmentEngine, EngineConfig, EngineError, HeuristicRanker, LeastLoadedSelector, RankError,
    Ranker, TechnicianDirectory,
};
use tiket_model::{
    AssignmentJob, AssignmentStrategy, Availability, Priority, TechnicianId, TechnicianProfile,
    Tier, TicketId,
};

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn technician(id: &str, tier: Tier, workload: u32, max_workload: u32) -> TechnicianProfile {
    TechnicianProfile {
        id: TechnicianId::new(id).unwrap(),
        name: format!("Tecnico {id}"),
        document_id: format!("CC{id}"),
        regions: set(&["norte"]),
        skills: set(&["fibra"]),
        availability: Availability::Online,
        workload,
        max_workload,
        projects: set(&["proj-1"]),
        tier,
    }
}

fn job(ticket: &str) -> AssignmentJob {
    AssignmentJob {
        ticket_id: TicketId::new(ticket).unwrap(),
        project_id: "proj-1".to_string(),
        region: Some("norte".to_string()),
        required_skills: set(&["fibra"]),
        priority: Priority::P2,
        requested_at: Utc::now(),
        identity_document: None,
    }
}

fn directory(profiles: Vec<TechnicianProfile>) -> Arc<TechnicianDirectory> {
    Arc::new(TechnicianDirectory::new(profiles).unwrap())
}

fn no_timer() -> EngineConfig {
    EngineConfig::default().with_flush_interval(Duration::ZERO)
}

fn start(
    profiles: Vec<TechnicianProfile>,
    config: EngineConfig,
    ranker: Arc<dyn Ranker>,
) -> (AssignmentEngine, tiket_assign::DecisionStream) {
    AssignmentEngine::start(
        directory(profiles),
        config,
        ranker,
        Arc::new(LeastLoadedSelector),
    )
}

struct FailingRanker;

#[async_trait]
impl Ranker for FailingRanker {
    async fn rank(
        &self,
        _job: &AssignmentJob,
        _candidates: &[TechnicianProfile],
    ) -> Result<Vec<TechnicianId>, RankError> {
        Err(RankError::Failed("model unavailable".to_string()))
    }
}

struct SlowRanker(Duration);

#[async_trait]
impl Ranker for SlowRanker {
    async fn rank(
        &self,
        job: &AssignmentJob,
        candidates: &[TechnicianProfile],
    ) -> Result<Vec<TechnicianId>, RankError> {
        tokio::time::sleep(self.0).await;
        Ok(HeuristicRanker::ranking(job, candidates))
    }
}

struct OutsiderRanker;

#[async_trait]
impl Ranker for OutsiderRanker {
    async fn rank(
        &self,
        _job: &AssignmentJob,
        _candidates: &[TechnicianProfile],
    ) -> Result<Vec<TechnicianId>, RankError> {
        Ok(vec![TechnicianId::new("t-ghost").unwrap()])
    }
}

#[tokio::test(start_paused = true)]
async fn timer_flushes_a_partial_batch() {
    let config = EngineConfig::default()
        .with_batch_size(10)
        .with_flush_interval(Duration::from_millis(50));
    let (engine, mut stream) = start(
        vec![technician("t-1", Tier::L2, 0, 5)],
        config,
        Arc::new(HeuristicRanker),
    );
    for ticket in ["T-1", "T-2", "T-3"] {
        engine.enqueue(job(ticket)).unwrap();
    }
    assert_eq!(engine.metrics().queue_depth, 3);

    tokio::time::sleep(Duration::from_millis(60)).await;

    let mut decisions = Vec::new();
    for _ in 0..3 {
        decisions.push(stream.recv().await.unwrap());
    }
    assert!(stream.try_recv().is_err());
    let tickets: Vec<&str> = decisions.iter().map(|d| d.ticket_id.as_str()).collect();
    assert_eq!(tickets, vec!["T-1", "T-2", "T-3"]);
    assert!(
        decisions
            .iter()
            .all(|d| d.strategy == AssignmentStrategy::MlRanking)
    );

    let metrics = engine.metrics();
    assert_eq!(metrics.processed, 3);
    assert_eq!(metrics.queue_depth, 0);
    assert_eq!(metrics.last_batch_size, 3);
    engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn full_batch_flushes_without_waiting_for_the_timer() {
    let config = EngineConfig::default()
        .with_batch_size(2)
        .with_flush_interval(Duration::from_secs(60));
    let (engine, mut stream) = start(
        vec![technician("t-1", Tier::L2, 0, 5)],
        config,
        Arc::new(HeuristicRanker),
    );
    engine.enqueue(job("T-1")).unwrap();
    engine.enqueue(job("T-2")).unwrap();
    engine.enqueue(job("T-3")).unwrap();

    let first = stream.recv().await.unwrap();
    let second = stream.recv().await.unwrap();
    assert_eq!(first.ticket_id.as_str(), "T-1");
    assert_eq!(second.ticket_id.as_str(), "T-2");
    assert_eq!(engine.metrics().queue_depth, 1);

    let report = engine.stop().await;
    assert_eq!(report.abandoned.len(), 1);
    assert_eq!(report.abandoned[0].ticket_id.as_str(), "T-3");
    assert_eq!(report.metrics.processed, 2);
}

#[tokio::test]
async fn technician_at_capacity_leads_to_hard_stop() {
    let (engine, _stream) = start(
        vec![technician("t-full", Tier::L3, 4, 4)],
        no_timer(),
        Arc::new(HeuristicRanker),
    );
    engine.enqueue(job("T-1")).unwrap();
    let decisions = engine.flush_pending().await;

    assert_eq!(decisions.len(), 1);
    let decision = &decisions[0];
    assert_eq!(decision.strategy, AssignmentStrategy::HardStop);
    assert!(decision.technician_id.is_none());
    assert!(decision.candidate_pool.is_empty());
    assert_eq!(decision.notes, Some(vec!["1 at capacity".to_string()]));
    assert_eq!(engine.metrics().hard_stops, 1);
}

#[tokio::test]
async fn failing_ranker_falls_back_to_lowest_workload() {
    let (engine, _stream) = start(
        vec![
            technician("t-3", Tier::L3, 3, 5),
            technician("t-1", Tier::L2, 1, 5),
            technician("t-2", Tier::L1, 2, 5),
        ],
        no_timer(),
        Arc::new(FailingRanker),
    );
    for ticket in ["T-1", "T-2", "T-3", "T-4"] {
        engine.enqueue(job(ticket)).unwrap();
    }
    let decisions = engine.flush_pending().await;

    assert_eq!(decisions.len(), 4);
    for decision in &decisions {
        assert_eq!(decision.strategy, AssignmentStrategy::DeterministicFallback);
        assert_eq!(decision.technician_id.as_ref().unwrap().as_str(), "t-1");
        assert_eq!(decision.candidate_pool.len(), 3);
        assert_eq!(
            decision.notes,
            Some(vec!["ranker failed: model unavailable".to_string()])
        );
    }
    let metrics = engine.metrics();
    assert_eq!(metrics.ml_failures, 4);
    assert_eq!(metrics.fallback_decisions, 4);
    assert_eq!(metrics.processed, 4);
}

#[tokio::test(start_paused = true)]
async fn slow_ranker_times_out_into_fallback() {
    let config = no_timer().with_rank_timeout(Duration::from_millis(100));
    let (engine, _stream) = start(
        vec![technician("t-1", Tier::L2, 0, 5)],
        config,
        Arc::new(SlowRanker(Duration::from_secs(10))),
    );
    engine.enqueue(job("T-1")).unwrap();
    let decisions = engine.flush_pending().await;

    assert_eq!(decisions[0].strategy, AssignmentStrategy::DeterministicFallback);
    assert!(
        decisions[0].notes.as_ref().unwrap()[0].contains("did not answer within")
    );
    assert_eq!(engine.metrics().ml_failures, 1);
}

#[tokio::test]
async fn ranking_outside_the_pool_is_a_failure() {
    let (engine, _stream) = start(
        vec![technician("t-1", Tier::L2, 0, 5)],
        no_timer(),
        Arc::new(OutsiderRanker),
    );
    engine.enqueue(job("T-1")).unwrap();
    let decisions = engine.flush_pending().await;
    assert_eq!(decisions[0].strategy, AssignmentStrategy::DeterministicFallback);
    assert_eq!(decisions[0].technician_id.as_ref().unwrap().as_str(), "t-1");
    assert_eq!(engine.metrics().ml_failures, 1);
}

#[tokio::test]
async fn concurrent_flushes_decide_each_job_once() {
    let config = no_timer().with_batch_size(2);
    let (engine, mut stream) = start(
        vec![technician("t-1", Tier::L2, 0, 5)],
        config,
        Arc::new(SlowRanker(Duration::from_millis(1))),
    );
    // every second enqueue schedules a size-triggered flush that races with flush_pending
    for ticket in ["T-1", "T-2", "T-3", "T-4", "T-5"] {
        engine.enqueue(job(ticket)).unwrap();
    }
    let flushed = engine.flush_pending().await;
    let report = engine.stop().await;

    let mut decided: Vec<String> = flushed
        .iter()
        .map(|d| d.ticket_id.as_str().to_string())
        .collect();
    let mut ordered = decided.clone();
    ordered.sort();
    assert_eq!(decided, ordered);

    while let Ok(decision) = stream.try_recv() {
        decided.push(decision.ticket_id.as_str().to_string());
    }
    decided.sort();
    assert_eq!(decided, vec!["T-1", "T-2", "T-3", "T-4", "T-5"]);
    assert!(report.abandoned.is_empty());
    assert_eq!(report.metrics.processed, 5);
}

#[tokio::test]
async fn enqueue_after_stop_is_rejected() {
    let (engine, _stream) = start(
        vec![technician("t-1", Tier::L2, 0, 5)],
        no_timer(),
        Arc::new(HeuristicRanker),
    );
    engine.enqueue(job("T-1")).unwrap();
    let report = engine.stop().await;
    assert_eq!(report.abandoned.len(), 1);
    assert_eq!(report.metrics.enqueued, 1);
    assert_eq!(engine.enqueue(job("T-2")), Err(EngineError::Stopped));
}

#[tokio::test]
async fn directory_reload_applies_to_the_next_batch() {
    let (engine, _stream) = start(
        vec![technician("t-1", Tier::L2, 0, 5)],
        no_timer(),
        Arc::new(HeuristicRanker),
    );
    engine.enqueue(job("T-1")).unwrap();
    assert_eq!(
        engine.flush_pending().await[0]
            .technician_id
            .as_ref()
            .unwrap()
            .as_str(),
        "t-1"
    );

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let replacement = vec![technician("t-9", Tier::L3, 0, 5)];
    file.write_all(serde_json::to_string(&replacement).unwrap().as_bytes())
        .unwrap();
    assert_eq!(engine.directory().reload_from_path(file.path()).unwrap(), 1);

    engine.enqueue(job("T-2")).unwrap();
    let decisions = engine.flush_pending().await;
    assert_eq!(decisions[0].technician_id.as_ref().unwrap().as_str(), "t-9");
}

#[tokio::test]
async fn zero_batch_size_is_treated_as_one() {
    let config = EngineConfig {
        batch_size: 0,
        ..no_timer()
    };
    let (engine, mut stream) = start(
        vec![technician("t-1", Tier::L2, 0, 5)],
        config,
        Arc::new(HeuristicRanker),
    );
    assert_eq!(engine.config().batch_size, 1);
    engine.enqueue(job("T-1")).unwrap();

    let flushed = tokio::time::timeout(Duration::from_secs(2), engine.flush_pending())
        .await
        .unwrap();
    let mut decided: Vec<String> = flushed
        .iter()
        .map(|d| d.ticket_id.as_str().to_string())
        .collect();
    engine.stop().await;
    while let Ok(decision) = stream.try_recv() {
        decided.push(decision.ticket_id.as_str().to_string());
    }
    assert_eq!(decided, vec!["T-1"]);
}
