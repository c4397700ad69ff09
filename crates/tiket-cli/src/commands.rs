use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, trace};

use tiket_assign::{
    AssignmentEngine, EngineConfig, EngineSettings, HeuristicRanker, LeastLoadedSelector,
    TechnicianDirectory,
};
use tiket_ingest::{
    discover_artifacts, load_artifact, load_assignment_jobs, load_confirmation, load_job,
    load_json, normalize_headers, pattern_signals, profile_column,
};
use tiket_map::{
    TemplateCatalog, TemplateMatcher, classify_columns, fingerprint_digest, structural_fingerprint,
};
use tiket_model::{AssignmentJob, JobDiagnostics};
use tiket_validate::{
    ConfirmedTemplate, analyze_diagnostics, detect_missingness, validate_confirmation,
};

use crate::cli::{AssignArgs, ConfirmArgs, DiagnoseArgs, PreviewArgs};
use crate::logging::redact_value;
use crate::types::{ArtifactPreview, AssignmentRun, ColumnSignals};

pub fn run_preview(args: &PreviewArgs) -> Result<Vec<ArtifactPreview>> {
    let catalog = match &args.catalog {
        Some(path) => load_json::<TemplateCatalog>(path, "template catalog")
            .with_context(|| format!("load catalog {}", path.display()))?,
        None => TemplateCatalog::default(),
    };
    let matcher = TemplateMatcher::new(catalog);
    let paths = discover_artifacts(&args.paths).context("discover artifacts")?;
    info!(artifacts = paths.len(), "previewing artifacts");

    paths
        .iter()
        .map(|path| preview_artifact(&matcher, path))
        .collect()
}

fn preview_artifact(matcher: &TemplateMatcher, path: &Path) -> Result<ArtifactPreview> {
    let span = info_span!("artifact", path = %path.display());
    let _guard = span.enter();

    let raw = load_artifact(path).with_context(|| format!("load {}", path.display()))?;
    let artifact = normalize_headers(&raw);
    let classifications = classify_columns(&artifact);
    let suggestion = matcher.suggest(&artifact, &classifications);
    let missingness = detect_missingness(&artifact);
    let column_signals = artifact
        .columns()
        .filter(|column| !column.samples.is_empty())
        .map(|column| ColumnSignals {
            column: column.name.clone(),
            sample_count: column.samples.len(),
            signals: pattern_signals(column.samples.as_slice()),
            profile: profile_column(column.samples.as_slice()),
        })
        .collect();
    let digest = fingerprint_digest(&structural_fingerprint(&artifact));
    debug!(
        columns = classifications.len(),
        strong_match = suggestion.strong_match.is_some(),
        signal = missingness.profile.signal.as_str(),
        "artifact previewed"
    );

    Ok(ArtifactPreview {
        path: path.to_path_buf(),
        fingerprint_digest: digest,
        classifications,
        suggestion,
        missingness,
        column_signals,
    })
}

pub fn run_diagnose(args: &DiagnoseArgs) -> Result<JobDiagnostics> {
    let job = load_job(&args.job).with_context(|| format!("load job {}", args.job.display()))?;
    let diagnostics = analyze_diagnostics(&job);
    info!(
        job_id = %diagnostics.job_id,
        ready = diagnostics.ready_to_run,
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "job diagnosed"
    );
    Ok(diagnostics)
}

pub fn run_confirm(args: &ConfirmArgs) -> Result<ConfirmedTemplate> {
    let decision = load_confirmation(&args.decision)
        .with_context(|| format!("load decision {}", args.decision.display()))?;
    let confirmed = validate_confirmation(&decision).context("confirm template")?;
    Ok(confirmed)
}

/// Engine configuration from the settings file, then flag overrides.
pub fn engine_config(args: &AssignArgs) -> Result<EngineConfig> {
    let settings = match &args.settings {
        Some(path) => load_json::<EngineSettings>(path, "engine settings")
            .with_context(|| format!("load settings {}", path.display()))?,
        None => EngineSettings::default(),
    };
    let mut config = EngineConfig::from(settings);
    if let Some(batch_size) = args.batch_size {
        config = config.with_batch_size(batch_size);
    }
    if let Some(ms) = args.flush_interval_ms {
        config = config.with_flush_interval(Duration::from_millis(ms));
    }
    if let Some(ms) = args.rank_timeout_ms {
        config = config.with_rank_timeout(Duration::from_millis(ms));
    }
    Ok(config)
}

pub fn run_assign(args: &AssignArgs) -> Result<AssignmentRun> {
    let config = engine_config(args)?;
    let directory = TechnicianDirectory::load(&args.technicians)
        .with_context(|| format!("load technicians {}", args.technicians.display()))?;
    let jobs = load_assignment_jobs(&args.jobs)
        .with_context(|| format!("load jobs {}", args.jobs.display()))?;
    info!(
        technicians = directory.len(),
        jobs = jobs.len(),
        "assigning tickets"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime.block_on(assign_all(Arc::new(directory), config, jobs))
}

async fn assign_all(
    directory: Arc<TechnicianDirectory>,
    config: EngineConfig,
    jobs: Vec<AssignmentJob>,
) -> Result<AssignmentRun> {
    let order: HashMap<String, usize> = jobs
        .iter()
        .enumerate()
        .map(|(index, job)| (job.ticket_id.as_str().to_string(), index))
        .collect();

    let (engine, mut stream) = AssignmentEngine::start(
        directory,
        config,
        Arc::new(HeuristicRanker),
        Arc::new(LeastLoadedSelector),
    );
    for job in jobs {
        if let Some(document) = job.identity_document.as_deref() {
            trace!(
                ticket = job.ticket_id.as_str(),
                document = redact_value(document),
                "queueing ticket"
            );
        }
        engine.enqueue(job).context("enqueue ticket")?;
    }

    let mut decisions = engine.flush_pending().await;
    let report = engine.stop().await;
    while let Ok(decision) = stream.try_recv() {
        decisions.push(decision);
    }
    decisions.sort_by_key(|decision| {
        order
            .get(decision.ticket_id.as_str())
            .copied()
            .unwrap_or(usize::MAX)
    });

    Ok(AssignmentRun {
        decisions,
        metrics: report.metrics,
        abandoned: report.abandoned,
    })
}
