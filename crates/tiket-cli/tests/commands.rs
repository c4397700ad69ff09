use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tiket_cli::cli::{AssignArgs, ConfirmArgs, DiagnoseArgs, PreviewArgs};
use tiket_cli::commands::{engine_config, run_assign, run_confirm, run_diagnose, run_preview};
use tiket_ingest::ColumnKind;
use tiket_model::{AssignmentStrategy, IssueCode, MissingnessSignal};
use tiket_validate::{ConfirmationError, ConfirmedTemplate};

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const SERVICE_ARTIFACT: &str = r#"{
    "tables": [{
        "header_range": "A1:D1",
        "data_range": "A2:D40",
        "columns": [
            { "name": "Fecha de visita", "range": "A2:A40", "samples": ["2024-05-01", "2024-05-02", ""] },
            { "name": "Monto total", "range": "B2:B40", "samples": ["10", "12.5", "8"] },
            { "name": "Nombre cliente", "range": "C2:C40" },
            { "name": " ", "range": "D2:D40" }
        ]
    }],
    "anchors": [{ "label": "Reporte de servicio", "cell": "A1" }],
    "formula_index": { "=SUM(B2:B40)": ["B41"] },
    "format_groups": { "currency": ["B2"], "date": ["A2"] },
    "fingerprint": { "anchor_hash": "anc-fs01", "formula_fingerprint": "sum" }
}"#;

fn assign_args(technicians: &Path, jobs: &Path) -> AssignArgs {
    AssignArgs {
        technicians: technicians.to_path_buf(),
        jobs: jobs.to_path_buf(),
        settings: None,
        batch_size: None,
        flush_interval_ms: None,
        rank_timeout_ms: None,
        json: false,
    }
}

#[test]
fn preview_reports_known_layout() {
    let dir = TempDir::new().unwrap();
    write(&dir, "service.json", SERVICE_ARTIFACT);
    write(&dir, "notes.txt", "ignored");

    let previews = run_preview(&PreviewArgs {
        paths: vec![dir.path().to_path_buf()],
        catalog: None,
        json: false,
    })
    .unwrap();

    assert_eq!(previews.len(), 1);
    let preview = &previews[0];
    let columns: Vec<&str> = preview
        .classifications
        .iter()
        .map(|c| c.column.as_str())
        .collect();
    assert_eq!(
        columns,
        vec!["Fecha de visita", "Monto total", "Nombre cliente", "col_4"]
    );
    let strong = preview.suggestion.strong_match.as_ref().unwrap();
    assert_eq!(strong.template_id, "tpl-field-service");
    assert!(preview.suggestion.repeat_upload_hint.is_some());
    assert_eq!(preview.column_signals.len(), 2);
    assert_eq!(preview.column_signals[1].signals.numeric_ratio, 1.0);
    // three distinct amounts are too few to model as numeric
    assert_eq!(preview.column_signals[1].profile.kind, ColumnKind::Categorical);
    let dates = &preview.column_signals[0].profile;
    assert!((dates.coverage - 2.0 / 3.0).abs() < 1e-9);
    assert!(!dates.sparse);
    assert_eq!(preview.fingerprint_digest.len(), 64);
    // one table with four columns is not dense enough to rule out MNAR
    assert_eq!(preview.missingness.profile.signal, MissingnessSignal::Mnar);
    assert!(!preview.missingness.profile.imputation_permitted);
}

#[test]
fn preview_with_empty_catalog_proposes_a_new_template() {
    let dir = TempDir::new().unwrap();
    let artifact = write(&dir, "service.json", SERVICE_ARTIFACT);
    let catalog = write(&dir, "catalog.txt", "{}");

    let previews = run_preview(&PreviewArgs {
        paths: vec![artifact],
        catalog: Some(catalog),
        json: true,
    })
    .unwrap();

    let suggestion = &previews[0].suggestion;
    assert!(suggestion.strong_match.is_none());
    assert!(suggestion.suggestions.is_empty());
    assert!(suggestion.propose_new_template);
}

#[test]
fn preview_without_artifacts_fails() {
    let dir = TempDir::new().unwrap();
    let err = run_preview(&PreviewArgs {
        paths: vec![dir.path().to_path_buf()],
        catalog: None,
        json: false,
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("no artifact files"));
}

#[test]
fn diagnose_blocks_an_unconfirmed_job() {
    let dir = TempDir::new().unwrap();
    let job = write(&dir, "job.json", r#"{ "id": "job-7" }"#);

    let diagnostics = run_diagnose(&DiagnoseArgs { job, json: false }).unwrap();
    assert_eq!(diagnostics.job_id, "job-7");
    assert!(!diagnostics.ready_to_run);
    assert!(diagnostics.has_code(IssueCode::TemplateNotConfirmed));
}

#[test]
fn confirm_accepts_the_strong_match() {
    let dir = TempDir::new().unwrap();
    let decision = write(
        &dir,
        "decision.json",
        r#"{
            "strong_match": {
                "template_id": "tpl-field-service",
                "template_version_id": "tpl-field-service-v3",
                "score": 0.98
            },
            "propose_new_template": false
        }"#,
    );

    let confirmed = run_confirm(&ConfirmArgs {
        decision,
        json: false,
    })
    .unwrap();
    assert_eq!(
        confirmed,
        ConfirmedTemplate::Existing {
            template_id: "tpl-field-service".to_string(),
            template_version_id: "tpl-field-service-v3".to_string(),
        }
    );
}

#[test]
fn confirm_rejects_an_ambiguous_decision() {
    let dir = TempDir::new().unwrap();
    let decision = write(
        &dir,
        "decision.json",
        r#"{
            "strong_match": {
                "template_id": "tpl-field-service",
                "template_version_id": "tpl-field-service-v3",
                "score": 0.98
            },
            "propose_new_template": true
        }"#,
    );

    let err = run_confirm(&ConfirmArgs {
        decision,
        json: false,
    })
    .unwrap_err();
    let rejected = err.downcast_ref::<ConfirmationError>().unwrap();
    assert!(matches!(
        rejected,
        ConfirmationError::AmbiguousDecision { .. }
    ));
}

#[test]
fn settings_file_and_flags_combine() {
    let dir = TempDir::new().unwrap();
    let settings = write(&dir, "settings.json", r#"{ "batch_size": 4 }"#);
    let mut args = assign_args(Path::new("techs.json"), Path::new("jobs.json"));
    args.settings = Some(settings);
    args.rank_timeout_ms = Some(500);

    let config = engine_config(&args).unwrap();
    assert_eq!(config.batch_size, 4);
    assert_eq!(config.rank_timeout, Duration::from_millis(500));
    assert_eq!(config.flush_interval, Duration::from_millis(250));
}

#[test]
fn assign_decides_every_ticket_in_request_order() {
    let dir = TempDir::new().unwrap();
    let technicians = write(
        &dir,
        "technicians.json",
        r#"[
            {
                "id": "t-1", "name": "Ana", "document_id": "CC100",
                "regions": ["norte"], "skills": ["fibra"], "availability": "ONLINE",
                "workload": 1, "max_workload": 5, "projects": ["proj-1"], "tier": "L2"
            },
            {
                "id": "t-2", "name": "Luis", "document_id": "CC200",
                "regions": ["sur"], "skills": ["fibra"], "availability": "OFFLINE",
                "workload": 0, "max_workload": 5, "projects": ["proj-1"], "tier": "L3"
            }
        ]"#,
    );
    let jobs = write(
        &dir,
        "jobs.json",
        r#"[
            { "ticket_id": "T-1", "project_id": "proj-1", "region": "norte",
              "required_skills": ["fibra"], "priority": "P1",
              "requested_at": "2024-05-01T10:00:00Z", "identity_document": "CC999" },
            { "ticket_id": "T-2", "project_id": "proj-1", "region": "norte",
              "required_skills": ["fibra"], "priority": "P3",
              "requested_at": "2024-05-01T10:05:00Z" },
            { "ticket_id": "T-3", "project_id": "proj-9", "region": "norte",
              "required_skills": [], "priority": "P2",
              "requested_at": "2024-05-01T10:10:00Z" }
        ]"#,
    );
    let mut args = assign_args(&technicians, &jobs);
    args.batch_size = Some(2);
    args.flush_interval_ms = Some(0);

    let run = run_assign(&args).unwrap();

    let tickets: Vec<&str> = run.decisions.iter().map(|d| d.ticket_id.as_str()).collect();
    assert_eq!(tickets, vec!["T-1", "T-2", "T-3"]);
    assert_eq!(run.decisions[0].strategy, AssignmentStrategy::MlRanking);
    assert_eq!(
        run.decisions[0].technician_id.as_ref().unwrap().as_str(),
        "t-1"
    );
    assert_eq!(run.decisions[2].strategy, AssignmentStrategy::HardStop);
    assert!(run.has_hard_stops());
    assert!(run.abandoned.is_empty());
    assert_eq!(run.metrics.processed, 3);
}
