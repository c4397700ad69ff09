//! Diagnostics gate: decides whether an import job may run.
//!
//! The gate reads a snapshot of the job and emits one issue per triggered
//! condition, always in the same order. It never mutates the job and never
//! fails; a partial or empty job simply produces blocking issues.

use tiket_model::{
    DiagnosticIssue, ImportJob, IssueCode, JobDiagnostics, MissingnessProfile, MissingnessSignal,
};
use tracing::debug;

fn missing_structure() -> DiagnosticIssue {
    DiagnosticIssue::new(
        IssueCode::MissingStructure,
        "No structural artifact is attached to the job",
    )
    .with_recommendation("Run the preview step to analyze the spreadsheet layout")
}

fn template_not_confirmed() -> DiagnosticIssue {
    DiagnosticIssue::new(
        IssueCode::TemplateNotConfirmed,
        "No template version has been confirmed",
    )
    .with_recommendation("Confirm a suggested template or propose a new one")
}

fn new_template_proposed() -> DiagnosticIssue {
    DiagnosticIssue::new(
        IssueCode::NewTemplateProposed,
        "A new template was proposed for this layout",
    )
    .with_recommendation("Review the inferred field types before the template is created")
}

fn missingness_mnar(profile: &MissingnessProfile) -> DiagnosticIssue {
    DiagnosticIssue::new(
        IssueCode::MissingnessMnar,
        format!(
            "Missing values look not-at-random (confidence {:.2})",
            profile.confidence
        ),
    )
    .with_recommendation("Fill in the missing values at the source before importing")
}

fn ml_insights_missing() -> DiagnosticIssue {
    DiagnosticIssue::new(
        IssueCode::MlInsightsMissing,
        "No ML insights are stored for the job",
    )
    .with_recommendation("Run the preview step to compute classification and missingness insights")
}

fn pos_missing() -> DiagnosticIssue {
    DiagnosticIssue::new(IssueCode::PosMissing, "Point-of-service detection has not run")
        .with_recommendation("Run POS detection or map the POS column manually")
}

fn pos_required(column: Option<&str>) -> DiagnosticIssue {
    let message = match column {
        Some(column) => format!(
            "The template requires a point-of-service value and column '{column}' has none"
        ),
        None => "The template requires a point-of-service value and none was found".to_string(),
    };
    DiagnosticIssue::new(IssueCode::PosRequired, message)
        .with_recommendation("Add the POS column to the spreadsheet or pick it in the mapping step")
}

fn geolocation_blocked(message: Option<&str>) -> DiagnosticIssue {
    DiagnosticIssue::new(
        IssueCode::GeolocationBlocked,
        message.unwrap_or("Geolocation validation failed"),
    )
    .with_recommendation("Correct the addresses or coordinates flagged by geolocation validation")
}

fn missingness_blocked(profile: &MissingnessProfile) -> DiagnosticIssue {
    DiagnosticIssue::new(
        IssueCode::MissingnessBlocked,
        format!(
            "Imputation is not permitted (signal {}, confidence {:.2})",
            profile.signal, profile.confidence
        ),
    )
    .with_recommendation("Complete the missing values manually; automatic filling is disabled")
}

fn previous_errors(errors_ref: &str) -> DiagnosticIssue {
    DiagnosticIssue::new(
        IssueCode::PreviousErrors,
        format!("A previous run left an error file: {errors_ref}"),
    )
    .with_recommendation("Review the previous error file before retrying")
}

/// Evaluates every gate condition for a job snapshot.
pub fn analyze_diagnostics(job: &ImportJob) -> JobDiagnostics {
    let insights = job.ml_insights.as_ref();
    let suggestion = insights.and_then(|i| i.template_suggestion.as_ref());
    let missingness = insights.and_then(|i| i.missingness.as_ref());
    let pos = insights.and_then(|i| i.pos_detection.as_ref());
    let geolocation = insights.and_then(|i| i.geolocation.as_ref());

    let mut issues = Vec::new();
    if job.structure.is_none() {
        issues.push(missing_structure());
    }
    if job.template_resolution.is_none() {
        issues.push(template_not_confirmed());
    }
    if suggestion.is_some_and(|s| s.propose_new_template) {
        issues.push(new_template_proposed());
    }
    if let Some(profile) = missingness.filter(|p| p.signal == MissingnessSignal::Mnar) {
        issues.push(missingness_mnar(profile));
    }
    if insights.is_none() {
        issues.push(ml_insights_missing());
    }
    match pos {
        None => issues.push(pos_missing()),
        Some(detection) if detection.is_required_and_missing() => {
            issues.push(pos_required(detection.column.as_deref()));
        }
        Some(_) => {}
    }
    if let Some(check) = geolocation.filter(|g| !g.ok) {
        issues.push(geolocation_blocked(check.message.as_deref()));
    }
    if let Some(profile) =
        missingness.filter(|p| p.signal != MissingnessSignal::Mnar && !p.imputation_permitted)
    {
        issues.push(missingness_blocked(profile));
    }
    if let Some(errors_ref) = job.errors_ref.as_deref().filter(|r| !r.trim().is_empty()) {
        issues.push(previous_errors(errors_ref));
    }

    let diagnostics = JobDiagnostics::from_issues(job.id.clone(), issues);
    debug!(
        job_id = %diagnostics.job_id,
        ready_to_run = diagnostics.ready_to_run,
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "diagnostics evaluated"
    );
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiket_model::{GeolocationCheck, MlInsights, PosDetection, TemplateResolution};

    fn render(diagnostics: &JobDiagnostics) -> String {
        diagnostics
            .issues
            .iter()
            .map(|issue| format!("{} {}: {}", issue.level.label(), issue.code, issue.message))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_job_is_blocked() {
        let diagnostics = analyze_diagnostics(&ImportJob::new("job-1"));
        assert!(!diagnostics.ready_to_run);
        insta::assert_snapshot!(render(&diagnostics), @r"
        warning missing-structure: No structural artifact is attached to the job
        error template-not-confirmed: No template version has been confirmed
        error ml-insights-missing: No ML insights are stored for the job
        error pos-missing: Point-of-service detection has not run
        ");
    }

    #[test]
    fn risky_insights_follow_gate_order() {
        let job = ImportJob {
            template_resolution: Some(TemplateResolution {
                template_id: "tpl-a".to_string(),
                template_version_id: "tpl-a-v1".to_string(),
                confirmed_at: None,
            }),
            ml_insights: Some(MlInsights {
                missingness: Some(MissingnessProfile {
                    signal: MissingnessSignal::Mcar,
                    confidence: 0.52,
                    imputation_permitted: false,
                    blockers: None,
                }),
                pos_detection: Some(PosDetection {
                    column: Some("Punto de venta".to_string()),
                    required: true,
                    missing: true,
                }),
                geolocation: Some(GeolocationCheck {
                    ok: false,
                    message: Some("3 addresses could not be located".to_string()),
                }),
                ..MlInsights::default()
            }),
            errors_ref: Some("errors/job-2.csv".to_string()),
            ..ImportJob::new("job-2")
        };
        let diagnostics = analyze_diagnostics(&job);
        insta::assert_snapshot!(render(&diagnostics), @r"
        warning missing-structure: No structural artifact is attached to the job
        error pos-required: The template requires a point-of-service value and column 'Punto de venta' has none
        error geolocation-blocked: 3 addresses could not be located
        error missingness-blocked: Imputation is not permitted (signal MCAR, confidence 0.52)
        warning previous-errors: A previous run left an error file: errors/job-2.csv
        ");
        assert!(diagnostics.issues.iter().all(|i| i.recommendation.is_some()));
    }

    #[test]
    fn blank_error_reference_is_ignored() {
        let job = ImportJob {
            errors_ref: Some("  ".to_string()),
            ..ImportJob::new("job-3")
        };
        assert!(!analyze_diagnostics(&job).has_code(IssueCode::PreviousErrors));
    }
}
