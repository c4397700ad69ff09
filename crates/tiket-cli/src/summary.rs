use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tiket_model::{
    AssignmentDecision, AssignmentMetrics, AssignmentStrategy, ColumnClassification, IssueLevel,
    JobDiagnostics, MissingnessDetectionResult, MissingnessSignal, TemplateSuggestionResult,
};
use tiket_validate::ConfirmedTemplate;

use crate::types::{ArtifactPreview, AssignmentRun, ColumnSignals};

pub fn print_previews(previews: &[ArtifactPreview]) {
    for preview in previews {
        println!("Artifact: {}", preview.path.display());
        println!("Fingerprint: {}", preview.fingerprint_digest);
        println!("{}", classification_table(&preview.classifications));
        if !preview.column_signals.is_empty() {
            println!("{}", signal_table(&preview.column_signals));
        }
        println!("{}", suggestion_table(&preview.suggestion));
        print_suggestion_notes(&preview.suggestion);
        println!("{}", missingness_table(&preview.missingness));
        for note in &preview.missingness.notes {
            println!("- {note}");
        }
        println!();
    }
}

fn print_suggestion_notes(suggestion: &TemplateSuggestionResult) {
    println!("{}", suggestion.rationale);
    println!("{}", suggestion.technician_summary);
    if let Some(steps) = &suggestion.next_steps {
        for step in steps {
            println!("- {step}");
        }
    }
    if let Some(hint) = &suggestion.repeat_upload_hint {
        println!("Repeat upload: {}", hint.note);
        for prompt in &hint.required_prompts {
            println!("- {prompt}");
        }
    }
}

pub fn print_diagnostics(diagnostics: &JobDiagnostics) {
    println!("Job: {}", diagnostics.job_id);
    if diagnostics.issues.is_empty() {
        println!("Ready to run, no issues found.");
        return;
    }
    println!("{}", diagnostics_table(diagnostics));
    let status = if diagnostics.ready_to_run {
        "ready"
    } else {
        "blocked"
    };
    println!(
        "Status: {status} ({} errors, {} warnings)",
        diagnostics.error_count(),
        diagnostics.warning_count()
    );
}

pub fn print_confirmation(confirmed: &ConfirmedTemplate) {
    match confirmed {
        ConfirmedTemplate::Existing {
            template_id,
            template_version_id,
        } => println!("Confirmed template {template_id} version {template_version_id}"),
        ConfirmedTemplate::ProposeNew => println!("Confirmed: create a new template"),
    }
}

pub fn print_assignment(run: &AssignmentRun) {
    println!("{}", decision_table(&run.decisions));
    println!("{}", metrics_table(&run.metrics));
    if !run.abandoned.is_empty() {
        eprintln!("Not assigned:");
        for job in &run.abandoned {
            eprintln!("- {}", job.ticket_id);
        }
    }
}

pub fn classification_table(classifications: &[ColumnClassification]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Confidence"),
        header_cell("Evidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for classification in classifications {
        table.add_row(vec![
            Cell::new(&classification.column),
            Cell::new(classification.field_type).fg(Color::Blue),
            confidence_cell(classification.confidence),
            dim_cell(classification.evidence.join("; ")),
        ]);
    }
    table
}

fn signal_table(signals: &[ColumnSignals]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Samples"),
        header_cell("Numeric"),
        header_cell("Date"),
        header_cell("Boolean"),
        header_cell("Unique"),
        header_cell("Kind"),
        header_cell("Coverage"),
        header_cell("Outliers"),
    ]);
    apply_table_style(&mut table);
    for index in [1, 2, 3, 4, 5, 7, 8] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for entry in signals {
        table.add_row(vec![
            Cell::new(&entry.column),
            Cell::new(entry.sample_count),
            ratio_cell(entry.signals.numeric_ratio),
            ratio_cell(entry.signals.date_ratio),
            ratio_cell(entry.signals.boolean_ratio),
            ratio_cell(entry.signals.unique_ratio),
            Cell::new(entry.profile.kind).fg(Color::Blue),
            coverage_cell(entry.profile.coverage, entry.profile.sparse),
            match entry.profile.outliers {
                Some(caps) => Cell::new(format!(
                    "{} outside [{:.2}, {:.2}]",
                    caps.capped, caps.lower, caps.upper
                )),
                None => dim_cell("-"),
            },
        ]);
    }
    table
}

pub fn suggestion_table(suggestion: &TemplateSuggestionResult) -> Table {
    let strong = suggestion.strong_match.as_ref();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Template"),
        header_cell("Version"),
        header_cell("Score"),
        header_cell("Match"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for candidate in &suggestion.suggestions {
        let is_strong = strong.is_some_and(|m| {
            m.template_id == candidate.template_id
                && m.template_version_id == candidate.template_version_id
        });
        table.add_row(vec![
            Cell::new(&candidate.template_id),
            Cell::new(&candidate.template_version_id),
            Cell::new(format!("{:.3}", candidate.score)),
            if is_strong {
                Cell::new("strong")
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
        ]);
    }
    if suggestion.propose_new_template {
        table.add_row(vec![
            Cell::new("new template").fg(Color::Yellow),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new("proposed").fg(Color::Yellow),
        ]);
    }
    table
}

fn missingness_table(result: &MissingnessDetectionResult) -> Table {
    let profile = &result.profile;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Signal"),
        header_cell("Confidence"),
        header_cell("Imputation"),
        header_cell("Blockers"),
    ]);
    apply_table_style(&mut table);
    let signal_color = match profile.signal {
        MissingnessSignal::Mcar => Color::Green,
        MissingnessSignal::Mar => Color::Yellow,
        MissingnessSignal::Mnar => Color::Red,
    };
    let blockers = if profile.blockers().is_empty() {
        dim_cell("-")
    } else {
        Cell::new(profile.blockers().join("\n"))
    };
    table.add_row(vec![
        Cell::new(profile.signal)
            .fg(signal_color)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", profile.confidence)),
        if profile.imputation_permitted {
            Cell::new("permitted").fg(Color::Green)
        } else {
            Cell::new("blocked").fg(Color::Red)
        },
        blockers,
    ]);
    table
}

pub fn diagnostics_table(diagnostics: &JobDiagnostics) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Code"),
        header_cell("Message"),
        header_cell("Recommendation"),
    ]);
    apply_table_style(&mut table);
    for issue in &diagnostics.issues {
        table.add_row(vec![
            level_cell(issue.level),
            Cell::new(issue.code),
            Cell::new(&issue.message),
            match &issue.recommendation {
                Some(text) => Cell::new(text),
                None => dim_cell("-"),
            },
        ]);
    }
    table
}

pub fn decision_table(decisions: &[AssignmentDecision]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Ticket"),
        header_cell("Technician"),
        header_cell("Strategy"),
        header_cell("Pool"),
        header_cell("Rationale"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for decision in decisions {
        let technician = match &decision.technician_id {
            Some(id) => Cell::new(id),
            None => dim_cell("-"),
        };
        let mut rationale = decision.rationale.clone();
        if let Some(notes) = &decision.notes {
            for note in notes {
                rationale.push_str("\n- ");
                rationale.push_str(note);
            }
        }
        table.add_row(vec![
            Cell::new(&decision.ticket_id),
            technician,
            strategy_cell(decision.strategy),
            Cell::new(decision.candidate_pool.len()),
            Cell::new(rationale),
        ]);
    }
    table
}

pub fn metrics_table(metrics: &AssignmentMetrics) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows: [(&str, u64, Option<Color>); 5] = [
        ("Enqueued", metrics.enqueued, None),
        ("Processed", metrics.processed, None),
        ("Ranking failures", metrics.ml_failures, Some(Color::Yellow)),
        ("Fallback decisions", metrics.fallback_decisions, Some(Color::Yellow)),
        ("Hard stops", metrics.hard_stops, Some(Color::Red)),
    ];
    for (label, value, color) in rows {
        table.add_row(vec![Cell::new(label), count_cell(value, color)]);
    }
    table.add_row(vec![Cell::new("Queue depth"), Cell::new(metrics.queue_depth)]);
    table.add_row(vec![
        Cell::new("Last batch size"),
        Cell::new(metrics.last_batch_size),
    ]);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn confidence_cell(confidence: f64) -> Cell {
    let cell = Cell::new(format!("{confidence:.2}"));
    if confidence < 0.45 {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

fn ratio_cell(ratio: f64) -> Cell {
    if ratio == 0.0 {
        dim_cell("-")
    } else {
        Cell::new(format!("{:.0}%", ratio * 100.0))
    }
}

fn coverage_cell(coverage: f64, sparse: bool) -> Cell {
    let cell = Cell::new(format!("{:.0}%", coverage * 100.0));
    if sparse { cell.fg(Color::Red) } else { cell }
}

fn count_cell(value: u64, color: Option<Color>) -> Cell {
    match color {
        Some(color) if value > 0 => Cell::new(value).fg(color),
        _ => Cell::new(value),
    }
}

fn level_cell(level: IssueLevel) -> Cell {
    match level {
        IssueLevel::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        IssueLevel::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn strategy_cell(strategy: AssignmentStrategy) -> Cell {
    let color = match strategy {
        AssignmentStrategy::MlRanking => Color::Green,
        AssignmentStrategy::DeterministicFallback => Color::Yellow,
        AssignmentStrategy::HardStop => Color::Red,
    };
    Cell::new(strategy).fg(color)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
