use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tutor_cli::check::{CheckReport, Severity};
use tutor_cli::session::SessionSummary;

pub fn print_session_summary(summary: &SessionSummary) {
    println!();
    if summary.finished {
        println!("Tutorial finished after {} evaluation passes.", summary.passes);
    } else {
        println!(
            "Session ended after {} of the steps ({} evaluation passes).",
            summary.steps_completed, summary.passes
        );
    }
}

pub fn print_check_report(report: &CheckReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Label"),
        header_cell("Rules"),
        header_cell("Snippet bytes"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    for column in [0, 2, 3, 4, 5] {
        if let Some(column) = table.column_mut(column) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    for step in &report.steps {
        table.add_row(vec![
            Cell::new(step.index + 1),
            Cell::new(&step.label),
            Cell::new(step.rules),
            step.snippet_bytes
                .map_or_else(|| dim_cell("-"), Cell::new),
            count_cell(step.error_count(), Color::Red),
            count_cell(step.warning_count(), Color::Yellow),
        ]);
    }
    println!("{table}");

    let issues: Vec<_> = report
        .steps
        .iter()
        .flat_map(|step| step.issues.iter().map(move |issue| (step, issue)))
        .collect();
    if issues.is_empty() {
        println!("No authoring issues found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Severity"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for (step, issue) in issues {
        table.add_row(vec![
            Cell::new(&step.label),
            severity_cell(issue.severity),
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn dim_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Dim)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell("0")
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("error").fg(Color::Red),
        Severity::Warning => Cell::new("warning").fg(Color::Yellow),
    }
}
