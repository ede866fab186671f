use crate::output::{failure_lines, RenderOptions};
use crate::report::{CampaignReport, Delta, ProgramRow};

pub fn render_line_report(report: &CampaignReport, options: &RenderOptions) -> String {
    let mut out = String::new();
    for row in &report.rows {
        out.push_str(&render_line(row, options));
        out.push('\n');
    }
    out.push_str(&failure_lines(report));
    out
}

fn render_line(row: &ProgramRow, options: &RenderOptions) -> String {
    let mut line = format!(
        "{}: {} согласий на {} бюджетных мест",
        row.label, row.current_count, row.max_count
    );
    line.push_str(&delta_suffix(row.delta, options));
    if let Some(score) = row.accepted_score {
        line.push_str(&format!(", проходной балл {score}"));
    }
    line
}

fn delta_suffix(delta: Delta, options: &RenderOptions) -> String {
    match delta {
        Delta::Increased(_) | Delta::Decreased(_) => format!(" ({delta})"),
        Delta::NoBaseline if options.mark_new_programs => " (new)".to_string(),
        Delta::NoBaseline | Delta::Unchanged => String::new(),
    }
}
