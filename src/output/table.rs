use crate::output::{failure_lines, RenderOptions};
use crate::report::{CampaignReport, Delta, ProgramRow};

const SEPARATOR: &str = " | ";

/// Aligned plain-text table: every cell left-aligned and padded to its
/// column's widest entry, followed by `" | "`.
pub fn render_table(report: &CampaignReport, options: &RenderOptions) -> String {
    let mut header = vec!["Код", "Мест", "Согласий", "Динамика"];
    if report.variant.tracks_score() {
        header.push("П/Балл");
    }
    let rows = report
        .rows
        .iter()
        .map(|row| table_cells(row, header.len(), options))
        .collect::<Vec<_>>();
    let widths = column_widths(&header, &rows);

    let mut out = String::new();
    let header_line = render_row(header.iter().copied(), &widths);
    let rule_len = header_line.chars().count().saturating_sub(SEPARATOR.len());
    out.push_str(&header_line);
    out.push('\n');
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for cells in &rows {
        out.push_str(&render_row(cells.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out.push_str(&failure_lines(report));
    out
}

fn table_cells(row: &ProgramRow, columns: usize, options: &RenderOptions) -> Vec<String> {
    let dynamics = match row.delta {
        Delta::Increased(_) | Delta::Decreased(_) => format!("({})", row.delta),
        Delta::NoBaseline if options.mark_new_programs => "new".to_string(),
        Delta::NoBaseline | Delta::Unchanged => "0".to_string(),
    };
    let mut cells = vec![
        row.label.clone(),
        row.max_count.to_string(),
        row.current_count.to_string(),
        dynamics,
        row.accepted_score.unwrap_or(0).to_string(),
    ];
    cells.truncate(columns);
    cells
}

/// Width in characters of each column: the widest trimmed cell or the
/// header, whichever is larger.
pub fn column_widths(header: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            rows.iter()
                .filter_map(|cells| cells.get(idx))
                .map(|cell| cell.trim().chars().count())
                .chain(std::iter::once(name.trim().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| pad_cell(cell.trim(), *width))
        .collect()
}

fn pad_cell(value: &str, width: usize) -> String {
    let padding = width.saturating_sub(value.chars().count());
    format!("{value}{}{SEPARATOR}", " ".repeat(padding))
}
