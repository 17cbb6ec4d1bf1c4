//! UI utilities: turn a `Table` into styled terminal lines.

use super::load::LoadLevel;
use super::table::{Cell, Row, Segment, Table, Tone, HEADERS};
use chrono::{DateTime, Local};
use crossterm::style::Stylize;

/// Columns never shrink below this, so the frame does not jitter between polls.
const MIN_COLUMN_WIDTH: usize = 13;

/// Calculate display width of a string (accounting for wide chars like emoji).
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                1
            } else {
                // Most CJK and emoji are 2 cells wide
                2
            }
        })
        .sum()
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("  {} {}", "ℹ".blue(), msg);
}

/// Render header, header rule and rows, columns centered.
pub fn format_table(table: &Table) -> Vec<String> {
    let widths = column_widths(table);
    let bar = format!(" {} ", "│".dark_grey());
    let mut lines = Vec::with_capacity(table.rows.len() + 2);

    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(title, width)| center(&title.cyan().bold().to_string(), display_width(title), width))
        .collect();
    lines.push(format!("  {}", header.join(&bar)));
    lines.push(format!("  {}", rule(&widths, "═", "═╪═")));

    for row in &table.rows {
        let line = match row {
            Row::Cells(cells) => cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| center(&styled(cell), display_width(&cell.text()), width))
                .collect::<Vec<_>>()
                .join(&bar),
            Row::Separator => rule(&widths, "─", "─┼─"),
        };
        lines.push(format!("  {}", line));
    }
    lines
}

/// Status line under the table.
pub fn format_footer(updated: DateTime<Local>, url: &str) -> String {
    format!(
        "  {} {}  {}  {}",
        "⟳".dark_cyan(),
        updated.format("%H:%M:%S").to_string().white(),
        url.dark_grey(),
        "Ctrl+C to exit".dark_grey().italic()
    )
}

fn column_widths(table: &Table) -> [usize; 4] {
    let mut widths = HEADERS.map(|h| display_width(h).max(MIN_COLUMN_WIDTH));
    for cells in table.rows.iter().filter_map(Row::cells) {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(display_width(&cell.text()));
        }
    }
    widths
}

fn rule(widths: &[usize; 4], fill: &str, joint: &str) -> String {
    widths
        .iter()
        .map(|w| fill.repeat(*w))
        .collect::<Vec<_>>()
        .join(joint)
        .dark_grey()
        .to_string()
}

/// Pad `styled` (whose visible width is `visible`) to `width`, centered.
fn center(styled: &str, visible: usize, width: usize) -> String {
    let pad = width.saturating_sub(visible);
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), styled, " ".repeat(pad - left))
}

fn styled(cell: &Cell) -> String {
    cell.segments.iter().map(style_segment).collect()
}

fn style_segment(segment: &Segment) -> String {
    let text = segment.text.as_str();
    match segment.tone {
        Tone::Plain => text.to_string(),
        Tone::Label => text.white().bold().to_string(),
        Tone::Muted => text.dark_grey().to_string(),
        Tone::Error => text.red().bold().to_string(),
        Tone::Load(LoadLevel::Idle) => text.dark_grey().to_string(),
        Tone::Load(LoadLevel::Low) => text.green().to_string(),
        Tone::Load(LoadLevel::Medium) => text.yellow().to_string(),
        Tone::Load(LoadLevel::High) => text.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_splits_padding() {
        assert_eq!(center("ab", 2, 6), "  ab  ");
        assert_eq!(center("ab", 2, 5), " ab  ");
        assert_eq!(center("toolong", 7, 3), "toolong");
    }

    #[test]
    fn widths_grow_with_content() {
        let table = Table {
            rows: vec![Row::Cells([
                Cell::new("a very long label here", Tone::Label),
                Cell::new("1%", Tone::Plain),
                Cell::new("-", Tone::Plain),
                Cell::new("-", Tone::Plain),
            ])],
        };
        let widths = column_widths(&table);
        assert_eq!(widths[0], 22);
        assert_eq!(widths[1], MIN_COLUMN_WIDTH);
    }

    #[test]
    fn one_line_per_row_plus_header() {
        let table = Table {
            rows: vec![
                Row::Cells([
                    Cell::new("CPU", Tone::Label),
                    Cell::new("3.0%", Tone::Load(LoadLevel::Low)),
                    Cell::new("1 MiB", Tone::Plain),
                    Cell::new("2 MiB", Tone::Plain),
                ]),
                Row::Separator,
            ],
        };
        let lines = format_table(&table);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Utilization"));
        assert!(lines[1].contains('╪'));
        assert!(lines[2].contains("CPU"));
        assert!(lines[3].contains('┼'));
    }
}
