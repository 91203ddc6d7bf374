//! Plain-text rendering of sections for terminal output.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{projection::SummarySection, sheet::Record};

const COLUMN_GAP: &str = "  ";

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(&sanitize_cell(cell)));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Table of `records` restricted to `columns`, in that order.
pub fn render_records(columns: &[String], records: &[&Record]) -> String {
    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).map(|v| v.as_display()).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    render_table(columns, &rows)
}

/// Two-column metric/value listing of a summary section.
pub fn render_summary(section: &SummarySection) -> String {
    let headers = vec!["Métrica".to_string(), "Valor".to_string()];
    let rows = section
        .data
        .iter()
        .map(|entry| vec![entry.metric.clone(), entry.display_value()])
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.truncate(line.trim_end().len());
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::CellValue,
        insights::InsightEntry,
        parser::FileKind,
        projection::{Section, SectionKind, SectionMetadata},
    };

    #[test]
    fn columns_are_padded_to_the_widest_cell() {
        let headers = vec!["name".to_string(), "qty".to_string()];
        let rows = vec![
            vec!["apple".to_string(), "10".to_string()],
            vec!["fig".to_string(), "5".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "name   qty");
        assert_eq!(lines[1], "-----  ---");
        assert_eq!(lines[2], "apple  10");
        assert_eq!(lines[3], "fig    5");
    }

    #[test]
    fn multi_line_cells_stay_on_one_line() {
        let headers = vec!["note".to_string()];
        let rows = vec![vec!["two\nlines".to_string()]];
        let rendered = render_table(&headers, &rows);
        assert_eq!(rendered.lines().nth(2), Some("two lines"));
    }

    #[test]
    fn records_follow_the_requested_column_order() {
        let record = Record::new(
            vec!["a".to_string(), "b".to_string()],
            vec![CellValue::text("x"), CellValue::Number(2.0)],
        );
        let columns = vec!["b".to_string(), "a".to_string()];
        let rendered = render_records(&columns, &[&record]);
        assert_eq!(rendered.lines().nth(2), Some("2    x"));
    }

    #[test]
    fn summary_uses_display_values() {
        let section = Section {
            kind: SectionKind::Summary,
            title: "Análise Detalhada CSV".to_string(),
            data: vec![InsightEntry::count("Total de Registros", 1500)],
            columns: None,
            metadata: SectionMetadata::new(1500, 1, FileKind::Csv, "a.csv"),
        };
        let rendered = render_summary(&section);
        assert_eq!(rendered.lines().nth(2), Some("Total de Registros  1.500"));
    }
}
