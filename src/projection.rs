//! The three views derived from each sheet: table, chart series, summary.

use log::debug;
use serde::Serialize;

use crate::{
    classify::{CHART_NUMERIC_POLICY, is_numeric_column, is_numeric_value},
    insights::{InsightEntry, SheetInsights},
    parser::FileKind,
    sheet::{RawTable, Record},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Table,
    Chart,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMetadata {
    pub total_rows: usize,
    pub total_columns: usize,
    pub file_type: String,
    pub file_name: String,
}

impl SectionMetadata {
    pub fn new(rows: usize, columns: usize, kind: FileKind, file_name: &str) -> Self {
        Self {
            total_rows: rows,
            total_columns: columns,
            file_type: kind.as_str().to_string(),
            file_name: file_name.to_string(),
        }
    }
}

/// One titled view of a sheet as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<T> {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub title: String,
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    pub metadata: SectionMetadata,
}

pub type TableSection = Section<Record>;
pub type ChartSection = Section<Record>;
pub type SummarySection = Section<InsightEntry>;

impl<T> Section<T> {
    pub fn columns(&self) -> &[String] {
        self.columns.as_deref().unwrap_or_default()
    }
}

/// Section titles for one sheet, which differ between CSV and workbook input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTitles {
    pub table: String,
    pub chart: String,
    pub summary: String,
}

impl SheetTitles {
    pub fn for_sheet(kind: FileKind, sheet_name: &str) -> Self {
        match kind {
            FileKind::Csv => Self {
                table: "Dados CSV".to_string(),
                chart: "Gráfico CSV".to_string(),
                summary: "Análise Detalhada CSV".to_string(),
            },
            _ => Self {
                table: format!("Planilha: {sheet_name}"),
                chart: format!("Gráfico: {sheet_name}"),
                summary: format!("Análise: {sheet_name}"),
            },
        }
    }
}

pub fn table_section(table: &RawTable, title: String, meta: SectionMetadata) -> TableSection {
    Section {
        kind: SectionKind::Table,
        title,
        data: table.to_records(),
        columns: Some(table.column_labels()),
        metadata: meta,
    }
}

pub fn summary_section(
    insights: &SheetInsights,
    title: String,
    meta: SectionMetadata,
) -> SummarySection {
    Section {
        kind: SectionKind::Summary,
        title,
        data: insights.entries(),
        columns: None,
        metadata: meta,
    }
}

/// Chart rows for a sheet, or `None` when nothing is worth plotting.
///
/// Only the first `row_cap` rows are kept; parseable text becomes a number,
/// and rows left with no filled cell are dropped. Workbook sheets must also
/// have at least two columns and one titled column whose values are all
/// empty or numeric.
pub fn chart_series(table: &RawTable, kind: FileKind, row_cap: usize) -> Option<Vec<Record>> {
    if kind != FileKind::Csv && !has_chartable_column(table) {
        debug!("No titled numeric column, skipping chart series");
        return None;
    }

    let labels = table.column_labels();
    let points = table
        .rows()
        .iter()
        .take(row_cap)
        .map(|row| Record::new(labels.clone(), row.iter().map(|v| v.coerce_numeric()).collect()))
        .filter(|record| !record.is_blank())
        .collect::<Vec<_>>();
    (!points.is_empty()).then_some(points)
}

fn has_chartable_column(table: &RawTable) -> bool {
    table.column_count() >= 2
        && table.row_count() > 0
        && (0..table.column_count()).any(|idx| {
            table.is_titled(idx)
                && is_numeric_column(table.column(idx), CHART_NUMERIC_POLICY, is_numeric_value)
        })
}

pub fn chart_section(
    points: Vec<Record>,
    columns: Vec<String>,
    title: String,
    meta: SectionMetadata,
) -> ChartSection {
    Section {
        kind: SectionKind::Chart,
        title,
        data: points,
        columns: Some(columns),
        metadata: meta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| CellValue::text(*v)).collect())
                .collect(),
        )
    }

    #[test]
    fn chart_series_is_capped_and_coerced() {
        let rows = (0..25)
            .map(|i| vec![format!("item {i}"), i.to_string()])
            .collect::<Vec<_>>();
        let rows_ref = rows
            .iter()
            .map(|r| r.iter().map(String::as_str).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let slices = rows_ref.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let sheet = table(&["name", "value"], &slices);

        let points = chart_series(&sheet, FileKind::Excel, 10).expect("chart points");
        assert_eq!(points.len(), 10);
        assert_eq!(points[3].get("value"), Some(&CellValue::Number(3.0)));
        assert_eq!(
            points[3].get("name"),
            Some(&CellValue::Text("item 3".to_string()))
        );
    }

    #[test]
    fn blank_rows_are_dropped_from_series() {
        let sheet = table(&["a", "b"], &[&["", ""], &["x", "1"], &["", ""]]);
        for kind in [FileKind::Csv, FileKind::Excel] {
            let points = chart_series(&sheet, kind, 10).expect("chart points");
            assert_eq!(points.len(), 1);
        }
    }

    #[test]
    fn workbook_series_need_a_fully_numeric_column() {
        let sheet = table(&["a", "b"], &[&["x", "1"], &["y", "two"]]);
        assert!(chart_series(&sheet, FileKind::Excel, 10).is_none());
        assert!(chart_series(&table(&["a"], &[&["1"]]), FileKind::Excel, 10).is_none());
    }

    #[test]
    fn csv_series_only_need_a_filled_row() {
        let text_only = table(&["a", "b"], &[&["x", "1"], &["y", "two"]]);
        assert_eq!(chart_series(&text_only, FileKind::Csv, 10).map(|p| p.len()), Some(2));
        let single = table(&["qty"], &[&["1"], &["2"], &["3"]]);
        let points = chart_series(&single, FileKind::Csv, 10).expect("chart points");
        assert_eq!(points[2].get("qty"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn all_blank_sample_has_no_series() {
        let blank = table(&["a", "b"], &[&["", ""], &["", ""]]);
        assert!(chart_series(&blank, FileKind::Csv, 10).is_none());
        assert!(chart_series(&blank, FileKind::Excel, 10).is_none());
    }

    #[test]
    fn untitled_numeric_columns_do_not_qualify_in_workbooks() {
        let sheet = table(&["", "name"], &[&["1", "x"]]);
        assert!(chart_series(&sheet, FileKind::Excel, 10).is_none());
        let selected = sheet.select_columns(&["name".to_string(), "Coluna 1".to_string()]);
        assert!(chart_series(&selected, FileKind::Excel, 10).is_none());
    }

    #[test]
    fn sections_serialize_with_presentation_keys() {
        let sheet = table(&["name"], &[&["apple"]]);
        let meta = SectionMetadata::new(1, 1, FileKind::Csv, "fruit.csv");
        let section = table_section(&sheet, "Dados CSV".to_string(), meta);
        let json = serde_json::to_value(&section).expect("serialize");
        assert_eq!(json["type"], "table");
        assert_eq!(json["columns"][0], "name");
        assert_eq!(json["metadata"]["totalRows"], 1);
        assert_eq!(json["metadata"]["fileType"], "csv");
        assert_eq!(json["data"][0]["name"], "apple");
    }
}
