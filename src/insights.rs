//! Summary insights for one sheet.
//!
//! [`SheetInsights::compute`] fills a typed record whose optional parts are
//! present only when the sheet has the matching column kind;
//! [`SheetInsights::entries`] flattens it into the ordered `(metric, value)`
//! list the dashboard displays. Entry order is fixed: counts, completeness,
//! numeric block, categorical block, date block.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    classify::{AGGREGATE_NUMERIC_POLICY, ColumnClassification},
    data::{format_fixed, format_locale_number},
    sheet::RawTable,
};

pub const TOTAL_RECORDS: &str = "Total de Registros";
pub const TOTAL_FIELDS: &str = "Total de Campos";
pub const COMPLETENESS: &str = "Completude dos Dados";
pub const NUMERIC_FIELDS: &str = "Campos Numéricos";
pub const DATE_FIELDS: &str = "Campos de Data Detectados";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightValue {
    Count(usize),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightEntry {
    pub metric: String,
    pub value: InsightValue,
}

impl InsightEntry {
    pub fn count(metric: impl Into<String>, value: usize) -> Self {
        Self {
            metric: metric.into(),
            value: InsightValue::Count(value),
        }
    }

    pub fn text(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: InsightValue::Text(value.into()),
        }
    }

    pub fn display_value(&self) -> String {
        match &self.value {
            InsightValue::Count(count) => format_locale_number(*count as f64),
            InsightValue::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub numeric_columns: usize,
    /// `None` when the first numeric column has no parseable value.
    pub stats: Option<NumericStats>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub column: String,
    pub unique_values: usize,
    /// Most frequent filled value and its count.
    pub mode: Option<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetInsights {
    pub records: usize,
    pub fields: usize,
    /// Average per-column share of filled cells, in percent.
    pub completeness: f64,
    pub numeric: Option<NumericSummary>,
    pub categorical: Option<CategoricalSummary>,
    pub date_columns: Option<usize>,
}

impl SheetInsights {
    pub fn compute(table: &RawTable) -> Self {
        let classes = ColumnClassification::classify(table, AGGREGATE_NUMERIC_POLICY);
        let labels = &classes.labels;

        let numeric_columns = classes.numeric_columns();
        let numeric = numeric_columns.first().map(|&idx| NumericSummary {
            column: labels[idx].clone(),
            numeric_columns: numeric_columns.len(),
            stats: numeric_stats(table, idx),
        });

        let categorical = classes
            .categorical_columns()
            .first()
            .map(|&idx| categorical_summary(table, idx, &labels[idx]));

        let date_columns = Some(classes.date_like_columns().len()).filter(|count| *count > 0);

        Self {
            records: table.row_count(),
            fields: table.column_count(),
            completeness: completeness(table),
            numeric,
            categorical,
            date_columns,
        }
    }

    pub fn entries(&self) -> Vec<InsightEntry> {
        let mut entries = vec![
            InsightEntry::count(TOTAL_RECORDS, self.records),
            InsightEntry::count(TOTAL_FIELDS, self.fields),
            InsightEntry::text(COMPLETENESS, format!("{}%", format_fixed(self.completeness, 1))),
        ];

        if let Some(numeric) = &self.numeric {
            entries.push(InsightEntry::count(NUMERIC_FIELDS, numeric.numeric_columns));
            if let Some(stats) = numeric.stats {
                let column = &numeric.column;
                entries.push(InsightEntry::text(
                    format!("{column} (Média)"),
                    format_fixed(stats.mean, 2),
                ));
                entries.push(InsightEntry::text(
                    format!("{column} (Máximo)"),
                    format_locale_number(stats.max),
                ));
                entries.push(InsightEntry::text(
                    format!("{column} (Mínimo)"),
                    format_locale_number(stats.min),
                ));
            }
        }

        if let Some(categorical) = &self.categorical {
            let column = &categorical.column;
            entries.push(InsightEntry::count(
                format!("{column} (Valores Únicos)"),
                categorical.unique_values,
            ));
            if let Some((value, count)) = &categorical.mode {
                entries.push(InsightEntry::text(
                    format!("{column} (Mais Frequente)"),
                    format!("{value} ({count}x)"),
                ));
            }
        }

        if let Some(count) = self.date_columns {
            entries.push(InsightEntry::count(DATE_FIELDS, count));
        }
        entries
    }
}

/// Mean over columns of the filled-cell ratio; 0 for an empty sheet.
pub fn completeness(table: &RawTable) -> f64 {
    let rows = table.row_count();
    let columns = table.column_count();
    if rows == 0 || columns == 0 {
        return 0.0;
    }
    let total: f64 = (0..columns)
        .map(|idx| {
            let filled = table.column(idx).filter(|value| value.is_filled()).count();
            filled as f64 / rows as f64 * 100.0
        })
        .sum();
    total / columns as f64
}

fn numeric_stats(table: &RawTable, index: usize) -> Option<NumericStats> {
    let values = table
        .column(index)
        .filter_map(|value| value.as_number())
        .collect::<Vec<_>>();
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(NumericStats {
        mean: sum / values.len() as f64,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

fn categorical_summary(table: &RawTable, index: usize, label: &str) -> CategoricalSummary {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in table.column(index).filter(|value| value.is_filled()) {
        let key = value.as_display();
        let counter = counts.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            0
        });
        *counter += 1;
    }

    // ties keep the value seen first
    let mode = order.iter().fold(None::<(&String, usize)>, |best, value| {
        let count = counts[value];
        match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        }
    });

    CategoricalSummary {
        column: label.to_string(),
        unique_values: order.len(),
        mode: mode.map(|(value, count)| (value.clone(), count)),
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

    fn metrics(entries: &[InsightEntry]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|e| (e.metric.clone(), e.display_value()))
            .collect()
    }

    #[test]
    fn fruit_scenario_reports_numeric_and_categorical_blocks() {
        let sheet = table(
            &["name", "qty"],
            &[&["apple", "10"], &["banana", "0"], &["cherry", "5"]],
        );
        let entries = SheetInsights::compute(&sheet).entries();
        assert_eq!(
            metrics(&entries),
            vec![
                ("Total de Registros".to_string(), "3".to_string()),
                ("Total de Campos".to_string(), "2".to_string()),
                ("Completude dos Dados".to_string(), "100.0%".to_string()),
                ("Campos Numéricos".to_string(), "1".to_string()),
                ("qty (Média)".to_string(), "5.00".to_string()),
                ("qty (Máximo)".to_string(), "10".to_string()),
                ("qty (Mínimo)".to_string(), "0".to_string()),
                ("name (Valores Únicos)".to_string(), "3".to_string()),
                ("name (Mais Frequente)".to_string(), "apple (1x)".to_string()),
            ]
        );
    }

    #[test]
    fn mode_prefers_highest_count_then_first_seen() {
        let sheet = table(&["city"], &[&["Natal"], &["Recife"], &["Recife"], &["Natal"], &[""]]);
        let insights = SheetInsights::compute(&sheet);
        let categorical = insights.categorical.expect("categorical block");
        assert_eq!(categorical.unique_values, 2);
        assert_eq!(categorical.mode, Some(("Natal".to_string(), 2)));
    }

    #[test]
    fn non_numeric_cells_are_excluded_from_statistics() {
        let sheet = table(&["amount"], &[&["4"], &["oops"], &["8"], &[""]]);
        let numeric = SheetInsights::compute(&sheet).numeric.expect("numeric block");
        let stats = numeric.stats.expect("stats");
        assert_eq!(stats.mean, 6.0);
        assert_eq!(stats.min, 4.0);
        assert_eq!(stats.max, 8.0);
    }

    #[test]
    fn completeness_averages_per_column_ratios() {
        let sheet = table(&["a", "b"], &[&["1", ""], &["2", "x"]]);
        assert_eq!(completeness(&sheet), 75.0);
        let empty = table(&["a", "b"], &[&["", ""]]);
        assert_eq!(completeness(&empty), 0.0);
    }

    #[test]
    fn absent_kinds_omit_their_entries() {
        let numbers_only = table(&["x", "y"], &[&["1", "2"]]);
        let entries = SheetInsights::compute(&numbers_only).entries();
        assert!(entries.iter().all(|e| !e.metric.contains("Valores Únicos")));
        assert_eq!(entries.len(), 7);

        let no_rows = table(&["a"], &[]);
        let entries = SheetInsights::compute(&no_rows).entries();
        assert_eq!(
            metrics(&entries),
            vec![
                ("Total de Registros".to_string(), "0".to_string()),
                ("Total de Campos".to_string(), "1".to_string()),
                ("Completude dos Dados".to_string(), "0.0%".to_string()),
                ("a (Valores Únicos)".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn date_columns_are_counted_last() {
        let sheet = table(&["when", "what"], &[&["01/02/2024", "a"], &["2024-02-03", "b"]]);
        let entries = SheetInsights::compute(&sheet).entries();
        let last = entries.last().expect("entries");
        assert_eq!(last.metric, DATE_FIELDS);
        assert_eq!(last.value, InsightValue::Count(1));
    }

    #[test]
    fn large_values_use_locale_grouping() {
        let sheet = table(&["total"], &[&["1500000"], &["2500.75"]]);
        let entries = SheetInsights::compute(&sheet).entries();
        let max = entries.iter().find(|e| e.metric == "total (Máximo)").expect("max");
        assert_eq!(max.display_value(), "1.500.000");
        let min = entries.iter().find(|e| e.metric == "total (Mínimo)").expect("min");
        assert_eq!(min.display_value(), "2.500,75");
    }
}
