//! Rectangular sheet model shared by every parser and projection.

use itertools::Itertools;
use log::warn;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::data::CellValue;

/// Header labels plus positionally aligned rows.
///
/// `headers` are the cells as read; `labels` are what projections show.
/// Both move together through selection, so a blank header stays untitled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    labels: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Builds a table whose rows all have exactly `headers.len()` cells:
    /// short rows are padded with empty cells, cells past the last header are
    /// dropped.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let duplicates = headers.iter().filter(|h| !h.is_empty()).duplicates().join(", ");
        if !duplicates.is_empty() {
            warn!("Duplicate column label(s) kept by position: {duplicates}");
        }
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        let labels = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| display_label(header, idx))
            .collect();
        Self {
            headers,
            labels,
            rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Labels used in projections. Blank headers become `Coluna N`, numbered
    /// by their position in the sheet as read.
    pub fn column_labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    /// Whether the header cell at `index` carried any text.
    pub fn is_titled(&self, index: usize) -> bool {
        !self.headers[index].is_empty()
    }

    /// Keeps only the requested columns, in the order they were requested.
    /// Matching uses [`column_labels`](Self::column_labels), so `Coluna N`
    /// selects a blank header. Labels missing from the sheet are skipped. An
    /// empty selection keeps the table as is.
    pub fn select_columns(self, selected: &[String]) -> Self {
        if selected.is_empty() {
            return self;
        }
        let labels = &self.labels;
        let (found, missing): (Vec<_>, Vec<_>) = selected
            .iter()
            .map(|label| (label, labels.iter().position(|l| l == label)))
            .partition(|(_, position)| position.is_some());
        if !missing.is_empty() {
            warn!(
                "Ignoring column(s) not present in sheet: {}",
                missing.iter().map(|(label, _)| label.as_str()).join(", ")
            );
        }
        let indexes = found
            .into_iter()
            .filter_map(|(_, position)| position)
            .collect::<Vec<_>>();

        let pick = |values: &[String]| -> Vec<String> {
            indexes.iter().map(|&idx| values[idx].clone()).collect()
        };
        let headers = pick(&self.headers);
        let labels = pick(&self.labels);
        let rows = self
            .rows
            .into_iter()
            .map(|row| indexes.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        Self {
            headers,
            labels,
            rows,
        }
    }

    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| Record::new(self.labels.clone(), row.clone()))
            .collect()
    }
}

pub fn display_label(header: &str, index: usize) -> String {
    if header.is_empty() {
        format!("Coluna {}", index + 1)
    } else {
        header.to_string()
    }
}

/// Label-keyed row. Keeps column order; serialises as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    labels: Vec<String>,
    values: Vec<CellValue>,
}

impl Record {
    pub fn new(labels: Vec<String>, values: Vec<CellValue>) -> Self {
        debug_assert_eq!(labels.len(), values.len());
        Self { labels, values }
    }

    /// Last cell carrying `label`, or `None` when the label is unknown.
    /// Repeated labels resolve the same way in the serialised object.
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.labels
            .iter()
            .rposition(|l| l == label)
            .map(|idx| &self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| !value.is_filled())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.labels.iter().unique().count();
        let mut map = serializer.serialize_map(Some(keys))?;
        for (idx, (label, value)) in self.iter().enumerate() {
            // a later cell with the same label wins
            if self.labels[idx + 1..].iter().any(|l| l == label) {
                continue;
            }
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}
