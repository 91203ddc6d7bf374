//! Column kind inference.
//!
//! A column can be numeric, date-like, both, or neither (categorical). The
//! numeric test is a pure function of a [`NumericPolicy`] and a parse
//! predicate:
//!
//! - summaries use [`AGGREGATE_NUMERIC_POLICY`]: at least half of the filled
//!   values must parse;
//! - chart series use [`CHART_NUMERIC_POLICY`]: every value must be empty or
//!   numeric.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    data::{CellValue, parse_number},
    sheet::RawTable,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericPolicy {
    /// Share of filled values that must parse, compared with `>=`.
    pub min_ratio: f64,
    /// Whether a column with no filled value at all counts as numeric.
    pub empty_column_is_numeric: bool,
}

pub const AGGREGATE_NUMERIC_POLICY: NumericPolicy = NumericPolicy {
    min_ratio: 0.5,
    empty_column_is_numeric: false,
};

pub const CHART_NUMERIC_POLICY: NumericPolicy = NumericPolicy {
    min_ratio: 1.0,
    empty_column_is_numeric: true,
};

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}/\d{1,2}/\d{4}|\d{4}-\d{1,2}-\d{1,2}").expect("valid date pattern")
});

pub fn is_numeric_value(value: &CellValue) -> bool {
    match value {
        CellValue::Number(_) => true,
        CellValue::Text(s) => parse_number(s).is_some(),
        CellValue::Empty | CellValue::Bool(_) => false,
    }
}

pub fn is_date_like_value(value: &CellValue) -> bool {
    match value {
        CellValue::Text(s) => DATE_PATTERN.is_match(s),
        _ => false,
    }
}

/// Applies `policy` to a column. Empty cells never count against it.
pub fn is_numeric_column<'a, I, P>(values: I, policy: NumericPolicy, parses: P) -> bool
where
    I: IntoIterator<Item = &'a CellValue>,
    P: Fn(&CellValue) -> bool,
{
    let (filled, numeric) = values
        .into_iter()
        .filter(|value| value.is_filled())
        .fold((0usize, 0usize), |(filled, numeric), value| {
            (filled + 1, numeric + usize::from(parses(value)))
        });
    if filled == 0 {
        return policy.empty_column_is_numeric;
    }
    numeric as f64 / filled as f64 >= policy.min_ratio
}

pub fn is_date_like_column<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a CellValue>,
{
    values.into_iter().any(is_date_like_value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnKind {
    pub numeric: bool,
    pub date_like: bool,
}

/// Per-column kinds, positionally aligned with the table's labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnClassification {
    pub labels: Vec<String>,
    pub kinds: Vec<ColumnKind>,
}

impl ColumnClassification {
    pub fn classify(table: &RawTable, policy: NumericPolicy) -> Self {
        let labels = table.column_labels();
        let kinds = (0..table.column_count())
            .map(|idx| ColumnKind {
                numeric: is_numeric_column(table.column(idx), policy, is_numeric_value),
                date_like: is_date_like_column(table.column(idx)),
            })
            .collect();
        Self { labels, kinds }
    }

    pub fn numeric_columns(&self) -> Vec<usize> {
        self.positions(|kind| kind.numeric)
    }

    pub fn categorical_columns(&self) -> Vec<usize> {
        self.positions(|kind| !kind.numeric)
    }

    pub fn date_like_columns(&self) -> Vec<usize> {
        self.positions(|kind| kind.date_like)
    }

    fn positions(&self, keep: impl Fn(&ColumnKind) -> bool) -> Vec<usize> {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, kind)| keep(kind))
            .map(|(idx, _)| idx)
            .collect()
    }
}
