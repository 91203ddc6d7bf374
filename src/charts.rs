//! Chart-type selection and chart-ready datasets for a chart series.
//!
//! A series is inspected once into a [`ChartShape`] (which columns are
//! numeric, textual, date-like). The shape decides which of the four chart
//! kinds are available and which one is picked automatically; explicit picks
//! are honoured only when available.
//!
//! Numeric takes precedence over date-like: a column in which every sampled
//! value is numeric is never treated as a date axis, even if some value also
//! matches the date pattern.

use std::{collections::HashMap, fmt};

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    classify::{CHART_NUMERIC_POLICY, is_date_like_column, is_numeric_column, is_numeric_value},
    config::PipelineConfig,
    data::CellValue,
    error::{DashboardError, Result},
    projection::ChartSection,
    sheet::Record,
};

pub const INDEX_KEY: &str = "index";
pub const OTHER_CATEGORY: &str = "Outros";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Area,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [ChartKind::Bar, ChartKind::Line, ChartKind::Pie, ChartKind::Area];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Area => "area",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartShape {
    pub numeric: Vec<String>,
    pub text: Vec<String>,
    /// Text columns with at least one date-shaped value.
    pub dates: Vec<String>,
}

impl ChartShape {
    pub fn of(points: &[Record], columns: &[String], sample_rows: usize) -> Self {
        let sample = &points[..points.len().min(sample_rows)];
        let mut shape = ChartShape {
            numeric: Vec::new(),
            text: Vec::new(),
            dates: Vec::new(),
        };
        for column in columns {
            let values = sample.iter().filter_map(|point| point.get(column));
            if is_numeric_column(values, CHART_NUMERIC_POLICY, is_numeric_value) {
                shape.numeric.push(column.clone());
                continue;
            }
            shape.text.push(column.clone());
            if is_date_like_column(sample.iter().filter_map(|point| point.get(column))) {
                shape.dates.push(column.clone());
            }
        }
        shape
    }

    pub fn is_available(&self, kind: ChartKind) -> bool {
        match kind {
            ChartKind::Bar => !self.text.is_empty() && !self.numeric.is_empty(),
            ChartKind::Line | ChartKind::Area => !self.numeric.is_empty(),
            ChartKind::Pie => self.numeric.len() >= 2,
        }
    }

    pub fn available(&self) -> Vec<ChartKind> {
        ChartKind::ALL
            .into_iter()
            .filter(|kind| self.is_available(*kind))
            .collect()
    }

    /// Automatic pick: dates and numbers → line, categories and numbers →
    /// bar, several numbers → pie, otherwise area. `None` when no kind fits.
    pub fn auto_kind(&self) -> Option<ChartKind> {
        let has_numeric = !self.numeric.is_empty();
        let kind = if !self.dates.is_empty() && has_numeric {
            ChartKind::Line
        } else if !self.text.is_empty() && has_numeric {
            ChartKind::Bar
        } else if self.numeric.len() >= 2 {
            ChartKind::Pie
        } else {
            ChartKind::Area
        };
        self.is_available(kind).then_some(kind)
    }

    /// Honours `requested` when the data supports it, else fails; with no
    /// request falls back to [`auto_kind`](Self::auto_kind).
    pub fn resolve(&self, requested: Option<ChartKind>) -> Result<Option<ChartKind>> {
        match requested {
            Some(kind) if self.is_available(kind) => Ok(Some(kind)),
            Some(kind) => Err(DashboardError::ChartUnavailable { kind }),
            None => Ok(self.auto_kind()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ChartDataset {
    Bar(Vec<Record>),
    Line(Vec<Record>),
    Pie(Vec<PieSlice>),
    Area(Vec<Record>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub title: String,
    pub kind: ChartKind,
    pub available: Vec<ChartKind>,
    pub numeric_columns: usize,
    pub dataset: ChartDataset,
}

/// Shapes a chart section into the dataset for the requested (or automatic)
/// chart kind. `Ok(None)` when the series supports no chart at all.
pub fn chart_view(
    section: &ChartSection,
    requested: Option<ChartKind>,
    config: &PipelineConfig,
) -> Result<Option<ChartView>> {
    let shape = ChartShape::of(&section.data, section.columns(), config.chart_sample_rows);
    let Some(kind) = shape.resolve(requested)? else {
        debug!("No chart kind fits '{}'", section.title);
        return Ok(None);
    };
    let sample = &section.data[..section.data.len().min(config.chart_sample_rows)];
    let dataset = match kind {
        ChartKind::Bar => ChartDataset::Bar(bar_data(sample, &shape, config.bar_category_cap)),
        ChartKind::Line => ChartDataset::Line(line_data(sample, &shape)),
        ChartKind::Pie => ChartDataset::Pie(pie_data(
            sample,
            &shape,
            config.pie_series_cap,
            config.pie_label_max,
        )),
        ChartKind::Area => ChartDataset::Area(area_data(sample, &shape, config.area_row_cap)),
    };
    debug!("Chart '{}' rendered as {kind}", section.title);
    Ok(Some(ChartView {
        title: section.title.clone(),
        kind,
        available: shape.available(),
        numeric_columns: shape.numeric.len(),
        dataset,
    }))
}

fn numeric_or_zero(point: &Record, column: &str) -> f64 {
    point
        .get(column)
        .and_then(CellValue::as_number)
        .unwrap_or(0.0)
}

/// Sums every numeric column per category of the first text column, in
/// first-seen category order.
pub fn bar_data(points: &[Record], shape: &ChartShape, category_cap: usize) -> Vec<Record> {
    let Some(category_column) = shape.text.first() else {
        return Vec::new();
    };
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, Vec<f64>> = HashMap::new();
    for point in points {
        let category = point
            .get(category_column)
            .filter(|value| value.is_filled())
            .map(CellValue::as_display)
            .unwrap_or_else(|| OTHER_CATEGORY.to_string());
        let sums = totals.entry(category.clone()).or_insert_with(|| {
            order.push(category);
            vec![0.0; shape.numeric.len()]
        });
        for (sum, column) in sums.iter_mut().zip(&shape.numeric) {
            *sum += numeric_or_zero(point, column);
        }
    }

    let mut labels = vec![category_column.clone()];
    labels.extend(shape.numeric.iter().cloned());
    order
        .into_iter()
        .take(category_cap)
        .map(|category| {
            let sums = totals.remove(&category).unwrap_or_default();
            let mut values = vec![CellValue::Text(category)];
            values.extend(sums.into_iter().map(CellValue::Number));
            Record::new(labels.clone(), values)
        })
        .collect()
}

/// One point per row: 1-based index plus each numeric column.
pub fn line_data(points: &[Record], shape: &ChartShape) -> Vec<Record> {
    let labels = index_labels(shape);
    points
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let mut values = vec![CellValue::Number((idx + 1) as f64)];
            values.extend(
                shape
                    .numeric
                    .iter()
                    .map(|column| CellValue::Number(numeric_or_zero(point, column))),
            );
            Record::new(labels.clone(), values)
        })
        .collect()
}

/// Column totals of the first `series_cap` numeric columns. Columns whose
/// total is not positive cannot be drawn as a slice and are left out.
pub fn pie_data(
    points: &[Record],
    shape: &ChartShape,
    series_cap: usize,
    label_max: usize,
) -> Vec<PieSlice> {
    shape
        .numeric
        .iter()
        .take(series_cap)
        .map(|column| PieSlice {
            name: truncate_label(column, label_max),
            value: points.iter().map(|point| numeric_or_zero(point, column)).sum(),
        })
        .filter(|slice| slice.value > 0.0)
        .collect()
}

/// Running total of each numeric column down the first `row_cap` rows.
pub fn area_data(points: &[Record], shape: &ChartShape, row_cap: usize) -> Vec<Record> {
    let labels = index_labels(shape);
    let mut running = vec![0.0; shape.numeric.len()];
    points
        .iter()
        .take(row_cap)
        .enumerate()
        .map(|(idx, point)| {
            let mut values = vec![CellValue::Number((idx + 1) as f64)];
            for (total, column) in running.iter_mut().zip(&shape.numeric) {
                *total += numeric_or_zero(point, column);
                values.push(CellValue::Number(*total));
            }
            Record::new(labels.clone(), values)
        })
        .collect()
}

fn index_labels(shape: &ChartShape) -> Vec<String> {
    let mut labels = vec![INDEX_KEY.to_string()];
    labels.extend(shape.numeric.iter().cloned());
    labels
}

fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let kept = label.chars().take(max.saturating_sub(3)).collect::<String>();
        format!("{kept}...")
    } else {
        label.to_string()
    }
}
