//! Upload → [`DashboardBundle`].
//!
//! The format is decided from the file name before anything is parsed. Each
//! sheet then goes through column selection, classification, aggregation and
//! projection on its own and reports its row count; the bundle total is the
//! sum of those counts. Any error aborts the whole upload.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

use crate::{
    config::PipelineConfig,
    data::{CellValue, format_fixed},
    error::{DashboardError, Result},
    insights::{InsightEntry, SheetInsights},
    io_utils::Upload,
    parser::{self, FileKind, ParsedSheet},
    projection::{
        self, ChartSection, Section, SectionKind, SectionMetadata, SheetTitles, SummarySection,
        TableSection,
    },
    sheet::RawTable,
};

pub const DOCUMENT_TYPE_LABEL: &str = "PDF";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    pub file_name: String,
    pub file_type: String,
    pub processed_at: DateTime<Utc>,
    pub total_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardBundle {
    pub summary: Vec<SummarySection>,
    pub charts: Vec<ChartSection>,
    pub tables: Vec<TableSection>,
    pub metadata: BundleMetadata,
}

/// Everything one sheet contributes to the bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetOutcome {
    pub records: usize,
    pub table: TableSection,
    pub chart: Option<ChartSection>,
    pub summary: SummarySection,
}

/// Caller-supplied knobs for one run.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    config: PipelineConfig,
}

impl Assembler {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Builds the bundle for `upload`. `selected_columns` restricts every
    /// sheet to those labels (in that order); empty means all columns.
    pub fn assemble(&self, upload: &Upload, selected_columns: &[String]) -> Result<DashboardBundle> {
        let kind = FileKind::from_name(&upload.name)?;
        self.assemble_as(kind, upload, selected_columns)
    }

    /// Reads `path` and assembles it. Unsupported extensions fail before the
    /// file is opened; files over `max_file_bytes` fail before they are read.
    pub fn assemble_path(&self, path: &Path, selected_columns: &[String]) -> Result<DashboardBundle> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = FileKind::from_name(&name)?;
        let size = fs::metadata(path)
            .map_err(|source| DashboardError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        self.check_size(size)?;
        let upload = Upload::from_path(path)?;
        self.assemble_as(kind, &upload, selected_columns)
    }

    /// Like [`assemble`](Self::assemble) with the format already resolved.
    /// Useful when the caller checked the name before reading the bytes.
    pub fn assemble_as(
        &self,
        kind: FileKind,
        upload: &Upload,
        selected_columns: &[String],
    ) -> Result<DashboardBundle> {
        self.check_size(upload.size())?;
        info!(
            "Processing '{}' ({} bytes) as {kind}",
            upload.name,
            upload.size()
        );

        let Some(parser) = parser::parser_for(kind, &self.config) else {
            return Ok(document_bundle(upload));
        };
        let sheets = parser.parse(upload)?;

        let outcomes = sheets
            .into_iter()
            .map(|sheet| self.process_sheet(kind, &upload.name, sheet, selected_columns))
            .collect::<Vec<_>>();
        let bundle = fold_outcomes(kind, &upload.name, outcomes);
        info!(
            "Assembled {} table(s), {} chart(s), {} record(s) from '{}'",
            bundle.tables.len(),
            bundle.charts.len(),
            bundle.metadata.total_records,
            upload.name
        );
        Ok(bundle)
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.config.max_file_bytes {
            return Err(DashboardError::FileTooLarge {
                size,
                limit: self.config.max_file_bytes,
            });
        }
        Ok(())
    }

    pub fn process_sheet(
        &self,
        kind: FileKind,
        file_name: &str,
        sheet: ParsedSheet,
        selected_columns: &[String],
    ) -> SheetOutcome {
        let table = sheet.table.select_columns(selected_columns);
        let titles = SheetTitles::for_sheet(kind, &sheet.name);
        let meta = |rows: usize| SectionMetadata::new(rows, table.column_count(), kind, file_name);
        debug!(
            "Sheet '{}': columns {:?}, {} row(s)",
            sheet.name,
            table.headers(),
            table.row_count()
        );

        let insights = SheetInsights::compute(&table);
        let chart = projection::chart_series(&table, kind, self.config.chart_row_cap).map(|points| {
            let rows = points.len();
            projection::chart_section(points, table.column_labels(), titles.chart.clone(), meta(rows))
        });
        SheetOutcome {
            records: table.row_count(),
            summary: projection::summary_section(&insights, titles.summary, meta(table.row_count())),
            table: projection::table_section(&table, titles.table, meta(table.row_count())),
            chart,
        }
    }
}

/// Concatenates per-sheet outcomes in order and sums their record counts.
pub fn fold_outcomes(kind: FileKind, file_name: &str, outcomes: Vec<SheetOutcome>) -> DashboardBundle {
    let total_records = outcomes.iter().map(|outcome| outcome.records).sum();
    let mut bundle = DashboardBundle {
        summary: Vec::with_capacity(outcomes.len()),
        charts: Vec::new(),
        tables: Vec::with_capacity(outcomes.len()),
        metadata: BundleMetadata {
            file_name: file_name.to_string(),
            file_type: kind.as_str().to_string(),
            processed_at: Utc::now(),
            total_records,
        },
    };
    for outcome in outcomes {
        bundle.summary.push(outcome.summary);
        bundle.tables.push(outcome.table);
        bundle.charts.extend(outcome.chart);
    }
    bundle
}

/// Documents are not parsed: the bundle only describes the file itself.
pub fn document_bundle(upload: &Upload) -> DashboardBundle {
    let kind = FileKind::Document;
    let size = format!("{} MB", format_fixed(upload.size() as f64 / 1024.0 / 1024.0, 2));

    let summary = Section {
        kind: SectionKind::Summary,
        title: "Resumo PDF".to_string(),
        data: vec![
            InsightEntry::text("Tipo de Arquivo", DOCUMENT_TYPE_LABEL),
            InsightEntry::text("Tamanho", size.clone()),
        ],
        columns: None,
        metadata: SectionMetadata::new(0, 0, kind, &upload.name),
    };

    let properties = RawTable::new(
        vec!["propriedade".to_string(), "valor".to_string()],
        vec![
            vec![CellValue::text("Nome do Arquivo"), CellValue::text(upload.name.clone())],
            vec![CellValue::text("Tamanho"), CellValue::text(size)],
            vec![CellValue::text("Tipo"), CellValue::text(DOCUMENT_TYPE_LABEL)],
        ],
    );
    let table = projection::table_section(
        &properties,
        "Informações do PDF".to_string(),
        SectionMetadata::new(properties.row_count(), properties.column_count(), kind, &upload.name),
    );

    DashboardBundle {
        summary: vec![summary],
        charts: Vec::new(),
        tables: vec![table],
        metadata: BundleMetadata {
            file_name: upload.name.clone(),
            file_type: kind.as_str().to_string(),
            processed_at: Utc::now(),
            total_records: 0,
        },
    }
}

impl DashboardBundle {
    pub fn table(&self, index: usize) -> Option<&TableSection> {
        self.tables.get(index)
    }
}
