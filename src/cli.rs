use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{charts::ChartKind, parser::TextParserKind};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Turn CSV, workbook and PDF uploads into dashboard sections",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the dashboard bundle (tables, charts, summaries) for a file
    Analyze(AnalyzeArgs),
    /// List the column labels of each sheet
    Columns(ColumnsArgs),
    /// Print the chart dataset derived for each chart series
    Chart(ChartArgs),
    /// Print one page of a table projection
    Table(TableArgs),
    /// Export a table projection as CSV
    Export(ExportArgs),
}

/// Options shared by every command that reads an upload.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input file (.csv, .xlsx, .xls, .xlsm, .xlsb, .ods or .pdf)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Restrict every sheet to this comma-separated list of columns, in order
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
    /// YAML file overriding pipeline defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Grammar used for delimited text
    #[arg(long, value_enum)]
    pub parser: Option<TextParserKind>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of delimited input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

impl SourceArgs {
    pub fn selected_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Chart type; picked from the data shape when omitted
    #[arg(long, value_enum)]
    pub kind: Option<ChartKind>,
}

#[derive(Debug, Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// 1-based table index within the bundle
    #[arg(long, default_value_t = 1)]
    pub sheet: usize,
    /// Keep rows where any column contains this term (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (defaults to the configured page size)
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// 1-based table index within the bundle
    #[arg(long, default_value_t = 1)]
    pub sheet: usize,
    /// Keep rows where any column contains this term (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,
    /// Directory receiving the exported file
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
