//! Turning upload bytes into sheets.
//!
//! Each supported format implements [`TabularParser`]. The assembler picks one
//! by file extension through [`FileKind`].

pub mod delimited;
pub mod workbook;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    config::PipelineConfig,
    error::{DashboardError, Result},
    io_utils::{self, Upload},
    sheet::RawTable,
};

pub use delimited::{NaiveSplitParser, QuotedCsvParser};
pub use workbook::WorkbookParser;

/// One logical section of an upload: a workbook tab, or the whole CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub name: String,
    pub table: RawTable,
}

pub trait TabularParser {
    fn parse(&self, upload: &Upload) -> Result<Vec<ParsedSheet>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Excel,
    Document,
}

impl FileKind {
    /// Resolves the format from the file name alone, before anything is read.
    pub fn from_name(name: &str) -> Result<Self> {
        let extension = io_utils::file_extension(name).unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(FileKind::Excel),
            "pdf" => Ok(FileKind::Document),
            _ => Err(DashboardError::UnsupportedFormat { extension }),
        }
    }

    /// Value reported as `fileType` in bundle metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Csv => "csv",
            FileKind::Excel => "excel",
            FileKind::Document => "pdf",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grammar used for delimited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextParserKind {
    /// Line and delimiter splitting with no quote handling.
    #[default]
    Naive,
    /// RFC 4180 quoting via the `csv` crate.
    Quoted,
}

/// Parser for a structured format. Documents have none: they are described,
/// not parsed.
pub fn parser_for(kind: FileKind, config: &PipelineConfig) -> Option<Box<dyn TabularParser>> {
    match kind {
        FileKind::Csv => {
            let encoding = config.encoding();
            Some(match config.text_parser {
                TextParserKind::Naive => Box::new(NaiveSplitParser::new(config.delimiter, encoding)),
                TextParserKind::Quoted => {
                    Box::new(QuotedCsvParser::new(config.delimiter, encoding))
                }
            })
        }
        FileKind::Excel => Some(Box::new(WorkbookParser)),
        FileKind::Document => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_resolve_case_insensitively() {
        assert_eq!(FileKind::from_name("dados.CSV").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::from_name("a.xls").unwrap(), FileKind::Excel);
        assert_eq!(FileKind::from_name("b.xlsx").unwrap(), FileKind::Excel);
        assert_eq!(FileKind::from_name("report.pdf").unwrap(), FileKind::Document);
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        match FileKind::from_name("notes.docx") {
            Err(DashboardError::UnsupportedFormat { extension }) => assert_eq!(extension, "docx"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        assert!(matches!(
            FileKind::from_name("no_extension"),
            Err(DashboardError::UnsupportedFormat { extension }) if extension.is_empty()
        ));
    }
}
