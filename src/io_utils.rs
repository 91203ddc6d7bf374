//! I/O helpers for uploads, text decoding and CSV reader/writer construction.
//!
//! All byte-level input flows through here:
//!
//! - **Uploads**: a file name plus its bytes, read from disk in one shot.
//! - **Encoding**: text decoding via `encoding_rs`, UTF-8 by default, with BOM
//!   sniffing.
//! - **Reader/writer construction**: `csv` builders shared by the quoted
//!   parser and the export writer.

use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use csv::{QuoteStyle, Terminator};
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::error::{DashboardError, Result};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const UTF8_BOM: &str = "\u{feff}";

/// A file handed to the pipeline: the name decides the format.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| DashboardError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Text after the last `.`, lowercased. Names without a dot have none.
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes()).ok_or_else(|| {
            DashboardError::parse("text", format!("Unknown encoding '{value}'"))
        }),
        None => Ok(UTF_8),
    }
}

/// Decodes upload bytes into text. A byte-order mark wins over `encoding`.
pub fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let mut reader = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .bom_sniffing(true)
        .strip_bom(true)
        .build(bytes);
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|err| DashboardError::parse("text", err.to_string()))?;
    Ok(text)
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Writer that quotes only fields holding the delimiter, a quote or a line
/// break, and ends records with a bare `\n`.
pub fn open_csv_writer<W>(writer: W, delimiter: u8) -> csv::Writer<W>
where
    W: Write,
{
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .terminator(Terminator::Any(b'\n'));
    builder.from_writer(writer)
}
