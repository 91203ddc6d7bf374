//! CSV export of table projections.
//!
//! Output opens with a UTF-8 byte-order mark so spreadsheet applications pick
//! the right encoding, and quotes only the fields that need it.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::{
    io_utils::{self, DEFAULT_CSV_DELIMITER, UTF8_BOM},
    sheet::Record,
};

pub fn export_csv<'a, I>(columns: &[String], records: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = io_utils::open_csv_writer(Vec::new(), DEFAULT_CSV_DELIMITER);
    writer
        .write_record(columns)
        .context("Writing export header")?;
    for (idx, record) in records.into_iter().enumerate() {
        let fields = columns
            .iter()
            .map(|column| record.get(column).map(|v| v.as_display()).unwrap_or_default());
        writer
            .write_record(fields)
            .with_context(|| format!("Writing export row {}", idx + 1))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Flushing export buffer: {}", err.error()))?;
    let body = String::from_utf8(bytes).context("Export produced invalid UTF-8")?;
    Ok(format!("{UTF8_BOM}{}", body.trim_end_matches('\n')))
}

/// `<title>_<YYYY-MM-DD>.csv`. Only ASCII letters and digits survive from the
/// title; each run of whitespace becomes one `_`.
pub fn export_file_name(title: &str, date: NaiveDate) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else if ch.is_ascii_alphanumeric() {
            stem.push(ch);
            in_whitespace = false;
        }
    }
    format!("{stem}_{}.csv", date.format("%Y-%m-%d"))
}

pub fn write_export(
    dir: &Path,
    title: &str,
    date: NaiveDate,
    columns: &[String],
    records: &[&Record],
) -> Result<PathBuf> {
    let contents = export_csv(columns, records.iter().copied())?;
    let path = dir.join(export_file_name(title, date));
    fs::write(&path, contents).with_context(|| format!("Writing export to {path:?}"))?;
    info!("Exported {} row(s) to {:?}", records.len(), path);
    Ok(path)
}
