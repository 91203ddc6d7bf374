#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use sheet_insights::io_utils::Upload;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }
}

pub type SheetFixture<'a> = (&'a str, &'a [&'a [&'a str]]);

/// Builds an xlsx workbook in memory. Cells that parse as numbers are written
/// as numbers, blank strings are left empty.
pub fn workbook_bytes(sheets: &[SheetFixture<'_>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("sheet name");
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (row_idx, col_idx) = (row_idx as u32, col_idx as u16);
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(number) => worksheet
                        .write_number(row_idx, col_idx, number)
                        .expect("write number"),
                    Err(_) => worksheet
                        .write_string(row_idx, col_idx, *cell)
                        .expect("write string"),
                };
            }
        }
    }
    workbook.save_to_buffer().expect("workbook buffer")
}

pub fn workbook_upload(name: &str, sheets: &[SheetFixture<'_>]) -> Upload {
    Upload::new(name, workbook_bytes(sheets))
}

pub fn csv_upload(name: &str, body: &str) -> Upload {
    Upload::new(name, body.as_bytes().to_vec())
}
