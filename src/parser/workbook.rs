use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::{debug, warn};

use crate::{
    data::{CellValue, excel_serial_to_text},
    error::{DashboardError, Result},
    io_utils::Upload,
    sheet::RawTable,
};

use super::{ParsedSheet, TabularParser};

/// Reads every worksheet of an xlsx/xls/xlsb/ods workbook. The first row of
/// each sheet holds the headers; sheets without any row are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookParser;

impl TabularParser for WorkbookParser {
    fn parse(&self, upload: &Upload) -> Result<Vec<ParsedSheet>> {
        let cursor = Cursor::new(upload.bytes.clone());
        let mut workbook = open_workbook_auto_from_rs(cursor)
            .map_err(|err| DashboardError::parse("excel", err.to_string()))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(|err| {
                DashboardError::parse("excel", format!("Sheet '{name}': {err}"))
            })?;

            let mut rows = range.rows();
            let Some(header_row) = rows.next() else {
                warn!("Skipping empty sheet '{name}'");
                continue;
            };
            let headers = header_row.iter().map(header_text).collect::<Vec<_>>();
            let rows = rows
                .map(|row| row.iter().map(cell_value).collect())
                .collect::<Vec<Vec<CellValue>>>();
            debug!(
                "Sheet '{name}': {} column(s), {} row(s)",
                headers.len(),
                rows.len()
            );
            sheets.push(ParsedSheet {
                name,
                table: RawTable::new(headers, rows),
            });
        }
        Ok(sheets)
    }
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        CellValue::Empty => String::new(),
        other => other.as_display().trim().to_string(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_text(dt.as_f64()) {
            Some(text) if !dt.is_duration() => CellValue::Text(text),
            _ => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.clone()),
        Data::Error(err) => CellValue::Text(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calamine_cells_map_onto_cell_values() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(cell_value(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            cell_value(&Data::String("x".to_string())),
            CellValue::Text("x".to_string())
        );
        assert_eq!(cell_value(&Data::String(String::new())), CellValue::Empty);
    }

    #[test]
    fn numeric_headers_render_as_text() {
        assert_eq!(header_text(&Data::Int(2024)), "2024");
        assert_eq!(header_text(&Data::String(" total ".to_string())), "total");
        assert_eq!(header_text(&Data::Empty), "");
    }

    #[test]
    fn garbage_bytes_fail_to_open() {
        let upload = Upload::new("broken.xlsx", b"not a workbook".to_vec());
        let err = WorkbookParser.parse(&upload).expect_err("corrupt workbook");
        assert!(matches!(err, DashboardError::Parse { format: "excel", .. }));
    }
}
