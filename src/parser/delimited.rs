use encoding_rs::Encoding;
use log::debug;

use crate::{
    data::CellValue,
    error::{DashboardError, Result},
    io_utils::{self, Upload},
    sheet::RawTable,
};

use super::{ParsedSheet, TabularParser};

pub const CSV_SHEET_NAME: &str = "Dados CSV";

/// Splits on line breaks and on the delimiter, nothing more.
///
/// Quoted fields are not understood: a delimiter inside quotes still splits
/// the field, and every `"` is removed from every cell. Blank lines are
/// ignored. Use [`QuotedCsvParser`] when the input needs real CSV quoting.
#[derive(Debug, Clone)]
pub struct NaiveSplitParser {
    delimiter: char,
    encoding: &'static Encoding,
}

impl NaiveSplitParser {
    pub fn new(delimiter: u8, encoding: &'static Encoding) -> Self {
        Self {
            delimiter: delimiter as char,
            encoding,
        }
    }

    pub fn parse_text(&self, text: &str) -> Result<RawTable> {
        let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());
        let header_line = lines
            .next()
            .ok_or_else(|| DashboardError::parse("csv", "Arquivo CSV vazio"))?;

        let headers = self.split_line(header_line);
        let rows = lines
            .map(|line| {
                self.split_line(line)
                    .into_iter()
                    .map(CellValue::text)
                    .collect()
            })
            .collect::<Vec<Vec<CellValue>>>();
        Ok(RawTable::new(headers, rows))
    }

    fn split_line(&self, line: &str) -> Vec<String> {
        line.split(self.delimiter)
            .map(|cell| cell.trim().replace('"', ""))
            .collect()
    }
}

impl TabularParser for NaiveSplitParser {
    fn parse(&self, upload: &Upload) -> Result<Vec<ParsedSheet>> {
        let text = io_utils::decode_text(&upload.bytes, self.encoding)?;
        let table = self.parse_text(&text)?;
        debug!(
            "Split '{}' into {} header(s) and {} row(s)",
            upload.name,
            table.column_count(),
            table.row_count()
        );
        Ok(vec![ParsedSheet {
            name: CSV_SHEET_NAME.to_string(),
            table,
        }])
    }
}

/// RFC 4180 reader: quoted fields may contain delimiters, doubled quotes and
/// line breaks. Records of uneven width are accepted and normalised.
#[derive(Debug, Clone)]
pub struct QuotedCsvParser {
    delimiter: u8,
    encoding: &'static Encoding,
}

impl QuotedCsvParser {
    pub fn new(delimiter: u8, encoding: &'static Encoding) -> Self {
        Self {
            delimiter,
            encoding,
        }
    }

    pub fn parse_text(&self, text: &str) -> Result<RawTable> {
        let mut reader = io_utils::open_csv_reader(text.as_bytes(), self.delimiter, false);
        let mut records = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|err| {
                DashboardError::parse("csv", format!("Reading line {}: {err}", idx + 1))
            })?;
            let cells = record.iter().map(|cell| cell.trim().to_string()).collect::<Vec<_>>();
            if cells.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            records.push(cells);
        }

        let mut records = records.into_iter();
        let headers = records
            .next()
            .ok_or_else(|| DashboardError::parse("csv", "Arquivo CSV vazio"))?;
        let rows = records
            .map(|cells| cells.into_iter().map(CellValue::text).collect())
            .collect();
        Ok(RawTable::new(headers, rows))
    }
}

impl TabularParser for QuotedCsvParser {
    fn parse(&self, upload: &Upload) -> Result<Vec<ParsedSheet>> {
        let text = io_utils::decode_text(&upload.bytes, self.encoding)?;
        let table = self.parse_text(&text)?;
        debug!(
            "Read '{}' as quoted CSV: {} header(s), {} row(s)",
            upload.name,
            table.column_count(),
            table.row_count()
        );
        Ok(vec![ParsedSheet {
            name: CSV_SHEET_NAME.to_string(),
            table,
        }])
    }
}

#[cfg(test)]
mod tests {
    use encoding_rs::UTF_8;

    use super::*;

    fn naive() -> NaiveSplitParser {
        NaiveSplitParser::new(b',', UTF_8)
    }

    #[test]
    fn naive_parser_skips_blank_lines_and_trims_cells() {
        let table = naive()
            .parse_text("name, qty\r\n\n apple ,10\r\n   \nbanana,0\n")
            .expect("parse");
        assert_eq!(table.headers(), ["name", "qty"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][0], CellValue::text("apple"));
        assert_eq!(table.rows()[1][1], CellValue::text("0"));
    }

    #[test]
    fn naive_parser_splits_inside_quotes_and_strips_them() {
        let table = naive()
            .parse_text("city,state\n\"Rio de Janeiro, RJ\",x\n")
            .expect("parse");
        // the quoted comma still splits, the overflow cell is dropped
        assert_eq!(
            table.rows()[0],
            vec![CellValue::text("Rio de Janeiro"), CellValue::text("RJ")]
        );
    }

    #[test]
    fn naive_parser_rejects_blank_content() {
        let err = naive().parse_text("\n  \n\t\n").expect_err("empty content");
        assert!(matches!(err, DashboardError::Parse { format: "csv", .. }));
    }

    #[test]
    fn naive_parser_honours_custom_delimiter() {
        let parser = NaiveSplitParser::new(b';', UTF_8);
        let table = parser.parse_text("a;b\n1;2\n").expect("parse");
        assert_eq!(table.headers(), ["a", "b"]);
        assert_eq!(table.rows()[0][1], CellValue::text("2"));
    }

    #[test]
    fn quoted_parser_keeps_embedded_delimiters_and_newlines() {
        let parser = QuotedCsvParser::new(b',', UTF_8);
        let table = parser
            .parse_text("city,note\n\"Rio de Janeiro, RJ\",\"line one\nline two\"\nRecife\n")
            .expect("parse");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][0], CellValue::text("Rio de Janeiro, RJ"));
        assert_eq!(table.rows()[0][1], CellValue::text("line one\nline two"));
        assert_eq!(table.rows()[1][1], CellValue::Empty);
    }

    #[test]
    fn quoted_parser_rejects_blank_content() {
        let parser = QuotedCsvParser::new(b',', UTF_8);
        assert!(parser.parse_text("").is_err());
    }
}
