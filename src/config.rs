//! Pipeline policy knobs, loadable from YAML.
//!
//! Every cap the projections apply lives here so a deployment can tune them
//! without code changes. Absent keys fall back to the defaults below.

use std::{fs, path::Path};

use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};

use crate::{
    error::{DashboardError, Result},
    io_utils::{self, DEFAULT_CSV_DELIMITER},
    parser::TextParserKind,
};

pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Rows kept in a chart series.
    pub chart_row_cap: usize,
    /// Chart points inspected when shaping a chart.
    pub chart_sample_rows: usize,
    pub bar_category_cap: usize,
    pub pie_series_cap: usize,
    /// Pie labels longer than this are cut to `pie_label_max - 3` characters
    /// plus `...`.
    pub pie_label_max: usize,
    pub area_row_cap: usize,
    pub page_size: usize,
    pub max_file_bytes: u64,
    #[serde(with = "delimiter_char")]
    pub delimiter: u8,
    pub text_parser: TextParserKind,
    pub input_encoding: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chart_row_cap: 10,
            chart_sample_rows: 15,
            bar_category_cap: 12,
            pie_series_cap: 6,
            pie_label_max: 15,
            area_row_cap: 20,
            page_size: 10,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            delimiter: DEFAULT_CSV_DELIMITER,
            text_parser: TextParserKind::default(),
            input_encoding: None,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config_error = |message: String| DashboardError::Config {
            path: path.to_path_buf(),
            message,
        };
        let raw = fs::read_to_string(path).map_err(|source| DashboardError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig =
            serde_yaml::from_str(&raw).map_err(|err| config_error(err.to_string()))?;
        config.validate().map_err(config_error)?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let caps = [
            ("chart_row_cap", self.chart_row_cap),
            ("chart_sample_rows", self.chart_sample_rows),
            ("bar_category_cap", self.bar_category_cap),
            ("pie_series_cap", self.pie_series_cap),
            ("area_row_cap", self.area_row_cap),
            ("page_size", self.page_size),
        ];
        if let Some((name, _)) = caps.iter().find(|(_, value)| *value == 0) {
            return Err(format!("'{name}' must be greater than zero"));
        }
        if self.pie_label_max < 4 {
            return Err("'pie_label_max' must be at least 4".to_string());
        }
        if self.max_file_bytes == 0 {
            return Err("'max_file_bytes' must be greater than zero".to_string());
        }
        if let Some(label) = &self.input_encoding {
            io_utils::resolve_encoding(Some(label)).map_err(|err| err.to_string())?;
        }
        Ok(())
    }

    /// Encoding for delimited text. Unknown labels are caught by
    /// [`validate`](Self::validate); here they fall back to UTF-8.
    pub fn encoding(&self) -> &'static Encoding {
        io_utils::resolve_encoding(self.input_encoding.as_deref()).unwrap_or(UTF_8)
    }
}

mod delimiter_char {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&(*value as char).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::cli::parse_delimiter(&raw).map_err(de::Error::custom)
    }
}
