//! Error taxonomy for the ingestion pipeline.
//!
//! Every variant is terminal for the upload being processed: the assembler
//! never returns a partial bundle, and callers keep whatever dashboard they
//! were showing until the user retries with another file.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::charts::ChartKind;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Unsupported file type: '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {format} content: {message}")]
    Parse { format: &'static str, message: String },

    #[error("File is {size} bytes, above the {limit} byte upload limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Chart type '{kind}' is not available for this data")]
    ChartUnavailable { kind: ChartKind },

    #[error("Invalid configuration in {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

impl DashboardError {
    pub fn parse(format: &'static str, message: impl Into<String>) -> Self {
        DashboardError::Parse {
            format,
            message: message.into(),
        }
    }

    /// Single line shown to the person who uploaded the file.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::UnsupportedFormat { extension } => {
                format!("Tipo de arquivo não suportado: {extension}")
            }
            DashboardError::Read { .. } => "Erro ao ler o arquivo".to_string(),
            DashboardError::Parse { format, message } => {
                format!("Erro ao processar arquivo {}: {message}", format.to_uppercase())
            }
            DashboardError::FileTooLarge { limit, .. } => format!(
                "Arquivo muito grande. Tamanho máximo: {}MB",
                limit / (1024 * 1024)
            ),
            DashboardError::ChartUnavailable { kind } => {
                format!("Gráfico '{kind}' indisponível para estes dados")
            }
            DashboardError::Config { message, .. } => {
                format!("Configuração inválida: {message}")
            }
        }
    }
}
