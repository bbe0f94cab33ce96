use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{table} input {} could not be read: {source}", .path.display())]
    MissingInput {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{table} is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("{table} CSV error: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{table} data row {line_index} invalid: {message}")]
    DataRow {
        table: &'static str,
        line_index: usize,
        message: String,
    },

    #[error("{table} could not be assembled into a frame: {message}")]
    Frame {
        table: &'static str,
        message: String,
    },
}

impl ParserError {
    /// Name of the table whose input failed.
    pub fn table(&self) -> &'static str {
        match self {
            ParserError::MissingInput { table, .. }
            | ParserError::MissingColumn { table, .. }
            | ParserError::Csv { table, .. }
            | ParserError::DataRow { table, .. }
            | ParserError::Frame { table, .. } => table,
        }
    }
}
