use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error(
        "no champion dataset in {}: expected one of {}",
        .dir.display(),
        .candidates.join(", ")
    )]
    MissingData {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    #[error("{} has no `{column}` column", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("champion not found: {0}")]
    NotFound(String),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
