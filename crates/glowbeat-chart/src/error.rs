use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while loading a chart.
///
/// Malformed records never produce an error; they are skipped by the decoder.
/// Only an unreadable file or undecodable bytes abort a load.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to read chart file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chart is not valid UTF-8: {path}")]
    Encoding { path: PathBuf },
}
