use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to read charm state from {}, error: {source}", path.display()))]
    ReadState { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse charm state from {}, error: {source}", path.display()))]
    ParseState { path: PathBuf, source: serde_json::Error },

    #[snafu(display("Failed to serialize charm state, error: {source}"))]
    SerializeState { source: serde_json::Error },

    #[snafu(display("Failed to create state directory {}, error: {source}", path.display()))]
    CreateStateDirectory { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to write charm state to {}, error: {source}", path.display()))]
    WriteState { path: PathBuf, source: std::io::Error },
}
