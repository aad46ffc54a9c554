use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading graphs and instances or validating a search configuration.
///
/// A precoloring that cannot be extended is not an error; see [`crate::Verdict`].
#[derive(Debug, Error)]
pub enum StarError {
    #[error("invalid graph6 string {input:?}: {reason}")]
    Graph6 { input: String, reason: String },

    #[error("instance parse error at line {line}: {reason}")]
    Instance { line: usize, reason: String },

    #[error("instance is missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
