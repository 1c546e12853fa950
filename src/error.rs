//! Error types for eqprobe

use std::path::PathBuf;

use thiserror::Error;

use crate::generator::InvalidInput;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("unresolved variable `{{{{{0}}}}}` in `{1}`")]
    UnresolvedVariable(String, String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("history database error: {0}")]
    History(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
