use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write default config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch feed for '{series}': {reason}")]
    Fetch { series: String, reason: String },
    #[error("malformed feed for '{series}': {reason}")]
    Parse { series: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("cannot create ledger directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot open ledger at {path:?}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("ledger lookup failed: {0}")]
    Read(#[source] rusqlite::Error),
    #[error("ledger write failed: {0}")]
    Write(#[source] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
