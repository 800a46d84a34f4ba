use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Allure results directory not found: {}", path.display())]
    ResultsDirNotFound { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write summary file {}: {source}", path.display())]
    SummaryWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    /// Process exit status for errors that end the whole run.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::SummaryWrite { .. } => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
