//! Startup and validation errors.
//!
//! Only setup-time failures surface as errors: bad configuration, unreadable
//! inputs, a malformed module database, a misassembled solver. Stochastic
//! failures inside the evolutionary operators are plain `bool`/`Option`
//! returns, and invariant violations abort with a diagnostic.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("solver builder: {0}")]
    Builder(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("module database: {0}")]
    Db(String),

    #[error("unrecognized input path format: {0}")]
    InputFormat(String),

    #[error("failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("csv input: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
