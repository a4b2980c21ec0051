//! Error types for tactus-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Actuation error: {0}")]
    Actuation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
