//! Error types for tactus-cns

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CnsError {
    #[error("Configuration error: {0}")]
    Config(String),
}
