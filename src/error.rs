//! Fatal startup errors
//!
//! Nothing at runtime returns these: an empty pick or a stale node handle is
//! a no-op, not an error. These indicate a packaging or configuration defect.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    /// A particle template referenced by the settings is not in the library
    #[error("particle template not found: {0}")]
    MissingTemplate(String),

    /// Settings failed validation
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
