use std::fmt;

use crate::model::Side;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty label, no name columns, etc.).
    ConfigValidation(String),
    /// Score threshold outside 0..=100. Never clamped.
    InvalidThreshold(i64),
    /// None of the configured name columns exists in the input header.
    MissingColumn { side: Side, columns: Vec<String> },
    /// IO / CSV reader error.
    Io(String),
    /// Cancellation flag observed between passes.
    Cancelled { after_pass: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidThreshold(value) => {
                write!(f, "threshold must be between 0 and 100, got {value}")
            }
            Self::MissingColumn { side, columns } => {
                write!(f, "{side} input: none of the name columns found ({})", columns.join(", "))
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Cancelled { after_pass } => write!(f, "reconciliation cancelled after {after_pass} pass"),
        }
    }
}

impl std::error::Error for ReconError {}

