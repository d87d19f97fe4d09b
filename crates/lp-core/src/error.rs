//! Base error type.
//!
//! Sub-crates define their own error enums and convert `CoreError` where
//! they surface configuration failures from this crate.

use thiserror::Error;

/// The top-level error type for `lp-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `lp-core`.
pub type CoreResult<T> = Result<T, CoreError>;
