//! # CLI Error Handling
//!
//! Every failure a command can hit, flattened into one enum for `main`.
//!
//! ```text
//! CartError ──┐
//! StoreError ─┤
//! DbError ────┼──► CliError ──► stderr + exit code 1
//! ConfigError ┘
//! ```

use basket_core::{CartError, StoreError};
use basket_store::DbError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// More than one line starts with the given identity prefix.
    #[error("identity prefix {prefix} matches {matches} items")]
    AmbiguousIdentity { prefix: String, matches: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::InvalidArgument(_) => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        let err: CliError = CartError::ItemNotFound("abc".to_string()).into();
        assert_eq!(err.to_string(), CartError::ItemNotFound("abc".to_string()).to_string());
        assert_eq!(err.exit_code(), 1);

        let err = CliError::InvalidArgument("bad".to_string());
        assert_eq!(err.exit_code(), 2);
    }
}
