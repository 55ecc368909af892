//! Error types.
//!
//! Glue code (CSV, rules loading, CLI) returns the `anyhow`-backed [`Result`];
//! the domain layer returns the typed enums below so callers can match on them.

use thiserror::Error;

/// Tiny alias so we can return `Result<T>` everywhere.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Failures of [`Money`](crate::money::Money) parsing and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Both operands must carry the same currency code.
    #[error("currency mismatch: '{left}' vs '{right}'")]
    CurrencyMismatch { left: String, right: String },

    #[error("invalid amount '{0}'")]
    Parse(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("amount out of range")]
    Overflow,
}

/// Failures surfaced by the transaction builder.
///
/// The builder keeps the first one it meets and hands it back from `build()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl TransactionError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<MoneyError> for TransactionError {
    fn from(e: MoneyError) -> Self {
        Self::Parse(e.to_string())
    }
}
