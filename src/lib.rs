//! Public API for the statement canonicalization crate.
//!
//! Adapters turn source rows into [`Transaction`]s through the
//! [`TransactionBuilder`]; the [`Engine`] then categorizes them through a
//! [`Categorizer`] and reports [`CategorizationStats`]; [`csv_io`] writes the
//! canonical CSV.

pub mod builder;
pub mod csv_io;
pub mod engine;
pub mod errors;
pub mod models;
pub mod money;
pub mod party;
pub mod rules;
pub mod stats;
pub mod transaction;

pub use builder::TransactionBuilder;
pub use csv_io::CsvFormat;
pub use engine::{Categorizer, Category, Engine, Outcome};
pub use errors::{MoneyError, TransactionError};
pub use models::{
    CategorizedTransaction, Direction, TransactionCore, TransactionWithParties, UNCATEGORIZED,
};
pub use money::Money;
pub use party::Party;
pub use rules::RuleCategorizer;
pub use stats::{CategorizationStats, CategorizationSummary};
pub use transaction::Transaction;
