//! Categorization orchestration: feed transactions one at a time (or as a
//! batch), let an external [`Categorizer`] name the category, keep score.
//!
//! Categorization is best-effort enrichment. A failing categorizer never
//! aborts the batch and never reaches the caller; the row just stays
//! `Uncategorized` and counts as `failed`.

use crate::models::UNCATEGORIZED;
use crate::money::format_amount;
use crate::stats::{CategorizationStats, CategorizationSummary};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Date layout handed to categorizers.
pub const CATEGORIZER_DATE_FORMAT: &str = "%Y-%m-%d";

/// What a categorizer answers with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn uncategorized() -> Self {
        Self::new(UNCATEGORIZED)
    }

    /// Empty and the sentinel both mean "no answer".
    pub fn is_uncategorized(&self) -> bool {
        let name = self.name.trim();
        name.is_empty() || name == UNCATEGORIZED
    }
}

/// External capability that maps a party + context to a category.
///
/// Calls are synchronous and may be slow; timeouts and retries are the
/// implementor's business.
pub trait Categorizer {
    /// * `party_name` – resolved counterparty name, never empty
    /// * `is_debtor` – `true` when money left the account
    /// * `amount` – signed, 2 decimal places
    /// * `date` – `YYYY-MM-DD`
    /// * `info` – free-text description
    fn categorize(
        &self,
        party_name: &str,
        is_debtor: bool,
        amount: &str,
        date: &str,
        info: &str,
    ) -> anyhow::Result<Category>;
}

impl<F> Categorizer for F
where
    F: Fn(&str, bool, &str, &str, &str) -> anyhow::Result<Category>,
{
    fn categorize(
        &self,
        party_name: &str,
        is_debtor: bool,
        amount: &str,
        date: &str,
        info: &str,
    ) -> anyhow::Result<Category> {
        self(party_name, is_debtor, amount, date, info)
    }
}

/// How a single transaction came out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Categorized,
    Failed,
    Uncategorized,
}

/// Categorization driver for one source format.
///
/// ```rust
/// use statement_canon::{Category, Engine, TransactionBuilder};
///
/// let groceries = |_: &str, _: bool, _: &str, _: &str, _: &str| -> anyhow::Result<Category> {
///     Ok(Category::new("Groceries"))
/// };
/// let mut eng = Engine::new("camt", Some(&groceries));
/// let mut txs = vec![TransactionBuilder::new()
///     .date_str("2025-01-15")
///     .amount_str("-12.30", "CHF")
///     .payee("Migros", "")
///     .build()?];
/// let summary = eng.categorize_batch(&mut txs);
/// assert_eq!(txs[0].category, "Groceries");
/// assert_eq!(summary.successful, 1);
/// # Ok::<(), statement_canon::TransactionError>(())
/// ```
pub struct Engine<'a> {
    source: String,
    categorizer: Option<&'a dyn Categorizer>,
    /// Running totals across every batch and single call.
    pub stats: CategorizationStats,
}

impl<'a> Engine<'a> {
    /// `source` labels the summary (`parser_type`); without a categorizer
    /// every transaction ends up `Uncategorized`.
    pub fn new(source: impl Into<String>, categorizer: Option<&'a dyn Categorizer>) -> Self {
        Self {
            source: source.into(),
            categorizer,
            stats: CategorizationStats::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Categorize a single transaction in place and count the outcome.
    pub fn process(&mut self, tx: &mut Transaction) -> Outcome {
        let outcome = self.categorize(tx);
        record(&mut self.stats, outcome);
        outcome
    }

    /// Categorize `txs` in order, then log and return the batch summary.
    ///
    /// The summary covers this batch only; `self.stats` keeps the running
    /// total.
    pub fn categorize_batch(&mut self, txs: &mut [Transaction]) -> CategorizationSummary {
        let mut batch = CategorizationStats::new();
        for tx in txs.iter_mut() {
            let outcome = self.categorize(tx);
            record(&mut batch, outcome);
        }
        self.stats.merge(&batch);

        let summary = batch.summary(&self.source);
        summary.log();
        summary
    }

    fn categorize(&self, tx: &mut Transaction) -> Outcome {
        // ------------------------------------------------ no capability
        let Some(categorizer) = self.categorizer else {
            tx.category = UNCATEGORIZED.to_string();
            return Outcome::Uncategorized;
        };

        // ---------------------------------------------------- lookup name
        let Some(name) = lookup_name(tx) else {
            debug!(id = %tx.id, "no party name to categorize by");
            tx.category = UNCATEGORIZED.to_string();
            return Outcome::Uncategorized;
        };

        // ----------------------------------------------------------- call
        let amount = format_amount(tx.amount, 2);
        let date = tx.date.format(CATEGORIZER_DATE_FORMAT).to_string();
        match categorizer.categorize(&name, tx.is_debit(), &amount, &date, &tx.description) {
            Err(e) => {
                warn!(id = %tx.id, party = %name, error = %e, "categorizer failed");
                tx.category = UNCATEGORIZED.to_string();
                Outcome::Failed
            }
            Ok(category) if category.is_uncategorized() => {
                tx.category = UNCATEGORIZED.to_string();
                Outcome::Uncategorized
            }
            Ok(category) => {
                tx.category = category.name;
                Outcome::Categorized
            }
        }
    }
}

fn record(stats: &mut CategorizationStats, outcome: Outcome) {
    match outcome {
        Outcome::Categorized => stats.record_success(),
        Outcome::Failed => stats.record_failure(),
        Outcome::Uncategorized => stats.record_uncategorized(),
    }
}

/// First non-blank of: counterparty, party name, display name, recipient.
fn lookup_name(tx: &Transaction) -> Option<String> {
    [
        tx.counterparty().name.as_str(),
        tx.party_name.as_str(),
        tx.name.as_str(),
        tx.recipient.as_str(),
    ]
    .into_iter()
    .map(str::trim)
    .find(|name| !name.is_empty())
    .map(str::to_string)
}
