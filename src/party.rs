//! Counterparty identity: a name and an (optional) account identifier.

use crate::errors::TransactionError;
use serde::{Deserialize, Serialize};

/// One side of a transaction.
///
/// Equality is forgiving on purpose: names compare trimmed and
/// case-insensitively, account identifiers compare in normalized form
/// (see [`Party::normalized_account_identifier`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub account_identifier: String,
}

impl Party {
    pub fn new(name: impl Into<String>, account_identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account_identifier: account_identifier.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.has_name() && !self.has_account_identifier()
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn has_account_identifier(&self) -> bool {
        !self.normalized_account_identifier().is_empty()
    }

    /// Upper-cased with every whitespace character removed.
    pub fn normalized_account_identifier(&self) -> String {
        self.account_identifier
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Normalized identifier in groups of four, e.g. `CH93 0076 2011 6238 5295 7`.
    pub fn formatted_account_identifier(&self) -> String {
        let normalized: Vec<char> = self.normalized_account_identifier().chars().collect();
        normalized
            .chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Shape check only: two letters, two digits, then 11–30 alphanumerics
    /// (15–34 characters once normalized).
    ///
    /// This does **not** verify the mod-97 checksum or any per-country
    /// length rule. An empty identifier is valid because the field is optional.
    pub fn validate_account_identifier(&self) -> Result<(), TransactionError> {
        let normalized = self.normalized_account_identifier();
        if normalized.is_empty() || has_account_identifier_shape(&normalized) {
            Ok(())
        } else {
            Err(TransactionError::validation(format!(
                "malformed account identifier '{}'",
                self.account_identifier
            )))
        }
    }

    /// Name-only match, for sources whose account identifiers are unreliable.
    pub fn similar_to(&self, other: &Party) -> bool {
        normalized_name(&self.name) == normalized_name(&other.name)
    }
}

impl PartialEq for Party {
    fn eq(&self, other: &Self) -> bool {
        self.similar_to(other)
            && self.normalized_account_identifier() == other.normalized_account_identifier()
    }
}

impl Eq for Party {}

fn normalized_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn has_account_identifier_shape(normalized: &str) -> bool {
    let bytes = normalized.as_bytes();
    (15..=34).contains(&bytes.len())
        && bytes[..2].iter().all(u8::is_ascii_alphabetic)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
        && bytes[4..].iter().all(u8::is_ascii_alphanumeric)
}
