//! Layered transaction model: core facts, then parties + direction, then
//! categorization. Each layer owns the one below it.

use crate::money::Money;
use crate::party::Party;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel category for "nothing determined".
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Whether money left (`Debit`) or entered (`Credit`) the account holder's account.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Debit,
    Credit,
    #[default]
    Unknown,
}

impl Direction {
    /// Negative ⇒ debit, zero or positive ⇒ credit.
    pub fn from_amount(amount: Decimal) -> Self {
        if amount < Decimal::ZERO {
            Direction::Debit
        } else {
            Direction::Credit
        }
    }

    /// Resolve the direction once from the candidate signals.
    ///
    /// Precedence: an explicit direction (other than `Unknown`), then an
    /// explicit debit flag, then the sign of the amount. The first signal
    /// present wins; the others are not consulted.
    pub fn resolve(explicit: Option<Direction>, debit_flag: Option<bool>, amount: Decimal) -> Self {
        match (explicit, debit_flag) {
            (Some(d), _) if d != Direction::Unknown => d,
            (_, Some(true)) => Direction::Debit,
            (_, Some(false)) => Direction::Credit,
            _ => Direction::from_amount(amount),
        }
    }

    /// ISO 20022 credit/debit indicator.
    pub fn code(self) -> &'static str {
        match self {
            Direction::Debit => "DBIT",
            Direction::Credit => "CRDT",
            Direction::Unknown => "",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "DBIT" => Direction::Debit,
            "CRDT" => Direction::Credit,
            _ => Direction::Unknown,
        }
    }

    pub fn is_debit(self) -> bool {
        self == Direction::Debit
    }
}

/// Facts every transaction has, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCore {
    pub id: String,
    pub date: NaiveDate,
    pub value_date: NaiveDate,
    pub amount: Money,
    pub description: String,
    pub status: String,
    pub reference: String,
}

/// Core facts plus who paid whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithParties {
    pub core: TransactionCore,
    pub payer: Party,
    pub payee: Party,
    pub direction: Direction,
}

impl TransactionWithParties {
    pub fn core(&self) -> &TransactionCore {
        &self.core
    }

    pub fn id(&self) -> &str {
        &self.core.id
    }

    pub fn date(&self) -> NaiveDate {
        self.core.date
    }

    pub fn amount(&self) -> &Money {
        &self.core.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Payee for outgoing money, payer otherwise (`Unknown` counts as credit).
    pub fn counterparty(&self) -> &Party {
        counterparty(self.direction, &self.payer, &self.payee)
    }

    /// Legacy accessor: the payee on debits, the payer on credits.
    pub fn legacy_payee(&self) -> &Party {
        if self.direction.is_debit() {
            &self.payee
        } else {
            &self.payer
        }
    }

    /// Legacy accessor: the payer on debits, the payee on credits.
    pub fn legacy_payer(&self) -> &Party {
        if self.direction.is_debit() {
            &self.payer
        } else {
            &self.payee
        }
    }
}

pub(crate) fn counterparty<'a>(direction: Direction, payer: &'a Party, payee: &'a Party) -> &'a Party {
    if direction.is_debit() { payee } else { payer }
}

/// Parties plus the categorization outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    pub parties: TransactionWithParties,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub fund: String,
}

impl CategorizedTransaction {
    /// Wraps `parties` with the sentinel category and no type or fund.
    pub fn new(parties: TransactionWithParties) -> Self {
        Self {
            parties,
            category: UNCATEGORIZED.to_string(),
            kind: String::new(),
            fund: String::new(),
        }
    }

    pub fn core(&self) -> &TransactionCore {
        self.parties.core()
    }

    pub fn with_parties(&self) -> &TransactionWithParties {
        &self.parties
    }

    pub fn counterparty(&self) -> &Party {
        self.parties.counterparty()
    }

    pub fn direction(&self) -> Direction {
        self.parties.direction
    }

    pub fn is_categorized(&self) -> bool {
        !self.category.is_empty() && self.category != UNCATEGORIZED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn with_parties(direction: Direction) -> TransactionWithParties {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        TransactionWithParties {
            core: TransactionCore {
                id: "t1".into(),
                date,
                value_date: date,
                amount: Money::new(dec!(-100.50), "CHF"),
                description: "invoice".into(),
                status: "BOOK".into(),
                reference: String::new(),
            },
            payer: Party::new("John Doe", ""),
            payee: Party::new("Acme Corp", ""),
            direction,
        }
    }

    #[test]
    fn resolve_follows_precedence() {
        let neg = dec!(-1);
        let pos = dec!(1);
        // explicit direction beats everything
        assert_eq!(Direction::resolve(Some(Direction::Credit), Some(true), neg), Direction::Credit);
        // explicit Unknown is no signal at all
        assert_eq!(Direction::resolve(Some(Direction::Unknown), Some(true), pos), Direction::Debit);
        // flag beats sign
        assert_eq!(Direction::resolve(None, Some(false), neg), Direction::Credit);
        // sign last
        assert_eq!(Direction::resolve(None, None, neg), Direction::Debit);
        assert_eq!(Direction::resolve(None, None, Decimal::ZERO), Direction::Credit);
    }

    #[test]
    fn codes_round_trip() {
        for d in [Direction::Debit, Direction::Credit, Direction::Unknown] {
            assert_eq!(Direction::from_code(d.code()), d);
        }
        assert_eq!(Direction::from_code(" dbit "), Direction::Debit);
    }

    #[test]
    fn counterparty_follows_direction() {
        assert_eq!(with_parties(Direction::Debit).counterparty().name, "Acme Corp");
        assert_eq!(with_parties(Direction::Credit).counterparty().name, "John Doe");
        assert_eq!(with_parties(Direction::Unknown).counterparty().name, "John Doe");
    }

    #[test]
    fn legacy_accessors_invert_on_credit() {
        let debit = with_parties(Direction::Debit);
        assert_eq!(debit.legacy_payee().name, "Acme Corp");
        assert_eq!(debit.legacy_payer().name, "John Doe");

        let credit = with_parties(Direction::Credit);
        assert_eq!(credit.legacy_payee().name, "John Doe");
        assert_eq!(credit.legacy_payer().name, "Acme Corp");
    }

    #[test]
    fn categorized_defaults_to_sentinel() {
        let tx = CategorizedTransaction::new(with_parties(Direction::Debit));
        assert_eq!(tx.category, UNCATEGORIZED);
        assert!(!tx.is_categorized());
        assert_eq!(tx.core().id, "t1");
        assert_eq!(tx.counterparty().name, "Acme Corp");
    }
}
