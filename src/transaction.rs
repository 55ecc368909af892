//! The canonical flat record: the one shape that crosses the CSV boundary.

use crate::errors::TransactionError;
use crate::models::{
    self, CategorizedTransaction, Direction, TransactionCore, TransactionWithParties,
};
use crate::money::{Money, format_amount};
use crate::party::Party;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Date layout used in the CSV columns.
pub const CSV_DATE_FORMAT: &str = "%d.%m.%Y";

/// Fixed, positional column order of the canonical CSV.
pub const COLUMNS: [&str; 34] = [
    "BookkeepingNumber",
    "Status",
    "Date",
    "ValueDate",
    "Name",
    "Description",
    "RemittanceInfo",
    "PartyName",
    "PartyIBAN",
    "Amount",
    "CreditDebit",
    "DebitFlag",
    "Debit",
    "Credit",
    "Currency",
    "AmountExclTax",
    "AmountTax",
    "TaxRate",
    "Recipient",
    "Investment",
    "Number",
    "Category",
    "Type",
    "Fund",
    "NumberOfShares",
    "Fees",
    "IBAN",
    "EntryReference",
    "Reference",
    "AccountServicer",
    "BankTxCode",
    "OriginalCurrency",
    "OriginalAmount",
    "ExchangeRate",
];

/// One canonical transaction.
///
/// * `amount` is signed: negative for money leaving the account.
/// * `direction` is resolved once by the builder; the CSV credit/debit code
///   and debit flag are both rendered from it, so they can never disagree.
/// * `debit`/`credit`, `name`, `recipient`, `investment` and the party
///   columns are derived; see [`Transaction::refresh_derived_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub bookkeeping_number: String,
    pub status: String,
    pub date: NaiveDate,
    pub value_date: NaiveDate,
    /// Display name.
    pub name: String,
    pub description: String,
    pub remittance_info: String,
    pub party_name: String,
    pub party_iban: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub debit: Decimal,
    pub credit: Decimal,
    pub currency: String,
    pub amount_excl_tax: Decimal,
    pub amount_tax: Decimal,
    pub tax_rate: Decimal,
    pub recipient: String,
    pub investment: String,
    pub number: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub fund: String,
    pub number_of_shares: i64,
    pub fees: Decimal,
    /// The account holder's own account.
    pub iban: String,
    pub entry_reference: String,
    pub reference: String,
    pub account_servicer: String,
    pub bank_tx_code: String,
    pub original_currency: String,
    pub original_amount: Decimal,
    pub exchange_rate: Decimal,
    pub payer: Party,
    pub payee: Party,
}

impl Transaction {
    pub fn is_debit(&self) -> bool {
        self.direction.is_debit()
    }

    pub fn is_credit(&self) -> bool {
        !self.is_debit()
    }

    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency.clone())
    }

    pub fn counterparty(&self) -> &Party {
        models::counterparty(self.direction, &self.payer, &self.payee)
    }

    /// Recompute every derived column in one go.
    ///
    /// Order matters (display name before party name) and each step only
    /// fills what is still empty, so running it twice changes nothing.
    /// The split columns are always recomputed from `amount` + `direction`.
    pub fn refresh_derived_fields(&mut self) {
        let counterparty = self.counterparty().clone();

        let name = if self.name.is_empty() {
            counterparty.name.trim().to_string()
        } else {
            self.name.clone()
        };
        let recipient = if self.recipient.is_empty() {
            self.payee.name.trim().to_string()
        } else {
            self.recipient.clone()
        };
        let (debit, credit) = if self.is_debit() {
            (self.amount, Decimal::ZERO)
        } else {
            (Decimal::ZERO, self.amount)
        };
        let investment = if self.investment.is_empty() {
            self.kind.clone()
        } else {
            self.investment.clone()
        };
        let party_name = if self.party_name.is_empty() {
            counterparty.name.trim().to_string()
        } else {
            self.party_name.clone()
        };
        let party_iban = if self.party_iban.is_empty() {
            counterparty.normalized_account_identifier()
        } else {
            self.party_iban.clone()
        };

        self.name = name;
        self.recipient = recipient;
        self.debit = debit;
        self.credit = credit;
        self.investment = investment;
        self.party_name = party_name;
        self.party_iban = party_iban;
    }

    pub fn core(&self) -> TransactionCore {
        TransactionCore {
            id: self.id.clone(),
            date: self.date,
            value_date: self.value_date,
            amount: self.money(),
            description: self.description.clone(),
            status: self.status.clone(),
            reference: self.reference.clone(),
        }
    }

    pub fn with_parties(&self) -> TransactionWithParties {
        TransactionWithParties {
            core: self.core(),
            payer: self.payer.clone(),
            payee: self.payee.clone(),
            direction: self.direction,
        }
    }

    pub fn categorized(&self) -> CategorizedTransaction {
        CategorizedTransaction {
            parties: self.with_parties(),
            category: self.category.clone(),
            kind: self.kind.clone(),
            fund: self.fund.clone(),
        }
    }

    /// Render in [`COLUMNS`] order; decimals at 2 places.
    pub fn to_row(&self) -> Vec<String> {
        let d = |v: Decimal| format_amount(v, 2);
        vec![
            self.bookkeeping_number.clone(),
            self.status.clone(),
            self.date.format(CSV_DATE_FORMAT).to_string(),
            self.value_date.format(CSV_DATE_FORMAT).to_string(),
            self.name.clone(),
            self.description.clone(),
            self.remittance_info.clone(),
            self.party_name.clone(),
            self.party_iban.clone(),
            d(self.amount),
            self.direction.code().to_string(),
            self.is_debit().to_string(),
            d(self.debit),
            d(self.credit),
            self.currency.clone(),
            d(self.amount_excl_tax),
            d(self.amount_tax),
            d(self.tax_rate),
            self.recipient.clone(),
            self.investment.clone(),
            self.number.clone(),
            self.category.clone(),
            self.kind.clone(),
            self.fund.clone(),
            self.number_of_shares.to_string(),
            d(self.fees),
            self.iban.clone(),
            self.entry_reference.clone(),
            self.reference.clone(),
            self.account_servicer.clone(),
            self.bank_tx_code.clone(),
            self.original_currency.clone(),
            d(self.original_amount),
            d(self.exchange_rate),
        ]
    }

    /// Rebuild a transaction from a row in [`COLUMNS`] order.
    ///
    /// The counterparty columns become the payee (debit) or payer (credit);
    /// the other side is the account holder, identified by the `IBAN` column.
    /// Rows go through the same checks as the builder: a row needs a
    /// currency and an amount (possibly only in `Debit`/`Credit`), and an
    /// empty `ValueDate` falls back to `Date`.
    pub fn from_row<S: AsRef<str>>(id: impl Into<String>, row: &[S]) -> Result<Self, TransactionError> {
        if row.len() != COLUMNS.len() {
            return Err(TransactionError::parse(format!(
                "expected {} columns, got {}",
                COLUMNS.len(),
                row.len()
            )));
        }
        let col = |i: usize| row[i].as_ref().trim();
        let text = |i: usize| col(i).to_string();

        let date = parse_date(COLUMNS[2], col(2))?;
        let value_date = match col(3) {
            "" => date,
            raw => parse_date(COLUMNS[3], raw)?,
        };
        let debit = parse_decimal(COLUMNS[12], col(12))?;
        let credit = parse_decimal(COLUMNS[13], col(13))?;
        let raw_amount = parse_decimal(COLUMNS[9], col(9))?;
        require_amount_and_currency(raw_amount, debit, credit, col(14))?;
        let amount = amount_from_split(raw_amount, debit, credit);
        let debit_flag = match col(11) {
            "" => None,
            raw => Some(parse_bool(COLUMNS[11], raw)?),
        };
        let direction = Direction::resolve(Some(Direction::from_code(col(10))), debit_flag, amount);

        let counterparty = Party::new(col(7), col(8));
        let holder = Party::new("", col(26));
        let (payer, payee) = if direction.is_debit() {
            (holder, counterparty)
        } else {
            (counterparty, holder)
        };

        let mut tx = Transaction {
            id: id.into(),
            bookkeeping_number: text(0),
            status: text(1),
            date,
            value_date,
            name: text(4),
            description: text(5),
            remittance_info: text(6),
            party_name: text(7),
            party_iban: text(8),
            amount,
            direction,
            debit,
            credit,
            currency: text(14),
            amount_excl_tax: parse_decimal(COLUMNS[15], col(15))?,
            amount_tax: parse_decimal(COLUMNS[16], col(16))?,
            tax_rate: parse_decimal(COLUMNS[17], col(17))?,
            recipient: text(18),
            investment: text(19),
            number: text(20),
            category: text(21),
            kind: text(22),
            fund: text(23),
            number_of_shares: parse_shares(col(24))?,
            fees: parse_decimal(COLUMNS[25], col(25))?,
            iban: text(26),
            entry_reference: text(27),
            reference: text(28),
            account_servicer: text(29),
            bank_tx_code: text(30),
            original_currency: text(31),
            original_amount: parse_decimal(COLUMNS[32], col(32))?,
            exchange_rate: parse_decimal(COLUMNS[33], col(33))?,
            payer,
            payee,
        };
        tx.refresh_derived_fields();
        Ok(tx)
    }
}

/// Both `TransactionBuilder::build` and [`Transaction::from_row`] refuse a
/// record without an amount in any of the three columns or without a
/// currency.
pub(crate) fn require_amount_and_currency(
    amount: Decimal,
    debit: Decimal,
    credit: Decimal,
    currency: &str,
) -> Result<(), TransactionError> {
    if amount.is_zero() && debit.is_zero() && credit.is_zero() {
        return Err(TransactionError::validation("amount is required"));
    }
    if currency.trim().is_empty() {
        return Err(TransactionError::validation("currency is required"));
    }
    Ok(())
}

/// Signed amount for split-column sources: a zero `amount` becomes
/// `-|debit|`, or `+|credit|` when debit is zero too.
pub(crate) fn amount_from_split(amount: Decimal, debit: Decimal, credit: Decimal) -> Decimal {
    if !amount.is_zero() {
        amount
    } else if !debit.is_zero() {
        -debit.abs()
    } else {
        credit.abs()
    }
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, TransactionError> {
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(raw)
        .map_err(|_| TransactionError::parse(format!("{column}: invalid decimal '{raw}'")))
}

fn parse_date(column: &str, raw: &str) -> Result<NaiveDate, TransactionError> {
    NaiveDate::parse_from_str(raw, CSV_DATE_FORMAT)
        .map_err(|_| TransactionError::parse(format!("{column}: invalid date '{raw}'")))
}

fn parse_bool(column: &str, raw: &str) -> Result<bool, TransactionError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(TransactionError::parse(format!(
            "{column}: expected 'true' or 'false', got '{raw}'"
        ))),
    }
}

fn parse_shares(raw: &str) -> Result<i64, TransactionError> {
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| TransactionError::parse(format!("NumberOfShares: invalid integer '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TransactionBuilder;
    use rust_decimal_macros::dec;

    fn sample() -> Transaction {
        TransactionBuilder::new()
            .id("fixed")
            .date_str("2025-01-15")
            .amount(dec!(-100.50), "CHF")
            .payer("John Doe", "CH93 0076 2011 6238 5295 7")
            .payee("Acme Corp", "DE89 3704 0044 0532 0130 00")
            .description("Invoice 42")
            .build()
            .unwrap()
    }

    #[test]
    fn row_has_fixed_layout() {
        let row = sample().to_row();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[2], "15.01.2025");
        assert_eq!(row[3], "15.01.2025");
        assert_eq!(row[4], "Acme Corp");
        assert_eq!(row[7], "Acme Corp");
        assert_eq!(row[8], "DE89370400440532013000");
        assert_eq!(row[9], "-100.50");
        assert_eq!(row[10], "DBIT");
        assert_eq!(row[11], "true");
        assert_eq!(row[12], "-100.50");
        assert_eq!(row[13], "0.00");
        assert_eq!(row[21], "Uncategorized");
        assert_eq!(row[33], "0.00");
    }

    #[test]
    fn row_reads_back() {
        let tx = sample();
        let back = Transaction::from_row("fixed", &tx.to_row()).unwrap();
        assert_eq!(back.direction, Direction::Debit);
        assert_eq!(back.amount, dec!(-100.50));
        assert_eq!(back.counterparty().name, "Acme Corp");
        assert_eq!(back.name, tx.name);
        assert_eq!(back.debit, tx.debit);
        assert_eq!(back.category, tx.category);
    }

    #[test]
    fn from_row_rejects_bad_input() {
        let short = vec!["x"; 3];
        assert!(Transaction::from_row("a", &short).is_err());

        let mut row = sample().to_row();
        row[2] = "2025-01-15".into();
        let err = Transaction::from_row("a", &row).unwrap_err();
        assert!(err.to_string().contains("Date"));

        let mut row = sample().to_row();
        row[11] = "yes".into();
        assert!(Transaction::from_row("a", &row).is_err());
    }

    #[test]
    fn split_only_row_keeps_its_amount() {
        let mut row = sample().to_row();
        row[9] = String::new();
        row[10] = "DBIT".into();
        row[12] = "40.00".into();
        row[13] = String::new();
        let tx = Transaction::from_row("a", &row).unwrap();
        assert_eq!(tx.amount, dec!(-40));
        assert_eq!(tx.direction, Direction::Debit);
        assert_eq!(tx.debit, dec!(-40));
        assert_eq!(tx.credit, Decimal::ZERO);

        let mut row = sample().to_row();
        row[9] = "0.00".into();
        row[10] = String::new();
        row[11] = String::new();
        row[12] = String::new();
        row[13] = "12.50".into();
        let tx = Transaction::from_row("b", &row).unwrap();
        assert_eq!(tx.amount, dec!(12.50));
        assert_eq!(tx.direction, Direction::Credit);
        assert_eq!(tx.credit, dec!(12.50));
    }

    #[test]
    fn from_row_requires_amount_and_currency() {
        let mut row = sample().to_row();
        row[9] = String::new();
        row[12] = "0.00".into();
        assert_eq!(
            Transaction::from_row("a", &row).unwrap_err(),
            TransactionError::Validation("amount is required".into())
        );

        let mut row = sample().to_row();
        row[14] = " ".into();
        assert_eq!(
            Transaction::from_row("a", &row).unwrap_err(),
            TransactionError::Validation("currency is required".into())
        );
    }

    #[test]
    fn empty_value_date_falls_back_to_date() {
        let mut row = sample().to_row();
        row[3] = String::new();
        let tx = Transaction::from_row("a", &row).unwrap();
        assert_eq!(tx.value_date, tx.date);
        assert_eq!(tx.value_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut tx = sample();
        let before = tx.clone();
        tx.refresh_derived_fields();
        assert_eq!(tx, before);
    }

    #[test]
    fn refresh_keeps_explicit_values() {
        let mut tx = sample();
        tx.name = "Shown".into();
        tx.party_name = "Explicit".into();
        tx.refresh_derived_fields();
        assert_eq!(tx.name, "Shown");
        assert_eq!(tx.party_name, "Explicit");
    }

    #[test]
    fn layered_views_match_flat_record() {
        let tx = sample();
        let layered = tx.categorized();
        assert_eq!(layered.core().amount, Money::new(dec!(-100.50), "CHF"));
        assert_eq!(layered.counterparty().name, "Acme Corp");
        assert_eq!(layered.with_parties().legacy_payer().name, "John Doe");
        assert_eq!(layered.category, "Uncategorized");
    }
}
