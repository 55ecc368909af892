//! Fluent, error-accumulating constructor for [`Transaction`].
//!
//! ```rust
//! use statement_canon::TransactionBuilder;
//!
//! let tx = TransactionBuilder::new()
//!     .date_str("2025-01-15")
//!     .amount_str("-100.50", "CHF")
//!     .payer("John Doe", "")
//!     .payee("Acme Corp", "")
//!     .build()?;
//! assert_eq!(tx.name, "Acme Corp");
//! # Ok::<(), statement_canon::TransactionError>(())
//! ```

use crate::errors::TransactionError;
use crate::models::{Direction, UNCATEGORIZED};
use crate::money::Money;
use crate::party::Party;
use crate::transaction::{Transaction, amount_from_split, require_amount_and_currency};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Currency a fresh builder starts with.
pub const DEFAULT_CURRENCY: &str = "CHF";

/// Date layout accepted by the string setters.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Work-in-progress transaction plus the first error met so far.
///
/// * Once an error is pending every setter is a no-op; `build()` returns it.
/// * String setters record a [`TransactionError::Parse`] instead of failing,
///   so a chain never has to stop halfway.
/// * `clone()` before branching a chain; a builder is single-owner.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    draft: Transaction,
    date: Option<NaiveDate>,
    value_date: Option<NaiveDate>,
    direction: Option<Direction>,
    debit_flag: Option<bool>,
    err: Option<TransactionError>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    /// Fresh builder: generated id, default currency, sentinel category,
    /// every amount zero.
    pub fn new() -> Self {
        Self {
            draft: Transaction {
                id: Uuid::new_v4().to_string(),
                bookkeeping_number: String::new(),
                status: String::new(),
                date: NaiveDate::MIN,
                value_date: NaiveDate::MIN,
                name: String::new(),
                description: String::new(),
                remittance_info: String::new(),
                party_name: String::new(),
                party_iban: String::new(),
                amount: Decimal::ZERO,
                direction: Direction::Unknown,
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
                currency: DEFAULT_CURRENCY.to_string(),
                amount_excl_tax: Decimal::ZERO,
                amount_tax: Decimal::ZERO,
                tax_rate: Decimal::ZERO,
                recipient: String::new(),
                investment: String::new(),
                number: String::new(),
                category: UNCATEGORIZED.to_string(),
                kind: String::new(),
                fund: String::new(),
                number_of_shares: 0,
                fees: Decimal::ZERO,
                iban: String::new(),
                entry_reference: String::new(),
                reference: String::new(),
                account_servicer: String::new(),
                bank_tx_code: String::new(),
                original_currency: String::new(),
                original_amount: Decimal::ZERO,
                exchange_rate: Decimal::ZERO,
                payer: Party::default(),
                payee: Party::default(),
            },
            date: None,
            value_date: None,
            direction: None,
            debit_flag: None,
            err: None,
        }
    }

    /// Throw everything away and start over.
    pub fn reset(self) -> Self {
        Self::new()
    }

    /// The pending error, if any.
    pub fn error(&self) -> Option<&TransactionError> {
        self.err.as_ref()
    }

    // ------------------------------------------------------------- plumbing

    fn edit(mut self, f: impl FnOnce(&mut Self)) -> Self {
        if self.err.is_none() {
            f(&mut self);
        }
        self
    }

    fn fail(mut self, err: TransactionError) -> Self {
        if self.err.is_none() {
            self.err = Some(err);
        }
        self
    }

    fn with_parsed<T, E>(self, parsed: Result<T, E>, apply: impl FnOnce(Self, T) -> Self) -> Self
    where
        E: Into<TransactionError>,
    {
        if self.err.is_some() {
            return self;
        }
        match parsed {
            Ok(value) => apply(self, value),
            Err(e) => self.fail(e.into()),
        }
    }

    // ------------------------------------------------------------ identity

    /// Override the generated id; needed for reproducible output.
    pub fn id(self, id: impl Into<String>) -> Self {
        self.edit(|b| b.draft.id = id.into())
    }

    pub fn bookkeeping_number(self, number: impl Into<String>) -> Self {
        self.edit(|b| b.draft.bookkeeping_number = number.into())
    }

    pub fn status(self, status: impl Into<String>) -> Self {
        self.edit(|b| b.draft.status = status.into())
    }

    pub fn number(self, number: impl Into<String>) -> Self {
        self.edit(|b| b.draft.number = number.into())
    }

    // --------------------------------------------------------------- dates

    pub fn date(self, date: NaiveDate) -> Self {
        self.edit(|b| b.date = Some(date))
    }

    /// `YYYY-MM-DD`.
    pub fn date_str(self, raw: &str) -> Self {
        self.with_parsed(parse_input_date("date", raw), Self::date)
    }

    pub fn value_date(self, date: NaiveDate) -> Self {
        self.edit(|b| b.value_date = Some(date))
    }

    /// `YYYY-MM-DD`.
    pub fn value_date_str(self, raw: &str) -> Self {
        self.with_parsed(parse_input_date("value date", raw), Self::value_date)
    }

    // -------------------------------------------------------------- amounts

    /// Signed amount: negative means money left the account.
    pub fn amount(self, amount: Decimal, currency: impl Into<String>) -> Self {
        self.edit(|b| {
            b.draft.amount = amount;
            b.draft.currency = currency.into();
        })
    }

    pub fn money(self, money: &Money) -> Self {
        self.amount(money.amount(), money.currency())
    }

    pub fn amount_str(self, raw: &str, currency: &str) -> Self {
        self.with_parsed(Money::parse(raw, currency), |b, m| b.money(&m))
    }

    /// Lossy; only for sources that already hand out floats.
    pub fn amount_f64(self, amount: f64, currency: &str) -> Self {
        self.with_parsed(Money::from_f64(amount, currency), |b, m| b.money(&m))
    }

    pub fn currency(self, currency: impl Into<String>) -> Self {
        self.edit(|b| b.draft.currency = currency.into())
    }

    /// Outgoing amount from a split-column source. Used for `amount`
    /// (as `-|debit|`) when no amount is set.
    pub fn debit_amount(self, debit: Decimal) -> Self {
        self.edit(|b| b.draft.debit = debit)
    }

    /// Incoming amount from a split-column source. Used for `amount`
    /// (as `+|credit|`) when neither amount nor debit is set.
    pub fn credit_amount(self, credit: Decimal) -> Self {
        self.edit(|b| b.draft.credit = credit)
    }

    pub fn original_amount(self, original: &Money, exchange_rate: Decimal) -> Self {
        self.edit(|b| {
            b.draft.original_amount = original.amount();
            b.draft.original_currency = original.currency().to_string();
            b.draft.exchange_rate = exchange_rate;
        })
    }

    pub fn tax(self, amount_excl_tax: Decimal, amount_tax: Decimal, tax_rate: Decimal) -> Self {
        self.edit(|b| {
            b.draft.amount_excl_tax = amount_excl_tax;
            b.draft.amount_tax = amount_tax;
            b.draft.tax_rate = tax_rate;
        })
    }

    pub fn fees(self, fees: Decimal) -> Self {
        self.edit(|b| b.draft.fees = fees)
    }

    pub fn number_of_shares(self, shares: i64) -> Self {
        self.edit(|b| b.draft.number_of_shares = shares)
    }

    // ------------------------------------------------------------ direction

    pub fn direction(self, direction: Direction) -> Self {
        self.edit(|b| b.direction = Some(direction))
    }

    /// `DBIT` / `CRDT`; anything else leaves the direction open.
    pub fn credit_debit_code(self, code: &str) -> Self {
        self.direction(Direction::from_code(code))
    }

    /// Boolean debit/credit signal; loses to an explicit direction.
    pub fn debit_flag(self, is_debit: bool) -> Self {
        self.edit(|b| b.debit_flag = Some(is_debit))
    }

    // -------------------------------------------------------------- parties

    pub fn payer(self, name: impl Into<String>, account_identifier: impl Into<String>) -> Self {
        self.edit(|b| b.draft.payer = Party::new(name, account_identifier))
    }

    pub fn payee(self, name: impl Into<String>, account_identifier: impl Into<String>) -> Self {
        self.edit(|b| b.draft.payee = Party::new(name, account_identifier))
    }

    /// Display name; derived from the counterparty when left empty.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.edit(|b| b.draft.name = name.into())
    }

    pub fn party_name(self, name: impl Into<String>) -> Self {
        self.edit(|b| b.draft.party_name = name.into())
    }

    pub fn party_iban(self, iban: impl Into<String>) -> Self {
        self.edit(|b| b.draft.party_iban = iban.into())
    }

    pub fn recipient(self, recipient: impl Into<String>) -> Self {
        self.edit(|b| b.draft.recipient = recipient.into())
    }

    /// The account holder's own account.
    pub fn iban(self, iban: impl Into<String>) -> Self {
        self.edit(|b| b.draft.iban = iban.into())
    }

    // ----------------------------------------------------------------- text

    pub fn description(self, description: impl Into<String>) -> Self {
        self.edit(|b| b.draft.description = description.into())
    }

    pub fn remittance_info(self, info: impl Into<String>) -> Self {
        self.edit(|b| b.draft.remittance_info = info.into())
    }

    pub fn entry_reference(self, reference: impl Into<String>) -> Self {
        self.edit(|b| b.draft.entry_reference = reference.into())
    }

    pub fn reference(self, reference: impl Into<String>) -> Self {
        self.edit(|b| b.draft.reference = reference.into())
    }

    pub fn account_servicer(self, servicer: impl Into<String>) -> Self {
        self.edit(|b| b.draft.account_servicer = servicer.into())
    }

    pub fn bank_tx_code(self, code: impl Into<String>) -> Self {
        self.edit(|b| b.draft.bank_tx_code = code.into())
    }

    // ------------------------------------------------------- categorization

    pub fn category(self, category: impl Into<String>) -> Self {
        self.edit(|b| b.draft.category = category.into())
    }

    /// Legacy "type" column; also seeds `investment` when that stays empty.
    pub fn kind(self, kind: impl Into<String>) -> Self {
        self.edit(|b| b.draft.kind = kind.into())
    }

    pub fn fund(self, fund: impl Into<String>) -> Self {
        self.edit(|b| b.draft.fund = fund.into())
    }

    pub fn investment(self, investment: impl Into<String>) -> Self {
        self.edit(|b| b.draft.investment = investment.into())
    }

    // ---------------------------------------------------------------- build

    /// Validate, then run the derivation pipeline on a copy of the draft.
    ///
    /// Leaves the builder untouched, so equal states build equal records.
    pub fn build(&self) -> Result<Transaction, TransactionError> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }

        let date = self
            .date
            .ok_or_else(|| TransactionError::validation("date is required"))?;
        let mut tx = self.draft.clone();
        require_amount_and_currency(tx.amount, tx.debit, tx.credit, &tx.currency)?;

        tx.amount = amount_from_split(tx.amount, tx.debit, tx.credit);
        tx.date = date;
        tx.value_date = self.value_date.unwrap_or(date);
        tx.direction = Direction::resolve(self.direction, self.debit_flag, tx.amount);
        tx.refresh_derived_fields();
        Ok(tx)
    }
}

fn parse_input_date(field: &str, raw: &str) -> Result<NaiveDate, TransactionError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, INPUT_DATE_FORMAT).map_err(|e| {
        TransactionError::parse(format!("{field} '{trimmed}' is not YYYY-MM-DD: {e}"))
    })
}
