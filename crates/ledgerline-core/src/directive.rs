//! Directive types for every statement the ledger grammar accepts.
//!
//! - [`Transaction`] - Transfers between accounts, made of [`Posting`]s
//! - [`Open`] - Open an account, optionally restricted to some currencies
//! - [`Close`] - Close an account
//! - [`Pad`] - Pad an account from a source account
//! - [`Balance`] - Assert an account balance (`check`)
//! - [`Price`] - Record a price point for a commodity
//! - [`Event`] - Record a named event value
//! - [`Note`] - Attach a comment to an account
//! - [`Document`] - Attach a document path to an account
//! - [`LedgerOption`] - An `option` key/value pair (the only undated directive)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, Position};

/// Where a directive came from: file name and first line of the statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Name of the parsed file, or `<string>` for in-memory sources.
    pub filename: String,
    /// 1-based line the statement starts on.
    pub lineno: u32,
}

impl SourceLocation {
    /// Create a location.
    #[must_use]
    pub fn new(filename: impl Into<String>, lineno: u32) -> Self {
        Self {
            filename: filename.into(),
            lineno,
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new("<string>", 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.lineno)
    }
}

/// One account movement line inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Per-posting flag override.
    pub flag: Option<char>,
    /// Account name.
    pub account: String,
    /// Units and optional lot cost. `None` for an auto-balanced posting.
    pub position: Option<Position>,
    /// Price annotation (`@` or `@@`).
    pub price: Option<Amount>,
    /// `true` for a total price (`@@`), `false` for a per-unit price (`@`).
    /// Only meaningful when `price` is set.
    pub price_is_total: bool,
}

impl Posting {
    /// Create a posting with a position.
    #[must_use]
    pub fn new(account: impl Into<String>, position: Position) -> Self {
        Self {
            flag: None,
            account: account.into(),
            position: Some(position),
            price: None,
            price_is_total: false,
        }
    }

    /// Create a posting without a position.
    #[must_use]
    pub fn auto(account: impl Into<String>) -> Self {
        Self {
            flag: None,
            account: account.into(),
            position: None,
            price: None,
            price_is_total: false,
        }
    }

    /// Set the posting flag.
    #[must_use]
    pub const fn with_flag(mut self, flag: char) -> Self {
        self.flag = Some(flag);
        self
    }

    /// Set a per-unit price (`@`).
    #[must_use]
    pub fn with_unit_price(mut self, price: Amount) -> Self {
        self.price = Some(price);
        self.price_is_total = false;
        self
    }

    /// Set a total price (`@@`).
    #[must_use]
    pub fn with_total_price(mut self, price: Amount) -> Self {
        self.price = Some(price);
        self.price_is_total = true;
        self
    }
}

/// A transaction directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date
    pub date: NaiveDate,
    /// Transaction flag (`*` for `txn`)
    pub flag: char,
    /// Payee, present only in the two-string header form
    pub payee: Option<String>,
    /// Narration (description)
    pub narration: String,
    /// Tags, statement tags first, then tags pushed by `pushtag`
    pub tags: Vec<String>,
    /// Links attached to this transaction
    pub links: Vec<String>,
    /// Postings in source order
    pub postings: Vec<Posting>,
    /// Where the transaction was written
    pub location: SourceLocation,
}

impl Transaction {
    /// Create a new transaction.
    #[must_use]
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Self {
            date,
            flag: '*',
            payee: None,
            narration: narration.into(),
            tags: Vec::new(),
            links: Vec::new(),
            postings: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    /// Set the flag.
    #[must_use]
    pub const fn with_flag(mut self, flag: char) -> Self {
        self.flag = flag;
        self
    }

    /// Set the payee.
    #[must_use]
    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }

    /// Add a posting.
    #[must_use]
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }
}

/// Open an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Open {
    /// Date the account opens
    pub date: NaiveDate,
    /// Account name
    pub account: String,
    /// Allowed currencies, empty when unrestricted
    pub currencies: Vec<String>,
    /// Where the directive was written
    pub location: SourceLocation,
}

impl Open {
    /// Create an open directive with no currency constraint.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            currencies: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    /// Set the allowed currencies.
    #[must_use]
    pub fn with_currencies(mut self, currencies: Vec<String>) -> Self {
        self.currencies = currencies;
        self
    }
}

/// Close an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Close {
    /// Date the account closes
    pub date: NaiveDate,
    /// Account name
    pub account: String,
    /// Where the directive was written
    pub location: SourceLocation,
}

impl Close {
    /// Create a close directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            location: SourceLocation::default(),
        }
    }
}

/// Pad `account` from `source_account` up to the next balance assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad date
    pub date: NaiveDate,
    /// Account to pad
    pub account: String,
    /// Account the padding is drawn from
    pub source_account: String,
    /// Where the directive was written
    pub location: SourceLocation,
}

impl Pad {
    /// Create a pad directive.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        account: impl Into<String>,
        source_account: impl Into<String>,
    ) -> Self {
        Self {
            date,
            account: account.into(),
            source_account: source_account.into(),
            location: SourceLocation::default(),
        }
    }
}

/// A balance assertion, written with the `check` keyword.
///
/// The assertion is only recorded here; checking it is left to later stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Assertion date
    pub date: NaiveDate,
    /// Account to check
    pub account: String,
    /// Expected amount
    pub amount: Amount,
    /// Where the directive was written
    pub location: SourceLocation,
}

impl Balance {
    /// Create a balance assertion.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            account: account.into(),
            amount,
            location: SourceLocation::default(),
        }
    }
}

/// A price point for a commodity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Price date
    pub date: NaiveDate,
    /// Commodity being priced
    pub currency: String,
    /// Price of one unit
    pub amount: Amount,
    /// Where the directive was written
    pub location: SourceLocation,
}

impl Price {
    /// Create a price directive.
    #[must_use]
    pub fn new(date: NaiveDate, currency: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            currency: currency.into(),
            amount,
            location: SourceLocation::default(),
        }
    }
}

/// A named event value, such as a location or employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event date
    pub date: NaiveDate,
    /// Event type
    pub event_type: String,
    /// Event description
    pub description: String,
    /// Where the directive was written
    pub location: SourceLocation,
}

impl Event {
    /// Create an event directive.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        event_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            event_type: event_type.into(),
            description: description.into(),
            location: SourceLocation::default(),
        }
    }
}

/// A comment attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note date
    pub date: NaiveDate,
    /// Account the note is about
    pub account: String,
    /// Note text
    pub comment: String,
    /// Where the directive was written
    pub location: SourceLocation,
}

impl Note {
    /// Create a note directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            comment: comment.into(),
            location: SourceLocation::default(),
        }
    }
}

/// A document linked to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document date
    pub date: NaiveDate,
    /// Account the document belongs to
    pub account: String,
    /// Path of the document, as written
    pub filename: String,
    /// Where the directive was written
    pub location: SourceLocation,
}

impl Document {
    /// Create a document directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            filename: filename.into(),
            location: SourceLocation::default(),
        }
    }
}

/// An `option "key" "value"` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerOption {
    /// Option name
    pub key: String,
    /// Option value, uninterpreted
    pub value: String,
    /// Where the option was written
    pub location: SourceLocation,
}

impl LedgerOption {
    /// Create an option directive.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            location: SourceLocation::default(),
        }
    }
}

/// One parsed top-level statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Directive {
    /// Transaction
    Transaction(Transaction),
    /// Account open
    Open(Open),
    /// Account close
    Close(Close),
    /// Pad
    Pad(Pad),
    /// Balance assertion
    Balance(Balance),
    /// Price point
    Price(Price),
    /// Event
    Event(Event),
    /// Note
    Note(Note),
    /// Document
    Document(Document),
    /// Option
    Option(LedgerOption),
}

impl Directive {
    /// Get the date of this directive. Options are undated.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Transaction(t) => Some(t.date),
            Self::Open(o) => Some(o.date),
            Self::Close(c) => Some(c.date),
            Self::Pad(p) => Some(p.date),
            Self::Balance(b) => Some(b.date),
            Self::Price(p) => Some(p.date),
            Self::Event(e) => Some(e.date),
            Self::Note(n) => Some(n.date),
            Self::Document(d) => Some(d.date),
            Self::Option(_) => None,
        }
    }

    /// Get the provenance of this directive.
    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        match self {
            Self::Transaction(t) => &t.location,
            Self::Open(o) => &o.location,
            Self::Close(c) => &c.location,
            Self::Pad(p) => &p.location,
            Self::Balance(b) => &b.location,
            Self::Price(p) => &p.location,
            Self::Event(e) => &e.location,
            Self::Note(n) => &n.location,
            Self::Document(d) => &d.location,
            Self::Option(o) => &o.location,
        }
    }

    /// Replace the provenance of this directive.
    pub fn set_location(&mut self, location: SourceLocation) {
        let slot = match self {
            Self::Transaction(t) => &mut t.location,
            Self::Open(o) => &mut o.location,
            Self::Close(c) => &mut c.location,
            Self::Pad(p) => &mut p.location,
            Self::Balance(b) => &mut b.location,
            Self::Price(p) => &mut p.location,
            Self::Event(e) => &mut e.location,
            Self::Note(n) => &mut n.location,
            Self::Document(d) => &mut d.location,
            Self::Option(o) => &mut o.location,
        };
        *slot = location;
    }

    /// Get the directive type name, as used in ledger text.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "transaction",
            Self::Open(_) => "open",
            Self::Close(_) => "close",
            Self::Pad(_) => "pad",
            Self::Balance(_) => "check",
            Self::Price(_) => "price",
            Self::Event(_) => "event",
            Self::Note(_) => "note",
            Self::Document(_) => "document",
            Self::Option(_) => "option",
        }
    }

    /// Check if this is a transaction.
    #[must_use]
    pub const fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }

    /// Get the transaction, if this is one.
    #[must_use]
    pub const fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_transaction_builders() {
        let txn = Transaction::new(date(2024, 1, 15), "Grocery shopping")
            .with_payee("Whole Foods")
            .with_flag('!')
            .with_tag("food")
            .with_link("receipt-1")
            .with_posting(Posting::new(
                "Expenses:Food",
                Position::simple(Amount::new(dec!(50.00), "USD")),
            ))
            .with_posting(Posting::auto("Assets:Checking"));

        assert_eq!(txn.flag, '!');
        assert_eq!(txn.payee.as_deref(), Some("Whole Foods"));
        assert_eq!(txn.tags, vec!["food"]);
        assert_eq!(txn.links, vec!["receipt-1"]);
        assert_eq!(txn.postings.len(), 2);
        assert!(txn.postings[1].position.is_none());
    }

    #[test]
    fn test_posting_price_styles() {
        let units = Position::simple(Amount::new(dec!(10), "USD"));
        let per_unit = Posting::new("Assets:Cash", units.clone())
            .with_unit_price(Amount::new(dec!(1.2), "EUR"));
        assert!(!per_unit.price_is_total);

        let total =
            Posting::new("Assets:Cash", units).with_total_price(Amount::new(dec!(12), "EUR"));
        assert!(total.price_is_total);
        assert_eq!(total.price.unwrap().number, dec!(12));
    }

    #[test]
    fn test_directive_accessors() {
        let open = Directive::Open(Open::new(date(2024, 1, 1), "Assets:Cash"));
        assert_eq!(open.date(), Some(date(2024, 1, 1)));
        assert_eq!(open.type_name(), "open");
        assert!(!open.is_transaction());

        let option = Directive::Option(LedgerOption::new("title", "Books"));
        assert_eq!(option.date(), None);
        assert_eq!(option.type_name(), "option");
    }

    #[test]
    fn test_set_location() {
        let mut directive = Directive::Close(Close::new(date(2024, 6, 30), "Assets:Old"));
        assert_eq!(directive.location(), &SourceLocation::default());

        directive.set_location(SourceLocation::new("main.ledger", 12));
        assert_eq!(directive.location().to_string(), "main.ledger:12");
    }

    #[test]
    fn test_balance_is_written_as_check() {
        let balance = Directive::Balance(Balance::new(
            date(2024, 2, 1),
            "Assets:Bank",
            Amount::new(dec!(100), "USD"),
        ));
        assert_eq!(balance.type_name(), "check");
    }
}
