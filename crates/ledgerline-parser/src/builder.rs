//! Construction of directive values from parsed parts.
//!
//! The grammar engine calls a [`DirectiveBuilder`] each time it completes a
//! production that yields a value. Every method has a default implementation
//! producing the standard [`ledgerline_core`] types, so [`LedgerBuilder`] is
//! just the trait with nothing overridden. A custom builder can override a
//! step to normalize values or to reject them: an `Err` discards the statement
//! being parsed, is reported once, and parsing resumes at the next statement.

use chrono::NaiveDate;
use ledgerline_core::{
    Amount, Balance, Close, Document, Event, LedgerOption, LotCost, Note, Open, Pad, Position,
    Posting, Price, SourceLocation, Transaction,
};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::TagContext;

/// Why a builder refused to construct a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The date text does not name a calendar day.
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    /// A custom builder rejected the value.
    #[error("{0}")]
    Rejected(String),
}

/// Everything a posting line provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingParts {
    /// Posting flag, if written.
    pub flag: Option<char>,
    /// Account name.
    pub account: String,
    /// Units and cost, if written.
    pub position: Option<Position>,
    /// Price annotation, if written.
    pub price: Option<Amount>,
    /// `@@` rather than `@`.
    pub price_is_total: bool,
}

/// Everything a transaction statement provides.
///
/// Lists that were not written at all are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionParts {
    /// Transaction date.
    pub date: NaiveDate,
    /// Flag character; `txn` arrives as `*`.
    pub flag: char,
    /// Payee, from the two-string header form.
    pub payee: Option<String>,
    /// Narration.
    pub narration: String,
    /// Tags written on the header line.
    pub tags: Option<Vec<String>>,
    /// Links written on the header line.
    pub links: Option<Vec<String>>,
    /// Postings in source order.
    pub postings: Option<Vec<Posting>>,
}

/// Materializes parsed parts into directive values.
pub trait DirectiveBuilder {
    /// Convert DATE token text (`YYYY-MM-DD` or `YYYY/MM/DD`) into a date.
    fn date(&mut self, text: &str) -> Result<NaiveDate, BuildError> {
        parse_date(text)
    }

    /// Build an amount.
    fn amount(&mut self, number: Decimal, currency: String) -> Result<Amount, BuildError> {
        Ok(Amount::new(number, currency))
    }

    /// Build a lot cost.
    fn lot_cost(&mut self, cost: Amount, date: Option<NaiveDate>) -> Result<LotCost, BuildError> {
        Ok(LotCost { cost, date })
    }

    /// Build a position.
    fn position(&mut self, units: Amount, cost: Option<LotCost>) -> Result<Position, BuildError> {
        Ok(Position { units, cost })
    }

    /// Build a posting.
    fn posting(&mut self, parts: PostingParts) -> Result<Posting, BuildError> {
        Ok(Posting {
            flag: parts.flag,
            account: parts.account,
            position: parts.position,
            price: parts.price,
            price_is_total: parts.price_is_total,
        })
    }

    /// Build a transaction. `active` holds the tags pushed by `pushtag`.
    ///
    /// The default appends each active tag that the header did not already
    /// name, after the header's own tags.
    fn transaction(
        &mut self,
        location: SourceLocation,
        parts: TransactionParts,
        active: &TagContext,
    ) -> Result<Transaction, BuildError> {
        let mut tags = parts.tags.unwrap_or_default();
        for tag in active.snapshot() {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(Transaction {
            date: parts.date,
            flag: parts.flag,
            payee: parts.payee,
            narration: parts.narration,
            tags,
            links: parts.links.unwrap_or_default(),
            postings: parts.postings.unwrap_or_default(),
            location,
        })
    }

    /// Build an open directive.
    fn open(
        &mut self,
        location: SourceLocation,
        date: NaiveDate,
        account: String,
        currencies: Option<Vec<String>>,
    ) -> Result<Open, BuildError> {
        Ok(Open {
            date,
            account,
            currencies: currencies.unwrap_or_default(),
            location,
        })
    }

    /// Build a close directive.
    fn close(
        &mut self,
        location: SourceLocation,
        date: NaiveDate,
        account: String,
    ) -> Result<Close, BuildError> {
        Ok(Close {
            date,
            account,
            location,
        })
    }

    /// Build a pad directive.
    fn pad(
        &mut self,
        location: SourceLocation,
        date: NaiveDate,
        account: String,
        source_account: String,
    ) -> Result<Pad, BuildError> {
        Ok(Pad {
            date,
            account,
            source_account,
            location,
        })
    }

    /// Build a balance assertion.
    fn balance(
        &mut self,
        location: SourceLocation,
        date: NaiveDate,
        account: String,
        amount: Amount,
    ) -> Result<Balance, BuildError> {
        Ok(Balance {
            date,
            account,
            amount,
            location,
        })
    }

    /// Build a price directive.
    fn price(
        &mut self,
        location: SourceLocation,
        date: NaiveDate,
        currency: String,
        amount: Amount,
    ) -> Result<Price, BuildError> {
        Ok(Price {
            date,
            currency,
            amount,
            location,
        })
    }

    /// Build an event directive.
    fn event(
        &mut self,
        location: SourceLocation,
        date: NaiveDate,
        event_type: String,
        description: String,
    ) -> Result<Event, BuildError> {
        Ok(Event {
            date,
            event_type,
            description,
            location,
        })
    }

    /// Build a note directive.
    fn note(
        &mut self,
        location: SourceLocation,
        date: NaiveDate,
        account: String,
        comment: String,
    ) -> Result<Note, BuildError> {
        Ok(Note {
            date,
            account,
            comment,
            location,
        })
    }

    /// Build a document directive.
    fn document(
        &mut self,
        location: SourceLocation,
        date: NaiveDate,
        account: String,
        filename: String,
    ) -> Result<Document, BuildError> {
        Ok(Document {
            date,
            account,
            filename,
            location,
        })
    }

    /// Build an option directive.
    fn option(
        &mut self,
        location: SourceLocation,
        key: String,
        value: String,
    ) -> Result<LedgerOption, BuildError> {
        Ok(LedgerOption {
            key,
            value,
            location,
        })
    }
}

/// The standard builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerBuilder;

impl DirectiveBuilder for LedgerBuilder {}

/// Parse `YYYY-MM-DD` or `YYYY/MM/DD` into a calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, BuildError> {
    let invalid = || BuildError::InvalidDate(text.to_string());
    let mut parts = text.split(['-', '/']);
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}
