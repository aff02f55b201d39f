//! Core types for ledgerline.
//!
//! This crate provides the values the ledger parser produces:
//!
//! - [`Amount`] - A decimal number with a currency
//! - [`LotCost`] - Per-unit acquisition cost of a lot, with an optional date
//! - [`Position`] - Units with an optional lot cost
//! - [`Posting`] - One account line of a transaction
//! - [`Directive`] - All directive types (Transaction, Open, Balance, Option, ...)
//! - [`format_directive`] - Writes directives back as ledger text
//!
//! # Example
//!
//! ```
//! use ledgerline_core::{Amount, Directive, Posting, Position, Transaction};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let txn = Transaction::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), "Coffee")
//!     .with_posting(Posting::new(
//!         "Expenses:Coffee",
//!         Position::simple(Amount::new(dec!(4.50), "USD")),
//!     ))
//!     .with_posting(Posting::auto("Assets:Cash"));
//!
//! let text = Directive::Transaction(txn).to_string();
//! assert!(text.starts_with("2024-01-15 * \"Coffee\""));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod cost;
pub mod directive;
pub mod format;
pub mod position;

pub use amount::Amount;
pub use cost::LotCost;
pub use directive::{
    Balance, Close, Directive, Document, Event, LedgerOption, Note, Open, Pad, Posting, Price,
    SourceLocation, Transaction,
};
pub use format::{escape_string, format_directive, format_posting, write_directive, FormatConfig};
pub use position::Position;

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
