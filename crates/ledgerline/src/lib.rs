//! Command-line tools for ledger files.
//!
//! - `ledgerline-check`: parse a file, report syntax errors, optionally
//!   pretty-print the accepted directives
//!
//! # Example Usage
//!
//! ```bash
//! ledgerline-check books.ledger
//! ledgerline-check --format json books.ledger
//! ledgerline-check --print books.ledger > formatted.ledger
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
