//! Ledger parser with statement-level error recovery.
//!
//! This crate turns ledger text into a sequence of [`Directive`]s. A token
//! source feeds a hand-written grammar engine, which hands every completed
//! production to a [`DirectiveBuilder`] and every error to an
//! [`ErrorReporter`]. A malformed statement is reported once and skipped;
//! parsing resumes at the next line that starts a statement.
//!
//! # Features
//!
//! - Transactions with payee, narration, tags, links and postings
//! - Lot costs, per-unit (`@`) and total (`@@`) prices
//! - `open`, `close`, `pad`, `check`, `price`, `event`, `note`, `document`
//!   and `option` directives
//! - `pushtag` / `poptag` scoping
//! - Line/column spans on every directive and error
//!
//! # Example
//!
//! ```
//! use ledgerline_parser::parse;
//!
//! let source = r#"
//! 2024-01-15 * "Coffee Shop" "Morning coffee"
//!   Expenses:Food:Coffee  5.00 USD
//!   Assets:Cash
//! "#;
//!
//! let result = parse(source);
//! assert!(result.is_success());
//! assert!(result.errors.is_empty());
//! assert_eq!(result.directives.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod context;
mod engine;
mod error;
mod grammar;
pub mod lexer;
mod span;
mod token;

pub use builder::{parse_date, BuildError, DirectiveBuilder, LedgerBuilder, PostingParts, TransactionParts};
pub use context::TagContext;
pub use engine::{EngineState, ParseOptions, ParseOutput, Parser, Recovery, DEFAULT_MAX_DEPTH};
pub use error::{ErrorReporter, ParseError, ParseErrorKind, MAX_EXPECTED};
pub use lexer::Lexer;
pub use span::{SourceSpan, Spanned};
pub use token::{Token, TokenKind, TokenSource, TokenStream, TokenValue};

use ledgerline_core::Directive;

/// Result of parsing ledger text.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Accepted directives, in source order.
    pub directives: Vec<Spanned<Directive>>,
    /// Errors in the order they were found.
    pub errors: Vec<ParseError>,
    /// Final engine state.
    pub state: EngineState,
}

impl ParseResult {
    /// Whether the parse reached end of input. Recovered errors do not
    /// prevent success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == EngineState::Accepted
    }

    /// Whether any error was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The `option` directives as key/value pairs, in source order.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.directives.iter().filter_map(|d| match &d.value {
            Directive::Option(opt) => Some((opt.key.as_str(), opt.value.as_str())),
            _ => None,
        })
    }
}

/// Parse ledger source text with default options.
///
/// # Arguments
///
/// * `source` - The ledger text to parse
///
/// # Returns
///
/// A `ParseResult` with the directives, the errors and the final state.
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, ParseOptions::default())
}

/// Parse ledger source text with explicit options, using the reference
/// [`Lexer`] and the standard [`LedgerBuilder`].
pub fn parse_with_options(source: &str, options: ParseOptions) -> ParseResult {
    let mut builder = LedgerBuilder;
    let mut tags = TagContext::new();
    let mut errors = Vec::new();
    let output = parse_tokens(
        Lexer::new(source),
        &mut builder,
        &mut tags,
        &mut errors,
        options,
    );
    ParseResult {
        directives: output.directives,
        errors,
        state: output.state,
    }
}

/// Parse from any token source into any builder, reporting to any reporter.
///
/// The tag context is borrowed so callers can inspect tags still pushed when
/// the parse ends.
pub fn parse_tokens<S, B, R>(
    tokens: S,
    builder: &mut B,
    tags: &mut TagContext,
    reporter: &mut R,
    options: ParseOptions,
) -> ParseOutput
where
    S: TokenSource,
    B: DirectiveBuilder + ?Sized,
    R: ErrorReporter + ?Sized,
{
    Parser::new(tokens, builder, tags, reporter, options).run()
}
