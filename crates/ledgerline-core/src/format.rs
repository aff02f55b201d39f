//! Ledger text formatter.
//!
//! Writes directives back out in the syntax the parser accepts, with
//! configurable amount alignment for postings. Formatting a parsed directive
//! and parsing the output again yields the same field values.

use crate::{
    Amount, Balance, Close, Directive, Document, Event, LedgerOption, Note, Open, Pad, Posting,
    Price, Transaction,
};
use std::fmt::{self, Write};

/// Formatter configuration.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Column to align posting amounts to (default: 60).
    pub amount_column: usize,
    /// Indentation for postings.
    pub indent: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            amount_column: 60,
            indent: "  ".to_string(),
        }
    }
}

impl FormatConfig {
    /// Create a new config with the specified amount column.
    #[must_use]
    pub fn with_column(column: usize) -> Self {
        Self {
            amount_column: column,
            ..Default::default()
        }
    }

    /// Create a new config with both column and indent settings.
    #[must_use]
    pub fn new(column: usize, indent_width: usize) -> Self {
        Self {
            amount_column: column,
            indent: " ".repeat(indent_width),
        }
    }
}

/// Format a directive to a string, terminated by a newline.
pub fn format_directive(directive: &Directive, config: &FormatConfig) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_directive(&mut out, directive, config);
    out
}

/// Write a directive to any formatter sink.
pub fn write_directive<W: Write>(
    out: &mut W,
    directive: &Directive,
    config: &FormatConfig,
) -> fmt::Result {
    match directive {
        Directive::Transaction(txn) => write_transaction(out, txn, config),
        Directive::Open(open) => write_open(out, open),
        Directive::Close(close) => write_close(out, close),
        Directive::Pad(pad) => write_pad(out, pad),
        Directive::Balance(bal) => write_balance(out, bal),
        Directive::Price(price) => write_price(out, price),
        Directive::Event(event) => write_event(out, event),
        Directive::Note(note) => write_note(out, note),
        Directive::Document(doc) => write_document(out, doc),
        Directive::Option(option) => write_option(out, option),
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_directive(f, self, &FormatConfig::default())
    }
}

fn write_transaction<W: Write>(
    out: &mut W,
    txn: &Transaction,
    config: &FormatConfig,
) -> fmt::Result {
    write!(out, "{} {}", txn.date, txn.flag)?;
    if let Some(payee) = &txn.payee {
        write!(out, " \"{}\" |", escape_string(payee))?;
    }
    write!(out, " \"{}\"", escape_string(&txn.narration))?;
    for tag in &txn.tags {
        write!(out, " #{tag}")?;
    }
    for link in &txn.links {
        write!(out, " ^{link}")?;
    }
    out.write_char('\n')?;

    for posting in &txn.postings {
        out.write_str(&format_posting(posting, config))?;
        out.write_char('\n')?;
    }
    Ok(())
}

/// Format a posting line (without the trailing newline), aligning the number
/// of the units at the configured column.
pub fn format_posting(posting: &Posting, config: &FormatConfig) -> String {
    let mut line = String::new();
    line.push_str(&config.indent);

    if let Some(flag) = posting.flag {
        line.push(flag);
        line.push(' ');
    }
    line.push_str(&posting.account);

    if let Some(position) = &posting.position {
        let units = position.units.to_string();
        let target_col = config.amount_column.saturating_sub(units.len());
        let current_len = line.chars().count();
        if current_len + 2 <= target_col {
            line.push_str(&" ".repeat(target_col - current_len));
        } else {
            line.push_str("  ");
        }
        line.push_str(&position.to_string());

        if let Some(price) = &posting.price {
            let marker = if posting.price_is_total { "@@" } else { "@" };
            line.push(' ');
            line.push_str(marker);
            line.push(' ');
            line.push_str(&format_amount(price));
        }
    }

    line
}

fn format_amount(amount: &Amount) -> String {
    format!("{} {}", amount.number, amount.currency)
}

fn write_open<W: Write>(out: &mut W, open: &Open) -> fmt::Result {
    write!(out, "{} open {}", open.date, open.account)?;
    if !open.currencies.is_empty() {
        write!(out, " {}", open.currencies.join(","))?;
    }
    out.write_char('\n')
}

fn write_close<W: Write>(out: &mut W, close: &Close) -> fmt::Result {
    writeln!(out, "{} close {}", close.date, close.account)
}

fn write_pad<W: Write>(out: &mut W, pad: &Pad) -> fmt::Result {
    writeln!(out, "{} pad {} {}", pad.date, pad.account, pad.source_account)
}

fn write_balance<W: Write>(out: &mut W, bal: &Balance) -> fmt::Result {
    writeln!(
        out,
        "{} check {} {}",
        bal.date,
        bal.account,
        format_amount(&bal.amount)
    )
}

fn write_price<W: Write>(out: &mut W, price: &Price) -> fmt::Result {
    writeln!(
        out,
        "{} price {} {}",
        price.date,
        price.currency,
        format_amount(&price.amount)
    )
}

fn write_event<W: Write>(out: &mut W, event: &Event) -> fmt::Result {
    writeln!(
        out,
        "{} event \"{}\" \"{}\"",
        event.date,
        escape_string(&event.event_type),
        escape_string(&event.description)
    )
}

fn write_note<W: Write>(out: &mut W, note: &Note) -> fmt::Result {
    writeln!(
        out,
        "{} note {} \"{}\"",
        note.date,
        note.account,
        escape_string(&note.comment)
    )
}

fn write_document<W: Write>(out: &mut W, doc: &Document) -> fmt::Result {
    writeln!(
        out,
        "{} document {} \"{}\"",
        doc.date,
        doc.account,
        escape_string(&doc.filename)
    )
}

fn write_option<W: Write>(out: &mut W, option: &LedgerOption) -> fmt::Result {
    writeln!(
        out,
        "option \"{}\" \"{}\"",
        escape_string(&option.key),
        escape_string(&option.value)
    )
}

/// Escape a string for output, the inverse of the lexer's unescaping.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
