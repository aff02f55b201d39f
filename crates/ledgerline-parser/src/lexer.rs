//! Reference lexer for ledger text, built on Logos.
//!
//! [`RawToken`] is the Logos-generated DFA over the source. [`Lexer`] wraps it
//! as a [`TokenSource`]: it adds line/column spans, synthesizes `INDENT` for
//! indented lines, turns org-mode headings into `SKIPPED` lines, converts
//! literal values, and closes a last line that lacks a newline.

use logos::Logos;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::str::FromStr;

use crate::{SourceSpan, Token, TokenKind, TokenSource, TokenValue};

/// Tokens recognized by the Logos DFA.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t]+")] // Skip horizontal whitespace (spaces and tabs)
pub enum RawToken<'src> {
    // ===== Literals =====
    /// A date in YYYY-MM-DD or YYYY/MM/DD format.
    #[regex(r"\d{4}[-/]\d{2}[-/]\d{2}")]
    Date(&'src str),

    /// A number with optional sign, thousands separators, and decimals.
    #[regex(r"-?(\d{1,3}(,\d{3})*|\d+)(\.\d+)?")]
    Number(&'src str),

    /// A double-quoted string; the slice includes the quotes.
    #[regex(r#""([^"\\]|\\.)*""#)]
    String(&'src str),

    /// An account name like Assets:Bank:Checking.
    #[regex(r"(Assets|Liabilities|Equity|Income|Expenses)(:[A-Z][a-zA-Z0-9-]*)+")]
    Account(&'src str),

    /// A currency/commodity code of at least two characters.
    #[regex(r"[A-Z][A-Z0-9'._-]+")]
    Currency(&'src str),

    /// A tag like #tag-name.
    #[regex(r"#[a-zA-Z0-9_/.-]+")]
    Tag(&'src str),

    /// A link like ^link-name.
    #[regex(r"\^[a-zA-Z0-9_/.-]+")]
    Link(&'src str),

    // ===== Keywords =====
    /// `txn`
    #[token("txn")]
    Txn,
    /// `check`
    #[token("check")]
    Check,
    /// `open`
    #[token("open")]
    Open,
    /// `close`
    #[token("close")]
    Close,
    /// `pad`
    #[token("pad")]
    Pad,
    /// `event`
    #[token("event")]
    Event,
    /// `price`
    #[token("price")]
    Price,
    /// `note`
    #[token("note")]
    Note,
    /// `document`
    #[token("document")]
    Document,
    /// `pushtag`
    #[token("pushtag")]
    Pushtag,
    /// `poptag`
    #[token("poptag")]
    Poptag,
    /// `option`
    #[token("option")]
    Option_,

    // ===== Punctuation =====
    /// `|` between payee and narration.
    #[token("|")]
    Pipe,
    /// `@@` total price.
    #[token("@@")]
    AtAt,
    /// `@` per-unit price.
    #[token("@")]
    At,
    /// `{` opening a lot cost.
    #[token("{")]
    LBrace,
    /// `}` closing a lot cost.
    #[token("}")]
    RBrace,
    /// `,` between currencies.
    #[token(",")]
    Comma,
    /// `/` before a lot date.
    #[token("/")]
    Slash,

    // ===== Flags =====
    /// `*`, the cleared flag.
    #[token("*")]
    Star,
    /// `!`, the pending flag.
    #[token("!")]
    Pending,
    /// Other flags: P S T C U R M ? % &
    #[regex(r"[PSTCURM?%&]")]
    Flag(&'src str),

    // ===== Structural =====
    /// Line terminator.
    #[regex(r"\r?\n")]
    Newline,

    /// Comment running to the end of the line.
    #[regex(r";[^\n\r]*")]
    Comment(&'src str),
}

/// Line/column position tracker over the source.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Move forward to `offset`, counting lines and characters on the way.
    fn advance(&mut self, source: &str, offset: usize) -> (u32, u32) {
        if offset > self.offset {
            for c in source[self.offset..offset].chars() {
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
            }
            self.offset = offset;
        }
        (self.line, self.column)
    }
}

/// A [`TokenSource`] over ledger text.
///
/// # Example
///
/// ```
/// use ledgerline_parser::{Lexer, TokenKind, TokenSource};
///
/// let mut lexer = Lexer::new("2024-01-01 open Assets:Cash");
/// let kinds: Vec<_> = std::iter::from_fn(|| {
///     let token = lexer.next_token();
///     (token.kind != TokenKind::Eof).then_some(token.kind)
/// })
/// .collect();
/// assert_eq!(
///     kinds,
///     [TokenKind::Date, TokenKind::Open, TokenKind::Account, TokenKind::Eol]
/// );
/// ```
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, RawToken<'src>>,
    pending: VecDeque<Token>,
    cursor: Cursor,
    at_line_start: bool,
    line_start: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a lexer over `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: RawToken::lexer(source),
            pending: VecDeque::new(),
            cursor: Cursor::start(),
            at_line_start: true,
            line_start: 0,
            finished: false,
        }
    }

    /// Span of a byte range. Ranges must be requested in source order.
    fn span_of(&mut self, start: usize, end: usize) -> SourceSpan {
        let (first_line, first_column) = self.cursor.advance(self.source, start);
        let (last_line, last_column) = self.cursor.advance(self.source, end);
        SourceSpan::new(first_line, first_column, last_line, last_column)
    }

    /// Pull one raw token and queue the tokens it turns into.
    fn fill(&mut self) {
        let Some(result) = self.inner.next() else {
            if !self.at_line_start {
                // Close a last line that has no newline.
                let end = self.source.len();
                let span = self.span_of(end, end);
                self.pending.push_back(Token::bare(TokenKind::Eol, span));
                self.at_line_start = true;
            }
            self.finished = true;
            return;
        };
        let range = self.inner.span();

        if let Ok(RawToken::Newline) = result {
            let span = self.span_of(range.start, range.end);
            self.pending.push_back(Token::bare(TokenKind::Eol, span));
            self.at_line_start = true;
            self.line_start = range.end;
            return;
        }

        let first_on_line = self.at_line_start;
        self.at_line_start = false;

        if first_on_line && range.start == self.line_start && result == Ok(RawToken::Star) {
            self.skip_line(range.start);
            return;
        }

        // Comment-only lines stay unindented so they never look like postings.
        let is_comment = matches!(result, Ok(RawToken::Comment(_)));
        if first_on_line && range.start > self.line_start && !is_comment {
            let span = self.span_of(self.line_start, range.start);
            self.pending.push_back(Token::bare(TokenKind::Indent, span));
        }

        let span = self.span_of(range.start, range.end);
        let token = match result {
            Ok(raw) => convert(raw, span),
            Err(()) => Token::text(TokenKind::Error, self.inner.slice(), span),
        };
        self.pending.push_back(token);
    }

    /// Emit the rest of the current line, starting at `start`, as one `SKIPPED` token.
    fn skip_line(&mut self, start: usize) {
        let rest = self.inner.remainder();
        let len = rest.find(['\r', '\n']).unwrap_or(rest.len());
        self.inner.bump(len);
        let end = self.inner.span().end;
        let span = self.span_of(start, end);
        let text = &self.source[start..end];
        self.pending
            .push_back(Token::text(TokenKind::Skipped, text, span));
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Token {
        while self.pending.is_empty() && !self.finished {
            self.fill();
        }
        match self.pending.pop_front() {
            Some(token) => token,
            None => {
                let end = self.source.len();
                Token::eof(self.span_of(end, end))
            }
        }
    }
}

fn convert(raw: RawToken<'_>, span: SourceSpan) -> Token {
    match raw {
        RawToken::Date(s) => Token::text(TokenKind::Date, s, span),
        RawToken::Number(s) => match parse_number(s) {
            Some(number) => Token::new(TokenKind::Number, TokenValue::Number(number), span),
            None => Token::text(TokenKind::Error, s, span),
        },
        RawToken::String(s) => Token::text(TokenKind::String, unescape(&s[1..s.len() - 1]), span),
        RawToken::Account(s) => Token::text(TokenKind::Account, s, span),
        RawToken::Currency(s) => Token::text(TokenKind::Currency, s, span),
        RawToken::Tag(s) => Token::text(TokenKind::Tag, &s[1..], span),
        RawToken::Link(s) => Token::text(TokenKind::Link, &s[1..], span),
        RawToken::Comment(s) => Token::text(TokenKind::Comment, s, span),
        RawToken::Star => flag('*', span),
        RawToken::Pending => flag('!', span),
        RawToken::Flag(s) => flag(s.chars().next().unwrap_or('*'), span),
        RawToken::Txn => Token::bare(TokenKind::Txn, span),
        RawToken::Check => Token::bare(TokenKind::Check, span),
        RawToken::Open => Token::bare(TokenKind::Open, span),
        RawToken::Close => Token::bare(TokenKind::Close, span),
        RawToken::Pad => Token::bare(TokenKind::Pad, span),
        RawToken::Event => Token::bare(TokenKind::Event, span),
        RawToken::Price => Token::bare(TokenKind::Price, span),
        RawToken::Note => Token::bare(TokenKind::Note, span),
        RawToken::Document => Token::bare(TokenKind::Document, span),
        RawToken::Pushtag => Token::bare(TokenKind::Pushtag, span),
        RawToken::Poptag => Token::bare(TokenKind::Poptag, span),
        RawToken::Option_ => Token::bare(TokenKind::Option, span),
        RawToken::Pipe => Token::bare(TokenKind::Pipe, span),
        RawToken::AtAt => Token::bare(TokenKind::AtAt, span),
        RawToken::At => Token::bare(TokenKind::At, span),
        RawToken::LBrace => Token::bare(TokenKind::LCurl, span),
        RawToken::RBrace => Token::bare(TokenKind::RCurl, span),
        RawToken::Comma => Token::bare(TokenKind::Comma, span),
        RawToken::Slash => Token::bare(TokenKind::Slash, span),
        RawToken::Newline => Token::bare(TokenKind::Eol, span),
    }
}

const fn flag(c: char, span: SourceSpan) -> Token {
    Token::new(TokenKind::Flag, TokenValue::Char(c), span)
}

/// Parse a number literal, dropping thousands separators.
fn parse_number(s: &str) -> Option<Decimal> {
    if s.contains(',') {
        Decimal::from_str(&s.replace(',', "")).ok()
    } else {
        Decimal::from_str(s).ok()
    }
}

/// Resolve backslash escapes in a string body.
fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some(other) => result.push(other),
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lex(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_open() {
        use TokenKind::*;
        assert_eq!(
            kinds("2024-01-15 open Assets:Bank USD, EUR\n"),
            [Date, Open, Account, Currency, Comma, Currency, Eol]
        );
    }

    #[test]
    fn test_values() {
        let tokens = lex("2024/01/15 * \"Caf\\\"e\" #food ^inv-1 -1,234.50 USD");
        assert_eq!(tokens[0].value, TokenValue::Str("2024/01/15".to_string()));
        assert_eq!(tokens[1].value, TokenValue::Char('*'));
        assert_eq!(tokens[2].value, TokenValue::Str("Caf\"e".to_string()));
        assert_eq!(tokens[3].value, TokenValue::Str("food".to_string()));
        assert_eq!(tokens[4].value, TokenValue::Str("inv-1".to_string()));
        assert_eq!(tokens[5].value, TokenValue::Number(dec!(-1234.50)));
        assert_eq!(tokens[6].value, TokenValue::Str("USD".to_string()));
    }

    #[test]
    fn test_flags() {
        let tokens = lex("! P txn");
        assert_eq!(tokens[0].value, TokenValue::Char('!'));
        assert_eq!(tokens[1].value, TokenValue::Char('P'));
        assert_eq!(tokens[2].kind, TokenKind::Txn);
    }

    #[test]
    fn test_indent_only_before_content() {
        use TokenKind::*;
        let source = "2024-01-01 txn \"x\"\n  Assets:Cash 1 USD\n   \n  ; note\n";
        assert_eq!(
            kinds(source),
            [
                Date, Txn, String, Eol, Indent, Account, Number, Currency, Eol, Eol, Comment, Eol
            ]
        );
    }

    #[test]
    fn test_spans_are_line_and_column() {
        let tokens = lex("option \"a\" \"b\"\n  Assets:Cash");
        assert_eq!(tokens[0].span, SourceSpan::new(1, 1, 1, 7));
        assert_eq!(tokens[1].span, SourceSpan::new(1, 8, 1, 11));
        assert_eq!(tokens[3].span, SourceSpan::new(1, 15, 2, 1));
        assert_eq!(tokens[4].kind, TokenKind::Indent);
        assert_eq!(tokens[4].span, SourceSpan::new(2, 1, 2, 3));
        assert_eq!(tokens[5].span, SourceSpan::new(2, 3, 2, 14));
    }

    #[test]
    fn test_multiline_string_advances_lines() {
        let tokens = lex("\"a\nb\" 2024-01-01");
        assert_eq!(tokens[0].value, TokenValue::Str("a\nb".to_string()));
        assert_eq!(tokens[0].span, SourceSpan::new(1, 1, 2, 3));
        assert_eq!(tokens[1].span, SourceSpan::new(2, 4, 2, 14));
    }

    #[test]
    fn test_org_heading_is_skipped() {
        let tokens = lex("* Banking\n2024-01-01 * \"x\"\n");
        assert_eq!(tokens[0].kind, TokenKind::Skipped);
        assert_eq!(tokens[0].value, TokenValue::Str("* Banking".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Eol);
        assert_eq!(tokens[3].kind, TokenKind::Flag);
    }

    #[test]
    fn test_unknown_input_is_error_token() {
        let tokens = lex("2024-01-01 bogus");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eol));
    }

    #[test]
    fn test_final_line_is_closed_and_eof_repeats() {
        let mut lexer = Lexer::new("poptag #trip");
        let kinds: Vec<_> = (0..5).map(|_| lexer.next_token().kind).collect();
        assert_eq!(
            kinds,
            [
                TokenKind::Poptag,
                TokenKind::Tag,
                TokenKind::Eol,
                TokenKind::Eof,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_empty_source() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().span, SourceSpan::point(1, 1));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\tb\nc\\d"), "a\tb\nc\\d");
        assert_eq!(unescape(r"trailing\"), "trailing\\");
    }
}
