//! The token contract between a token source and the grammar engine.
//!
//! The engine pulls [`Token`]s one at a time from a [`TokenSource`]. The
//! reference [`Lexer`](crate::Lexer) is one such source; [`TokenStream`] turns
//! any iterator of tokens into another, which is how pre-lexed input or hand
//! built token sequences are fed to the parser.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SourceSpan;

/// Token kinds understood by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// End of input. Repeats forever once reached.
    Eof,
    /// Text the lexer could not recognize.
    Error,
    /// Leading whitespace of a line.
    Indent,
    /// Line terminator.
    Eol,
    /// `; ...` comment.
    Comment,
    /// A whole line ignored by the grammar (org-mode headings).
    Skipped,
    /// `|`
    Pipe,
    /// `@@`
    AtAt,
    /// `@`
    At,
    /// `{`
    LCurl,
    /// `}`
    RCurl,
    /// `,`
    Comma,
    /// `/`
    Slash,
    /// A single flag character, e.g. `*` or `!`.
    Flag,
    /// `txn`
    Txn,
    /// `check`
    Check,
    /// `open`
    Open,
    /// `close`
    Close,
    /// `pad`
    Pad,
    /// `event`
    Event,
    /// `price`
    Price,
    /// `note`
    Note,
    /// `document`
    Document,
    /// `pushtag`
    Pushtag,
    /// `poptag`
    Poptag,
    /// `option`
    Option,
    /// A date such as `2024-01-15`.
    Date,
    /// An account name such as `Assets:Bank`.
    Account,
    /// A currency or commodity name.
    Currency,
    /// A quoted string.
    String,
    /// A decimal number.
    Number,
    /// `#tag`
    Tag,
    /// `^link`
    Link,
}

impl TokenKind {
    /// The name of the kind as it appears in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eof => "end of file",
            Self::Error => "ERROR",
            Self::Indent => "INDENT",
            Self::Eol => "EOL",
            Self::Comment => "COMMENT",
            Self::Skipped => "SKIPPED",
            Self::Pipe => "PIPE",
            Self::AtAt => "ATAT",
            Self::At => "AT",
            Self::LCurl => "LCURL",
            Self::RCurl => "RCURL",
            Self::Comma => "COMMA",
            Self::Slash => "SLASH",
            Self::Flag => "FLAG",
            Self::Txn => "TXN",
            Self::Check => "CHECK",
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::Pad => "PAD",
            Self::Event => "EVENT",
            Self::Price => "PRICE",
            Self::Note => "NOTE",
            Self::Document => "DOCUMENT",
            Self::Pushtag => "PUSHTAG",
            Self::Poptag => "POPTAG",
            Self::Option => "OPTION",
            Self::Date => "DATE",
            Self::Account => "ACCOUNT",
            Self::Currency => "CURRENCY",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Tag => "TAG",
            Self::Link => "LINK",
        }
    }

    /// Whether a statement may begin with this kind, making it a place where
    /// error recovery can resume.
    #[must_use]
    pub const fn starts_statement(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Option | Self::Pushtag | Self::Poptag | Self::Eof
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The semantic value carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenValue {
    /// Punctuation, keywords, layout.
    None,
    /// A flag character.
    Char(char),
    /// Text: dates, names, strings (unescaped), tags and links (without prefix).
    Str(String),
    /// A number literal.
    Number(Decimal),
}

impl TokenValue {
    /// Take the text out of a `Str` value.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }
}

/// A token with its kind, value and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The semantic value.
    pub value: TokenValue,
    /// Where the token was found.
    pub span: SourceSpan,
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, value: TokenValue, span: SourceSpan) -> Self {
        Self { kind, value, span }
    }

    /// Create a token that carries no value.
    #[must_use]
    pub const fn bare(kind: TokenKind, span: SourceSpan) -> Self {
        Self::new(kind, TokenValue::None, span)
    }

    /// Create a token carrying text.
    #[must_use]
    pub fn text(kind: TokenKind, text: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(kind, TokenValue::Str(text.into()), span)
    }

    /// Create an end-of-input token.
    #[must_use]
    pub const fn eof(span: SourceSpan) -> Self {
        Self::bare(TokenKind::Eof, span)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::None => write!(f, "{}", self.kind),
            TokenValue::Char(c) => write!(f, "{}({c})", self.kind),
            TokenValue::Str(text) => write!(f, "{}({text:?})", self.kind),
            TokenValue::Number(n) => write!(f, "{}({n})", self.kind),
        }
    }
}

/// A pull-based supplier of tokens.
///
/// Once a source has returned [`TokenKind::Eof`], every later call must return
/// `Eof` again.
pub trait TokenSource {
    /// Produce the next token.
    fn next_token(&mut self) -> Token;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    fn next_token(&mut self) -> Token {
        (**self).next_token()
    }
}

impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    fn next_token(&mut self) -> Token {
        (**self).next_token()
    }
}

/// Adapts an iterator of tokens into a [`TokenSource`].
///
/// When the iterator runs dry (or yields an `Eof` token) the stream answers
/// `Eof` from then on, located at the end of the last token seen.
///
/// ```
/// use ledgerline_parser::{SourceSpan, Token, TokenKind, TokenSource, TokenStream};
///
/// let mut stream = TokenStream::new(vec![Token::bare(TokenKind::Eol, SourceSpan::new(1, 1, 2, 1))]);
/// assert_eq!(stream.next_token().kind, TokenKind::Eol);
/// assert_eq!(stream.next_token().kind, TokenKind::Eof);
/// assert_eq!(stream.next_token().kind, TokenKind::Eof);
/// ```
#[derive(Debug, Clone)]
pub struct TokenStream<I> {
    tokens: I,
    end: SourceSpan,
    finished: bool,
}

impl<I: Iterator<Item = Token>> TokenStream<I> {
    /// Wrap anything that yields tokens.
    pub fn new(tokens: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            end: SourceSpan::default(),
            finished: false,
        }
    }
}

impl<I: Iterator<Item = Token>> TokenSource for TokenStream<I> {
    fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::eof(self.end);
        }
        match self.tokens.next() {
            Some(token) if token.kind == TokenKind::Eof => {
                self.finished = true;
                self.end = token.span;
                token
            }
            Some(token) => {
                self.end = token.span.end_point();
                token
            }
            None => {
                self.finished = true;
                Token::eof(self.end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_starts() {
        assert!(TokenKind::Date.starts_statement());
        assert!(TokenKind::Pushtag.starts_statement());
        assert!(TokenKind::Eof.starts_statement());
        assert!(!TokenKind::Indent.starts_statement());
        assert!(!TokenKind::Account.starts_statement());
    }

    #[test]
    fn test_token_display() {
        let span = SourceSpan::point(1, 1);
        assert_eq!(Token::bare(TokenKind::AtAt, span).to_string(), "ATAT");
        assert_eq!(
            Token::new(TokenKind::Flag, TokenValue::Char('!'), span).to_string(),
            "FLAG(!)"
        );
        assert_eq!(
            Token::text(TokenKind::Account, "Assets:Cash", span).to_string(),
            "ACCOUNT(\"Assets:Cash\")"
        );
    }

    #[test]
    fn test_stream_end_is_idempotent() {
        let span = SourceSpan::new(1, 1, 1, 11);
        let mut stream = TokenStream::new(vec![Token::text(TokenKind::Date, "2024-01-01", span)]);

        assert_eq!(stream.next_token().kind, TokenKind::Date);
        for _ in 0..3 {
            let end = stream.next_token();
            assert_eq!(end.kind, TokenKind::Eof);
            assert_eq!(end.span, SourceSpan::point(1, 11));
        }
    }

    #[test]
    fn test_stream_stops_at_explicit_eof() {
        let span = SourceSpan::point(2, 1);
        let mut stream = TokenStream::new(vec![
            Token::eof(span),
            Token::bare(TokenKind::Eol, SourceSpan::point(9, 9)),
        ]);
        assert_eq!(stream.next_token().kind, TokenKind::Eof);
        assert_eq!(stream.next_token().kind, TokenKind::Eof);
    }
}
