//! Parse error types and the reporter they are delivered to.

use std::fmt;

use crate::{BuildError, SourceSpan, TokenKind};

/// Expected-token lists longer than this collapse to a bare "syntax error".
pub const MAX_EXPECTED: usize = 4;

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The span where the error occurred.
    pub span: SourceSpan,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    /// Create a syntax error for an unexpected token.
    #[must_use]
    pub fn syntax(unexpected: TokenKind, expected: &[TokenKind], span: SourceSpan) -> Self {
        Self::new(
            ParseErrorKind::Syntax {
                unexpected,
                expected: expected.to_vec(),
            },
            span,
        )
    }

    /// Get a numeric code for the error kind.
    #[must_use]
    pub const fn kind_code(&self) -> u32 {
        match &self.kind {
            ParseErrorKind::Syntax { .. } => 1,
            ParseErrorKind::InvalidValue(_) => 2,
            ParseErrorKind::MissingValue(_) => 3,
            ParseErrorKind::UnbalancedPoptag(_) => 4,
            ParseErrorKind::DiscardedToken(_) => 5,
            ParseErrorKind::RecoveryExhausted => 6,
            ParseErrorKind::StackExhausted(_) => 7,
        }
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &str {
        match &self.kind {
            ParseErrorKind::Syntax { .. } => "unexpected token",
            ParseErrorKind::InvalidValue(_) => "invalid value",
            ParseErrorKind::MissingValue(_) => "malformed token",
            ParseErrorKind::UnbalancedPoptag(_) => "tag was not pushed",
            ParseErrorKind::DiscardedToken(_) => "discarded",
            ParseErrorKind::RecoveryExhausted => "parsing stopped here",
            ParseErrorKind::StackExhausted(_) => "nesting too deep",
        }
    }

    /// Whether this error ended the parse.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::RecoveryExhausted | ParseErrorKind::StackExhausted(_)
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No production accepts the lookahead token.
    Syntax {
        /// The token that was found.
        unexpected: TokenKind,
        /// The tokens that would have been accepted.
        expected: Vec<TokenKind>,
    },
    /// The directive builder refused a value.
    InvalidValue(BuildError),
    /// A token arrived without the value its kind requires.
    MissingValue(TokenKind),
    /// `poptag` named a tag that is not active.
    UnbalancedPoptag(String),
    /// A token thrown away while resynchronizing.
    DiscardedToken(TokenKind),
    /// Recovery unwound every frame without finding one that accepts errors.
    RecoveryExhausted,
    /// The frame stack grew past the configured maximum depth.
    StackExhausted(usize),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax {
                unexpected,
                expected,
            } => {
                if expected.len() > MAX_EXPECTED {
                    return write!(f, "syntax error");
                }
                write!(f, "syntax error, unexpected {unexpected}")?;
                for (i, kind) in expected.iter().enumerate() {
                    let sep = if i == 0 { ", expecting " } else { " or " };
                    write!(f, "{sep}{kind}")?;
                }
                Ok(())
            }
            Self::InvalidValue(err) => write!(f, "{err}"),
            Self::MissingValue(kind) => write!(f, "token {kind} carries no value"),
            Self::UnbalancedPoptag(tag) => write!(f, "attempting to pop absent tag '#{tag}'"),
            Self::DiscardedToken(kind) => write!(f, "discarding {kind} during error recovery"),
            Self::RecoveryExhausted => write!(f, "syntax error: no statement to resume at"),
            Self::StackExhausted(max) => {
                write!(f, "parser stack exhausted: nesting exceeds {max} frames")
            }
        }
    }
}

/// Receives every error found during a parse.
///
/// Reporting never changes what the parser does next.
pub trait ErrorReporter {
    /// Record one error. [`ParseError::message`] and [`ParseError::span`]
    /// give the text and location.
    fn report(&mut self, error: ParseError);
}

impl ErrorReporter for Vec<ParseError> {
    fn report(&mut self, error: ParseError) {
        self.push(error);
    }
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for &mut R {
    fn report(&mut self, error: ParseError) {
        (**self).report(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> SourceSpan {
        SourceSpan::new(3, 5, 3, 9)
    }

    #[test]
    fn test_syntax_message_lists_expected() {
        let err = ParseError::syntax(
            TokenKind::Eol,
            &[TokenKind::Flag, TokenKind::Account],
            span(),
        );
        insta::assert_snapshot!(
            err.message(),
            @"syntax error, unexpected EOL, expecting FLAG or ACCOUNT"
        );
    }

    #[test]
    fn test_syntax_message_without_expected() {
        let err = ParseError::syntax(TokenKind::Error, &[], span());
        assert_eq!(err.message(), "syntax error, unexpected ERROR");
    }

    #[test]
    fn test_syntax_message_is_capped() {
        let four = [
            TokenKind::Number,
            TokenKind::Eol,
            TokenKind::Indent,
            TokenKind::Comment,
        ];
        let err = ParseError::syntax(TokenKind::Eof, &four, span());
        assert_eq!(
            err.message(),
            "syntax error, unexpected end of file, expecting NUMBER or EOL or INDENT or COMMENT"
        );

        let five = [
            TokenKind::Date,
            TokenKind::Option,
            TokenKind::Pushtag,
            TokenKind::Poptag,
            TokenKind::Eol,
        ];
        let err = ParseError::syntax(TokenKind::Number, &five, span());
        assert_eq!(err.message(), "syntax error");
    }

    #[test]
    fn test_build_error_message() {
        let err = ParseError::new(
            ParseErrorKind::InvalidValue(BuildError::InvalidDate("2024-02-30".to_string())),
            span(),
        );
        assert_eq!(err.to_string(), "invalid date '2024-02-30'");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(ParseError::new(ParseErrorKind::RecoveryExhausted, span()).is_fatal());
        assert!(ParseError::new(ParseErrorKind::StackExhausted(8), span()).is_fatal());
        assert!(!ParseError::new(ParseErrorKind::UnbalancedPoptag("x".into()), span()).is_fatal());
    }

    #[test]
    fn test_kind_codes() {
        let kinds = [
            (
                ParseErrorKind::Syntax {
                    unexpected: TokenKind::Eol,
                    expected: vec![],
                },
                1,
            ),
            (
                ParseErrorKind::InvalidValue(BuildError::Rejected("no".into())),
                2,
            ),
            (ParseErrorKind::MissingValue(TokenKind::Account), 3),
            (ParseErrorKind::UnbalancedPoptag("x".into()), 4),
            (ParseErrorKind::DiscardedToken(TokenKind::Number), 5),
            (ParseErrorKind::RecoveryExhausted, 6),
            (ParseErrorKind::StackExhausted(1), 7),
        ];

        for (kind, expected_code) in kinds {
            let err = ParseError::new(kind, span());
            assert_eq!(err.kind_code(), expected_code);
        }
    }

    #[test]
    fn test_vec_reporter_collects() {
        let mut errors: Vec<ParseError> = Vec::new();
        errors.report(ParseError::new(ParseErrorKind::RecoveryExhausted, span()));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, span());
    }
}
