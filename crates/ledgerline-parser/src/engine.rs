//! Grammar engine state: lookahead, frame stack, spans and error recovery.
//!
//! The productions themselves live in `grammar.rs`. This module holds the
//! machinery they share: pulling tokens, tracking the span of the production
//! being reduced, the explicit frame stack with its depth limit, and the
//! panic-mode recovery that resynchronizes at the next statement.

use chrono::NaiveDate;
use ledgerline_core::{Directive, SourceLocation};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::{
    BuildError, DirectiveBuilder, ErrorReporter, ParseError, ParseErrorKind, SourceSpan, Spanned,
    TagContext, Token, TokenKind, TokenSource, TokenValue,
};

/// Default limit on the frame stack, matching the classic `YYMAXDEPTH`.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// What to do after a statement-level error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Recovery {
    /// Report, skip to the next statement and keep parsing.
    #[default]
    Resynchronize,
    /// Report and abort the parse at the first error.
    Abort,
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// File name recorded in each directive's location.
    pub filename: String,
    /// Maximum depth of the frame stack before the parse aborts.
    pub max_depth: usize,
    /// Error recovery policy.
    pub recovery: Recovery,
    /// Also report every token discarded during recovery.
    pub verbose_recovery: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            filename: "<string>".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            recovery: Recovery::default(),
            verbose_recovery: false,
        }
    }
}

impl ParseOptions {
    /// Set the file name.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set the maximum frame depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the recovery policy.
    #[must_use]
    pub const fn with_recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = recovery;
        self
    }

    /// Report discarded tokens during recovery.
    #[must_use]
    pub const fn with_verbose_recovery(mut self, verbose: bool) -> Self {
        self.verbose_recovery = verbose;
        self
    }
}

/// Where the engine is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Parsing statements.
    Normal,
    /// Skipping to the next statement after an error.
    Recovering,
    /// Reached end of input.
    Accepted,
    /// Stopped by a fatal error.
    Aborted,
}

/// The outcome of a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    /// Accepted directives in source order. Partial if the parse aborted.
    pub directives: Vec<Spanned<Directive>>,
    /// Final engine state, `Accepted` or `Aborted`.
    pub state: EngineState,
    /// Number of errors reported, not counting discarded-token notes.
    pub error_count: usize,
}

impl ParseOutput {
    /// Whether the parse reached end of input.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == EngineState::Accepted
    }
}

/// Grammar rules that occupy a frame while being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    Declarations,
    Entry,
    Transaction,
    Posting,
    Position,
    LotCost,
    Amount,
    Option,
}

/// Why a production stopped.
#[derive(Debug)]
pub(crate) enum Halt {
    /// The current statement is malformed; recover and continue.
    Statement(ParseError),
    /// The parse cannot continue.
    Fatal(ParseError),
}

pub(crate) type Step<T> = Result<T, Halt>;

/// Position in the token stream where a production started.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mark {
    consumed: usize,
    start: SourceSpan,
}

/// The parts every dated entry shares.
#[derive(Debug, Clone)]
pub(crate) struct EntryHead {
    pub mark: Mark,
    pub location: SourceLocation,
    pub date: NaiveDate,
}

/// The grammar engine for one parse.
///
/// Owns the token source and borrows the builder, tag context and reporter
/// for the duration of the parse.
pub struct Parser<'a, S, B: ?Sized, R: ?Sized> {
    tokens: S,
    pub(crate) builder: &'a mut B,
    pub(crate) tags: &'a mut TagContext,
    reporter: &'a mut R,
    pub(crate) options: ParseOptions,
    pub(crate) lookahead: Token,
    /// Whether `lookahead` is the first token of its line.
    pub(crate) at_line_start: bool,
    last_span: SourceSpan,
    consumed: usize,
    frames: Vec<Rule>,
    state: EngineState,
    pub(crate) directives: Vec<Spanned<Directive>>,
    error_count: usize,
}

impl<'a, S, B, R> Parser<'a, S, B, R>
where
    S: TokenSource,
    B: DirectiveBuilder + ?Sized,
    R: ErrorReporter + ?Sized,
{
    /// Prepare a parse. The first token is pulled immediately.
    pub fn new(
        mut tokens: S,
        builder: &'a mut B,
        tags: &'a mut TagContext,
        reporter: &'a mut R,
        options: ParseOptions,
    ) -> Self {
        let lookahead = tokens.next_token();
        Self {
            tokens,
            builder,
            tags,
            reporter,
            options,
            lookahead,
            at_line_start: true,
            last_span: SourceSpan::default(),
            consumed: 0,
            frames: Vec::new(),
            state: EngineState::Normal,
            directives: Vec::new(),
            error_count: 0,
        }
    }

    /// Current engine state.
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Parse to the end of input, or until a fatal error.
    pub fn run(mut self) -> ParseOutput {
        debug!(filename = %self.options.filename, "parse started");
        match self.file() {
            Ok(()) => self.state = EngineState::Accepted,
            Err(fatal) => {
                self.state = EngineState::Aborted;
                self.report(fatal);
            }
        }
        debug!(
            directives = self.directives.len(),
            errors = self.error_count,
            state = ?self.state,
            "parse finished"
        );
        ParseOutput {
            directives: self.directives,
            state: self.state,
            error_count: self.error_count,
        }
    }

    /// `file := declarations`, folding statements until end of input.
    fn file(&mut self) -> Result<(), ParseError> {
        self.enter(Rule::Declarations).map_err(Halt::into_error)?;
        loop {
            let statement_start = self.consumed;
            match self.declaration() {
                Ok(true) => {}
                Ok(false) => break,
                Err(Halt::Statement(error)) => self.recover(error, statement_start)?,
                Err(Halt::Fatal(error)) => return Err(error),
            }
        }
        self.leave();
        Ok(())
    }

    /// Report a statement error, unwind to a frame that accepts errors, and
    /// skip tokens up to the next statement start.
    fn recover(&mut self, error: ParseError, statement_start: usize) -> Result<(), ParseError> {
        self.state = EngineState::Recovering;
        let span = error.span;
        self.report(error);

        while let Some(&rule) = self.frames.last() {
            if self.accepts_error(rule) {
                break;
            }
            self.frames.pop();
        }
        if self.frames.is_empty() {
            return Err(ParseError::new(ParseErrorKind::RecoveryExhausted, span));
        }

        // A statement that failed on its first token must still make progress.
        let mut must_discard = self.consumed == statement_start;
        while self.lookahead.kind != TokenKind::Eof {
            if !must_discard && self.at_line_start && self.lookahead.kind.starts_statement() {
                break;
            }
            must_discard = false;
            let token = self.bump();
            trace!(token = %token, span = %token.span, "discarding token");
            if self.options.verbose_recovery {
                self.report(ParseError::new(
                    ParseErrorKind::DiscardedToken(token.kind),
                    token.span,
                ));
            }
        }

        debug!(resume = %self.lookahead.kind, "recovered");
        self.state = EngineState::Normal;
        Ok(())
    }

    fn accepts_error(&self, rule: Rule) -> bool {
        rule == Rule::Declarations && self.options.recovery == Recovery::Resynchronize
    }

    pub(crate) fn report(&mut self, error: ParseError) {
        if !matches!(error.kind, ParseErrorKind::DiscardedToken(_)) {
            self.error_count += 1;
            debug!(span = %error.span, "{error}");
        }
        self.reporter.report(error);
    }

    /// Push a frame, failing fatally past the configured depth.
    pub(crate) fn enter(&mut self, rule: Rule) -> Step<()> {
        if self.frames.len() >= self.options.max_depth {
            return Err(Halt::Fatal(ParseError::new(
                ParseErrorKind::StackExhausted(self.options.max_depth),
                self.lookahead.span,
            )));
        }
        trace!(?rule, depth = self.frames.len() + 1, "enter");
        self.frames.push(rule);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.frames.pop();
    }

    /// Consume the lookahead and pull the next token.
    pub(crate) fn bump(&mut self) -> Token {
        let next = self.tokens.next_token();
        let token = std::mem::replace(&mut self.lookahead, next);
        self.at_line_start = token.kind == TokenKind::Eol;
        self.last_span = token.span;
        self.consumed += 1;
        token
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark {
            consumed: self.consumed,
            start: self.lookahead.span,
        }
    }

    /// Span of everything consumed since `mark`; a point at the end of the
    /// previous token if nothing was.
    pub(crate) fn span_since(&self, mark: Mark) -> SourceSpan {
        if self.consumed == mark.consumed {
            self.last_span.end_point()
        } else {
            mark.start.to(&self.last_span)
        }
    }

    pub(crate) fn location(&self, span: SourceSpan) -> SourceLocation {
        SourceLocation::new(self.options.filename.clone(), span.first_line)
    }

    pub(crate) fn unexpected(&self, expected: &[TokenKind]) -> Halt {
        Halt::Statement(ParseError::syntax(
            self.lookahead.kind,
            expected,
            self.lookahead.span,
        ))
    }

    /// Consume a token of `kind`, or fail listing `expected`.
    pub(crate) fn take(&mut self, kind: TokenKind, expected: &[TokenKind]) -> Step<Token> {
        if self.lookahead.kind == kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Consume a token of `kind` and return its text.
    pub(crate) fn take_text(&mut self, kind: TokenKind, expected: &[TokenKind]) -> Step<String> {
        let token = self.take(kind, expected)?;
        token_text(token)
    }

    pub(crate) fn take_number(&mut self) -> Step<Decimal> {
        let token = self.take(TokenKind::Number, &[TokenKind::Number])?;
        match token.value {
            TokenValue::Number(number) => Ok(number),
            _ => Err(missing_value(token.kind, token.span)),
        }
    }

    pub(crate) fn take_flag(&mut self) -> Step<char> {
        let token = self.bump();
        match (token.kind, token.value) {
            (TokenKind::Txn, _) => Ok('*'),
            (TokenKind::Flag, TokenValue::Char(flag)) => Ok(flag),
            (kind, _) => Err(missing_value(kind, token.span)),
        }
    }

    /// Convert a DATE token through the builder.
    pub(crate) fn date(&mut self, token: Token) -> Step<NaiveDate> {
        let span = token.span;
        let text = token_text(token)?;
        built(self.builder.date(&text), span)
    }
}

impl Halt {
    fn into_error(self) -> ParseError {
        match self {
            Self::Statement(error) | Self::Fatal(error) => error,
        }
    }
}

pub(crate) fn token_text(token: Token) -> Step<String> {
    let (kind, span) = (token.kind, token.span);
    token.value.into_string().ok_or_else(|| missing_value(kind, span))
}

const fn missing_value(kind: TokenKind, span: SourceSpan) -> Halt {
    Halt::Statement(ParseError::new(ParseErrorKind::MissingValue(kind), span))
}

/// Turn a builder result into a step, failing the statement on `Err`.
pub(crate) fn built<T>(result: Result<T, BuildError>, span: SourceSpan) -> Step<T> {
    result.map_err(|err| Halt::Statement(ParseError::new(ParseErrorKind::InvalidValue(err), span)))
}
