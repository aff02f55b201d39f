//! Productions of the ledger grammar.
//!
//! One method per nonterminal, each consuming from the engine's lookahead
//! and handing completed values to the builder. Statement-level failures
//! propagate as statement halts up to `declarations`, where the engine
//! resynchronizes.

use ledgerline_core::{
    Amount, Balance, Close, Directive, Document, Event, LotCost, Note, Open, Pad, Position,
    Posting, Price, Transaction,
};
use tracing::{debug, trace};

use crate::engine::{built, EntryHead, Parser, Rule, Step};
use crate::{
    DirectiveBuilder, ErrorReporter, ParseError, ParseErrorKind, PostingParts, Spanned,
    TokenKind, TokenSource, TransactionParts,
};

use TokenKind as T;

/// Tokens that may end a line.
const EOL_START: [TokenKind; 3] = [T::Eol, T::Indent, T::Comment];

const DECLARATION_START: &[TokenKind] = &[
    T::Date,
    T::Option,
    T::Pushtag,
    T::Poptag,
    T::Eol,
    T::Indent,
    T::Comment,
    T::Skipped,
    T::Eof,
];

const ENTRY_KEYWORDS: &[TokenKind] = &[
    T::Txn,
    T::Flag,
    T::Open,
    T::Close,
    T::Pad,
    T::Check,
    T::Price,
    T::Event,
    T::Note,
    T::Document,
];

/// Append to a list that stays `None` until its first element.
fn push<V>(list: &mut Option<Vec<V>>, item: V) {
    list.get_or_insert_with(Vec::new).push(item);
}

impl<S, B, R> Parser<'_, S, B, R>
where
    S: TokenSource,
    B: DirectiveBuilder + ?Sized,
    R: ErrorReporter + ?Sized,
{
    /// One statement of `declarations`. Returns `false` at end of input.
    pub(crate) fn declaration(&mut self) -> Step<bool> {
        match self.lookahead.kind {
            T::Eof => return Ok(false),
            T::Date => {
                let entry = self.entry()?;
                self.accept(entry);
            }
            T::Option => {
                let option = self.option()?;
                self.accept(option);
            }
            T::Pushtag => self.pushtag()?,
            T::Poptag => self.poptag()?,
            T::Eol | T::Indent | T::Comment => self.eol(&[])?,
            T::Skipped => {
                self.bump();
            }
            _ => return Err(self.unexpected(DECLARATION_START)),
        }
        Ok(true)
    }

    fn accept(&mut self, directive: Spanned<Directive>) {
        trace!(
            kind = directive.value.type_name(),
            span = %directive.span,
            "accepted directive"
        );
        self.directives.push(directive);
    }

    /// `eol := EOL | INDENT [EOL] | COMMENT [EOL]`
    ///
    /// `also` lists tokens the caller would have accepted in place of the
    /// line end, for the error message.
    pub(crate) fn eol(&mut self, also: &[TokenKind]) -> Step<()> {
        match self.lookahead.kind {
            T::Eol => {
                self.bump();
            }
            T::Indent | T::Comment => {
                self.bump();
                if self.lookahead.kind == T::Eol {
                    self.bump();
                }
            }
            _ => {
                let mut expected = also.to_vec();
                expected.extend_from_slice(&EOL_START);
                return Err(self.unexpected(&expected));
            }
        }
        Ok(())
    }

    /// `entry := DATE (transaction | open | close | pad | check | price | event | note | document)`
    fn entry(&mut self) -> Step<Spanned<Directive>> {
        self.enter(Rule::Entry)?;
        let mark = self.mark();
        let token = self.bump();
        let location = self.location(token.span);
        let date = self.date(token)?;
        let head = EntryHead {
            mark,
            location,
            date,
        };

        let directive = match self.lookahead.kind {
            T::Txn | T::Flag => Directive::Transaction(self.transaction(head)?),
            T::Open => Directive::Open(self.open(head)?),
            T::Close => Directive::Close(self.close(head)?),
            T::Pad => Directive::Pad(self.pad(head)?),
            T::Check => Directive::Balance(self.balance(head)?),
            T::Price => Directive::Price(self.price(head)?),
            T::Event => Directive::Event(self.event(head)?),
            T::Note => Directive::Note(self.note(head)?),
            T::Document => Directive::Document(self.document(head)?),
            _ => return Err(self.unexpected(ENTRY_KEYWORDS)),
        };
        self.leave();
        Ok(Spanned::new(directive, self.span_since(mark)))
    }

    /// `transaction := (TXN | FLAG) STRING [[PIPE] STRING] TAG* LINK* eol posting*`
    fn transaction(&mut self, head: EntryHead) -> Step<Transaction> {
        self.enter(Rule::Transaction)?;
        let flag = self.take_flag()?;
        let first = self.take_text(T::String, &[T::String])?;
        let (payee, narration) = match self.lookahead.kind {
            T::Pipe => {
                self.bump();
                let narration = self.take_text(T::String, &[T::String])?;
                (Some(first), narration)
            }
            T::String => {
                let narration = self.take_text(T::String, &[T::String])?;
                (Some(first), narration)
            }
            _ => (None, first),
        };

        let mut tags = None;
        while self.lookahead.kind == T::Tag {
            push(&mut tags, self.take_text(T::Tag, &[T::Tag])?);
        }
        let mut links = None;
        while self.lookahead.kind == T::Link {
            push(&mut links, self.take_text(T::Link, &[T::Link])?);
        }

        let mut follow = Vec::new();
        if payee.is_none() {
            follow.extend([T::Pipe, T::String]);
        }
        if links.is_none() {
            follow.push(T::Tag);
        }
        follow.push(T::Link);
        self.eol(&follow)?;

        let mut postings = None;
        loop {
            match self.lookahead.kind {
                T::Indent => push(&mut postings, self.posting()?),
                T::Comment if self.at_line_start => self.eol(&[])?,
                _ => break,
            }
        }
        self.leave();

        let parts = TransactionParts {
            date: head.date,
            flag,
            payee,
            narration,
            tags,
            links,
            postings,
        };
        let span = self.span_since(head.mark);
        built(
            self.builder.transaction(head.location, parts, &*self.tags),
            span,
        )
    }

    /// `posting := INDENT [FLAG] ACCOUNT [position [(AT | ATAT) amount]] eol`
    fn posting(&mut self) -> Step<Posting> {
        self.enter(Rule::Posting)?;
        let mark = self.mark();
        self.bump();

        let flag = if self.lookahead.kind == T::Flag {
            Some(self.take_flag()?)
        } else {
            None
        };
        let expected: &[TokenKind] = if flag.is_some() {
            &[T::Account]
        } else {
            &[T::Flag, T::Account]
        };
        let account = self.take_text(T::Account, expected)?;

        let mut position = None;
        let mut price = None;
        let mut price_is_total = false;
        if self.lookahead.kind == T::Number {
            let units = self.position()?;
            let has_cost = units.cost.is_some();
            position = Some(units);
            match self.lookahead.kind {
                T::At | T::AtAt => {
                    price_is_total = self.bump().kind == T::AtAt;
                    price = Some(self.amount()?);
                    self.eol(&[])?;
                }
                _ if has_cost => self.eol(&[T::At, T::AtAt])?,
                _ => self.eol(&[T::LCurl, T::At, T::AtAt])?,
            }
        } else {
            self.eol(&[T::Number])?;
        }
        self.leave();

        let parts = PostingParts {
            flag,
            account,
            position,
            price,
            price_is_total,
        };
        let span = self.span_since(mark);
        built(self.builder.posting(parts), span)
    }

    /// `position := amount [lot_cost]`
    fn position(&mut self) -> Step<Position> {
        self.enter(Rule::Position)?;
        let mark = self.mark();
        let units = self.amount()?;
        let cost = if self.lookahead.kind == T::LCurl {
            Some(self.lot_cost()?)
        } else {
            None
        };
        self.leave();
        let span = self.span_since(mark);
        built(self.builder.position(units, cost), span)
    }

    /// `lot_cost := LCURL amount [SLASH DATE] RCURL`
    fn lot_cost(&mut self) -> Step<LotCost> {
        self.enter(Rule::LotCost)?;
        let mark = self.mark();
        self.bump();
        let cost = self.amount()?;
        let date = match self.lookahead.kind {
            T::Slash => {
                self.bump();
                let token = self.take(T::Date, &[T::Date])?;
                Some(self.date(token)?)
            }
            T::RCurl => None,
            _ => return Err(self.unexpected(&[T::Slash, T::RCurl])),
        };
        self.take(T::RCurl, &[T::RCurl])?;
        self.leave();
        let span = self.span_since(mark);
        built(self.builder.lot_cost(cost, date), span)
    }

    /// `amount := NUMBER CURRENCY`
    fn amount(&mut self) -> Step<Amount> {
        self.enter(Rule::Amount)?;
        let mark = self.mark();
        let number = self.take_number()?;
        let currency = self.take_text(T::Currency, &[T::Currency])?;
        self.leave();
        let span = self.span_since(mark);
        built(self.builder.amount(number, currency), span)
    }

    /// `open := OPEN ACCOUNT [CURRENCY ([COMMA] CURRENCY)*] eol`
    fn open(&mut self, head: EntryHead) -> Step<Open> {
        self.bump();
        let account = self.take_text(T::Account, &[T::Account])?;
        let mut currencies = None;
        while self.lookahead.kind == T::Currency {
            push(&mut currencies, self.take_text(T::Currency, &[T::Currency])?);
            if self.lookahead.kind == T::Comma {
                self.bump();
                if self.lookahead.kind != T::Currency {
                    return Err(self.unexpected(&[T::Currency]));
                }
            }
        }
        let follow: &[TokenKind] = if currencies.is_some() {
            &[T::Comma, T::Currency]
        } else {
            &[T::Currency]
        };
        self.eol(follow)?;
        let span = self.span_since(head.mark);
        built(
            self.builder
                .open(head.location, head.date, account, currencies),
            span,
        )
    }

    /// `close := CLOSE ACCOUNT eol`
    fn close(&mut self, head: EntryHead) -> Step<Close> {
        self.bump();
        let account = self.take_text(T::Account, &[T::Account])?;
        self.eol(&[])?;
        let span = self.span_since(head.mark);
        built(self.builder.close(head.location, head.date, account), span)
    }

    /// `pad := PAD ACCOUNT ACCOUNT eol`
    fn pad(&mut self, head: EntryHead) -> Step<Pad> {
        self.bump();
        let account = self.take_text(T::Account, &[T::Account])?;
        let source = self.take_text(T::Account, &[T::Account])?;
        self.eol(&[])?;
        let span = self.span_since(head.mark);
        built(
            self.builder.pad(head.location, head.date, account, source),
            span,
        )
    }

    /// `check := CHECK ACCOUNT amount eol`
    fn balance(&mut self, head: EntryHead) -> Step<Balance> {
        self.bump();
        let account = self.take_text(T::Account, &[T::Account])?;
        let amount = self.amount()?;
        self.eol(&[])?;
        let span = self.span_since(head.mark);
        built(
            self.builder.balance(head.location, head.date, account, amount),
            span,
        )
    }

    /// `price := PRICE CURRENCY amount eol`
    fn price(&mut self, head: EntryHead) -> Step<Price> {
        self.bump();
        let currency = self.take_text(T::Currency, &[T::Currency])?;
        let amount = self.amount()?;
        self.eol(&[])?;
        let span = self.span_since(head.mark);
        built(
            self.builder.price(head.location, head.date, currency, amount),
            span,
        )
    }

    /// `event := EVENT STRING STRING eol`
    fn event(&mut self, head: EntryHead) -> Step<Event> {
        self.bump();
        let event_type = self.take_text(T::String, &[T::String])?;
        let description = self.take_text(T::String, &[T::String])?;
        self.eol(&[])?;
        let span = self.span_since(head.mark);
        built(
            self.builder
                .event(head.location, head.date, event_type, description),
            span,
        )
    }

    /// `note := NOTE ACCOUNT STRING eol`
    fn note(&mut self, head: EntryHead) -> Step<Note> {
        self.bump();
        let account = self.take_text(T::Account, &[T::Account])?;
        let comment = self.take_text(T::String, &[T::String])?;
        self.eol(&[])?;
        let span = self.span_since(head.mark);
        built(
            self.builder.note(head.location, head.date, account, comment),
            span,
        )
    }

    /// `document := DOCUMENT ACCOUNT STRING eol`
    fn document(&mut self, head: EntryHead) -> Step<Document> {
        self.bump();
        let account = self.take_text(T::Account, &[T::Account])?;
        let filename = self.take_text(T::String, &[T::String])?;
        self.eol(&[])?;
        let span = self.span_since(head.mark);
        built(
            self.builder
                .document(head.location, head.date, account, filename),
            span,
        )
    }

    /// `option := OPTION STRING STRING eol`
    fn option(&mut self) -> Step<Spanned<Directive>> {
        self.enter(Rule::Option)?;
        let mark = self.mark();
        let keyword = self.bump();
        let location = self.location(keyword.span);
        let key = self.take_text(T::String, &[T::String])?;
        let value = self.take_text(T::String, &[T::String])?;
        self.eol(&[])?;
        self.leave();
        let span = self.span_since(mark);
        let option = built(self.builder.option(location, key, value), span)?;
        Ok(Spanned::new(Directive::Option(option), span))
    }

    /// `pushtag := PUSHTAG TAG`
    fn pushtag(&mut self) -> Step<()> {
        self.bump();
        let tag = self.take_text(T::Tag, &[T::Tag])?;
        debug!(tag = %tag, depth = self.tags.depth() + 1, "pushtag");
        self.tags.push(tag);
        Ok(())
    }

    /// `poptag := POPTAG TAG`
    ///
    /// Popping a tag that is not active is reported but does not disturb the
    /// parse.
    fn poptag(&mut self) -> Step<()> {
        let mark = self.mark();
        self.bump();
        let tag = self.take_text(T::Tag, &[T::Tag])?;
        if self.tags.pop(&tag) {
            debug!(tag = %tag, depth = self.tags.depth(), "poptag");
        } else {
            let span = self.span_since(mark);
            self.report(ParseError::new(ParseErrorKind::UnbalancedPoptag(tag), span));
        }
        Ok(())
    }
}
