//! Property-based tests for the parser.
//!
//! Run with: cargo test -p ledgerline-parser --test `property_tests`

use chrono::NaiveDate;
use ledgerline_core::{
    format_directive, Amount, Directive, FormatConfig, Posting, Position, SourceLocation,
    Transaction,
};
use ledgerline_parser::{
    parse, parse_with_options, EngineState, ParseErrorKind, ParseOptions, Recovery,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_currency() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("USD".to_string()),
        Just("EUR".to_string()),
        Just("AAPL".to_string()),
        Just("BTC".to_string()),
    ]
}

fn arb_account() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Assets:Cash".to_string()),
        Just("Assets:Bank:Checking".to_string()),
        Just("Expenses:Food".to_string()),
        Just("Income:Salary".to_string()),
        Just("Equity:Opening-Balances".to_string()),
    ]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2030i32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?\"\\\\]{0,20}"
}

fn arb_posting() -> impl Strategy<Value = Posting> {
    (arb_account(), prop::option::of((arb_decimal(), arb_currency()))).prop_map(
        |(account, units)| match units {
            Some((number, currency)) => {
                Posting::new(account, Position::simple(Amount::new(number, currency)))
            }
            None => Posting::auto(account),
        },
    )
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        arb_date(),
        prop::option::of(arb_text()),
        arb_text(),
        prop::collection::vec("[a-z][a-z0-9-]{0,8}", 0..3),
        prop::collection::vec(arb_posting(), 0..4),
    )
        .prop_map(|(date, payee, narration, tags, postings)| {
            let mut txn = Transaction::new(date, narration);
            if let Some(payee) = payee {
                txn = txn.with_payee(payee);
            }
            for tag in tags {
                if !txn.tags.contains(&tag) {
                    txn = txn.with_tag(tag);
                }
            }
            for posting in postings {
                txn = txn.with_posting(posting);
            }
            txn
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Parsing never fails to reach the end of input when recovering.
    #[test]
    fn prop_any_input_is_accepted(source in "[ -~\t\n]{0,200}") {
        let result = parse(&source);
        prop_assert_eq!(result.state, EngineState::Accepted);
    }

    /// Abort mode aborts on the first statement error.
    #[test]
    fn prop_abort_mode_outcomes(source in "[ -~\n]{0,120}") {
        let options = ParseOptions::default().with_recovery(Recovery::Abort);
        let result = parse_with_options(&source, options);
        if result.state == EngineState::Aborted {
            prop_assert!(result.errors.last().is_some_and(|e| e.is_fatal()));
        } else {
            prop_assert_eq!(result.state, EngineState::Accepted);
            prop_assert!(result
                .errors
                .iter()
                .all(|e| matches!(e.kind, ParseErrorKind::UnbalancedPoptag(_))));
        }
    }

    /// Directives come back in source order.
    #[test]
    fn prop_source_order_is_kept(dates in prop::collection::vec(arb_date(), 1..20)) {
        let source: String = dates
            .iter()
            .map(|d| format!("{d} close Assets:Cash\n"))
            .collect();
        let result = parse(&source);
        prop_assert!(result.errors.is_empty());
        let parsed: Vec<_> = result.directives.iter().filter_map(|d| d.value.date()).collect();
        prop_assert_eq!(parsed, dates);
    }

    /// Formatted transactions parse back to the same value.
    #[test]
    fn prop_format_round_trip(txn in arb_transaction()) {
        let config = FormatConfig::default();
        let text = format_directive(&Directive::Transaction(txn.clone()), &config);
        let result = parse(&text);
        prop_assert!(result.errors.is_empty(), "{:?}\n{}", result.errors, text);
        prop_assert_eq!(result.directives.len(), 1);

        let mut parsed = result.directives[0].value.clone();
        parsed.set_location(SourceLocation::default());
        prop_assert_eq!(parsed, Directive::Transaction(txn));
    }

    /// A broken line costs at most the statement it is in.
    #[test]
    fn prop_recovery_keeps_neighbours(garbage in "[A-Za-z0-9@{}|,/ ]{1,30}") {
        let source = format!(
            "2024-01-01 open Assets:Cash\n{garbage}\n2024-01-02 close Assets:Cash\n"
        );
        let result = parse(&source);
        prop_assert_eq!(result.state, EngineState::Accepted);
        let kinds: Vec<_> = result.directives.iter().map(|d| d.value.type_name()).collect();
        prop_assert_eq!(kinds.first().copied(), Some("open"));
        prop_assert_eq!(kinds.last().copied(), Some("close"));
    }
}
