//! Property-based tests for ledgerline-core.
//!
//! Run with: cargo test -p ledgerline-core --test `property_tests`

use chrono::NaiveDate;
use ledgerline_core::{escape_string, format_posting, Amount, FormatConfig, Position, Posting};
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
        Just("HOOL".to_string()),
        Just("BTC".to_string()),
    ]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2030i32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Escaped text never contains a bare quote or a raw line break.
    #[test]
    fn escaped_strings_stay_on_one_line(text in ".*") {
        let escaped = escape_string(&text);
        prop_assert!(!escaped.contains('\n'));
        prop_assert!(!escaped.contains('\r'));

        let mut backslashes = 0usize;
        for c in escaped.chars() {
            if c == '"' {
                prop_assert!(backslashes % 2 == 1, "unescaped quote in {escaped:?}");
            }
            backslashes = if c == '\\' { backslashes + 1 } else { 0 };
        }
    }

    /// A posting line always contains its account and the full units text.
    #[test]
    fn posting_line_contains_units(number in arb_decimal(), currency in arb_currency(), column in 0usize..80) {
        let units = Amount::new(number, currency);
        let posting = Posting::new("Assets:Cash", Position::simple(units.clone()));
        let line = format_posting(&posting, &FormatConfig::with_column(column));

        prop_assert!(line.starts_with("  Assets:Cash  "));
        prop_assert!(line.ends_with(&units.to_string()));
    }

    /// Dates print in the ISO form the lexer reads back.
    #[test]
    fn dates_print_as_iso(date in arb_date()) {
        let text = date.to_string();
        prop_assert_eq!(text.len(), 10);
        prop_assert_eq!(NaiveDate::parse_from_str(&text, "%Y-%m-%d").unwrap(), date);
    }
}
