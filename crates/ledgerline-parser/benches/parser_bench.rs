//! Parser performance benchmarks.
//!
//! Run with: cargo bench -p ledgerline-parser

#![allow(missing_docs)]

use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ledgerline_parser::{parse, parse_with_options, ParseOptions};

/// Generate a synthetic ledger with N transactions.
fn generate_ledger(num_transactions: usize) -> String {
    let mut lines = vec![
        "option \"title\" \"Bench\"".to_string(),
        "2024-01-01 open Assets:Bank:Checking USD".to_string(),
        "2024-01-01 open Expenses:Food USD".to_string(),
        "2024-01-01 open Expenses:Coffee USD".to_string(),
        "2024-01-01 open Expenses:Groceries USD".to_string(),
        "2024-01-01 open Expenses:Transport USD".to_string(),
        String::new(),
        "pushtag #bench".to_string(),
    ];

    let accounts = ["Food", "Coffee", "Groceries", "Transport"];
    let counterparties = ["Store A", "Store B", "Cafe", "Gas Station", "Supermarket"];
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    for (i, date) in start.iter_days().step_by(3).take(num_transactions).enumerate() {
        let account = accounts[i % accounts.len()];
        let counterparty = counterparties[i % counterparties.len()];
        let cents = 1_000 + (i * 37) % 10_000;
        let units = format!("{}.{:02}", cents / 100, cents % 100);

        lines.push(format!(
            "{date} * \"{counterparty}\" \"Transaction {i}\" ^bench-{i}"
        ));
        lines.push(format!("  Expenses:{account}  {units} USD"));
        lines.push(format!("  Assets:Bank:Checking  -{units} USD"));
        lines.push(String::new());
    }

    lines.push("poptag #bench".to_string());
    lines.join("\n")
}

/// The same ledger with every fifth transaction header broken.
fn generate_broken_ledger(num_transactions: usize) -> String {
    generate_ledger(num_transactions)
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if line.contains("\"Transaction") && i % 5 == 0 {
                line.replace(" * ", " ")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_parse_small(c: &mut Criterion) {
    let ledger = generate_ledger(10);

    let mut group = c.benchmark_group("parse_small");
    group.throughput(Throughput::Bytes(ledger.len() as u64));
    group.bench_function("10_transactions", |b| {
        b.iter(|| parse(black_box(&ledger)));
    });
    group.finish();
}

fn bench_parse_large(c: &mut Criterion) {
    let ledger = generate_ledger(1000);

    let mut group = c.benchmark_group("parse_large");
    group.throughput(Throughput::Bytes(ledger.len() as u64));
    group.bench_function("1000_transactions", |b| {
        b.iter(|| parse(black_box(&ledger)));
    });
    group.finish();
}

fn bench_parse_recovery(c: &mut Criterion) {
    let ledger = generate_broken_ledger(1000);

    let mut group = c.benchmark_group("parse_recovery");
    group.throughput(Throughput::Bytes(ledger.len() as u64));
    group.bench_function("resynchronize", |b| {
        b.iter(|| parse(black_box(&ledger)));
    });
    group.bench_function("verbose_resynchronize", |b| {
        b.iter(|| {
            let options = ParseOptions::default().with_verbose_recovery(true);
            parse_with_options(black_box(&ledger), options)
        });
    });
    group.finish();
}

fn bench_parse_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_scaling");

    for size in [10, 50, 100, 500, 1000] {
        let ledger = generate_ledger(size);
        group.throughput(Throughput::Bytes(ledger.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| parse(black_box(ledger)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_small,
    bench_parse_large,
    bench_parse_recovery,
    bench_parse_scaling
);
criterion_main!(benches);
