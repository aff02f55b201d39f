//! Implementation of the ledgerline-check command.

use crate::report;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ledgerline_core::{format_directive, FormatConfig};
use ledgerline_parser::{
    parse_with_options, EngineState, ParseError, ParseOptions, Recovery, DEFAULT_MAX_DEPTH,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for IDE/tooling integration
    Json,
}

/// A diagnostic message in JSON format.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// Source file path
    pub file: String,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
    /// End line number (1-based)
    pub end_line: u32,
    /// End column number (1-based, exclusive)
    pub end_column: u32,
    /// Severity: "error" or "note"
    pub severity: String,
    /// Error code (e.g., "P0001")
    pub code: String,
    /// Error message
    pub message: String,
    /// Short label for the span
    pub label: String,
}

/// JSON output structure for all diagnostics.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// List of diagnostics
    pub diagnostics: Vec<JsonDiagnostic>,
    /// Total error count
    pub error_count: usize,
    /// Number of directives accepted
    pub directive_count: usize,
    /// Whether parsing stopped before the end of the file
    pub aborted: bool,
}

/// Parse a ledger file and report syntax errors.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The ledger file to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Show verbose output including timing information and parser logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the accepted directives as formatted ledger text
    #[arg(short, long)]
    pub print: bool,

    /// Column at which printed amounts are aligned
    #[arg(long, value_name = "COLUMN", default_value_t = 60)]
    pub column: usize,

    /// Stop at the first error instead of skipping to the next statement
    #[arg(long)]
    pub strict: bool,

    /// Maximum nesting depth of the parser
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Also report every token discarded during error recovery
    #[arg(long)]
    pub trace_recovery: bool,
}

impl Args {
    /// Parser options selected by the flags.
    pub fn parse_options(&self) -> ParseOptions {
        let recovery = if self.strict {
            Recovery::Abort
        } else {
            Recovery::Resynchronize
        };
        ParseOptions::default()
            .with_filename(self.file.display().to_string())
            .with_max_depth(self.max_depth)
            .with_recovery(recovery)
            .with_verbose_recovery(self.trace_recovery)
    }
}

/// Convert parse errors to JSON diagnostics.
pub fn json_diagnostics(file: &str, errors: &[ParseError]) -> Vec<JsonDiagnostic> {
    errors
        .iter()
        .map(|error| JsonDiagnostic {
            file: file.to_string(),
            line: error.span.first_line,
            column: error.span.first_column,
            end_line: error.span.last_line,
            end_column: error.span.last_column,
            severity: if report::counts_as_error(error) {
                "error"
            } else {
                "note"
            }
            .to_string(),
            code: format!("P{:04}", error.kind_code()),
            message: error.message(),
            label: error.label().to_string(),
        })
        .collect()
}

fn run(args: &Args) -> Result<ExitCode> {
    let start = std::time::Instant::now();
    let file = &args.file;

    if !file.exists() {
        anyhow::bail!("file not found: {}", file.display());
    }
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    if args.verbose && !args.quiet {
        eprintln!("Parsing {}...", file.display());
    }
    let result = parse_with_options(&source, args.parse_options());
    let aborted = result.state == EngineState::Aborted;
    let error_count = result
        .errors
        .iter()
        .filter(|e| report::counts_as_error(e))
        .count();
    let note_count = result.errors.len() - error_count;

    if args.format == OutputFormat::Json {
        let output = JsonOutput {
            diagnostics: json_diagnostics(&file.display().to_string(), &result.errors),
            error_count,
            directive_count: result.directives.len(),
            aborted,
        };
        writeln!(io::stdout(), "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        if args.print {
            let config = FormatConfig::with_column(args.column);
            let mut stdout = io::stdout().lock();
            for directive in &result.directives {
                write!(stdout, "{}", format_directive(&directive.value, &config))?;
            }
            stdout.flush()?;
        }

        if !args.quiet {
            // Keep stdout clean for the printed ledger.
            let mut out: Box<dyn Write> = if args.print {
                Box::new(io::stderr())
            } else {
                Box::new(io::stdout())
            };
            report::report_parse_errors(&result.errors, file, &source, &mut out)?;
            if args.verbose {
                writeln!(
                    out,
                    "\nParsed {} directives in {:.2}ms{}",
                    result.directives.len(),
                    start.elapsed().as_secs_f64() * 1000.0,
                    if aborted { " (aborted)" } else { "" }
                )?;
            }
            report::print_summary(error_count, note_count, &mut out)?;
        }
    }

    if error_count > 0 || aborted {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Main entry point for the check command.
pub fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        let level = if args.trace_recovery {
            Level::TRACE
        } else {
            Level::DEBUG
        };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(format!("ledgerline_parser={level}"))),
            )
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .init();
    }

    match run(&args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_select_parse_options() {
        let args = Args::try_parse_from([
            "ledgerline-check",
            "--strict",
            "--max-depth",
            "32",
            "--trace-recovery",
            "books.ledger",
        ])
        .unwrap();
        let options = args.parse_options();
        assert_eq!(options.recovery, Recovery::Abort);
        assert_eq!(options.max_depth, 32);
        assert!(options.verbose_recovery);
        assert_eq!(options.filename, "books.ledger");
    }

    #[test]
    fn test_default_flags() {
        let args = Args::try_parse_from(["ledgerline-check", "books.ledger"]).unwrap();
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.column, 60);
        let options = args.parse_options();
        assert_eq!(options.recovery, Recovery::Resynchronize);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!options.verbose_recovery);
    }

    #[test]
    fn test_json_diagnostics() {
        let options = ParseOptions::default().with_verbose_recovery(true);
        let result = parse_with_options("2024-01-01 close\n", options);
        let diagnostics = json_diagnostics("books.ledger", &result.errors);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].severity, "error");
        assert_eq!(diagnostics[0].code, "P0001");
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 17));
        assert_eq!(diagnostics[1].severity, "note");
        assert_eq!(diagnostics[1].code, "P0005");

        let json = serde_json::to_value(&diagnostics[0]).unwrap();
        assert_eq!(json["message"], "syntax error, unexpected EOL, expecting ACCOUNT");
        assert_eq!(json["file"], "books.ledger");
    }
}
