//! Error reporting with source context.
//!
//! Uses ariadne for pretty-printed error messages.

use ariadne::{ColorGenerator, Config, Label, Report, ReportKind, Source};
use ledgerline_parser::{ParseError, ParseErrorKind, SourceSpan};
use std::io::Write;
use std::ops::Range;
use std::path::Path;

/// Whether a diagnostic counts towards the error total. Discarded-token
/// notes from `--trace-recovery` do not.
pub const fn counts_as_error(error: &ParseError) -> bool {
    !matches!(error.kind, ParseErrorKind::DiscardedToken(_))
}

/// Character offset of a 1-based line/column position.
///
/// Positions past the end of the source clamp to its length.
pub fn char_offset(source: &str, line: u32, column: u32) -> usize {
    let mut current = (1, 1);
    for (i, ch) in source.chars().enumerate() {
        if current >= (line, column) {
            return i;
        }
        if ch == '\n' {
            current = (current.0 + 1, 1);
        } else {
            current.1 += 1;
        }
    }
    source.chars().count()
}

/// Character range covered by a span.
pub fn char_range(source: &str, span: SourceSpan) -> Range<usize> {
    let start = char_offset(source, span.first_line, span.first_column);
    let end = char_offset(source, span.last_line, span.last_column).max(start);
    start..end
}

/// Report parse errors to the given writer.
///
/// Returns the number of reported diagnostics that count as errors.
pub fn report_parse_errors<W: Write>(
    errors: &[ParseError],
    source_path: &Path,
    source: &str,
    writer: &mut W,
) -> std::io::Result<usize> {
    let path_str = source_path.display().to_string();
    let mut colors = ColorGenerator::new();
    let mut error_count = 0;

    for error in errors {
        let kind = if counts_as_error(error) {
            error_count += 1;
            ReportKind::Error
        } else {
            ReportKind::Advice
        };
        let color = colors.next();
        let range = char_range(source, error.span);

        Report::build(kind, (path_str.as_str(), range.clone()))
            .with_code(format!("P{:04}", error.kind_code()))
            .with_message(error.message())
            .with_label(
                Label::new((path_str.as_str(), range))
                    .with_message(error.label())
                    .with_color(color),
            )
            .with_config(Config::default().with_compact(false))
            .finish()
            .write((path_str.as_str(), Source::from(source)), &mut *writer)?;
    }

    Ok(error_count)
}

/// Print a summary of errors and recovery notes.
pub fn print_summary<W: Write>(errors: usize, notes: usize, writer: &mut W) -> std::io::Result<()> {
    if errors == 0 && notes == 0 {
        writeln!(writer, "\x1b[32m\u{2713}\x1b[0m No errors found")?;
        return Ok(());
    }

    let error_text = if errors == 1 { "error" } else { "errors" };
    let note_text = if notes == 1 { "note" } else { "notes" };
    if errors > 0 && notes > 0 {
        writeln!(
            writer,
            "\x1b[31m\u{2717}\x1b[0m {errors} {error_text}, {notes} {note_text}"
        )
    } else if errors > 0 {
        writeln!(writer, "\x1b[31m\u{2717}\x1b[0m {errors} {error_text}")
    } else {
        writeln!(writer, "\x1b[33m\u{26A0}\x1b[0m {notes} {note_text}")
    }
}
