//! Diagnostic reporting infrastructure.
//!
//! Every phase of the pipeline shares one [`ErrorReporter`], which accumulates
//! severity-tagged, location-tagged diagnostics in discovery order. Reporting
//! is additive and never fails; only the driver decides what to do with a
//! non-zero error count.
//!
//! Rendering is separate: [`DiagnosticEmitter`] pretty-prints collected
//! diagnostics to stderr with the offending source line and a caret.
//!
//! # Error codes
//!
//! Codes are optional and grouped by phase:
//!
//! - **L0xx**: lexical errors
//! - **P1xx**: syntax errors
//! - **T3xx**: type errors

use crate::span::{LineIndex, SourceLocation};
use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal; the pipeline result becomes failure.
    Error,
    /// Suspicious but not fatal.
    Warning,
    /// Informational.
    Info,
}

impl Severity {
    /// Lowercase name used in rendered output.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    fn report_kind(self) -> ReportKind<'static> {
        match self {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        }
    }

    fn color(self) -> Color {
        match self {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Blue,
        }
    }
}

/// A single collected diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: SourceLocation,
    pub message: String,
    /// Optional diagnostic code, e.g. `"T301"`.
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn error(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location,
            message: message.into(),
            code: None,
        }
    }

    pub fn warning(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location,
            message: message.into(),
            code: None,
        }
    }

    pub fn info(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            location,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Accumulates diagnostics across the whole pipeline.
///
/// The reporter never raises; it records and counts. Severity `Error`
/// increments the error count, warnings and infos do not.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.report(Diagnostic::error(location, message));
    }

    /// Record an error with a diagnostic code.
    pub fn error_with_code(
        &mut self,
        location: SourceLocation,
        message: impl Into<String>,
        code: &str,
    ) {
        self.report(Diagnostic::error(location, message).with_code(code));
    }

    /// Record a warning.
    pub fn warning(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.report(Diagnostic::warning(location, message));
    }

    /// Record an informational message.
    pub fn info(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.report(Diagnostic::info(location, message));
    }

    /// Record a prebuilt diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Drop all collected diagnostics and reset the error count.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
    }

    /// Whether any `Error`-severity diagnostic has been recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Number of `Error`-severity diagnostics recorded.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// All diagnostics in discovery order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Pretty-prints diagnostics to stderr.
///
/// Output carries the `filename:line:column` header, the severity in its
/// colour (red/yellow/blue), the optional code, the message, the offending
/// source line, and a caret under the column.
pub struct DiagnosticEmitter<'a> {
    filename: &'a str,
    source: &'a str,
    line_index: LineIndex,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(filename: &'a str, source: &'a str) -> Self {
        Self {
            filename,
            source,
            line_index: LineIndex::new(source),
        }
    }

    /// Emit a single diagnostic to stderr.
    pub fn emit(&self, diagnostic: &Diagnostic) {
        let offset = self
            .line_index
            .offset(diagnostic.location.line, diagnostic.location.column)
            .unwrap_or(0)
            .min(self.source.len());
        let end = (offset + 1).min(self.source.len()).max(offset);

        let message = match &diagnostic.code {
            Some(code) => format!("[{}] {}", code, diagnostic.message),
            None => diagnostic.message.clone(),
        };

        let report = Report::build(diagnostic.severity.report_kind(), self.filename, offset)
            .with_message(&message)
            .with_label(
                Label::new((self.filename, offset..end))
                    .with_color(diagnostic.severity.color())
                    .with_message(&diagnostic.message),
            )
            .finish();

        let _ = report.eprint((self.filename, Source::from(self.source)));
    }

    /// Emit every diagnostic the reporter collected.
    pub fn emit_all(&self, reporter: &ErrorReporter) {
        for diagnostic in reporter.diagnostics() {
            self.emit(diagnostic);
        }
    }
}

/// Failures of the compiler driver itself, before the pipeline runs.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("file must have .tspp extension: {0}")]
    BadExtension(String),

    #[error("file does not exist: {0}")]
    NotFound(String),

    #[error("could not read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn loc(line: u32, column: u32) -> SourceLocation {
        SourceLocation::new(Arc::from("test.tspp"), line, column)
    }

    #[test]
    fn only_errors_count() {
        let mut reporter = ErrorReporter::new();
        reporter.warning(loc(1, 1), "odd");
        reporter.info(loc(1, 2), "fyi");
        assert!(!reporter.has_errors());
        assert_eq!(reporter.error_count(), 0);

        reporter.error(loc(2, 1), "bad");
        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.diagnostics().len(), 3);
    }

    #[test]
    fn clear_resets_state() {
        let mut reporter = ErrorReporter::new();
        reporter.error(loc(1, 1), "bad");
        reporter.clear();
        assert!(!reporter.has_errors());
        assert!(reporter.diagnostics().is_empty());
    }

    #[test]
    fn diagnostics_keep_discovery_order() {
        let mut reporter = ErrorReporter::new();
        reporter.error(loc(3, 1), "first");
        reporter.error(loc(1, 1), "second");
        let messages: Vec<_> = reporter
            .diagnostics()
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn codes_attach_to_diagnostics() {
        let mut reporter = ErrorReporter::new();
        reporter.error_with_code(loc(1, 1), "bad cast", "T305");
        assert_eq!(reporter.diagnostics()[0].code.as_deref(), Some("T305"));
    }
}
