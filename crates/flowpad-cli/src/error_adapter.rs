//! Turns a [`FlowpadError`] into miette reports.
//!
//! A malformed import file yields one report per parser diagnostic, each
//! pointing into the file's text. Every other error becomes a single report
//! with a `flowpad::*` code.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use flowpad::{FlowpadError, export::ExportError};
use flowpad_parser::error::Diagnostic;

/// Report for one relaxed-JSON diagnostic.
pub struct ImportDiagnostic<'a> {
    diag: &'a Diagnostic,
    /// Text of the file the diagnostic points into
    src: &'a str,
}

impl<'a> ImportDiagnostic<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for ImportDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.diag, f)
    }
}

impl fmt::Display for ImportDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl std::error::Error for ImportDiagnostic<'_> {}

impl MietteDiagnostic for ImportDiagnostic<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = self.diag.code()?;
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = self.diag.help()?;
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = SourceSpan::new(label.span().start().into(), label.span().len());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Report for an error without a source location.
pub struct ErrorReport<'a>(&'a FlowpadError);

impl fmt::Debug for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl std::error::Error for ErrorReport<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorReport<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            FlowpadError::Io(_) => "flowpad::io",
            FlowpadError::Parse { .. } => "flowpad::parse",
            FlowpadError::Decode(_) => "flowpad::decode",
            FlowpadError::Layout(_) => "flowpad::layout",
            FlowpadError::Storage(_) => "flowpad::storage",
            FlowpadError::Export(_) => "flowpad::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            FlowpadError::Decode(_) => {
                "import files hold an array of objects whose fields have the expected types"
            }
            FlowpadError::Storage(_) => {
                "check `[storage] path` in the configuration, or remove the damaged file"
            }
            FlowpadError::Export(ExportError::Sankey(_)) => {
                "Sankey documents hold parallel `node` and `link` arrays; \
                 link sources and targets are indices into the nodes"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// Splits `err` into the reports to print, in order.
pub fn to_reports(err: &FlowpadError) -> Vec<Box<dyn MietteDiagnostic + '_>> {
    match err {
        FlowpadError::Parse { err: parse_err, src } if !parse_err.diagnostics().is_empty() => {
            parse_err
                .diagnostics()
                .iter()
                .map(|diag| {
                    Box::new(ImportDiagnostic::new(diag, src)) as Box<dyn MietteDiagnostic>
                })
                .collect()
        }
        _ => vec![Box::new(ErrorReport(err))],
    }
}
