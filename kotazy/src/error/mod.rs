//! Error types and reporting

use crate::ast::Span;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error surfaced to the host
#[derive(Debug, Error)]
pub enum Error {
    /// Source or expression text that does not match the grammar.
    /// Execution never starts.
    #[error("Syntax error at {span}: {message}")]
    Syntax { message: String, span: Span },

    /// Failure while executing a block or evaluating an expression
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { span, .. } => Some(*span),
            Self::Runtime(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Syntax { message, .. } => message,
            Self::Runtime(err) => &err.message,
        }
    }

    /// The runtime error, if this is one
    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            Self::Runtime(err) => Some(err),
            Self::Syntax { .. } => None,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

/// Map a LALRPOP failure onto a syntax error with the offending span
pub(crate) fn from_parse_error<T, E>(err: lalrpop_util::ParseError<usize, T, E>, source_len: usize) -> Error
where
    T: std::fmt::Display,
    E: std::fmt::Display,
{
    use lalrpop_util::ParseError;

    let span = match &err {
        ParseError::InvalidToken { location } => Span::new(*location, *location + 1),
        ParseError::UnrecognizedEof { location, .. } => {
            let at = (*location).min(source_len);
            Span::new(at, at)
        }
        ParseError::UnrecognizedToken { token, .. } => Span::new(token.0, token.2),
        ParseError::ExtraToken { token } => Span::new(token.0, token.2),
        ParseError::User { .. } => Span::new(0, 0),
    };
    Error::syntax(err.to_string(), span)
}

/// Report an error with ariadne
pub fn report_error(filename: &str, source: &str, error: &Error) -> std::io::Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};
    use std::ops::Range;

    let kind = match error {
        Error::Syntax { .. } => "Syntax".to_string(),
        Error::Runtime(err) => format!("{:?}", err.kind),
    };

    match error.span() {
        Some(span) => Report::build(ReportKind::Error, (filename, Range::from(span)))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, Range::from(span)))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source))),
        None => Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
            .eprint((filename, Source::from(source))),
    }
}
