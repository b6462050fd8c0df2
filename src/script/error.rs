//! Error types for parsing and running edit scripts

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::editor::EditorError;

use super::lexer::{Span, Token};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                render_report(
                    source,
                    filename,
                    span,
                    message,
                    &format!("{}{}", message, expected_str),
                )
            }
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => match tok.keyword() {
                    Some(word) => format!(
                        "Cannot use '{}' as an id - it's a keyword, quote it instead",
                        word
                    ),
                    None => format!("Unexpected {}", format_token(tok)),
                },
                None => "Unexpected end of input".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();

        // End-of-input errors can arrive with start past end
        let span = err.span().into_range();
        ParseError::Syntax {
            span: span.start.min(span.end)..span.start.max(span.end),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("id '{}'", s),
        Token::String(s) => format!("string \"{}\"", s),
        Token::Arrow => "'->'".to_string(),
        Token::ArrowBoth => "'<->'".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        other => match other.keyword() {
            Some(word) => format!("keyword '{}'", word),
            None => format!("{:?}", other),
        },
    }
}

fn render_report(source: &str, filename: &str, span: &Span, message: &str, label: &str) -> String {
    let len = source.chars().count();
    let start = span.start.min(span.end).min(len);
    let span = start..span.start.max(span.end).min(len).max(start);
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);
    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{filename}:{start}: {message}"),
    }
}

/// Errors from running a script
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("{}", .0.first().map(ToString::to_string).unwrap_or_else(|| "parse error".to_string()))]
    Parse(Vec<ParseError>),

    /// A command was rejected; commands before it stay applied
    #[error("{command} failed: {source}")]
    Command {
        command: &'static str,
        span: Span,
        source: EditorError,
    },
}

impl ScriptError {
    /// Format every error against the script source using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ScriptError::Parse(errors) => errors
                .iter()
                .map(|err| err.format(source, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            ScriptError::Command {
                command,
                span,
                source: err,
            } => render_report(
                source,
                filename,
                span,
                &format!("'{}' was rejected", command),
                &err.to_string(),
            ),
        }
    }
}
