pub mod default;

use thiserror::Error;
use crate::ast::{Command, Pipeline};

pub use default::{DefaultParser, parse_command, parse_pipeline};

pub trait Parser {
    fn parse(&mut self) -> ParsedLine;
}

/// Diagnostics are positioned at the start offset of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("<{pos}>: Unexpected token: \"{found}\"")]
    UnexpectedToken { pos: usize, found: String },
    #[error("<{pos}>: Expected file name after '{op}'. Instead, got: \"{found}\"")]
    MissingRedirectTarget {
        op: &'static str,
        pos: usize,
        found: String,
    },
    #[error("<{pos}>: Too many arguments (at most {capacity}): \"{found}\"")]
    TooManyArguments {
        capacity: usize,
        pos: usize,
        found: String,
    },
}

impl ParseError {
    pub fn pos(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::MissingRedirectTarget { pos, .. }
            | ParseError::TooManyArguments { pos, .. } => *pos,
        }
    }
}

/// Result of parsing one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageParse {
    pub command: Command,
    /// Offset just past the last token consumed.
    pub next: usize,
    pub diagnostics: Vec<ParseError>,
}

/// Result of parsing a whole line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLine {
    pub pipeline: Pipeline,
    pub diagnostics: Vec<ParseError>,
    pub end: usize,
}

impl ParsedLine {
    /// Only a line whose every stage is valid may be executed.
    pub fn is_runnable(&self) -> bool {
        self.pipeline.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_format() {
        let err = ParseError::MissingRedirectTarget {
            op: ">",
            pos: 5,
            found: "End of input".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "<5>: Expected file name after '>'. Instead, got: \"End of input\""
        );
        assert_eq!(err.pos(), 5);

        let err = ParseError::UnexpectedToken { pos: 3, found: "$x".to_string() };
        assert_eq!(err.to_string(), "<3>: Unexpected token: \"$x\"");
    }
}
