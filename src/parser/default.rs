use crate::ast::{ARG_CAPACITY, Command, Pipeline};
use crate::lexer::{Lexer, SimpleKind, Token, WordClass};
use crate::parser::{ParseError, ParsedLine, Parser, StageParse};
use tracing::trace;

pub struct DefaultParser<'a> {
    lexer: Lexer<'a>,
    capacity: usize,
}

impl<'a> DefaultParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            capacity: ARG_CAPACITY,
        }
    }

    pub fn with_class(input: &'a str, class: WordClass) -> Self {
        Self {
            lexer: Lexer::with_class(input, class),
            capacity: ARG_CAPACITY,
        }
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.lexer = self.lexer.at(offset);
        self
    }

    pub fn pos(&self) -> usize {
        self.lexer.pos()
    }

    /// Consume tokens for one stage, stopping after a `|` or at end of line.
    pub fn parse_command(&mut self) -> StageParse {
        let input = self.lexer.input();
        let mut command = Command::new();
        let mut diagnostics = Vec::new();
        let mut overflowed = false;

        loop {
            let start = self.lexer.peek_start();
            match self.lexer.next_token() {
                Token::Simple(SimpleKind::EndOfLine) => break,
                Token::Simple(SimpleKind::Pipe) => {
                    command.set_pipe_out();
                    break;
                }
                Token::Simple(SimpleKind::Background) => command.set_background(),
                Token::Simple(op @ (SimpleKind::RedirectIn | SimpleKind::RedirectOut)) => {
                    let target_start = self.lexer.peek_start();
                    match self.lexer.next_token() {
                        Token::Identifier(path) if op == SimpleKind::RedirectIn => {
                            command.set_redirect_in(path)
                        }
                        Token::Identifier(path) => command.set_redirect_out(path),
                        other => {
                            diagnostics.push(ParseError::MissingRedirectTarget {
                                op: op.lexeme(),
                                pos: target_start,
                                found: other.display(input).to_string(),
                            });
                            command.mark_invalid();
                            if !other.is_end() {
                                self.skip_line();
                            }
                            break;
                        }
                    }
                }
                Token::Identifier(span) => {
                    if command.args().len() < self.capacity {
                        command.push_arg(span);
                    } else if !overflowed {
                        overflowed = true;
                        command.mark_invalid();
                        diagnostics.push(ParseError::TooManyArguments {
                            capacity: self.capacity,
                            pos: start,
                            found: span.text(input).to_string(),
                        });
                    }
                }
                Token::Unclassified(span) => {
                    diagnostics.push(ParseError::UnexpectedToken {
                        pos: start,
                        found: span.text(input).to_string(),
                    });
                }
            }
        }

        trace!(
            args = command.args().len(),
            flags = ?command.flags(),
            next = self.lexer.pos(),
            "parsed stage"
        );
        StageParse {
            command,
            next: self.lexer.pos(),
            diagnostics,
        }
    }

    /// Parse stages until one is not terminated by `|`.
    pub fn parse_pipeline(&mut self) -> ParsedLine {
        let mut pipeline = Pipeline::default();
        let mut diagnostics = Vec::new();
        loop {
            let stage = self.parse_command();
            diagnostics.extend(stage.diagnostics);
            let more = stage.command.pipes_out();
            pipeline.stages.push(stage.command);
            if !more {
                break;
            }
        }
        ParsedLine {
            pipeline,
            diagnostics,
            end: self.lexer.pos(),
        }
    }

    // Drain the rest of the line after an unrecoverable error.
    fn skip_line(&mut self) {
        while !self.lexer.next_token().is_end() {}
    }
}

impl Parser for DefaultParser<'_> {
    fn parse(&mut self) -> ParsedLine {
        self.parse_pipeline()
    }
}

/// Parse one stage starting at `offset` with the strict identifier class.
pub fn parse_command(input: &str, offset: usize) -> StageParse {
    DefaultParser::new(input).at(offset).parse_command()
}

pub fn parse_pipeline(input: &str) -> ParsedLine {
    DefaultParser::new(input).parse_pipeline()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CommandFlags;
    use crate::lexer::Span;

    #[test]
    fn test_simple_command() {
        let input = "echo hello";
        let stage = parse_command(input, 0);
        assert_eq!(stage.command.arg_texts(input), vec!["echo", "hello"]);
        assert_eq!(stage.command.flags(), CommandFlags::empty());
        assert!(stage.diagnostics.is_empty());
        assert_eq!(stage.next, input.len());
    }

    #[test]
    fn test_whitespace_only() {
        for input in ["", " ", "\t\t", "   \n", " \x0b "] {
            let stage = parse_command(input, 0);
            assert!(stage.command.is_empty());
            assert_eq!(stage.command.flags(), CommandFlags::empty());
            assert_eq!(stage.next, input.len());
            assert!(stage.diagnostics.is_empty());
        }
    }

    #[test]
    fn test_redirect_before_program() {
        let input = "< file.txt cat";
        let stage = parse_command(input, 0);
        assert!(stage.command.flags().contains(CommandFlags::REDIRECT_IN));
        assert_eq!(stage.command.redirect_in().map(|s| s.text(input)), Some("file.txt"));
        assert_eq!(stage.command.arg_texts(input), vec!["cat"]);
        assert!(stage.command.is_valid());
    }

    #[test]
    fn test_redirect_without_target() {
        let input = "cmd >";
        let stage = parse_command(input, 0);
        assert_eq!(stage.diagnostics.len(), 1);
        assert!(matches!(
            stage.diagnostics[0],
            ParseError::MissingRedirectTarget { op: ">", pos: 5, .. }
        ));
        assert!(!stage.command.is_valid());
        assert_eq!(stage.next, input.len());
    }

    #[test]
    fn test_redirect_error_abandons_line() {
        let input = "cat < | wc -l";
        let line = parse_pipeline(input);
        assert_eq!(line.diagnostics.len(), 1);
        assert_eq!(line.pipeline.len(), 1);
        assert!(!line.is_runnable());
        assert_eq!(line.end, input.len());
        assert_eq!(
            line.diagnostics[0].to_string(),
            "<6>: Expected file name after '<'. Instead, got: \"|\""
        );
    }

    #[test]
    fn test_pipe_ends_stage() {
        let input = "ls -la | grep foo";
        let first = parse_command(input, 0);
        assert!(first.command.pipes_out());
        assert_eq!(first.command.arg_texts(input), vec!["ls", "-la"]);
        assert_eq!(first.next, 8);

        let second = parse_command(input, first.next);
        assert!(!second.command.pipes_out());
        assert_eq!(second.command.arg_texts(input), vec!["grep", "foo"]);
        assert_eq!(second.next, input.len());
    }

    #[test]
    fn test_background_keeps_scanning() {
        let input = "sleep & now";
        let stage = parse_command(input, 0);
        assert!(stage.command.is_background());
        assert_eq!(stage.command.arg_texts(input), vec!["sleep", "now"]);
    }

    #[test]
    fn test_pipe_after_background_ends_stage() {
        let input = "sleep & | cat";
        let line = parse_pipeline(input);
        assert!(line.diagnostics.is_empty());
        assert_eq!(line.pipeline.len(), 2);

        let first = &line.pipeline.stages[0];
        assert!(first.is_background());
        assert!(first.pipes_out());
        assert_eq!(first.arg_texts(input), vec!["sleep"]);

        let second = &line.pipeline.stages[1];
        assert!(!second.is_background());
        assert_eq!(second.arg_texts(input), vec!["cat"]);
    }

    #[test]
    fn test_unclassified_is_reported_and_skipped() {
        let input = "echo $HOME there";
        let stage = parse_command(input, 0);
        assert_eq!(stage.command.arg_texts(input), vec!["echo", "there"]);
        assert_eq!(
            stage.diagnostics,
            vec![ParseError::UnexpectedToken { pos: 5, found: "$HOME".to_string() }]
        );
        assert!(stage.command.is_valid());
    }

    #[test]
    fn test_argument_overflow() {
        let words = vec!["a"; ARG_CAPACITY + 3].join(" ");
        let input = format!("{} | wc", words);
        let line = parse_pipeline(&input);
        assert_eq!(line.diagnostics.len(), 1);
        assert!(matches!(
            line.diagnostics[0],
            ParseError::TooManyArguments { capacity: ARG_CAPACITY, .. }
        ));
        assert_eq!(line.pipeline.stages[0].args().len(), ARG_CAPACITY);
        assert!(!line.pipeline.stages[0].is_valid());
        // scanning resumed at the next stage
        assert_eq!(line.pipeline.stages[1].arg_texts(&input), vec!["wc"]);
        assert!(!line.is_runnable());
    }

    #[test]
    fn test_custom_capacity() {
        let input = "a b c";
        let stage = DefaultParser::new(input).capacity(2).parse_command();
        assert_eq!(stage.command.args(), &[Span::new(0, 1), Span::new(2, 3)]);
        assert!(matches!(
            stage.diagnostics[0],
            ParseError::TooManyArguments { capacity: 2, pos: 4, .. }
        ));
    }

    #[test]
    fn test_full_pipeline() {
        let input = "cat < in.txt | grep -v foo | wc > out.txt &";
        let line = DefaultParser::new(input).parse();
        assert!(line.diagnostics.is_empty());
        let stages = &line.pipeline.stages;
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].redirect_in().map(|s| s.text(input)), Some("in.txt"));
        assert!(stages[0].pipes_out());
        assert_eq!(stages[1].arg_texts(input), vec!["grep", "-v", "foo"]);
        assert!(stages[1].pipes_out());
        assert_eq!(stages[2].redirect_out().map(|s| s.text(input)), Some("out.txt"));
        assert!(stages[2].is_background());
        assert!(!stages[2].pipes_out());
        assert_eq!(line.end, input.len());
    }

    #[test]
    fn test_path_friendly_parser() {
        let input = "cd /tmp";
        let stage = DefaultParser::with_class(input, WordClass::PathFriendly).parse_command();
        assert_eq!(stage.command.arg_texts(input), vec!["cd", "/tmp"]);
        assert!(stage.diagnostics.is_empty());

        let strict = parse_command(input, 0);
        assert_eq!(strict.command.arg_texts(input), vec!["cd"]);
        assert_eq!(strict.diagnostics.len(), 1);
    }
}
