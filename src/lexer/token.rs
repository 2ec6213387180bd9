use std::fmt;

/// Byte range `[start, end)` into the line being parsed.
///
/// A span never owns the text it names; resolve it against the same buffer
/// it was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleKind {
    EndOfLine,   // end of buffer
    Pipe,        // |
    Background,  // &
    RedirectIn,  // <
    RedirectOut, // >
}

impl SimpleKind {
    pub fn lexeme(&self) -> &'static str {
        match self {
            SimpleKind::EndOfLine => "End of input",
            SimpleKind::Pipe => "|",
            SimpleKind::Background => "&",
            SimpleKind::RedirectIn => "<",
            SimpleKind::RedirectOut => ">",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Simple(SimpleKind),
    Identifier(Span),
    Unclassified(Span),
}

impl Token {
    pub fn is_end(&self) -> bool {
        matches!(self, Token::Simple(SimpleKind::EndOfLine))
    }

    /// Text as it should appear in a diagnostic.
    pub fn display<'a>(&self, input: &'a str) -> TokenDisplay<'a> {
        TokenDisplay { token: *self, input }
    }
}

pub struct TokenDisplay<'a> {
    token: Token,
    input: &'a str,
}

impl fmt::Display for TokenDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token {
            Token::Simple(kind) => f.write_str(kind.lexeme()),
            Token::Identifier(span) | Token::Unclassified(span) => {
                f.write_str(span.text(self.input))
            }
        }
    }
}
