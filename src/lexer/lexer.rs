use super::token::{SimpleKind, Span, Token};

/// Which bytes may make up an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordClass {
    /// ASCII letters, `.`, `-` and `"`.
    #[default]
    Strict,
    /// `Strict` plus digits, `/`, `_`, `~`, `+`, `,`, `:`, `=`, `%` and `@`.
    PathFriendly,
}

impl WordClass {
    pub fn admits(&self, b: u8) -> bool {
        let strict = b.is_ascii_alphabetic() || matches!(b, b'.' | b'-' | b'"');
        match self {
            WordClass::Strict => strict,
            WordClass::PathFriendly => {
                strict
                    || b.is_ascii_digit()
                    || matches!(b, b'/' | b'_' | b'~' | b'+' | b',' | b':' | b'=' | b'%' | b'@')
            }
        }
    }
}

// isspace() in the C locale, which also counts vertical tab.
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Classify the lexeme at `offset` using the strict identifier class.
///
/// Returns the token and the offset just past it. At end of buffer the
/// offset is returned unchanged.
pub fn next_token(input: &str, offset: usize) -> (Token, usize) {
    next_token_with(input, offset, WordClass::Strict)
}

pub fn next_token_with(input: &str, offset: usize, class: WordClass) -> (Token, usize) {
    let bytes = input.as_bytes();
    let mut pos = offset;

    while pos < bytes.len() && is_space(bytes[pos]) {
        pos += 1;
    }
    if pos >= bytes.len() {
        return (Token::Simple(SimpleKind::EndOfLine), pos);
    }

    let start = pos;
    let ch = bytes[pos];

    if class.admits(ch) {
        while pos < bytes.len() && class.admits(bytes[pos]) {
            pos += 1;
        }
        return (Token::Identifier(Span::new(start, pos)), pos);
    }

    let simple = match ch {
        b'|' => Some(SimpleKind::Pipe),
        b'&' => Some(SimpleKind::Background),
        b'<' => Some(SimpleKind::RedirectIn),
        b'>' => Some(SimpleKind::RedirectOut),
        _ => None,
    };
    if let Some(kind) = simple {
        return (Token::Simple(kind), pos + 1);
    }

    while pos < bytes.len() && !is_space(bytes[pos]) {
        pos += 1;
    }
    (Token::Unclassified(Span::new(start, pos)), pos)
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    class: WordClass,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            class: WordClass::Strict,
        }
    }

    pub fn with_class(input: &'a str, class: WordClass) -> Self {
        Lexer { input, pos: 0, class }
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.pos = offset;
        self
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn next_token(&mut self) -> Token {
        let (token, next) = next_token_with(self.input, self.pos, self.class);
        self.pos = next;
        token
    }

    /// Start offset of the token that `next_token` would return.
    pub fn peek_start(&self) -> usize {
        let bytes = self.input.as_bytes();
        let mut pos = self.pos;
        while pos < bytes.len() && is_space(bytes[pos]) {
            pos += 1;
        }
        pos
    }

    /// Every token up to and including `EndOfLine`.
    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            tokens.push(token);
            if token.is_end() {
                break;
            }
        }
        tokens
    }
}
