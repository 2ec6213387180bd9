mod lexer;
mod token;

pub use lexer::{Lexer, WordClass, next_token, next_token_with};
pub use token::{SimpleKind, Span, Token, TokenDisplay};
