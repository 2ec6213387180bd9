use crate::ast::ARG_CAPACITY;
use crate::lexer::WordClass;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub word_class: WordClass,
    pub arg_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: ">>> ".to_string(),
            word_class: WordClass::PathFriendly,
            arg_capacity: ARG_CAPACITY,
        }
    }
}

impl Config {
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_word_class(mut self, class: WordClass) -> Self {
        self.word_class = class;
        self
    }

    pub fn with_arg_capacity(mut self, capacity: usize) -> Self {
        self.arg_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prompt, ">>> ");
        assert_eq!(config.word_class, WordClass::PathFriendly);
        assert_eq!(config.arg_capacity, 32);
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_prompt("$ ")
            .with_word_class(WordClass::Strict)
            .with_arg_capacity(4);
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.word_class, WordClass::Strict);
        assert_eq!(config.arg_capacity, 4);
    }
}
