use bitflags::bitflags;
use crate::lexer::Span;

/// Default bound on the argument list of one stage (program name included).
pub const ARG_CAPACITY: usize = 32;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CommandFlags: u8 {
        const PIPE_OUT = 0b1000;
        const BACKGROUND = 0b0100;
        const REDIRECT_IN = 0b0010;
        const REDIRECT_OUT = 0b0001;
    }
}

/// One pipeline stage. Every span refers to the line it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    args: Vec<Span>,
    flags: CommandFlags,
    redirect_in: Option<Span>,
    redirect_out: Option<Span>,
    invalid: bool,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn args(&self) -> &[Span] {
        &self.args
    }

    pub fn arg_texts<'a>(&self, input: &'a str) -> Vec<&'a str> {
        self.args.iter().map(|s| s.text(input)).collect()
    }

    pub fn program<'a>(&self, input: &'a str) -> Option<&'a str> {
        self.args.first().map(|s| s.text(input))
    }

    pub fn push_arg(&mut self, span: Span) {
        self.args.push(span);
    }

    pub fn flags(&self) -> CommandFlags {
        self.flags
    }

    pub fn set_pipe_out(&mut self) {
        self.flags.insert(CommandFlags::PIPE_OUT);
    }

    pub fn set_background(&mut self) {
        self.flags.insert(CommandFlags::BACKGROUND);
    }

    pub fn set_redirect_in(&mut self, path: Span) {
        self.flags.insert(CommandFlags::REDIRECT_IN);
        self.redirect_in = Some(path);
    }

    pub fn set_redirect_out(&mut self, path: Span) {
        self.flags.insert(CommandFlags::REDIRECT_OUT);
        self.redirect_out = Some(path);
    }

    pub fn redirect_in(&self) -> Option<Span> {
        self.redirect_in
    }

    pub fn redirect_out(&self) -> Option<Span> {
        self.redirect_out
    }

    pub fn pipes_out(&self) -> bool {
        self.flags.contains(CommandFlags::PIPE_OUT)
    }

    pub fn is_background(&self) -> bool {
        self.flags.contains(CommandFlags::BACKGROUND)
    }

    /// No program to run. Executing an empty stage is a no-op.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn mark_invalid(&mut self) {
        self.invalid = true;
    }

    pub fn is_valid(&self) -> bool {
        !self.invalid
    }
}

/// Stages of one input line, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
    pub stages: Vec<Command>,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.iter().all(Command::is_empty)
    }

    pub fn is_valid(&self) -> bool {
        self.stages.iter().all(Command::is_valid)
    }
}
