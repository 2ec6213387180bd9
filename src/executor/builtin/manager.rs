use std::collections::HashMap;
use tracing::debug;
use crate::executor::ExecStatus;
use crate::executor::builtin::commands::CdCommand;

pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    /// Arguments required after the command name. With fewer, the builtin
    /// is not run and the stage is a no-op.
    fn min_args(&self) -> usize {
        0
    }
    fn run(&self, args: &[&str]) -> ExecStatus;
}

pub struct BuiltinManager {
    commands: HashMap<&'static str, Box<dyn BuiltinCommand>>,
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(CdCommand));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name(), cmd);
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Run `name` if it is a builtin. `args` excludes the command name.
    pub fn execute(&self, name: &str, args: &[&str]) -> Option<ExecStatus> {
        let cmd = self.commands.get(name)?;
        if args.len() < cmd.min_args() {
            debug!(builtin = name, given = args.len(), "too few arguments, skipping");
            return Some(Ok(0));
        }
        Some(cmd.run(args))
    }
}
