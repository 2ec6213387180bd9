use tracing::debug;
use crate::error::ExecError;
use crate::executor::ExecStatus;
use crate::executor::builtin::manager::BuiltinCommand;

/// `cd DIR` changes the shell's own working directory, which every later
/// child inherits.
pub struct CdCommand;

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn run(&self, args: &[&str]) -> ExecStatus {
        let Some(&target) = args.first() else {
            return Ok(0);
        };
        std::env::set_current_dir(target).map_err(|source| ExecError::Builtin {
            name: format!("cd: {}", target),
            source,
        })?;
        debug!(dir = target, "changed directory");
        Ok(0)
    }
}
