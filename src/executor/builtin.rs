mod commands;
mod manager;

pub use commands::CdCommand;
pub use manager::{BuiltinCommand, BuiltinManager};
