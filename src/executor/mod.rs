mod executor;
mod fork_executor;
mod pipeline;
mod redirect;
pub mod builtin;

pub use executor::{ExecStatus, Executor};
pub use fork_executor::ForkExecutor;
pub use pipeline::{NOT_FOUND_STATUS, PipelineHandler, PreparedStage, Spawned, StagePlan};
pub use redirect::{RedirectHandler, Redirects};
pub use crate::error::ExecError;
