use crate::ast::Pipeline;
use crate::error::ExecError;

/// Exit status of the last stage of a pipeline.
pub type ExecStatus = Result<i32, ExecError>;

pub trait Executor {
    /// Run every stage of `pipeline`. Spans resolve against `input`.
    fn exec(&mut self, pipeline: &Pipeline, input: &str) -> ExecStatus;
}
