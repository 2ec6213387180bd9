use tracing::debug;
use crate::ast::{Command, Pipeline};
use crate::error::ExecError;
use crate::executor::builtin::BuiltinManager;
use crate::executor::pipeline::{PipelineHandler, PreparedStage, Spawned, StagePlan};
use crate::executor::redirect::RedirectHandler;
use crate::executor::{ExecStatus, Executor};
use crate::jobs::JobTable;

/// Runs pipelines as real child processes.
///
/// Every stage is prepared first (builtins run, redirect files opened), then
/// all processes are forked, and only then are the foreground ones waited for.
pub struct ForkExecutor {
    builtins: BuiltinManager,
    jobs: JobTable,
}

impl Default for ForkExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ForkExecutor {
    fn exec(&mut self, pipeline: &Pipeline, input: &str) -> ExecStatus {
        if !pipeline.is_valid() {
            return Err(ExecError::InvalidArgument(
                "refusing to run a pipeline with invalid stages".to_string(),
            ));
        }

        let mut status = 0;
        let mut plans = Vec::with_capacity(pipeline.len());
        for cmd in &pipeline.stages {
            let plan = self.prepare(cmd, input)?;
            if let StagePlan::Done { status: s, .. } = plan {
                status = s;
            }
            plans.push(plan);
        }

        let mut children = Vec::new();
        let spawned = PipelineHandler::spawn_all(plans, &self.jobs, &mut children);

        // whatever got forked is waited for, even after a failure
        let waited = Self::wait_foreground(&children);
        spawned?;
        if let Some((program, code)) = waited? {
            if code != 0 {
                eprintln!("minish: {}: exited with status {}", program, code);
            }
            status = code;
        }
        Ok(status)
    }
}

impl ForkExecutor {
    pub fn new() -> Self {
        ForkExecutor {
            builtins: BuiltinManager::new(),
            jobs: JobTable::new(),
        }
    }

    pub fn with_builtins(builtins: BuiltinManager) -> Self {
        ForkExecutor {
            builtins,
            jobs: JobTable::new(),
        }
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    fn prepare(&self, cmd: &Command, input: &str) -> Result<StagePlan, ExecError> {
        let args = cmd.arg_texts(input);
        let Some((&name, rest)) = args.split_first() else {
            return Ok(StagePlan::Done { status: 0, pipe_out: cmd.pipes_out() });
        };

        if let Some(result) = self.builtins.execute(name, rest) {
            let status = match result {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("minish: {}", e);
                    1
                }
            };
            debug!(builtin = name, status, "builtin ran in shell");
            return Ok(StagePlan::Done { status, pipe_out: cmd.pipes_out() });
        }

        let redirects = RedirectHandler::open(cmd, input)?;
        let mut stage = PreparedStage::new(&args, cmd.pipes_out(), cmd.is_background())?;
        stage.stdin = redirects.stdin;
        stage.stdout = redirects.stdout;
        Ok(StagePlan::Spawn(stage))
    }

    /// Wait for every foreground child; returns the last one's program and
    /// status.
    fn wait_foreground(children: &[Spawned]) -> Result<Option<(String, i32)>, ExecError> {
        let mut last = None;
        let mut first_err = None;
        for child in children.iter().filter(|c| !c.background) {
            match PipelineHandler::wait(child.pid) {
                Ok(code) => {
                    debug!(
                        pid = %child.pid,
                        program = %child.program,
                        code,
                        "foreground child exited"
                    );
                    last = Some((child.program.clone(), code));
                }
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(last),
        }
    }
}
