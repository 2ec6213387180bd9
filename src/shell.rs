use tracing::debug;
use crate::config::Config;
use crate::executor::{ExecStatus, Executor, ForkExecutor};
use crate::jobs::JobTable;
use crate::parser::{DefaultParser, ParsedLine};

/// Status of a line that was rejected by the parser.
pub const PARSE_FAILURE_STATUS: i32 = 2;

/// Parses lines with the configured word class and hands them to an executor.
pub struct Shell<E: Executor = ForkExecutor> {
    config: Config,
    executor: E,
}

impl Shell<ForkExecutor> {
    pub fn new(config: Config) -> Self {
        Shell::with_executor(config, ForkExecutor::new())
    }

    pub fn jobs(&self) -> &JobTable {
        self.executor.jobs()
    }
}

impl<E: Executor> Shell<E> {
    pub fn with_executor(config: Config, executor: E) -> Self {
        Shell { config, executor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn parse(&self, line: &str, offset: usize) -> ParsedLine {
        DefaultParser::with_class(line, self.config.word_class)
            .capacity(self.config.arg_capacity)
            .at(offset)
            .parse_pipeline()
    }

    pub fn run_line(&mut self, line: &str) -> ExecStatus {
        self.run_pipeline(line, 0)
    }

    /// Run the pipeline that starts at byte `offset` of `line`.
    ///
    /// Diagnostics go to stderr. A line with any invalid stage is not run.
    pub fn run_pipeline(&mut self, line: &str, offset: usize) -> ExecStatus {
        let parsed = self.parse(line, offset);
        for diag in &parsed.diagnostics {
            eprintln!("{}", diag);
        }
        if !parsed.is_runnable() {
            debug!(offset, "line rejected by parser");
            return Ok(PARSE_FAILURE_STATUS);
        }
        if parsed.pipeline.is_empty() {
            return Ok(0);
        }
        self.executor.exec(&parsed.pipeline, line)
    }
}
