use std::ffi::CString;
use std::fs::File;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, dup2, fork, pipe2};
use tracing::{debug, trace};

use crate::error::ExecError;
use crate::jobs::JobTable;

/// Exit status of a child whose program image could not be loaded.
pub const NOT_FOUND_STATUS: i32 = 127;

/// A stage ready to be forked: argv converted and redirect files open.
#[derive(Debug)]
pub struct PreparedStage {
    pub program: String,
    argv: Vec<CString>,
    not_found: Vec<u8>,
    pub stdin: Option<File>,
    pub stdout: Option<File>,
    pub pipe_out: bool,
    pub background: bool,
}

impl PreparedStage {
    pub fn new(args: &[&str], pipe_out: bool, background: bool) -> Result<Self, ExecError> {
        let argv = args
            .iter()
            .map(|a| CString::new(*a).map_err(|_| ExecError::InvalidArgument(a.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        let program = args.first().map(|s| s.to_string()).unwrap_or_default();
        let not_found = format!("minish: {}: command not found\n", program).into_bytes();
        Ok(PreparedStage {
            program,
            argv,
            not_found,
            stdin: None,
            stdout: None,
            pipe_out,
            background,
        })
    }
}

/// What happens at one position of the pipeline.
#[derive(Debug)]
pub enum StagePlan {
    /// Nothing to fork: an empty stage or a builtin that already ran.
    Done { status: i32, pipe_out: bool },
    Spawn(PreparedStage),
}

impl StagePlan {
    pub fn pipes_out(&self) -> bool {
        match self {
            StagePlan::Done { pipe_out, .. } => *pipe_out,
            StagePlan::Spawn(stage) => stage.pipe_out,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spawned {
    pub pid: Pid,
    pub program: String,
    pub background: bool,
}

pub struct PipelineHandler;

impl PipelineHandler {
    /// Fork every stage left to right, wiring each `|` through a fresh pipe.
    ///
    /// Children are appended to `children` as they are forked, so on error
    /// the caller still knows what is running. Nothing is waited for here.
    pub fn spawn_all(
        plans: Vec<StagePlan>,
        jobs: &JobTable,
        children: &mut Vec<Spawned>,
    ) -> Result<(), ExecError> {
        // read end feeding the next stage
        let mut upstream: Option<OwnedFd> = None;

        for (index, plan) in plans.into_iter().enumerate() {
            let downstream = if plan.pipes_out() {
                Some(pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?)
            } else {
                None
            };

            match plan {
                StagePlan::Done { .. } => {
                    // downstream reads an empty pipe
                    trace!(stage = index, "no process for stage");
                    drop(upstream.take());
                    upstream = downstream.map(|(read, _write)| read);
                }
                StagePlan::Spawn(stage) => {
                    if stage.background {
                        jobs.install()?;
                    }

                    let stdin_fd = stage
                        .stdin
                        .as_ref()
                        .map(AsRawFd::as_raw_fd)
                        .or_else(|| upstream.as_ref().map(AsRawFd::as_raw_fd));
                    let stdout_fd = stage
                        .stdout
                        .as_ref()
                        .map(AsRawFd::as_raw_fd)
                        .or_else(|| downstream.as_ref().map(|(_, write)| write.as_raw_fd()));

                    let pid = fork_exec(&stage, stdin_fd, stdout_fd)?;
                    debug!(
                        stage = index,
                        %pid,
                        program = %stage.program,
                        background = stage.background,
                        "spawned"
                    );

                    // the child holds its own copies now
                    drop(upstream.take());
                    upstream = downstream.map(|(read, _write)| read);

                    if stage.background {
                        jobs.track(pid);
                    }
                    children.push(Spawned {
                        pid,
                        program: stage.program,
                        background: stage.background,
                    });
                }
            }
        }
        Ok(())
    }

    /// Block until `pid` exits. Death by signal maps to 128 + signal number.
    pub fn wait(pid: Pid) -> Result<i32, ExecError> {
        loop {
            match waitpid(pid, None) {
                Ok(WaitStatus::Exited(_, code)) => return Ok(code),
                Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(128 + sig as i32),
                Ok(_) => continue,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ExecError::Wait(e)),
            }
        }
    }
}

fn fork_exec(
    stage: &PreparedStage,
    stdin: Option<RawFd>,
    stdout: Option<RawFd>,
) -> Result<Pid, ExecError> {
    // Built before fork: the child must not allocate.
    let mut argv: Vec<*const libc::c_char> = stage.argv.iter().map(|a| a.as_ptr()).collect();
    argv.push(std::ptr::null());

    match unsafe { fork() }.map_err(ExecError::Fork)? {
        ForkResult::Parent { child } => Ok(child),
        ForkResult::Child => {
            // Only async-signal-safe calls from here on.
            if let Some(fd) = stdin {
                redirect_fd(fd, libc::STDIN_FILENO);
            }
            if let Some(fd) = stdout {
                redirect_fd(fd, libc::STDOUT_FILENO);
            }
            unsafe {
                // the shell ignores SIGPIPE; its children must not inherit that
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
                libc::execvp(argv[0], argv.as_ptr());
                libc::write(
                    libc::STDERR_FILENO,
                    stage.not_found.as_ptr().cast(),
                    stage.not_found.len(),
                );
                libc::_exit(NOT_FOUND_STATUS)
            }
        }
    }
}

fn redirect_fd(fd: RawFd, target: RawFd) {
    if fd == target {
        // dup2 would keep O_CLOEXEC set
        unsafe { libc::fcntl(fd, libc::F_SETFD, 0) };
    } else if dup2(fd, target).is_err() {
        unsafe { libc::_exit(1) };
    }
}
