use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("fork: {0}")]
    Fork(#[source] nix::Error),
    #[error("wait: {0}")]
    Wait(#[source] nix::Error),
    #[error("invalid argument: {0:?}")]
    InvalidArgument(String),
    #[error("{name}: {source}")]
    Builtin {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot install SIGCHLD collector: {0}")]
    Reaper(#[source] io::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
