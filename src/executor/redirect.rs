use std::fs::{File, OpenOptions};
use tracing::debug;
use crate::ast::Command;
use crate::error::ExecError;

/// Files a stage's standard streams are redirected to, opened by the shell
/// before the stage is forked.
#[derive(Debug, Default)]
pub struct Redirects {
    pub stdin: Option<File>,
    pub stdout: Option<File>,
}

pub struct RedirectHandler;

impl RedirectHandler {
    pub fn open(cmd: &Command, input: &str) -> Result<Redirects, ExecError> {
        let mut redirects = Redirects::default();
        if let Some(path) = cmd.redirect_in() {
            redirects.stdin = Some(Self::open_input(path.text(input))?);
        }
        if let Some(path) = cmd.redirect_out() {
            redirects.stdout = Some(Self::open_output(path.text(input))?);
        }
        Ok(redirects)
    }

    pub fn open_input(path: &str) -> Result<File, ExecError> {
        debug!(path, "opening input redirect");
        File::open(path).map_err(|source| ExecError::Redirect {
            path: path.to_string(),
            source,
        })
    }

    /// Create or truncate `path`.
    pub fn open_output(path: &str) -> Result<File, ExecError> {
        debug!(path, "opening output redirect");
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| ExecError::Redirect {
                path: path.to_string(),
                source,
            })
    }
}
