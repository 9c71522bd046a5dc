// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Running the git binary
//!
//! History rewrites go through the `git` executable rather than `git2` so that
//! the user's hooks, signing setup and rebase machinery apply. Every process
//! is marked with [`AMEND_OPERATION_ENV`], which the hooks check to avoid
//! re-entering themselves.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::GitError;

/// Set to `1` in the environment of every git process spawned here
pub const AMEND_OPERATION_ENV: &str = "GIT_AMEND_OPERATION";

/// A single invocation of the git binary
#[derive(Debug, Clone)]
pub struct GitCommand {
    dir: PathBuf,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl GitCommand {
    /// Start building a command running in `dir`
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Add an environment variable
    #[must_use]
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// The command line as shown in errors and logs
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once("git".into())
            .chain(self.args.iter().map(|a| a.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion and return standard output
    ///
    /// # Errors
    ///
    /// Returns `GitError::Spawn` when git cannot be started and
    /// `GitError::CommandFailed`, with both output streams, when it exits
    /// unsuccessfully.
    pub fn run(&self) -> Result<String, GitError> {
        let command = self.command_line();
        debug!(%command, dir = %self.dir.display(), "Running git");

        let output = Command::new("git")
            .current_dir(&self.dir)
            .args(&self.args)
            .env(AMEND_OPERATION_ENV, "1")
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(%command, status = ?output.status.code(), %stdout, %stderr, "git finished");

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command,
                status: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(stdout)
    }
}
