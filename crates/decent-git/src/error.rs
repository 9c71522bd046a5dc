// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for decent-git

use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Invalid commit reference (branch, tag, or SHA)
    #[error("Invalid commit reference: {reference}")]
    InvalidReference {
        /// The reference string that could not be resolved
        reference: String,
    },

    /// The history for a revision range could not be read
    #[error("Couldn't get log for {range}: {reason}")]
    LogRetrieval {
        /// The requested revision range
        range: String,
        /// What went wrong
        reason: String,
    },

    /// A commit recorded a timestamp that cannot be represented
    #[error("Commit {sha} has an invalid date")]
    InvalidDate {
        /// The offending commit
        sha: String,
    },

    /// Only the current HEAD commit can be amended in place
    #[error("Commit {expected} is not HEAD ({head})")]
    NotHead {
        /// The commit that was asked to be amended
        expected: String,
        /// The actual HEAD commit
        head: String,
    },

    /// `git var GIT_EDITOR` resolved to nothing
    #[error("No editor configured, set core.editor or GIT_EDITOR")]
    NoEditor,

    /// The git binary could not be started
    #[error("Couldn't run {command}: {source}")]
    Spawn {
        /// The command line
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The git binary exited with a failure status
    #[error("{command} failed ({})", describe_status(.status))]
    CommandFailed {
        /// The command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        status: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_string(),
    }
}
