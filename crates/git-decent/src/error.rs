// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Outcomes of a command that the CLI reports differently from plain failures

use std::path::PathBuf;

use decent_git::RepoState;
use thiserror::Error;

/// Errors raised by the git-decent commands themselves
#[derive(Debug, Error)]
pub enum CommandError {
    /// The pre-push hook refused to push outside decent hours
    #[error("{now} is not a decent time")]
    PushBlocked {
        /// Current time as `Mon 15:04`
        now: String,
    },

    /// A merge, rebase or similar operation is in progress
    #[error("can't operate while {state} is in progress")]
    RepositoryBusy {
        /// The operation in progress
        state: RepoState,
    },

    /// HEAD does not point at a branch
    #[error("can't operate in detached head")]
    DetachedHead,

    /// The repository has no commits
    #[error("no commits found")]
    EmptyHistory,

    /// Run from a hook fired by one of our own rewrites
    #[error("already amending, skipping nested run")]
    Reentrant,

    /// Another hook run holds the lock
    #[error("another git-decent hook is running ({})", .lock.display())]
    AlreadyRunning {
        /// Path of the lock file
        lock: PathBuf,
    },

    /// No schedule is configured and the user declined to set one up
    #[error("git decent is not configured")]
    NotConfigured,

    /// The editor exited unsuccessfully
    #[error("editor `{editor}` failed ({})", describe_status(.status))]
    EditorFailed {
        /// Editor command line
        editor: String,
        /// Exit code, if any
        status: Option<i32>,
    },
}

impl CommandError {
    /// True for outcomes where the hook should stay silent and succeed
    #[must_use]
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::Reentrant | Self::AlreadyRunning { .. })
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_string(),
    }
}
