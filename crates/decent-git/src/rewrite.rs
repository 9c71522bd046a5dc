// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Rewriting commit dates
//!
//! The HEAD commit is amended in place. Longer ranges are rewritten with a
//! scripted `git rebase --interactive`: the todo list picks every commit and
//! follows it with an `exec` line amending its author and committer dates. The
//! list is handed to git by pointing `GIT_SEQUENCE_EDITOR` at a copy command.

use std::io::Write;

use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

use crate::commit::{Commit, GitLog};
use crate::error::GitError;
use crate::repo::GitRepo;

/// Writes new dates into the history
pub trait HistoryMutator {
    /// Rewrite the date of the HEAD commit to `commit.date`
    ///
    /// # Errors
    ///
    /// Returns `GitError::NotHead` if `commit` is not the current HEAD.
    fn amend_head_date(&self, commit: &Commit) -> Result<(), GitError>;

    /// Rewrite the dates of a contiguous range ending at HEAD
    ///
    /// The range starts at the root commit when the oldest commit of `log` is
    /// the root, otherwise it covers the last `log.len()` commits.
    ///
    /// # Errors
    ///
    /// Returns `GitError::NotHead` if the newest commit of `log` is not HEAD,
    /// or `GitError::CommandFailed` if the rebase fails.
    fn amend_dates(&self, log: &GitLog) -> Result<(), GitError>;
}

/// A date in the RFC 2822 form git accepts for `--date` and `GIT_COMMITTER_DATE`
#[must_use]
pub fn git_date(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc2822()
}

/// Rebase todo list giving every commit of `log` its date
#[must_use]
pub fn rebase_todo(log: &GitLog) -> String {
    log.iter()
        .map(|commit| {
            let date = git_date(&commit.date);
            format!(
                "pick {}\nexec GIT_COMMITTER_DATE=\"{date}\" git commit --amend --no-edit --allow-empty --date=\"{date}\"\n",
                commit.sha
            )
        })
        .collect()
}

impl HistoryMutator for GitRepo {
    fn amend_head_date(&self, commit: &Commit) -> Result<(), GitError> {
        let head = self.head_sha()?;
        if head != commit.sha {
            return Err(GitError::NotHead {
                expected: commit.sha.clone(),
                head,
            });
        }

        let date = git_date(&commit.date);
        self.git()
            .args(["commit", "--amend", "--no-edit", "--allow-empty"])
            .arg(format!("--date={date}"))
            .env("GIT_COMMITTER_DATE", &date)
            .run()?;

        info!(sha = %commit.short_sha(), %date, "Amended HEAD date");
        Ok(())
    }

    fn amend_dates(&self, log: &GitLog) -> Result<(), GitError> {
        let (Some(oldest), Some(newest)) = (log.oldest(), log.newest()) else {
            return Ok(());
        };

        let head = self.head_sha()?;
        if head != newest.sha {
            return Err(GitError::NotHead {
                expected: newest.sha.clone(),
                head,
            });
        }

        let onto = if self.root_commit_sha()? == oldest.sha {
            "--root".to_string()
        } else {
            format!("HEAD~{}", log.len())
        };

        let mut todo = tempfile::Builder::new()
            .prefix("git-decent-amend")
            .tempfile()?;
        todo.write_all(rebase_todo(log).as_bytes())?;
        todo.flush()?;

        let sequence_editor = format!("cp \"{}\"", todo.path().display());
        let result = self
            .git()
            .args(["rebase", "--interactive", "--autostash", onto.as_str()])
            .env("GIT_SEQUENCE_EDITOR", sequence_editor)
            .run();

        if let Err(err) = result {
            if !self.state().is_clean() {
                warn!(%err, "Rebase failed, aborting it");
                if let Err(abort) = self.git().args(["rebase", "--abort"]).run() {
                    warn!(%abort, "Couldn't abort the rebase");
                }
            }
            return Err(err);
        }

        info!(commits = log.len(), %onto, "Amended dates");
        Ok(())
    }
}
