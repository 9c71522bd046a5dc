//! Git commit and log types

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Represents a commit read from the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The commit SHA (40 hex characters)
    pub sha: String,
    /// Commit message
    pub message: String,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Author date, with the offset it was recorded in
    pub date: DateTime<FixedOffset>,
    /// Paths touched by the commit
    pub files: Vec<String>,
    /// Parent commit SHAs
    pub parents: Vec<String>,
}

impl Commit {
    /// Validate that a SHA is a valid 40-character hex string
    #[must_use]
    pub fn is_valid_sha(sha: &str) -> bool {
        sha.len() == 40 && sha.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Get the short SHA (first 7 characters)
    #[must_use]
    pub fn short_sha(&self) -> &str {
        &self.sha[..7.min(self.sha.len())]
    }

    /// Check if this is a root commit (has no parents)
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Get the first line of the commit message (subject)
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Copy of the commit carrying a different date
    #[must_use]
    pub fn with_date(&self, date: DateTime<FixedOffset>) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }
}

/// Commits of a revision range, oldest first
///
/// The predecessor and successor of a commit are positional: `prev(i)` is the
/// commit at `i - 1`, `next(i)` the one at `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GitLog {
    commits: Vec<Commit>,
}

impl GitLog {
    /// Build a log from commits that are already oldest first
    #[must_use]
    pub fn new(commits: Vec<Commit>) -> Self {
        Self { commits }
    }

    /// Number of commits
    #[must_use]
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// True when the log holds no commit
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// The commits, oldest first
    #[must_use]
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    /// Iterate oldest first
    pub fn iter(&self) -> std::slice::Iter<'_, Commit> {
        self.commits.iter()
    }

    /// Commit at a position
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Commit> {
        self.commits.get(index)
    }

    /// The commit before the one at `index`
    #[must_use]
    pub fn prev(&self, index: usize) -> Option<&Commit> {
        index.checked_sub(1).and_then(|i| self.commits.get(i))
    }

    /// The commit after the one at `index`
    #[must_use]
    pub fn next(&self, index: usize) -> Option<&Commit> {
        if index >= self.commits.len() {
            return None;
        }
        self.commits.get(index + 1)
    }

    /// Oldest commit
    #[must_use]
    pub fn oldest(&self) -> Option<&Commit> {
        self.commits.first()
    }

    /// Newest commit
    #[must_use]
    pub fn newest(&self) -> Option<&Commit> {
        self.commits.last()
    }

    /// Dates of every commit, oldest first
    #[must_use]
    pub fn dates(&self) -> Vec<DateTime<FixedOffset>> {
        self.commits.iter().map(|c| c.date).collect()
    }

    /// Copy of the log with dates replaced position by position
    ///
    /// Commits without a matching date keep their own.
    #[must_use]
    pub fn with_dates(&self, dates: &[DateTime<FixedOffset>]) -> Self {
        let commits = self
            .commits
            .iter()
            .enumerate()
            .map(|(i, commit)| match dates.get(i) {
                Some(date) => commit.with_date(*date),
                None => commit.clone(),
            })
            .collect();
        Self { commits }
    }
}

impl From<Vec<Commit>> for GitLog {
    fn from(commits: Vec<Commit>) -> Self {
        Self::new(commits)
    }
}

impl<'a> IntoIterator for &'a GitLog {
    type Item = &'a Commit;
    type IntoIter = std::slice::Iter<'a, Commit>;

    fn into_iter(self) -> Self::IntoIter {
        self.commits.iter()
    }
}

impl IntoIterator for GitLog {
    type Item = Commit;
    type IntoIter = std::vec::IntoIter<Commit>;

    fn into_iter(self) -> Self::IntoIter {
        self.commits.into_iter()
    }
}
