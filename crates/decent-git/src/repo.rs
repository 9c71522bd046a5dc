// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository access
//!
//! Reading history and repository state uses the `git2` crate. Configuration
//! and hook paths are resolved through the git binary so they follow the same
//! rules as the user's own git commands.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use git2::{BranchType, ErrorCode, Repository, RepositoryState, Sort};
use serde::Serialize;
use tracing::{debug, warn};

use crate::command::GitCommand;
use crate::commit::{Commit, GitLog};
use crate::error::GitError;

/// Git config section holding the schedule
const DECENT_SECTION_PATTERN: &str = r"^decent\.";

/// An operation in progress that blocks rewriting history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepoState {
    /// Nothing in progress
    Clean,
    /// A merge is waiting to be concluded
    Merge,
    /// A rebase (interactive or not) is in progress
    Rebase,
    /// A cherry-pick is in progress
    CherryPick,
    /// A bisect session is active
    Bisect,
    /// A revert is in progress
    Revert,
    /// `git am` is applying patches
    ApplyMailbox,
}

impl RepoState {
    /// True when nothing is in progress
    #[must_use]
    pub fn is_clean(self) -> bool {
        self == Self::Clean
    }
}

impl From<RepositoryState> for RepoState {
    fn from(state: RepositoryState) -> Self {
        match state {
            RepositoryState::Clean => Self::Clean,
            RepositoryState::Merge => Self::Merge,
            RepositoryState::Rebase
            | RepositoryState::RebaseInteractive
            | RepositoryState::RebaseMerge
            | RepositoryState::ApplyMailboxOrRebase => Self::Rebase,
            RepositoryState::CherryPick | RepositoryState::CherryPickSequence => Self::CherryPick,
            RepositoryState::Bisect => Self::Bisect,
            RepositoryState::Revert | RepositoryState::RevertSequence => Self::Revert,
            RepositoryState::ApplyMailbox => Self::ApplyMailbox,
        }
    }
}

impl fmt::Display for RepoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clean => "clean",
            Self::Merge => "merge",
            Self::Rebase => "rebase",
            Self::CherryPick => "cherry-pick",
            Self::Bisect => "bisect",
            Self::Revert => "revert",
            Self::ApplyMailbox => "am",
        })
    }
}

/// Which commits to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionRange {
    /// The N most recent commits reachable from HEAD
    Latest(usize),
    /// Commits reachable from HEAD but not from the upstream branch
    Unpushed {
        /// Upstream branch, e.g. `origin/main`
        upstream: String,
    },
    /// Every commit reachable from HEAD
    All,
    /// A revision (`main`) or a `from..to` range
    Spec(String),
}

impl fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest(n) => write!(f, "-{n}"),
            Self::Unpushed { upstream } => write!(f, "{upstream}..HEAD"),
            Self::All => f.write_str("HEAD"),
            Self::Spec(spec) => f.write_str(spec),
        }
    }
}

/// Source of commit history
pub trait LogProvider {
    /// Commits of a range, oldest first
    ///
    /// # Errors
    ///
    /// Returns `GitError::LogRetrieval` if the history cannot be read, for
    /// example in an empty repository or for an unknown revision.
    fn log(&self, range: &RevisionRange) -> Result<GitLog, GitError>;
}

/// A git repository
pub struct GitRepo {
    repo: Repository,
    global_config: Option<PathBuf>,
}

impl fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepo")
            .field("path", &self.repo.path())
            .field("global_config", &self.global_config)
            .finish()
    }
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self::from_repository(repo))
    }

    /// Discover and open a git repository containing the given path
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self::from_repository(repo))
    }

    fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            global_config: None,
        }
    }

    /// Use `path` as the global git config of every spawned git process,
    /// ignoring the user's and the system configuration
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config = Some(path.into());
        self
    }

    /// Check if the repository is bare
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    /// Get the repository path (the `.git` directory)
    #[must_use]
    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// A git command running in this repository
    #[must_use]
    pub fn git(&self) -> GitCommand {
        let command = GitCommand::new(self.workdir().unwrap_or_else(|| self.path()));
        match &self.global_config {
            Some(path) => command
                .env("GIT_CONFIG_GLOBAL", path)
                .env("GIT_CONFIG_NOSYSTEM", "1"),
            None => command,
        }
    }

    /// True when the repository has no commit yet
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be inspected.
    pub fn is_empty(&self) -> Result<bool, GitError> {
        Ok(self.repo.is_empty()?)
    }

    /// Operation currently in progress
    #[must_use]
    pub fn state(&self) -> RepoState {
        self.repo.state().into()
    }

    /// Name of the checked out branch, `None` for a detached HEAD
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved.
    pub fn current_branch(&self) -> Result<Option<String>, GitError> {
        if self.repo.head_detached()? {
            return Ok(None);
        }
        let head = self.repo.head()?;
        Ok(head.shorthand().map(String::from))
    }

    /// Upstream of a local branch, e.g. `origin/main`
    ///
    /// # Errors
    ///
    /// Returns `GitError` on repository errors other than a missing branch or
    /// upstream.
    pub fn upstream(&self, branch: &str) -> Result<Option<String>, GitError> {
        let local = match self.repo.find_branch(branch, BranchType::Local) {
            Ok(local) => local,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match local.upstream() {
            Ok(upstream) => Ok(upstream.name()?.map(String::from)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the HEAD commit SHA
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved.
    pub fn head_sha(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        let oid = head.target().ok_or_else(|| GitError::InvalidReference {
            reference: "HEAD".to_string(),
        })?;
        Ok(oid.to_string())
    }

    /// SHA of the root commit reached from HEAD
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be walked.
    pub fn root_commit_sha(&self) -> Result<String, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push_head()?;
        for oid in revwalk {
            let oid = oid?;
            if self.repo.find_commit(oid)?.parent_count() == 0 {
                return Ok(oid.to_string());
            }
        }
        Err(GitError::InvalidReference {
            reference: "root commit".to_string(),
        })
    }

    /// Options of the repository-local `decent` config section
    ///
    /// Keys are returned as git reports them (`decent.monday`).
    ///
    /// # Errors
    ///
    /// Returns `GitError` if git config cannot be read.
    pub fn decent_options(&self) -> Result<Vec<(String, String)>, GitError> {
        let output = match self
            .git()
            .args(["config", "--local", "--get-regexp", DECENT_SECTION_PATTERN])
            .run()
        {
            Ok(output) => output,
            // no matching key
            Err(GitError::CommandFailed {
                status: Some(1), ..
            }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let options = output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| match line.split_once(' ') {
                Some((key, value)) => (key.to_string(), value.trim().to_string()),
                None => (line.trim().to_string(), String::new()),
            })
            .collect();
        debug!(?options, "Read decent options");
        Ok(options)
    }

    /// Set a repository-local config value
    ///
    /// # Errors
    ///
    /// Returns `GitError::CommandFailed` if git rejects the key.
    pub fn set_config(&self, key: &str, value: &str) -> Result<(), GitError> {
        self.git().args(["config", "--local", key, value]).run()?;
        Ok(())
    }

    /// Remove the repository-local `decent` config section
    ///
    /// # Errors
    ///
    /// Returns `GitError` if git config cannot be read or written.
    pub fn clear_decent_options(&self) -> Result<(), GitError> {
        if self.decent_options()?.is_empty() {
            return Ok(());
        }
        self.git()
            .args(["config", "--local", "--remove-section", "decent"])
            .run()?;
        Ok(())
    }

    /// Directory hooks are read from, honouring `core.hooksPath`
    ///
    /// # Errors
    ///
    /// Returns `GitError` if git cannot resolve the path.
    pub fn hooks_dir(&self) -> Result<PathBuf, GitError> {
        let output = self.git().args(["rev-parse", "--git-path", "hooks"]).run()?;
        let dir = PathBuf::from(output.trim());
        if dir.is_absolute() {
            return Ok(dir);
        }
        Ok(self.workdir().unwrap_or_else(|| self.path()).join(dir))
    }

    /// The editor git would use (`git var GIT_EDITOR`)
    ///
    /// # Errors
    ///
    /// Returns `GitError::NoEditor` when nothing is configured.
    pub fn editor(&self) -> Result<String, GitError> {
        let editor = self.git().args(["var", "GIT_EDITOR"]).run()?;
        let editor = editor.trim();
        if editor.is_empty() {
            return Err(GitError::NoEditor);
        }
        Ok(editor.to_string())
    }

    /// The commit a revision (`HEAD`, `origin/main`, a SHA) resolves to
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the revision cannot be resolved to a commit.
    pub fn find_commit(&self, rev: &str) -> Result<Commit, GitError> {
        let commit = self.repo.revparse_single(rev)?.peel_to_commit()?;
        self.read_commit(&commit)
    }

    fn walk(&self, range: &RevisionRange) -> Result<GitLog, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;

        let mut limit = usize::MAX;
        match range {
            RevisionRange::Latest(n) => {
                revwalk.push_head()?;
                limit = *n;
            }
            RevisionRange::All => revwalk.push_head()?,
            RevisionRange::Unpushed { upstream } => {
                revwalk.push_range(&format!("{upstream}..HEAD"))?;
            }
            RevisionRange::Spec(spec) if spec.contains("..") => revwalk.push_range(spec)?,
            RevisionRange::Spec(spec) => {
                let oid = self.repo.revparse_single(spec)?.peel_to_commit()?.id();
                revwalk.push(oid)?;
            }
        }

        // newest first, flipped below
        let mut commits = Vec::new();
        for oid in revwalk.take(limit) {
            let git_commit = self.repo.find_commit(oid?)?;
            commits.push(self.read_commit(&git_commit)?);
        }
        commits.reverse();

        Ok(GitLog::new(commits))
    }

    fn read_commit(&self, git_commit: &git2::Commit<'_>) -> Result<Commit, GitError> {
        let sha = git_commit.id().to_string();
        let author = git_commit.author();
        let when = author.when();

        let date = FixedOffset::east_opt(when.offset_minutes() * 60)
            .zip(DateTime::from_timestamp(when.seconds(), 0))
            .map(|(offset, utc)| utc.with_timezone(&offset))
            .ok_or_else(|| GitError::InvalidDate { sha: sha.clone() })?;

        let files = self.changed_files(git_commit)?;
        let parents = git_commit.parent_ids().map(|id| id.to_string()).collect();

        Ok(Commit {
            message: git_commit.message().unwrap_or("").to_string(),
            author: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            sha,
            date,
            files,
            parents,
        })
    }

    fn changed_files(&self, git_commit: &git2::Commit<'_>) -> Result<Vec<String>, GitError> {
        let tree = git_commit.tree()?;
        let parent_tree = if git_commit.parent_count() > 0 {
            Some(git_commit.parent(0)?.tree()?)
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        Ok(diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.display().to_string())
            })
            .collect())
    }
}

impl LogProvider for GitRepo {
    fn log(&self, range: &RevisionRange) -> Result<GitLog, GitError> {
        self.walk(range).map_err(|err| {
            warn!(%range, %err, "Couldn't read log");
            GitError::LogRetrieval {
                range: range.to_string(),
                reason: err.to_string(),
            }
        })
    }
}
