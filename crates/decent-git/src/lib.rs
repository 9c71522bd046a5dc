// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! decent-git: Git history access for git-decent
//!
//! This library crate reads commit logs and repository state, and rewrites
//! commit dates in place.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use decent_git::{GitRepo, LogProvider, RevisionRange};
//!
//! let repo = GitRepo::discover(".").expect("open repo");
//! let log = repo.log(&RevisionRange::Latest(10)).expect("read log");
//!
//! for c in &log {
//!     println!("{} {} - {}", c.short_sha(), c.date, c.subject());
//! }
//! ```

pub mod command;
pub mod commit;
pub mod error;
pub mod repo;
pub mod rewrite;

pub use command::{AMEND_OPERATION_ENV, GitCommand};
pub use commit::{Commit, GitLog};
pub use error::GitError;
pub use repo::{GitRepo, LogProvider, RepoState, RevisionRange};
pub use rewrite::HistoryMutator;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{Commit, GitLog};
    pub use crate::error::GitError;
    pub use crate::repo::{GitRepo, LogProvider, RevisionRange};
    pub use crate::rewrite::HistoryMutator;
}
