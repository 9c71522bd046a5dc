// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Git hook installation
//!
//! Hooks are written once and never overwritten: an existing hook may do
//! anything, so the user is left to add the `git decent` line themselves.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

/// A hook git-decent can install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Amends each new commit
    PostCommit,
    /// Blocks pushes outside decent hours
    PrePush,
}

impl Hook {
    /// Every hook, in installation order
    pub const ALL: [Self; 2] = [Self::PostCommit, Self::PrePush];

    /// File name inside the hooks directory
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::PostCommit => "post-commit",
            Self::PrePush => "pre-push",
        }
    }

    /// Content of the installed script
    #[must_use]
    pub fn script(self) -> &'static str {
        match self {
            Self::PostCommit => include_str!("../templates/post-commit.sh"),
            Self::PrePush => include_str!("../templates/pre-push.sh"),
        }
    }

    /// The line a hook must run
    #[must_use]
    pub fn command_line(self) -> String {
        format!("git decent {}", self.file_name())
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Result of [`install`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installed {
    /// The hook was written
    New(PathBuf),
    /// A hook was already there and was left alone
    Existing(PathBuf),
}

/// Write `hook` into `hooks_dir` unless a hook of that name exists
///
/// # Errors
///
/// Returns an error if the directory or the script can't be written.
pub fn install(hooks_dir: &Path, hook: Hook) -> io::Result<Installed> {
    fs::create_dir_all(hooks_dir)?;
    let path = hooks_dir.join(hook.file_name());

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            info!(path = %path.display(), "Hook already exists");
            return Ok(Installed::Existing(path));
        }
        Err(e) => return Err(e),
    };
    file.write_all(hook.script().as_bytes())?;
    drop(file);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    info!(path = %path.display(), "Installed hook");
    Ok(Installed::New(path))
}
