// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! git-decent library
//!
//! The command line of git-decent, exported for the binary and for
//! integration tests. Installed on the `PATH`, the binary is also available
//! as `git decent`.

pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod guard;
pub mod hooks;
pub mod ui;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use decent_git::GitRepo;
use tracing::debug;

use crate::commands::Session;
use crate::config::{Command, Config};
use crate::error::CommandError;
use crate::guard::HookGuard;
use crate::hooks::Hook;
use crate::ui::{AssumeYes, HookPrompt, Prompt, TerminalPrompt};

/// Run the command selected by `config`
///
/// # Errors
///
/// Returns the error of the command; see [`report`] for how it maps to an
/// exit code.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let path = config
        .repo_path()
        .context("Couldn't determine the current directory")?;
    let repo = GitRepo::discover(&path)?;
    debug!(path = %repo.path().display(), "Opened repository");

    if config.yes {
        dispatch(config, Session::new(repo, io::stdout(), AssumeYes))
    } else if let Some(Command::PrePush { terminal, .. }) = &config.command {
        let prompt = HookPrompt::open(terminal);
        dispatch(config, Session::new(repo, io::stdout(), prompt))
    } else {
        let prompt = TerminalPrompt::new(io::stdin().lock(), io::stdout());
        dispatch(config, Session::new(repo, io::stdout(), prompt))
    }
}

fn dispatch<W: Write, P: Prompt>(config: &Config, session: Session<W, P>) -> anyhow::Result<()> {
    let mut session = session.with_threshold(config.threshold);

    match &config.command {
        None => session.scan(),
        Some(Command::PostCommit) => {
            let _guard = HookGuard::acquire(session.repo().path())?;
            session.post_commit()
        }
        Some(Command::Amend) => session.amend(),
        Some(Command::PrePush { confirm, .. }) => {
            session.pre_push(Local::now().fixed_offset(), *confirm)
        }
        Some(Command::Install {
            post_commit,
            pre_push,
        }) => {
            let all = !post_commit && !pre_push;
            let hooks: Vec<Hook> = Hook::ALL
                .into_iter()
                .filter(|hook| match hook {
                    Hook::PostCommit => all || *post_commit,
                    Hook::PrePush => all || *pre_push,
                })
                .collect();
            session.install(&hooks)
        }
        Some(Command::Config { json }) => session.show_config(*json),
        Some(Command::Setup) => session.setup().map(|_| ()),
    }
}

/// Report the outcome of [`run`] on `err_out` and pick the exit code
///
/// Nested hook runs and a declined setup succeed quietly; a blocked push has
/// already been explained.
pub fn report(result: anyhow::Result<()>, err_out: &mut impl Write) -> ExitCode {
    let Err(err) = result else {
        return ExitCode::SUCCESS;
    };

    match err.downcast_ref::<CommandError>() {
        Some(e) if e.is_benign() => {
            debug!(%e, "Skipped");
            ExitCode::SUCCESS
        }
        Some(CommandError::NotConfigured) => {
            let _ = writeln!(err_out, "Git decent is not configured, run git decent setup");
            ExitCode::SUCCESS
        }
        Some(CommandError::PushBlocked { .. }) => ExitCode::FAILURE,
        _ => {
            let _ = ui::write_error(err_out, &err);
            ExitCode::FAILURE
        }
    }
}
