// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The git-decent commands
//!
//! A [`Session`] bundles the repository, the output and the prompt of one
//! invocation. Each command is a method so tests can drive them with a
//! buffer and scripted answers.

use std::io::Write;

use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use decent_git::prelude::*;
use decent_schedule::{Amender, RawSchedule, Schedule};
use tracing::{debug, info};

use crate::editor;
use crate::error::CommandError;
use crate::hooks::{self, Hook, Installed};
use crate::ui::{self, Prompt};

/// One invocation of git-decent on a repository
#[derive(Debug)]
pub struct Session<W, P> {
    repo: GitRepo,
    out: W,
    prompt: P,
    threshold: u32,
}

impl<W: Write, P: Prompt> Session<W, P> {
    /// Session writing to `out` and asking through `prompt`
    pub fn new(repo: GitRepo, out: W, prompt: P) -> Self {
        Self {
            repo,
            out,
            prompt,
            threshold: 0,
        }
    }

    /// Interval threshold in minutes handed to the amender
    #[must_use]
    pub fn with_threshold(mut self, minutes: u32) -> Self {
        self.threshold = minutes;
        self
    }

    /// The repository
    #[must_use]
    pub fn repo(&self) -> &GitRepo {
        &self.repo
    }

    /// Consume the session, returning its output
    pub fn into_output(self) -> W {
        self.out
    }

    /// Check the repository can have its history rewritten
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` when an operation is in progress, HEAD is
    /// detached or there are no commits.
    pub fn ensure_ready(&self) -> anyhow::Result<String> {
        let state = self.repo.state();
        if !state.is_clean() {
            return Err(CommandError::RepositoryBusy { state }.into());
        }
        if self.repo.is_empty()? {
            return Err(CommandError::EmptyHistory.into());
        }
        let branch = self
            .repo
            .current_branch()?
            .ok_or(CommandError::DetachedHead)?;
        Ok(branch)
    }

    /// Load the configured schedule
    ///
    /// When nothing is configured and `offer_setup` is set, the user may set
    /// it up on the spot.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NotConfigured` when there is no schedule, or the
    /// schedule error when the configuration is invalid.
    pub fn load_schedule(&mut self, offer_setup: bool) -> anyhow::Result<Schedule> {
        let options = self
            .repo
            .decent_options()
            .context("Couldn't read the decent configuration")?;

        if options.is_empty() {
            if !offer_setup
                || !self
                    .prompt
                    .confirm("Git decent is not configured, do you want to do it now?")?
            {
                return Err(CommandError::NotConfigured.into());
            }
            return self.setup()?.ok_or_else(|| CommandError::NotConfigured.into());
        }

        let raw = RawSchedule::from_git_options(options)?;
        let schedule = Schedule::from_raw(&raw).context("Invalid decent configuration")?;
        debug!(%schedule, "Loaded schedule");
        Ok(schedule)
    }

    fn amender<'a>(&self, schedule: &'a Schedule) -> Amender<'a> {
        Amender::new(schedule).with_threshold(self.threshold)
    }

    fn print_schedule(&mut self, schedule: &Schedule) -> anyhow::Result<()> {
        writeln!(self.out, "Schedule:")?;
        ui::write_schedule(&mut self.out, schedule)?;
        writeln!(self.out)?;
        Ok(())
    }

    /// List unpushed commits with their amended dates and offer to rewrite them
    ///
    /// Without an upstream every commit of the branch is considered. With
    /// one, the first unpushed commit is amended after the upstream tip.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository isn't ready, the schedule can't be
    /// loaded or the rewrite fails.
    pub fn scan(&mut self) -> anyhow::Result<()> {
        let branch = self.ensure_ready()?;
        let schedule = self.load_schedule(true)?;
        self.print_schedule(&schedule)?;

        let (range, anchor) = match self.repo.upstream(&branch)? {
            Some(upstream) => {
                ui::write_info(&mut self.out, "Upstream branch:", &upstream)?;
                let tip = self
                    .repo
                    .find_commit(&upstream)
                    .context("Couldn't read the upstream branch")?;
                (RevisionRange::Unpushed { upstream }, Some(tip.date))
            }
            None => {
                writeln!(self.out, "No upstream branch, checking every commit of {branch}")?;
                (RevisionRange::All, None)
            }
        };

        let log = self.repo.log(&range).context("Couldn't get the log")?;
        ui::write_info(&mut self.out, "Unpushed commits:", log.len())?;
        if log.is_empty() {
            return Ok(());
        }
        writeln!(self.out)?;

        let original = log.dates();
        let amended = self.amender(&schedule).amend_sequence_after(anchor, &original);
        for (commit, date) in log.iter().zip(&amended) {
            ui::write_amend(&mut self.out, commit.subject(), &commit.date, date)?;
        }
        writeln!(self.out)?;

        let changed = original.iter().zip(&amended).filter(|(a, b)| a != b).count();
        if changed == 0 {
            writeln!(self.out, "✅ Every commit is already decent")?;
            return Ok(());
        }
        ui::write_info(&mut self.out, "Commits to amend:", changed)?;

        if !self.prompt.confirm("Do you want to amend the dates?")? {
            return Ok(());
        }

        self.repo
            .amend_dates(&log.with_dates(&amended))
            .context("Couldn't amend the dates")?;
        writeln!(self.out, "✅ Amended {changed} commits")?;
        info!(changed, total = log.len(), "Amended unpushed commits");
        Ok(())
    }

    /// Amend HEAD from the post-commit hook, without asking
    ///
    /// # Errors
    ///
    /// Returns an error if the repository isn't ready, nothing is configured
    /// or the amend fails.
    pub fn post_commit(&mut self) -> anyhow::Result<()> {
        self.amend_head(false)
    }

    /// Amend HEAD after showing the new date and asking
    ///
    /// # Errors
    ///
    /// See [`Session::post_commit`].
    pub fn amend(&mut self) -> anyhow::Result<()> {
        self.amend_head(true)
    }

    fn amend_head(&mut self, interactive: bool) -> anyhow::Result<()> {
        self.ensure_ready()?;
        let schedule = self.load_schedule(interactive)?;
        if interactive {
            self.print_schedule(&schedule)?;
        }

        let log = self
            .repo
            .log(&RevisionRange::Latest(2))
            .context("Couldn't get the log")?;
        let head = log.newest().ok_or(CommandError::EmptyHistory)?;
        let parent = if log.len() > 1 { log.oldest() } else { None };
        let previous = parent.map(|c| c.date);

        let amended = self.amender(&schedule).amend(head.date, previous, previous);
        ui::write_amend(&mut self.out, head.subject(), &head.date, &amended)?;
        if amended == head.date {
            return Ok(());
        }

        if interactive && !self.prompt.confirm("Do you want to amend the date?")? {
            return Ok(());
        }

        self.repo
            .amend_head_date(&head.with_date(amended))
            .context("Couldn't amend the date")?;
        Ok(())
    }

    /// Refuse to push at `now` unless it is decent
    ///
    /// Unpushed commits dated after `now` are reported. With `confirm` the
    /// user may push anyway.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::PushBlocked` outside decent hours.
    pub fn pre_push(&mut self, now: DateTime<FixedOffset>, confirm: bool) -> anyhow::Result<()> {
        let schedule = self.load_schedule(false)?;

        if let Some(upstream) = self.unpushed_upstream()? {
            ui::write_info(&mut self.out, "Upstream branch:", &upstream)?;
            let log = self
                .repo
                .log(&RevisionRange::Unpushed { upstream })
                .context("Unable to get the log")?;
            ui::write_info(&mut self.out, "Unpushed commits:", log.len())?;
            for commit in log.iter().filter(|c| c.date > now) {
                writeln!(
                    self.out,
                    "⚠️ Commit is in the future: {} {}",
                    commit.subject(),
                    commit.date.format("%Y-%m-%d %a %H:%M")
                )?;
            }
        }

        if schedule.is_decent(&now) {
            writeln!(self.out, "✅ Allowed to push, decent time")?;
            return Ok(());
        }

        let now = now.format("%a %H:%M").to_string();
        writeln!(self.out, "{now} is not a decent time.")?;
        if confirm && self.prompt.confirm("Do you want to push anyway?")? {
            return Ok(());
        }
        writeln!(self.out, "Use git push --no-verify to skip the hook")?;
        Err(CommandError::PushBlocked { now }.into())
    }

    fn unpushed_upstream(&self) -> anyhow::Result<Option<String>> {
        if self.repo.is_empty()? {
            return Ok(None);
        }
        match self.repo.current_branch()? {
            Some(branch) => Ok(self.repo.upstream(&branch)?),
            None => Ok(None),
        }
    }

    /// Install hooks, leaving existing ones alone
    ///
    /// # Errors
    ///
    /// Returns an error if a hook can't be written or the editor fails.
    pub fn install(&mut self, hooks: &[Hook]) -> anyhow::Result<()> {
        let dir = self.repo.hooks_dir()?;
        for (i, &hook) in hooks.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            writeln!(self.out, "Install {hook}")?;

            let installed = hooks::install(&dir, hook)
                .with_context(|| format!("Could not install the {hook} hook"))?;
            match installed {
                Installed::New(path) => {
                    writeln!(self.out, "✅ Hook installed at {}", path.display())?;
                }
                Installed::Existing(path) => {
                    writeln!(self.out, "A {hook} hook already exists, we won't edit it")?;
                    writeln!(self.out, "instead you can add this line manually")?;
                    writeln!(self.out, "> {}", hook.command_line())?;
                    if self.prompt.confirm("Do you want to manually edit the hook?")? {
                        let editor = self.repo.editor()?;
                        editor::open_editor(&editor, &path)
                            .with_context(|| format!("Could not edit the {hook} hook"))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Print the configured schedule
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn show_config(&mut self, json: bool) -> anyhow::Result<()> {
        let schedule = match self.load_schedule(false) {
            Ok(schedule) => schedule,
            Err(err)
                if matches!(
                    err.downcast_ref::<CommandError>(),
                    Some(CommandError::NotConfigured)
                ) =>
            {
                writeln!(self.out, "Git decent is not configured, run git decent setup")?;
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        if json {
            let summary = serde_json::to_string_pretty(&schedule.summary())?;
            writeln!(self.out, "{summary}")?;
        } else {
            ui::write_schedule(&mut self.out, &schedule)?;
        }
        Ok(())
    }

    /// Edit the schedule and save it to the repository config
    ///
    /// Returns the new schedule, or `None` when the user gave up.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails or the config can't be written.
    pub fn setup(&mut self) -> anyhow::Result<Option<Schedule>> {
        let current = RawSchedule::from_git_options(self.repo.decent_options()?).ok();
        let initial = editor::initial_text(current.as_ref());
        let editor = self.repo.editor()?;

        let Some(raw) = editor::edit_schedule(&editor, &initial, &mut self.prompt, &mut self.out)?
        else {
            writeln!(self.out, "Schedule not changed")?;
            return Ok(None);
        };
        let schedule = Schedule::from_raw(&raw)?;

        self.repo.clear_decent_options()?;
        for (key, value) in raw.to_git_options() {
            self.repo
                .set_config(&key, &value)
                .with_context(|| format!("Couldn't save {key}"))?;
        }
        info!(%schedule, "Saved schedule");

        writeln!(self.out, "✅ Schedule saved")?;
        ui::write_schedule(&mut self.out, &schedule)?;
        writeln!(self.out)?;
        Ok(Some(schedule))
    }
}
