// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Editing files in the user's git editor

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::Context;
use decent_schedule::raw::{WEEK_FROM_MONDAY, weekday_name};
use decent_schedule::{RawSchedule, Schedule};
use tracing::debug;

use crate::error::CommandError;
use crate::ui::{self, Prompt};

/// Template offered when no schedule is configured
pub const CONFIG_TEMPLATE: &str = include_str!("../templates/config-template.ini");

/// Open `path` in `editor`, waiting for it to exit
///
/// The editor string goes through the shell, like git runs it, so it may
/// carry its own arguments.
///
/// # Errors
///
/// Returns an error if the shell can't be started or the editor fails.
pub fn open_editor(editor: &str, path: &Path) -> anyhow::Result<()> {
    debug!(%editor, path = %path.display(), "Opening editor");
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{editor} \"$@\""))
        .arg(editor)
        .arg(path)
        .status()
        .with_context(|| format!("Couldn't start editor `{editor}`"))?;

    if !status.success() {
        return Err(CommandError::EditorFailed {
            editor: editor.to_string(),
            status: status.code(),
        }
        .into());
    }
    Ok(())
}

/// Text to edit: the template, or the current schedule when there is one
#[must_use]
pub fn initial_text(current: Option<&RawSchedule>) -> String {
    let Some(current) = current.filter(|raw| !raw.is_empty()) else {
        return CONFIG_TEMPLATE.to_string();
    };

    let header: String = CONFIG_TEMPLATE
        .lines()
        .take_while(|line| line.starts_with('[') || line.starts_with('#'))
        .map(|line| format!("{line}\n"))
        .collect();
    let days: String = WEEK_FROM_MONDAY
        .iter()
        .map(|&day| {
            let name = weekday_name(day);
            match current.entries(day) {
                [] => format!("{name} =\n"),
                entries => format!("{name} = {}\n", entries.join(", ")),
            }
        })
        .collect();
    format!("{header}\n{days}")
}

/// Let the user edit a schedule until it is valid or they give up
///
/// Returns `None` when the user declines to fix an invalid schedule.
///
/// # Errors
///
/// Returns an error if the temporary file or the editor fail.
pub fn edit_schedule(
    editor: &str,
    initial: &str,
    prompt: &mut impl Prompt,
    out: &mut impl Write,
) -> anyhow::Result<Option<RawSchedule>> {
    let mut file = tempfile::Builder::new()
        .prefix("git-decent-schedule")
        .suffix(".ini")
        .tempfile()
        .context("Couldn't create the schedule file")?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    loop {
        open_editor(editor, file.path())?;
        let text = fs::read_to_string(file.path()).context("Couldn't read the schedule back")?;

        let parsed = RawSchedule::from_plain_text(&text)
            .and_then(|raw| Schedule::from_raw(&raw).map(|_| raw));
        match parsed {
            Ok(raw) => return Ok(Some(raw)),
            Err(err) => {
                let err = anyhow::Error::new(err).context("The schedule couldn't be parsed");
                ui::write_error(out, &err)?;
            }
        }

        if !prompt.confirm("Do you want to edit it again?")? {
            return Ok(None);
        }
    }
}
