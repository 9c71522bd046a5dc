// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Terminal output and questions
//!
//! User-facing output goes to a [`Write`] handed in by the caller (stdout in
//! the binary, a buffer in tests); logs go to stderr through `tracing`.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use decent_git::GitError;
use decent_schedule::Schedule;
use tracing::debug;

/// Asks yes/no questions
pub trait Prompt {
    /// Ask `question`, answering yes unless the user types `n`
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read or written.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        (**self).confirm(question)
    }
}

/// Questions on a terminal
#[derive(Debug)]
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Read answers from `input`, write questions to `output`
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{question} (Y/n) ")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            // closed stdin
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(!answer.trim().eq_ignore_ascii_case("n"))
    }
}

/// Questions for hooks, asked on the controlling terminal
///
/// A hook's stdin belongs to git (the pre-push hook gets the refs being
/// pushed), so it is never read. Without a terminal every answer is no.
#[derive(Debug)]
pub enum HookPrompt {
    /// The terminal could be opened
    Terminal(TerminalPrompt<BufReader<File>, File>),
    /// No terminal, declining
    Unavailable,
}

impl HookPrompt {
    /// Ask on the terminal at `path`, usually `/dev/tty`
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let opened = File::open(path).and_then(|input| {
            let output = OpenOptions::new().append(true).open(path)?;
            Ok(TerminalPrompt::new(BufReader::new(input), output))
        });
        match opened {
            Ok(prompt) => Self::Terminal(prompt),
            Err(err) => {
                debug!(path = %path.display(), %err, "No terminal to ask on");
                Self::Unavailable
            }
        }
    }
}

impl Prompt for HookPrompt {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        match self {
            Self::Terminal(prompt) => prompt.confirm(question),
            Self::Unavailable => Ok(false),
        }
    }
}

/// Answers yes to everything, for `--yes`
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Print the schedule, one line per weekday from Monday
///
/// # Errors
///
/// Returns an error if `out` can't be written.
pub fn write_schedule(out: &mut impl Write, schedule: &Schedule) -> io::Result<()> {
    for day in schedule.summary() {
        let label = format!("{}:", day.day);
        if day.frames.is_empty() {
            writeln!(out, "📅 {label:<10} ↪️ {}", day.closest_decent_day)?;
        } else {
            let frames: Vec<String> = day.frames.iter().map(ToString::to_string).collect();
            writeln!(out, "📅 {label:<10} {}", frames.join(" | "))?;
        }
    }
    Ok(())
}

/// Print a commit with its original date and, when it changes, the amended one
///
/// # Errors
///
/// Returns an error if `out` can't be written.
pub fn write_amend(
    out: &mut impl Write,
    subject: &str,
    original: &DateTime<FixedOffset>,
    amended: &DateTime<FixedOffset>,
) -> io::Result<()> {
    writeln!(out, "✨ {subject}")?;
    write!(out, "    {} ", original.format("%Y-%m-%d %a %H:%M"))?;
    if original == amended {
        writeln!(out, "✅")
    } else {
        writeln!(out, "➡️ {}", amended.format("%a %H:%M"))
    }
}

/// Print a labelled value
///
/// # Errors
///
/// Returns an error if `out` can't be written.
pub fn write_info(out: &mut impl Write, label: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "{label} {value}")
}

/// Print an error and, for failed git commands, what git printed
///
/// # Errors
///
/// Returns an error if `out` can't be written.
pub fn write_error(out: &mut impl Write, err: &anyhow::Error) -> io::Result<()> {
    writeln!(out, "❌ {err}")?;
    for cause in err.chain().skip(1) {
        writeln!(out, "    {cause}")?;
    }

    let failed = err.chain().find_map(|cause| match cause.downcast_ref::<GitError>() {
        Some(GitError::CommandFailed {
            command,
            stdout,
            stderr,
            ..
        }) => Some((command, stdout, stderr)),
        _ => None,
    });
    if let Some((command, stdout, stderr)) = failed {
        writeln!(out, "    Command: {command}")?;
        if !stdout.trim().is_empty() {
            writeln!(out, "    Stdout: {}", stdout.trim())?;
        }
        if !stderr.trim().is_empty() {
            writeln!(out, "    Stderr: {}", stderr.trim())?;
        }
    }
    Ok(())
}
