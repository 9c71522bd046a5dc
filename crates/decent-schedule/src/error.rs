// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for decent-schedule

use chrono::Weekday;
use thiserror::Error;

/// Reason a single frame entry was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameErrorKind {
    /// The entry is not two clock times joined by `/` or `-`
    #[error("time range format should be HH:MM/HH:MM")]
    Format,

    /// One of the clock times is not `HH:MM`
    #[error("incorrect time format, expected HH:MM but given {value}")]
    TimeFormat {
        /// The offending clock time
        value: String,
    },

    /// Hour outside 0-23
    #[error("hour out of range: {hour}")]
    HourOutOfRange {
        /// The parsed hour
        hour: u32,
    },

    /// Minute outside 0-59
    #[error("minute out of range: {minute}")]
    MinuteOutOfRange {
        /// The parsed minute
        minute: u32,
    },

    /// Start of the range is after its end
    #[error("time range is inverse: {start} is after {end}")]
    Inverted {
        /// Start clock time
        start: String,
        /// End clock time
        end: String,
    },

    /// The range shares minutes with another range of the same day
    #[error("overlaps with {other}")]
    Overlaps {
        /// The frame it collides with, rendered as `HH:MM - HH:MM`
        other: String,
    },
}

/// A rejected frame entry, tagged with the day it was configured for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{day}: '{entry}': {kind}")]
pub struct FrameError {
    /// Day the entry belongs to
    pub day: Weekday,
    /// The raw entry as configured
    pub entry: String,
    /// What is wrong with it
    pub kind: FrameErrorKind,
}

/// Errors that can occur while building a schedule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// One or more frame entries are malformed; every bad entry is listed
    #[error("invalid schedule: {}", join_frame_errors(.0))]
    InvalidFrames(Vec<FrameError>),

    /// No day of the week has a single decent frame
    #[error("no decent time frame configured on any day of the week")]
    NoDecentDay,

    /// A configuration key that is not an English weekday name
    #[error("found a weekday that can't be handled: {name}")]
    UnknownWeekday {
        /// The unrecognised key
        name: String,
    },
}

impl ScheduleError {
    /// The individual frame errors, empty for other variants
    #[must_use]
    pub fn frame_errors(&self) -> &[FrameError] {
        match self {
            Self::InvalidFrames(errors) => errors,
            _ => &[],
        }
    }
}

fn join_frame_errors(errors: &[FrameError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
