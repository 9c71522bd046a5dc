// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Weekly schedule of decent time frames
//!
//! A [`Schedule`] maps each weekday to a sorted list of disjoint minute-of-day
//! intervals. Every day also knows which day to fall back to when it has no
//! frames of its own, so the next decent minute can be found from any point of
//! the week.

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::error::{FrameError, FrameErrorKind, ScheduleError};
use crate::raw::{RawSchedule, WEEK, WEEK_FROM_MONDAY, day_index, weekday_name};

/// Minutes in a day
pub const MINUTES_PER_DAY: u16 = 1440;

/// A closed interval of minutes of the day considered decent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeFrame {
    start_minute: u16,
    end_minute: u16,
}

impl TimeFrame {
    /// Create a frame, `None` unless `start <= end < 1440`
    #[must_use]
    pub fn new(start_minute: u16, end_minute: u16) -> Option<Self> {
        (start_minute <= end_minute && end_minute < MINUTES_PER_DAY).then_some(Self {
            start_minute,
            end_minute,
        })
    }

    /// First decent minute
    #[must_use]
    pub fn start_minute(&self) -> u16 {
        self.start_minute
    }

    /// Last decent minute (inclusive)
    #[must_use]
    pub fn end_minute(&self) -> u16 {
        self.end_minute
    }

    /// Check whether a minute of the day lies inside the frame
    #[must_use]
    pub fn contains(&self, minute: u16) -> bool {
        (self.start_minute..=self.end_minute).contains(&minute)
    }

    /// Parse `HH:MM/HH:MM` (or `HH:MM-HH:MM`)
    ///
    /// # Errors
    ///
    /// Returns the [`FrameErrorKind`] describing the first problem found.
    pub fn parse(entry: &str) -> Result<Self, FrameErrorKind> {
        let entry = entry.trim();
        if entry.len() != 11 || !entry.is_ascii() || !matches!(entry.as_bytes()[5], b'/' | b'-')
        {
            return Err(FrameErrorKind::Format);
        }

        let (start, end) = (&entry[..5], &entry[6..]);
        let start_minute = parse_clock(start)?;
        let end_minute = parse_clock(end)?;

        if start_minute > end_minute {
            return Err(FrameErrorKind::Inverted {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self {
            start_minute,
            end_minute,
        })
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} - {:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

/// Parse a 24-hour `HH:MM` clock time into a minute of the day
fn parse_clock(clock: &str) -> Result<u16, FrameErrorKind> {
    let format_error = || FrameErrorKind::TimeFormat {
        value: clock.to_string(),
    };

    let (hour, minute) = clock.split_once(':').ok_or_else(format_error)?;
    let all_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hour) || !all_digits(minute) {
        return Err(format_error());
    }

    let hour: u32 = hour.parse().map_err(|_| format_error())?;
    let minute: u32 = minute.parse().map_err(|_| format_error())?;

    if hour > 23 {
        return Err(FrameErrorKind::HourOutOfRange { hour });
    }
    if minute > 59 {
        return Err(FrameErrorKind::MinuteOutOfRange { minute });
    }

    // hour <= 23 and minute <= 59, so this fits in u16
    Ok((hour * 60 + minute) as u16)
}

/// The decent frames of one weekday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    frames: Vec<TimeFrame>,
    /// Index into `frames` for every minute covered by a frame
    minute_index: Vec<Option<usize>>,
    closest_decent_day: Weekday,
}

impl Day {
    /// `frames` must be sorted by start and disjoint
    fn new(day: Weekday, frames: Vec<TimeFrame>) -> Self {
        let mut minute_index = vec![None; usize::from(MINUTES_PER_DAY)];
        for (position, frame) in frames.iter().enumerate() {
            for minute in frame.start_minute..=frame.end_minute {
                minute_index[usize::from(minute)] = Some(position);
            }
        }

        Self {
            frames,
            minute_index,
            closest_decent_day: day,
        }
    }

    /// Frames sorted by start minute
    #[must_use]
    pub fn frames(&self) -> &[TimeFrame] {
        &self.frames
    }

    /// The frame covering a minute of the day, if any
    #[must_use]
    pub fn frame_at(&self, minute: u16) -> Option<&TimeFrame> {
        self.minute_index
            .get(usize::from(minute))
            .copied()
            .flatten()
            .map(|position| &self.frames[position])
    }

    /// Day to fall back to; the day itself when it has frames
    #[must_use]
    pub fn closest_decent_day(&self) -> Weekday {
        self.closest_decent_day
    }

    /// True when the day has at least one frame
    #[must_use]
    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }
}

/// Result of [`Schedule::closest_decent_minute`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecentMinute {
    /// Minute of the day of the target (on the target's own day)
    pub target_minute: u16,
    /// Minutes to move forward to reach the target, zero when already decent
    pub minutes_until: i64,
}

/// A weekly map of decent time frames, Sunday first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    days: [Day; 7],
}

impl Schedule {
    /// Build and validate a schedule
    ///
    /// Every malformed entry of every day is reported, not only the first.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::InvalidFrames` listing all rejected entries, or
    /// `ScheduleError::NoDecentDay` when no day has a frame.
    pub fn from_raw(raw: &RawSchedule) -> Result<Self, ScheduleError> {
        let mut errors = Vec::new();
        let mut frames: [Vec<TimeFrame>; 7] = Default::default();

        for day in WEEK {
            let mut parsed: Vec<(TimeFrame, &String)> = Vec::new();
            for entry in raw.entries(day) {
                match TimeFrame::parse(entry) {
                    Ok(frame) => parsed.push((frame, entry)),
                    Err(kind) => errors.push(FrameError {
                        day,
                        entry: entry.clone(),
                        kind,
                    }),
                }
            }

            parsed.sort_by_key(|(frame, _)| frame.start_minute);
            for pair in parsed.windows(2) {
                let ((previous, _), (frame, entry)) = (pair[0], pair[1]);
                if frame.start_minute <= previous.end_minute {
                    errors.push(FrameError {
                        day,
                        entry: entry.clone(),
                        kind: FrameErrorKind::Overlaps {
                            other: previous.to_string(),
                        },
                    });
                }
            }

            frames[day_index(day)] = parsed.into_iter().map(|(frame, _)| frame).collect();
        }

        if !errors.is_empty() {
            return Err(ScheduleError::InvalidFrames(errors));
        }

        let mut days: [Day; 7] =
            std::array::from_fn(|i| Day::new(WEEK[i], std::mem::take(&mut frames[i])));

        for i in 0..days.len() {
            if days[i].has_frames() {
                continue;
            }
            let fallback = (1..=7)
                .map(|offset| (i + offset) % 7)
                .find(|&j| days[j].has_frames())
                .ok_or(ScheduleError::NoDecentDay)?;
            days[i].closest_decent_day = WEEK[fallback];
        }

        let schedule = Self { days };
        debug!(schedule = %schedule, "Built schedule");
        Ok(schedule)
    }

    /// The frames and lookups of a weekday
    #[must_use]
    pub fn day(&self, day: Weekday) -> &Day {
        &self.days[day_index(day)]
    }

    /// Decent frames configured for a weekday
    #[must_use]
    pub fn frames(&self, day: Weekday) -> &[TimeFrame] {
        self.day(day).frames()
    }

    /// Nearest weekday with frames, scanning forward from `day` inclusive,
    /// and how many days ahead it is
    #[must_use]
    pub fn closest_decent_day(&self, day: Weekday) -> (Weekday, u32) {
        let next = self.day(day).closest_decent_day;
        let offset = (next.num_days_from_sunday() + 7 - day.num_days_from_sunday()) % 7;
        (next, offset)
    }

    /// Nearest decent minute at or after `date`
    ///
    /// `minutes_until` is zero if and only if `date` is already decent;
    /// otherwise it is the forward distance to the start of the next frame,
    /// possibly on a later day. Seconds are left untouched.
    #[must_use]
    pub fn closest_decent_minute<Tz: TimeZone>(&self, date: &DateTime<Tz>) -> DecentMinute {
        let weekday = date.weekday();
        // hour <= 23 and minute <= 59
        let minute = (date.hour() * 60 + date.minute()) as u16;
        let day = self.day(weekday);

        if day.frame_at(minute).is_some() {
            return DecentMinute {
                target_minute: minute,
                minutes_until: 0,
            };
        }

        if let Some(frame) = day.frames.iter().find(|frame| minute <= frame.end_minute) {
            return DecentMinute {
                target_minute: frame.start_minute,
                minutes_until: i64::from(frame.start_minute - minute),
            };
        }

        let (next_day, days_ahead) = self.closest_decent_day(weekday.succ());
        // closest_decent_day always names a day with frames
        let target_minute = self
            .frames(next_day)
            .first()
            .map_or(0, TimeFrame::start_minute);

        DecentMinute {
            target_minute,
            minutes_until: i64::from(MINUTES_PER_DAY - minute)
                + i64::from(days_ahead) * i64::from(MINUTES_PER_DAY)
                + i64::from(target_minute),
        }
    }

    /// True when `date` falls inside a frame of its weekday
    #[must_use]
    pub fn is_decent<Tz: TimeZone>(&self, date: &DateTime<Tz>) -> bool {
        self.closest_decent_minute(date).minutes_until == 0
    }

    /// Serializable view of the schedule, Monday first
    #[must_use]
    pub fn summary(&self) -> Vec<DaySummary> {
        WEEK_FROM_MONDAY
            .iter()
            .map(|&weekday| {
                let day = self.day(weekday);
                DaySummary {
                    day: weekday_name(weekday),
                    frames: day.frames.clone(),
                    closest_decent_day: weekday_name(day.closest_decent_day),
                }
            })
            .collect()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, summary) in self.summary().iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: ", summary.day)?;
            if summary.frames.is_empty() {
                write!(f, "-> {}", summary.closest_decent_day)?;
            } else {
                let frames: Vec<String> = summary.frames.iter().map(ToString::to_string).collect();
                write!(f, "{}", frames.join(" | "))?;
            }
        }
        Ok(())
    }
}

/// One weekday of a [`Schedule::summary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    /// Weekday name
    pub day: &'static str,
    /// Decent frames of the day
    pub frames: Vec<TimeFrame>,
    /// Where the day falls back to (itself when it has frames)
    pub closest_decent_day: &'static str,
}
