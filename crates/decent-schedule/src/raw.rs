// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Raw schedule configuration
//!
//! A [`RawSchedule`] holds the unvalidated frame entries for each weekday, as
//! they come out of git config (`decent.monday = 09:00/13:00, 14:00/17:00`) or
//! out of the plain-text template edited by the user. Validation happens when
//! it is turned into a [`Schedule`](crate::Schedule).

use chrono::Weekday;

use crate::error::ScheduleError;

/// Git config section holding the schedule
pub const SECTION: &str = "decent";

/// The week in schedule order, Sunday first
pub const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// The week in display order, Monday first
pub const WEEK_FROM_MONDAY: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Index of a weekday in [`WEEK`]
#[must_use]
pub fn day_index(day: Weekday) -> usize {
    day.num_days_from_sunday() as usize
}

/// Full English name of a weekday
#[must_use]
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a full English weekday name, ignoring case and surrounding whitespace
#[must_use]
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Unvalidated frame entries per weekday
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSchedule {
    days: [Vec<String>; 7],
}

impl RawSchedule {
    /// Create an empty raw schedule
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entries of a day with a comma-separated list of ranges
    pub fn set_day(&mut self, day: Weekday, frames: &str) {
        self.days[day_index(day)] = split_entries(frames);
    }

    /// Builder flavour of [`RawSchedule::set_day`]
    #[must_use]
    pub fn with_day(mut self, day: Weekday, frames: &str) -> Self {
        self.set_day(day, frames);
        self
    }

    /// The entries configured for a day
    #[must_use]
    pub fn entries(&self, day: Weekday) -> &[String] {
        &self.days[day_index(day)]
    }

    /// True when no day has any entry
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    /// Build from the options of the `decent` git config section
    ///
    /// Keys are weekday names, with or without the `decent.` prefix.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::UnknownWeekday` for a key that is not a weekday.
    pub fn from_git_options<I, K, V>(options: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let prefix = format!("{SECTION}.");
        let mut raw = Self::new();
        for (key, value) in options {
            let key = key.as_ref();
            let name = key.strip_prefix(&prefix).unwrap_or(key);
            let day = parse_weekday(name).ok_or_else(|| ScheduleError::UnknownWeekday {
                name: name.to_string(),
            })?;
            raw.set_day(day, value.as_ref());
        }
        Ok(raw)
    }

    /// Parse the plain-text template format
    ///
    /// ```text
    /// [decent]
    /// # comments are ignored
    /// Monday = 09:00/13:00, 14:00/17:00
    /// ```
    ///
    /// Lines without `=` are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::UnknownWeekday` when a key is not a weekday.
    pub fn from_plain_text(text: &str) -> Result<Self, ScheduleError> {
        let mut raw = Self::new();
        for line in text.lines() {
            if line.contains("[decent]") {
                continue;
            }
            let line = line.split_once('#').map_or(line, |(before, _)| before).trim();
            let Some((day, frames)) = line.split_once('=') else {
                continue;
            };
            let day = parse_weekday(day).ok_or_else(|| ScheduleError::UnknownWeekday {
                name: day.trim().to_string(),
            })?;
            raw.set_day(day, frames.trim());
        }
        Ok(raw)
    }

    /// Key/value pairs to persist in git config, Monday first
    #[must_use]
    pub fn to_git_options(&self) -> Vec<(String, String)> {
        WEEK_FROM_MONDAY
            .iter()
            .filter(|day| !self.entries(**day).is_empty())
            .map(|day| {
                (
                    format!("{SECTION}.{}", weekday_name(*day)),
                    self.entries(*day).join(", "),
                )
            })
            .collect()
    }
}

fn split_entries(frames: &str) -> Vec<String> {
    frames
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}
