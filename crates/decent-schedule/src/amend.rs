// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit date amendment
//!
//! The [`Amender`] moves a commit date into the closest decent frame of a
//! [`Schedule`] while keeping the amended history strictly increasing. Dates
//! are amended oldest first, each one relative to the already amended date of
//! its predecessor.
//!
//! Instead of a seeded generator, the minute at which the commit was recorded
//! is used as noise (`minute % 10`), since it was already picked by a human.
//! Only when that yields zero is a substitute drawn from a [`NoiseSource`].
//!
//! # Example
//!
//! ```
//! use chrono::{DateTime, Weekday};
//! use decent_schedule::{Amender, FixedNoise, RawSchedule, Schedule};
//!
//! let raw = RawSchedule::new().with_day(Weekday::Mon, "09:00/17:00");
//! let schedule = Schedule::from_raw(&raw).unwrap();
//!
//! let sunday_evening = DateTime::parse_from_rfc3339("2024-01-28T18:30:00+00:00").unwrap();
//! let mut amender = Amender::new(&schedule).with_noise(FixedNoise(3));
//! let amended = amender.amend(sunday_evening, None, None);
//!
//! assert_eq!(amended.to_rfc3339(), "2024-01-29T09:00:00+00:00");
//! ```

use chrono::{DateTime, Duration, FixedOffset, Timelike};
use rand::Rng;
use tracing::debug;

use crate::schedule::Schedule;

/// Supplies a noise value when the commit minute cannot
pub trait NoiseSource {
    /// Minutes of noise to use instead of zero
    ///
    /// The amender clamps the value to `1..=9`.
    fn substitute(&mut self) -> i64;
}

const MIN_NOISE: i64 = 1;
const MAX_NOISE: i64 = 9;

/// Uniformly random substitute between 1 and 9 minutes
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNoise;

impl NoiseSource for RandomNoise {
    fn substitute(&mut self) -> i64 {
        rand::thread_rng().gen_range(MIN_NOISE..=MAX_NOISE)
    }
}

/// Always substitutes the same value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedNoise(pub i64);

impl NoiseSource for FixedNoise {
    fn substitute(&mut self) -> i64 {
        self.0
    }
}

/// Moves commit dates into decent time frames
#[derive(Debug, Clone)]
pub struct Amender<'a, N = RandomNoise> {
    schedule: &'a Schedule,
    threshold: u32,
    noise: N,
}

impl<'a> Amender<'a, RandomNoise> {
    /// Amender with random noise substitution and a zero interval threshold
    #[must_use]
    pub fn new(schedule: &'a Schedule) -> Self {
        Self {
            schedule,
            threshold: 0,
            noise: RandomNoise,
        }
    }
}

impl<'a, N: NoiseSource> Amender<'a, N> {
    /// Replace the noise source
    #[must_use]
    pub fn with_noise<M: NoiseSource>(self, noise: M) -> Amender<'a, M> {
        Amender {
            schedule: self.schedule,
            threshold: self.threshold,
            noise,
        }
    }

    /// Real intervals up to this many minutes are kept instead of noise
    ///
    /// Zero (the default) never keeps the real interval.
    #[must_use]
    pub fn with_threshold(mut self, minutes: u32) -> Self {
        self.threshold = minutes;
        self
    }

    /// The schedule dates are moved into
    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        self.schedule
    }

    /// Noise for a date: its minute modulo 10, substituted when zero
    ///
    /// Always within `1..=9`, so a commit moved after its predecessor never
    /// lands on the same minute.
    pub fn noise_for(&mut self, date: &DateTime<FixedOffset>) -> i64 {
        match i64::from(date.minute() % 10) {
            0 => self.noise.substitute().clamp(MIN_NOISE, MAX_NOISE),
            noise => noise,
        }
    }

    /// Amend a single date
    ///
    /// `previous_amended` is the amended date of the preceding commit and
    /// `previous_original` its date before amendment. Without a preceding
    /// commit the date is only snapped forward to the closest decent minute.
    /// A decent date that is already after its predecessor is returned as is.
    pub fn amend(
        &mut self,
        date: DateTime<FixedOffset>,
        previous_amended: Option<DateTime<FixedOffset>>,
        previous_original: Option<DateTime<FixedOffset>>,
    ) -> DateTime<FixedOffset> {
        let closest = self.schedule.closest_decent_minute(&date);

        let Some(previous) = previous_amended else {
            debug!(%date, minutes = closest.minutes_until, "No previous commit, snapping forward");
            return date + Duration::minutes(closest.minutes_until);
        };

        if closest.minutes_until == 0 && date > previous {
            debug!(%date, %previous, "Already decent and after previous commit");
            return date;
        }

        let noise = self.noise_for(&date);
        let real_interval = previous_original.map_or(0, |original| (date - original).num_minutes());
        let interval = if real_interval <= 0 || real_interval > i64::from(self.threshold) {
            noise
        } else {
            real_interval
        };
        debug!(%date, %previous, real_interval, interval, noise, threshold = self.threshold, "Amending");

        let mut amended = date;
        if previous >= amended {
            amended = previous + Duration::minutes(interval);
            debug!(%amended, "Moved after previous commit");
        }

        let closest = self.schedule.closest_decent_minute(&amended);
        if closest.minutes_until > 0 {
            let snapped = amended + Duration::minutes(closest.minutes_until);
            let noisy = snapped + Duration::minutes(noise);
            // frames shorter than the noise keep the frame start
            amended = if self.schedule.is_decent(&noisy) {
                noisy
            } else {
                snapped
            };
            debug!(%amended, minutes = closest.minutes_until, noise, "Moved to a different frame");
        }

        amended
    }

    /// Amend an oldest-first sequence of dates
    ///
    /// Each date is amended against the amended date and the original date
    /// of the one before it.
    pub fn amend_sequence(&mut self, dates: &[DateTime<FixedOffset>]) -> Vec<DateTime<FixedOffset>> {
        self.amend_sequence_after(None, dates)
    }

    /// Amend an oldest-first sequence that continues existing history
    ///
    /// `anchor` is the date of the commit right before the sequence, which
    /// is not rewritten. It serves as both the amended and the original
    /// date of the first commit's predecessor.
    pub fn amend_sequence_after(
        &mut self,
        anchor: Option<DateTime<FixedOffset>>,
        dates: &[DateTime<FixedOffset>],
    ) -> Vec<DateTime<FixedOffset>> {
        let mut amended: Vec<DateTime<FixedOffset>> = Vec::with_capacity(dates.len());
        let mut previous_original = anchor;
        for date in dates {
            let previous_amended = amended.last().copied().or(anchor);
            amended.push(self.amend(*date, previous_amended, previous_original));
            previous_original = Some(*date);
        }
        amended
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::raw::RawSchedule;
    use chrono::{TimeZone, Weekday};
    use proptest::prelude::*;

    fn workweek() -> Schedule {
        let mut raw = RawSchedule::new();
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            raw.set_day(day, "09:00/13:00, 14:00/17:30");
        }
        Schedule::from_raw(&raw).expect("valid schedule")
    }

    /// Oldest-first dates, mostly increasing with occasional clock skew
    fn history_strategy() -> impl Strategy<Value = Vec<DateTime<FixedOffset>>> {
        proptest::collection::vec(-30i64..600, 1..40).prop_map(|steps| {
            let offset = FixedOffset::east_opt(0).unwrap();
            let mut current = offset.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            steps
                .into_iter()
                .map(|step| {
                    current += Duration::minutes(step);
                    current
                })
                .collect()
        })
    }

    proptest! {
        /// Property: amended dates are strictly increasing
        #[test]
        fn prop_amended_sequence_is_increasing(
            dates in history_strategy(),
            threshold in 0u32..180,
            substitute in -20i64..=20,
        ) {
            let schedule = workweek();
            let mut amender = Amender::new(&schedule)
                .with_noise(FixedNoise(substitute))
                .with_threshold(threshold);
            let amended = amender.amend_sequence(&dates);

            prop_assert_eq!(amended.len(), dates.len());
            for pair in amended.windows(2) {
                prop_assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
            }
        }

        /// Property: every amended date is decent and never earlier than its original
        #[test]
        fn prop_amended_dates_are_decent(
            dates in history_strategy(),
            threshold in 0u32..180,
        ) {
            let schedule = workweek();
            let mut amender = Amender::new(&schedule)
                .with_noise(FixedNoise(5))
                .with_threshold(threshold);

            for (original, amended) in dates.iter().zip(amender.amend_sequence(&dates)) {
                prop_assert!(schedule.is_decent(&amended), "{} is not decent", amended);
                prop_assert!(amended >= *original);
            }
        }
    }
}
