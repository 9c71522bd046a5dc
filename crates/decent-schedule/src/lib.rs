// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! decent-schedule: Decent-hours schedule for git-decent
//!
//! This library crate models the weekly schedule of "decent" time frames and
//! moves commit dates into them while keeping their order.

#![warn(missing_docs)]

//! # Example
//!
//! ```
//! use chrono::{DateTime, Weekday};
//! use decent_schedule::{RawSchedule, Schedule};
//!
//! let raw = RawSchedule::from_plain_text("Monday = 09:00/13:00, 14:00/17:00").unwrap();
//! let schedule = Schedule::from_raw(&raw).unwrap();
//!
//! let lunch = DateTime::parse_from_rfc3339("2024-01-29T13:30:00+01:00").unwrap();
//! assert!(!schedule.is_decent(&lunch));
//! assert_eq!(schedule.closest_decent_minute(&lunch).minutes_until, 30);
//! assert_eq!(schedule.closest_decent_day(Weekday::Tue), (Weekday::Mon, 6));
//! ```

pub mod amend;
pub mod error;
pub mod raw;
pub mod schedule;

pub use amend::{Amender, FixedNoise, NoiseSource, RandomNoise};
pub use error::{FrameError, FrameErrorKind, ScheduleError};
pub use raw::RawSchedule;
pub use schedule::{DaySummary, DecentMinute, Schedule, TimeFrame};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::amend::{Amender, NoiseSource};
    pub use crate::error::ScheduleError;
    pub use crate::raw::RawSchedule;
    pub use crate::schedule::{Schedule, TimeFrame};
}
