#![no_main]

use chrono::{DateTime, Duration};
use decent_schedule::{Amender, FixedNoise, RawSchedule, Schedule};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(raw) = RawSchedule::from_plain_text(text) else {
        return;
    };
    let Ok(schedule) = Schedule::from_raw(&raw) else {
        return;
    };

    // every amended date of a valid schedule is decent and increasing
    let Ok(start) = DateTime::parse_from_rfc3339("2024-01-28T18:30:00+01:00") else {
        return;
    };
    let dates: Vec<_> = data
        .iter()
        .take(32)
        .scan(start, |date, step| {
            *date += Duration::minutes(i64::from(*step) * 7);
            Some(*date)
        })
        .collect();
    let amended = Amender::new(&schedule)
        .with_noise(FixedNoise(5))
        .amend_sequence(&dates);

    for pair in amended.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    assert!(amended.iter().all(|date| schedule.is_decent(date)));
});
