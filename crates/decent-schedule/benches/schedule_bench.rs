use chrono::{DateTime, Duration, FixedOffset, TimeZone, Weekday};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use decent_schedule::{Amender, FixedNoise, RawSchedule, Schedule};

/// Office hours on weekdays, nothing on the weekend
fn office_schedule() -> Schedule {
    let mut raw = RawSchedule::new();
    for day in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ] {
        raw.set_day(day, "09:00/12:30, 13:30/17:30");
    }
    Schedule::from_raw(&raw).expect("Failed to build schedule")
}

/// Commits every 37 minutes, around the clock
fn history(len: usize) -> Vec<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(3600).expect("valid offset");
    let start = offset
        .with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
        .single()
        .expect("valid start date");
    (0..len)
        .map(|i| start + Duration::minutes(37 * i as i64))
        .collect()
}

fn schedule_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule");

    group.bench_function("from_raw", |b| {
        let raw = RawSchedule::from_plain_text(
            "Monday = 09:00/12:30, 13:30/17:30\nWednesday = 09:00/17:00\nSaturday = 10:00/11:00",
        )
        .expect("Failed to parse");
        b.iter(|| Schedule::from_raw(&raw).expect("Failed to build schedule"))
    });

    let schedule = office_schedule();
    let dates = history(7 * 24 * 60 / 37);
    group.bench_function("closest_decent_minute_week", |b| {
        b.iter(|| {
            dates
                .iter()
                .map(|date| schedule.closest_decent_minute(date).minutes_until)
                .sum::<i64>()
        })
    });

    group.finish();
}

fn amend_benchmarks(c: &mut Criterion) {
    let schedule = office_schedule();
    let mut group = c.benchmark_group("amend");

    for len in [10, 100, 1000] {
        let dates = history(len);
        group.bench_with_input(BenchmarkId::new("amend_sequence", len), &dates, |b, dates| {
            b.iter(|| {
                Amender::new(&schedule)
                    .with_noise(FixedNoise(5))
                    .with_threshold(60)
                    .amend_sequence(dates)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, schedule_benchmarks, amend_benchmarks);
criterion_main!(benches);
