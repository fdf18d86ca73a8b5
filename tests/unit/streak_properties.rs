/// Properties of the streak engine checked through the public API
use chrono::{Duration, NaiveDate};
use habit_streaks::*;

fn day(s: &str) -> NaiveDate {
    parse_calendar_date(s).expect("valid date")
}

fn days(list: &[&str]) -> Vec<NaiveDate> {
    list.iter().map(|s| day(s)).collect()
}

#[test]
fn current_never_exceeds_longest() {
    let as_of = day("2024-05-20");
    let histories = [
        vec![],
        days(&["2024-05-20"]),
        days(&["2024-05-18", "2024-05-19", "2024-05-20"]),
        days(&["2024-05-01", "2024-05-02", "2024-05-03", "2024-05-04", "2024-05-20"]),
        days(&["2024-05-19"]),
        days(&["2024-05-21", "2024-05-22"]),
    ];

    for dates in &histories {
        let stats = HabitStats::calculate(dates, None, as_of);
        assert!(stats.current_streak <= stats.longest_streak, "{:?}", dates);
    }
}

#[test]
fn longest_ignores_order_and_duplicates() {
    let ordered = days(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-10"]);
    let shuffled = days(&["2024-01-10", "2024-01-02", "2024-01-03", "2024-01-01", "2024-01-02", "2024-01-10"]);

    assert_eq!(longest_streak(&ordered), 3);
    assert_eq!(longest_streak(&shuffled), 3);
    assert_eq!(normalize(&shuffled), normalize(&ordered));
}

#[test]
fn missing_today_means_no_current_streak() {
    let as_of = day("2024-01-10");
    let yesterday_run = days(&["2024-01-07", "2024-01-08", "2024-01-09"]);

    assert_eq!(current_streak(&yesterday_run, as_of), 0);
    assert_eq!(longest_streak(&yesterday_run), 3);
}

#[test]
fn current_streak_counts_back_from_today() {
    let as_of = day("2024-01-10");

    let run: Vec<NaiveDate> = (0..3).map(|n| as_of - Duration::days(n)).collect();
    assert_eq!(current_streak(&run, as_of), 3);

    let gap = vec![as_of, as_of - Duration::days(2)];
    assert_eq!(current_streak(&gap, as_of), 1);
}

#[test]
fn streak_crosses_month_and_leap_day() {
    let dates = days(&["2024-02-28", "2024-02-29", "2024-03-01"]);
    assert_eq!(current_streak(&dates, day("2024-03-01")), 3);
}

#[test]
fn completion_window() {
    let as_of = day("2024-06-01");

    let single = completion_stats(&[as_of], Some(as_of), as_of);
    assert_eq!(single.total_days, 1);
    assert_eq!(single.completed_days, 1);
    assert!((single.completion_rate - 100.0).abs() < 1e-9);

    let empty = completion_stats(&[], Some(day("2024-05-01")), as_of);
    assert_eq!(empty.total_days, 32);
    assert_eq!(empty.completed_days, 0);
    assert_eq!(empty.completion_rate, 0.0);

    let future_start = completion_stats(&[as_of], Some(day("2024-07-01")), as_of);
    assert_eq!(future_start.total_days, 0);
    assert_eq!(future_start.completion_rate, 0.0);
}

#[test]
fn string_input_must_be_well_formed() {
    let as_of = day("2024-01-02");

    let stats = HabitStats::from_date_strings(&["2024-01-01", "2024-01-02", "2024-01-02"], None, as_of).unwrap();
    assert_eq!(stats.current_streak, 2);

    let bad = HabitStats::from_date_strings(&["2024-01-01", "yesterday"], None, as_of);
    assert!(matches!(bad, Err(DomainError::InvalidDate(_))));
}
