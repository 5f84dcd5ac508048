use super::domain::ceil_days;
use chrono::{DateTime, Duration, Utc};

/// Short relative label for a due date, as shown on inbox cards.
///
/// "Today"/"Tomorrow" compare calendar days, not 24-hour buckets; everything
/// else uses the whole-day difference, falling back to an absolute date once
/// the horizon passes a week.
pub fn format_relative(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let day = date.date_naive();
    let today = now.date_naive();

    if day == today {
        return "Today".to_string();
    }
    if day == today + Duration::days(1) {
        return "Tomorrow".to_string();
    }

    let days = ceil_days(now, date);
    if days < 0 {
        format!("{} days overdue", days.abs())
    } else if days <= 7 {
        format!("{days} days")
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 14, 0, 0)
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn same_calendar_day_is_today_even_if_earlier() {
        let this_morning = Utc
            .with_ymd_and_hms(2025, 6, 10, 6, 0, 0)
            .single()
            .expect("valid datetime");
        assert_eq!(format_relative(this_morning, now()), "Today");
    }

    #[test]
    fn next_calendar_day_is_tomorrow() {
        let early_tomorrow = Utc
            .with_ymd_and_hms(2025, 6, 11, 1, 0, 0)
            .single()
            .expect("valid datetime");
        assert_eq!(format_relative(early_tomorrow, now()), "Tomorrow");
    }

    #[test]
    fn overdue_dates_report_days_late() {
        let last_week = now() - Duration::days(4);
        assert_eq!(format_relative(last_week, now()), "4 days overdue");
    }

    #[test]
    fn near_dates_report_days_remaining() {
        assert_eq!(format_relative(now() + Duration::days(5), now()), "5 days");
        assert_eq!(format_relative(now() + Duration::days(7), now()), "7 days");
    }

    #[test]
    fn far_dates_fall_back_to_absolute() {
        let next_month = now() + Duration::days(25);
        assert_eq!(format_relative(next_month, now()), "Jul 5, 2025");
    }
}
