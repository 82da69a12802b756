//! Shortest-precision UTC timestamp and date32 rendering per spec.md §4.2's
//! sub-day-component table.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    fn units_per_day(self) -> i64 {
        match self {
            TimeUnit::Millisecond => 86_400_000,
            TimeUnit::Microsecond => 86_400_000_000,
            TimeUnit::Nanosecond => 86_400_000_000_000,
        }
    }

    fn units_per_second(self) -> i64 {
        match self {
            TimeUnit::Millisecond => 1_000,
            TimeUnit::Microsecond => 1_000_000,
            TimeUnit::Nanosecond => 1_000_000_000,
        }
    }

    fn subsec_digits(self) -> usize {
        match self {
            TimeUnit::Millisecond => 3,
            TimeUnit::Microsecond => 6,
            TimeUnit::Nanosecond => 9,
        }
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("1970-01-01 is a valid date")
}

/// `value` is the number of `unit`s since the Unix epoch (signed; UTC).
pub fn render_timestamp(value: i64, unit: TimeUnit) -> String {
    let per_day = unit.units_per_day();
    let per_second = unit.units_per_second();

    let days = value.div_euclid(per_day);
    let of_day = value.rem_euclid(per_day);

    let subsec = of_day % per_second;
    let total_seconds = of_day / per_second;
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;

    let date = epoch() + chrono::Duration::days(days);
    let date_str = date.format("%Y-%m-%d").to_string();

    if h == 0 && m == 0 && s == 0 && subsec == 0 {
        date_str
    } else if m == 0 && s == 0 && subsec == 0 {
        format!("{date_str}T{h:02}:00:00Z")
    } else if s == 0 && subsec == 0 {
        format!("{date_str}T{h:02}:{m:02}:00Z")
    } else if subsec == 0 {
        format!("{date_str}T{h:02}:{m:02}:{s:02}Z")
    } else {
        let width = unit.subsec_digits();
        format!("{date_str}T{h:02}:{m:02}:{s:02}.{subsec:0width$}Z")
    }
}

/// `days` is the number of days since the Unix epoch (proleptic Gregorian).
pub fn render_date32(days: i32) -> String {
    let date = epoch() + chrono::Duration::days(days as i64);
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_midnight_is_date_only() {
        assert_eq!(render_timestamp(0, TimeUnit::Millisecond), "1970-01-01");
    }

    #[test]
    fn hour_only() {
        let v = 5 * 3_600_000;
        assert_eq!(
            render_timestamp(v, TimeUnit::Millisecond),
            "1970-01-01T05:00:00Z"
        );
    }

    #[test]
    fn ms_subsecond_three_digits() {
        let v = 8;
        assert_eq!(
            render_timestamp(v, TimeUnit::Millisecond),
            "1970-01-01T00:00:00.008Z"
        );
    }

    #[test]
    fn ns_subsecond_nine_digits() {
        let v = 7_000_000_123;
        assert_eq!(
            render_timestamp(v, TimeUnit::Nanosecond),
            "1970-01-01T00:00:07.000000123Z"
        );
    }

    #[test]
    fn date32_renders_plain_date() {
        assert_eq!(render_date32(0), "1970-01-01");
        assert_eq!(render_date32(-1), "1969-12-31");
    }
}
