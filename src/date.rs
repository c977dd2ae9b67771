use chrono::{
    DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday,
};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A date without time of day or timezone.
///
/// Every comparison and recurrence check in this crate works on this type.
/// Timestamps must be normalized with one of the `from_*` constructors first.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub const MIN: CalendarDate = CalendarDate(NaiveDate::MIN);
    pub const MAX: CalendarDate = CalendarDate(NaiveDate::MAX);

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate)
    }

    /// Calendar day of `datetime` as seen in its own timezone.
    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self {
        CalendarDate(datetime.date_naive())
    }

    pub fn from_naive_datetime(datetime: &NaiveDateTime) -> Self {
        CalendarDate(datetime.date())
    }

    /// Calendar day of a unix timestamp in milliseconds, as seen in `tz`.
    ///
    /// Timestamps outside the representable range saturate to `MIN`/`MAX`.
    pub fn from_timestamp_millis<Tz: TimeZone>(millis: i64, tz: &Tz) -> Self {
        match NaiveDateTime::from_timestamp_millis(millis) {
            Some(utc) => CalendarDate(tz.from_utc_datetime(&utc).date_naive()),
            None if millis < 0 => Self::MIN,
            None => Self::MAX,
        }
    }

    pub fn today<Tz: TimeZone>(tz: &Tz) -> Self {
        Self::from_datetime(&Utc::now().with_timezone(tz))
    }

    pub fn today_local() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Shifts the date by `n` days in either direction.
    ///
    /// Results beyond chrono's supported range saturate to `MIN`/`MAX`.
    pub fn add_days(self, n: i64) -> Self {
        let shifted = if n >= 0 {
            self.0.checked_add_days(Days::new(n as u64))
        } else {
            self.0.checked_sub_days(Days::new(n.unsigned_abs()))
        };

        match shifted {
            Some(date) => CalendarDate(date),
            None if n < 0 => Self::MIN,
            None => Self::MAX,
        }
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Sunday = 0 through Saturday = 6.
    pub fn weekday_index(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    pub fn same_month_day(&self, other: &CalendarDate) -> bool {
        self.month() == other.month() && self.day() == other.day()
    }

    pub fn day_key(&self) -> DayKey {
        DayKey(*self)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        CalendarDate(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(CalendarDate)
            .map_err(|e| {
                Error::new(
                    ErrorKind::DateParse,
                    &format!("'{}' is not a YYYY-MM-DD date: {}", s, e),
                )
            })
    }
}

/// Canonical storage key of a single calendar day.
///
/// Renders as `YYYY-MM-DD` and depends on nothing but year, month and day, so
/// the same day maps to the same key regardless of locale or timezone.
/// Keys order chronologically.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct DayKey(CalendarDate);

impl DayKey {
    pub fn date(&self) -> CalendarDate {
        self.0
    }
}

impl From<CalendarDate> for DayKey {
    fn from(date: CalendarDate) -> Self {
        DayKey(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DayKey {
    type Err = Error;

    /// Only the exact `YYYY-MM-DD` rendering is accepted, so two different
    /// strings never name the same day.
    fn from_str(s: &str) -> Result<Self> {
        let key = CalendarDate::from_str(s).map(DayKey)?;
        if key.to_string() != s {
            return Err(Error::new(
                ErrorKind::DateParse,
                &format!("'{}' is not a canonical day key, expected '{}'", s, key),
            ));
        }

        Ok(key)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        // December of the last representable year
        (Some(_), None) => 31,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> CalendarDate {
        s.parse().expect("valid test date")
    }

    #[test]
    fn add_days_round_trips() {
        let start = date("2023-12-31");
        for n in [-1000, -366, -59, -1, 0, 1, 28, 365, 10_000] {
            assert_eq!(start.add_days(n).add_days(-n), start, "n = {}", n);
        }
    }

    #[test]
    fn add_days_crosses_month_and_year_boundaries() {
        assert_eq!(date("2024-02-28").add_days(1), date("2024-02-29"));
        assert_eq!(date("2023-02-28").add_days(1), date("2023-03-01"));
        assert_eq!(date("2023-12-31").add_days(1), date("2024-01-01"));
        assert_eq!(date("2024-01-01").add_days(-1), date("2023-12-31"));
        assert_eq!(date("2024-03-01").add_days(-1), date("2024-02-29"));
        assert_eq!(date("2024-01-01").add_days(366), date("2025-01-01"));
    }

    #[test]
    fn add_days_saturates_instead_of_failing() {
        assert_eq!(date("2024-01-01").add_days(i64::MAX), CalendarDate::MAX);
        assert_eq!(date("2024-01-01").add_days(i64::MIN), CalendarDate::MIN);
    }

    #[test]
    fn normalize_uses_calendar_day_of_the_timezone() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 5, 23, 30, 0).unwrap();
        let berlin: chrono_tz::Tz = "Europe/Berlin".parse().unwrap();

        assert_eq!(CalendarDate::from_datetime(&utc), date("2024-03-05"));
        assert_eq!(
            CalendarDate::from_datetime(&utc.with_timezone(&berlin)),
            date("2024-03-06")
        );
        assert_eq!(
            CalendarDate::from_timestamp_millis(utc.timestamp_millis(), &berlin),
            date("2024-03-06")
        );
        assert_eq!(
            CalendarDate::from_timestamp_millis(i64::MAX, &Utc),
            CalendarDate::MAX
        );
    }

    #[test]
    fn equality_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 1).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();

        assert_eq!(
            CalendarDate::from_datetime(&morning),
            CalendarDate::from_datetime(&evening)
        );
    }

    #[test]
    fn weekday_index_starts_on_sunday() {
        assert_eq!(date("2024-03-03").weekday_index(), 0);
        assert_eq!(date("2024-03-05").weekday_index(), 2);
        assert_eq!(date("2024-03-09").weekday_index(), 6);
    }

    #[test]
    fn dates_typed_by_hand_may_be_unpadded() {
        assert_eq!(date("2024-3-5"), date("2024-03-05"));
    }

    #[test]
    fn day_keys_are_canonical() {
        assert_eq!(date("2024-03-05").day_key().to_string(), "2024-03-05");
        assert_eq!(
            "2024-03-05".parse::<DayKey>().unwrap(),
            date("2024-03-05").day_key()
        );
        assert!("2024-3-5".parse::<DayKey>().is_err());
        assert!(" 2024-03-05".parse::<DayKey>().is_err());
        assert!("2023-02-29".parse::<DayKey>().is_err());
        assert!("tomorrow".parse::<DayKey>().is_err());
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2100));
    }
}
