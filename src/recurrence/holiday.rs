use chrono::Weekday;
use serde::Deserialize;

use crate::date::{days_in_month, CalendarDate};
use crate::error::{Error, ErrorKind, Result};

/// Keeps Easter-relative holidays within the year before or after Easter,
/// which is all `matches` looks at.
pub const MAX_EASTER_OFFSET: i64 = 300;

/// When a holiday falls within a year.
///
/// In the configuration file a rule is written as exactly one of these keys
/// next to the holiday's `name`:
///
/// ```toml
/// [[holidays]]
/// name = "New Year's Day"
/// fixed = { month = 1, day = 1 }
///
/// [[holidays]]
/// name = "Easter Monday"
/// easter = 1
///
/// [[holidays]]
/// name = "Memorial Day"
/// nth_weekday = { month = 5, weekday = "mon", nth = -1 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HolidayKind {
    Fixed { month: u32, day: u32 },
    /// Days relative to (Gregorian) Easter Sunday.
    Easter(i64),
    /// `nth` counts from the start of the month if positive, from its end if
    /// negative (-1 is the last such weekday).
    NthWeekday { month: u32, weekday: Weekday, nth: i8 },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawHolidayRule")]
pub struct HolidayRule {
    pub name: String,
    pub kind: HolidayKind,
}

/// A `[[holidays]]` entry as written in the configuration file.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHolidayRule {
    name: String,
    fixed: Option<FixedDay>,
    easter: Option<i64>,
    nth_weekday: Option<NthWeekday>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FixedDay {
    month: u32,
    day: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NthWeekday {
    month: u32,
    weekday: Weekday,
    nth: i8,
}

impl TryFrom<RawHolidayRule> for HolidayRule {
    type Error = Error;

    fn try_from(raw: RawHolidayRule) -> Result<Self> {
        let kinds = [
            raw.fixed
                .map(|FixedDay { month, day }| HolidayKind::Fixed { month, day }),
            raw.easter.map(HolidayKind::Easter),
            raw.nth_weekday.map(|NthWeekday { month, weekday, nth }| {
                HolidayKind::NthWeekday {
                    month,
                    weekday,
                    nth,
                }
            }),
        ];
        let mut kinds = kinds.into_iter().flatten();

        let reason = match (kinds.next(), kinds.next()) {
            (Some(kind), None) => return Ok(HolidayRule::new(&raw.name, kind)),
            (None, _) => "needs a fixed, easter or nth_weekday rule",
            (Some(_), Some(_)) => "names more than one rule",
        };
        Err(Error::new(
            ErrorKind::ConfigParse,
            &format!("holiday '{}': {}", raw.name, reason),
        ))
    }
}

impl HolidayRule {
    pub fn new(name: &str, kind: HolidayKind) -> Self {
        HolidayRule {
            name: name.to_owned(),
            kind,
        }
    }

    pub fn fixed(name: &str, month: u32, day: u32) -> Self {
        Self::new(name, HolidayKind::Fixed { month, day })
    }

    pub fn easter(name: &str, offset: i64) -> Self {
        Self::new(name, HolidayKind::Easter(offset))
    }

    pub fn nth_weekday(name: &str, month: u32, weekday: Weekday, nth: i8) -> Self {
        Self::new(name, HolidayKind::NthWeekday { month, weekday, nth })
    }

    pub fn matches(&self, date: &CalendarDate) -> bool {
        self.kind.matches(date)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(Error::new(
                ErrorKind::ConfigParse,
                &format!("holiday '{}': {}", self.name, reason),
            ))
        };

        if self.name.trim().is_empty() {
            return invalid("name must not be empty");
        }

        match self.kind {
            HolidayKind::Fixed { month, day } => {
                // Checked against a leap year so Feb 29 stays expressible
                if !(1..=12).contains(&month) || day == 0 || day > days_in_month(2000, month) {
                    return invalid(&format!("{}-{} is not a day of the year", month, day));
                }
            }
            HolidayKind::Easter(offset) => {
                if offset.abs() > MAX_EASTER_OFFSET {
                    return invalid(&format!(
                        "Easter offset {} is beyond {} days",
                        offset, MAX_EASTER_OFFSET
                    ));
                }
            }
            HolidayKind::NthWeekday { month, nth, .. } => {
                if !(1..=12).contains(&month) {
                    return invalid(&format!("{} is not a month", month));
                }
                if nth == 0 || !(-5..=5).contains(&nth) {
                    return invalid("nth must be within 1..=5 or -5..=-1");
                }
            }
        }

        Ok(())
    }
}

impl HolidayKind {
    pub fn matches(&self, date: &CalendarDate) -> bool {
        match *self {
            HolidayKind::Fixed { month, day } => date.month() == month && date.day() == day,
            HolidayKind::Easter(offset) => {
                // Large offsets may reach into a neighbouring year
                (date.year() - 1..=date.year() + 1)
                    .filter_map(easter_sunday)
                    .any(|easter| easter.add_days(offset) == *date)
            }
            HolidayKind::NthWeekday {
                month,
                weekday,
                nth,
            } => {
                if date.month() != month || date.weekday() != weekday {
                    return false;
                }

                let day = date.day() as i8;
                if nth > 0 {
                    (day - 1) / 7 + 1 == nth
                } else {
                    let remaining = days_in_month(date.year(), month) as i8 - day;
                    remaining / 7 + 1 == -nth
                }
            }
        }
    }
}

/// Easter Sunday of `year` in the Gregorian calendar (anonymous Gregorian
/// algorithm).
pub fn easter_sunday(year: i32) -> Option<CalendarDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b.div_euclid(4);
    let e = b.rem_euclid(4);
    let f = (b + 8).div_euclid(25);
    let g = (b - f + 1).div_euclid(3);
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c.div_euclid(4);
    let k = c.rem_euclid(4);
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l).div_euclid(451);
    let month = (h + l - 7 * m + 114).div_euclid(31);
    let day = (h + l - 7 * m + 114).rem_euclid(31) + 1;

    CalendarDate::from_ymd(year, month as u32, day as u32)
}
