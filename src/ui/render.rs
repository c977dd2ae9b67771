use chrono::Month;
use itertools::Itertools;
use num_traits::FromPrimitive;
use std::fmt;

use crate::agenda::DayDescriptor;
use crate::config::CalendarConfig;
use crate::date::CalendarDate;

const TODAY_CHAR: char = '*';
const WEEKEND_CHAR: char = '~';
const INDENT: &str = "      ";

/// Plain text view of a day window, one block per month.
///
/// ```text
/// March 2024
/// * Sun 31 ~  Spring
///       Birthday: Ada (34)
///       [0] Dentist (#aecbfa)
///   Mon 01
/// ```
pub struct WindowView<'a> {
    days: &'a [DayDescriptor],
    today: CalendarDate,
    calendar: &'a CalendarConfig,
}

impl<'a> WindowView<'a> {
    pub fn new(
        days: &'a [DayDescriptor],
        today: CalendarDate,
        calendar: &'a CalendarConfig,
    ) -> Self {
        WindowView {
            days,
            today,
            calendar,
        }
    }

    fn fmt_day(&self, f: &mut fmt::Formatter<'_>, day: &DayDescriptor) -> fmt::Result {
        let marker = if day.date == self.today { TODAY_CHAR } else { ' ' };

        write!(
            f,
            "{} {} {:02}",
            marker,
            self.calendar.weekday_name(day.weekday_index),
            day.date.day()
        )?;
        if day.is_weekend {
            write!(f, " {}", WEEKEND_CHAR)?;
        }
        if !day.holidays.is_empty() {
            write!(f, "  {}", day.holidays.iter().join(", "))?;
        }
        writeln!(f)?;

        for birthday in &day.birthdays {
            writeln!(
                f,
                "{}Birthday: {} ({})",
                INDENT, birthday.name, birthday.years_elapsed
            )?;
        }
        for anniversary in &day.death_anniversaries {
            writeln!(
                f,
                "{}Died: {} ({})",
                INDENT, anniversary.name, anniversary.years_elapsed
            )?;
        }
        for (idx, event) in day.events.iter().enumerate() {
            writeln!(f, "{}[{}] {} ({})", INDENT, idx, event.description, event.color)?;
        }

        Ok(())
    }
}

impl fmt::Display for WindowView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let months = self
            .days
            .iter()
            .group_by(|day| (day.date.year(), day.date.month()));

        for (idx, ((year, month), days)) in months.into_iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            match Month::from_u32(month) {
                Some(month) => writeln!(f, "{} {}", month.name(), year)?,
                None => writeln!(f, "{:02}/{}", month, year)?,
            }
            for day in days {
                self.fmt_day(f, day)?;
            }
        }

        Ok(())
    }
}
