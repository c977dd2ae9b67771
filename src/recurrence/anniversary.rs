use derive_more::Constructor;
use serde::Deserialize;

use crate::date::CalendarDate;
use crate::error::{Error, ErrorKind, Result};

/// Someone whose birthday (and possibly death) is remembered every year.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Constructor)]
pub struct AnniversaryPerson {
    pub name: String,
    pub birth: CalendarDate,
    #[serde(default)]
    pub death: Option<CalendarDate>,
}

/// A fired anniversary with the number of full years since the original date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anniversary {
    pub name: String,
    pub years_elapsed: i32,
}

impl AnniversaryPerson {
    /// Birthdays recur on the birth month/day from the birth year on, and stop
    /// once the person has died. A death on the birthday itself still ends
    /// the series from the following year.
    pub fn birthday_on(&self, date: &CalendarDate) -> Option<Anniversary> {
        let alive = self.death.map_or(true, |death| death > *date);

        if alive && self.birth.same_month_day(date) && self.birth.year() <= date.year() {
            Some(Anniversary {
                name: self.name.clone(),
                years_elapsed: date.year() - self.birth.year(),
            })
        } else {
            None
        }
    }

    pub fn death_anniversary_on(&self, date: &CalendarDate) -> Option<Anniversary> {
        let death = self.death?;

        if death.same_month_day(date) && death.year() <= date.year() {
            Some(Anniversary {
                name: self.name.clone(),
                years_elapsed: date.year() - death.year(),
            })
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                "person name must not be empty",
            ));
        }

        match self.death {
            Some(death) if death < self.birth => Err(Error::new(
                ErrorKind::ConfigParse,
                &format!("'{}' died ({}) before being born ({})", self.name, death, self.birth),
            )),
            _ => Ok(()),
        }
    }
}
