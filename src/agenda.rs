use chrono::Weekday;

use crate::config::Config;
use crate::control::WindowState;
use crate::date::CalendarDate;
use crate::error::{Error, ErrorKind, Result};
use crate::recurrence::{recurrences_on, Anniversary, AnniversaryPerson, HolidayRule};
use crate::store::{Event, EventStore, Storage};

/// Which weekdays count as workdays and which as weekend.
///
/// A weekday may be in neither set, never in both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekdayClassification {
    workdays: Vec<Weekday>,
    weekends: Vec<Weekday>,
}

impl WeekdayClassification {
    pub fn new(workdays: &[Weekday], weekends: &[Weekday]) -> Result<Self> {
        if let Some(both) = workdays.iter().find(|day| weekends.contains(*day)) {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                &format!("{} is configured as workday and weekend", both),
            ));
        }

        Ok(WeekdayClassification {
            workdays: workdays.to_vec(),
            weekends: weekends.to_vec(),
        })
    }

    pub fn is_workday(&self, weekday: Weekday) -> bool {
        self.workdays.contains(&weekday)
    }

    pub fn is_weekend(&self, weekday: Weekday) -> bool {
        self.weekends.contains(&weekday)
    }
}

impl Default for WeekdayClassification {
    fn default() -> Self {
        use Weekday::*;

        WeekdayClassification {
            workdays: vec![Mon, Tue, Wed, Thu, Fri],
            weekends: vec![Sat, Sun],
        }
    }
}

/// Everything shown for one day of the window. Derived on every render and
/// never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayDescriptor {
    pub date: CalendarDate,
    /// Sunday = 0 through Saturday = 6.
    pub weekday_index: u32,
    pub is_workday: bool,
    pub is_weekend: bool,
    pub holidays: Vec<String>,
    pub birthdays: Vec<Anniversary>,
    pub death_anniversaries: Vec<Anniversary>,
    pub events: Vec<Event>,
}

/// The static, annual facts the calendar annotates days with.
#[derive(Clone, Debug, Default)]
pub struct Agenda {
    classification: WeekdayClassification,
    holidays: Vec<HolidayRule>,
    people: Vec<AnniversaryPerson>,
}

impl Agenda {
    pub fn new(
        classification: WeekdayClassification,
        holidays: Vec<HolidayRule>,
        people: Vec<AnniversaryPerson>,
    ) -> Self {
        Agenda {
            classification,
            holidays,
            people,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let calendar = &config.calendar;
        let classification =
            WeekdayClassification::new(&calendar.workdays, &calendar.weekends)?;

        Ok(Agenda::new(
            classification,
            config.holidays.clone(),
            config.people.clone(),
        ))
    }

    pub fn describe_day<S: Storage>(
        &self,
        date: CalendarDate,
        store: &EventStore<S>,
    ) -> DayDescriptor {
        let weekday = date.weekday();
        let recurrences = recurrences_on(&date, &self.holidays, &self.people);

        DayDescriptor {
            date,
            weekday_index: date.weekday_index(),
            is_workday: self.classification.is_workday(weekday),
            is_weekend: self.classification.is_weekend(weekday),
            holidays: recurrences.holidays,
            birthdays: recurrences.birthdays,
            death_anniversaries: recurrences.death_anniversaries,
            events: store.list_events(&date.day_key()).to_vec(),
        }
    }
}

/// One descriptor per day of `state`, starting at its first day.
///
/// Pure; cheap enough to call on every redraw.
pub fn generate_window<S: Storage>(
    state: &WindowState,
    agenda: &Agenda,
    store: &EventStore<S>,
) -> Vec<DayDescriptor> {
    (0..state.length() as i64)
        .map(|offset| agenda.describe_day(state.start().add_days(offset), store))
        .collect()
}
