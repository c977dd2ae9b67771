//! Annual facts attached to calendar days: holidays, birthdays and death
//! anniversaries.

pub mod anniversary;
pub mod holiday;

pub use anniversary::{Anniversary, AnniversaryPerson};
pub use holiday::{easter_sunday, HolidayKind, HolidayRule};

use crate::date::CalendarDate;

/// Everything that recurs on one particular date.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Recurrences {
    pub holidays: Vec<String>,
    pub birthdays: Vec<Anniversary>,
    pub death_anniversaries: Vec<Anniversary>,
}

impl Recurrences {
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty() && self.birthdays.is_empty() && self.death_anniversaries.is_empty()
    }
}

/// Collects the holidays and anniversaries firing on `date`, each list in
/// the order of its configuration.
pub fn recurrences_on(
    date: &CalendarDate,
    holidays: &[HolidayRule],
    people: &[AnniversaryPerson],
) -> Recurrences {
    Recurrences {
        holidays: holidays
            .iter()
            .filter(|rule| rule.matches(date))
            .map(|rule| rule.name.clone())
            .collect(),
        birthdays: people
            .iter()
            .filter_map(|person| person.birthday_on(date))
            .collect(),
        death_anniversaries: people
            .iter()
            .filter_map(|person| person.death_anniversary_on(date))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn preserves_configured_order() {
        let holidays = vec![
            HolidayRule::fixed("Second", 3, 5),
            HolidayRule::fixed("Elsewhen", 3, 6),
            HolidayRule::fixed("First", 3, 5),
        ];
        let people = vec![
            AnniversaryPerson::new("Zoe".to_owned(), date("1990-03-05"), None),
            AnniversaryPerson::new(
                "Bob".to_owned(),
                date("1950-01-01"),
                Some(date("2000-03-05")),
            ),
            AnniversaryPerson::new("Al".to_owned(), date("2001-03-05"), None),
        ];

        let found = recurrences_on(&date("2024-03-05"), &holidays, &people);

        assert_eq!(found.holidays, vec!["Second", "First"]);
        assert_eq!(
            found.birthdays,
            vec![
                Anniversary {
                    name: "Zoe".to_owned(),
                    years_elapsed: 34
                },
                Anniversary {
                    name: "Al".to_owned(),
                    years_elapsed: 23
                },
            ]
        );
        assert_eq!(
            found.death_anniversaries,
            vec![Anniversary {
                name: "Bob".to_owned(),
                years_elapsed: 24
            }]
        );
    }

    #[test]
    fn quiet_days_are_empty() {
        let holidays = vec![HolidayRule::fixed("New Year", 1, 1)];
        let found = recurrences_on(&date("2024-07-14"), &holidays, &[]);

        assert!(found.is_empty());
    }
}
