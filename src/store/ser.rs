//! On-disk layout of the event store.
//!
//! ```json
//! { "version": 1, "days": { "2024-03-05": [ { "description": "Meeting", "color": "#fff" } ] } }
//! ```
//!
//! Days without events are left out. Any other `version` is rejected, as is
//! the old layout that stored a single event per day.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Event;
use crate::date::DayKey;
use crate::error::{Error, ErrorKind, Result};

pub const SCHEMA_VERSION: u32 = 1;

pub type Days = BTreeMap<DayKey, Vec<Event>>;

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    version: u32,
    days: BTreeMap<&'a DayKey, &'a Vec<Event>>,
}

#[derive(Deserialize)]
struct StoreHeader {
    version: u32,
}

#[derive(Deserialize)]
struct StoreDocument {
    #[serde(with = "serde_with::rust::maps_duplicate_key_is_error")]
    days: Days,
}

pub fn encode(days: &Days) -> Result<String> {
    let document = StoreDocumentRef {
        version: SCHEMA_VERSION,
        days: days.iter().filter(|(_, events)| !events.is_empty()).collect(),
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn decode(contents: &str) -> Result<Days> {
    let header: StoreHeader = serde_json::from_str(contents)?;
    if header.version != SCHEMA_VERSION {
        return Err(Error::new(
            ErrorKind::Persistence,
            &format!(
                "event store has layout version {}, expected {}",
                header.version, SCHEMA_VERSION
            ),
        ));
    }

    let mut document: StoreDocument = serde_json::from_str(contents)?;
    document.days.retain(|_, events| !events.is_empty());

    Ok(document.days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn event(description: &str, color: &str) -> Event {
        Event::new(description.to_owned(), color.parse().unwrap())
    }

    #[test]
    fn round_trip_keeps_order_and_drops_empty_days() {
        let mut days = Days::new();
        days.insert(
            key("2024-03-05"),
            vec![event("Meeting", "#fff"), event("Dentist", "#f28b82")],
        );
        days.insert(key("2024-03-06"), vec![]);
        days.insert(key("1999-12-31"), vec![event("Party", "#aecbfa")]);

        let decoded = decode(&encode(&days).unwrap()).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[&key("2024-03-05")], days[&key("2024-03-05")]);
        assert_eq!(decoded[&key("1999-12-31")], days[&key("1999-12-31")]);
    }

    #[test]
    fn layout_is_keyed_by_calendar_day() {
        let mut days = Days::new();
        days.insert(key("2024-03-05"), vec![event("Meeting", "#fff")]);

        let value: serde_json::Value = serde_json::from_str(&encode(&days).unwrap()).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["days"]["2024-03-05"][0]["description"], "Meeting");
        assert_eq!(value["days"]["2024-03-05"][0]["color"], "#fff");
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let err = decode(r#"{"version": 2, "days": {}}"#).unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn single_event_days_are_rejected() {
        let err = decode(
            r##"{"version": 1, "days": {"2024-03-05": {"description": "Old", "color": "#fff"}}}"##,
        )
        .unwrap_err();
        assert!(err.is_persistence());

        let err = decode(r##"{"Tue Mar 05 2024": [{"description": "Old", "color": "#fff"}]}"##)
            .unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn malformed_keys_are_rejected() {
        let err = decode(r#"{"version": 1, "days": {"yesterday": []}}"#).unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn keys_naming_the_same_day_twice_are_rejected() {
        let unpadded = r##"{"version": 1, "days": {
            "2024-03-05": [{"description": "A", "color": "#fff"}],
            "2024-3-5": [{"description": "B", "color": "#000"}]
        }}"##;
        assert!(decode(unpadded).unwrap_err().is_persistence());

        let repeated = r##"{"version": 1, "days": {
            "2024-03-05": [{"description": "A", "color": "#fff"}],
            "2024-03-05": [{"description": "B", "color": "#000"}]
        }}"##;
        assert!(decode(repeated).unwrap_err().is_persistence());
    }
}
