//! User events, kept per calendar day in display order.
//!
//! An event has no identity besides its position within its day, so every
//! operation addresses events by `(DayKey, index)`. Deleting an event shifts
//! the following ones down; indices held across a delete are stale.
//!
//! Every mutation is written to the backing [`Storage`] before it returns. If
//! writing fails the mutation is undone and a persistence error is returned.

pub mod ser;
pub mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage};

use derive_more::Constructor;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

use crate::date::DayKey;
use crate::error::{Error, ErrorKind, Result};
use ser::Days;

pub const DEFAULT_PALETTE: &[&str] = &[
    "#f28b82", "#fbbc04", "#fff475", "#ccff90", "#a7ffeb", "#cbf0f8", "#aecbfa", "#d7aefb",
    "#fdcfe8",
];

#[derive(Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Color(String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        if token.is_empty() || token.contains(char::is_whitespace) {
            Err(Error::new(
                ErrorKind::ColorParse,
                &format!("'{}' is not a color token", s),
            ))
        } else {
            Ok(Color(token.to_owned()))
        }
    }
}

/// Colors handed out to events created without one. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Color>")]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    /// Uniformly random palette entry.
    pub fn pick(&self) -> Color {
        let idx = rand::thread_rng().gen_range(0..self.0.len());
        self.0[idx].clone()
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = Error;

    fn try_from(colors: Vec<Color>) -> Result<Self> {
        if colors.is_empty() {
            Err(Error::new(ErrorKind::ConfigParse, "palette must not be empty"))
        } else {
            Ok(Palette(colors))
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette(
            DEFAULT_PALETTE
                .iter()
                .map(|token| Color((*token).to_owned()))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Constructor)]
pub struct Event {
    pub description: String,
    pub color: Color,
}

/// Fields to replace in an existing event; `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub description: Option<String>,
    pub color: Option<Color>,
}

impl EventPatch {
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.color.is_none()
    }
}

#[derive(Debug)]
pub struct EventStore<S: Storage> {
    days: Days,
    storage: S,
    palette: Palette,
    revision: u64,
}

impl<S: Storage> EventStore<S> {
    /// Opens a store and loads whatever `storage` currently holds.
    pub fn open(storage: S, palette: Palette) -> Result<Self> {
        let mut store = EventStore {
            days: Days::new(),
            storage,
            palette,
            revision: 0,
        };
        store.load()?;

        Ok(store)
    }

    /// Events of the day in display order; empty if there are none.
    pub fn list_events(&self, key: &DayKey) -> &[Event] {
        self.days.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days that currently hold at least one event, in chronological order.
    pub fn keys(&self) -> impl Iterator<Item = &DayKey> {
        self.days.keys()
    }

    /// Appends an event to the day. Without a `color` one is picked from the
    /// palette. Blank descriptions are rejected and leave the store untouched.
    pub fn create_event(
        &mut self,
        key: DayKey,
        description: &str,
        color: Option<Color>,
    ) -> Result<()> {
        validate_description(description)?;

        let color = color.unwrap_or_else(|| self.palette.pick());
        let mut events = self.list_events(&key).to_vec();
        events.push(Event::new(description.to_owned(), color));

        self.commit(key, events)?;
        log::debug!("Created event #{} on {}", self.list_events(&key).len() - 1, key);

        Ok(())
    }

    pub fn update_event(&mut self, key: &DayKey, index: usize, patch: EventPatch) -> Result<()> {
        let mut events = self.list_events(key).to_vec();
        let count = events.len();
        let event = events
            .get_mut(index)
            .ok_or_else(|| not_found(key, index, count))?;

        if let Some(description) = patch.description {
            validate_description(&description)?;
            event.description = description;
        }
        if let Some(color) = patch.color {
            event.color = color;
        }

        self.commit(*key, events)?;
        log::debug!("Updated event #{} on {}", index, key);

        Ok(())
    }

    /// Moves the event at `from` to position `to`; the events in between
    /// shift by one.
    pub fn move_event(&mut self, key: &DayKey, from: usize, to: usize) -> Result<()> {
        let mut events = self.list_events(key).to_vec();
        let count = events.len();
        if let Some(&index) = [from, to].iter().find(|&&idx| idx >= count) {
            return Err(not_found(key, index, count));
        }
        if from == to {
            return Ok(());
        }

        let event = events.remove(from);
        events.insert(to, event);
        self.commit(*key, events)?;
        log::debug!("Moved event #{} to #{} on {}", from, to, key);

        Ok(())
    }

    /// Removes the event at `index`, shifting later events down by one.
    ///
    /// Deleting from a day without events succeeds without doing anything.
    pub fn delete_event(&mut self, key: &DayKey, index: usize) -> Result<()> {
        let mut events = self.list_events(key).to_vec();
        if events.is_empty() {
            return Ok(());
        }
        if index >= events.len() {
            return Err(not_found(key, index, events.len()));
        }

        events.remove(index);
        self.commit(*key, events)?;
        log::debug!("Deleted event #{} on {}", index, key);

        Ok(())
    }

    /// Writes the complete mapping to storage.
    pub fn persist(&mut self) -> Result<()> {
        let contents = ser::encode(&self.days)?;
        self.storage.save(&contents)
    }

    /// Replaces the in-memory mapping with what storage holds.
    ///
    /// On failure the current contents are kept.
    pub fn load(&mut self) -> Result<()> {
        let days = self.read_storage()?;

        log::info!(
            "Loaded {} events on {} days",
            days.values().map(Vec::len).sum::<usize>(),
            days.len()
        );
        self.days = days;
        self.revision += 1;

        Ok(())
    }

    /// Picks up changes another process made to the storage. Returns whether
    /// anything changed.
    pub fn reload(&mut self) -> Result<bool> {
        let days = self.read_storage()?;
        if days == self.days {
            return Ok(false);
        }

        if let Some(path) = self.storage.location() {
            log::info!("Events in '{}' changed, reloading", path.display());
        }
        self.days = days;
        self.revision += 1;

        Ok(true)
    }

    /// Bumped after every committed mutation or load.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn read_storage(&self) -> Result<Days> {
        match self.storage.load()? {
            Some(contents) => ser::decode(&contents),
            None => Ok(Days::new()),
        }
    }

    fn commit(&mut self, key: DayKey, events: Vec<Event>) -> Result<()> {
        let previous = self.replace_day(key, events);

        if let Err(err) = self.persist() {
            log::error!("Could not persist events of {}: {}", key, err);
            self.replace_day(key, previous);
            return Err(err);
        }

        self.revision += 1;
        Ok(())
    }

    fn replace_day(&mut self, key: DayKey, events: Vec<Event>) -> Vec<Event> {
        let previous = if events.is_empty() {
            self.days.remove(&key)
        } else {
            self.days.insert(key, events)
        };

        previous.unwrap_or_default()
    }
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        Err(Error::new(
            ErrorKind::Validation,
            "event description must not be empty",
        ))
    } else {
        Ok(())
    }
}

fn not_found(key: &DayKey, index: usize, count: usize) -> Error {
    Error::new(
        ErrorKind::NotFound,
        &format!("{} has {} events, there is no #{}", key, count, index),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStorage {
        fail_saves: bool,
        inner: MemoryStorage,
    }

    impl Storage for BrokenStorage {
        fn load(&self) -> Result<Option<String>> {
            self.inner.load()
        }

        fn save(&mut self, contents: &str) -> Result<()> {
            if self.fail_saves {
                Err(Error::new(ErrorKind::Persistence, "disk on fire"))
            } else {
                self.inner.save(contents)
            }
        }
    }

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn color(s: &str) -> Color {
        s.parse().unwrap()
    }

    fn event(description: &str, c: &str) -> Event {
        Event::new(description.to_owned(), color(c))
    }

    fn store() -> EventStore<MemoryStorage> {
        EventStore::open(MemoryStorage::default(), Palette::default()).unwrap()
    }

    #[test]
    fn absent_days_read_as_empty() {
        let store = store();

        assert!(store.list_events(&key("2024-03-05")).is_empty());
    }

    #[test]
    fn create_then_list() {
        let mut store = store();
        let day = key("2024-03-05");

        store.create_event(day, "Meeting", Some(color("#fff"))).unwrap();

        assert_eq!(store.list_events(&day), &[event("Meeting", "#fff")]);
    }

    #[test]
    fn empty_description_is_rejected() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "Meeting", Some(color("#fff"))).unwrap();

        let err = store.create_event(day, "", Some(color("#000"))).unwrap_err();
        assert!(err.is_validation());
        assert!(store.create_event(day, "   ", None).unwrap_err().is_validation());

        assert_eq!(store.list_events(&day), &[event("Meeting", "#fff")]);
    }

    #[test]
    fn missing_color_comes_from_palette() {
        let mut store = store();
        let day = key("2024-03-05");

        store.create_event(day, "Anything", None).unwrap();

        let picked = &store.list_events(&day)[0].color;
        assert!(Palette::default().colors().contains(picked));
    }

    #[test]
    fn delete_shifts_following_events() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();
        store.create_event(day, "B", Some(color("#222"))).unwrap();

        store.delete_event(&day, 0).unwrap();

        assert_eq!(store.list_events(&day), &[event("B", "#222")]);
    }

    #[test]
    fn delete_on_empty_day_is_a_noop() {
        let mut store = store();
        let revision = store.revision();

        store.delete_event(&key("2024-03-05"), 3).unwrap();

        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn delete_out_of_bounds_is_not_found() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();

        assert!(store.delete_event(&day, 1).unwrap_err().is_not_found());
        assert_eq!(store.list_events(&day).len(), 1);
    }

    #[test]
    fn move_reorders_within_the_day() {
        let mut store = store();
        let day = key("2024-03-05");
        for (description, c) in [("A", "#111"), ("B", "#222"), ("C", "#333")] {
            store.create_event(day, description, Some(color(c))).unwrap();
        }

        store.move_event(&day, 0, 2).unwrap();
        assert_eq!(
            store.list_events(&day),
            &[event("B", "#222"), event("C", "#333"), event("A", "#111")]
        );

        store.move_event(&day, 2, 0).unwrap();
        store.move_event(&day, 1, 1).unwrap();
        assert_eq!(
            store.list_events(&day),
            &[event("A", "#111"), event("B", "#222"), event("C", "#333")]
        );

        let reopened = EventStore::open(store.storage().clone(), Palette::default()).unwrap();
        assert_eq!(reopened.list_events(&day), store.list_events(&day));
    }

    #[test]
    fn move_out_of_bounds_is_not_found() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();

        assert!(store.move_event(&day, 0, 1).unwrap_err().is_not_found());
        assert!(store.move_event(&day, 3, 0).unwrap_err().is_not_found());
        assert!(store
            .move_event(&key("2024-03-06"), 0, 0)
            .unwrap_err()
            .is_not_found());
        assert_eq!(store.list_events(&day), &[event("A", "#111")]);
    }

    #[test]
    fn deleting_last_event_empties_the_day() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();

        store.delete_event(&day, 0).unwrap();

        assert!(store.list_events(&day).is_empty());
        assert_eq!(store.keys().count(), 0);
    }

    #[test]
    fn update_merges_fields() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();
        store.create_event(day, "B", Some(color("#222"))).unwrap();

        store
            .update_event(&day, 1, EventPatch::default().color(color("#333")))
            .unwrap();
        store
            .update_event(&day, 0, EventPatch::default().description("A2"))
            .unwrap();

        assert_eq!(
            store.list_events(&day),
            &[event("A2", "#111"), event("B", "#333")]
        );
    }

    #[test]
    fn update_out_of_bounds_is_not_found() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();

        let err = store
            .update_event(&day, 5, EventPatch::default().description("X"))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.list_events(&day), &[event("A", "#111")]);
    }

    #[test]
    fn update_rejects_blank_description() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();

        let err = store
            .update_event(&day, 0, EventPatch::default().description(""))
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store.list_events(&day), &[event("A", "#111")]);
    }

    #[test]
    fn mutations_are_persisted_immediately() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "Meeting", Some(color("#fff"))).unwrap();

        let reopened =
            EventStore::open(store.storage().clone(), Palette::default()).unwrap();

        assert_eq!(reopened.list_events(&day), &[event("Meeting", "#fff")]);
    }

    #[test]
    fn persist_load_round_trip() {
        let mut store = store();
        store
            .create_event(key("2024-03-05"), "A", Some(color("#111")))
            .unwrap();
        store
            .create_event(key("2024-03-05"), "B", Some(color("#222")))
            .unwrap();
        store
            .create_event(key("2025-01-01"), "C", Some(color("#333")))
            .unwrap();
        store.persist().unwrap();

        let mut reloaded = EventStore::open(MemoryStorage::default(), Palette::default()).unwrap();
        reloaded.storage = store.storage().clone();
        reloaded.load().unwrap();

        for day in store.keys() {
            assert_eq!(reloaded.list_events(day), store.list_events(day));
        }
        assert_eq!(reloaded.keys().count(), 2);
    }

    #[test]
    fn reload_picks_up_external_changes_only() {
        let mut store = store();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();
        let revision = store.revision();

        assert!(!store.reload().unwrap());
        assert_eq!(store.revision(), revision);

        let mut other = EventStore::open(store.storage().clone(), Palette::default()).unwrap();
        other.create_event(day, "B", Some(color("#222"))).unwrap();
        store.storage = other.storage().clone();

        assert!(store.reload().unwrap());
        assert_eq!(store.revision(), revision + 1);
        assert_eq!(store.list_events(&day).len(), 2);
    }

    #[test]
    fn failed_persist_rolls_back() {
        let mut store = EventStore::open(
            BrokenStorage {
                fail_saves: false,
                inner: MemoryStorage::default(),
            },
            Palette::default(),
        )
        .unwrap();
        let day = key("2024-03-05");
        store.create_event(day, "A", Some(color("#111"))).unwrap();
        store.create_event(day, "B", Some(color("#222"))).unwrap();
        store.storage.fail_saves = true;

        assert!(store
            .create_event(day, "C", None)
            .unwrap_err()
            .is_persistence());
        assert!(store
            .update_event(&day, 0, EventPatch::default().description("A2"))
            .unwrap_err()
            .is_persistence());
        assert!(store.move_event(&day, 0, 1).unwrap_err().is_persistence());
        assert!(store.delete_event(&day, 0).unwrap_err().is_persistence());

        assert_eq!(
            store.list_events(&day),
            &[event("A", "#111"), event("B", "#222")]
        );
    }

    #[test]
    fn corrupt_storage_fails_to_open() {
        let result = EventStore::open(
            MemoryStorage::with_contents("{ not json"),
            Palette::default(),
        );

        assert!(result.unwrap_err().is_persistence());
    }

    #[test]
    fn palettes_are_never_empty() {
        assert!(Palette::try_from(Vec::<Color>::new()).is_err());
        assert!("".parse::<Color>().is_err());
        assert!("light blue".parse::<Color>().is_err());
    }
}
