pub mod agenda;
pub mod config;
pub mod control;
pub mod date;
pub mod error;
pub mod events;
pub mod recurrence;
pub mod store;
pub mod ui;

pub use date::{CalendarDate, DayKey};
pub use error::{Error, ErrorKind, Result};
