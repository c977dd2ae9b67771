use crate::date::CalendarDate;

pub const MIN_WINDOW_LENGTH: u32 = 1;
pub const MAX_WINDOW_LENGTH: u32 = 100;
pub const DEFAULT_WINDOW_LENGTH: u32 = 30;

/// The span of days on screen: first day and number of days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowState {
    start: CalendarDate,
    length: u32,
}

/// Raw two-axis input. `dy` scrolls by whole days (positive moves forward in
/// time), `dx` grows or shrinks the window and is rounded to whole days.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollDelta {
    pub dx: f64,
    pub dy: i64,
}

impl ScrollDelta {
    pub fn scroll(days: i64) -> Self {
        ScrollDelta { dx: 0.0, dy: days }
    }

    pub fn resize(days: f64) -> Self {
        ScrollDelta { dx: days, dy: 0 }
    }
}

impl WindowState {
    /// Lengths outside `[MIN_WINDOW_LENGTH, MAX_WINDOW_LENGTH]` are clamped.
    pub fn new(start: CalendarDate, length: u32) -> Self {
        WindowState {
            start,
            length: length.clamp(MIN_WINDOW_LENGTH, MAX_WINDOW_LENGTH),
        }
        .fit()
    }

    pub fn starting_at(start: CalendarDate) -> Self {
        Self::new(start, DEFAULT_WINDOW_LENGTH)
    }

    pub fn start(&self) -> CalendarDate {
        self.start
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn end(&self) -> CalendarDate {
        self.start.add_days(self.length as i64 - 1)
    }

    pub fn contains(&self, date: &CalendarDate) -> bool {
        *date >= self.start && *date <= self.end()
    }

    /// Applies both axes of `delta`. Never fails; lengths are clamped.
    pub fn apply(self, delta: ScrollDelta) -> Self {
        let mut next = self;

        if delta.dy != 0 {
            next.start = next.start.add_days(delta.dy);
        }

        // NaN carries no direction and is ignored; infinities saturate
        if delta.dx != 0.0 && !delta.dx.is_nan() {
            let length = (next.length as f64 + delta.dx.round())
                .clamp(MIN_WINDOW_LENGTH as f64, MAX_WINDOW_LENGTH as f64);
            next.length = length as u32;
        }

        next.fit()
    }

    pub fn jump_to(self, start: CalendarDate) -> Self {
        WindowState { start, ..self }.fit()
    }

    /// Back to `today` with the given length, as at session start.
    pub fn reset(self, today: CalendarDate, length: u32) -> Self {
        WindowState::new(today, length)
    }

    /// Pulls the start back so that `end()` stays a real date.
    fn fit(mut self) -> Self {
        let latest = CalendarDate::MAX.add_days(1 - self.length as i64);
        self.start = self.start.min(latest);
        self
    }
}
