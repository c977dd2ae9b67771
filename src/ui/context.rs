use crate::agenda::{generate_window, Agenda, DayDescriptor};
use crate::config::Config;
use crate::control::{ScrollDelta, WindowState};
use crate::date::CalendarDate;
use crate::error::{Error, Result};
use crate::store::{EventStore, Storage};

/// All state of a session. Mutated only from the app loop.
pub struct Context<S: Storage> {
    pub config: Config,
    pub agenda: Agenda,
    pub store: EventStore<S>,
    pub window: WindowState,
    pub today: CalendarDate,
    pub last_error_message: Option<String>,
    pub quit: bool,
}

impl<S: Storage> Context<S> {
    pub fn new(config: Config, store: EventStore<S>) -> Result<Self> {
        let agenda = Agenda::from_config(&config)?;
        let today = config.today();
        let window = config.initial_window(today);

        Ok(Context {
            config,
            agenda,
            store,
            window,
            today,
            last_error_message: None,
            quit: false,
        })
    }

    /// Pins "today" and moves the window there.
    pub fn with_today(mut self, today: CalendarDate) -> Self {
        self.today = today;
        self.window = self.window.jump_to(today);
        self
    }

    pub fn days(&self) -> Vec<DayDescriptor> {
        generate_window(&self.window, &self.agenda, &self.store)
    }

    pub fn scroll(&mut self, delta: ScrollDelta) {
        self.window = self.window.apply(delta);
    }

    pub fn select_today(&mut self) {
        self.window = self
            .window
            .reset(self.today, self.config.window.default_length);
    }

    /// Re-evaluates "today". Returns whether the date changed.
    pub fn update(&mut self) -> bool {
        let today = self.config.today();
        self.roll_over(today)
    }

    /// A window that started on the old "today" follows the new one.
    pub fn roll_over(&mut self, today: CalendarDate) -> bool {
        if today == self.today {
            return false;
        }

        log::info!("Date changed from {} to {}", self.today, today);
        if self.window.start() == self.today {
            self.window = self.window.jump_to(today);
        }
        self.today = today;

        true
    }

    /// Returns whether anything visible changed.
    pub fn reload(&mut self) -> bool {
        match self.store.reload() {
            Ok(changed) => changed,
            Err(e) => {
                log::error!("Could not reload events: {}", e);
                self.report_error(&e);
                true
            }
        }
    }

    pub fn report_error(&mut self, error: &Error) {
        self.last_error_message = Some(error.to_string());
    }

    pub fn take_error_message(&mut self) -> Option<String> {
        self.last_error_message.take()
    }
}
