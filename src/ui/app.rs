use std::io::{self, Write};

use super::command::CommandParser;
use super::context::Context;
use super::render::WindowView;
use crate::events::{Dispatcher, Event};
use crate::store::Storage;

const PROMPT: &str = "> ";

pub struct App<S: Storage> {
    context: Context<S>,
}

impl<S: Storage> App<S> {
    pub fn new(context: Context<S>) -> Self {
        App { context }
    }

    pub fn context(&self) -> &Context<S> {
        &self.context
    }

    /// Writes the current window without any prompt.
    pub fn show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let days = self.context.days();
        write!(
            out,
            "{}",
            WindowView::new(&days, self.context.today, &self.context.config.calendar)
        )
    }

    fn draw<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.show(out)?;
        if let Some(msg) = self.context.take_error_message() {
            writeln!(out, "! {}", msg)?;
        }
        write!(out, "{}", PROMPT)?;
        out.flush()
    }

    /// Applies one event. Returns whether the window needs to be redrawn.
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::Update => self.context.update(),
            Event::ExternalModification => self.context.reload(),
            Event::Input(line) => {
                if line.trim().is_empty() {
                    return true;
                }
                // Failures are kept on the context for the status line
                let _ = CommandParser::new(&mut self.context).run_command(&line);
                !self.context.quit
            }
            Event::InputClosed => {
                self.context.quit = true;
                false
            }
        }
    }

    pub fn run<W: Write>(
        &mut self,
        dispatcher: Dispatcher,
        mut out: W,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.draw(&mut out)?;

        while !self.context.quit {
            let event = match dispatcher.next() {
                Ok(event) => event,
                Err(_) => break,
            };

            if self.handle(event) {
                self.draw(&mut out)?;
            }
        }

        writeln!(out)?;
        Ok(())
    }
}
