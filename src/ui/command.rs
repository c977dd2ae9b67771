use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::{tag, take_till1},
    character::complete::{digit0, space0, space1},
    combinator::{opt, rest},
    error::{Error as NomError, ErrorKind as NomErrorKind},
    sequence::{preceded, terminated, tuple},
    IResult,
};

use super::context::Context;
use super::insert;
use crate::control::ScrollDelta;
use crate::date::CalendarDate;
use crate::error::{Error, ErrorKind, Result};
use crate::store::{Color, EventPatch, Storage};

/// Matches the longest name of `table` that prefixes the input.
pub fn match_action<'i, 't, Act>(
    table: &'t [(&'static str, Act)],
) -> impl Fn(&'i str) -> IResult<&'i str, (&'static str, &'t Act)> + 't
where
    'i: 't,
{
    move |input: &'i str| {
        table
            .iter()
            .filter(|(name, _)| input.starts_with(name))
            .max_by_key(|(name, _)| name.len())
            .map(|(name, act)| (&input[name.len()..], (*name, act)))
            .ok_or_else(|| nom::Err::Error(NomError::new(input, NomErrorKind::Tag)))
    }
}

/// A date as typed by the user. `today` is resolved when the command runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateArg {
    Today,
    Date(CalendarDate),
}

impl DateArg {
    pub fn resolve(self, today: CalendarDate) -> CalendarDate {
        match self {
            DateArg::Today => today,
            DateArg::Date(date) => date,
        }
    }
}

impl FromStr for DateArg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "today" {
            Ok(DateArg::Today)
        } else {
            Ok(DateArg::Date(s.parse()?))
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Scroll(ScrollDelta),
    Today,
    Goto(DateArg),
    Add {
        date: DateArg,
        color: Option<Color>,
        description: String,
    },
    Edit {
        date: DateArg,
        index: usize,
        patch: EventPatch,
    },
    Move {
        date: DateArg,
        from: usize,
        to: usize,
    },
    Remove {
        date: DateArg,
        index: usize,
    },
    Quit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Scroll(delta) => {
                write!(f, "scroll by {} days, resize by {}", delta.dy, delta.dx)
            }
            Command::Today => write!(f, "today"),
            Command::Goto(_) => write!(f, "goto"),
            Command::Add { .. } => write!(f, "add"),
            Command::Edit { index, .. } => write!(f, "edit #{}", index),
            Command::Move { from, to, .. } => write!(f, "mv #{} to #{}", from, to),
            Command::Remove { index, .. } => write!(f, "rm #{}", index),
            Command::Quit => write!(f, "quit"),
        }
    }
}

pub enum Action {
    Arg(fn(&str) -> Result<Command>),
    NoArg(fn() -> Command),
    Repeatable(fn(i64) -> Command),
}

const COMMANDS: &[(&str, Action)] = &[
    ("gd", Action::Repeatable(|n| Command::Scroll(ScrollDelta::scroll(n)))),
    ("gD", Action::Repeatable(|n| Command::Scroll(ScrollDelta::scroll(-n)))),
    ("gw", Action::Repeatable(|n| Command::Scroll(ScrollDelta::scroll(n.saturating_mul(7))))),
    ("gW", Action::Repeatable(|n| Command::Scroll(ScrollDelta::scroll(n.saturating_mul(-7))))),
    ("zo", Action::Repeatable(|n| Command::Scroll(ScrollDelta::resize(n as f64)))),
    ("zi", Action::Repeatable(|n| Command::Scroll(ScrollDelta::resize(-(n as f64))))),
    ("today", Action::NoArg(|| Command::Today)),
    ("q", Action::NoArg(|| Command::Quit)),
    ("quit", Action::NoArg(|| Command::Quit)),
    ("goto", Action::Arg(|arg| Ok(Command::Goto(arg.parse()?)))),
    ("add", Action::Arg(parse_add)),
    ("edit", Action::Arg(parse_edit)),
    ("mv", Action::Arg(parse_move)),
    ("rm", Action::Arg(parse_remove)),
];

fn token(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

fn parse_index(s: &str) -> Result<usize> {
    s.parse().map_err(|_| {
        Error::new(
            ErrorKind::CommandParse,
            &format!("'{}' is not an event index", s),
        )
    })
}

fn missing_argument(cmd: &str, what: &str) -> Error {
    Error::new(
        ErrorKind::CommandParse,
        &format!("{} expects {}", cmd, what),
    )
}

fn parse_add(arg: &str) -> Result<Command> {
    let (description, (date, color)) = tuple((
        terminated(token, space0),
        opt(terminated(preceded(tag("color:"), token), space0)),
    ))(arg)
    .map_err(|_: nom::Err<NomError<&str>>| missing_argument("add", "a date"))?;

    Ok(Command::Add {
        date: date.parse()?,
        color: color.map(str::parse).transpose()?,
        description: description.trim().to_owned(),
    })
}

fn date_and_index<'a>(cmd: &str, arg: &'a str) -> Result<(DateArg, usize, &'a str)> {
    let (_, (date, index, trailing)) = tuple((
        terminated(token, space1),
        token,
        preceded(space0, rest),
    ))(arg)
    .map_err(|_: nom::Err<NomError<&str>>| missing_argument(cmd, "a date and an index"))?;

    Ok((date.parse()?, parse_index(index)?, trailing))
}

fn parse_edit(arg: &str) -> Result<Command> {
    let (date, index, fields) = date_and_index("edit", arg)?;
    let patch = insert::parse_patch(fields)?;

    if patch.is_empty() {
        return Err(missing_argument("edit", "a description or a color"));
    }

    Ok(Command::Edit { date, index, patch })
}

fn unexpected(trailing: &str) -> Error {
    Error::new(
        ErrorKind::CommandParse,
        &format!("unexpected '{}'", trailing.trim()),
    )
}

fn parse_move(arg: &str) -> Result<Command> {
    let (date, from, trailing) = date_and_index("mv", arg)?;
    let (trailing, to) = terminated(token, space0)(trailing)
        .map_err(|_: nom::Err<NomError<&str>>| missing_argument("mv", "a target index"))?;

    if !trailing.is_empty() {
        return Err(unexpected(trailing));
    }

    Ok(Command::Move {
        date,
        from,
        to: parse_index(to)?,
    })
}

fn parse_remove(arg: &str) -> Result<Command> {
    let (date, index, trailing) = date_and_index("rm", arg)?;

    if !trailing.trim().is_empty() {
        return Err(unexpected(trailing));
    }

    Ok(Command::Remove { date, index })
}

fn unknown_command(cmd: &str) -> Error {
    Error::new(
        ErrorKind::CommandParse,
        &format!("unknown command '{}'", cmd),
    )
}

/// Parses one line of the command language: an optional repeat count, a
/// command name and, for some commands, arguments separated by whitespace.
pub fn parse_command(cmd: &str) -> Result<Command> {
    let line = cmd.trim();
    let (after_count, repeat) = digit0::<_, NomError<&str>>(line)?;
    let (args, (name, act)) =
        match_action(COMMANDS)(after_count).map_err(|_| unknown_command(line))?;

    match act {
        Action::Repeatable(build) => {
            if !args.is_empty() {
                return Err(unknown_command(line));
            }
            let repeats = if repeat.is_empty() {
                1
            } else {
                repeat.parse::<i64>().map_err(|_| {
                    Error::new(
                        ErrorKind::CommandParse,
                        &format!("repeat count '{}' is too large", repeat),
                    )
                })?
            };
            Ok(build(repeats))
        }
        _ if !repeat.is_empty() => Err(Error::new(
            ErrorKind::CommandParse,
            &format!("{} takes no repeat count", name),
        )),
        Action::NoArg(build) if args.is_empty() => Ok(build()),
        Action::NoArg(_) => Err(unknown_command(line)),
        Action::Arg(build) => {
            let (arg, _) = space1::<_, NomError<&str>>(args).map_err(|_| {
                if args.is_empty() {
                    missing_argument(name, "an argument")
                } else {
                    unknown_command(line)
                }
            })?;
            build(arg)
        }
    }
}

pub struct CommandParser<'a, S: Storage> {
    context: &'a mut Context<S>,
}

impl<'a, S: Storage> CommandParser<'a, S> {
    pub fn new(context: &'a mut Context<S>) -> Self {
        CommandParser { context }
    }

    /// Parses and executes `cmd`. Failures are also left on the context for
    /// the status line.
    pub fn run_command(&mut self, cmd: &str) -> Result<()> {
        let res = parse_command(cmd).and_then(|command| self.execute(command));

        if let Err(e) = &res {
            log::warn!("Command '{}' failed: {}", cmd.trim(), e);
            self.context.report_error(e);
        }

        res
    }

    pub fn execute(&mut self, command: Command) -> Result<()> {
        log::debug!("Executing {}", command);
        let today = self.context.today;

        match command {
            Command::Scroll(delta) => self.context.scroll(delta),
            Command::Today => self.context.select_today(),
            Command::Goto(date) => {
                self.context.window = self.context.window.jump_to(date.resolve(today))
            }
            Command::Add {
                date,
                color,
                description,
            } => {
                let key = date.resolve(today).day_key();
                match self.context.store.create_event(key, &description, color) {
                    Err(e) if e.is_validation() => {
                        log::debug!("Discarded event without description on {}", key)
                    }
                    res => res?,
                }
            }
            Command::Edit { date, index, patch } => {
                let key = date.resolve(today).day_key();
                self.context.store.update_event(&key, index, patch)?;
            }
            Command::Move { date, from, to } => {
                let key = date.resolve(today).day_key();
                self.context.store.move_event(&key, from, to)?;
            }
            Command::Remove { date, index } => {
                let key = date.resolve(today).day_key();
                self.context.store.delete_event(&key, index)?;
            }
            Command::Quit => self.context.quit = true,
        }

        Ok(())
    }
}
