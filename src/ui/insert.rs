use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_until},
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map},
    error::Error as NomError,
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult,
};

use super::match_action;
use crate::error::{Error, ErrorKind, Result};
use crate::store::EventPatch;

type InsertAction = fn(EventPatch, &str) -> Result<EventPatch>;

const INSERT_ACTIONS: &[(&str, InsertAction)] = &[
    ("description", |patch, v| Ok(patch.description(v))),
    ("color", |patch, v| Ok(patch.color(v.parse()?))),
];

enum Field<'a> {
    Keyed(InsertAction, &'a str),
    Bare(&'a str),
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_until("\""), char('"'))(input)
}

fn value(input: &str) -> IResult<&str, &str> {
    alt((quoted, take_till1(char::is_whitespace)))(input)
}

fn key_value(input: &str) -> IResult<&str, (InsertAction, &str)> {
    separated_pair(
        map(match_action(INSERT_ACTIONS), |(_, act)| *act),
        char(':'),
        value,
    )(input)
}

fn field(input: &str) -> IResult<&str, Field> {
    alt((
        map(key_value, |(act, v)| Field::Keyed(act, v)),
        map(quoted, Field::Bare),
    ))(input)
}

/// Parses `key:value` pairs separated by whitespace into a patch. Values
/// containing whitespace are quoted; a bare quoted value is a description.
///
/// ```
/// # use kalends::ui::insert::parse_patch;
/// let patch = parse_patch("\"Dentist\" color:#aecbfa").unwrap();
/// assert_eq!(patch.description.as_deref(), Some("Dentist"));
/// ```
pub fn parse_patch(line: &str) -> Result<EventPatch> {
    let fields = delimited(space0, separated_list0(space1, field), space0);
    let (_, fields) = all_consuming(fields)(line).map_err(|e: nom::Err<NomError<&str>>| {
        let at = match e {
            nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
            nom::Err::Incomplete(_) => line,
        };
        Error::new(
            ErrorKind::CommandParse,
            &format!("cannot parse '{}', expected description: or color:", at.trim()),
        )
    })?;

    fields
        .into_iter()
        .try_fold(EventPatch::default(), |patch, field| match field {
            Field::Keyed(act, v) => act(patch, v),
            Field::Bare(v) => Ok(patch.description(v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_and_quoted_values() {
        let patch = parse_patch("description:\"Long lunch\" color:#fff").unwrap();
        assert_eq!(
            patch,
            EventPatch::default()
                .description("Long lunch")
                .color("#fff".parse().unwrap())
        );

        let patch = parse_patch("  color:red   \"Standup\"  ").unwrap();
        assert_eq!(patch.description.as_deref(), Some("Standup"));
        assert_eq!(patch.color.unwrap().as_str(), "red");

        let patch = parse_patch("description:Brunch").unwrap();
        assert_eq!(patch.description.as_deref(), Some("Brunch"));
        assert_eq!(patch.color, None);
    }

    #[test]
    fn later_fields_win() {
        let patch = parse_patch("\"first\" description:second").unwrap();

        assert_eq!(patch.description.as_deref(), Some("second"));
    }

    #[test]
    fn empty_line_is_an_empty_patch() {
        assert!(parse_patch("").unwrap().is_empty());
        assert!(parse_patch("   ").unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_and_unquoted() {
        for line in [
            "location:home",
            "Brunch",
            "description:",
            "\"unterminated",
            "colour:#fff",
        ] {
            assert!(parse_patch(line).is_err(), "{}", line);
        }
    }

    #[test]
    fn quoted_empty_description_is_kept_for_validation() {
        let patch = parse_patch("description:\"\"").unwrap();

        assert_eq!(patch.description.as_deref(), Some(""));
    }
}
