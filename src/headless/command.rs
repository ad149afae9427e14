//! Console command parsing
//!
//! One command per line:
//!
//! ```text
//! open <route>            open /tasks, /projects/2, /tasks/5/edit, ...
//! back | reload | new | submit | cancel | quit
//! delete [id]             id required on lists, optional on detail screens
//! view <id>
//! edit [id]
//! set <field> [value...]  the rest of the line is the value (may be empty)
//! touch <field>
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use taskdeck_app::{Message, Route};
use taskdeck_core::{EntityId, Error, Result};

/// Parse one input line. `Ok(None)` for blank lines and comments.
pub fn parse_command(line: &str) -> Result<Option<Message>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };

    let message = match verb {
        "open" | "go" => {
            let route = required(verb, rest, "route")?;
            let route = route
                .parse::<Route>()
                .map_err(|e| Error::invalid_route(format!("{}: {}", route, e)))?;
            Message::Navigate(route)
        }
        "back" => no_args(verb, rest, Message::Back)?,
        "reload" | "r" => no_args(verb, rest, Message::Reload)?,
        "new" | "create" => no_args(verb, rest, Message::Create)?,
        "submit" | "save" => no_args(verb, rest, Message::Submit)?,
        "cancel" => no_args(verb, rest, Message::Cancel)?,
        "quit" | "q" => no_args(verb, rest, Message::Quit)?,
        "delete" => Message::Delete {
            id: optional_id(rest)?,
        },
        "view" => Message::View {
            id: parse_id(required(verb, rest, "id")?)?,
        },
        "edit" => Message::Edit {
            id: optional_id(rest)?,
        },
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            Message::SetField {
                field: required(verb, field, "field")?.to_string(),
                value: value.to_string(),
            }
        }
        "touch" => Message::TouchField {
            field: required(verb, rest, "field")?.to_string(),
        },
        other => return Err(Error::input(format!("Unknown command: {}", other))),
    };
    Ok(Some(message))
}

fn required<'a>(verb: &str, rest: &'a str, what: &str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(Error::input(format!("'{}' needs a {}", verb, what)))
    } else {
        Ok(rest)
    }
}

fn no_args(verb: &str, rest: &str, message: Message) -> Result<Message> {
    if rest.is_empty() {
        Ok(message)
    } else {
        Err(Error::input(format!("'{}' takes no arguments", verb)))
    }
}

fn optional_id(rest: &str) -> Result<Option<EntityId>> {
    if rest.is_empty() {
        Ok(None)
    } else {
        parse_id(rest).map(Some)
    }
}

fn parse_id(raw: &str) -> Result<EntityId> {
    raw.parse::<EntityId>()
        .map_err(|_| Error::input(format!("Not a valid id: {}", raw)))
}
