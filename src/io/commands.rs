//! Edit commands entered on the command line
//!
//! This is the input side of the presentation layer: raw text is parsed
//! here, blank or zero override amounts are turned into a clear (never sent
//! through the guard), and each command is applied to the session as one
//! transaction.
//!
//! Grammar (whitespace separated):
//!
//! ```text
//! item    <adult-id> <drink|beverage|food> <amount>
//! remove  <adult-id> <index>
//! percent <minor-id> <25|50|75>
//! amount  <minor-id> [amount]      blank, zero or unparseable clears
//! clear   <minor-id>
//! rename  <person-id> [name...]    missing name stores an empty name
//! ```

use crate::domain::bill::BillState;
use crate::domain::types::{ItemType, PersonId};
use crate::error::BillError;
use crate::services::session;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// Malformed command text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (expected item, remove, percent, amount, clear or rename)")]
    UnknownVerb(String),

    #[error("'{verb}' is missing its {what}")]
    Missing { verb: &'static str, what: &'static str },

    #[error("invalid {what} '{value}'")]
    Invalid { what: &'static str, value: String },
}

/// One parsed edit
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `amount` is `None` when the entered text was not a number
    AddItem { adult: PersonId, item_type: ItemType, amount: Option<Decimal> },
    RemoveItem { adult: PersonId, index: usize },
    SetPercent { minor: PersonId, percent: u8 },
    SetAmount { minor: PersonId, amount: Decimal },
    ClearAmount { minor: PersonId },
    Rename { person: PersonId, name: String },
}

/// Parse a user-entered amount, tolerating a leading currency sign
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let text = text.strip_prefix('$').unwrap_or(text);
    text.parse::<Decimal>().ok()
}

impl std::str::FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts.next().ok_or(ParseCommandError::Empty)?;

        let mut person = |verb: &'static str| {
            parts
                .next()
                .map(PersonId::from)
                .ok_or(ParseCommandError::Missing { verb, what: "person id" })
        };

        match verb.to_ascii_lowercase().as_str() {
            "item" => {
                let adult = person("item")?;
                let item_type = parts
                    .next()
                    .ok_or(ParseCommandError::Missing { verb: "item", what: "item type" })?;
                let item_type = item_type.parse::<ItemType>().map_err(|_| {
                    ParseCommandError::Invalid { what: "item type", value: item_type.to_string() }
                })?;
                let amount = parts.next().and_then(parse_amount);
                Ok(Command::AddItem { adult, item_type, amount })
            }
            "remove" => {
                let adult = person("remove")?;
                let index = parts
                    .next()
                    .ok_or(ParseCommandError::Missing { verb: "remove", what: "item index" })?;
                let index = index.parse::<usize>().map_err(|_| ParseCommandError::Invalid {
                    what: "item index",
                    value: index.to_string(),
                })?;
                Ok(Command::RemoveItem { adult, index })
            }
            "percent" => {
                let minor = person("percent")?;
                let percent = parts
                    .next()
                    .ok_or(ParseCommandError::Missing { verb: "percent", what: "percentage" })?;
                let percent = percent.trim_end_matches('%');
                let percent = percent.parse::<u8>().map_err(|_| ParseCommandError::Invalid {
                    what: "percentage",
                    value: percent.to_string(),
                })?;
                Ok(Command::SetPercent { minor, percent })
            }
            "amount" => {
                let minor = person("amount")?;
                match parts.next().and_then(parse_amount) {
                    Some(amount) if amount > Decimal::ZERO => {
                        Ok(Command::SetAmount { minor, amount })
                    }
                    _ => Ok(Command::ClearAmount { minor }),
                }
            }
            "clear" => Ok(Command::ClearAmount { minor: person("clear")? }),
            "rename" => {
                let person = person("rename")?;
                let name = parts.collect::<Vec<_>>().join(" ");
                Ok(Command::Rename { person, name })
            }
            other => Err(ParseCommandError::UnknownVerb(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::AddItem { adult, item_type, amount: Some(amount) } => {
                write!(f, "item {adult} {} {amount}", item_type.as_str())
            }
            Command::AddItem { adult, item_type, amount: None } => {
                write!(f, "item {adult} {}", item_type.as_str())
            }
            Command::RemoveItem { adult, index } => write!(f, "remove {adult} {index}"),
            Command::SetPercent { minor, percent } => write!(f, "percent {minor} {percent}"),
            Command::SetAmount { minor, amount } => write!(f, "amount {minor} {amount}"),
            Command::ClearAmount { minor } => write!(f, "clear {minor}"),
            Command::Rename { person, name } => write!(f, "rename {person} {name}"),
        }
    }
}

/// A command the session refused; the state is as it was before
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub command: Command,
    pub error: BillError,
    /// Message to show the user
    pub message: String,
}

/// Apply one command to the session
pub fn apply(state: &mut BillState, command: &Command) -> Result<(), BillError> {
    match command {
        Command::AddItem { adult, item_type, amount } => {
            let amount = amount.ok_or_else(|| BillError::InvalidInput {
                field: "item amount",
                message: "not a number".to_string(),
            })?;
            session::add_item(state, adult, *item_type, amount).map(|_| ())
        }
        Command::RemoveItem { adult, index } => {
            session::remove_item(state, adult, *index).map(|_| ())
        }
        Command::SetPercent { minor, percent } => {
            session::set_minor_percent_value(state, minor, *percent)
        }
        Command::SetAmount { minor, amount } => {
            session::set_minor_direct_amount(state, minor, *amount)
        }
        Command::ClearAmount { minor } => {
            session::clear_minor_direct_amount(state, minor).map(|_| ())
        }
        Command::Rename { person, name } => session::rename_person(state, person, name),
    }
}

/// Apply commands in order. Refused commands are logged and collected, and
/// the remaining commands still run. An invariant violation (unknown id,
/// stale item index) stops processing and is returned.
pub fn apply_all(state: &mut BillState, commands: &[Command]) -> Result<Vec<Rejection>, BillError> {
    let mut rejections = Vec::new();

    for command in commands {
        match apply(state, command) {
            Ok(()) => {}
            Err(error) if error.is_refusal() => {
                let message = user_message(command, &error);
                warn!(
                    session_id = %state.session_id(),
                    command = %command,
                    error = %error,
                    "command_refused"
                );
                rejections.push(Rejection { command: command.clone(), error, message });
            }
            Err(error) => return Err(error),
        }
    }

    info!(
        session_id = %state.session_id(),
        applied = commands.len() - rejections.len(),
        refused = rejections.len(),
        "commands_applied"
    );

    Ok(rejections)
}

/// Text shown to the user when a command is refused
pub fn user_message(command: &Command, error: &BillError) -> String {
    match (command, error) {
        (Command::AddItem { .. }, BillError::WouldCauseNegative(_)) => {
            "Adding this item would cause other attendees to have negative amounts. \
             Please reduce the item amount or remove other items."
                .to_string()
        }
        (Command::SetAmount { .. }, BillError::WouldCauseNegative(_)) => {
            "This amount would cause other attendees to have negative amounts. \
             Please reduce the amount."
                .to_string()
        }
        (Command::AddItem { .. }, BillError::InvalidInput { .. }) => {
            "Please enter a valid amount".to_string()
        }
        _ => error.to_string(),
    }
}
