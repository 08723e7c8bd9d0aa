//! Events that can occur in a conversation

use std::str::FromStr;
use thiserror::Error;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A menu button was pressed; `tool_id` is the raw callback identifier
    MenuSelected { tool_id: String },
    /// Free text sent by the user
    TextReceived { raw_text: String },
    CommandReceived { command: Command },
}

impl Event {
    pub fn select(tool_id: impl Into<String>) -> Self {
        Event::MenuSelected {
            tool_id: tool_id.into(),
        }
    }

    pub fn text(raw_text: impl Into<String>) -> Self {
        Event::TextReceived {
            raw_text: raw_text.into(),
        }
    }

    pub fn command(command: Command) -> Self {
        Event::CommandReceived { command }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MenuSelected { .. } => "menu_selected",
            Event::TextReceived { .. } => "text_received",
            Event::CommandReceived { .. } => "command_received",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    /// Accepts the bare name or the slash form (`start`, `/start`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        match name.strip_prefix('/').unwrap_or(name) {
            "start" => Ok(Command::Start),
            "cancel" => Ok(Command::Cancel),
            "help" => Ok(Command::Help),
            _ => Err(UnknownCommand(name.to_string())),
        }
    }
}
