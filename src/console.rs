//! Line-oriented console transport
//!
//! Lets a terminal drive the bot: stdin lines become events, effects are
//! written to stdout either as readable text or as one JSON object per line.

use crate::catalog::{MenuButton, MenuCatalog};
use crate::runtime::{Transport, TransportError};
use crate::state_machine::{Command, Effect, Event};
use async_trait::async_trait;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error)]
#[error("Unknown output format {0:?} (expected \"text\" or \"json\")")]
pub struct ParseFormatError(pub String);

impl FromStr for OutputFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ParseFormatError(other.to_string())),
        }
    }
}

/// One line of JSON output
#[derive(Serialize)]
struct JsonLine<'a> {
    conversation_id: &'a str,
    effect: &'a Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    buttons: Option<Vec<Vec<MenuButton>>>,
}

/// Writes effects to stdout (or any async writer in tests)
pub struct ConsoleTransport<W = Stdout> {
    catalog: Arc<MenuCatalog>,
    format: OutputFormat,
    out: Mutex<W>,
}

impl ConsoleTransport<Stdout> {
    pub fn stdout(catalog: Arc<MenuCatalog>, format: OutputFormat) -> Self {
        Self::with_writer(catalog, format, tokio::io::stdout())
    }
}

impl<W> ConsoleTransport<W> {
    pub fn with_writer(catalog: Arc<MenuCatalog>, format: OutputFormat, out: W) -> Self {
        Self {
            catalog,
            format,
            out: Mutex::new(out),
        }
    }

    /// Render an effect to the text written for it, newline-terminated
    pub fn render(&self, conversation_id: &str, effect: &Effect) -> Result<String, TransportError> {
        match self.format {
            OutputFormat::Text => Ok(self.render_text(effect)),
            OutputFormat::Json => {
                let buttons = match effect {
                    Effect::RenderMenu { menu, .. } => Some(self.catalog.layout(*menu)),
                    Effect::RenderMessage { .. } => None,
                };
                let line = JsonLine {
                    conversation_id,
                    effect,
                    buttons,
                };
                let mut json = serde_json::to_string(&line)
                    .map_err(|e| TransportError::new(format!("Failed to encode effect: {e}")))?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    fn render_text(&self, effect: &Effect) -> String {
        match effect {
            Effect::RenderMenu { menu, header_text } => {
                let mut text = format!("{header_text}\n");
                for row in self.catalog.layout(*menu) {
                    let cells: Vec<String> = row
                        .iter()
                        .map(|b| format!("[{} :{}]", b.label, b.callback))
                        .collect();
                    text.push_str("  ");
                    text.push_str(&cells.join(" "));
                    text.push('\n');
                }
                text
            }
            Effect::RenderMessage { text, .. } => format!("{text}\n"),
        }
    }
}

#[async_trait]
impl<W> Transport for ConsoleTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn deliver(&self, conversation_id: &str, effect: &Effect) -> Result<(), TransportError> {
        let rendered = self.render(conversation_id, effect)?;
        let mut out = self.out.lock().await;
        out.write_all(rendered.as_bytes())
            .await
            .map_err(|e| TransportError::new(format!("Failed to write to console: {e}")))?;
        out.flush()
            .await
            .map_err(|e| TransportError::new(format!("Failed to flush console: {e}")))?;
        Ok(())
    }
}

/// Map one console line to an event.
///
/// `/name` is a command, `:callback` a button press, anything else a text
/// message in which a literal `\n` stands for a line break. Blank lines and
/// unknown commands yield `None`.
pub fn parse_console_line(line: &str) -> Option<Event> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let trimmed = line.trim();
    if trimmed.starts_with('/') {
        return trimmed.parse::<Command>().ok().map(Event::command);
    }
    if let Some(callback) = trimmed.strip_prefix(':') {
        let callback = callback.trim();
        if callback.is_empty() {
            return None;
        }
        return Some(Event::select(callback));
    }

    Some(Event::text(line.replace("\\n", "\n")))
}
