//! Effects produced by state transitions

use crate::catalog::MenuId;
use crate::random_ops::{Markup, Reply};
use serde::Serialize;

/// Effects to be delivered to the transport after a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Show a menu's button grid under a header
    RenderMenu { menu: MenuId, header_text: String },

    /// Send a text message
    RenderMessage { text: String, markup: Markup },
}

impl Effect {
    pub fn render_menu(menu: MenuId, header_text: impl Into<String>) -> Self {
        Effect::RenderMenu {
            menu,
            header_text: header_text.into(),
        }
    }

    /// Menu with its default header
    pub fn menu(menu: MenuId) -> Self {
        Self::render_menu(menu, menu.header())
    }

    pub fn message(reply: Reply) -> Self {
        Effect::RenderMessage {
            text: reply.text,
            markup: reply.markup,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::message(Reply::plain(text))
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self::message(Reply::markdown(text))
    }
}
