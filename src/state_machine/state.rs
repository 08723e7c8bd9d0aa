//! Conversation state types

use super::transition::TransitionResult;
use super::Effect;
use crate::catalog::ToolId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Conversation State
// ============================================================================

/// Where a conversation is in the dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Root menu shown, waiting for a selection
    #[default]
    IdleMenu,

    /// A needs-input tool was selected; the next text message is its input
    AwaitingInput { pending_tool: ToolId },

    /// Dice submenu shown, only die sizes and back are accepted
    DiceSubmenu,
}

impl ConvState {
    pub fn pending_tool(&self) -> Option<ToolId> {
        match self {
            ConvState::AwaitingInput { pending_tool } => Some(*pending_tool),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConvState::IdleMenu => "idle_menu",
            ConvState::AwaitingInput { .. } => "awaiting_input",
            ConvState::DiceSubmenu => "dice_submenu",
        }
    }
}

const INVALID_ATTEMPTS: &str = "invalid_attempts";

/// Transient data for one multi-step interaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scratch {
    entries: BTreeMap<String, String>,
}

impl Scratch {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rejected inputs for the pending tool so far
    pub fn invalid_attempts(&self) -> u32 {
        self.get(INVALID_ATTEMPTS)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn record_invalid_attempt(&mut self) {
        let attempts = self.invalid_attempts().saturating_add(1);
        self.set(INVALID_ATTEMPTS, attempts.to_string());
    }
}

/// Per-conversation record, owned by the conversation's runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub state: ConvState,
    pub scratch: Scratch,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt the outcome of a transition and hand back its effects.
    ///
    /// Scratch never survives a return to the root menu.
    pub fn apply(&mut self, result: TransitionResult) -> Vec<Effect> {
        self.state = result.new_state;
        self.scratch = result.scratch;
        if self.state == ConvState::IdleMenu {
            self.scratch.clear();
        }
        result.effects
    }
}

// ============================================================================
// Context
// ============================================================================

/// What happens after a die is rolled in the dice submenu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiceRollPolicy {
    /// Keep the dice submenu open for repeated rolls
    #[default]
    StayInSubmenu,
    /// Go back to the root menu after every roll
    ReturnToMainMenu,
}

#[derive(Debug, Error)]
#[error("Unknown dice roll policy: {0} (expected `stay` or `return`)")]
pub struct ParsePolicyError(String);

impl FromStr for DiceRollPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stay" | "stay_in_submenu" => Ok(Self::StayInSubmenu),
            "return" | "return_to_main_menu" => Ok(Self::ReturnToMainMenu),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub conversation_id: String,
    /// Display name used in the greeting, when the transport knows it
    pub user_name: Option<String>,
    pub dice_policy: DiceRollPolicy,
}

impl ConvContext {
    pub fn new(conversation_id: impl Into<String>, dice_policy: DiceRollPolicy) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_name: None,
            dice_policy,
        }
    }

    pub fn with_user_name(mut self, user_name: Option<String>) -> Self {
        self.user_name = user_name;
        self
    }
}
