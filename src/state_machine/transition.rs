//! Pure state transition function
//!
//! Given a conversation, its context, the catalog, an RNG and an event, the
//! transition decides the next state and the effects to deliver. It performs
//! no I/O; with a seeded RNG it is fully deterministic.

use super::event::Command;
use super::state::{Conversation, ConvContext, ConvState, DiceRollPolicy, Scratch};
use super::{Effect, Event};
use crate::catalog::{
    MenuCatalog, MenuId, Selection, ToolDefinition, ToolId, ToolKind, BACK_TO_MAIN,
};
use rand::Rng;
use thiserror::Error;

pub const HELP_TEXT: &str = "This is a randomizer bot. Use the buttons to pick a tool. \
Send /start to open the menu and /cancel to abort the current action.";
pub const CANCELLED_TEXT: &str = "Action cancelled.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub scratch: Scratch,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    /// New state with empty scratch and no effects
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            scratch: Scratch::default(),
            effects: vec![],
        }
    }

    pub fn with_scratch(mut self, scratch: Scratch) -> Self {
        self.scratch = scratch;
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Events with no transition from the current state. The runtime ignores
/// them and keeps the state unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Unknown menu selection: {0}")]
    UnknownSelection(String),
    #[error("Selection {selection} is not available in state {state}")]
    SelectionNotAvailable {
        selection: String,
        state: &'static str,
    },
    #[error("Text input is not expected in state {0}")]
    UnexpectedText(&'static str),
    #[error("Tool {0} does not take text input")]
    NotAnInputTool(ToolId),
}

/// Pure transition function
pub fn transition<R: Rng + ?Sized>(
    conversation: &Conversation,
    context: &ConvContext,
    catalog: &MenuCatalog,
    rng: &mut R,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (conversation.state, event) {
        // ============================================================
        // Commands (valid in every state)
        // ============================================================
        (_, Event::CommandReceived { command: Command::Start }) => {
            Ok(TransitionResult::new(ConvState::IdleMenu)
                .with_effect(Effect::render_menu(MenuId::Root, greeting(context))))
        }

        (_, Event::CommandReceived { command: Command::Cancel }) => {
            Ok(TransitionResult::new(ConvState::IdleMenu)
                .with_effect(Effect::plain(CANCELLED_TEXT))
                .with_effect(Effect::menu(MenuId::Root)))
        }

        // Help never changes state
        (state, Event::CommandReceived { command: Command::Help }) => {
            Ok(TransitionResult::new(state)
                .with_scratch(conversation.scratch.clone())
                .with_effect(Effect::plain(HELP_TEXT)))
        }

        // ============================================================
        // Menu selections
        // ============================================================
        (state, Event::MenuSelected { tool_id }) => {
            let selection = catalog
                .resolve(&tool_id)
                .ok_or(TransitionError::UnknownSelection(tool_id))?;
            select(state, context, rng, selection)
        }

        // ============================================================
        // Text input
        // ============================================================
        (ConvState::AwaitingInput { pending_tool }, Event::TextReceived { raw_text }) => {
            receive_input(conversation, catalog, rng, pending_tool, &raw_text)
        }

        (state, Event::TextReceived { .. }) => Err(TransitionError::UnexpectedText(state.name())),
    }
}

fn select<R: Rng + ?Sized>(
    state: ConvState,
    context: &ConvContext,
    rng: &mut R,
    selection: Selection<'_>,
) -> Result<TransitionResult, TransitionError> {
    match (state, selection) {
        // DiceSubmenu + Back -> IdleMenu
        (ConvState::DiceSubmenu, Selection::Back) => {
            Ok(TransitionResult::new(ConvState::IdleMenu).with_effect(Effect::menu(MenuId::Root)))
        }

        // DiceSubmenu + die -> roll, next state per policy
        (
            ConvState::DiceSubmenu,
            Selection::Tool(ToolDefinition {
                menu: MenuId::Dice,
                kind: ToolKind::Instant(op),
                ..
            }),
        ) => {
            let result = Effect::message(op.run(rng));
            Ok(match context.dice_policy {
                DiceRollPolicy::StayInSubmenu => {
                    TransitionResult::new(ConvState::DiceSubmenu).with_effect(result)
                }
                DiceRollPolicy::ReturnToMainMenu => TransitionResult::new(ConvState::IdleMenu)
                    .with_effect(result)
                    .with_effect(Effect::menu(MenuId::Root)),
            })
        }

        // Root menu buttons are live while idle and while awaiting input.
        // Choosing another tool abandons the pending input.
        (
            ConvState::IdleMenu | ConvState::AwaitingInput { .. },
            Selection::Tool(tool),
        ) if tool.menu == MenuId::Root => Ok(select_root_tool(rng, tool)),

        (state, selection) => Err(TransitionError::SelectionNotAvailable {
            selection: match selection {
                Selection::Tool(tool) => tool.id.to_string(),
                Selection::Back => BACK_TO_MAIN.to_string(),
            },
            state: state.name(),
        }),
    }
}

fn select_root_tool<R: Rng + ?Sized>(rng: &mut R, tool: &ToolDefinition) -> TransitionResult {
    match tool.kind {
        ToolKind::Instant(op) => {
            TransitionResult::new(ConvState::IdleMenu).with_effect(Effect::message(op.run(rng)))
        }
        ToolKind::NeedsInput { prompt, .. } => TransitionResult::new(ConvState::AwaitingInput {
            pending_tool: tool.id,
        })
        .with_effect(Effect::markdown(prompt)),
        ToolKind::Submenu(menu) => {
            let next = match menu {
                MenuId::Root => ConvState::IdleMenu,
                MenuId::Dice => ConvState::DiceSubmenu,
            };
            TransitionResult::new(next).with_effect(Effect::menu(menu))
        }
    }
}

fn receive_input<R: Rng + ?Sized>(
    conversation: &Conversation,
    catalog: &MenuCatalog,
    rng: &mut R,
    pending_tool: ToolId,
    raw_text: &str,
) -> Result<TransitionResult, TransitionError> {
    let action = match catalog.get(pending_tool).map(|tool| tool.kind) {
        Some(ToolKind::NeedsInput { action, .. }) => action,
        _ => return Err(TransitionError::NotAnInputTool(pending_tool)),
    };

    match action.parse(raw_text) {
        // AwaitingInput + valid text -> IdleMenu with result and menu
        Ok(request) => Ok(TransitionResult::new(ConvState::IdleMenu)
            .with_effect(Effect::message(request.execute(rng)))
            .with_effect(Effect::menu(MenuId::Root))),

        // AwaitingInput + invalid text -> same state, reason shown verbatim
        Err(invalid) => {
            let mut scratch = conversation.scratch.clone();
            scratch.record_invalid_attempt();
            Ok(TransitionResult::new(ConvState::AwaitingInput { pending_tool })
                .with_scratch(scratch)
                .with_effect(Effect::plain(format!(
                    "Error: {invalid}\nPlease try again."
                ))))
        }
    }
}

fn greeting(context: &ConvContext) -> String {
    let header = MenuId::Root.header();
    match &context.user_name {
        Some(name) => format!("Hi, {name}! I'm a randomizer bot. {header}"),
        None => format!("Hi! I'm a randomizer bot. {header}"),
    }
}
