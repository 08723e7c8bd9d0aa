//! Menu catalog
//!
//! Static description of every selectable tool: which menu it lives in, its
//! button placement, and how a selection is handled. Built once at startup
//! and shared read-only by all conversations.

use crate::random_ops::{DieSize, InstantOp};
use crate::validator::InputAction;
use serde::{Serialize, Serializer};
use std::fmt;

/// Callback id of the dice submenu's back button
pub const BACK_TO_MAIN: &str = "back_to_main";

pub const ROOT_MENU_HEADER: &str = "Pick one of the options below:";
pub const DICE_MENU_HEADER: &str = "Pick a die to roll:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuId {
    Root,
    Dice,
}

impl MenuId {
    pub fn header(self) -> &'static str {
        match self {
            MenuId::Root => ROOT_MENU_HEADER,
            MenuId::Dice => DICE_MENU_HEADER,
        }
    }
}

/// Stable symbolic key of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    CoinFlip,
    YesNo,
    DiceMenu,
    RandomNumber,
    RandomColor,
    Magic8Ball,
    RandomCard,
    PasswordGenerator,
    ListChoice,
    ListShuffle,
    TeamDivider,
    Die(DieSize),
}

impl ToolId {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolId::CoinFlip => "coin_flip",
            ToolId::YesNo => "yes_no",
            ToolId::DiceMenu => "dice_menu",
            ToolId::RandomNumber => "random_number",
            ToolId::RandomColor => "random_color",
            ToolId::Magic8Ball => "magic_8_ball",
            ToolId::RandomCard => "random_card",
            ToolId::PasswordGenerator => "password_generator",
            ToolId::ListChoice => "list_choice",
            ToolId::ListShuffle => "list_shuffle",
            ToolId::TeamDivider => "team_divider",
            ToolId::Die(die) => die.id(),
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ToolId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// How a selection of the tool is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Produces its result immediately
    Instant(InstantOp),
    /// Prompts for one text message, then validates it
    NeedsInput {
        prompt: &'static str,
        action: InputAction,
    },
    /// Opens a nested menu
    Submenu(MenuId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub id: ToolId,
    pub label: &'static str,
    pub menu: MenuId,
    /// Button row within the menu
    pub row: u8,
    pub kind: ToolKind,
}

/// A resolved callback identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    Tool(&'a ToolDefinition),
    Back,
}

/// Button as rendered by a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuButton {
    pub label: &'static str,
    pub callback: &'static str,
}

const NUMBER_PROMPT: &str = "Enter a range as `min max` (for example, `1 100`).";
const PASSWORD_PROMPT: &str = "Enter the desired password length (a number from 8 to 128).";
const LIST_PROMPT: &str = "Send me a list of items, one per line.";
const TEAMS_PROMPT: &str =
    "Send a list of names (one per line), then an empty line, then the number of teams.";

#[derive(Debug, Clone)]
pub struct MenuCatalog {
    tools: Vec<ToolDefinition>,
}

impl MenuCatalog {
    /// The catalog of the randomizer bot
    pub fn standard() -> Self {
        let root = |row: u8, id: ToolId, label: &'static str, kind: ToolKind| ToolDefinition {
            id,
            label,
            menu: MenuId::Root,
            row,
            kind,
        };

        let mut tools = vec![
            root(0, ToolId::CoinFlip, "🪙 Coin", ToolKind::Instant(InstantOp::CoinFlip)),
            root(0, ToolId::YesNo, "👍 Yes/No", ToolKind::Instant(InstantOp::YesNo)),
            root(1, ToolId::DiceMenu, "🎲 Dice", ToolKind::Submenu(MenuId::Dice)),
            root(
                1,
                ToolId::RandomNumber,
                "🔢 Number",
                ToolKind::NeedsInput {
                    prompt: NUMBER_PROMPT,
                    action: InputAction::RandomNumber,
                },
            ),
            root(2, ToolId::RandomColor, "🎨 Color", ToolKind::Instant(InstantOp::RandomColor)),
            root(2, ToolId::Magic8Ball, "🔮 Magic 8", ToolKind::Instant(InstantOp::Magic8Ball)),
            root(3, ToolId::RandomCard, "🃏 Card", ToolKind::Instant(InstantOp::RandomCard)),
            root(
                3,
                ToolId::PasswordGenerator,
                "🔒 Password",
                ToolKind::NeedsInput {
                    prompt: PASSWORD_PROMPT,
                    action: InputAction::Password,
                },
            ),
            root(
                4,
                ToolId::ListChoice,
                "🔀 Pick from list",
                ToolKind::NeedsInput {
                    prompt: LIST_PROMPT,
                    action: InputAction::ChooseFromList,
                },
            ),
            root(
                5,
                ToolId::ListShuffle,
                "🔄 Shuffle list",
                ToolKind::NeedsInput {
                    prompt: LIST_PROMPT,
                    action: InputAction::ShuffleList,
                },
            ),
            root(
                6,
                ToolId::TeamDivider,
                "👨‍👩‍👧‍👦 Split into teams",
                ToolKind::NeedsInput {
                    prompt: TEAMS_PROMPT,
                    action: InputAction::SplitTeams,
                },
            ),
        ];

        tools.extend(DieSize::ALL.iter().enumerate().map(|(i, die)| ToolDefinition {
            id: ToolId::Die(*die),
            label: die.label(),
            menu: MenuId::Dice,
            row: if i < 3 { 0 } else { 1 },
            kind: ToolKind::Instant(InstantOp::RollDie(*die)),
        }));

        Self { tools }
    }

    /// Tools of a menu, in display order
    pub fn tools_for_menu(&self, menu: MenuId) -> Vec<&ToolDefinition> {
        self.tools.iter().filter(|t| t.menu == menu).collect()
    }

    /// Look up a tool by its symbolic id
    pub fn lookup(&self, id: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.id.as_str() == id)
    }

    pub fn get(&self, id: ToolId) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Resolve a callback identifier into a typed selection
    pub fn resolve(&self, callback: &str) -> Option<Selection<'_>> {
        if callback == BACK_TO_MAIN {
            return Some(Selection::Back);
        }
        self.lookup(callback).map(Selection::Tool)
    }

    /// Button rows for rendering a menu
    pub fn layout(&self, menu: MenuId) -> Vec<Vec<MenuButton>> {
        let mut rows: Vec<Vec<MenuButton>> = Vec::new();
        let mut current_row = None;
        for tool in self.tools_for_menu(menu) {
            let button = MenuButton {
                label: tool.label,
                callback: tool.id.as_str(),
            };
            if current_row != Some(tool.row) {
                rows.push(Vec::new());
                current_row = Some(tool.row);
            }
            if let Some(row) = rows.last_mut() {
                row.push(button);
            }
        }
        if menu == MenuId::Dice {
            rows.push(vec![MenuButton {
                label: "<< Back",
                callback: BACK_TO_MAIN,
            }]);
        }
        rows
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
