//! Random generation operations
//!
//! Every operation takes parameters that have already been validated and a
//! caller-supplied RNG, and returns the typed value together with the reply
//! to render. The reply text is opaque to the state machine.
//!
//! Randomness comes from a general-purpose PRNG. Nothing here is a security
//! control: generated passwords are NOT suitable for secrets that matter.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// How a reply should be rendered by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    Plain,
    Markdown,
}

/// Rendered reply text plus its markup kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub markup: Markup,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Plain,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Markdown,
        }
    }
}

/// Typed result of an operation and the reply describing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub reply: Reply,
}

// ============================================================================
// Value Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    fn label(self) -> &'static str {
        match self {
            CoinSide::Heads => "Heads 🦅",
            CoinSide::Tails => "Tails 🪙",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    fn label(self) -> &'static str {
        match self {
            Answer::Yes => "Yes 👍",
            Answer::No => "No 👎",
        }
    }
}

/// The fixed set of dice offered by the dice submenu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DieSize {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieSize {
    pub const ALL: [DieSize; 6] = [
        DieSize::D4,
        DieSize::D6,
        DieSize::D8,
        DieSize::D10,
        DieSize::D12,
        DieSize::D20,
    ];

    pub fn sides(self) -> u32 {
        match self {
            DieSize::D4 => 4,
            DieSize::D6 => 6,
            DieSize::D8 => 8,
            DieSize::D10 => 10,
            DieSize::D12 => 12,
            DieSize::D20 => 20,
        }
    }

    /// Stable selection id (`d4` .. `d20`)
    pub fn id(self) -> &'static str {
        match self {
            DieSize::D4 => "d4",
            DieSize::D6 => "d6",
            DieSize::D8 => "d8",
            DieSize::D10 => "d10",
            DieSize::D12 => "d12",
            DieSize::D20 => "d20",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DieSize::D4 => "D4",
            DieSize::D6 => "D6",
            DieSize::D8 => "D8",
            DieSize::D10 => "D10",
            DieSize::D12 => "D12",
            DieSize::D20 => "D20",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Lowercase `#rrggbb`
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub const CARD_RANKS: [&str; 13] = [
    "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K", "A",
];
pub const CARD_SUITS: [&str; 4] = ["♥️", "♦️", "♣️", "♠️"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub rank: &'static str,
    pub suit: &'static str,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

pub const MAGIC_8_BALL_ANSWERS: [&str; 20] = [
    "It is certain",
    "It is decidedly so",
    "Without a doubt",
    "Yes, definitely",
    "You may rely on it",
    "As I see it, yes",
    "Most likely",
    "Outlook good",
    "Signs point to yes",
    "Yes",
    "Reply hazy, try again",
    "Ask again later",
    "Better not tell you now",
    "Cannot predict now",
    "Concentrate and ask again",
    "Don't count on it",
    "My reply is no",
    "My sources say no",
    "Outlook not so good",
    "Very doubtful",
];

/// A-Z, a-z, 0-9 and the ASCII punctuation set
pub const PASSWORD_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
abcdefghijklmnopqrstuvwxyz\
0123456789\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

// ============================================================================
// Operations
// ============================================================================

pub fn coin_flip<R: Rng + ?Sized>(rng: &mut R) -> Outcome<CoinSide> {
    let side = if rng.gen_bool(0.5) {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    };
    Outcome {
        value: side,
        reply: Reply::markdown(format!("Result: **{}**", side.label())),
    }
}

pub fn yes_no<R: Rng + ?Sized>(rng: &mut R) -> Outcome<Answer> {
    let answer = if rng.gen_bool(0.5) {
        Answer::Yes
    } else {
        Answer::No
    };
    Outcome {
        value: answer,
        reply: Reply::markdown(format!("Answer: **{}**", answer.label())),
    }
}

pub fn roll_die<R: Rng + ?Sized>(rng: &mut R, die: DieSize) -> Outcome<u32> {
    let value = rng.gen_range(1..=die.sides());
    Outcome {
        value,
        reply: Reply::markdown(format!("{} roll: **{value}**", die.label())),
    }
}

/// Uniform integer in `[min, max]`. Callers must reject `min >= max` first.
pub fn random_number<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> Outcome<i64> {
    debug_assert!(min < max, "range must be validated before rolling");
    let value = rng.gen_range(min..=max);
    Outcome {
        value,
        reply: Reply::markdown(format!("Random number from {min} to {max}: **{value}**")),
    }
}

pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Outcome<Color> {
    let color = Color {
        r: rng.gen(),
        g: rng.gen(),
        b: rng.gen(),
    };
    Outcome {
        value: color,
        reply: Reply::markdown(format!(
            "Random color:\n`{}` | `rgb({}, {}, {})`",
            color.hex(),
            color.r,
            color.g,
            color.b
        )),
    }
}

/// Independent draw; there is no deck, so repeats are expected.
pub fn random_card<R: Rng + ?Sized>(rng: &mut R) -> Outcome<Card> {
    let card = Card {
        rank: CARD_RANKS[rng.gen_range(0..CARD_RANKS.len())],
        suit: CARD_SUITS[rng.gen_range(0..CARD_SUITS.len())],
    };
    Outcome {
        value: card,
        reply: Reply::markdown(format!("Random card: **{card}**")),
    }
}

pub fn magic_8_ball<R: Rng + ?Sized>(rng: &mut R) -> Outcome<&'static str> {
    let answer = MAGIC_8_BALL_ANSWERS[rng.gen_range(0..MAGIC_8_BALL_ANSWERS.len())];
    Outcome {
        value: answer,
        reply: Reply::markdown(format!("🔮 The ball says: **{answer}**")),
    }
}

/// Characters are drawn independently from [`PASSWORD_CHARSET`].
///
/// Not suitable for security-sensitive secrets.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Outcome<String> {
    let password: String = (0..length)
        .map(|_| char::from(PASSWORD_CHARSET[rng.gen_range(0..PASSWORD_CHARSET.len())]))
        .collect();
    let reply = Reply::markdown(format!("Your password:\n`{password}`"));
    Outcome {
        value: password,
        reply,
    }
}

pub fn choose_from_list<R: Rng + ?Sized>(rng: &mut R, items: &[String]) -> Outcome<String> {
    let choice = items.choose(rng).cloned().unwrap_or_default();
    let reply = Reply::markdown(format!("I choose: **{choice}**"));
    Outcome {
        value: choice,
        reply,
    }
}

/// Returns a new, uniformly shuffled sequence; `items` is left untouched.
pub fn shuffle_list<R: Rng + ?Sized>(rng: &mut R, items: &[String]) -> Outcome<Vec<String>> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    let numbered: Vec<String> = shuffled
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect();
    Outcome {
        reply: Reply::markdown(format!("Shuffled list:\n{}", numbered.join("\n"))),
        value: shuffled,
    }
}

/// Shuffles the names, then deals them round-robin so team sizes differ by
/// at most one. Callers guarantee `1 < team_count <= names.len()`.
pub fn partition_into_teams<R: Rng + ?Sized>(
    rng: &mut R,
    names: &[String],
    team_count: usize,
) -> Outcome<Vec<Vec<String>>> {
    debug_assert!(team_count > 1 && team_count <= names.len());
    let mut shuffled = names.to_vec();
    shuffled.shuffle(rng);

    let mut teams = vec![Vec::new(); team_count];
    for (i, name) in shuffled.into_iter().enumerate() {
        teams[i % team_count].push(name);
    }

    let sections: Vec<String> = teams
        .iter()
        .enumerate()
        .map(|(i, team)| format!("**Team {}:**\n- {}", i + 1, team.join("\n- ")))
        .collect();
    Outcome {
        reply: Reply::markdown(format!("Teams are ready!\n\n{}", sections.join("\n\n"))),
        value: teams,
    }
}

// ============================================================================
// Instant Operations
// ============================================================================

/// Operations that run directly on menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantOp {
    CoinFlip,
    YesNo,
    RandomColor,
    RandomCard,
    Magic8Ball,
    RollDie(DieSize),
}

impl InstantOp {
    pub fn run<R: Rng + ?Sized>(self, rng: &mut R) -> Reply {
        match self {
            InstantOp::CoinFlip => coin_flip(rng).reply,
            InstantOp::YesNo => yes_no(rng).reply,
            InstantOp::RandomColor => random_color(rng).reply,
            InstantOp::RandomCard => random_card(rng).reply,
            InstantOp::Magic8Ball => magic_8_ball(rng).reply,
            InstantOp::RollDie(die) => roll_die(rng, die).reply,
        }
    }
}
