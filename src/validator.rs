//! Text input validation
//!
//! One pure parsing rule per needs-input tool. A rule either produces a
//! typed request or an [`InvalidInput`] describing what the user has to fix.

use crate::random_ops::{self, Reply};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MIN_LIST_ITEMS: usize = 2;

/// Classification of a rejected input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidKind {
    /// Input does not parse into the expected shape
    BadFormat,
    /// Parsed value lies outside the allowed bounds
    RangeInvalid,
    /// List-based input with fewer than two entries
    TooFewItems,
}

/// User-correctable validation failure. `reason` is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct InvalidInput {
    pub kind: InvalidKind,
    pub reason: String,
}

impl InvalidInput {
    pub fn new(kind: InvalidKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn bad_format(reason: impl Into<String>) -> Self {
        Self::new(InvalidKind::BadFormat, reason)
    }

    pub fn range_invalid(reason: impl Into<String>) -> Self {
        Self::new(InvalidKind::RangeInvalid, reason)
    }

    pub fn too_few_items(reason: impl Into<String>) -> Self {
        Self::new(InvalidKind::TooFewItems, reason)
    }
}

pub type ValidationResult<T> = Result<T, InvalidInput>;

// ============================================================================
// Rules
// ============================================================================

/// `"min max"`: exactly two whitespace-separated integers with `min < max`
pub fn parse_number_range(raw: &str) -> ValidationResult<(i64, i64)> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let [min, max] = tokens.as_slice() else {
        return Err(InvalidInput::bad_format(
            "Enter exactly two whole numbers separated by a space, e.g. `1 100`.",
        ));
    };
    let (Ok(min), Ok(max)) = (min.parse::<i64>(), max.parse::<i64>()) else {
        return Err(InvalidInput::bad_format("Both values must be whole numbers."));
    };
    if min >= max {
        return Err(InvalidInput::range_invalid(
            "The minimum must be less than the maximum.",
        ));
    }
    Ok((min, max))
}

pub fn parse_password_length(raw: &str) -> ValidationResult<usize> {
    let length: i64 = raw
        .trim()
        .parse()
        .map_err(|_| InvalidInput::bad_format("The length must be a whole number."))?;
    usize::try_from(length)
        .ok()
        .filter(|n| (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(n))
        .ok_or_else(|| {
            InvalidInput::range_invalid(format!(
                "The length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}."
            ))
        })
}

/// One item per line; blank lines are dropped and items trimmed.
pub fn parse_item_list(raw: &str) -> ValidationResult<Vec<String>> {
    let items: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if items.len() < MIN_LIST_ITEMS {
        return Err(InvalidInput::too_few_items(
            "The list needs at least two items.",
        ));
    }
    Ok(items)
}

/// Names (one per line), a blank line, then the number of teams.
pub fn parse_team_split(raw: &str) -> ValidationResult<(Vec<String>, usize)> {
    let Ok([names, count]) = <[Vec<String>; 2]>::try_from(blank_line_segments(raw)) else {
        return Err(InvalidInput::bad_format(
            "Send the names first, then an empty line, then the number of teams.",
        ));
    };
    if names.len() < MIN_LIST_ITEMS {
        return Err(InvalidInput::too_few_items("Name at least two people."));
    }
    let [count] = count.as_slice() else {
        return Err(InvalidInput::bad_format(
            "The number of teams must be a single whole number.",
        ));
    };
    let count: i64 = count.parse().map_err(|_| {
        InvalidInput::bad_format("The number of teams must be a single whole number.")
    })?;
    let team_count = usize::try_from(count)
        .ok()
        .filter(|n| *n > 1 && *n <= names.len())
        .ok_or_else(|| {
            InvalidInput::range_invalid(
                "The number of teams must be greater than 1 and no more than the number of people.",
            )
        })?;
    Ok((names, team_count))
}

/// Groups trimmed, non-empty lines into runs separated by blank lines.
fn blank_line_segments(raw: &str) -> Vec<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

// ============================================================================
// Actions
// ============================================================================

/// The action a needs-input tool performs once its input is valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    RandomNumber,
    Password,
    ChooseFromList,
    ShuffleList,
    SplitTeams,
}

/// Validated request, ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRequest {
    RandomNumber { min: i64, max: i64 },
    Password { length: usize },
    Choose { items: Vec<String> },
    Shuffle { items: Vec<String> },
    Teams { names: Vec<String>, team_count: usize },
}

impl InputAction {
    /// Run the validation rule for this action
    pub fn parse(self, raw: &str) -> ValidationResult<InputRequest> {
        match self {
            InputAction::RandomNumber => {
                parse_number_range(raw).map(|(min, max)| InputRequest::RandomNumber { min, max })
            }
            InputAction::Password => {
                parse_password_length(raw).map(|length| InputRequest::Password { length })
            }
            InputAction::ChooseFromList => {
                parse_item_list(raw).map(|items| InputRequest::Choose { items })
            }
            InputAction::ShuffleList => {
                parse_item_list(raw).map(|items| InputRequest::Shuffle { items })
            }
            InputAction::SplitTeams => parse_team_split(raw)
                .map(|(names, team_count)| InputRequest::Teams { names, team_count }),
        }
    }
}

impl InputRequest {
    pub fn execute<R: Rng + ?Sized>(&self, rng: &mut R) -> Reply {
        match self {
            InputRequest::RandomNumber { min, max } => {
                random_ops::random_number(rng, *min, *max).reply
            }
            InputRequest::Password { length } => random_ops::generate_password(rng, *length).reply,
            InputRequest::Choose { items } => random_ops::choose_from_list(rng, items).reply,
            InputRequest::Shuffle { items } => random_ops::shuffle_list(rng, items).reply,
            InputRequest::Teams { names, team_count } => {
                random_ops::partition_into_teams(rng, names, *team_count).reply
            }
        }
    }
}
