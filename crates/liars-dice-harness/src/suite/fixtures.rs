// crates/liars-dice-harness/src/suite/fixtures.rs
// ============================================================================
// Module: Scenario Fixtures
// Description: Form templates and small helpers shared by scenarios.
// Purpose: Describe request bodies whose die faces are resolved at run time.
// Dependencies: rand, serde_json
// ============================================================================

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::Map;
use serde_json::Value;

/// A form field value in a scenario template.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Text literal.
    Text(String),
    /// Any face currently in player 0's hand.
    HandFace,
}

/// Ordered form fields, some of which may depend on the dealt hand.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormTemplate {
    /// Field names and values in send order.
    fields: Vec<(&'static str, FormValue)>,
}

impl FormTemplate {
    /// Creates an empty template.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: FormValue) -> Self {
        self.fields.push((key, value));
        self
    }

    /// Appends a field unless one with the same key exists.
    #[must_use]
    pub fn with_default(self, key: &'static str, value: FormValue) -> Self {
        if self.fields.iter().any(|(name, _)| *name == key) { self } else { self.with(key, value) }
    }

    /// Returns true when any field depends on the dealt hand.
    #[must_use]
    pub fn needs_hand_face(&self) -> bool {
        self.fields.iter().any(|(_, value)| *value == FormValue::HandFace)
    }

    /// Builds the form body. Hand-dependent fields are dropped when no face
    /// is supplied.
    #[must_use]
    pub fn resolve(&self, hand_face: Option<i64>) -> Value {
        let mut form = Map::new();
        for (key, value) in &self.fields {
            let resolved = match value {
                FormValue::Int(number) => Value::from(*number),
                FormValue::Float(number) => Value::from(*number),
                FormValue::Text(text) => Value::from(text.clone()),
                FormValue::HandFace => match hand_face {
                    Some(face) => Value::from(face),
                    None => continue,
                },
            };
            form.insert((*key).to_string(), resolved);
        }
        Value::Object(form)
    }
}

/// Returns a random alphanumeric string of `length` characters.
#[must_use]
pub fn random_string(length: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(length).map(char::from).collect()
}

/// Counts dice showing `face` across every hand.
#[must_use]
pub fn count_face(hands: &[Vec<i64>], face: i64) -> usize {
    hands.iter().flatten().filter(|die| **die == face).count()
}

/// Total dice left in the game.
#[must_use]
pub fn total_dice(hands: &[Vec<i64>]) -> usize {
    hands.iter().map(Vec::len).sum()
}

/// Returns true when `player` still holds dice.
#[must_use]
pub fn can_play(player: usize, hands: &[Vec<i64>]) -> bool {
    hands.get(player).is_some_and(|hand| !hand.is_empty())
}

/// Returns true when at most one player still holds dice.
#[must_use]
pub fn end_game(hands: &[Vec<i64>]) -> bool {
    hands.iter().filter(|hand| !hand.is_empty()).count() <= 1
}

/// First player at or after `start` (wrapping) who still holds dice.
#[must_use]
pub fn next_active(hands: &[Vec<i64>], start: usize) -> Option<usize> {
    let players = hands.len();
    (0 .. players).map(|offset| (start + offset) % players).find(|player| can_play(*player, hands))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
