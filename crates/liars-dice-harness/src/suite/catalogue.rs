// crates/liars-dice-harness/src/suite/catalogue.rs
// ============================================================================
// Module: Scenario Catalogue
// Description: The full list of named scenarios.
// Purpose: Register every case once, in execution order.
// Dependencies: none
// ============================================================================

use super::Scenario;
use super::ScenarioKind;
use super::fixtures::FormTemplate;
use super::fixtures::FormValue;
use super::fixtures::random_string;

/// Skip reason for requests against unknown game ids.
const CRASH_UNKNOWN_GAME: &str = "Asking for inexistent game crashes the server.";
/// Skip reason for max-int game dimensions.
const CRASH_MAX_INT: &str = "Max Int crashes the server.";
/// Longest random id tried by the unknown-id scenario.
const MAX_INVALID_ID_LENGTH: usize = 100;

/// Shorthand for an integer field.
const fn int(value: i64) -> FormValue {
    FormValue::Int(value)
}

/// Shorthand for a random text field.
fn text() -> FormValue {
    FormValue::Text(random_string(20))
}

/// Builds a template from literal fields.
fn form(fields: Vec<(&'static str, FormValue)>) -> FormTemplate {
    fields.into_iter().fold(FormTemplate::new(), |template, (key, value)| template.with(key, value))
}

/// Invalid create-game bodies.
fn invalid_games() -> Vec<(&'static str, FormTemplate)> {
    vec![
        ("Create game, no data", form(vec![])),
        ("numPlayers is a String", form(vec![("numPlayers", text()), ("numDice", int(5))])),
        (
            "numPlayers is a float",
            form(vec![("numPlayers", FormValue::Float(17.5)), ("numDice", int(5))]),
        ),
        ("numPlayers is negative", form(vec![("numPlayers", int(-1)), ("numDice", int(5))])),
        ("numPlayers is zero", form(vec![("numPlayers", int(0)), ("numDice", int(5))])),
        ("Invalid numDice", form(vec![("numPlayers", int(5)), ("numDice", int(4))])),
        ("numDice is negative", form(vec![("numPlayers", int(5)), ("numDice", int(-1))])),
        ("numDice is zero", form(vec![("numPlayers", int(5)), ("numDice", int(0))])),
        ("numDice is a String", form(vec![("numPlayers", int(5)), ("numDice", text())])),
        ("no numDice", form(vec![("numPlayers", int(5))])),
        ("No numPlayers", form(vec![("numDice", int(5))])),
    ]
}

/// Claims player 0 may legally make on a fresh game.
fn valid_claims() -> Vec<(&'static str, FormTemplate)> {
    vec![
        (
            "Move one dice",
            form(vec![("moveNumber", int(1)), ("moveFace", FormValue::HandFace)]),
        ),
        ("Make a claim", form(vec![("claimNumber", int(1)), ("claimFace", int(6))])),
        (
            "Make a claim with a current die",
            form(vec![("claimNumber", int(1)), ("claimFace", FormValue::HandFace)]),
        ),
    ]
}

/// Claims the server must reject.
fn invalid_claims() -> Vec<(&'static str, FormTemplate)> {
    let hand = || FormValue::HandFace;
    vec![
        (
            "Move more dices than available in hand",
            form(vec![("moveNumber", int(i64::MAX)), ("moveFace", hand())]),
        ),
        ("Invalid moveNumber (Neg)", form(vec![("moveNumber", int(-100)), ("moveFace", hand())])),
        ("Invalid moveNumber (No moveNumber)", form(vec![("moveFace", hand())])),
        ("Invalid moveNumber (No moveFace)", form(vec![("moveNumber", int(i64::MAX))])),
        ("Invalid moveNumber (moveNumber 0)", form(vec![("moveNumber", int(0)), ("moveFace", hand())])),
        ("Invalid moveNumber (String)", form(vec![("moveNumber", text()), ("moveFace", hand())])),
        ("Invalid moveFace (No moveNumber)", form(vec![("moveFace", hand())])),
        ("Invalid moveFace (Neg)", form(vec![("moveNumber", int(1)), ("moveFace", int(-1))])),
        ("Invalid moveFace (Non valid Die)", form(vec![("moveNumber", int(1)), ("moveFace", int(200))])),
        ("Invalid moveFace (No moveFace)", form(vec![("moveNumber", int(1))])),
        ("Invalid moveFace (String)", form(vec![("moveNumber", int(1)), ("moveFace", text())])),
        (
            "claim more dices than available in hand",
            form(vec![("claimNumber", int(i64::MAX)), ("claimFace", hand())]),
        ),
        ("Invalid claimNumber (Neg)", form(vec![("claimNumber", int(-100)), ("claimFace", hand())])),
        ("Invalid claimNumber (No claimNumber)", form(vec![("claimFace", hand())])),
        ("Invalid claimNumber (No claimFace)", form(vec![("claimNumber", int(i64::MAX))])),
        (
            "Invalid claimNumber (claimNumber 0)",
            form(vec![("claimNumber", int(0)), ("claimFace", hand())]),
        ),
        ("Invalid claimNumber (String)", form(vec![("claimNumber", text()), ("claimFace", hand())])),
        ("Invalid claimFace (No claimNumber)", form(vec![("claimFace", hand())])),
        ("Invalid claimFace (Neg)", form(vec![("claimNumber", int(1)), ("claimFace", int(-1))])),
        (
            "Invalid claimFace (Non valid Die)",
            form(vec![("claimNumber", int(1)), ("claimFace", int(200))]),
        ),
        ("Invalid claimFace (No claimFace)", form(vec![("claimNumber", int(1))])),
        ("Invalid claimFace (String)", form(vec![("claimNumber", int(1)), ("claimFace", text())])),
    ]
}

/// Turns a case description into a stable case-name suffix.
fn slug(description: &str) -> String {
    let mut out = String::with_capacity(description.len());
    for ch in description.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Returns every scenario in execution order.
#[must_use]
pub fn catalogue() -> Vec<Scenario> {
    let mut scenarios = vec![
        Scenario::new(
            "api.list_games",
            "Listing the games returns a JSON list",
            ScenarioKind::ListGames,
        ),
        Scenario::new(
            "api.invalid_game_ids",
            "Unknown game ids are rejected",
            ScenarioKind::InvalidGameIds {
                max_length: MAX_INVALID_ID_LENGTH,
            },
        )
        .known_crash("Requesting for invalid games crashes the server."),
        Scenario::new(
            "api.number_of_dice_max_int",
            "A huge number of dice is handled",
            ScenarioKind::HugeDiceCount,
        )
        .known_crash(CRASH_MAX_INT),
        Scenario::new(
            "api.number_of_players_max_int",
            "A huge number of players is handled",
            ScenarioKind::HugePlayerCount,
        )
        .known_crash(CRASH_MAX_INT),
        Scenario::new("api.valid_game", "Simple check for a valid game", ScenarioKind::ValidGame),
        Scenario::new(
            "api.empty_claim",
            "Send an empty claim to a valid game",
            ScenarioKind::EmptyClaim,
        )
        .known_crash("Empty claims crashes the server."),
    ];

    for (description, template) in invalid_games() {
        scenarios.push(Scenario::new(
            format!("api.invalid_games.{}", slug(description)),
            description,
            ScenarioKind::InvalidGame(template),
        ));
    }

    scenarios.push(Scenario::new(
        "api.do_valid_claim",
        "A claim of one held die is accepted",
        ScenarioKind::ValidClaim,
    ));
    for (description, template) in valid_claims() {
        scenarios.push(Scenario::new(
            format!("api.valid_claims.{}", slug(description)),
            description,
            ScenarioKind::ValidClaimVariant(template.with_default("player", int(0))),
        ));
    }
    for (description, template) in invalid_claims() {
        scenarios.push(Scenario::new(
            format!("api.invalid_claims.{}", slug(description)),
            description,
            ScenarioKind::InvalidClaimVariant(template.with_default("player", int(0))),
        ));
    }

    scenarios.extend([
        Scenario::new(
            "api.move_dice_to_center_re_rolls_dice",
            "Moving a die to the center re-rolls the rest of the hand",
            ScenarioKind::MoveDiceRerolls,
        ),
        Scenario::new(
            "api.claim_twice",
            "Only one claim can be made per turn",
            ScenarioKind::ClaimTwice,
        ),
        Scenario::new(
            "api.make_a_claim_in_invalid_game",
            "A claim against a missing game is rejected",
            ScenarioKind::ClaimInMissingGame,
        )
        .known_crash(CRASH_UNKNOWN_GAME),
        Scenario::new(
            "api.make_a_challenge_in_invalid_game",
            "A challenge against a missing game is rejected",
            ScenarioKind::ChallengeInMissingGame,
        )
        .known_crash(CRASH_UNKNOWN_GAME),
        Scenario::new(
            "api.challenge_before_making_claim",
            "A challenge before any claim is rejected",
            ScenarioKind::ChallengeBeforeClaim,
        ),
        Scenario::new(
            "api.challenge_after_making_a_claim",
            "A true claim holds and a false claim fails when challenged",
            ScenarioKind::ChallengeAfterClaim,
        ),
    ]);

    for players in 2 ..= 5 {
        scenarios.push(Scenario::new(
            format!("gameplay.play_{players}_players"),
            format!("Play a {players} player game until one player is left"),
            ScenarioKind::Gameplay {
                players,
            },
        ));
    }

    scenarios.push(Scenario::new(
        "concurrent.create_games",
        "Create games concurrently within the latency thresholds",
        ScenarioKind::ConcurrentGames,
    ));
    scenarios
}

/// Keeps scenarios whose name contains `filter`; keeps all when `None`.
#[must_use]
pub fn select(scenarios: Vec<Scenario>, filter: Option<&str>) -> Vec<Scenario> {
    match filter {
        Some(needle) if !needle.is_empty() => {
            scenarios.into_iter().filter(|scenario| scenario.name.contains(needle)).collect()
        }
        _ => scenarios,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
