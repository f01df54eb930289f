// crates/liars-dice-harness/src/assertions.rs
// ============================================================================
// Module: Response Assertions
// Description: Shared response checks for Liar's Dice scenarios.
// Purpose: Turn raw responses into validated JSON or descriptive failures.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every scenario funnels server responses through these checks. Failures
//! carry a full dump of the exchange (see [`format_response`]) so a report
//! reader can diagnose the server without rerunning the suite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use serde_json::Value;
use thiserror::Error;

use crate::client::ApiResponse;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Keys every game document must carry.
pub const GAME_RESPONSE_KEYS: [&str; 6] =
    ["numDice", "numPlayers", "board", "actions", "playerHands", "_id"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A failed response check.
#[derive(Debug, Error)]
pub enum AssertionFailure {
    /// The response body was not JSON.
    #[error("Invalid text found in response: {0}")]
    InvalidJson(String),
    /// A success response was expected.
    #[error("expected status 200, got {status}. {message}\n{details}")]
    ExpectedOk {
        /// Observed status.
        status: u16,
        /// Caller context.
        message: String,
        /// Formatted exchange.
        details: String,
    },
    /// An error response was expected.
    #[error("expected an error response. {message}\n{details}")]
    ExpectedError {
        /// Caller context.
        message: String,
        /// Formatted exchange.
        details: String,
    },
    /// A game document lacked a required key.
    #[error("Key '{0}' wasn't available in New Game Response.")]
    MissingKey(String),
    /// A game document field had an unexpected shape.
    #[error("field '{field}' is malformed: {reason}")]
    MalformedField {
        /// Field name.
        field: String,
        /// What was wrong.
        reason: String,
    },
    /// A scenario-level expectation did not hold.
    #[error("{0}")]
    Check(String),
}

// ============================================================================
// SECTION: Assertions
// ============================================================================

/// Parses the body as JSON or fails with the formatted exchange.
fn json_or_fail(response: &ApiResponse) -> Result<Value, AssertionFailure> {
    response.json().map_err(|_| AssertionFailure::InvalidJson(format_response(response)))
}

/// Asserts a 200 response with a JSON body and returns the body.
///
/// # Errors
///
/// Returns [`AssertionFailure`] when the body is not JSON or the status is
/// not 200.
pub fn assert_ok(response: &ApiResponse, message: &str) -> Result<Value, AssertionFailure> {
    let body = json_or_fail(response)?;
    if response.status != 200 {
        return Err(AssertionFailure::ExpectedOk {
            status: response.status,
            message: message.to_string(),
            details: format_response(response),
        });
    }
    Ok(body)
}

/// Asserts an error response with a JSON body and returns the body.
///
/// A response counts as an error when its status is 4xx/5xx or its JSON
/// object carries an `error` key.
///
/// # Errors
///
/// Returns [`AssertionFailure`] when the body is not JSON or the response
/// looks like a success.
pub fn assert_error(response: &ApiResponse, message: &str) -> Result<Value, AssertionFailure> {
    let body = json_or_fail(response)?;
    let flagged = body.as_object().is_some_and(|object| object.contains_key("error"));
    if response.is_error_status() || flagged {
        return Ok(body);
    }
    Err(AssertionFailure::ExpectedError {
        message: message.to_string(),
        details: format_response(response),
    })
}

/// Asserts that a game document carries every key in [`GAME_RESPONSE_KEYS`].
///
/// # Errors
///
/// Returns [`AssertionFailure::MissingKey`] for the first absent key.
pub fn assert_game_response_keys(body: &Value) -> Result<(), AssertionFailure> {
    for key in GAME_RESPONSE_KEYS {
        if body.get(key).is_none() {
            return Err(AssertionFailure::MissingKey(key.to_string()));
        }
    }
    Ok(())
}

/// Fails with `message` unless `condition` holds.
///
/// # Errors
///
/// Returns [`AssertionFailure::Check`] when `condition` is false.
pub fn check(condition: bool, message: impl Into<String>) -> Result<(), AssertionFailure> {
    if condition { Ok(()) } else { Err(AssertionFailure::Check(message.into())) }
}

// ============================================================================
// SECTION: Game Document Accessors
// ============================================================================

/// Returns the game id (`_id`) as a string.
///
/// # Errors
///
/// Returns [`AssertionFailure`] when `_id` is absent or not a string/number.
pub fn game_id(body: &Value) -> Result<String, AssertionFailure> {
    match body.get("_id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(_) => Err(AssertionFailure::MalformedField {
            field: "_id".to_string(),
            reason: "expected a non-empty string or number".to_string(),
        }),
        None => Err(AssertionFailure::MissingKey("_id".to_string())),
    }
}

/// Returns `playerHands` as one die-face list per player.
///
/// # Errors
///
/// Returns [`AssertionFailure`] when the field is absent or not a list of
/// integer lists.
pub fn player_hands(body: &Value) -> Result<Vec<Vec<i64>>, AssertionFailure> {
    let malformed = |reason: &str| AssertionFailure::MalformedField {
        field: "playerHands".to_string(),
        reason: reason.to_string(),
    };
    let hands = body
        .get("playerHands")
        .ok_or_else(|| AssertionFailure::MissingKey("playerHands".to_string()))?
        .as_array()
        .ok_or_else(|| malformed("expected a list of hands"))?;
    hands
        .iter()
        .map(|hand| -> Result<Vec<i64>, AssertionFailure> {
            hand.as_array()
                .ok_or_else(|| malformed("expected each hand to be a list"))?
                .iter()
                .map(|die| die.as_i64().ok_or_else(|| malformed("expected integer die faces")))
                .collect()
        })
        .collect()
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats an exchange for failure messages.
#[must_use]
pub fn format_response(response: &ApiResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "    Status Code: {}", response.status);
    let _ = writeln!(out, "    Method: {}", response.method);
    let _ = writeln!(out, "    User Headers: {}", format_headers(&response.request_headers));
    let _ = writeln!(out, "    Server Headers: {}", format_headers(&response.headers));
    let _ = writeln!(out, "    Url: {}", response.url);
    let _ = writeln!(out, "    Data: {}", response.request_body.as_deref().unwrap_or(""));
    let _ = writeln!(out, "    Content: {}", response.body);
    let _ = writeln!(out, "    Reason: {}", response.reason);
    let _ = write!(out, "    Elapsed: {} ms", response.elapsed.as_millis());
    out
}

/// Renders header pairs as `{name: value, ...}`.
fn format_headers(headers: &[(String, String)]) -> String {
    let joined = headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{joined}}}")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "assertions_tests.rs"]
mod tests;
