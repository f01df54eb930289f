// crates/liars-dice-harness/src/suite/api.rs
// ============================================================================
// Module: API Scenarios
// Description: Request validation and claim/challenge rule checks.
// Purpose: Verify the server accepts valid calls and rejects malformed ones.
// Dependencies: serde_json
// ============================================================================

use serde_json::Value;
use serde_json::json;

use super::CaseError;
use super::fixtures::FormTemplate;
use super::fixtures::count_face;
use super::fixtures::random_string;
use super::fixtures::total_dice;
use crate::assertions::assert_error;
use crate::assertions::assert_game_response_keys;
use crate::assertions::assert_ok;
use crate::assertions::check;
use crate::assertions::game_id;
use crate::assertions::player_hands;
use crate::client::GameClient;

/// Players in a standard game.
const STANDARD_PLAYERS: u32 = 5;
/// Dice per player in a standard game.
const STANDARD_DICE: u32 = 5;

/// A freshly created standard game.
struct DealtGame {
    /// Game id.
    id: String,
    /// Dealt hands, one per player.
    hands: Vec<Vec<i64>>,
}

impl DealtGame {
    /// Some face held by `player`.
    fn face_of(&self, player: usize) -> Result<i64, CaseError> {
        self.hands.get(player).and_then(|hand| hand.first().copied()).ok_or_else(|| {
            CaseError::Skip(format!("player {player} holds no dice in game {}", self.id))
        })
    }
}

/// Creates a 5 player, 5 dice game and validates the document.
async fn deal(client: &GameClient) -> Result<DealtGame, CaseError> {
    let response = client
        .new_game(&json!({ "numPlayers": STANDARD_PLAYERS, "numDice": STANDARD_DICE }))
        .await?;
    let body = assert_ok(&response, "Failed to create a standard game")?;
    assert_game_response_keys(&body)?;
    Ok(DealtGame {
        id: game_id(&body)?,
        hands: player_hands(&body)?,
    })
}

/// Fetches the current hands of a game.
async fn current_hands(client: &GameClient, id: &str) -> Result<Vec<Vec<i64>>, CaseError> {
    let body = assert_ok(&client.get_game(id).await?, "Failed to fetch game")?;
    assert_game_response_keys(&body)?;
    Ok(player_hands(&body)?)
}

/// Reads the challenge verdict from a response body, if it carries one.
fn claim_held(body: &Value) -> Option<bool> {
    match body {
        Value::Bool(held) => Some(*held),
        Value::Object(map) => map.get("claimHeld").and_then(Value::as_bool),
        _ => None,
    }
}

// ============================================================================
// SECTION: Games
// ============================================================================

pub(super) async fn list_games(client: &GameClient) -> Result<(), CaseError> {
    let body = assert_ok(&client.list_games().await?, "Failed to list games")?;
    check(
        body.is_array(),
        "A json list wasn't returned when asking for the game list.",
    )?;
    Ok(())
}

pub(super) async fn valid_game(client: &GameClient) -> Result<(), CaseError> {
    deal(client).await.map(|_| ())
}

pub(super) async fn invalid_game(
    client: &GameClient,
    template: &FormTemplate,
) -> Result<(), CaseError> {
    let response = client.new_game(&template.resolve(None)).await?;
    assert_error(&response, "Server accepted an invalid game")?;
    Ok(())
}

pub(super) async fn invalid_game_ids(
    client: &GameClient,
    max_length: usize,
) -> Result<(), CaseError> {
    for length in 1 ..= max_length {
        let response = client.get_game(&random_string(length)).await?;
        assert_error(&response, &format!("Unknown game id of length {length} was found"))?;
    }
    Ok(())
}

/// Creates a game with one huge dimension and checks it is echoed back.
async fn huge_game(client: &GameClient, players: i64, dice: i64) -> Result<(), CaseError> {
    let response = client.new_game(&json!({ "numPlayers": players, "numDice": dice })).await?;
    let body = assert_ok(&response, "Server failed on a huge game")?;
    assert_game_response_keys(&body)?;
    check(body.get("numDice").and_then(Value::as_i64) == Some(dice), "numDice was not echoed")?;
    check(
        body.get("numPlayers").and_then(Value::as_i64) == Some(players),
        "numPlayers was not echoed",
    )?;
    Ok(())
}

pub(super) async fn huge_dice_count(client: &GameClient) -> Result<(), CaseError> {
    huge_game(client, i64::from(STANDARD_PLAYERS), i64::MAX).await
}

pub(super) async fn huge_player_count(client: &GameClient) -> Result<(), CaseError> {
    huge_game(client, i64::MAX, i64::from(STANDARD_DICE)).await
}

// ============================================================================
// SECTION: Claims
// ============================================================================

pub(super) async fn empty_claim(client: &GameClient) -> Result<(), CaseError> {
    let game = deal(client).await?;
    let response = client.claim(&game.id, &json!({})).await?;
    assert_error(&response, "Server accepted an empty claim")?;
    Ok(())
}

pub(super) async fn valid_claim(client: &GameClient) -> Result<(), CaseError> {
    let game = deal(client).await?;
    let face = game.face_of(0)?;
    let response = client
        .claim(&game.id, &json!({ "player": 0, "claimNumber": 1, "claimFace": face }))
        .await?;
    assert_ok(&response, "Failed to do a valid claim")?;
    Ok(())
}

pub(super) async fn templated_claim(
    client: &GameClient,
    template: &FormTemplate,
    expect_ok: bool,
) -> Result<(), CaseError> {
    let game = deal(client).await?;
    let face = if template.needs_hand_face() { Some(game.face_of(0)?) } else { None };
    let response = client.claim(&game.id, &template.resolve(face)).await?;
    if expect_ok {
        assert_ok(&response, "Server rejected a valid claim")?;
    } else {
        assert_error(&response, "Server accepted an invalid claim")?;
    }
    Ok(())
}

pub(super) async fn move_dice_rerolls(client: &GameClient) -> Result<(), CaseError> {
    let game = deal(client).await?;
    let face = game.face_of(0)?;
    let mut before =
        game.hands.first().and_then(|hand| hand.get(1 ..)).unwrap_or_default().to_vec();
    let response = client
        .claim(&game.id, &json!({ "player": 0, "moveNumber": 1, "moveFace": face }))
        .await?;
    assert_ok(&response, "Failed to move a die to the center")?;

    let mut after = current_hands(client, &game.id).await?.into_iter().next().unwrap_or_default();
    check(
        before.len() == after.len(),
        format!("Die didn't get removed from player's 0 hand. Game: {}", game.id),
    )?;
    before.sort_unstable();
    after.sort_unstable();
    check(before != after, "Dice didn't get re-rolled when moving to the center.")?;
    Ok(())
}

pub(super) async fn claim_twice(client: &GameClient) -> Result<(), CaseError> {
    let game = deal(client).await?;
    let face = game.face_of(0)?;
    let claim = json!({ "player": 0, "claimNumber": 1, "claimFace": face });
    assert_ok(&client.claim(&game.id, &claim).await?, "Failed to do a valid claim")?;
    assert_error(
        &client.claim(&game.id, &claim).await?,
        "Failed to error on invalid double claim.",
    )?;
    Ok(())
}

pub(super) async fn claim_in_missing_game(client: &GameClient) -> Result<(), CaseError> {
    let response = client
        .claim(&random_string(20), &json!({ "player": 0, "moveNumber": 0, "moveFace": 1 }))
        .await?;
    assert_error(&response, "Claim against a missing game was accepted")?;
    Ok(())
}

// ============================================================================
// SECTION: Challenges
// ============================================================================

pub(super) async fn challenge_in_missing_game(client: &GameClient) -> Result<(), CaseError> {
    let response = client.challenge(&random_string(20), &json!({ "player": 0 })).await?;
    assert_error(&response, "Challenge against a missing game was accepted")?;
    Ok(())
}

pub(super) async fn challenge_before_claim(client: &GameClient) -> Result<(), CaseError> {
    let game = deal(client).await?;
    let response = client.challenge(&game.id, &json!({ "player": 1 })).await?;
    assert_error(&response, "Challenge without a claim was accepted")?;
    Ok(())
}

pub(super) async fn challenge_after_claim(client: &GameClient) -> Result<(), CaseError> {
    let game = deal(client).await?;
    let face = game.face_of(0)?;
    let count = count_face(&game.hands, face);
    let claim = json!({ "player": 0, "claimNumber": count, "claimFace": face });
    assert_ok(&client.claim(&game.id, &claim).await?, "Failed to claim")?;
    let body = assert_ok(
        &client.challenge(&game.id, &json!({ "player": 1 })).await?,
        "Failed to challenge a true claim",
    )?;
    check(
        claim_held(&body) != Some(false),
        format!("Claim executed by user should be correct. Game {}", game.id),
    )?;

    let hands = current_hands(client, &game.id).await?;
    let face = hands
        .get(1)
        .and_then(|hand| hand.first().copied())
        .ok_or_else(|| CaseError::Skip(format!("player 1 holds no dice in game {}", game.id)))?;
    let count = count_face(&hands, face) + 1;
    if count > total_dice(&hands) {
        return Err(CaseError::Skip(format!("every die shows {face} in game {}", game.id)));
    }
    let claim = json!({ "player": 1, "claimNumber": count, "claimFace": face });
    assert_ok(&client.claim(&game.id, &claim).await?, "Failed to claim")?;
    let body = assert_ok(
        &client.challenge(&game.id, &json!({ "player": 2 })).await?,
        "Failed to challenge a false claim",
    )?;
    check(
        claim_held(&body) != Some(true),
        format!("Claim executed by user is not correct. Game {}", game.id),
    )?;
    Ok(())
}
