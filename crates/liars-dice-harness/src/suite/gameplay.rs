// crates/liars-dice-harness/src/suite/gameplay.rs
// ============================================================================
// Module: Gameplay Scenario
// Description: Plays a game from deal to a single remaining player.
// Purpose: Exercise claim and challenge rounds until the game ends.
// Dependencies: serde_json, tracing
// ============================================================================

use serde_json::json;
use tracing::debug;

use super::CaseError;
use super::fixtures::end_game;
use super::fixtures::next_active;
use crate::assertions::AssertionFailure;
use crate::assertions::assert_game_response_keys;
use crate::assertions::assert_ok;
use crate::assertions::game_id;
use crate::assertions::player_hands;
use crate::client::GameClient;

/// Dice per player in gameplay scenarios.
pub(super) const STANDARD_DICE: u32 = 5;

/// Plays a game to completion.
///
/// Each round the current claimant claims one die of a face it holds and
/// the next active player challenges. A true claim always costs the
/// challenger a die, so the game ends after at most `players * dice` rounds.
pub(super) async fn play(client: &GameClient, players: u32, dice: u32) -> Result<(), CaseError> {
    let response = client.new_game(&json!({ "numPlayers": players, "numDice": dice })).await?;
    let body = assert_ok(&response, "Failed to create a game to play")?;
    assert_game_response_keys(&body)?;
    let id = game_id(&body)?;
    let mut hands = player_hands(&body)?;
    if hands.len() != usize::try_from(players).unwrap_or(usize::MAX) {
        return Err(AssertionFailure::Check(format!(
            "expected {players} hands, got {} in game {id}",
            hands.len()
        ))
        .into());
    }

    let max_rounds = players.saturating_mul(dice);
    let mut claimant = 0;
    for round in 0 .. max_rounds {
        if end_game(&hands) {
            debug!(game = %id, rounds = round, "game finished");
            return Ok(());
        }
        let Some(current) = next_active(&hands, claimant) else {
            break;
        };
        let Some(challenger) = next_active(&hands, current + 1) else {
            break;
        };
        let face = hands.get(current).and_then(|hand| hand.first().copied()).unwrap_or(1);
        let claim = json!({ "player": current, "claimNumber": 1, "claimFace": face });
        assert_ok(
            &client.claim(&id, &claim).await?,
            &format!("Round {round}: player {current} failed to claim"),
        )?;
        assert_ok(
            &client.challenge(&id, &json!({ "player": challenger })).await?,
            &format!("Round {round}: player {challenger} failed to challenge"),
        )?;

        let body = assert_ok(&client.get_game(&id).await?, "Failed to fetch game")?;
        assert_game_response_keys(&body)?;
        hands = player_hands(&body)?;
        claimant = challenger;
    }

    if end_game(&hands) {
        Ok(())
    } else {
        Err(AssertionFailure::Check(format!(
            "game {id} did not finish within {max_rounds} rounds"
        ))
        .into())
    }
}
