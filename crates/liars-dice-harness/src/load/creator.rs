// crates/liars-dice-harness/src/load/creator.rs
// ============================================================================
// Module: Game Creator
// Description: Create-game capability backed by the HTTP client.
// Purpose: Adapt `POST /games` into the load harness create contract.
// Dependencies: async-trait, serde_json
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use super::harness::CreateResource;
use super::harness::CreatedResource;
use crate::assertions::assert_game_response_keys;
use crate::assertions::assert_ok;
use crate::assertions::game_id;
use crate::client::GameClient;

/// Creates one game per call and validates the returned document.
#[derive(Clone)]
pub struct GameCreator {
    /// Client used for every call.
    client: GameClient,
    /// Form body sent with every call.
    body: Value,
}

impl GameCreator {
    /// Creates games with `players` players and `dice` dice each.
    #[must_use]
    pub fn new(client: GameClient, players: u32, dice: u32) -> Self {
        Self {
            client,
            body: json!({ "numPlayers": players, "numDice": dice }),
        }
    }
}

#[async_trait]
impl CreateResource for GameCreator {
    async fn create(&self) -> Result<CreatedResource, String> {
        let response = self.client.new_game(&self.body).await.map_err(|err| err.to_string())?;
        let document = assert_ok(&response, "").map_err(|err| err.to_string())?;
        assert_game_response_keys(&document).map_err(|err| err.to_string())?;
        let id = game_id(&document).map_err(|err| err.to_string())?;
        Ok(CreatedResource {
            id,
            elapsed: response.elapsed,
        })
    }
}
