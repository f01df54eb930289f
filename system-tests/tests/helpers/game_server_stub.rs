// system-tests/tests/helpers/game_server_stub.rs
// ============================================================================
// Module: Game Server Stub
// Description: In-process Liar's Dice server for system-tests.
// Purpose: Serve the game REST surface with deterministic validation rules.
// Dependencies: axum, rand, serde_json, tokio
// ============================================================================

//! ## Overview
//! A small Liar's Dice server with the same endpoints as the real one.
//! Validation rules:
//! - games need a positive `numPlayers` (at most [`MAX_PLAYERS`]) and exactly
//!   five dice per player;
//! - claims and moves come in number/face pairs, faces are `1..=6`, and a
//!   player may not act twice in a row;
//! - a challenge needs an outstanding claim from another player; the loser
//!   drops a die and every hand is re-rolled.
//!
//! Failures answer with a JSON `{"error": ...}` body and a 4xx status.

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use axum::Form;
use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use rand::Rng;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tokio::time::sleep;

/// Largest game the stub will deal.
pub const MAX_PLAYERS: i64 = 100;
/// Dice per player the stub accepts.
const DICE_PER_PLAYER: i64 = 5;
/// Faces on a die.
const FACES: i64 = 6;

type FormFields = HashMap<String, String>;

/// Stub behavior knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubOptions {
    /// Fail every n-th create call with a 500.
    pub fail_every: Option<u64>,
    /// Delay before answering a create call.
    pub create_delay: Duration,
}

#[derive(Debug, Clone)]
struct Game {
    id: String,
    num_players: i64,
    num_dice: i64,
    hands: Vec<Vec<i64>>,
    board: Vec<i64>,
    actions: Vec<Value>,
    last_actor: Option<usize>,
    claim: Option<Claim>,
}

#[derive(Debug, Clone, Copy)]
struct Claim {
    player: usize,
    number: i64,
    face: i64,
}

impl Game {
    fn document(&self) -> Value {
        json!({
            "_id": self.id,
            "numPlayers": self.num_players,
            "numDice": self.num_dice,
            "board": self.board,
            "actions": self.actions,
            "playerHands": self.hands,
        })
    }

    fn total_dice(&self) -> usize {
        self.hands.iter().map(Vec::len).sum::<usize>() + self.board.len()
    }

    fn count_face(&self, face: i64) -> usize {
        self.hands.iter().flatten().chain(self.board.iter()).filter(|die| **die == face).count()
    }
}

#[derive(Default)]
struct GameStore {
    games: HashMap<String, Game>,
    order: Vec<String>,
}

#[derive(Clone)]
struct StubState {
    store: Arc<Mutex<GameStore>>,
    options: StubOptions,
    creates: Arc<AtomicU64>,
}

/// Handle for the stub game server.
pub struct GameServerStub {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
    creates: Arc<AtomicU64>,
}

impl GameServerStub {
    /// Returns the server root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the number of create calls received.
    pub fn create_calls(&self) -> u64 {
        self.creates.load(Ordering::SeqCst)
    }
}

impl Drop for GameServerStub {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns a stub with default options.
pub fn spawn_game_server() -> Result<GameServerStub, String> {
    spawn_game_server_with(StubOptions::default())
}

/// Spawns a stub with the given options.
pub fn spawn_game_server_with(options: StubOptions) -> Result<GameServerStub, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("game stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("game stub listener nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("game stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}/");

    let creates = Arc::new(AtomicU64::new(0));
    let state = StubState {
        store: Arc::new(Mutex::new(GameStore::default())),
        options,
        creates: Arc::clone(&creates),
    };
    let app = Router::new()
        .route("/", get(landing))
        .route("/games", get(list_games).post(create_game))
        .route("/games/:id", get(get_game))
        .route("/games/:id/claim", post(claim))
        .route("/games/:id/challenge", post(challenge))
        .with_state(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(GameServerStub {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
        creates,
    })
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

fn reject(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    reject(StatusCode::BAD_REQUEST, message)
}

fn missing_game(id: &str) -> Response {
    reject(StatusCode::NOT_FOUND, format!("game {id} not found"))
}

fn int_field(form: &FormFields, key: &str) -> Result<Option<i64>, Response> {
    form.get(key)
        .map(|raw| raw.trim().parse::<i64>().map_err(|_| bad_request(format!("{key} must be an integer"))))
        .transpose()
}

fn roll(count: usize) -> Vec<i64> {
    let mut rng = rand::thread_rng();
    (0 .. count).map(|_| rng.gen_range(1 ..= FACES)).collect()
}

fn sorted(dice: &[i64]) -> Vec<i64> {
    let mut dice = dice.to_vec();
    dice.sort_unstable();
    dice
}

async fn landing() -> &'static str {
    "Liar's Dice"
}

async fn list_games(State(state): State<StubState>) -> Response {
    let Ok(store) = state.store.lock() else {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    let games: Vec<Value> =
        store.order.iter().filter_map(|id| store.games.get(id)).map(Game::document).collect();
    Json(Value::Array(games)).into_response()
}

async fn create_game(State(state): State<StubState>, Form(form): Form<FormFields>) -> Response {
    let call = state.creates.fetch_add(1, Ordering::SeqCst) + 1;
    if !state.options.create_delay.is_zero() {
        sleep(state.options.create_delay).await;
    }
    if state.options.fail_every.is_some_and(|every| every > 0 && call % every == 0) {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, format!("injected failure on call {call}"));
    }

    let players = match int_field(&form, "numPlayers") {
        Ok(Some(players)) if (1 ..= MAX_PLAYERS).contains(&players) => players,
        Ok(_) => return bad_request(format!("numPlayers must be between 1 and {MAX_PLAYERS}")),
        Err(response) => return response,
    };
    match int_field(&form, "numDice") {
        Ok(Some(DICE_PER_PLAYER)) => {}
        Ok(_) => return bad_request(format!("numDice must be {DICE_PER_PLAYER}")),
        Err(response) => return response,
    }

    let id = format!("{:016x}", rand::thread_rng().gen_range(0 ..= u64::MAX));
    let dice = usize::try_from(DICE_PER_PLAYER).unwrap_or(0);
    let hands = (0 .. players).map(|_| roll(dice)).collect();
    let game = Game {
        id: id.clone(),
        num_players: players,
        num_dice: DICE_PER_PLAYER,
        hands,
        board: Vec::new(),
        actions: Vec::new(),
        last_actor: None,
        claim: None,
    };
    let document = game.document();
    let Ok(mut store) = state.store.lock() else {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    store.order.push(id.clone());
    store.games.insert(id, game);
    Json(document).into_response()
}

async fn get_game(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    let Ok(store) = state.store.lock() else {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    store.games.get(&id).map_or_else(|| missing_game(&id), |game| Json(game.document()).into_response())
}

/// Reads the acting player and checks they still hold dice.
fn acting_player(form: &FormFields, game: &Game) -> Result<usize, Response> {
    let player = int_field(form, "player")?.ok_or_else(|| bad_request("player is required"))?;
    let index = usize::try_from(player).map_err(|_| bad_request("player must not be negative"))?;
    match game.hands.get(index) {
        Some(hand) if !hand.is_empty() => Ok(index),
        Some(_) => Err(bad_request(format!("player {index} has no dice left"))),
        None => Err(bad_request(format!("player {index} is not in this game"))),
    }
}

/// Reads a number/face pair; both or neither must be present.
fn pair(
    form: &FormFields,
    number_key: &str,
    face_key: &str,
) -> Result<Option<(i64, i64)>, Response> {
    match (int_field(form, number_key)?, int_field(form, face_key)?) {
        (Some(number), Some(face)) => {
            if (1 ..= FACES).contains(&face) {
                Ok(Some((number, face)))
            } else {
                Err(bad_request(format!("{face_key} must be between 1 and {FACES}")))
            }
        }
        (None, None) => Ok(None),
        _ => Err(bad_request(format!("{number_key} and {face_key} must be sent together"))),
    }
}

fn apply_claim(game: &mut Game, form: &FormFields) -> Result<(), Response> {
    let player = acting_player(form, game)?;
    if game.last_actor == Some(player) {
        return Err(bad_request(format!("player {player} already acted this turn")));
    }
    let claimed = pair(form, "claimNumber", "claimFace")?;
    let moved = pair(form, "moveNumber", "moveFace")?;
    if claimed.is_none() && moved.is_none() {
        return Err(bad_request("a claim or a move is required"));
    }
    if let Some((number, _)) = claimed {
        let total = i64::try_from(game.total_dice()).unwrap_or(i64::MAX);
        if !(1 ..= total).contains(&number) {
            return Err(bad_request(format!("claimNumber must be between 1 and {total}")));
        }
    }
    if let Some((number, face)) = moved {
        let held = game.hands[player].iter().filter(|die| **die == face).count();
        let held = i64::try_from(held).unwrap_or(i64::MAX);
        if !(1 ..= held).contains(&number) {
            return Err(bad_request(format!("moveNumber must be between 1 and {held}")));
        }
    }

    if let Some((number, face)) = moved {
        let hand = &mut game.hands[player];
        for _ in 0 .. number {
            if let Some(index) = hand.iter().position(|die| *die == face) {
                game.board.push(hand.remove(index));
            }
        }
        if !hand.is_empty() {
            let before = sorted(hand);
            loop {
                let rolled = roll(hand.len());
                if sorted(&rolled) != before {
                    *hand = rolled;
                    break;
                }
            }
        }
    }
    if let Some((number, face)) = claimed {
        game.claim = Some(Claim {
            player,
            number,
            face,
        });
    }
    game.last_actor = Some(player);
    game.actions.push(json!({
        "player": player,
        "claim": claimed.map(|(number, face)| json!({ "number": number, "face": face })),
        "move": moved.map(|(number, face)| json!({ "number": number, "face": face })),
    }));
    Ok(())
}

async fn claim(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Form(form): Form<FormFields>,
) -> Response {
    let Ok(mut store) = state.store.lock() else {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    let Some(game) = store.games.get_mut(&id) else {
        return missing_game(&id);
    };
    match apply_claim(game, &form) {
        Ok(()) => Json(game.document()).into_response(),
        Err(response) => response,
    }
}

fn apply_challenge(game: &mut Game, form: &FormFields) -> Result<bool, Response> {
    let player = acting_player(form, game)?;
    let Some(claim) = game.claim else {
        return Err(bad_request("there is no claim to challenge"));
    };
    if claim.player == player {
        return Err(bad_request("players cannot challenge their own claim"));
    }
    let held = i64::try_from(game.count_face(claim.face)).unwrap_or(i64::MAX) >= claim.number;
    let loser = if held { player } else { claim.player };
    game.hands[loser].pop();
    for hand in &mut game.hands {
        *hand = roll(hand.len());
    }
    game.board.clear();
    game.claim = None;
    game.last_actor = None;
    game.actions.push(json!({ "player": player, "challenge": true, "claimHeld": held }));
    Ok(held)
}

async fn challenge(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Form(form): Form<FormFields>,
) -> Response {
    let Ok(mut store) = state.store.lock() else {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    let Some(game) = store.games.get_mut(&id) else {
        return missing_game(&id);
    };
    match apply_challenge(game, &form) {
        Ok(held) => {
            let mut document = game.document();
            if let Some(object) = document.as_object_mut() {
                object.insert("claimHeld".to_string(), Value::Bool(held));
            }
            Json(document).into_response()
        }
        Err(response) => response,
    }
}
