//! Talking to the game server.

use crate::handle::GameHandle;
use derive_more::{Display, Error};
use serde::Deserialize;
use serde_json::json;
use snapmark_core::{Board, Seat};
use tracing::{debug, error, instrument};

/// Header carrying the player token on photo submissions.
const PLAYER_TOKEN_HEADER: &str = "x-player-token";

/// State view returned by the server.
#[derive(Debug, Deserialize)]
pub struct GameView {
    /// The board.
    pub game_state: Board,
    /// Name of the player who created the game.
    pub first_player_name: String,
    /// Name of the player who joined, if anybody has.
    pub second_player_name: Option<String>,
    /// The seat to move.
    pub current_turn: Seat,
}

/// Outcome attached to a move that ends the game.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum TurnOutcome {
    /// Somebody completed a line.
    Won {
        /// Name of the winning player.
        winner: String,
    },
    /// All nine cells played without a line.
    Draw,
}

/// The move the server reconciled a photo to.
#[derive(Debug, Deserialize)]
pub struct PlayedMove {
    /// Row of the inferred move.
    pub row: usize,
    /// Column of the inferred move.
    pub column: usize,
}

/// Response to a photo submission.
#[derive(Debug, Deserialize)]
pub struct SnapReport {
    /// The move the photo was reconciled to.
    #[serde(rename = "move")]
    pub played: PlayedMove,
    /// Whether that move ended the game.
    pub outcome: Option<TurnOutcome>,
}

#[derive(Debug, Deserialize)]
struct Credentials {
    game_id: String,
    player_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP client for one game server.
#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a new API client.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Starts a new game and returns its handle.
    #[instrument(skip(self, player_name), fields(url = %url))]
    pub async fn start_game(&self, url: &str, player_name: &str) -> Result<GameHandle, ClientError> {
        debug!("Starting new game");
        let response = self
            .http
            .post(format!("{url}/new_game"))
            .json(&json!({"player_name": player_name}))
            .send()
            .await
            .map_err(request_failed)?;
        let credentials: Credentials = check(response).await?.json().await.map_err(bad_body)?;
        Ok(GameHandle::new(
            url.to_string(),
            credentials.game_id,
            credentials.player_token,
        ))
    }

    /// Joins an existing game and returns its handle.
    #[instrument(skip(self, player_name), fields(url = %url, game_id = %game_id))]
    pub async fn join_game(
        &self,
        url: &str,
        player_name: &str,
        game_id: &str,
    ) -> Result<GameHandle, ClientError> {
        debug!("Joining game");
        let response = self
            .http
            .post(format!("{url}/{game_id}/join"))
            .json(&json!({"player_name": player_name}))
            .send()
            .await
            .map_err(request_failed)?;
        let credentials: Credentials = check(response).await?.json().await.map_err(bad_body)?;
        Ok(GameHandle::new(
            url.to_string(),
            credentials.game_id,
            credentials.player_token,
        ))
    }

    /// Fetches the current view of the game.
    #[instrument(skip(self, handle), fields(game_id = %handle.game_id()))]
    pub async fn fetch_state(&self, handle: &GameHandle) -> Result<GameView, ClientError> {
        let response = self
            .http
            .get(format!("{}/{}", handle.url(), handle.game_id()))
            .send()
            .await
            .map_err(request_failed)?;
        check(response).await?.json().await.map_err(bad_body)
    }

    /// Plays a turn at explicit coordinates.
    #[instrument(skip(self, handle), fields(game_id = %handle.game_id()))]
    pub async fn play_turn(
        &self,
        handle: &GameHandle,
        row: usize,
        column: usize,
    ) -> Result<Option<TurnOutcome>, ClientError> {
        debug!("Playing turn");
        let response = self
            .http
            .post(format!("{}/{}/play_turn", handle.url(), handle.game_id()))
            .json(&json!({
                "player_token": handle.player_token(),
                "row": row,
                "column": column,
            }))
            .send()
            .await
            .map_err(request_failed)?;
        check(response).await?.json().await.map_err(bad_body)
    }

    /// Submits a photo of the board as this player's move.
    #[instrument(skip(self, handle, photo), fields(game_id = %handle.game_id(), bytes = photo.len()))]
    pub async fn play_photo(
        &self,
        handle: &GameHandle,
        photo: Vec<u8>,
    ) -> Result<SnapReport, ClientError> {
        debug!("Submitting board photo");
        let response = self
            .http
            .post(format!(
                "{}/{}/play_turn/image",
                handle.url(),
                handle.game_id()
            ))
            .header(PLAYER_TOKEN_HEADER, handle.player_token().as_str())
            .body(photo)
            .send()
            .await
            .map_err(request_failed)?;
        check(response).await?.json().await.map_err(bad_body)
    }
}

/// Turns a non-success response into an error carrying the server's
/// `detail` explanation.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = match response.json::<ErrorBody>().await {
        Ok(body) => body.detail,
        Err(_) => status.to_string(),
    };
    error!(status = %status, detail = %detail, "Server rejected the request");
    Err(ClientError::new(format!("{} ({})", detail, status)))
}

fn request_failed(err: reqwest::Error) -> ClientError {
    error!(error = %err, "Request failed");
    ClientError::new(format!("Could not reach the server: {}", err))
}

fn bad_body(err: reqwest::Error) -> ClientError {
    error!(error = %err, "Unreadable response body");
    ClientError::new(format!("Could not read the server response: {}", err))
}

/// Client error.
#[derive(Debug, Clone, Display, Error)]
#[display("{}", message)]
pub struct ClientError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ClientError {
    /// Creates a new client error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
