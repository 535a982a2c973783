//! The saved game handle: which server, which game, which token.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Everything needed to keep playing a game across invocations.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct GameHandle {
    /// Server base url.
    url: String,
    /// The game on that server.
    game_id: String,
    /// This player's bearer token.
    player_token: String,
}

impl GameHandle {
    /// Creates a new game handle.
    #[instrument(skip(url, game_id, player_token), fields(game_id = %game_id))]
    pub fn new(url: String, game_id: String, player_token: String) -> Self {
        Self {
            url,
            game_id,
            player_token,
        }
    }

    /// Loads the handle from the cache file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HandleError> {
        debug!("Loading game handle");
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HandleError::new(
                    "No game info saved. Please start or join a game first.".to_string(),
                )
            } else {
                HandleError::new(format!("Failed to read cache file: {}", e))
            }
        })?;

        let handle: Self = toml::from_str(&content)
            .map_err(|e| HandleError::new(format!("Failed to parse cache file: {}", e)))?;

        info!(game_id = %handle.game_id, "Game handle loaded");
        Ok(handle)
    }

    /// Saves the handle to the cache file.
    #[instrument(skip(self, path), fields(game_id = %self.game_id, path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HandleError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HandleError::new(format!("Failed to serialize game handle: {}", e)))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| HandleError::new(format!("Failed to write cache file: {}", e)))?;
        debug!("Game handle saved");
        Ok(())
    }
}

/// Game handle error.
#[derive(Debug, Clone, Display, Error)]
#[display("{}", message)]
pub struct HandleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl HandleError {
    /// Creates a new game handle error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_round_trips_through_the_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t3_cache.toml");

        let handle = GameHandle::new(
            "http://localhost:8000".to_string(),
            "abc123".to_string(),
            "deadbeef".to_string(),
        );
        handle.save(&path).unwrap();

        let loaded = GameHandle::from_file(&path).unwrap();
        assert_eq!(loaded.url(), "http://localhost:8000");
        assert_eq!(loaded.game_id(), "abc123");
        assert_eq!(loaded.player_token(), "deadbeef");
    }

    #[test]
    fn test_missing_cache_file_explains_itself() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameHandle::from_file(dir.path().join("nowhere.toml")).unwrap_err();
        assert_eq!(
            err.message,
            "No game info saved. Please start or join a game first."
        );
    }

    #[test]
    fn test_corrupt_cache_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t3_cache.toml");
        std::fs::write(&path, "not really toml [").unwrap();
        let err = GameHandle::from_file(&path).unwrap_err();
        assert!(err.message.contains("Failed to parse cache file"));
    }
}
