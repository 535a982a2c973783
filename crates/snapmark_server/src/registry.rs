//! In-memory game registry shared across requests.

use snapmark_core::{Game, GameId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// Handle to a registered game.
///
/// Requests lock the game they address, not the whole registry, so
/// concurrent moves in different games never serialize on each other.
pub type SharedGame = Arc<Mutex<Game>>;

/// Owns every live game, keyed by id.
///
/// The registry lock guards only the map itself; each game carries its
/// own mutex. Handlers clone the `Arc` out of the map and drop the
/// registry lock before touching the game.
#[derive(Debug, Clone)]
pub struct GameRegistry {
    games: Arc<Mutex<HashMap<GameId, SharedGame>>>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("creating game registry");
        Self {
            games: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a game for the given first player and registers it under
    /// a fresh id.
    #[instrument(skip(self, first_player_name))]
    pub fn create(&self, first_player_name: impl Into<String>) -> (GameId, SharedGame) {
        let id = GameId::generate();
        let game = Game::new(id.clone(), first_player_name);
        let shared = Arc::new(Mutex::new(game));
        self.games
            .lock()
            .unwrap()
            .insert(id.clone(), Arc::clone(&shared));
        info!(game_id = %id, "game registered");
        (id, shared)
    }

    /// Looks a game up by id.
    #[instrument(skip(self))]
    pub fn get(&self, id: &GameId) -> Option<SharedGame> {
        let games = self.games.lock().unwrap();
        let game = games.get(id).map(Arc::clone);
        if game.is_none() {
            debug!(game_id = %id, "game not found");
        }
        game
    }

    /// Registers a preconstructed game under its own id.
    ///
    /// [`GameRegistry::create`] coin-flips the opening seat; tests use
    /// this to install games with a known one.
    #[instrument(skip(self, game))]
    pub fn insert(&self, game: Game) -> SharedGame {
        let id = game.id().clone();
        let shared = Arc::new(Mutex::new(game));
        self.games
            .lock()
            .unwrap()
            .insert(id.clone(), Arc::clone(&shared));
        debug!(game_id = %id, "game inserted");
        shared
    }

    /// How many games are registered.
    pub fn len(&self) -> usize {
        self.games.lock().unwrap().len()
    }

    /// Whether no games are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapmark_core::Seat;

    #[test]
    fn test_create_then_get() {
        let registry = GameRegistry::new();
        let (id, _game) = registry.create("alice");
        assert!(registry.get(&id).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_unknown_id() {
        let registry = GameRegistry::new();
        assert!(registry.get(&GameId::generate()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_insert_preserves_game_state() {
        let registry = GameRegistry::new();
        let game = Game::with_starting_seat(GameId::generate(), "alice", Seat::Second);
        let id = game.id().clone();
        registry.insert(game);

        let shared = registry.get(&id).unwrap();
        assert_eq!(shared.lock().unwrap().starting_seat(), Seat::Second);
    }

    #[test]
    fn test_games_are_shared_not_copied() {
        let registry = GameRegistry::new();
        let (id, game) = registry.create("alice");
        game.lock().unwrap().join("bob").unwrap();

        let looked_up = registry.get(&id).unwrap();
        assert!(looked_up.lock().unwrap().second_player().is_some());
    }
}
