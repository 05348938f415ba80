//! Collaborator stores: identity resolution and game persistence.
//!
//! The coordinator only ever talks to these traits. The in-memory
//! implementations back tests and the standalone binary; a database-backed
//! pair would slot in behind the same traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use rookery_core::{AuthToken, GameId, GameRecord};

/// A storage-layer failure.
#[derive(Debug, thiserror::Error)]
#[error("store error: {reason}")]
pub struct StoreError {
    /// What failed.
    pub reason: String,
}

impl StoreError {
    /// Build a store error from any displayable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Resolves auth tokens to usernames.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// The username behind `token`, or `None` for an unknown token.
    async fn resolve(&self, token: &AuthToken) -> Result<Option<String>, StoreError>;
}

/// Fetches and persists game records.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// The record for `id`, or `None` if no such game exists.
    async fn get(&self, id: GameId) -> Result<Option<GameRecord>, StoreError>;

    /// Persist `record`, replacing the stored version.
    async fn update(&self, record: GameRecord) -> Result<(), StoreError>;
}

/// In-memory identity store. Issues random tokens and resolves them.
#[derive(Default)]
pub struct MemoryIdentityStore {
    tokens: Mutex<HashMap<AuthToken, String>>,
}

impl MemoryIdentityStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `username`.
    pub fn issue(&self, username: impl Into<String>) -> AuthToken {
        let token = AuthToken::new(Uuid::new_v4().to_string());
        self.tokens.lock().insert(token.clone(), username.into());
        token
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn resolve(&self, token: &AuthToken) -> Result<Option<String>, StoreError> {
        Ok(self.tokens.lock().get(token).cloned())
    }
}

/// In-memory game store. Creates records with sequential ids.
#[derive(Default)]
pub struct MemoryGameStore {
    games: Mutex<HashMap<GameId, GameRecord>>,
    next_id: AtomicU64,
}

impl MemoryGameStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh game record with both seats open.
    pub fn create(&self, name: impl Into<String>) -> GameRecord {
        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let record = GameRecord::new(id, name);
        self.games.lock().insert(id, record.clone());
        record
    }

    /// Insert or replace a record directly. For seeding fixtures.
    pub fn insert(&self, record: GameRecord) {
        self.games.lock().insert(record.id, record);
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn get(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.games.lock().get(&id).cloned())
    }

    async fn update(&self, record: GameRecord) -> Result<(), StoreError> {
        let mut games = self.games.lock();
        if !games.contains_key(&record.id) {
            return Err(StoreError::new(format!("unknown game {}", record.id)));
        }
        games.insert(record.id, record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_tokens_resolve_and_strangers_do_not() {
        let store = MemoryIdentityStore::new();
        let token = store.issue("ada");

        assert_eq!(store.resolve(&token).await.unwrap().as_deref(), Some("ada"));
        assert_eq!(
            store.resolve(&AuthToken::new("made-up")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn created_games_get_distinct_ids() {
        let store = MemoryGameStore::new();
        let first = store.create("one");
        let second = store.create("two");
        assert_ne!(first.id, second.id);

        let fetched = store.get(first.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "one");
    }

    #[tokio::test]
    async fn update_round_trips_and_rejects_unknown_ids() {
        let store = MemoryGameStore::new();
        let mut record = store.create("g");
        record.white = Some("ada".into());
        store.update(record.clone()).await.unwrap();

        let fetched = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.white.as_deref(), Some("ada"));

        let stray = GameRecord::new(GameId(999), "stray");
        assert!(store.update(stray).await.is_err());
    }
}
