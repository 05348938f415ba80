//! Per-game command serialization.
//!
//! One move must fully commit (validate, mutate, persist, broadcast) before a
//! concurrent command for the same game starts mutating state. Each game gets
//! a lazily-created async mutex; locks for distinct games never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use rookery_core::GameId;

/// Lazily-populated table of per-game locks.
#[derive(Default)]
pub struct GameLocks {
    locks: DashMap<GameId, Arc<Mutex<()>>>,
}

impl GameLocks {
    /// An empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `game_id`, creating it on first use. The guard
    /// is held for the rest of the command's processing.
    pub async fn acquire(&self, game_id: GameId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(game_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
