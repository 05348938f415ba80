//! Live-connection handles and the per-game session registry.
//!
//! The registry is the one structure shared by every connection task, so all
//! mutation and iteration happens under its single internal lock. Handles are
//! unbounded senders: pushing a message never blocks, and a send to a dead
//! connection is simply skipped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use rookery_core::{AuthToken, GameId, ServerMessage};

/// Identifies one live connection for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocate the next connection id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A send-capable handle to one live connection.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ClientHandle {
    /// Wrap a connection's outbound channel.
    #[must_use]
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { id, tx }
    }

    /// A handle plus the receiving end of its channel, for tests and local
    /// wiring.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(ConnectionId::next(), tx), rx)
    }

    /// This connection's id.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Push a message toward the client. Returns `false` if the connection's
    /// writer has gone away; callers treat that as a skipped delivery.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}

/// Per-game broadcast groups, keyed by game id and then by the authenticated
/// token presented at join time.
#[derive(Default)]
pub struct SessionRegistry {
    games: Mutex<HashMap<GameId, HashMap<AuthToken, ClientHandle>>>,
}

impl SessionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handle` to a game's broadcast group. Joining again with the same
    /// token replaces the previous handle.
    pub fn join(&self, game_id: GameId, token: AuthToken, handle: ClientHandle) {
        self.games
            .lock()
            .entry(game_id)
            .or_default()
            .insert(token, handle);
    }

    /// Remove one identity from a game's broadcast group.
    pub fn leave(&self, game_id: GameId, token: &AuthToken) {
        let mut games = self.games.lock();
        if let Some(members) = games.get_mut(&game_id) {
            members.remove(token);
            if members.is_empty() {
                games.remove(&game_id);
            }
        }
    }

    /// Remove a closed connection from every game it joined.
    pub fn drop_all(&self, conn: ConnectionId) {
        let mut games = self.games.lock();
        for members in games.values_mut() {
            members.retain(|_, handle| handle.id() != conn);
        }
        games.retain(|_, members| !members.is_empty());
    }

    /// Send to every member of a game except `exclude`, if given. Best-effort:
    /// a dead handle is skipped and the rest still receive the message.
    pub fn broadcast(&self, game_id: GameId, message: &ServerMessage, exclude: Option<ConnectionId>) {
        let games = self.games.lock();
        let Some(members) = games.get(&game_id) else {
            return;
        };
        for handle in members.values() {
            if Some(handle.id()) == exclude {
                continue;
            }
            if !handle.send(message.clone()) {
                tracing::debug!(%game_id, conn = %handle.id(), "skipping send to closed connection");
            }
        }
    }

    /// Number of live members in a game's broadcast group.
    #[must_use]
    pub fn member_count(&self, game_id: GameId) -> usize {
        self.games
            .lock()
            .get(&game_id)
            .map_or(0, HashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(s: &str) -> AuthToken {
        AuthToken::new(s)
    }

    #[test]
    fn join_is_idempotent_per_token() {
        let registry = SessionRegistry::new();
        let (first, mut first_rx) = ClientHandle::channel();
        let (second, mut second_rx) = ClientHandle::channel();

        registry.join(GameId(1), token("t"), first);
        registry.join(GameId(1), token("t"), second);
        assert_eq!(registry.member_count(GameId(1)), 1);

        registry.broadcast(GameId(1), &ServerMessage::notification("hi"), None);
        assert!(first_rx.try_recv().is_err(), "replaced handle gets nothing");
        assert!(second_rx.try_recv().is_ok());
    }

    #[test]
    fn broadcast_excludes_one_connection() {
        let registry = SessionRegistry::new();
        let (mover, mut mover_rx) = ClientHandle::channel();
        let (watcher, mut watcher_rx) = ClientHandle::channel();
        registry.join(GameId(1), token("a"), mover.clone());
        registry.join(GameId(1), token("b"), watcher);

        registry.broadcast(
            GameId(1),
            &ServerMessage::notification("moved"),
            Some(mover.id()),
        );

        assert!(mover_rx.try_recv().is_err());
        assert!(watcher_rx.try_recv().is_ok());
    }

    #[test]
    fn broadcast_survives_dead_handles() {
        let registry = SessionRegistry::new();
        let (dead, dead_rx) = ClientHandle::channel();
        drop(dead_rx);
        let (live, mut live_rx) = ClientHandle::channel();
        registry.join(GameId(1), token("dead"), dead);
        registry.join(GameId(1), token("live"), live);

        registry.broadcast(GameId(1), &ServerMessage::notification("still here"), None);
        assert!(live_rx.try_recv().is_ok());
    }

    #[test]
    fn drop_all_removes_the_connection_everywhere() {
        let registry = SessionRegistry::new();
        let (handle, _rx) = ClientHandle::channel();
        registry.join(GameId(1), token("t1"), handle.clone());
        registry.join(GameId(2), token("t2"), handle.clone());

        registry.drop_all(handle.id());
        assert_eq!(registry.member_count(GameId(1)), 0);
        assert_eq!(registry.member_count(GameId(2)), 0);
    }

    #[test]
    fn leave_only_affects_one_game() {
        let registry = SessionRegistry::new();
        let (handle, _rx) = ClientHandle::channel();
        registry.join(GameId(1), token("t"), handle.clone());
        registry.join(GameId(2), token("t"), handle);

        registry.leave(GameId(1), &token("t"));
        assert_eq!(registry.member_count(GameId(1)), 0);
        assert_eq!(registry.member_count(GameId(2)), 1);
    }

    #[tokio::test]
    async fn concurrent_joins_and_broadcasts_do_not_lose_members() {
        use std::sync::Arc;

        let registry = Arc::new(SessionRegistry::new());
        let mut receivers = Vec::new();
        let mut tasks = Vec::new();
        for i in 0..32 {
            let (handle, rx) = ClientHandle::channel();
            receivers.push(rx);
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.join(GameId(9), token(&format!("t{i}")), handle);
                registry.broadcast(GameId(9), &ServerMessage::notification("tick"), None);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(registry.member_count(GameId(9)), 32);
    }
}
