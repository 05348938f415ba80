//! The game coordinator: command validation, state mutation, and fan-out.
//!
//! Every handler shares the same preamble — resolve the identity from the
//! auth token, fetch the game record — and every failure becomes a private
//! ERROR to the sender. Commands that read-modify-write a record (moves,
//! resignations, leaves) run under that game's lock, so one command fully
//! commits before the next begins.

use std::sync::Arc;

use tracing::{info, warn};

use rookery_core::{
    AuthToken, ClientCommand, Color, GameId, GameOutcome, GameRecord, Move, ServerMessage,
};

use crate::error::CoordinatorError;
use crate::locks::GameLocks;
use crate::session::{ClientHandle, SessionRegistry};
use crate::store::{GameStore, IdentityStore};

/// Routes client commands into game state and broadcasts the results.
pub struct Coordinator {
    identities: Arc<dyn IdentityStore>,
    games: Arc<dyn GameStore>,
    sessions: SessionRegistry,
    locks: GameLocks,
}

impl Coordinator {
    /// Wire a coordinator to its collaborators.
    #[must_use]
    pub fn new(identities: Arc<dyn IdentityStore>, games: Arc<dyn GameStore>) -> Self {
        Self {
            identities,
            games,
            sessions: SessionRegistry::new(),
            locks: GameLocks::new(),
        }
    }

    /// The session registry, for inspection in tests.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Handle one command from `conn`. Failures never propagate past here;
    /// they are answered with a private ERROR message.
    pub async fn handle_command(&self, conn: &ClientHandle, command: ClientCommand) {
        let result = match command {
            ClientCommand::JoinPlayer {
                auth_token,
                game_id,
                player_color,
            } => {
                self.join_player(conn, &auth_token, game_id, player_color)
                    .await
            }
            ClientCommand::JoinObserver {
                auth_token,
                game_id,
            } => self.join_observer(conn, &auth_token, game_id).await,
            ClientCommand::MakeMove {
                auth_token,
                game_id,
                mv,
            } => self.make_move(conn, &auth_token, game_id, mv).await,
            ClientCommand::Resign {
                auth_token,
                game_id,
            } => self.resign(conn, &auth_token, game_id).await,
            ClientCommand::Leave {
                auth_token,
                game_id,
            } => self.leave(conn, &auth_token, game_id).await,
        };

        if let Err(err) = result {
            conn.send(ServerMessage::error(err.to_string()));
        }
    }

    /// A transport-level close or error: forget the connection everywhere.
    pub fn handle_disconnect(&self, conn: &ClientHandle) {
        self.sessions.drop_all(conn.id());
        info!(conn = %conn.id(), "connection dropped from all games");
    }

    /// Shared preamble: token → username, game id → record.
    async fn authenticate(
        &self,
        token: &AuthToken,
        game_id: GameId,
    ) -> Result<(String, GameRecord), CoordinatorError> {
        let username = self
            .identities
            .resolve(token)
            .await
            .map_err(|err| {
                warn!(%err, "identity store failure");
                CoordinatorError::Unauthorized
            })?
            .ok_or(CoordinatorError::Unauthorized)?;

        let record = self
            .games
            .get(game_id)
            .await
            .map_err(|err| {
                warn!(%err, %game_id, "game store failure");
                CoordinatorError::PersistenceFailure
            })?
            .ok_or(CoordinatorError::GameNotFound)?;

        Ok((username, record))
    }

    async fn persist(&self, record: &GameRecord) -> Result<(), CoordinatorError> {
        self.games.update(record.clone()).await.map_err(|err| {
            warn!(%err, game_id = %record.id, "failed to persist game");
            CoordinatorError::PersistenceFailure
        })
    }

    /// JOIN_PLAYER: the seat must already be assigned to this identity; the
    /// lobby does the assigning, not this handler.
    async fn join_player(
        &self,
        conn: &ClientHandle,
        token: &AuthToken,
        game_id: GameId,
        color: Color,
    ) -> Result<(), CoordinatorError> {
        let (username, record) = self.authenticate(token, game_id).await?;

        if record.seat(color) != Some(username.as_str()) {
            return Err(CoordinatorError::SeatTaken);
        }

        self.sessions.join(game_id, token.clone(), conn.clone());
        conn.send(ServerMessage::load_game(record.game));
        self.sessions.broadcast(
            game_id,
            &ServerMessage::notification(format!(
                "{username} joined the game as {color} player"
            )),
            Some(conn.id()),
        );
        info!(%game_id, %username, %color, "player joined");
        Ok(())
    }

    /// JOIN_OBSERVER: any authenticated identity may watch.
    async fn join_observer(
        &self,
        conn: &ClientHandle,
        token: &AuthToken,
        game_id: GameId,
    ) -> Result<(), CoordinatorError> {
        let (username, record) = self.authenticate(token, game_id).await?;

        self.sessions.join(game_id, token.clone(), conn.clone());
        conn.send(ServerMessage::load_game(record.game));
        self.sessions.broadcast(
            game_id,
            &ServerMessage::notification(format!("{username} joined the game as an observer")),
            Some(conn.id()),
        );
        info!(%game_id, %username, "observer joined");
        Ok(())
    }

    /// MAKE_MOVE: validate, mutate, persist, then fan out the new state and
    /// any check/checkmate/stalemate notification.
    async fn make_move(
        &self,
        conn: &ClientHandle,
        token: &AuthToken,
        game_id: GameId,
        mv: Move,
    ) -> Result<(), CoordinatorError> {
        let _guard = self.locks.acquire(game_id).await;
        let (username, mut record) = self.authenticate(token, game_id).await?;

        if record.game.is_over() {
            return Err(CoordinatorError::AlreadyOver);
        }
        if record.game.board().piece_at(mv.start).is_none() {
            return Err(CoordinatorError::NoPieceAtSquare);
        }
        let color = record
            .seat_of(&username)
            .ok_or(CoordinatorError::NotAParticipant)?;
        if color != record.game.turn() {
            return Err(CoordinatorError::OutOfTurn);
        }

        record.game.make_move(mv)?;

        // Not committed until the store accepts it; on failure nothing is
        // broadcast and the mover sees the persistence error.
        self.persist(&record).await?;

        self.sessions
            .broadcast(game_id, &ServerMessage::load_game(record.game.clone()), None);

        let landed = record
            .game
            .board()
            .piece_at(mv.end)
            .map_or_else(|| "piece".to_string(), |piece| piece.kind.to_string());
        self.sessions.broadcast(
            game_id,
            &ServerMessage::notification(format!(
                "{username} moved {landed} from {} to {}",
                mv.start, mv.end
            )),
            Some(conn.id()),
        );
        info!(%game_id, %username, start = %mv.start, end = %mv.end, "move made");

        self.announce_terminal_state(game_id, &mut record).await
    }

    /// After a committed move: checkmate ends the game, otherwise bare
    /// stalemate ends the game, otherwise a check is merely announced. The
    /// checks target the new side to move.
    async fn announce_terminal_state(
        &self,
        game_id: GameId,
        record: &mut GameRecord,
    ) -> Result<(), CoordinatorError> {
        let next = record.game.turn();
        if record.game.is_in_checkmate(next) {
            self.sessions.broadcast(
                game_id,
                &ServerMessage::notification(format!(
                    "{next} player is in checkmate. {} player has won!",
                    next.opposite()
                )),
                None,
            );
            record.game.mark_over(GameOutcome::Checkmate);
            self.persist(record).await?;
            info!(%game_id, loser = %next, "checkmate");
        } else if record.game.is_in_stalemate(next) {
            self.sessions.broadcast(
                game_id,
                &ServerMessage::notification(format!(
                    "{next} player has no available moves. Stalemate. Game over."
                )),
                None,
            );
            record.game.mark_over(GameOutcome::Stalemate);
            self.persist(record).await?;
            info!(%game_id, "stalemate");
        } else if record.game.is_in_check(next) {
            self.sessions.broadcast(
                game_id,
                &ServerMessage::notification(format!("{next} player is in check.")),
                None,
            );
        }
        Ok(())
    }

    /// RESIGN: players only, once, and the result is persisted before anyone
    /// hears about it.
    async fn resign(
        &self,
        conn: &ClientHandle,
        token: &AuthToken,
        game_id: GameId,
    ) -> Result<(), CoordinatorError> {
        let _guard = self.locks.acquire(game_id).await;
        let (username, mut record) = self.authenticate(token, game_id).await?;

        record
            .seat_of(&username)
            .ok_or(CoordinatorError::NotAParticipant)?;
        record
            .game
            .resign()
            .map_err(|_| CoordinatorError::AlreadyOver)?;

        self.persist(&record).await?;

        conn.send(ServerMessage::notification(
            "You have resigned. Game is over.",
        ));
        self.sessions.broadcast(
            game_id,
            &ServerMessage::notification(format!("{username} has resigned. Game is over.")),
            Some(conn.id()),
        );
        info!(%game_id, %username, "resignation");
        Ok(())
    }

    /// LEAVE: vacate a held seat (the game continues), drop the session, and
    /// tell the room.
    async fn leave(
        &self,
        conn: &ClientHandle,
        token: &AuthToken,
        game_id: GameId,
    ) -> Result<(), CoordinatorError> {
        let _guard = self.locks.acquire(game_id).await;
        let (username, mut record) = self.authenticate(token, game_id).await?;

        if let Some(color) = record.seat_of(&username) {
            record.clear_seat(color);
            self.persist(&record).await?;
        }

        self.sessions.leave(game_id, token);
        self.sessions.broadcast(
            game_id,
            &ServerMessage::notification(format!("{username} left the game")),
            Some(conn.id()),
        );
        info!(%game_id, %username, "left game");
        Ok(())
    }
}
