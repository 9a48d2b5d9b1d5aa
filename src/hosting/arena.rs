use crate::board::Move;
use crate::board::Symbol;
use crate::config::Config;
use crate::error::ApiError;
use crate::event::GameEvent;
use crate::event::Outcome;
use crate::play::Game;
use crate::play::Player;
use crate::play::PlayerKind;
use crate::play::Room;
use crate::play::Snapshot;
use crate::play::assign_symbols_vs_ai;
use crate::registry::Outbox;
use crate::registry::Registry;
use crate::registry::SocketHandle;
use crate::search::Opponent;
use serde_json::Value;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// The runtime: owns the session registry and the AI seam, and every
/// game operation is a method on it. Constructed once at startup and
/// shared behind an Arc; the registry lock serializes all mutation.
pub struct Arena {
    pub config: Config,
    registry: RwLock<Registry>,
    opponent: Arc<dyn Opponent>,
    started: Instant,
}

/// What quick-start hands back to the HTTP layer. The socket endpoint
/// is completed by the handler, which knows the request host.
#[derive(Debug)]
pub struct QuickStart {
    pub game_id: String,
    pub room_id: String,
    pub player_id: String,
    pub player_symbol: Symbol,
    pub ai_symbol: Symbol,
    pub state: Snapshot,
}

#[derive(Debug)]
pub struct MoveReply {
    pub mv: Move,
    pub state: Snapshot,
}

impl Arena {
    pub fn new(config: Config, opponent: Arc<dyn Opponent>) -> Self {
        Self {
            config,
            registry: RwLock::new(Registry::default()),
            opponent,
            started: Instant::now(),
        }
    }

    /// Create a vs-AI room: seats, symbols, fresh game, registry entry.
    /// If the human took the second symbol the AI opens immediately.
    pub async fn quick_start(self: &Arc<Self>, preference: Option<Symbol>) -> Result<QuickStart, ApiError> {
        let (human_symbol, ai_symbol) = assign_symbols_vs_ai(preference);
        let human = Player::human(human_symbol);
        let player_id = human.id.clone();
        let mut game = Game::new(vec![human, Player::ai(ai_symbol)]);
        game.begin();
        let game_id = game.id.clone();
        let mut registry = self.registry.write().await;
        let code = registry.fresh_code();
        let room = Room::vs_ai(code.clone(), game, self.config.room_ttl);
        let state = room.game.snapshot();
        let ai_opens = room.game.is_ai_turn();
        registry.insert_room(room);
        registry.broadcast(&code, &GameEvent::GameCreated { state: state.clone() });
        drop(registry);
        log::info!("opened room {} game {}", code, game_id);
        if ai_opens {
            self.spawn_ai_turn(game_id.clone());
        }
        Ok(QuickStart {
            game_id,
            room_id: code,
            player_id,
            player_symbol: human_symbol,
            ai_symbol,
            state,
        })
    }

    /// Apply one human move. Broadcasts move_processing and move_made,
    /// settles terminal outcomes, and hands the turn to the AI task
    /// when the opponent is a machine. Invalid moves reply with their
    /// violation and broadcast nothing.
    pub async fn make_move(
        self: &Arc<Self>,
        game_id: &str,
        row: i32,
        col: i32,
        player_id: &str,
    ) -> Result<MoveReply, ApiError> {
        let mut registry = self.registry.write().await;
        let code = registry
            .code_by_game(game_id)
            .ok_or_else(|| ApiError::NotFound("game".into()))?;
        let room = registry
            .room_mut(&code)
            .ok_or_else(|| ApiError::NotFound("room".into()))?;
        let symbol = {
            let player = room
                .game
                .player(player_id)
                .ok_or_else(|| ApiError::NotFound("player".into()))?;
            if player.kind != PlayerKind::Human {
                return Err(ApiError::BadRequest("only human seats move over HTTP".into()));
            }
            player.symbol
        };
        let mv = room.game.try_move(row, col, symbol)?;
        if let Some(player) = room.game.player_mut(player_id) {
            player.touch();
        }
        room.touch();
        let state = room.game.snapshot();
        let outcome = Self::settle(&mut *room);
        let ai_next = room.game.is_ai_turn();
        registry.broadcast(&code, &GameEvent::MoveProcessing { player_id: player_id.into() });
        registry.broadcast(&code, &GameEvent::MoveMade { mv, state: state.clone() });
        if let Some(outcome) = outcome {
            registry.broadcast(&code, &GameEvent::GameOver(Box::new(outcome)));
        }
        drop(registry);
        if ai_next {
            self.spawn_ai_turn(game_id.to_string());
        }
        Ok(MoveReply { mv, state })
    }

    /// Read-only snapshot. A playerId, when supplied, must belong to
    /// the game.
    pub async fn state(&self, game_id: &str, player_id: Option<&str>) -> Result<Snapshot, ApiError> {
        let registry = self.registry.read().await;
        let room = registry
            .room_by_game(game_id)
            .ok_or_else(|| ApiError::NotFound("game".into()))?;
        if let Some(id) = player_id {
            room.game
                .player(id)
                .ok_or_else(|| ApiError::NotFound("player".into()))?;
        }
        Ok(room.game.snapshot())
    }

    /// Swap in a fresh game, keeping seats and streak counters.
    pub async fn reset(self: &Arc<Self>, game_id: &str) -> Result<Snapshot, ApiError> {
        let mut registry = self.registry.write().await;
        let code = registry
            .code_by_game(game_id)
            .ok_or_else(|| ApiError::NotFound("game".into()))?;
        let room = registry
            .room_mut(&code)
            .ok_or_else(|| ApiError::NotFound("room".into()))?;
        let old_game_id = room.game.id.clone();
        room.reset_game();
        let state = room.game.snapshot();
        let new_game_id = room.game.id.clone();
        let ai_opens = room.game.is_ai_turn();
        registry.reindex_game(&code, &old_game_id);
        registry.broadcast(&code, &GameEvent::GameReset { state: state.clone() });
        drop(registry);
        log::info!("reset room {} to game {}", code, new_game_id);
        if ai_opens {
            self.spawn_ai_turn(new_game_id);
        }
        Ok(state)
    }

    /// Explicit departure, from HTTP DELETE or the socket leave
    /// message: mark the player disconnected; once no connected human
    /// remains the game is abandoned and the room condemned.
    pub async fn leave(&self, game_id: &str, player_id: &str) -> Result<(), ApiError> {
        let mut registry = self.registry.write().await;
        let code = registry
            .code_by_game(game_id)
            .ok_or_else(|| ApiError::NotFound("game".into()))?;
        Self::depart(&mut registry, &code, player_id)
    }

    fn depart(registry: &mut Registry, code: &str, player_id: &str) -> Result<(), ApiError> {
        let room = registry
            .room_mut(code)
            .ok_or_else(|| ApiError::NotFound("room".into()))?;
        room.game
            .player_mut(player_id)
            .ok_or_else(|| ApiError::NotFound("player".into()))?
            .disconnect();
        room.touch();
        let deserted = room.game.connected_humans() == 0;
        if deserted {
            room.game.abandon();
            room.condemn();
        }
        registry.broadcast(code, &GameEvent::PlayerLeft { player_id: player_id.into() });
        if deserted {
            log::info!("room {} deserted, condemned", code);
        }
        Ok(())
    }

    fn spawn_ai_turn(self: &Arc<Self>, game_id: String) {
        let arena = self.clone();
        tokio::spawn(async move { arena.ai_turn(game_id).await });
    }

    /// The machine's half of a turn. Thinking is announced after a
    /// pacing delay, the search runs on a board snapshot off the lock,
    /// and the reply is revalidated before it lands, so a reset or
    /// reap mid-search can never half-apply a move.
    async fn ai_turn(self: Arc<Self>, game_id: String) {
        tokio::time::sleep(self.config.pacing).await;
        let mut registry = self.registry.write().await;
        let Some(code) = registry.code_by_game(&game_id) else {
            return;
        };
        let Some(room) = registry.room_mut(&code) else {
            return;
        };
        if room.game.id != game_id || !room.game.is_ai_turn() {
            return;
        }
        let symbol = room.game.turn;
        let board = room.game.board;
        let number = room.game.moves.len() as u32 + 1;
        registry.broadcast(&code, &GameEvent::AiThinking { symbol });
        drop(registry);

        match self.opponent.decide(board, symbol, number).await {
            Ok(decision) => {
                let mut registry = self.registry.write().await;
                let Some(room) = registry.room_mut(&code) else {
                    return;
                };
                if room.game.id != game_id || !room.game.is_ai_turn() {
                    return;
                }
                let landed = room.game.try_move(
                    decision.position.row as i32,
                    decision.position.col as i32,
                    symbol,
                );
                match landed {
                    Ok(mv) => {
                        room.touch();
                        let state = room.game.snapshot();
                        let outcome = Self::settle(room);
                        registry.broadcast(
                            &code,
                            &GameEvent::AiMove { mv, decision, state },
                        );
                        if let Some(outcome) = outcome {
                            registry.broadcast(&code, &GameEvent::GameOver(Box::new(outcome)));
                        }
                    }
                    Err(violation) => {
                        Self::fail(&mut registry, &code, format!("ai reply rejected: {}", violation));
                    }
                }
            }
            Err(e) => {
                let mut registry = self.registry.write().await;
                Self::fail(&mut registry, &code, format!("ai search failed: {:#}", e));
            }
        }
    }

    /// Total AI failure: abandon the game, tell the room, hand the
    /// carcass to the reaper.
    fn fail(registry: &mut Registry, code: &str, detail: String) {
        log::error!("room {}: {}", code, detail);
        if let Some(room) = registry.room_mut(code) {
            room.game.abandon();
            room.condemn();
        }
        registry.broadcast(code, &GameEvent::Error { error: "ai opponent failed".into() });
    }

    /// Terminal bookkeeping shared by both move paths: fold the
    /// outcome into the streak counters and shape the game_over
    /// payload.
    fn settle(room: &mut Room) -> Option<Outcome> {
        use crate::play::Status;
        let winner = match room.game.status {
            Status::Won => room.game.winner,
            Status::Drawn => None,
            _ => return None,
        };
        let milestone = room.record_outcome();
        let final_message = match winner {
            Some(symbol) => match room.game.human().map(|p| p.symbol) {
                Some(human) if human == symbol => "You win!".to_string(),
                _ => format!("{} wins!", symbol),
            },
            None => "It's a draw!".to_string(),
        };
        Some(Outcome {
            winner,
            line: room.game.line,
            final_message,
            stats: room.stats,
            milestone,
        })
    }
}

// socket lifecycle, called by the bridge
impl Arena {
    /// Bind a new socket to a room seat. The previous socket for the
    /// same player, if any, is superseded; the fresh socket gets a
    /// full state resync and the room hears player_joined.
    pub async fn attach_socket(
        &self,
        room_code: &str,
        player_id: &str,
    ) -> Result<(String, Arc<Outbox>), ApiError> {
        let mut registry = self.registry.write().await;
        let room = registry
            .room(room_code)
            .ok_or_else(|| ApiError::NotFound("room".into()))?;
        let player = room
            .game
            .player(player_id)
            .ok_or_else(|| ApiError::NotFound("player".into()))?;
        if player.kind != PlayerKind::Human {
            return Err(ApiError::BadRequest("ai seats do not hold sockets".into()));
        }
        let symbol = player.symbol;
        let state = room.game.snapshot();
        let handle = SocketHandle::game(
            room_code.to_string(),
            player_id.to_string(),
            self.config.outbox_capacity,
        );
        let socket_id = handle.id.clone();
        let outbox = handle.outbox.clone();
        registry.attach(handle);
        registry.unicast(&socket_id, &GameEvent::GameStateUpdate { state });
        registry.broadcast(
            room_code,
            &GameEvent::PlayerJoined { player_id: player_id.into(), symbol },
        );
        log::info!("socket {} joined room {}", socket_id, room_code);
        Ok((socket_id, outbox))
    }

    /// Socket gone. Presence drops unless a newer socket already took
    /// over; the room itself survives until the reaper or an explicit
    /// leave condemns it.
    pub async fn detach_socket(&self, socket_id: &str) {
        let mut registry = self.registry.write().await;
        let Some(handle) = registry.detach(socket_id) else {
            return;
        };
        if let Some((code, player_id)) = handle.room.as_deref().zip(handle.player.as_deref()) {
            let current = registry
                .room(code)
                .and_then(|room| room.game.player(player_id))
                .is_some_and(|player| !player.connected);
            if current {
                registry.broadcast(code, &GameEvent::PlayerLeft { player_id: player_id.into() });
            }
        }
        log::info!("socket {} detached", socket_id);
    }

    pub async fn touch_socket(&self, socket_id: &str) {
        let mut registry = self.registry.write().await;
        registry.touch_socket(socket_id);
        let player = registry
            .socket(socket_id)
            .and_then(|handle| handle.room.as_deref().zip(handle.player.as_deref()))
            .map(|(code, player)| (code.to_string(), player.to_string()));
        if let Some((code, player_id)) = player {
            if let Some(player) = registry
                .room_mut(&code)
                .and_then(|room| room.game.player_mut(&player_id))
            {
                player.touch();
            }
        }
    }

    /// Inbound socket frames: keepalive and the leave message. Unknown
    /// types are ignored, not errors.
    pub async fn inbound(&self, socket_id: &str, text: &str) {
        self.touch_socket(socket_id).await;
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            log::debug!("socket {} sent non-json frame", socket_id);
            return;
        };
        match value["type"].as_str() {
            Some("ping") => {
                let registry = self.registry.read().await;
                registry.unicast(socket_id, &GameEvent::Pong);
            }
            Some("leave_room") => {
                let mut registry = self.registry.write().await;
                let bound = registry
                    .socket(socket_id)
                    .and_then(|handle| handle.room.as_deref().zip(handle.player.as_deref()))
                    .map(|(code, player)| (code.to_string(), player.to_string()));
                if let Some((code, player_id)) = bound {
                    Self::depart(&mut registry, &code, &player_id).ok();
                }
            }
            _ => log::debug!("socket {} sent unhandled frame", socket_id),
        }
    }
}

// periodic reclamation and the status surface
impl Arena {
    /// One reaper sweep: stale sockets, condemned and deserted rooms,
    /// then the transposition cache.
    pub async fn reap(&self) {
        let now = crate::now_ms();
        let stale_ms = 2 * self.config.heartbeat.as_millis() as u64;
        let mut registry = self.registry.write().await;
        for socket_id in registry.stale_sockets(now, stale_ms) {
            log::info!("closing stale socket {}", socket_id);
            registry.detach(&socket_id);
        }
        for code in registry.room_codes() {
            let doomed = registry
                .room(&code)
                .is_some_and(|room| room.should_cleanup(now, self.config.linger));
            if doomed {
                registry.broadcast(
                    &code,
                    &GameEvent::RoomClosed { reason: "room reaped after inactivity".into() },
                );
                registry.remove_room(&code);
                log::info!("reaped room {}", code);
            }
        }
        drop(registry);
        self.opponent.trim();
    }

    pub async fn status(&self) -> Value {
        let registry = self.registry.read().await;
        json!({
            "rooms": registry.room_count(),
            "players": registry.player_count(),
            "sockets": registry.socket_count(),
            "aiCacheSize": self.opponent.cached(),
            "uptimeSecs": self.started.elapsed().as_secs(),
        })
    }

    #[cfg(test)]
    pub async fn with_registry<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        let mut registry = self.registry.write().await;
        f(&mut registry)
    }
}
