use super::Push;
use super::SocketHandle;
use crate::event::GameEvent;
use crate::play::Room;
use std::collections::HashMap;
use std::collections::HashSet;

/// Process-wide session index: rooms by code, with reverse lookups
/// from game id and player id, plus the attached sockets per room.
/// The runtime serializes every mutation behind one lock; nothing in
/// here synchronizes on its own.
#[derive(Default)]
pub struct Registry {
    rooms: HashMap<String, Room>,
    games: HashMap<String, String>,
    players: HashMap<String, String>,
    sockets: HashMap<String, SocketHandle>,
    attached: HashMap<String, HashSet<String>>,
}

impl Registry {
    /// A room code not currently in use.
    pub fn fresh_code(&self) -> String {
        loop {
            let code = crate::play::room_code();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    pub fn insert_room(&mut self, room: Room) {
        self.games.insert(room.game.id.clone(), room.code.clone());
        for player in &room.game.players {
            self.players.insert(player.id.clone(), room.code.clone());
        }
        self.rooms.insert(room.code.clone(), room);
    }

    /// Reindex a room's game after a reset swapped the Game out.
    pub fn reindex_game(&mut self, code: &str, old_game_id: &str) {
        self.games.remove(old_game_id);
        if let Some(room) = self.rooms.get(code) {
            self.games.insert(room.game.id.clone(), code.to_string());
        }
    }

    pub fn room(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn room_mut(&mut self, code: &str) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn code_by_game(&self, game_id: &str) -> Option<String> {
        self.games.get(game_id).cloned()
    }

    pub fn room_by_game(&self, game_id: &str) -> Option<&Room> {
        self.games.get(game_id).and_then(|code| self.rooms.get(code))
    }

    pub fn room_by_game_mut(&mut self, game_id: &str) -> Option<&mut Room> {
        let code = self.games.get(game_id)?.clone();
        self.rooms.get_mut(&code)
    }

    pub fn code_by_player(&self, player_id: &str) -> Option<String> {
        self.players.get(player_id).cloned()
    }

    /// Drop a room and everything hanging off it. Attached sockets are
    /// closed and their handles discarded.
    pub fn remove_room(&mut self, code: &str) -> Option<Room> {
        let room = self.rooms.remove(code)?;
        self.games.remove(&room.game.id);
        for player in &room.game.players {
            self.players.remove(&player.id);
        }
        for socket_id in self.attached.remove(code).unwrap_or_default() {
            if let Some(handle) = self.sockets.remove(&socket_id) {
                handle.outbox.close();
            }
        }
        Some(room)
    }

    /// Bind a socket to its room, superseding any previous socket the
    /// same player held. The newest connection always wins.
    pub fn attach(&mut self, handle: SocketHandle) -> Option<SocketHandle> {
        let room_code = handle.room.clone()?;
        let player_id = handle.player.clone()?;
        let prior = self
            .sockets
            .values()
            .find(|s| s.player.as_deref() == Some(player_id.as_str()) && s.id != handle.id)
            .map(|s| s.id.clone());
        let superseded = prior.and_then(|id| self.take_socket(&id));
        if let Some(old) = &superseded {
            old.outbox.close();
            log::info!("socket {} superseded by {}", old.id, handle.id);
        }
        if let Some(room) = self.rooms.get_mut(&room_code) {
            if let Some(player) = room.game.player_mut(&player_id) {
                player.connect(handle.id.clone());
            }
            room.touch();
        }
        self.attached
            .entry(room_code)
            .or_default()
            .insert(handle.id.clone());
        self.sockets.insert(handle.id.clone(), handle);
        superseded
    }

    /// Unbind a socket. Presence only drops if this socket is still the
    /// player's current one, so a supersede-then-detach of the old
    /// socket cannot clobber the new connection.
    pub fn detach(&mut self, socket_id: &str) -> Option<SocketHandle> {
        let handle = self.take_socket(socket_id)?;
        handle.outbox.close();
        if let Some((room_code, player_id)) = handle.room.as_ref().zip(handle.player.as_ref()) {
            if let Some(player) = self
                .rooms
                .get_mut(room_code)
                .and_then(|room| room.game.player_mut(player_id))
                .filter(|player| player.socket.as_deref() == Some(socket_id))
            {
                player.disconnect();
            }
        }
        Some(handle)
    }

    fn take_socket(&mut self, socket_id: &str) -> Option<SocketHandle> {
        let handle = self.sockets.remove(socket_id)?;
        if let Some(room_code) = &handle.room {
            if let Some(set) = self.attached.get_mut(room_code) {
                set.remove(socket_id);
                if set.is_empty() {
                    self.attached.remove(room_code);
                }
            }
        }
        Some(handle)
    }

    pub fn touch_socket(&mut self, socket_id: &str) {
        if let Some(handle) = self.sockets.get_mut(socket_id) {
            handle.touch();
        }
    }

    pub fn socket(&self, socket_id: &str) -> Option<&SocketHandle> {
        self.sockets.get(socket_id)
    }

    /// Fan one event out to every socket in a room, in place, in
    /// order. A subscriber that cannot take a terminal message is
    /// force-closed; everyone else still receives it.
    pub fn broadcast(&mut self, code: &str, event: &GameEvent) {
        let game_id = self.rooms.get(code).map(|room| room.game.id.clone());
        let envelope = event.envelope(Some(code), game_id.as_deref());
        let terminal = event.is_terminal();
        let mut doomed = Vec::new();
        for socket_id in self.attached.get(code).into_iter().flatten() {
            let Some(handle) = self.sockets.get(socket_id) else {
                continue;
            };
            match handle.outbox.push(envelope.clone(), terminal) {
                Push::Queued => {}
                Push::Shed => {
                    log::warn!("socket {} backpressure, shed a message", socket_id)
                }
                Push::Refused => doomed.push(socket_id.clone()),
            }
        }
        for socket_id in doomed {
            log::warn!("socket {} cannot take {}, closing", socket_id, event.kind());
            self.detach(&socket_id);
        }
    }

    /// Push straight to one socket, for resyncs and pongs.
    pub fn unicast(&self, socket_id: &str, event: &GameEvent) {
        if let Some(handle) = self.sockets.get(socket_id) {
            let room = handle.room.as_deref();
            let game_id = room
                .and_then(|code| self.rooms.get(code))
                .map(|room| room.game.id.clone());
            handle
                .outbox
                .push(event.envelope(room, game_id.as_deref()), event.is_terminal());
        }
    }

    pub fn room_codes(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }

    pub fn stale_sockets(&self, now: u64, threshold_ms: u64) -> Vec<String> {
        self.sockets
            .values()
            .filter(|handle| handle.stale(now, threshold_ms))
            .map(|handle| handle.id.clone())
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn socket_count(&self) -> usize {
        self.sockets.len()
    }

    /// Index consistency: every reverse lookup resolves, every
    /// attached socket exists. Exercised by tests and debug sweeps.
    pub fn coherent(&self) -> bool {
        self.players.iter().all(|(player_id, code)| {
            self.rooms
                .get(code)
                .is_some_and(|room| room.game.player(player_id).is_some())
        }) && self.games.iter().all(|(game_id, code)| {
            self.rooms
                .get(code)
                .is_some_and(|room| &room.game.id == game_id)
        }) && self.attached.values().flatten().all(|socket_id| {
            self.sockets.contains_key(socket_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Symbol;
    use crate::play::Game;
    use crate::play::Player;
    use std::time::Duration;

    fn seeded() -> (Registry, String, String, String) {
        let mut registry = Registry::default();
        let human = Player::human(Symbol::X);
        let human_id = human.id.clone();
        let mut game = Game::new(vec![human, Player::ai(Symbol::O)]);
        game.begin();
        let game_id = game.id.clone();
        let code = registry.fresh_code();
        registry.insert_room(Room::vs_ai(code.clone(), game, Duration::from_secs(1800)));
        (registry, code, game_id, human_id)
    }

    #[test]
    fn lookups_resolve_through_every_index() {
        let (registry, code, game_id, human_id) = seeded();
        assert!(registry.room(&code).is_some());
        assert_eq!(registry.code_by_game(&game_id).as_deref(), Some(code.as_str()));
        assert_eq!(registry.code_by_player(&human_id).as_deref(), Some(code.as_str()));
        assert!(registry.coherent());
    }

    #[test]
    fn fresh_codes_do_not_collide_with_live_rooms() {
        let (registry, code, _, _) = seeded();
        for _ in 0..64 {
            assert_ne!(registry.fresh_code(), code);
        }
    }

    #[test]
    fn attach_marks_presence_and_newest_socket_wins() {
        let (mut registry, code, _, human_id) = seeded();
        let first = SocketHandle::game(code.clone(), human_id.clone(), 8);
        let first_id = first.id.clone();
        assert!(registry.attach(first).is_none());
        let connected = |registry: &Registry| {
            registry
                .room(&code)
                .and_then(|room| room.game.player(&human_id).map(|p| (p.connected, p.socket.clone())))
                .expect("player")
        };
        assert_eq!(connected(&registry), (true, Some(first_id.clone())));

        // a concurrent attach with the same player id supersedes
        let second = SocketHandle::game(code.clone(), human_id.clone(), 8);
        let second_id = second.id.clone();
        let old = registry.attach(second).expect("superseded handle");
        assert_eq!(old.id, first_id);
        assert!(old.outbox.is_closed());
        assert_eq!(connected(&registry), (true, Some(second_id.clone())));

        // detaching the stale socket must not clobber the new presence
        registry.detach(&first_id);
        assert_eq!(connected(&registry), (true, Some(second_id.clone())));
        registry.detach(&second_id);
        assert_eq!(connected(&registry), (false, None));
        assert!(registry.coherent());
    }

    #[test]
    fn broadcast_reaches_every_attached_socket_in_order() {
        let (mut registry, code, _, human_id) = seeded();
        let a = SocketHandle::game(code.clone(), human_id.clone(), 8);
        let outbox_a = a.outbox.clone();
        registry.attach(a);
        registry.broadcast(&code, &GameEvent::Ping);
        registry.broadcast(&code, &GameEvent::Pong);
        assert_eq!(outbox_a.len(), 2);
    }

    #[test]
    fn refused_terminal_closes_the_socket() {
        let (mut registry, code, _, human_id) = seeded();
        let handle = SocketHandle::game(code.clone(), human_id.clone(), 1);
        let outbox = handle.outbox.clone();
        registry.attach(handle);
        // wall of terminal messages, then one more terminal
        registry.broadcast(&code, &GameEvent::Error { error: "one".into() });
        registry.broadcast(&code, &GameEvent::Error { error: "two".into() });
        assert!(outbox.is_closed());
        assert_eq!(registry.socket_count(), 0);
        assert!(registry.coherent());
    }

    #[test]
    fn remove_room_clears_every_index_and_closes_sockets() {
        let (mut registry, code, game_id, human_id) = seeded();
        let handle = SocketHandle::game(code.clone(), human_id.clone(), 8);
        let outbox = handle.outbox.clone();
        registry.attach(handle);
        let room = registry.remove_room(&code).expect("room");
        assert_eq!(room.code, code);
        assert!(registry.room(&code).is_none());
        assert!(registry.code_by_game(&game_id).is_none());
        assert!(registry.code_by_player(&human_id).is_none());
        assert!(outbox.is_closed());
        assert_eq!(registry.socket_count(), 0);
        assert!(registry.coherent());
    }
}
