//! Race record and its attached player set.
//!
//! # Invariants
//! - A player appears at most once in `players` (keyed by player id).
//! - `no_players == players.len()` after every helper call and after every
//!   successful repository write.

use super::entity::{Entity, UNASSIGNED_ID};
use super::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub type RaceId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub engine_type: i64,
    /// Denormalized count of `players`, also persisted in `Race.NoPlayers`.
    pub no_players: u32,
    pub players: BTreeMap<PlayerId, Player>,
}

impl Race {
    /// Creates an unsaved race with no players.
    pub fn new(engine_type: i64) -> Self {
        Self {
            id: UNASSIGNED_ID,
            engine_type,
            no_players: 0,
            players: BTreeMap::new(),
        }
    }

    /// Attaches `player`, replacing any entry with the same id.
    ///
    /// Returns `false` when the player was already attached.
    pub fn attach_player(&mut self, player: Player) -> bool {
        let added = self.players.insert(player.id, player).is_none();
        self.sync_player_count();
        added
    }

    /// Detaches the player with `player_id`, returning it when present.
    pub fn detach_player(&mut self, player_id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&player_id);
        self.sync_player_count();
        removed
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.keys().copied()
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.players.contains_key(&player_id)
    }

    pub(crate) fn player_count(&self) -> u32 {
        u32::try_from(self.players.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn sync_player_count(&mut self) {
        self.no_players = self.player_count();
    }
}

impl Entity<RaceId> for Race {
    fn id(&self) -> RaceId {
        self.id
    }

    fn set_id(&mut self, id: RaceId) {
        self.id = id;
    }
}

impl Display for Race {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.players.values().map(|p| p.name.as_str()).collect();
        write!(
            f,
            "Race {{ id: {}, engine_type: {}, no_players: {}, players: [{}] }}",
            self.id,
            self.engine_type,
            self.no_players,
            names.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Race;
    use crate::model::player::Player;

    fn player(id: i64, name: &str) -> Player {
        let mut player = Player::new(name, "code", 1);
        player.id = id;
        player
    }

    #[test]
    fn attaching_same_player_twice_keeps_set_semantics() {
        let mut race = Race::new(2);
        assert!(race.attach_player(player(1, "Norris")));
        assert!(!race.attach_player(player(1, "Norris")));
        assert_eq!(race.no_players, 1);
        assert_eq!(race.player_ids().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn detach_updates_count() {
        let mut race = Race::new(2);
        race.attach_player(player(1, "Norris"));
        race.attach_player(player(2, "Piastri"));

        let removed = race.detach_player(1).unwrap();
        assert_eq!(removed.name, "Norris");
        assert!(race.detach_player(1).is_none());
        assert_eq!(race.no_players, 1);
        assert!(race.has_player(2));
    }

    #[test]
    fn serializes_with_players_keyed_by_id() {
        let mut race = Race::new(125);
        race.attach_player(player(7, "Norris"));

        let json = serde_json::to_value(&race).unwrap();
        assert_eq!(json["engine_type"], 125);
        assert_eq!(json["no_players"], 1);
        assert_eq!(json["players"]["7"]["name"], "Norris");

        let back: Race = serde_json::from_value(json).unwrap();
        assert_eq!(back, race);
    }
}
