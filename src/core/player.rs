//! Player identification, actors and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe player identifier supporting 1-255 players.
//!
//! ## Actor
//!
//! Who moves at a state: a single player, chance, all players at once
//! (simultaneous node), or nobody (terminal).
//!
//! ## PlayerMap
//!
//! Per-player data storage backed by `Vec` for O(1) access.
//! Supports iteration and indexing by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Player identifier supporting 1-255 players.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    ///
    /// ```
    /// use rust_efg::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(players.len(), 3);
    /// assert_eq!(players[0], PlayerId::new(0));
    /// assert_eq!(players[2], PlayerId::new(2));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// The other player of a two-player game.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// The entity to move at a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// A single player decides.
    Player(PlayerId),
    /// An outcome is drawn from a fixed distribution.
    Chance,
    /// Every player picks an action at once.
    Simultaneous,
    /// The game is over.
    Terminal,
}

impl Actor {
    /// The deciding player, if a single player is to move.
    #[must_use]
    pub const fn player(self) -> Option<PlayerId> {
        match self {
            Actor::Player(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_chance(self) -> bool {
        matches!(self, Actor::Chance)
    }

    #[must_use]
    pub const fn is_simultaneous(self) -> bool {
        matches!(self, Actor::Simultaneous)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Actor::Terminal)
    }
}

impl From<PlayerId> for Actor {
    fn from(player: PlayerId) -> Self {
        Actor::Player(player)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Player(p) => write!(f, "{}", p.0),
            Actor::Chance => write!(f, "chance"),
            Actor::Simultaneous => write!(f, "simultaneous"),
            Actor::Terminal => write!(f, "terminal"),
        }
    }
}

/// Per-player data storage with O(1) access.
///
/// Backed by a `Vec<T>` with one entry per player.
///
/// ## Example
///
/// ```
/// use rust_efg::core::{PlayerId, PlayerMap};
///
/// let mut choices: PlayerMap<Option<u32>> = PlayerMap::with_default(3);
/// choices[PlayerId::new(1)] = Some(4);
///
/// assert_eq!(choices[PlayerId::new(0)], None);
/// assert_eq!(choices[PlayerId::new(1)], Some(4));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over the stored values in player order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);

        assert_eq!(p0.index(), 0);
        assert_eq!(p1.index(), 1);
        assert_eq!(p0.opponent(), p1);
        assert_eq!(p1.opponent(), p0);
        assert_eq!(format!("{}", p0), "Player 0");
    }

    #[test]
    fn test_player_id_all() {
        let players: Vec<_> = PlayerId::all(4).collect();
        assert_eq!(players.len(), 4);
        assert_eq!(players[0], PlayerId::new(0));
        assert_eq!(players[3], PlayerId::new(3));
    }

    #[test]
    fn test_actor_queries() {
        let actor = Actor::from(PlayerId::new(1));
        assert_eq!(actor.player(), Some(PlayerId::new(1)));
        assert!(!actor.is_chance());

        assert_eq!(Actor::Chance.player(), None);
        assert!(Actor::Chance.is_chance());
        assert!(Actor::Simultaneous.is_simultaneous());
        assert!(Actor::Terminal.is_terminal());
    }

    #[test]
    fn test_actor_display() {
        assert_eq!(Actor::Player(PlayerId::new(2)).to_string(), "2");
        assert_eq!(Actor::Chance.to_string(), "chance");
    }

    #[test]
    fn test_player_map_new() {
        let map: PlayerMap<i32> = PlayerMap::new(4, |p| p.index() as i32 * 10);

        assert_eq!(map[PlayerId::new(0)], 0);
        assert_eq!(map[PlayerId::new(3)], 30);
    }

    #[test]
    fn test_player_map_mutation() {
        let mut map: PlayerMap<i32> = PlayerMap::with_value(2, 0);

        map[PlayerId::new(0)] = 10;
        map[PlayerId::new(1)] = 20;

        assert_eq!(map[PlayerId::new(0)], 10);
        assert_eq!(map[PlayerId::new(1)], 20);
    }

    #[test]
    fn test_player_map_iter() {
        let map: PlayerMap<i32> = PlayerMap::new(3, |p| p.index() as i32);

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], (PlayerId::new(0), &0));
        assert_eq!(pairs[2], (PlayerId::new(2), &2));
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<i32> = PlayerMap::new(2, |p| p.index() as i32 + 1);
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PlayerMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_players() {
        let _: PlayerMap<i32> = PlayerMap::with_value(0, 0);
    }
}
