//! Action representation.
//!
//! Actions are opaque integer ids in `0..num_distinct_actions` for player
//! moves, and in `0..max_chance_outcomes` for chance outcomes. Games give
//! them meaning through `State::action_to_string`.
//!
//! At simultaneous nodes a single `Action` is a flattened joint action; see
//! [`crate::joint`] for the encoding.

use serde::{Deserialize, Serialize};

use super::player::Actor;

/// A single action id.
///
/// ```
/// use rust_efg::core::Action;
///
/// let a = Action::new(4);
/// assert_eq!(a.index(), 4);
/// assert_eq!(a.to_string(), "4");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Action(pub u32);

impl Action {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw id as an index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for Action {
    fn from(index: usize) -> Self {
        Action(index as u32)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a state's history: who acted, and with what.
///
/// Chance outcomes are recorded with `Actor::Chance`; joint actions at
/// simultaneous nodes with `Actor::Simultaneous` and the flat action id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The actor who took this action.
    pub actor: Actor,

    /// The action taken.
    pub action: Action,
}

impl ActionRecord {
    #[must_use]
    pub fn new(actor: Actor, action: Action) -> Self {
        Self { actor, action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    #[test]
    fn test_action_conversions() {
        let a: Action = 7usize.into();
        assert_eq!(a, Action::new(7));
        assert_eq!(a.index(), 7);
    }

    #[test]
    fn test_action_ordering() {
        let mut actions = vec![Action(3), Action(0), Action(2)];
        actions.sort();
        assert_eq!(actions, vec![Action(0), Action(2), Action(3)]);
    }

    #[test]
    fn test_action_record() {
        let record = ActionRecord::new(Actor::Player(PlayerId::new(1)), Action(5));

        assert_eq!(record.actor, Actor::Player(PlayerId::new(1)));
        assert_eq!(record.action, Action(5));
    }

    #[test]
    fn test_action_record_serialization() {
        let record = ActionRecord::new(Actor::Chance, Action(2));

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: ActionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }
}
