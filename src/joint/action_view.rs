//! Joint-action views over a simultaneous-move node.

use smallvec::SmallVec;

use crate::core::{Action, Actor, PlayerId, State};

/// Decoded joint action: one action per player.
pub type JointAction = SmallVec<[Action; 4]>;

/// Legal-action lists of every player at one simultaneous node.
///
/// Captured once at construction; the view never looks at the state again,
/// so it must not be used after the originating state has moved on.
///
/// ## Example
///
/// ```
/// use rust_efg::core::{Action, Actor};
/// use rust_efg::joint::ActionView;
///
/// let view = ActionView::from_lists(
///     Actor::Simultaneous,
///     vec![vec![Action(0), Action(1)], vec![Action(0), Action(1), Action(2)]],
/// );
///
/// assert_eq!(view.flat_joint_actions().count(), 6);
/// assert_eq!(view.fixed_action(1, 2).collect::<Vec<_>>(), vec![Action(4), Action(5)]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionView {
    /// The actor at the originating state.
    pub current_player: Actor,

    /// Legal actions per player, indexed by player.
    pub legal_actions: Vec<Vec<Action>>,
}

impl ActionView {
    /// Collect every player's legal actions at `state`.
    pub fn new<S: State>(state: &S) -> Self {
        let legal_actions = PlayerId::all(state.num_players())
            .map(|p| state.legal_actions_for(p))
            .collect();

        Self {
            current_player: state.current_player(),
            legal_actions,
        }
    }

    /// Build a view from explicit lists.
    #[must_use]
    pub fn from_lists(current_player: Actor, legal_actions: Vec<Vec<Action>>) -> Self {
        Self {
            current_player,
            legal_actions,
        }
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.legal_actions.len()
    }

    /// Size of the joint-action space: the product of the list sizes.
    #[must_use]
    pub fn num_flat_joint_actions(&self) -> usize {
        self.legal_actions.iter().map(Vec::len).product()
    }

    /// Every joint action, flattened, each exactly once.
    #[must_use]
    pub fn flat_joint_actions(&self) -> FlatJointActions {
        FlatJointActions {
            pos: 0,
            prod: self.num_flat_joint_actions(),
        }
    }

    /// The flattened joint actions in which `player` plays its
    /// `action_index`-th legal action.
    ///
    /// # Panics
    ///
    /// Panics if `player` or `action_index` is out of range.
    #[must_use]
    pub fn fixed_action(&self, player: usize, action_index: usize) -> FixedActions {
        let num_actions = self.legal_actions[player].len();
        assert!(
            action_index < num_actions,
            "Action index {} out of range for player {} with {} actions",
            action_index,
            player,
            num_actions
        );

        let prod_before = self.legal_actions[..player].iter().map(Vec::len).product();
        let prod_after = self.legal_actions[player + 1..].iter().map(Vec::len).product();

        FixedActions {
            fixed_action: action_index,
            prod_before,
            num_actions,
            prod_after,
            i: 0,
            j: 0,
        }
    }

    /// Encode per-player action indices as a flat joint action.
    #[must_use]
    pub fn flatten(&self, indices: &[usize]) -> Action {
        let sizes: SmallVec<[usize; 4]> = self.legal_actions.iter().map(Vec::len).collect();
        Action::from(flatten_indices(&sizes, indices))
    }

    /// Decode a flat joint action into one action per player.
    #[must_use]
    pub fn unflatten(&self, flat: Action) -> JointAction {
        unflatten_joint_action(&self.legal_actions, flat)
    }
}

/// Iterator over `0..prod`. Cheap to clone and restart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatJointActions {
    pos: usize,
    prod: usize,
}

impl Iterator for FlatJointActions {
    type Item = Action;

    fn next(&mut self) -> Option<Action> {
        if self.pos >= self.prod {
            return None;
        }
        let action = Action::from(self.pos);
        self.pos += 1;
        Some(action)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.prod.saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FlatJointActions {}

/// Iterator over the flat joint actions consistent with one fixed choice.
///
/// The outer loop `i` runs over the players after the fixed one, the inner
/// loop `j` over the players before it, so the other players keep the same
/// relative order they have in the full enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedActions {
    fixed_action: usize,
    prod_before: usize,
    num_actions: usize,
    prod_after: usize,
    i: usize,
    j: usize,
}

impl Iterator for FixedActions {
    type Item = Action;

    fn next(&mut self) -> Option<Action> {
        if self.i >= self.prod_after || self.prod_before == 0 {
            return None;
        }

        let flat = self.j + self.prod_before * (self.fixed_action + self.num_actions * self.i);

        self.j += 1;
        if self.j == self.prod_before {
            self.j = 0;
            self.i += 1;
        }

        Some(Action::from(flat))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.prod_before == 0 || self.i >= self.prod_after {
            0
        } else {
            (self.prod_after - self.i) * self.prod_before - self.j
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FixedActions {}

/// Mixed-radix encoding, player 0 varying fastest.
///
/// # Panics
///
/// Panics if the slices differ in length or an index exceeds its radix.
#[must_use]
pub fn flatten_indices(sizes: &[usize], indices: &[usize]) -> usize {
    assert_eq!(sizes.len(), indices.len(), "One index per player required");

    let mut flat = 0;
    let mut stride = 1;
    for (&size, &index) in sizes.iter().zip(indices) {
        assert!(index < size, "Index {} out of range for radix {}", index, size);
        flat += index * stride;
        stride *= size;
    }
    flat
}

/// Inverse of [`flatten_indices`].
#[must_use]
pub fn unflatten_indices(sizes: &[usize], flat: usize) -> SmallVec<[usize; 4]> {
    let mut rest = flat;
    sizes
        .iter()
        .map(|&size| {
            let index = rest % size;
            rest /= size;
            index
        })
        .collect()
}

/// Encode one chosen action per player as a flat joint action.
///
/// # Panics
///
/// Panics if a chosen action is not in its player's list.
#[must_use]
pub fn flatten_joint_action(legal_actions: &[Vec<Action>], joint: &[Action]) -> Action {
    let sizes: SmallVec<[usize; 4]> = legal_actions.iter().map(Vec::len).collect();
    let indices: SmallVec<[usize; 4]> = legal_actions
        .iter()
        .zip(joint)
        .map(|(actions, chosen)| {
            actions
                .iter()
                .position(|a| a == chosen)
                .unwrap_or_else(|| panic!("Action {} is not legal here", chosen))
        })
        .collect();
    Action::from(flatten_indices(&sizes, &indices))
}

/// Decode a flat joint action into one action per player.
#[must_use]
pub fn unflatten_joint_action(legal_actions: &[Vec<Action>], flat: Action) -> JointAction {
    let sizes: SmallVec<[usize; 4]> = legal_actions.iter().map(Vec::len).collect();
    unflatten_indices(&sizes, flat.index())
        .into_iter()
        .zip(legal_actions)
        .map(|(index, actions)| actions[index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(n: u32) -> Vec<Action> {
        (0..n).map(Action).collect()
    }

    fn view(sizes: &[u32]) -> ActionView {
        ActionView::from_lists(
            Actor::Simultaneous,
            sizes.iter().map(|&n| actions(n)).collect(),
        )
    }

    #[test]
    fn test_flat_joint_actions_count() {
        let view = view(&[2, 3, 4]);
        assert_eq!(view.num_flat_joint_actions(), 24);
        assert_eq!(view.flat_joint_actions().len(), 24);
        assert_eq!(view.flat_joint_actions().collect::<Vec<_>>(), actions(24));
    }

    #[test]
    fn test_flat_joint_actions_restartable() {
        let view = view(&[2, 2]);
        let first: Vec<_> = view.flat_joint_actions().collect();
        let second: Vec<_> = view.flat_joint_actions().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_player_zero_varies_fastest() {
        let view = view(&[2, 3]);

        assert_eq!(view.unflatten(Action(0)).as_slice(), &[Action(0), Action(0)]);
        assert_eq!(view.unflatten(Action(1)).as_slice(), &[Action(1), Action(0)]);
        assert_eq!(view.unflatten(Action(2)).as_slice(), &[Action(0), Action(1)]);
        assert_eq!(view.unflatten(Action(5)).as_slice(), &[Action(1), Action(2)]);
    }

    #[test]
    fn test_flatten_inverts_unflatten() {
        let view = view(&[3, 2, 2]);
        for flat in view.flat_joint_actions() {
            let joint = view.unflatten(flat);
            let indices: Vec<usize> = joint.iter().map(|a| a.index()).collect();
            assert_eq!(view.flatten(&indices), flat);
        }
    }

    #[test]
    fn test_fixed_action_first_player() {
        let view = view(&[2, 3]);
        let fixed: Vec<_> = view.fixed_action(0, 1).collect();
        assert_eq!(fixed, vec![Action(1), Action(3), Action(5)]);
    }

    #[test]
    fn test_fixed_action_middle_player() {
        let view = view(&[2, 3, 2]);
        let fixed: Vec<_> = view.fixed_action(1, 2).collect();

        assert_eq!(fixed.len(), 4);
        for flat in &fixed {
            assert_eq!(view.unflatten(*flat)[1], Action(2));
        }
        assert_eq!(fixed, vec![Action(4), Action(5), Action(10), Action(11)]);
    }

    #[test]
    fn test_fixed_action_size_hint() {
        let view = view(&[2, 3, 4]);
        let mut iter = view.fixed_action(1, 0);
        assert_eq!(iter.len(), 8);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 6);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_fixed_action_out_of_range() {
        let view = view(&[2, 2]);
        let _ = view.fixed_action(0, 2);
    }

    #[test]
    fn test_joint_action_with_sparse_ids() {
        let lists = vec![vec![Action(4), Action(7)], vec![Action(1), Action(9)]];
        let flat = flatten_joint_action(&lists, &[Action(7), Action(9)]);

        assert_eq!(flat, Action(3));
        assert_eq!(unflatten_joint_action(&lists, flat).as_slice(), &[Action(7), Action(9)]);
    }

    #[test]
    fn test_empty_list_gives_empty_space() {
        let view = ActionView::from_lists(Actor::Simultaneous, vec![actions(2), vec![]]);
        assert_eq!(view.flat_joint_actions().count(), 0);
    }
}
