//! Joint actions at simultaneous-move nodes.
//!
//! ## Encoding
//!
//! A joint action (one action per player) is flattened to a single `Action`
//! by mixed-radix encoding over the players' legal-action *indices*, with
//! player 0 varying fastest:
//!
//! ```text
//! flat = i_0 + n_0 * (i_1 + n_1 * (i_2 + ...))
//! ```
//!
//! where `i_p` is the index of player `p`'s action in its legal list and
//! `n_p` the list's length. Simultaneous games decode with the same rule,
//! and the turn-based transform encodes with it.

pub mod action_view;

pub use action_view::{
    flatten_indices, flatten_joint_action, unflatten_indices, unflatten_joint_action,
    ActionView, FixedActions, FlatJointActions, JointAction,
};
