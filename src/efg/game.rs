//! A game backed by a parsed EFG tree.
//!
//! Player actions are identified by label: every distinct player action
//! label gets an id, in order of first appearance, so the same label means
//! the same action everywhere in the tree. Chance outcomes are numbered by
//! position at their node.

use std::path::Path;
use std::sync::Arc;

use im::Vector;
use rustc_hash::FxHashMap;

use super::tree::{EfgTree, NodeKind};
use crate::core::state::check_undo;
use crate::core::{
    Action, ActionRecord, Actor, ChanceMode, Game, GameParameters, GameType, Information,
    PlayerId, Result, State, Utility,
};

/// Tree plus the tables derived from it.
#[derive(Debug)]
struct EfgData {
    tree: EfgTree,
    action_labels: Vec<String>,
    action_ids: FxHashMap<String, Action>,
    /// Information sets per player.
    infoset_counts: Vec<usize>,
}

/// A sequential game read from an EFG file.
#[derive(Clone, Debug)]
pub struct EfgGame {
    game_type: GameType,
    data: Arc<EfgData>,
    min_utility: f64,
    max_utility: f64,
    max_chance_outcomes: usize,
    max_game_length: usize,
}

impl EfgGame {
    /// Build from the parameter bag `{"filename": <path>}`.
    pub fn from_parameters(params: &GameParameters) -> Result<Self> {
        params.check_known("efg_game", &["filename"])?;
        let filename = params.required_string("efg_game", "filename")?;
        Self::from_path(filename)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_tree(EfgTree::from_path(path)?))
    }

    /// Derive the game descriptor and action tables from a tree.
    #[must_use]
    pub fn from_tree(tree: EfgTree) -> Self {
        let mut action_labels: Vec<String> = Vec::new();
        let mut action_ids = FxHashMap::default();
        let mut infoset_counts = vec![0; tree.num_players()];
        let mut has_chance = false;
        let mut max_chance_outcomes = 0;
        let mut leaf_payoffs: Vec<&[f64]> = Vec::new();

        for node in &tree.nodes {
            match &node.kind {
                NodeKind::Chance { labels, .. } => {
                    has_chance = true;
                    max_chance_outcomes = max_chance_outcomes.max(labels.len());
                }
                NodeKind::Player {
                    player,
                    infoset,
                    labels,
                    ..
                } => {
                    let count = &mut infoset_counts[player.index()];
                    *count = (*count).max(*infoset);
                    for label in labels {
                        if !action_ids.contains_key(label) {
                            action_ids.insert(label.clone(), Action::from(action_labels.len()));
                            action_labels.push(label.clone());
                        }
                    }
                }
                NodeKind::Terminal { payoffs } => leaf_payoffs.push(payoffs.as_slice()),
            }
        }

        let imperfect = tree.infoset_sizes().values().any(|&n| n > 1);
        let utility = Utility::classify(leaf_payoffs.iter().copied());
        let all_payoffs = || leaf_payoffs.iter().flat_map(|p| p.iter()).copied();
        let min_utility = all_payoffs().fold(f64::INFINITY, f64::min);
        let max_utility = all_payoffs().fold(f64::NEG_INFINITY, f64::max);

        let game_type = GameType::new("efg_game", tree.name.clone())
            .with_chance_mode(if has_chance {
                ChanceMode::ExplicitStochastic
            } else {
                ChanceMode::Deterministic
            })
            .with_information(if imperfect {
                Information::Imperfect
            } else {
                Information::Perfect
            })
            .with_utility(utility);
        let max_game_length = tree.depth();

        log::debug!(
            "EFG game '{}': {} nodes, {} distinct actions, {:?}",
            tree.name,
            tree.nodes.len(),
            action_labels.len(),
            game_type
        );

        Self {
            game_type,
            data: Arc::new(EfgData {
                tree,
                action_labels,
                action_ids,
                infoset_counts,
            }),
            min_utility,
            max_utility,
            max_chance_outcomes,
            max_game_length,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &EfgTree {
        &self.data.tree
    }
}

impl Game for EfgGame {
    type State = EfgState;

    fn game_type(&self) -> &GameType {
        &self.game_type
    }

    fn new_initial_state(&self) -> EfgState {
        EfgState {
            data: Arc::clone(&self.data),
            node: 0,
            history: Vector::new(),
        }
    }

    fn num_distinct_actions(&self) -> usize {
        self.data.action_labels.len()
    }

    fn max_chance_outcomes(&self) -> usize {
        self.max_chance_outcomes
    }

    fn num_players(&self) -> usize {
        self.data.tree.num_players()
    }

    fn min_utility(&self) -> f64 {
        self.min_utility
    }

    fn max_utility(&self) -> f64 {
        self.max_utility
    }

    fn utility_sum(&self) -> Option<f64> {
        match self.game_type.utility {
            Utility::ZeroSum => Some(0.0),
            Utility::ConstantSum => self.data.tree.nodes.iter().find_map(|n| match &n.kind {
                NodeKind::Terminal { payoffs } => Some(payoffs.iter().sum()),
                _ => None,
            }),
            _ => None,
        }
    }

    /// One-hot over the player's information sets.
    fn information_state_tensor_shape(&self) -> Vec<usize> {
        vec![self.data.infoset_counts.iter().copied().max().unwrap_or(0)]
    }

    fn observation_tensor_shape(&self) -> Vec<usize> {
        self.information_state_tensor_shape()
    }

    fn max_game_length(&self) -> usize {
        self.max_game_length
    }
}

/// A position in the tree.
#[derive(Clone, Debug)]
pub struct EfgState {
    data: Arc<EfgData>,
    node: usize,
    history: Vector<ActionRecord>,
}

impl EfgState {
    fn kind(&self) -> &NodeKind {
        &self.data.tree.node(self.node).kind
    }

    /// The player node's infoset, if `player` is to move here.
    fn own_infoset(&self, player: PlayerId) -> Option<(usize, &str)> {
        match self.kind() {
            NodeKind::Player {
                player: p,
                infoset,
                info_state,
                ..
            } if *p == player => Some((*infoset, info_state.as_str())),
            _ => None,
        }
    }

    fn child_index(&self, action: Action) -> Option<usize> {
        match self.kind() {
            NodeKind::Chance { labels, .. } => (action.index() < labels.len()).then(|| action.index()),
            NodeKind::Player { labels, .. } => {
                let label = self.data.action_labels.get(action.index())?;
                labels.iter().position(|l| l == label)
            }
            NodeKind::Terminal { .. } => None,
        }
    }

    fn infoset_tensor(&self, player: PlayerId) -> Vec<f64> {
        let len = self.data.infoset_counts.iter().copied().max().unwrap_or(0);
        let mut values = vec![0.0; len];
        if let Some((infoset, _)) = self.own_infoset(player) {
            values[infoset - 1] = 1.0;
        }
        values
    }
}

impl State for EfgState {
    fn current_player(&self) -> Actor {
        match self.kind() {
            NodeKind::Chance { .. } => Actor::Chance,
            NodeKind::Player { player, .. } => Actor::Player(*player),
            NodeKind::Terminal { .. } => Actor::Terminal,
        }
    }

    fn num_players(&self) -> usize {
        self.data.tree.num_players()
    }

    fn legal_actions(&self) -> Vec<Action> {
        match self.kind() {
            NodeKind::Chance { labels, .. } => (0..labels.len()).map(Action::from).collect(),
            NodeKind::Player { labels, .. } => labels
                .iter()
                .filter_map(|l| self.data.action_ids.get(l).copied())
                .collect(),
            NodeKind::Terminal { .. } => Vec::new(),
        }
    }

    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        match self.kind() {
            NodeKind::Chance { probabilities, .. } => probabilities
                .iter()
                .enumerate()
                .map(|(i, &p)| (Action::from(i), p))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn apply_action(&mut self, action: Action) {
        let actor = self.current_player();
        let index = self
            .child_index(action)
            .unwrap_or_else(|| panic!("Illegal action {} at node {}", action, self.node));
        self.node = self.data.tree.node(self.node).children[index];
        self.history.push_back(ActionRecord::new(actor, action));
    }

    fn undo_action(&mut self, actor: Actor, action: Action) -> Result<()> {
        check_undo(self.history.last(), actor, action)?;
        if let Some(parent) = self.data.tree.node(self.node).parent {
            self.node = parent;
        }
        self.history.pop_back();
        Ok(())
    }

    fn history(&self) -> Vec<ActionRecord> {
        self.history.iter().copied().collect()
    }

    fn returns(&self) -> Vec<f64> {
        match self.kind() {
            NodeKind::Terminal { payoffs } => payoffs.clone(),
            _ => vec![0.0; self.num_players()],
        }
    }

    /// The information set's name from the file, or its number when unnamed.
    /// Empty unless `player` is to move.
    fn information_state(&self, player: PlayerId) -> String {
        match self.own_infoset(player) {
            Some((_, name)) if !name.is_empty() => name.to_string(),
            Some((infoset, _)) => format!("infoset {}", infoset),
            None => String::new(),
        }
    }

    fn information_state_tensor(&self, player: PlayerId) -> Vec<f64> {
        self.infoset_tensor(player)
    }

    fn observation(&self, player: PlayerId) -> String {
        self.information_state(player)
    }

    fn observation_tensor(&self, player: PlayerId) -> Vec<f64> {
        self.infoset_tensor(player)
    }

    fn action_to_string(&self, actor: Actor, action: Action) -> String {
        match (actor, self.kind()) {
            (Actor::Chance, NodeKind::Chance { labels, .. }) => labels
                .get(action.index())
                .cloned()
                .unwrap_or_else(|| format!("outcome {}", action)),
            (Actor::Chance, _) => format!("outcome {}", action),
            _ => self
                .data
                .action_labels
                .get(action.index())
                .cloned()
                .unwrap_or_else(|| format!("action {}", action)),
        }
    }
}

impl std::fmt::Display for EfgState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node {} [{}]", self.node, self.history_string())
    }
}
