//! Static game descriptors.
//!
//! Every game carries a `GameType` fixed at construction. Transforms derive
//! their own descriptor from the wrapped game's (e.g. the turn-based
//! transform flips `dynamics` to sequential and keeps everything else).

use serde::{Deserialize, Serialize};

/// How players move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dynamics {
    /// One actor at a time.
    Sequential,
    /// Some nodes have all players choosing at once.
    Simultaneous,
}

/// Whether players see the whole history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Information {
    Perfect,
    Imperfect,
}

/// Presence of chance nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChanceMode {
    /// No chance nodes.
    Deterministic,
    /// Chance nodes with explicitly listed outcome probabilities.
    ExplicitStochastic,
}

/// Structure of the terminal returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Utility {
    /// Returns sum to zero.
    ZeroSum,
    /// Returns sum to a fixed constant.
    ConstantSum,
    /// No constraint.
    GeneralSum,
    /// Every player receives the same return.
    Identical,
}

impl Utility {
    /// Tolerance used when comparing payoff sums.
    pub const TOLERANCE: f64 = 1e-9;

    /// Classify a set of payoff vectors.
    ///
    /// Preference order: zero-sum, constant-sum, identical, general-sum.
    /// An empty set is zero-sum.
    pub fn classify<'a>(payoffs: impl IntoIterator<Item = &'a [f64]>) -> Utility {
        let mut first_sum: Option<f64> = None;
        let mut zero_sum = true;
        let mut constant_sum = true;
        let mut identical = true;

        for returns in payoffs {
            let sum: f64 = returns.iter().sum();
            if sum.abs() > Self::TOLERANCE {
                zero_sum = false;
            }
            match first_sum {
                None => first_sum = Some(sum),
                Some(s) if (s - sum).abs() > Self::TOLERANCE => constant_sum = false,
                Some(_) => {}
            }
            if let Some(&r0) = returns.first() {
                if returns.iter().any(|r| (r - r0).abs() > Self::TOLERANCE) {
                    identical = false;
                }
            }
        }

        if zero_sum {
            Utility::ZeroSum
        } else if constant_sum {
            Utility::ConstantSum
        } else if identical {
            Utility::Identical
        } else {
            Utility::GeneralSum
        }
    }
}

/// Immutable descriptor of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameType {
    /// Short machine name, e.g. `"kuhn_poker"`.
    pub short_name: String,

    /// Human-readable name.
    pub long_name: String,

    pub dynamics: Dynamics,
    pub chance_mode: ChanceMode,
    pub information: Information,
    pub utility: Utility,
}

impl GameType {
    /// Create a descriptor with sequential, deterministic, perfect-information,
    /// zero-sum defaults.
    pub fn new(short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            long_name: long_name.into(),
            dynamics: Dynamics::Sequential,
            chance_mode: ChanceMode::Deterministic,
            information: Information::Perfect,
            utility: Utility::ZeroSum,
        }
    }

    #[must_use]
    pub fn with_dynamics(mut self, dynamics: Dynamics) -> Self {
        self.dynamics = dynamics;
        self
    }

    #[must_use]
    pub fn with_chance_mode(mut self, chance_mode: ChanceMode) -> Self {
        self.chance_mode = chance_mode;
        self
    }

    #[must_use]
    pub fn with_information(mut self, information: Information) -> Self {
        self.information = information;
        self
    }

    #[must_use]
    pub fn with_utility(mut self, utility: Utility) -> Self {
        self.utility = utility;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let game_type = GameType::new("tic_tac_toe", "Tic Tac Toe");

        assert_eq!(game_type.short_name, "tic_tac_toe");
        assert_eq!(game_type.dynamics, Dynamics::Sequential);
        assert_eq!(game_type.chance_mode, ChanceMode::Deterministic);
        assert_eq!(game_type.information, Information::Perfect);
        assert_eq!(game_type.utility, Utility::ZeroSum);
    }

    #[test]
    fn test_builder_pattern() {
        let game_type = GameType::new("matrix", "Matrix Game")
            .with_dynamics(Dynamics::Simultaneous)
            .with_information(Information::Imperfect)
            .with_utility(Utility::GeneralSum)
            .with_chance_mode(ChanceMode::ExplicitStochastic);

        assert_eq!(game_type.dynamics, Dynamics::Simultaneous);
        assert_eq!(game_type.information, Information::Imperfect);
        assert_eq!(game_type.utility, Utility::GeneralSum);
        assert_eq!(game_type.chance_mode, ChanceMode::ExplicitStochastic);
    }

    #[test]
    fn test_classify_utility() {
        let zero: Vec<Vec<f64>> = vec![vec![1.0, -1.0], vec![-2.0, 2.0]];
        assert_eq!(Utility::classify(zero.iter().map(Vec::as_slice)), Utility::ZeroSum);

        let constant: Vec<Vec<f64>> = vec![vec![1.0, 0.0], vec![0.5, 0.5]];
        assert_eq!(Utility::classify(constant.iter().map(Vec::as_slice)), Utility::ConstantSum);

        let identical: Vec<Vec<f64>> = vec![vec![1.0, 1.0], vec![3.0, 3.0]];
        assert_eq!(Utility::classify(identical.iter().map(Vec::as_slice)), Utility::Identical);

        let general: Vec<Vec<f64>> = vec![vec![1.0, 2.0], vec![3.0, 1.0]];
        assert_eq!(Utility::classify(general.iter().map(Vec::as_slice)), Utility::GeneralSum);
    }

    #[test]
    fn test_serialization() {
        let game_type = GameType::new("kuhn_poker", "Kuhn Poker")
            .with_information(Information::Imperfect);
        let json = serde_json::to_string(&game_type).unwrap();
        let deserialized: GameType = serde_json::from_str(&json).unwrap();
        assert_eq!(game_type, deserialized);
    }
}
