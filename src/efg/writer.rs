//! Depth-first export of a game's full tree.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{Actor, Game, GameError, PlayerId, Result, State};

/// Export settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Allowed distance of a chance node's probability sum from 1.
    /// Default: 1e-9.
    pub probability_tolerance: f64,

    /// Game name written in the header. Default: the game's short name.
    pub name: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            probability_tolerance: 1e-9,
            name: None,
        }
    }
}

impl ExportConfig {
    #[must_use]
    pub fn with_probability_tolerance(mut self, tolerance: f64) -> Self {
        self.probability_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Counts gathered during one export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub chance_nodes: usize,
    pub player_nodes: usize,
    pub terminal_nodes: usize,

    /// Distinct information sets per player.
    pub infosets: Vec<usize>,
}

impl ExportStats {
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.chance_nodes + self.player_nodes + self.terminal_nodes
    }
}

/// Escape `\`, `"`, newlines and carriage returns for a quoted EFG string.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// An information set seen so far: its id and the labels of its actions.
struct Infoset {
    id: usize,
    labels: Vec<String>,
}

/// Lazily numbered information sets, one id sequence per player.
struct InfosetTable {
    sets: FxHashMap<(PlayerId, String), Infoset>,
    counts: Vec<usize>,
}

impl InfosetTable {
    fn new(num_players: usize) -> Self {
        Self {
            sets: FxHashMap::default(),
            counts: vec![0; num_players],
        }
    }

    /// The id of `(player, info_state)`, assigning the next one on first sight.
    fn lookup(&mut self, player: PlayerId, info_state: String, labels: &[String]) -> Result<usize> {
        if let Some(existing) = self.sets.get(&(player, info_state.clone())) {
            if existing.labels != labels {
                return Err(GameError::InfosetConflict { player, info_state });
            }
            return Ok(existing.id);
        }

        self.counts[player.index()] += 1;
        let id = self.counts[player.index()];
        self.sets.insert(
            (player, info_state),
            Infoset {
                id,
                labels: labels.to_vec(),
            },
        );
        Ok(id)
    }
}

/// Writes a game's whole tree in Gambit EFG format.
///
/// ## Example
///
/// ```
/// use rust_efg::efg::EfgWriter;
/// use rust_efg::games::CoinGame;
///
/// let game = CoinGame::new();
/// let mut out = Vec::new();
/// let stats = EfgWriter::new(&game, "coin.efg").write_to(&mut out).unwrap();
///
/// assert_eq!(stats.terminal_nodes, 4);
/// assert!(String::from_utf8(out).unwrap().starts_with("EFG 2 R \"coin_game\""));
/// ```
pub struct EfgWriter<'a, G> {
    game: &'a G,
    path: PathBuf,
    config: ExportConfig,
}

impl<'a, G: Game> EfgWriter<'a, G> {
    pub fn new(game: &'a G, path: impl AsRef<Path>) -> Self {
        Self::with_config(game, path, ExportConfig::default())
    }

    pub fn with_config(game: &'a G, path: impl AsRef<Path>, config: ExportConfig) -> Self {
        Self {
            game,
            path: path.as_ref().to_path_buf(),
            config,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Export to the target path, creating or truncating the file.
    ///
    /// On error the file is left partially written.
    pub fn write(&self) -> Result<ExportStats> {
        let file = File::create(&self.path)?;
        let mut out = BufWriter::new(file);
        let stats = self.write_to(&mut out)?;
        out.flush()?;

        log::info!(
            "Wrote {} nodes of '{}' to {}",
            stats.total_nodes(),
            self.game.game_type().short_name,
            self.path.display()
        );
        Ok(stats)
    }

    /// Export to any sink.
    ///
    /// Nodes are written in pre-order. The traversal keeps its own stack of
    /// states, so tree depth is bounded by memory only.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<ExportStats> {
        let num_players = self.game.num_players();
        let name = self
            .config
            .name
            .clone()
            .unwrap_or_else(|| self.game.game_type().short_name.clone());

        write!(out, "EFG 2 R \"{}\" {{", escape(&name))?;
        for p in 1..=num_players {
            write!(out, " \"Player {}\"", p)?;
        }
        writeln!(out, " }}")?;
        writeln!(out, "\"\"")?;

        let mut stats = ExportStats::default();
        let mut infosets = InfosetTable::new(num_players);
        let mut stack = vec![self.game.new_initial_state()];

        while let Some(state) = stack.pop() {
            let children = match state.current_player() {
                Actor::Terminal => {
                    stats.terminal_nodes += 1;
                    write!(out, "t \"\" {} \"\" {{", stats.terminal_nodes)?;
                    for payoff in state.returns() {
                        write!(out, " {}", payoff)?;
                    }
                    writeln!(out, " }}")?;
                    continue;
                }
                Actor::Chance => {
                    let outcomes = state.chance_outcomes();
                    if let Some(&(_, probability)) =
                        outcomes.iter().find(|(_, p)| !(0.0..=1.0).contains(p))
                    {
                        return Err(GameError::InvalidProbability {
                            history: state.history_string(),
                            probability,
                        });
                    }
                    let sum: f64 = outcomes.iter().map(|(_, p)| p).sum();
                    if (sum - 1.0).abs() > self.config.probability_tolerance {
                        return Err(GameError::InvalidChanceDistribution {
                            history: state.history_string(),
                            sum,
                        });
                    }

                    stats.chance_nodes += 1;
                    write!(out, "c \"\" {} \"\" {{", stats.chance_nodes)?;
                    for &(action, prob) in &outcomes {
                        let label = state.action_to_string(Actor::Chance, action);
                        write!(out, " \"{}\" {}", escape(&label), prob)?;
                    }
                    writeln!(out, " }} 0")?;
                    outcomes.into_iter().map(|(a, _)| a).collect::<Vec<_>>()
                }
                Actor::Player(player) => {
                    let actor = Actor::Player(player);
                    let actions = state.legal_actions();
                    let labels: Vec<String> = actions
                        .iter()
                        .map(|&a| state.action_to_string(actor, a))
                        .collect();
                    let info_state = state.information_state(player);
                    let escaped = escape(&info_state);
                    let id = infosets.lookup(player, info_state, &labels)?;

                    stats.player_nodes += 1;
                    write!(out, "p \"\" {} {} \"{}\" {{", player.index() + 1, id, escaped)?;
                    for label in &labels {
                        write!(out, " \"{}\"", escape(label))?;
                    }
                    writeln!(out, " }} 0")?;
                    actions
                }
                Actor::Simultaneous => {
                    return Err(GameError::SimultaneousNode {
                        history: state.history_string(),
                    })
                }
            };

            for &action in children.iter().rev() {
                stack.push(state.child(action));
            }
        }

        stats.infosets = infosets.counts;
        log::debug!(
            "Export: {} chance, {} player, {} terminal nodes; infosets {:?}",
            stats.chance_nodes,
            stats.player_nodes,
            stats.terminal_nodes,
            stats.infosets
        );
        Ok(stats)
    }
}
