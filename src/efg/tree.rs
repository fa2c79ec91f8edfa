//! Parsing EFG text back into a node table.
//!
//! Accepts what [`EfgWriter`](super::EfgWriter) produces plus the common
//! Gambit shorthands: an information set's action list (and a terminal
//! outcome's payoffs) may be omitted after its first appearance, and
//! numbers may be written as rationals (`1/3`).

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::core::{GameError, PlayerId, Result};

/// What a node is.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Chance {
        labels: Vec<String>,
        probabilities: Vec<f64>,
    },
    Player {
        player: PlayerId,
        /// 1-based, numbered per player.
        infoset: usize,
        info_state: String,
        labels: Vec<String>,
    },
    Terminal {
        payoffs: Vec<f64>,
    },
}

impl NodeKind {
    fn num_children(&self) -> usize {
        match self {
            NodeKind::Chance { labels, .. } | NodeKind::Player { labels, .. } => labels.len(),
            NodeKind::Terminal { .. } => 0,
        }
    }
}

/// One node of a parsed tree.
#[derive(Clone, Debug, PartialEq)]
pub struct EfgNode {
    pub id: usize,
    pub parent: Option<usize>,
    pub kind: NodeKind,
    /// Child ids in action order.
    pub children: Vec<usize>,
}

/// A whole parsed tree. Node 0 is the root; ids follow file order.
#[derive(Clone, Debug, PartialEq)]
pub struct EfgTree {
    pub name: String,
    pub players: Vec<String>,
    pub nodes: Vec<EfgNode>,
}

impl EfgTree {
    /// Read and parse a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let tree = Self::parse(&text)?;
        log::debug!(
            "Parsed {} nodes of '{}' from {}",
            tree.nodes.len(),
            tree.name,
            path.display()
        );
        Ok(tree)
    }

    /// Parse EFG text.
    ///
    /// Nodes are read in pre-order; a stack of nodes still waiting for
    /// children links each node to its parent, so depth is not limited.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);

        tokens.expect_word("EFG")?;
        tokens.expect_word("2")?;
        tokens.expect_word("R")?;
        let name = tokens.string()?;
        let players = tokens.string_list()?;
        if players.is_empty() {
            return Err(tokens.error("game has no players"));
        }
        if players.len() > usize::from(u8::MAX) + 1 {
            return Err(tokens.error(&format!("{} players, at most 256 supported", players.len())));
        }
        if tokens.peek_is_string()? {
            tokens.string()?;
        }

        let mut builder = NodeBuilder::new(players.len());
        while let Some(first) = tokens.next()? {
            let kind = match first {
                Token::Word(w) if w == "c" => builder.chance(&mut tokens)?,
                Token::Word(w) if w == "p" => builder.player(&mut tokens)?,
                Token::Word(w) if w == "t" => builder.terminal(&mut tokens)?,
                other => return Err(tokens.error(&format!("expected node type, found {}", other))),
            };
            builder.push(kind).map_err(|m| tokens.error(&m))?;
        }

        let nodes = builder.finish().map_err(|m| tokens.error(&m))?;
        Ok(Self {
            name,
            players,
            nodes,
        })
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn root(&self) -> &EfgNode {
        &self.nodes[0]
    }

    #[must_use]
    pub fn node(&self, id: usize) -> &EfgNode {
        &self.nodes[id]
    }

    /// Number of nodes in every information set, keyed by (player, infoset).
    #[must_use]
    pub fn infoset_sizes(&self) -> FxHashMap<(PlayerId, usize), usize> {
        let mut sizes = FxHashMap::default();
        for node in &self.nodes {
            if let NodeKind::Player { player, infoset, .. } = node.kind {
                *sizes.entry((player, infoset)).or_insert(0) += 1;
            }
        }
        sizes
    }

    /// Largest number of actions on any root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        for node in &self.nodes {
            if let Some(parent) = node.parent {
                depths[node.id] = depths[parent] + 1;
            }
        }
        depths.into_iter().max().unwrap_or(0)
    }
}

/// Assembles nodes arriving in pre-order.
struct NodeBuilder {
    nodes: Vec<EfgNode>,
    /// Nodes still missing children, with the number missing.
    open: Vec<(usize, usize)>,
    infoset_labels: FxHashMap<(PlayerId, usize), Vec<String>>,
    outcomes: FxHashMap<usize, Vec<f64>>,
    num_players: usize,
}

impl NodeBuilder {
    fn new(num_players: usize) -> Self {
        Self {
            nodes: Vec::new(),
            open: Vec::new(),
            infoset_labels: FxHashMap::default(),
            outcomes: FxHashMap::default(),
            num_players,
        }
    }

    fn chance(&mut self, tokens: &mut Tokens<'_>) -> Result<NodeKind> {
        tokens.string()?;
        tokens.number::<usize>()?;
        if tokens.peek_is_string()? {
            tokens.string()?;
        }

        tokens.expect_open()?;
        let mut labels = Vec::new();
        let mut probabilities = Vec::new();
        while !tokens.at_close()? {
            labels.push(tokens.string()?);
            probabilities.push(tokens.real()?);
        }
        tokens.expect_close()?;
        self.non_terminal_outcome(tokens)?;

        if labels.is_empty() {
            return Err(tokens.error("chance node without outcomes"));
        }
        Ok(NodeKind::Chance {
            labels,
            probabilities,
        })
    }

    fn player(&mut self, tokens: &mut Tokens<'_>) -> Result<NodeKind> {
        tokens.string()?;
        let number = tokens.number::<usize>()?;
        if number == 0 || number > self.num_players {
            return Err(tokens.error(&format!("player {} out of range", number)));
        }
        let player = u8::try_from(number - 1)
            .map(PlayerId::new)
            .map_err(|_| tokens.error(&format!("player {} out of range", number)))?;
        let infoset = tokens.number::<usize>()?;
        if infoset == 0 {
            return Err(tokens.error("information sets are numbered from 1"));
        }
        let info_state = if tokens.peek_is_string()? {
            tokens.string()?
        } else {
            String::new()
        };

        let labels = if tokens.peek_is_open()? {
            let labels = tokens.string_list()?;
            match self.infoset_labels.get(&(player, infoset)) {
                Some(known) if *known != labels => {
                    return Err(tokens.error(&format!(
                        "infoset {} of player {} redeclared with different actions",
                        infoset, number
                    )))
                }
                Some(_) => {}
                None => {
                    self.infoset_labels.insert((player, infoset), labels.clone());
                }
            }
            labels
        } else {
            match self.infoset_labels.get(&(player, infoset)) {
                Some(known) => known.clone(),
                None => return Err(tokens.error(&format!("infoset {} has no actions", infoset))),
            }
        };
        self.non_terminal_outcome(tokens)?;

        if labels.is_empty() {
            return Err(tokens.error("player node without actions"));
        }
        Ok(NodeKind::Player {
            player,
            infoset,
            info_state,
            labels,
        })
    }

    fn terminal(&mut self, tokens: &mut Tokens<'_>) -> Result<NodeKind> {
        tokens.string()?;
        let outcome = tokens.number::<usize>()?;
        if tokens.peek_is_string()? {
            tokens.string()?;
        }

        let payoffs = if tokens.peek_is_open()? {
            tokens.expect_open()?;
            let mut payoffs = Vec::new();
            while !tokens.at_close()? {
                payoffs.push(tokens.real()?);
                tokens.skip_comma()?;
            }
            tokens.expect_close()?;
            self.outcomes.insert(outcome, payoffs.clone());
            payoffs
        } else {
            match self.outcomes.get(&outcome) {
                Some(known) => known.clone(),
                None => return Err(tokens.error(&format!("outcome {} has no payoffs", outcome))),
            }
        };

        if payoffs.len() != self.num_players {
            return Err(tokens.error(&format!(
                "{} payoffs for {} players",
                payoffs.len(),
                self.num_players
            )));
        }
        Ok(NodeKind::Terminal { payoffs })
    }

    fn non_terminal_outcome(&mut self, tokens: &mut Tokens<'_>) -> Result<()> {
        if tokens.number::<usize>()? != 0 {
            return Err(tokens.error("outcomes on non-terminal nodes are not supported"));
        }
        Ok(())
    }

    fn push(&mut self, kind: NodeKind) -> std::result::Result<(), String> {
        let id = self.nodes.len();
        let parent = match self.open.last_mut() {
            Some((parent, missing)) => {
                let parent = *parent;
                *missing -= 1;
                if *missing == 0 {
                    self.open.pop();
                }
                Some(parent)
            }
            None if id == 0 => None,
            None => return Err("node after the tree is complete".to_string()),
        };

        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        let num_children = kind.num_children();
        if num_children > 0 {
            self.open.push((id, num_children));
        }
        self.nodes.push(EfgNode {
            id,
            parent,
            kind,
            children: Vec::with_capacity(num_children),
        });
        Ok(())
    }

    fn finish(self) -> std::result::Result<Vec<EfgNode>, String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        if let Some((id, missing)) = self.open.last() {
            return Err(format!("node {} is missing {} children", id, missing));
        }
        Ok(self.nodes)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Word(String),
    Str(String),
    Open,
    Close,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(w) => write!(f, "'{}'", w),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Open => write!(f, "'{{'"),
            Token::Close => write!(f, "'}}'"),
        }
    }
}

/// Tokenizer with one token of lookahead.
struct Tokens<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    peeked: Option<Token>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            peeked: None,
        }
    }

    fn error(&self, message: &str) -> GameError {
        GameError::Parse {
            line: self.line,
            message: message.to_string(),
        }
    }

    fn read(&mut self) -> Result<Option<Token>> {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                self.line += 1;
            }
            if !c.is_whitespace() {
                break;
            }
            self.chars.next();
        }

        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok(None),
        };
        match c {
            '{' => Ok(Some(Token::Open)),
            '}' => Ok(Some(Token::Close)),
            '"' => self.read_string().map(|s| Some(Token::Str(s))),
            _ => {
                let mut word = c.to_string();
                while let Some(&next) = self.chars.peek() {
                    if next.is_whitespace() || matches!(next, '{' | '}' | '"') {
                        break;
                    }
                    word.push(next);
                    self.chars.next();
                }
                Ok(Some(Token::Word(word)))
            }
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                None => return Err(self.error("unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => match self.chars.next() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => {
                        return Err(self.error(&format!("unknown escape '\\{}'", c)));
                    }
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    out.push(c);
                }
            }
        }
    }

    fn next(&mut self) -> Result<Option<Token>> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.read(),
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>> {
        if self.peeked.is_none() {
            self.peeked = self.read()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn peek_is_string(&mut self) -> Result<bool> {
        Ok(matches!(self.peek()?, Some(Token::Str(_))))
    }

    fn peek_is_open(&mut self) -> Result<bool> {
        Ok(matches!(self.peek()?, Some(Token::Open)))
    }

    /// True before a `}` or at the end of input.
    fn at_close(&mut self) -> Result<bool> {
        Ok(matches!(self.peek()?, Some(Token::Close) | None))
    }

    fn required(&mut self) -> Result<Token> {
        self.next()?.ok_or_else(|| self.error("unexpected end of input"))
    }

    fn expect_word(&mut self, expected: &str) -> Result<()> {
        match self.required()? {
            Token::Word(w) if w == expected => Ok(()),
            other => Err(self.error(&format!("expected '{}', found {}", expected, other))),
        }
    }

    fn expect_open(&mut self) -> Result<()> {
        match self.required()? {
            Token::Open => Ok(()),
            other => Err(self.error(&format!("expected '{{', found {}", other))),
        }
    }

    fn expect_close(&mut self) -> Result<()> {
        match self.required()? {
            Token::Close => Ok(()),
            other => Err(self.error(&format!("expected '}}', found {}", other))),
        }
    }

    fn skip_comma(&mut self) -> Result<()> {
        if matches!(self.peek()?, Some(Token::Word(w)) if w == ",") {
            self.peeked = None;
        }
        Ok(())
    }

    fn string(&mut self) -> Result<String> {
        match self.required()? {
            Token::Str(s) => Ok(s),
            other => Err(self.error(&format!("expected string, found {}", other))),
        }
    }

    fn string_list(&mut self) -> Result<Vec<String>> {
        self.expect_open()?;
        let mut items = Vec::new();
        while !self.at_close()? {
            items.push(self.string()?);
        }
        self.expect_close()?;
        Ok(items)
    }

    fn word(&mut self) -> Result<String> {
        match self.required()? {
            Token::Word(w) => Ok(w),
            other => Err(self.error(&format!("expected number, found {}", other))),
        }
    }

    fn number<T: std::str::FromStr>(&mut self) -> Result<T> {
        let word = self.word()?;
        word.parse()
            .map_err(|_| self.error(&format!("invalid number '{}'", word)))
    }

    /// A decimal or a rational `p/q`.
    fn real(&mut self) -> Result<f64> {
        let word = self.word()?.trim_end_matches(',').to_string();
        let parsed = match word.split_once('/') {
            Some((num, den)) => num
                .parse::<f64>()
                .and_then(|n| den.parse::<f64>().map(|d| n / d)),
            None => word.parse::<f64>(),
        };
        parsed.map_err(|_| self.error(&format!("invalid number '{}'", word)))
    }
}
