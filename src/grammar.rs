//! Fractal grammar engine: weighted L-system production rules and string
//! rewriting.

use crate::error::GenError;
use crate::turtle::{TurtleOp, TurtleProgram};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// One weighted replacement branch for a stochastic symbol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Production {
    /// Probability mass of this branch. Branches of one symbol sum to 1.
    pub weight: f32,
    /// The string substituted for the symbol.
    pub replacement: String,
}

/// Per-symbol production rules.
///
/// Deterministic symbols carry a single branch with weight 1. Symbols with no
/// rule are copied through unchanged if they are registered terminals (turtle
/// control/draw symbols such as `[`, `]`, `+`), and dropped with a warning
/// otherwise.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleTable {
    rules: HashMap<char, Vec<Production>>,
    terminals: BTreeSet<char>,
}

/// Weight mismatch tolerated when validating that branch weights sum to 1.
const WEIGHT_EPSILON: f32 = 1e-4;

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a deterministic rule `symbol -> replacement`.
    pub fn insert(&mut self, symbol: char, replacement: &str) {
        self.rules.insert(
            symbol,
            vec![Production {
                weight: 1.0,
                replacement: replacement.to_owned(),
            }],
        );
    }

    /// Inserts a stochastic rule with weighted branches.
    ///
    /// The weights must partition [0, 1): they are validated to sum to 1
    /// up front, so branch selection can use sequential cumulative cutoffs
    /// without an unreachable tail.
    pub fn insert_weighted(
        &mut self,
        symbol: char,
        branches: &[(f32, &str)],
    ) -> Result<(), GenError> {
        let total: f32 = branches.iter().map(|(w, _)| w).sum();
        if (total - 1.0).abs() > WEIGHT_EPSILON {
            return Err(GenError::InvalidRuleWeights { symbol, total });
        }
        self.rules.insert(
            symbol,
            branches
                .iter()
                .map(|(weight, replacement)| Production {
                    weight: *weight,
                    replacement: (*replacement).to_owned(),
                })
                .collect(),
        );
        Ok(())
    }

    /// Registers symbols that have no production but survive rewriting
    /// unchanged (the turtle's control and draw alphabet).
    pub fn mark_terminals(&mut self, symbols: &str) {
        self.terminals.extend(symbols.chars());
    }

    /// Whether `symbol` is copied through when it has no production.
    pub fn is_terminal(&self, symbol: char) -> bool {
        self.terminals.contains(&symbol)
    }

    /// Selects a replacement for `symbol`, drawing fresh randomness for
    /// stochastic symbols. Returns `None` when the symbol has no rule.
    ///
    /// Selection walks the cumulative weight intervals with sequential
    /// cutoffs (`r < acc`). Floating-point rounding can leave a sliver above
    /// the last cutoff; the final branch owns it.
    fn replace(&self, symbol: char, rng: &mut impl Rng) -> Option<&str> {
        let branches = self.rules.get(&symbol)?;
        if branches.len() == 1 {
            return Some(&branches[0].replacement);
        }
        let r: f32 = rng.random();
        let mut acc = 0.0;
        for branch in branches {
            acc += branch.weight;
            if r < acc {
                return Some(&branch.replacement);
            }
        }
        branches.last().map(|b| b.replacement.as_str())
    }
}

/// Hard caps guarding against combinatorial string blow-up.
///
/// Expansion is exponential per iteration, so both the iteration count and
/// the rewritten length are bounded; exceeding either is an error, not a
/// truncation.
#[derive(Clone, Copy, Debug)]
pub struct ExpansionLimits {
    pub max_iterations: u32,
    pub max_len: usize,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_iterations: 12,
            max_len: 1_000_000,
        }
    }
}

/// Rewrites `axiom` for `iterations` rounds under `table`.
///
/// `iterations == 0` returns the axiom unchanged. Deterministic symbols always
/// expand identically; stochastic symbols draw fresh randomness on every
/// occurrence in every iteration. Symbols with neither a rule nor a terminal
/// registration are dropped (see DESIGN.md for the rationale).
pub fn expand(
    axiom: &str,
    iterations: u32,
    table: &RuleTable,
    limits: &ExpansionLimits,
    rng: &mut impl Rng,
) -> Result<String, GenError> {
    if iterations > limits.max_iterations {
        return Err(GenError::IterationLimit {
            requested: iterations,
            max: limits.max_iterations,
        });
    }
    expand_step(axiom.to_owned(), iterations, table, limits, rng)
}

fn expand_step(
    sequence: String,
    iterations: u32,
    table: &RuleTable,
    limits: &ExpansionLimits,
    rng: &mut impl Rng,
) -> Result<String, GenError> {
    if iterations == 0 {
        return Ok(sequence);
    }

    let mut next = String::with_capacity(sequence.len() * 2);
    for symbol in sequence.chars() {
        match table.replace(symbol, rng) {
            Some(replacement) => next.push_str(replacement),
            None if table.is_terminal(symbol) => next.push(symbol),
            None => warn!(%symbol, "dropping symbol with no production or terminal meaning"),
        }
    }
    if next.len() > limits.max_len {
        return Err(GenError::ExpansionTooLarge {
            len: next.len(),
            max: limits.max_len,
        });
    }
    debug!(remaining = iterations - 1, len = next.len(), "expanded");

    expand_step(next, iterations - 1, table, limits, rng)
}

/// The built-in tree grammars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeKind {
    /// Deterministic ternary tree; brackets turn as well as branch.
    Trinary,
    /// Stochastic Barnsley fern-tree.
    Barnsley,
    /// Stochastic pine with whorled branches and leaf-scale symbols.
    Pine,
}

impl TreeKind {
    /// The grammar's start string.
    pub fn axiom(&self) -> &'static str {
        match self {
            TreeKind::Trinary => "0",
            TreeKind::Barnsley => "t",
            TreeKind::Pine => "t",
        }
    }

    /// The grammar's production rules.
    pub fn rules(&self) -> Result<RuleTable, GenError> {
        let mut table = RuleTable::new();
        match self {
            TreeKind::Trinary => {
                table.insert('0', "1[0]0");
                table.insert('1', "11");
                table.mark_terminals("[]");
            }
            TreeKind::Barnsley => {
                table.insert('1', "11");
                table.insert_weighted(
                    't',
                    &[(0.85, "1[+t]-1[-1t]+t"), (0.15, "1[+t]-t")],
                )?;
                table.mark_terminals("[]+-");
            }
            TreeKind::Pine => {
                table.insert('1', "11");
                table.insert_weighted(
                    't',
                    &[(0.7, "1[^*t][<*t][+*t][-*t]/t"), (0.3, "1[^*t][<*t]/t")],
                )?;
                table.mark_terminals("[]+-^<>*/");
            }
        }
        Ok(table)
    }

    /// The turtle program interpreting this grammar's alphabet.
    pub fn program(&self) -> TurtleProgram {
        let mut program = TurtleProgram::standard();
        match self {
            TreeKind::Trinary => {
                // The trinary brackets carry the turns: push-left, pop-right.
                program.bind('0', [TurtleOp::DrawLeaf]);
                program.bind('1', [TurtleOp::Draw]);
                program.bind('[', [TurtleOp::Push, TurtleOp::Yaw(1.0)]);
                program.bind(']', [TurtleOp::Pop, TurtleOp::Yaw(-1.0)]);
            }
            TreeKind::Barnsley => {
                program.bind('1', [TurtleOp::Draw]);
                program.bind('t', [TurtleOp::DrawLeaf]);
            }
            TreeKind::Pine => {
                program.bind('1', [TurtleOp::Draw]);
                program.bind('t', [TurtleOp::DrawLeaf]);
                // In the pine variant `*` shrinks the needles instead of
                // tightening the turn angle.
                program.bind('*', [TurtleOp::ScaleLeaf(0.8)]);
            }
        }
        program
    }

    /// Per-grammar branch decay applied on push.
    pub fn push_decay(&self) -> f32 {
        match self {
            TreeKind::Trinary | TreeKind::Barnsley => 0.9,
            TreeKind::Pine => 0.85,
        }
    }
}
