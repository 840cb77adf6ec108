//! Interpreter that walks an expanded symbol string and emits a
//! [`TreeBlueprint`].
//!
//! The entry point is [`Interpreter`]. Configure it with a [`TurtleConfig`]
//! and a [`TurtleProgram`] (usually from [`TreeKind::program`]), then call
//! [`Interpreter::interpret`] with the expanded string. [`generate_tree`]
//! composes grammar expansion and interpretation in one call.

use crate::blueprint::{Segment, SegmentKind, TreeBlueprint};
use crate::error::GenError;
use crate::grammar::{ExpansionLimits, TreeKind, expand};
use crate::turtle::{TurtleOp, TurtleProgram, TurtleState};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::PI;
use tracing::{debug, warn};

/// Configuration for turtle interpretation.
#[derive(Clone, Debug)]
pub struct TurtleConfig {
    /// Length of a trunk-level branch segment.
    pub branch_length: f32,
    /// Thickness of a trunk-level branch segment.
    pub branch_girth: f32,
    /// Base extents of a leaf card.
    pub leaf_size: Vec3,
    /// Yaw step (radians) for `+` / `-`.
    pub turn_angle: f32,
    /// Pitch/roll step (radians) for `^`, `<`, `>`.
    pub secondary_angle: f32,
    /// Factor applied to branch length and girth on each push.
    pub push_decay: f32,
    /// Maximum snapshot stack depth.
    pub max_stack_depth: usize,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            branch_length: 4.0,
            branch_girth: 1.0,
            leaf_size: Vec3::new(2.0, 2.0, 0.25),
            turn_angle: PI / 4.0,
            secondary_angle: PI / 6.0,
            push_decay: 0.9,
            max_stack_depth: 1024,
        }
    }
}

/// Interprets expanded L-system strings as placed tree geometry.
pub struct Interpreter {
    program: TurtleProgram,
    config: TurtleConfig,
}

impl Interpreter {
    pub fn new(program: TurtleProgram, config: TurtleConfig) -> Self {
        Self { program, config }
    }

    /// Walks `symbols` left to right once and returns the emitted segments.
    ///
    /// Interpretation is fully deterministic: all randomness happens during
    /// grammar expansion. Each draw symbol emits exactly one branch segment;
    /// each terminal draw additionally emits one leaf segment.
    ///
    /// # Segment placement
    ///
    /// A draw advances the cursor by half a branch length along the *current*
    /// orientation plus half a branch length along the orientation at the
    /// *previous* draw. Averaging the two half-steps keeps consecutive
    /// segments joined even when turns happened in between.
    ///
    /// # Errors
    ///
    /// A `]` with no matching `[` aborts with [`GenError::UnbalancedPop`];
    /// pushing past the configured stack depth aborts with
    /// [`GenError::StackOverflow`].
    pub fn interpret(&self, symbols: &str) -> Result<TreeBlueprint, GenError> {
        let mut blueprint = TreeBlueprint::new();
        let mut turtle = TurtleState {
            branch_length: self.config.branch_length,
            branch_girth: self.config.branch_girth,
            turn_angle: self.config.turn_angle,
            secondary_angle: self.config.secondary_angle,
            leaf_size: self.config.leaf_size,
            ..Default::default()
        };
        let mut stack: Vec<TurtleState> = Vec::new();

        for (index, symbol) in symbols.chars().enumerate() {
            if !self.program.knows(symbol) {
                warn!(%symbol, index, "ignoring symbol with no turtle meaning");
                continue;
            }
            for op in self.program.ops_for(symbol) {
                match op {
                    TurtleOp::Draw => self.draw(&mut turtle, &mut blueprint, false),
                    TurtleOp::DrawLeaf => self.draw(&mut turtle, &mut blueprint, true),

                    TurtleOp::Yaw(sign) => turtle.yaw(*sign),
                    TurtleOp::Pitch(sign) => turtle.pitch(*sign),
                    TurtleOp::Roll(sign) => turtle.roll(*sign),

                    TurtleOp::ScaleAngle(factor) => turtle.turn_angle *= factor,
                    TurtleOp::ScaleLeaf(factor) => turtle.leaf_scale *= factor,

                    TurtleOp::Push => {
                        if stack.len() >= self.config.max_stack_depth {
                            return Err(GenError::StackOverflow {
                                index,
                                max_depth: self.config.max_stack_depth,
                            });
                        }
                        stack.push(turtle.clone());
                        // Branches narrow and shorten with depth.
                        turtle.branch_length *= self.config.push_decay;
                        turtle.branch_girth *= self.config.push_decay;
                    }
                    TurtleOp::Pop => {
                        turtle = stack.pop().ok_or(GenError::UnbalancedPop { index })?;
                    }

                    TurtleOp::Ignore => {}
                }
            }
        }

        debug!(
            branches = blueprint.branch_count(),
            leaves = blueprint.leaf_count(),
            "interpreted symbol string"
        );
        Ok(blueprint)
    }

    fn draw(&self, turtle: &mut TurtleState, blueprint: &mut TreeBlueprint, leaf: bool) {
        let half = Vec3::new(0.0, turtle.branch_length / 2.0, 0.0);
        let next = turtle.position
            + turtle.orientation_quat() * half
            + turtle.prev_orientation_quat() * half;

        blueprint.push_segment(Segment {
            position: next,
            rotation: turtle.orientation,
            scale: Vec3::new(
                turtle.branch_girth,
                turtle.branch_length,
                turtle.branch_girth,
            ),
            kind: SegmentKind::Branch,
        });

        if leaf {
            let tip = turtle.orientation_quat()
                * Vec3::new(0.0, turtle.leaf_size.y * turtle.leaf_scale / 2.0, 0.0);
            blueprint.push_segment(Segment {
                position: next + tip,
                rotation: turtle.orientation,
                scale: turtle.leaf_size * turtle.leaf_scale,
                kind: SegmentKind::Leaf,
            });
        }

        turtle.position = next;
        turtle.prev_orientation = turtle.orientation;
    }
}

/// Expands a built-in grammar and interprets the result in one call.
///
/// This is the renderer-facing tree entry point: pick a [`TreeKind`], an
/// iteration count, and turtle parameters, and get back placed segments.
pub fn generate_tree(
    kind: TreeKind,
    iterations: u32,
    config: &TurtleConfig,
    limits: &ExpansionLimits,
    rng: &mut impl Rng,
) -> Result<TreeBlueprint, GenError> {
    let table = kind.rules()?;
    let symbols = expand(kind.axiom(), iterations, &table, limits, rng)?;

    let mut config = config.clone();
    config.push_decay = kind.push_decay();
    Interpreter::new(kind.program(), config).interpret(&symbols)
}
