//! Turtle state and per-symbol operations.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::PI;

/// The full state of the drawing turtle.
///
/// This is the exact record snapshotted on `[` and restored on `]`. It is a
/// named struct rather than a positional tuple so that the snapshot shape can
/// grow (new grammar variants add fields) without silently reordering state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the cursor.
    pub position: Vec3,

    /// Current orientation as Euler angles (radians, XYZ order).
    pub orientation: Vec3,

    /// Orientation at the previous draw. Segment endpoints are averaged
    /// between this and the current orientation so consecutive branches join
    /// without gaps.
    pub prev_orientation: Vec3,

    /// Length of the next branch segment along the local Y axis.
    pub branch_length: f32,

    /// Thickness scale of the next branch segment (X/Z axes).
    pub branch_girth: f32,

    /// Multiplier applied to the leaf-size vector for the next leaf.
    pub leaf_scale: f32,

    /// Magnitude of the next yaw turn, in radians.
    pub turn_angle: f32,

    /// Magnitude of the next pitch/roll turn, in radians.
    pub secondary_angle: f32,

    /// Base extents of a leaf card before `leaf_scale` is applied.
    pub leaf_size: Vec3,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            prev_orientation: Vec3::ZERO,
            branch_length: 4.0,
            branch_girth: 1.0,
            leaf_scale: 1.0,
            turn_angle: PI / 4.0,
            secondary_angle: PI / 6.0,
            leaf_size: Vec3::new(2.0, 2.0, 0.25),
        }
    }
}

impl TurtleState {
    /// Current orientation as a quaternion.
    pub fn orientation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.orientation.x,
            self.orientation.y,
            self.orientation.z,
        )
    }

    /// Previous-draw orientation as a quaternion.
    pub fn prev_orientation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.prev_orientation.x,
            self.prev_orientation.y,
            self.prev_orientation.z,
        )
    }

    /// Adds `sign * turn_angle` to the Z Euler component.
    pub fn yaw(&mut self, sign: f32) {
        self.orientation.z += sign * self.turn_angle;
    }

    /// Adds `sign * secondary_angle` to the X Euler component.
    pub fn pitch(&mut self, sign: f32) {
        self.orientation.x += sign * self.secondary_angle;
    }

    /// Adds `sign * secondary_angle` to the Y Euler component.
    pub fn roll(&mut self, sign: f32) {
        self.orientation.y += sign * self.secondary_angle;
    }
}

/// Operations the turtle can perform for one symbol.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TurtleOp {
    /// Emit a branch segment and advance (`1`).
    Draw,
    /// Emit a branch segment, a terminal leaf, and advance (`0`, `t`).
    DrawLeaf,
    /// Turn around Z by `sign * turn_angle` (`+` / `-`).
    Yaw(f32),
    /// Turn around X by `sign * secondary_angle` (`^`).
    Pitch(f32),
    /// Turn around Y by `sign * secondary_angle` (`<` / `>`).
    Roll(f32),
    /// Multiply the turn-angle magnitude; no immediate rotation (`*`).
    ScaleAngle(f32),
    /// Multiply the leaf scale by a fixed growth/shrink factor (`/`, pine `*`).
    ScaleLeaf(f32),
    /// Snapshot the full state, then decay branch length and girth (`[`).
    Push,
    /// Restore the most recent snapshot verbatim (`]`).
    Pop,
    /// Symbol has no drawing meaning.
    Ignore,
}

/// Mapping from grammar symbols to turtle op sequences.
///
/// A symbol maps to a short *sequence* of ops, not a single op: the trinary
/// grammar's `[` both pushes and turns, and its `]` both pops and turns back.
#[derive(Clone, Debug, Default)]
pub struct TurtleProgram {
    ops: HashMap<char, Vec<TurtleOp>>,
}

impl TurtleProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the conventional meanings of the shared symbol alphabet.
    ///
    /// Grammar presets start from this and override what they redefine
    /// (e.g. pine rebinds `*` to a leaf-shrink).
    pub fn standard() -> Self {
        let mut program = Self::new();
        program.bind('+', [TurtleOp::Yaw(1.0)]);
        program.bind('-', [TurtleOp::Yaw(-1.0)]);
        program.bind('^', [TurtleOp::Pitch(1.0)]);
        program.bind('<', [TurtleOp::Roll(1.0)]);
        program.bind('>', [TurtleOp::Roll(-1.0)]);
        program.bind('*', [TurtleOp::ScaleAngle(0.9)]);
        program.bind('/', [TurtleOp::ScaleLeaf(1.15)]);
        program.bind('[', [TurtleOp::Push]);
        program.bind(']', [TurtleOp::Pop]);
        program
    }

    /// Assigns the op sequence executed for `symbol`, replacing any previous
    /// binding.
    pub fn bind(&mut self, symbol: char, ops: impl Into<Vec<TurtleOp>>) {
        self.ops.insert(symbol, ops.into());
    }

    /// The ops bound to `symbol`; empty if the symbol is unbound.
    pub fn ops_for(&self, symbol: char) -> &[TurtleOp] {
        self.ops.get(&symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `symbol` has any binding at all.
    pub fn knows(&self, symbol: char) -> bool {
        self.ops.contains_key(&symbol)
    }
}
