use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// What a placed segment represents to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// A branch primitive aligned along its local Y axis.
    Branch,
    /// A terminal leaf card placed past the end of its branch.
    Leaf,
}

/// A single drawable primitive emitted by the turtle.
///
/// Segments are plain placement data: the consuming renderer decides what mesh
/// to instance at each one. Rotation is stored as per-axis Euler angles in
/// radians (applied in intrinsic XYZ order) because the grammars mutate the
/// three axes independently.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// World-space position of the segment's center.
    pub position: Vec3,

    /// Euler angles (radians, XYZ order).
    pub rotation: Vec3,

    /// Per-axis scale. For branches, Y is the branch length and X/Z the girth.
    pub scale: Vec3,

    /// Branch or leaf.
    pub kind: SegmentKind,
}

impl Segment {
    /// The segment's rotation as a quaternion, for renderers that want one.
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }
}

/// The complete, engine-agnostic output of one tree generation run.
///
/// An ordered, append-only list of segments in the order the turtle emitted
/// them (parents before their subtrees, siblings left to right).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TreeBlueprint {
    /// All placed segments of the tree.
    pub segments: Vec<Segment>,
}

impl TreeBlueprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Number of branch segments.
    pub fn branch_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Branch)
            .count()
    }

    /// Number of leaf segments.
    pub fn leaf_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Leaf)
            .count()
    }
}
