//! Scene composition: a terrain plus ground-aligned trees, as plain data.
//!
//! This is the hand-off point to the excluded rendering layer: everything a
//! renderer needs to build the walkable scene (a triangulatable heightfield
//! and placed tree blueprints), with no rendering, lighting, or input state.

use crate::blueprint::TreeBlueprint;
use crate::error::GenError;
use crate::grammar::{ExpansionLimits, TreeKind};
use crate::interpreter::{TurtleConfig, generate_tree};
use crate::terrain::{HeightField, SeedHeight, SeedPoint, TerrainConfig};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One tree standing on the terrain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreePlacement {
    pub kind: TreeKind,
    /// World-space position of the tree's root, on the ground.
    pub position: Vec3,
    pub blueprint: TreeBlueprint,
}

/// A generated forest scene: terrain plus placed trees.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Forest {
    pub terrain: HeightField,
    pub trees: Vec<TreePlacement>,
}

/// Configuration for forest composition.
#[derive(Clone, Debug)]
pub struct ForestConfig {
    pub terrain: TerrainConfig,
    /// Number of trees scattered over the terrain.
    pub tree_count: usize,
    /// Grammar iterations per tree.
    pub iterations: u32,
    pub turtle: TurtleConfig,
    pub limits: ExpansionLimits,
    /// World-space spacing of one grid cell on the XZ plane.
    pub cell_size: f32,
    /// World Y per unit of grid elevation.
    pub height_scale: f32,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            terrain: rolling_terrain(),
            tree_count: 24,
            iterations: 4,
            turtle: TurtleConfig::default(),
            limits: ExpansionLimits::default(),
            cell_size: 1.0,
            height_scale: 0.1,
        }
    }
}

/// The default 33x33 terrain: flat zero corners, a tall center peak, and a
/// low hill near one corner.
fn rolling_terrain() -> TerrainConfig {
    let fixed = |column, row, height| SeedPoint {
        column,
        row,
        height: SeedHeight::Fixed(height),
    };
    TerrainConfig {
        size: 33,
        corner_height: 0.0,
        interior_seeds: vec![
            fixed(16, 16, 75.0),
            fixed(3, 3, 50.0),
            fixed(2, 3, 50.0),
            fixed(4, 3, 50.0),
            fixed(3, 4, 50.0),
            fixed(3, 2, 50.0),
            fixed(4, 4, 50.0),
        ],
        smooth_passes: 1,
        flatten_edges: false,
    }
}

/// Generates the terrain and scatters ground-aligned trees on it.
///
/// Each tree picks a random grammar, a random grid position, and stands at
/// the interpolated ground height there. Tree generation runs are fully
/// independent; only the shared `rng` sequences them.
pub fn generate_forest(config: &ForestConfig, rng: &mut impl Rng) -> Result<Forest, GenError> {
    let terrain = HeightField::generate(&config.terrain, rng)?;
    let extent = (terrain.size() - 1) as f32;

    let mut trees = Vec::with_capacity(config.tree_count);
    for _ in 0..config.tree_count {
        let kind = match rng.random_range(0..3) {
            0 => TreeKind::Trinary,
            1 => TreeKind::Barnsley,
            _ => TreeKind::Pine,
        };
        let x = rng.random_range(0.0..=extent);
        let z = rng.random_range(0.0..=extent);
        let ground = terrain.height_at(x, z)?;

        let blueprint = generate_tree(kind, config.iterations, &config.turtle, &config.limits, rng)?;
        trees.push(TreePlacement {
            kind,
            position: Vec3::new(
                x * config.cell_size,
                ground * config.height_scale,
                z * config.cell_size,
            ),
            blueprint,
        });
    }

    debug!(trees = trees.len(), size = terrain.size(), "composed forest");
    Ok(Forest { terrain, trees })
}
