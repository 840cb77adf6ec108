//! Fractal terrain heightfield: recursive midpoint subdivision plus
//! neighbor-averaging smoothing.

use crate::error::GenError;
use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sentinel marking a cell the subdivision has not filled yet.
///
/// Real heights are non-negative in every configuration, so −1 is guaranteed
/// invalid; generation is complete only when no sentinel remains.
const UNSET: f32 = -1.0;

/// Elevation assigned to a seeded grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SeedHeight {
    /// A fixed elevation.
    Fixed(f32),
    /// A uniformly random integer elevation in `min..=max`.
    Random { min: i32, max: i32 },
}

/// An interior seed point: `(column, row, height)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedPoint {
    pub column: usize,
    pub row: usize,
    pub height: SeedHeight,
}

/// Configuration for heightfield generation.
#[derive(Clone, Debug)]
pub struct TerrainConfig {
    /// Grid side length; must be 2^k + 1.
    pub size: usize,
    /// Elevation of the four corner cells.
    pub corner_height: f32,
    /// Interior cells seeded before subdivision. Seeded centers are never
    /// overwritten by the fill.
    pub interior_seeds: Vec<SeedPoint>,
    /// Number of 3x3 neighbor-averaging passes after subdivision.
    pub smooth_passes: usize,
    /// Pin the boundary rows/columns back to `corner_height` after each
    /// smoothing pass, keeping the terrain edge flat.
    pub flatten_edges: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 33,
            corner_height: 0.0,
            interior_seeds: Vec::new(),
            smooth_passes: 1,
            flatten_edges: false,
        }
    }
}

/// A square grid of elevations, indexed `[column][row]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeightField {
    size: usize,
    cells: Vec<f32>,
}

/// Triangulated terrain data for the renderer.
///
/// The triangulation scheme is a fixed contract: per unit cell (i, j) the two
/// triangles are (i,j),(i+1,j),(i+1,j+1) and (i,j),(i+1,j+1),(i,j+1), with
/// UVs linearly proportional to grid position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainMesh {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl HeightField {
    /// Generates a heightfield: sentinel fill, corner and interior seeds,
    /// recursive subdivision, then smoothing.
    ///
    /// # Errors
    ///
    /// [`GenError::InvalidGridSize`] if `size` is not 2^k + 1, and
    /// [`GenError::SeedOutOfBounds`] if a seed names a cell outside the grid.
    pub fn generate(config: &TerrainConfig, rng: &mut impl Rng) -> Result<Self, GenError> {
        let size = config.size;
        if size < 3 || !(size - 1).is_power_of_two() {
            return Err(GenError::InvalidGridSize(size));
        }

        let mut field = Self {
            size,
            cells: vec![UNSET; size * size],
        };

        let last = size - 1;
        field.set(0, 0, config.corner_height);
        field.set(0, last, config.corner_height);
        field.set(last, 0, config.corner_height);
        field.set(last, last, config.corner_height);

        for seed in &config.interior_seeds {
            if seed.column >= size || seed.row >= size {
                return Err(GenError::SeedOutOfBounds {
                    column: seed.column,
                    row: seed.row,
                    size,
                });
            }
            let height = match seed.height {
                SeedHeight::Fixed(h) => h,
                SeedHeight::Random { min, max } => rng.random_range(min..=max) as f32,
            };
            field.set(seed.column, seed.row, height);
        }

        field.fill(0, last, 0, last);

        for _ in 0..config.smooth_passes {
            field.smooth_pass();
            if config.flatten_edges {
                field.pin_edges(config.corner_height);
            }
        }

        Ok(field)
    }

    /// Grid side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Elevation at grid cell `(column, row)`.
    pub fn height(&self, column: usize, row: usize) -> f32 {
        self.cells[column * self.size + row]
    }

    /// All cells in column-major order.
    pub fn heights(&self) -> &[f32] {
        &self.cells
    }

    fn set(&mut self, column: usize, row: usize, value: f32) {
        self.cells[column * self.size + row] = value;
    }

    /// Recursive corner-averaging subdivision over the extent
    /// `[top, bottom] x [left, right]`.
    ///
    /// The center becomes the average of the four corners unless it was
    /// seeded, in which case the seed is kept and propagated outward. Edge
    /// midpoints are pairwise corner averages. Recursion stops when the span
    /// has no integer midpoint left, which visits every cell exactly once
    /// from a full-extent start.
    fn fill(&mut self, top: usize, bottom: usize, left: usize, right: usize) {
        if bottom - top < 2 || right - left < 2 {
            return;
        }
        let mid_row = (top + bottom) / 2;
        let mid_col = (left + right) / 2;

        let top_left = self.height(left, top);
        let top_right = self.height(right, top);
        let bottom_left = self.height(left, bottom);
        let bottom_right = self.height(right, bottom);

        if self.height(mid_col, mid_row) == UNSET {
            let center = (top_left + top_right + bottom_left + bottom_right) / 4.0;
            self.set(mid_col, mid_row, center);
        }

        self.set(mid_col, top, (top_left + top_right) / 2.0);
        self.set(mid_col, bottom, (bottom_left + bottom_right) / 2.0);
        self.set(left, mid_row, (top_left + bottom_left) / 2.0);
        self.set(right, mid_row, (top_right + bottom_right) / 2.0);

        self.fill(top, mid_row, left, mid_col);
        self.fill(mid_row, bottom, left, mid_col);
        self.fill(top, mid_row, mid_col, right);
        self.fill(mid_row, bottom, mid_col, right);
    }

    /// One smoothing pass: every cell becomes the mean of itself and its
    /// in-bounds 8-connected neighbors. The pass reads a snapshot of the
    /// previous grid and writes a fresh buffer, so results do not depend on
    /// traversal order. Boundaries average over fewer neighbors; no wrapping.
    fn smooth_pass(&mut self) {
        let size = self.size as isize;
        let snapshot = self.cells.clone();
        for column in 0..size {
            for row in 0..size {
                let mut sum = 0.0;
                let mut count = 0.0;
                for dc in -1..=1 {
                    for dr in -1..=1 {
                        let c = column + dc;
                        let r = row + dr;
                        if c >= 0 && c < size && r >= 0 && r < size {
                            sum += snapshot[(c * size + r) as usize];
                            count += 1.0;
                        }
                    }
                }
                self.cells[(column * size + row) as usize] = sum / count;
            }
        }
    }

    fn pin_edges(&mut self, baseline: f32) {
        let last = self.size - 1;
        for i in 0..self.size {
            self.set(i, 0, baseline);
            self.set(i, last, baseline);
            self.set(0, i, baseline);
            self.set(last, i, baseline);
        }
    }

    /// Continuous elevation lookup at `(x, z)` in grid units.
    ///
    /// Interpolates over the four surrounding cells with inverse-distance
    /// weights: `w_i = 1 − d_i / Σd`, renormalized. A query landing exactly
    /// on a grid point returns that cell's height. Used to stand trees and
    /// the camera on the ground.
    ///
    /// # Errors
    ///
    /// [`GenError::QueryOutOfBounds`] for queries outside `[0, size − 1]` on
    /// either axis; out-of-range lookups are never clamped.
    pub fn height_at(&self, x: f32, z: f32) -> Result<f32, GenError> {
        let max = (self.size - 1) as f32;
        if !(0.0..=max).contains(&x) || !(0.0..=max).contains(&z) {
            return Err(GenError::QueryOutOfBounds { x, z });
        }

        let c0 = x.floor() as usize;
        let r0 = z.floor() as usize;
        let c1 = (c0 + 1).min(self.size - 1);
        let r1 = (r0 + 1).min(self.size - 1);

        let corners = [(c0, r0), (c1, r0), (c0, r1), (c1, r1)];
        let mut distances = [0.0f32; 4];
        let mut total = 0.0;
        for (i, (c, r)) in corners.iter().enumerate() {
            let d = Vec2::new(x - *c as f32, z - *r as f32).length();
            if d == 0.0 {
                return Ok(self.height(*c, *r));
            }
            distances[i] = d;
            total += d;
        }

        let mut weights = [0.0f32; 4];
        let mut weight_sum = 0.0;
        for i in 0..4 {
            weights[i] = 1.0 - distances[i] / total;
            weight_sum += weights[i];
        }

        let mut height = 0.0;
        for (i, (c, r)) in corners.iter().enumerate() {
            height += self.height(*c, *r) * weights[i] / weight_sum;
        }
        Ok(height)
    }

    /// Builds the renderer-facing triangulation.
    ///
    /// `cell_size` spaces the grid on the XZ plane; `height_scale` maps grid
    /// elevations to world Y (the scene renders heights at a tenth of their
    /// grid value).
    pub fn triangulate(&self, cell_size: f32, height_scale: f32) -> TerrainMesh {
        let size = self.size;
        let extent = (size - 1) as f32;

        let mut positions = Vec::with_capacity(size * size);
        let mut uvs = Vec::with_capacity(size * size);
        for column in 0..size {
            for row in 0..size {
                positions.push(Vec3::new(
                    column as f32 * cell_size,
                    self.height(column, row) * height_scale,
                    row as f32 * cell_size,
                ));
                uvs.push(Vec2::new(column as f32 / extent, row as f32 / extent));
            }
        }

        let vertex = |column: usize, row: usize| (column * size + row) as u32;
        let mut indices = Vec::with_capacity((size - 1) * (size - 1) * 6);
        for i in 0..size - 1 {
            for j in 0..size - 1 {
                indices.extend_from_slice(&[
                    vertex(i, j),
                    vertex(i + 1, j),
                    vertex(i + 1, j + 1),
                ]);
                indices.extend_from_slice(&[
                    vertex(i, j),
                    vertex(i + 1, j + 1),
                    vertex(i, j + 1),
                ]);
            }
        }

        TerrainMesh {
            positions,
            uvs,
            indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn peak_config(smooth_passes: usize) -> TerrainConfig {
        TerrainConfig {
            size: 33,
            corner_height: 0.0,
            interior_seeds: vec![SeedPoint {
                column: 16,
                row: 16,
                height: SeedHeight::Fixed(75.0),
            }],
            smooth_passes,
            flatten_edges: false,
        }
    }

    fn variance(field: &HeightField) -> f64 {
        let n = field.heights().len() as f64;
        let mean = field.heights().iter().map(|&h| h as f64).sum::<f64>() / n;
        field
            .heights()
            .iter()
            .map(|&h| (h as f64 - mean).powi(2))
            .sum::<f64>()
            / n
    }

    #[test]
    fn rejects_invalid_sizes() {
        for size in [0, 1, 2, 4, 6, 32] {
            let config = TerrainConfig {
                size,
                ..Default::default()
            };
            assert_eq!(
                HeightField::generate(&config, &mut rng()).unwrap_err(),
                GenError::InvalidGridSize(size)
            );
        }
    }

    #[test]
    fn rejects_out_of_bounds_seeds() {
        let config = TerrainConfig {
            size: 5,
            interior_seeds: vec![SeedPoint {
                column: 5,
                row: 2,
                height: SeedHeight::Fixed(1.0),
            }],
            ..Default::default()
        };
        assert_eq!(
            HeightField::generate(&config, &mut rng()).unwrap_err(),
            GenError::SeedOutOfBounds {
                column: 5,
                row: 2,
                size: 5
            }
        );
    }

    #[test]
    fn seeded_center_survives_subdivision() {
        let config = TerrainConfig {
            size: 5,
            corner_height: 0.0,
            interior_seeds: vec![SeedPoint {
                column: 2,
                row: 2,
                height: SeedHeight::Fixed(75.0),
            }],
            smooth_passes: 0,
            flatten_edges: false,
        };
        let field = HeightField::generate(&config, &mut rng()).unwrap();

        assert_eq!(field.height(2, 2), 75.0);
        // Edge midpoints are pure corner averages of zero corners.
        assert_eq!(field.height(0, 2), 0.0);
        assert_eq!(field.height(4, 2), 0.0);
        assert_eq!(field.height(2, 0), 0.0);
        assert_eq!(field.height(2, 4), 0.0);
        // Quadrant centers average one 75 corner against three zeros.
        assert_eq!(field.height(1, 1), 18.75);
        assert_eq!(field.height(3, 3), 18.75);
        // Interior edge midpoints split the peak in half.
        assert_eq!(field.height(1, 2), 37.5);
        assert_eq!(field.height(2, 1), 37.5);
    }

    #[test]
    fn subdivision_fills_every_cell() {
        let field = HeightField::generate(&peak_config(0), &mut rng()).unwrap();
        assert!(field.heights().iter().all(|&h| h != UNSET));
    }

    #[test]
    fn corners_keep_the_seed_value() {
        let field = HeightField::generate(&peak_config(0), &mut rng()).unwrap();
        let last = field.size() - 1;
        assert_eq!(field.height(0, 0), 0.0);
        assert_eq!(field.height(0, last), 0.0);
        assert_eq!(field.height(last, 0), 0.0);
        assert_eq!(field.height(last, last), 0.0);
    }

    #[test]
    fn smoothing_reduces_variance() {
        let rough = HeightField::generate(&peak_config(0), &mut rng()).unwrap();
        let mut previous = variance(&rough);
        for passes in 1..4 {
            let field = HeightField::generate(&peak_config(passes), &mut rng()).unwrap();
            let current = variance(&field);
            assert!(
                current <= previous,
                "pass {passes} raised variance: {current} > {previous}"
            );
            previous = current;
        }
    }

    #[test]
    fn zero_smoothing_passes_is_a_no_op() {
        let config = peak_config(0);
        let a = HeightField::generate(&config, &mut rng()).unwrap();
        let b = HeightField::generate(&config, &mut rng()).unwrap();
        assert_eq!(a.heights(), b.heights());
    }

    #[test]
    fn flattened_edges_are_pinned_to_baseline() {
        let mut config = peak_config(2);
        config.flatten_edges = true;
        let field = HeightField::generate(&config, &mut rng()).unwrap();
        let last = field.size() - 1;
        for i in 0..field.size() {
            assert_eq!(field.height(i, 0), 0.0);
            assert_eq!(field.height(i, last), 0.0);
            assert_eq!(field.height(0, i), 0.0);
            assert_eq!(field.height(last, i), 0.0);
        }
    }

    #[test]
    fn height_at_exact_grid_point() {
        let config = TerrainConfig {
            size: 5,
            interior_seeds: vec![SeedPoint {
                column: 2,
                row: 2,
                height: SeedHeight::Fixed(75.0),
            }],
            smooth_passes: 0,
            ..Default::default()
        };
        let field = HeightField::generate(&config, &mut rng()).unwrap();
        assert_eq!(field.height_at(2.0, 2.0).unwrap(), 75.0);
        assert_eq!(field.height_at(0.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn height_at_cell_center_averages_equidistant_corners() {
        let config = TerrainConfig {
            size: 5,
            interior_seeds: vec![SeedPoint {
                column: 2,
                row: 2,
                height: SeedHeight::Fixed(75.0),
            }],
            smooth_passes: 0,
            ..Default::default()
        };
        let field = HeightField::generate(&config, &mut rng()).unwrap();
        // All four corners of the (1,1) cell are equidistant from its center,
        // so the lookup degenerates to their mean.
        let expected = (field.height(1, 1)
            + field.height(2, 1)
            + field.height(1, 2)
            + field.height(2, 2))
            / 4.0;
        let got = field.height_at(1.5, 1.5).unwrap();
        assert!((got - expected).abs() < 1e-4, "{got} vs {expected}");
    }

    #[test]
    fn height_at_rejects_out_of_range_queries() {
        let field = HeightField::generate(&peak_config(0), &mut rng()).unwrap();
        assert!(matches!(
            field.height_at(-0.5, 1.0),
            Err(GenError::QueryOutOfBounds { .. })
        ));
        assert!(matches!(
            field.height_at(1.0, 33.0),
            Err(GenError::QueryOutOfBounds { .. })
        ));
    }

    #[test]
    fn triangulation_layout_is_fixed() {
        let config = TerrainConfig {
            size: 3,
            smooth_passes: 0,
            ..Default::default()
        };
        let field = HeightField::generate(&config, &mut rng()).unwrap();
        let mesh = field.triangulate(1.0, 1.0);

        assert_eq!(mesh.positions.len(), 9);
        assert_eq!(mesh.uvs.len(), 9);
        // 2x2 cells, two triangles each.
        assert_eq!(mesh.indices.len(), 24);

        // First cell: (0,0),(1,0),(1,1) then (0,0),(1,1),(0,1), with vertex
        // index column * size + row.
        assert_eq!(&mesh.indices[0..6], &[0, 3, 4, 0, 4, 1]);
        assert_eq!(mesh.uvs[4], Vec2::new(0.5, 0.5));
        assert_eq!(mesh.positions[3].x, 1.0);
        assert_eq!(mesh.positions[3].z, 0.0);
    }

    #[test]
    fn random_seeds_draw_from_the_configured_range() {
        let config = TerrainConfig {
            size: 9,
            interior_seeds: vec![SeedPoint {
                column: 4,
                row: 4,
                height: SeedHeight::Random { min: 40, max: 80 },
            }],
            smooth_passes: 0,
            ..Default::default()
        };
        let field = HeightField::generate(&config, &mut rng()).unwrap();
        let peak = field.height(4, 4);
        assert!((40.0..=80.0).contains(&peak));
        assert_eq!(peak.fract(), 0.0);
    }
}
