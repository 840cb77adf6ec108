// tests/forest_scene.rs
use forest_gen::{ForestConfig, HeightField, generate_forest};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn default_scene_composes_terrain_and_trees() {
    let config = ForestConfig::default();
    let mut rng = StdRng::seed_from_u64(2024);
    let forest = generate_forest(&config, &mut rng).unwrap();

    assert_eq!(forest.terrain.size(), 33);
    assert_eq!(forest.trees.len(), config.tree_count);

    // The default scene seeds a 75-high center peak; smoothing spreads it
    // but the middle of the map stays the high ground.
    let center = forest.terrain.height(16, 16);
    assert!(center > forest.terrain.height(8, 8));
    assert!(center > forest.terrain.height(24, 24));

    let extent = (forest.terrain.size() - 1) as f32 * config.cell_size;
    let max_ground = forest
        .terrain
        .heights()
        .iter()
        .fold(f32::MIN, |a, &b| a.max(b))
        * config.height_scale;
    for tree in &forest.trees {
        assert!(!tree.blueprint.segments.is_empty());
        assert!((0.0..=extent).contains(&tree.position.x));
        assert!((0.0..=extent).contains(&tree.position.z));
        // Roots sit on the interpolated ground, never above the highest cell.
        assert!(tree.position.y >= 0.0 && tree.position.y <= max_ground);
    }
}

#[test]
fn forest_generation_is_reproducible() {
    let config = ForestConfig::default();
    let mut rng_a = StdRng::seed_from_u64(7);
    let mut rng_b = StdRng::seed_from_u64(7);

    let a = generate_forest(&config, &mut rng_a).unwrap();
    let b = generate_forest(&config, &mut rng_b).unwrap();

    assert_eq!(a.terrain.heights(), b.terrain.heights());
    assert_eq!(a.trees.len(), b.trees.len());
    for (ta, tb) in a.trees.iter().zip(&b.trees) {
        assert_eq!(ta.kind, tb.kind);
        assert_eq!(ta.position, tb.position);
        assert_eq!(ta.blueprint.segments, tb.blueprint.segments);
    }
}

#[test]
fn scene_terrain_triangulates_to_the_renderer_contract() {
    let config = ForestConfig::default();
    let mut rng = StdRng::seed_from_u64(11);
    let forest = generate_forest(&config, &mut rng).unwrap();

    let mesh = forest.terrain.triangulate(config.cell_size, config.height_scale);
    let size = forest.terrain.size();
    assert_eq!(mesh.positions.len(), size * size);
    assert_eq!(mesh.uvs.len(), size * size);
    assert_eq!(mesh.indices.len(), (size - 1) * (size - 1) * 6);

    // Mesh heights are the grid heights at a tenth scale.
    let vertex = 16 * size + 16;
    let expected = forest.terrain.height(16, 16) * config.height_scale;
    assert!((mesh.positions[vertex].y - expected).abs() < 1e-5);

    // Every index points at a real vertex.
    assert!(
        mesh.indices
            .iter()
            .all(|&i| (i as usize) < mesh.positions.len())
    );
}

#[test]
fn camera_can_stand_anywhere_on_the_map() {
    let config = ForestConfig::default();
    let mut rng = StdRng::seed_from_u64(3);
    let forest = generate_forest(&config, &mut rng).unwrap();

    // Walk a coarse lattice of continuous query points; each must resolve to
    // an elevation within the grid's range.
    let max = forest
        .terrain
        .heights()
        .iter()
        .fold(f32::MIN, |a, &b| a.max(b));
    let extent = (forest.terrain.size() - 1) as f32;
    let mut p = 0.0f32;
    while p <= extent {
        let h = forest.terrain.height_at(p, extent - p).unwrap();
        assert!((0.0..=max).contains(&h), "height {h} at ({p}, {})", extent - p);
        p += 0.37;
    }
}

#[test]
fn standalone_terrain_matches_scene_terrain() {
    // The forest composer does not post-process the heightfield: generating
    // the terrain directly from the same config and rng state is identical.
    let config = ForestConfig::default();
    let mut rng_a = StdRng::seed_from_u64(99);
    let mut rng_b = StdRng::seed_from_u64(99);

    let forest = generate_forest(&config, &mut rng_a).unwrap();
    let terrain = HeightField::generate(&config.terrain, &mut rng_b).unwrap();
    assert_eq!(forest.terrain.heights(), terrain.heights());
}
