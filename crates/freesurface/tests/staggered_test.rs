//! Staggered (MAC) field extrapolation
//!
//! Face samples on the fluid side of the interface are already valid, so they
//! must survive the seeding stage untouched while the other components are
//! copied across.

use freesurface::{
    extrapolate, CenteredGrid, Extrapolation, ExtrapolationParams, Field, GridShape, StaggeredGrid,
};

fn row_filled_mask() -> CenteredGrid {
    // 3x2 cells, first row (i = 0) is fluid
    CenteredGrid::from_fn(GridShape::single([3, 2]), 1, |_, c, _| {
        if c[0] == 0 { 1.0 } else { 0.0 }
    })
}

fn labelled_velocity(shape: GridShape) -> StaggeredGrid {
    // u(i, j) = 10 i + j + 1, v(i, j) = 100 + 10 i + j
    StaggeredGrid::from_fn(shape, |axis, _, c| {
        let base = (10 * c[0] + c[1]) as f32;
        if axis == 0 { base + 1.0 } else { base + 100.0 }
    })
}

#[test]
fn test_1d_interface_face_preserved() {
    let shape = GridShape::single([4]);
    let mask = CenteredGrid::from_vec(shape.clone(), 1, vec![1.0, 1.0, 0.0, 0.0]).unwrap();
    let u = StaggeredGrid::from_components(shape, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]).unwrap();

    let (out, distance) =
        extrapolate(&Field::Staggered(u), &mask, &[1.0], &ExtrapolationParams::new(3)).unwrap();

    // Face 2 sits between the last fluid cell and the first empty one
    assert_eq!(out.as_staggered().unwrap().component(0), &[1.0, 2.0, 3.0, 3.0, 3.0]);
    assert_eq!(distance.data(), &[0.0, 0.0, 1.0, 2.0]);
    assert_eq!(distance.shape(), &GridShape::single([4]));
}

#[test]
fn test_centered_equivalent_overwrites_first_empty_cell() {
    // Same mask as above but cell-centered: index 2 takes the fluid value
    let shape = GridShape::single([4]);
    let mask = CenteredGrid::from_vec(shape.clone(), 1, vec![1.0, 1.0, 0.0, 0.0]).unwrap();
    let field = CenteredGrid::from_vec(shape, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();

    let (out, _) =
        extrapolate(&Field::Centered(field), &mask, &[1.0], &ExtrapolationParams::new(3)).unwrap();

    assert_eq!(out.as_centered().unwrap().data(), &[1.0, 2.0, 2.0, 2.0]);
}

#[test]
fn test_2d_components_extrapolated() {
    let mask = row_filled_mask();
    let velocity = labelled_velocity(mask.shape().clone());

    let (out, distance) = extrapolate(
        &Field::Staggered(velocity.clone()),
        &mask,
        &[1.0, 1.0],
        &ExtrapolationParams::new(2),
    )
    .unwrap();
    let out = out.as_staggered().unwrap();

    assert_eq!(distance.data(), &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
    assert_eq!(out.shape(), velocity.shape());

    for j in 0..2 {
        // Fluid row untouched
        assert_eq!(out.get(0, 0, &[0, j]), velocity.get(0, 0, &[0, j]));
        assert_eq!(out.get(1, 0, &[0, j]), velocity.get(1, 0, &[0, j]));
        // Interface u face keeps its own value
        assert_eq!(out.get(0, 0, &[1, j]), velocity.get(0, 0, &[1, j]), "u(1, {})", j);
        // Further u faces copy the interface face
        assert_eq!(out.get(0, 0, &[2, j]), velocity.get(0, 0, &[1, j]), "u(2, {})", j);
        assert_eq!(out.get(0, 0, &[3, j]), velocity.get(0, 0, &[1, j]), "u(3, {})", j);
        // Tangential v copied from the fluid row
        assert_eq!(out.get(1, 0, &[1, j]), velocity.get(1, 0, &[0, j]), "v(1, {})", j);
        assert_eq!(out.get(1, 0, &[2, j]), velocity.get(1, 0, &[0, j]), "v(2, {})", j);
    }

    // The top v face of the fluid row is its own interface sample
    assert_eq!(out.get(1, 0, &[0, 2]), velocity.get(1, 0, &[0, 2]));
}

/// Seeding only looks along positive unit axes, so a cell reachable only
/// diagonally from the surface is left for the relaxation sweeps.
#[test]
fn test_seeding_skips_diagonal_cells() {
    let mask = row_filled_mask();
    let velocity = labelled_velocity(mask.shape().clone());
    let state = Extrapolation::begin(
        &Field::Staggered(velocity),
        &mask,
        &[1.0, 1.0],
        &ExtrapolationParams::new(2),
    )
    .unwrap();

    // Working lattice is the cell grid grown by one along every axis
    assert_eq!(state.lattice(), &GridShape::single([4, 3]));
    assert_eq!(state.sweeps_done(), 0);

    let distance = state.distance();
    assert_eq!(distance[3], 1.0, "(1, 0) seeded along +x");
    assert_eq!(distance[2], 1.0, "(0, 2) seeded along +y");
    assert_eq!(distance[5], 6.0, "(1, 2) only diagonal to the surface");

    let mut state = state;
    state.sweep();
    assert!((state.distance()[5] - 2.0f32.sqrt()).abs() < 1e-6);
}

/// With no sweeps only the seeding stage runs. Seeds read the pre-stage
/// distance, so (1, 2) is not seeded through its freshly seeded neighbor (0, 2).
#[test]
fn test_zero_voxel_distance_seeds_axis_neighbors_only() {
    let mask = row_filled_mask();
    let velocity = labelled_velocity(mask.shape().clone());

    let (out, distance) = extrapolate(
        &Field::Staggered(velocity.clone()),
        &mask,
        &[1.0, 1.0],
        &ExtrapolationParams::new(0),
    )
    .unwrap();
    let out = out.as_staggered().unwrap();

    assert!(distance.data().iter().all(|&d| d == 0.0), "{:?}", distance.data());
    for j in 0..2 {
        assert_eq!(out.get(1, 0, &[1, j]), velocity.get(1, 0, &[0, j]), "v(1, {}) seeded", j);
        assert_eq!(out.get(0, 0, &[1, j]), velocity.get(0, 0, &[1, j]), "u(1, {}) kept", j);
        assert_eq!(out.get(0, 0, &[2, j]), velocity.get(0, 0, &[2, j]), "u(2, {}) untouched", j);
    }
    assert_eq!(out.get(1, 0, &[1, 2]), velocity.get(1, 0, &[1, 2]), "v(1, 2) left for the sweeps");
    assert_eq!(out.get(1, 0, &[2, 0]), velocity.get(1, 0, &[2, 0]));
}

#[test]
fn test_staggered_batches() {
    let shape = GridShape::new(2, [3]);
    let mask = CenteredGrid::from_vec(shape.clone(), 1, vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
    let u = StaggeredGrid::from_components(shape, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]])
        .unwrap();

    let (out, distance) =
        extrapolate(&Field::Staggered(u), &mask, &[1.0], &ExtrapolationParams::new(3)).unwrap();

    assert_eq!(distance.data(), &[0.0, 1.0, 2.0, 2.0, 1.0, 0.0]);
    // Entry 0: face 1 is the interface, faces 2 and 3 copy it
    // Entry 1: fluid cell 2 owns faces 2 and 3, face 1 copies face 2 via the empty cell 1
    assert_eq!(
        out.as_staggered().unwrap().component(0),
        &[1.0, 2.0, 2.0, 2.0, 7.0, 7.0, 7.0, 8.0]
    );
}
