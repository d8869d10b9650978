//! Circle of fluid with a rotating velocity field
//!
//! Run with: RUST_LOG=debug cargo run --release --example extrapolate_circle

use std::time::Instant;

use freesurface::{
    binary_mask, insert_spheres, CenteredGrid, Extrapolation, ExtrapolationParams, Field,
    GridShape, Sphere, StaggeredGrid, Vec3,
};

const WIDTH: usize = 32;
const HEIGHT: usize = 40;
const RADIUS: f32 = 8.0;
const CELL_SIZE: f32 = 1.0;
const VOXEL_DISTANCE: i32 = 6;

fn main() -> freesurface::Result<()> {
    env_logger::init();

    println!("=== Free-surface extrapolation ===");
    println!("Grid: {}x{}, radius: {}, voxel_distance: {}", WIDTH, HEIGHT, RADIUS, VOXEL_DISTANCE);

    let shape = GridShape::single([WIDTH, HEIGHT]);
    let center = Vec3::new(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, 0.0);

    let mut marker = CenteredGrid::zeros(shape.clone(), 1);
    insert_spheres(&mut marker, &[Sphere::new(center, RADIUS)], None)?;
    let mask = binary_mask(&marker, 0.0);
    let fluid = mask.data().iter().filter(|&&v| v > 0.0).count();
    println!("Fluid cells: {}", fluid);

    let velocity = StaggeredGrid::from_fn(shape, |axis, _, c| {
        let x = c[0] as f32 - center.x;
        let y = c[1] as f32 - center.y;
        if axis == 0 { -y } else { x }
    });

    let params = ExtrapolationParams::new(VOXEL_DISTANCE);
    let start = Instant::now();
    let mut state = Extrapolation::begin(
        &Field::Staggered(velocity),
        &mask,
        &[CELL_SIZE, CELL_SIZE],
        &params,
    )?;
    for sweep in 1..=state.voxel_distance() {
        let updated = state.sweep();
        println!("  sweep {:2}: {:5} cells updated", sweep, updated);
    }
    let (_, distance) = state.finish();
    println!("Done in {:.2?}", start.elapsed());

    println!();
    println!("Signed distance along the horizontal center line:");
    let j = HEIGHT / 2;
    let row: Vec<String> = (0..WIDTH)
        .map(|i| format!("{:5.1}", distance.get(0, &[i, j], 0)))
        .collect();
    for chunk in row.chunks(8) {
        println!("  {}", chunk.join(" "));
    }

    Ok(())
}
