use crate::conditions::*;
use crate::grid::Field3;
use crate::simulation::Simulation;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use rayon::prelude::*;
use std::time::Instant;

/// Density integrated along z, one value per (x, y) column.
///
/// Row `j` of the result is grid row `j`, so row 0 is the floor.
pub fn column_density(density: &Field3<f32>) -> Vec<f32> {
    let grid = density.grid();
    let n = grid.n();
    let dx = grid.dx();
    (0..n * n)
        .into_par_iter()
        .map(|col| {
            let (i, j) = (col % n, col / n);
            (0..n).map(|k| density.get(i, j, k)).sum::<f32>() * dx
        })
        .collect()
}

// White background, blue for thin smoke, tending to red where it piles up
pub fn density_to_color(density: f32) -> u32 {
    if density <= 0.0 {
        return 0x00FF_FFFF;
    }
    let half = DENSITY_DISPLAY_MAX * 0.5;
    if density <= half {
        let intensity = (255.0 * (1.0 - density / half)).clamp(0.0, 255.0) as u32;
        (intensity << 16) | (intensity << 8) | 0xFF
    } else {
        let excess = (density - half).clamp(0.0, half);
        let red_intensity = (255.0 * (excess / half)).clamp(0.0, 255.0) as u32;
        (red_intensity << 16) | 0xFF
    }
}

/// Paint the column density into a `n * CELL_PIXELS` square buffer, y up.
pub fn draw_density(buffer: &mut [u32], density: &Field3<f32>) {
    let n = density.grid().n();
    let width = n * CELL_PIXELS;
    let columns = column_density(density);

    buffer
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let j = n - 1 - y / CELL_PIXELS;
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = density_to_color(columns[j * n + x / CELL_PIXELS]);
            }
        });
}

// Launch the simulation in a window and step it every frame
pub fn run_simulation(sim: &mut Simulation) -> anyhow::Result<()> {
    let width = sim.grid().n() * CELL_PIXELS;
    let height = width;
    let mut buffer: Vec<u32> = vec![0; width * height];

    let mut window = Window::new(
        "Smoke (R: reset density, Space: pause, Esc: quit)",
        width,
        height,
        WindowOptions::default(),
    )
    .map_err(|e| anyhow::anyhow!("cannot open window: {e}"))?;
    window.set_target_fps(60);

    let mut paused = false;
    let mut batch_start = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            sim.reset_density();
            log::info!("density reset at step {}", sim.steps());
        }
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            paused = !paused;
        }

        if !paused {
            sim.step();
            if sim.steps() % 100 == 0 {
                log::info!(
                    "100 steps in {:?} (step {}, total density {:.1})",
                    batch_start.elapsed(),
                    sim.steps(),
                    sim.density().sum()
                );
                batch_start = Instant::now();
            }
        }

        draw_density(&mut buffer, sim.density());
        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| anyhow::anyhow!("cannot update window: {e}"))?;
    }

    Ok(())
}
