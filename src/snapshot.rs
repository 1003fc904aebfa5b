//! PNG output for headless runs.

use crate::grid::Field3;
use crate::simulation::Diagnostics;
use crate::visualization::{column_density, density_to_color};
use anyhow::Context;
use plotters::prelude::*;
use std::path::Path;

const SNAPSHOT_PIXELS: u32 = 640;

fn plot_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow::anyhow!("plotting failed: {e:?}")
}

fn to_rgb(color: u32) -> RGBColor {
    RGBColor((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Density integrated along z, drawn as a heat map with the floor at the bottom.
pub fn write_density_png(path: &Path, density: &Field3<f32>, step: u64) -> anyhow::Result<()> {
    let n = density.grid().n();
    let columns = column_density(density);

    let root = BitMapBackend::new(path, (SNAPSHOT_PIXELS, SNAPSHOT_PIXELS)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("density, step {step}"), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_cartesian_2d(0..n, 0..n)
        .map_err(plot_err)?;
    chart.configure_mesh().disable_mesh().draw().map_err(plot_err)?;

    chart
        .draw_series((0..n * n).map(|col| {
            let (i, j) = (col % n, col / n);
            let color = to_rgb(density_to_color(columns[col]));
            Rectangle::new([(i, j), (i + 1, j + 1)], color.filled())
        }))
        .map_err(plot_err)?;

    root.present()
        .map_err(plot_err)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Total density and mean divergence over the run, one point per step.
pub fn write_history_png(path: &Path, history: &[Diagnostics]) -> anyhow::Result<()> {
    anyhow::ensure!(!history.is_empty(), "no steps recorded");
    let last = history.last().map_or(1, |d| d.step.max(1));
    let max_mass = history
        .iter()
        .map(|d| d.total_density)
        .fold(f32::MIN_POSITIVE, f32::max);
    let max_div = history
        .iter()
        .map(|d| d.mean_abs_divergence)
        .fold(f32::MIN_POSITIVE, f32::max);

    let root = BitMapBackend::new(path, (SNAPSHOT_PIXELS, SNAPSHOT_PIXELS / 2)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let (left, right) = root.split_horizontally((SNAPSHOT_PIXELS / 2) as i32);

    let mut mass_chart = ChartBuilder::on(&left)
        .caption("total density", ("sans-serif", 16))
        .margin(8)
        .x_label_area_size(25)
        .y_label_area_size(50)
        .build_cartesian_2d(0..last, 0.0..max_mass * 1.05)
        .map_err(plot_err)?;
    mass_chart.configure_mesh().draw().map_err(plot_err)?;
    mass_chart
        .draw_series(LineSeries::new(
            history.iter().map(|d| (d.step, d.total_density)),
            &BLUE,
        ))
        .map_err(plot_err)?;

    let mut div_chart = ChartBuilder::on(&right)
        .caption("mean |divergence|", ("sans-serif", 16))
        .margin(8)
        .x_label_area_size(25)
        .y_label_area_size(50)
        .build_cartesian_2d(0..last, 0.0..max_div * 1.05)
        .map_err(plot_err)?;
    div_chart.configure_mesh().draw().map_err(plot_err)?;
    div_chart
        .draw_series(LineSeries::new(
            history.iter().map(|d| (d.step, d.mean_abs_divergence)),
            &RED,
        ))
        .map_err(plot_err)?;

    root.present()
        .map_err(plot_err)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}
