// src/visualisation.rs

use std::path::Path;
use std::process::Command;

use log::warn;
use plotters::prelude::*;

use crate::error::{Result, SimError};
use crate::quiver::QuiverData;

/// Arrow length per unit vector, as a fraction of the smaller site spacing.
const ARROW_SCALE: f64 = 0.5;
/// Arrow head length as a fraction of the arrow length.
const HEAD_FRACTION: f64 = 0.3;
/// Half-angle of the arrow head.
const HEAD_ANGLE: f64 = std::f64::consts::PI / 9.0;

fn plot_err<E: std::fmt::Display>(e: E) -> SimError {
    SimError::Plot(e.to_string())
}

/// Line segments (shaft plus two head strokes) for one arrow.
fn arrow_segments(x: f64, y: f64, u: f64, v: f64, unit: f64) -> Vec<Vec<(f64, f64)>> {
    let tip = (x + unit * u, y + unit * v);
    let len = unit * (u * u + v * v).sqrt();
    if len == 0.0 {
        return Vec::new();
    }

    let back = (-u).atan2(-v); // direction from tip towards tail, clockwise from +y
    let head = HEAD_FRACTION * len;
    let wing = |a: f64| (tip.0 + head * a.sin(), tip.1 + head * a.cos());

    vec![
        vec![(x, y), tip],
        vec![tip, wing(back + HEAD_ANGLE)],
        vec![tip, wing(back - HEAD_ANGLE)],
    ]
}

/// Save a quiver plot (one arrow per site) as a PNG.
///
/// Sites whose vector is NaN or infinite are left blank.
pub fn save_quiver_plot(q: &QuiverData, filename: &Path, title: &str) -> Result<()> {
    if q.is_empty() {
        return Ok(()); // nothing to plot
    }

    let (dx, dy) = q.spacing;
    let unit = ARROW_SCALE * dx.min(dy);

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (&x, &y) in q.x.iter().zip(&q.y) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    let root = BitMapBackend::new(filename, (800, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, ("sans-serif", 20))
        .build_cartesian_2d((x_min - dx)..(x_max + dx), (y_min - dy)..(y_max + dy))
        .map_err(plot_err)?;

    let mut skipped = 0usize;
    let mut segments = Vec::with_capacity(3 * q.len());
    for k in 0..q.len() {
        let (u, v) = (q.u[k], q.v[k]);
        if !(u.is_finite() && v.is_finite()) {
            skipped += 1;
            continue;
        }
        segments.extend(arrow_segments(q.x[k], q.y[k], u, v, unit));
    }
    if skipped > 0 {
        warn!("{title}: {skipped} non-finite vector(s) not drawn");
    }

    chart
        .draw_series(
            segments
                .into_iter()
                .map(|seg| PathElement::new(seg, BLACK.stroke_width(1))),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Use `ffmpeg` to stitch all frames matching `pattern` into an MP4 movie.
/// Assumes zero-padded names like frames/spin_000000.png so glob order is time order.
///
/// A missing `ffmpeg` binary is an `Io` error, a failed encode is `Movie`.
pub fn make_movie_with_ffmpeg(pattern: &str, output: &Path, fps: u32) -> Result<()> {
    let fps = fps.to_string();
    let status = Command::new("ffmpeg")
        .args(["-y", "-framerate", fps.as_str()])
        .args(["-pattern_type", "glob", "-i", pattern])
        .args(["-pix_fmt", "yuv420p"])
        .arg(output)
        .status()?;

    if !status.success() {
        return Err(SimError::Movie(format!(
            "ffmpeg exited with {status} for {}",
            output.to_string_lossy()
        )));
    }

    Ok(())
}
