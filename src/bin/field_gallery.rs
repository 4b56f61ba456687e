// src/bin/field_gallery.rs
//
// Render every analytic field type as a quiver PNG.
//
// Usage:
//   cargo run --release --bin field_gallery -- [out_dir] [n] [m]
//
// Defaults: out_dir=runs/field_gallery, n=m=20 over (-10, 10)².
// An odd n and m put a site on the origin, where the radial and curl
// variants are undefined; that site is logged and left blank.

use std::env;
use std::fs::create_dir_all;
use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use spin_lattice_sim::error::Result;
use spin_lattice_sim::field::{Field, FieldType};
use spin_lattice_sim::grid::Grid;
use spin_lattice_sim::quiver::Quiver;
use spin_lattice_sim::visualisation::save_quiver_plot;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let out_dir = PathBuf::from(
        args.first()
            .map(String::as_str)
            .unwrap_or("runs/field_gallery"),
    );
    let n: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(20);
    let m: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(n);

    create_dir_all(&out_dir)?;
    let grid = Arc::new(Grid::new(n, m, (-10.0, 10.0), (-10.0, 10.0))?);

    for t in FieldType::ALL {
        let field = Field::new(Arc::clone(&grid), t);
        let path = out_dir.join(format!("{}.png", t.as_str().replace(' ', "_")));
        save_quiver_plot(&field.quiver(), &path, t.as_str())?;
        info!(
            "{:<18} -> {} ({} non-finite site(s))",
            t.as_str(),
            path.to_string_lossy(),
            field.non_finite_sites()
        );
    }

    Ok(())
}
