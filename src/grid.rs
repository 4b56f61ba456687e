// src/grid.rs

use crate::error::{Result, SimError};

/// Rectangular sampling mesh: `n` rows by `m` columns.
///
/// Row `i` sits at a fixed `y`, column `j` at a fixed `x` (a standard
/// two-array meshgrid). Both coordinate arrays are stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    n: usize,
    m: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
    x: Vec<f64>,
    y: Vec<f64>,
}

/// `count` evenly spaced samples over the closed interval `[lo, hi]`.
fn linspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (count - 1) as f64;
    (0..count)
        .map(|k| if k == count - 1 { hi } else { lo + step * k as f64 })
        .collect()
}

fn check_range(name: &str, (lo, hi): (f64, f64)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(SimError::InvalidGrid(format!(
            "{name} must be a finite, strictly ordered pair (got ({lo}, {hi}))"
        )));
    }
    Ok(())
}

impl Grid {
    /// Build an `n × m` mesh spanning `x_range` horizontally and `y_range` vertically.
    pub fn new(n: usize, m: usize, x_range: (f64, f64), y_range: (f64, f64)) -> Result<Self> {
        if n == 0 || m == 0 {
            return Err(SimError::InvalidGrid(format!(
                "grid needs at least one row and column (got {n}x{m})"
            )));
        }
        check_range("x_range", x_range)?;
        check_range("y_range", y_range)?;

        Ok(Self::build(n, m, x_range, y_range))
    }

    fn build(n: usize, m: usize, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        let xs = linspace(x_range.0, x_range.1, m);
        let ys = linspace(y_range.0, y_range.1, n);

        let mut x = Vec::with_capacity(n * m);
        let mut y = Vec::with_capacity(n * m);
        for &yi in &ys {
            for &xj in &xs {
                x.push(xj);
                y.push(yi);
            }
        }

        Self {
            n,
            m,
            x_range,
            y_range,
            x,
            y,
        }
    }

    /// Number of rows.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of columns.
    pub fn m(&self) -> usize {
        self.m
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.m)
    }

    pub fn x_range(&self) -> (f64, f64) {
        self.x_range
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    /// x coordinate of every site, row-major.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// y coordinate of every site, row-major.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Total number of lattice sites.
    pub fn n_sites(&self) -> usize {
        self.n * self.m
    }

    /// Convert (row, column) indices to a flat index.
    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.n && j < self.m);
        i * self.m + j
    }

    /// Coordinates of site (i, j).
    #[inline]
    pub fn point(&self, i: usize, j: usize) -> (f64, f64) {
        let id = self.idx(i, j);
        (self.x[id], self.y[id])
    }

    /// Horizontal and vertical spacing between neighbouring sites.
    /// A single row or column reports the full range width.
    pub fn spacing(&self) -> (f64, f64) {
        let dx = (self.x_range.1 - self.x_range.0) / (self.m.max(2) - 1) as f64;
        let dy = (self.y_range.1 - self.y_range.0) / (self.n.max(2) - 1) as f64;
        (dx, dy)
    }

    /// True if both grids describe the identical coordinate mesh.
    pub fn same_mesh(&self, other: &Grid) -> bool {
        self.n == other.n
            && self.m == other.m
            && self.x_range == other.x_range
            && self.y_range == other.y_range
    }
}

impl Default for Grid {
    /// 20 × 20 mesh over (-10, 10) × (-10, 10).
    fn default() -> Self {
        Self::build(20, 20, (-10.0, 10.0), (-10.0, 10.0))
    }
}
