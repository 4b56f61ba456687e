// src/spin_lattice.rs
//
// Planar unit spins on a grid.
//
// Conventions:
// - spin at angle θ is (sin θ, cos θ), θ measured clockwise from +y.
// - neighbours are up/down/left/right with open (free) boundaries:
//   corners see 2 neighbours, edges 3, interior sites 4.

use std::f64::consts::TAU;
use std::sync::Arc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::{Result, SimError};
use crate::grid::Grid;
use crate::vec2;
use crate::vector_field::VectorField2D;

/// Sum the four nearest neighbours of every site of an `n × m` row-major lattice.
///
/// Missing neighbours at the boundary contribute zero. `out` is overwritten.
/// Both slices must be `n * m` long.
pub fn summed_neighbors(
    n: usize,
    m: usize,
    spins: &[[f64; 2]],
    out: &mut [[f64; 2]],
) -> Result<()> {
    if spins.len() != n * m {
        return Err(SimError::len_mismatch(n * m, spins.len()));
    }
    if out.len() != n * m {
        return Err(SimError::len_mismatch(n * m, out.len()));
    }
    sum_neighbors_unchecked(n, m, spins, out);
    Ok(())
}

fn sum_neighbors_unchecked(n: usize, m: usize, spins: &[[f64; 2]], out: &mut [[f64; 2]]) {
    debug_assert_eq!(spins.len(), n * m);
    debug_assert_eq!(out.len(), n * m);

    for i in 0..n {
        for j in 0..m {
            let mut acc = [0.0, 0.0];
            if j + 1 < m {
                acc = vec2::add(acc, spins[i * m + j + 1]);
            }
            if j > 0 {
                acc = vec2::add(acc, spins[i * m + j - 1]);
            }
            if i + 1 < n {
                acc = vec2::add(acc, spins[(i + 1) * m + j]);
            }
            if i > 0 {
                acc = vec2::add(acc, spins[(i - 1) * m + j]);
            }
            out[i * m + j] = acc;
        }
    }
}

/// Rotate every spin by its own angle. Lengths must already agree.
pub(crate) fn rotate_in_place(spins: &mut [[f64; 2]], theta: &[f64], parallel: bool) {
    debug_assert_eq!(spins.len(), theta.len());
    if parallel {
        spins
            .par_iter_mut()
            .zip(theta.par_iter())
            .for_each(|(s, &t)| *s = vec2::rotate(*s, t));
    } else {
        for (s, &t) in spins.iter_mut().zip(theta) {
            *s = vec2::rotate(*s, t);
        }
    }
}

fn spins_from_angles(angles: impl Iterator<Item = f64>) -> Vec<[f64; 2]> {
    angles.map(|a| [a.sin(), a.cos()]).collect()
}

/// A unit spin at every grid site.
#[derive(Debug, Clone)]
pub struct SpinLattice {
    pub(crate) spins: VectorField2D,
    rng: ChaCha8Rng,
}

impl SpinLattice {
    /// Random lattice. With `Some(seed)` the initial angles are reproducible;
    /// with `None` the generator is seeded from the OS.
    pub fn new(grid: Arc<Grid>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        let mut lattice = Self {
            spins: VectorField2D::new(grid),
            rng,
        };
        lattice.randomize();
        lattice
    }

    /// Deterministic lattice from explicit per-site angles (row-major).
    ///
    /// The generator starts from seed 0, so a later [`reset`](Self::reset)
    /// draws the same angles as `SpinLattice::new(grid, Some(0))`. Call
    /// [`reseed`](Self::reseed) to pick another stream.
    pub fn from_angles(grid: Arc<Grid>, angles: &[f64]) -> Result<Self> {
        if angles.len() != grid.n_sites() {
            return Err(SimError::len_mismatch(grid.n_sites(), angles.len()));
        }
        let data = spins_from_angles(angles.iter().copied());
        Ok(Self {
            spins: VectorField2D::from_data(grid, data)?,
            rng: ChaCha8Rng::seed_from_u64(0),
        })
    }

    fn randomize(&mut self) {
        let n = self.spins.data.len();
        let rng = &mut self.rng;
        let angles = (0..n).map(|_| rng.random_range(0.0..TAU));
        self.spins.data = spins_from_angles(angles);
    }

    /// Draw fresh random angles from this lattice's generator.
    pub fn reset(&mut self) {
        self.randomize();
    }

    /// Restart the generator from `seed` and redraw.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.randomize();
    }

    /// Per-site sum of the existing up/down/left/right neighbour spins.
    pub fn neighbor_sum(&self) -> Vec<[f64; 2]> {
        let mut out = vec![[0.0, 0.0]; self.spins.data.len()];
        self.neighbor_sum_into(&mut out);
        out
    }

    /// `out` must hold one entry per site.
    pub(crate) fn neighbor_sum_into(&self, out: &mut [[f64; 2]]) {
        let (n, m) = self.spins.grid.shape();
        sum_neighbors_unchecked(n, m, &self.spins.data, out);
    }

    /// Rotate each spin (x, y) to (cos θ·x + sin θ·y, −sin θ·x + cos θ·y).
    pub fn rotate(&mut self, theta: &[f64]) -> Result<()> {
        self.rotate_with(theta, false)
    }

    pub(crate) fn rotate_with(&mut self, theta: &[f64], parallel: bool) -> Result<()> {
        if theta.len() != self.spins.data.len() {
            return Err(SimError::len_mismatch(self.spins.data.len(), theta.len()));
        }
        rotate_in_place(&mut self.spins.data, theta, parallel);
        Ok(())
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.spins.grid
    }

    pub fn spins(&self) -> &[[f64; 2]] {
        &self.spins.data
    }

    pub fn x(&self) -> Vec<f64> {
        self.spins.x()
    }

    pub fn y(&self) -> Vec<f64> {
        self.spins.y()
    }
}
