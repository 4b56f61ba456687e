// src/quiver.rs

use crate::field::Field;
use crate::frames::Frame;
use crate::grid::Grid;
use crate::spin_lattice::SpinLattice;

/// Coordinates plus vector components, one entry per site, ready for a
/// quiver-style plot.
#[derive(Debug, Clone, PartialEq)]
pub struct QuiverData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    /// Site spacing, used to size arrows.
    pub spacing: (f64, f64),
}

impl QuiverData {
    fn from_parts(grid: &Grid, vectors: &[[f64; 2]]) -> Self {
        Self {
            x: grid.x().to_vec(),
            y: grid.y().to_vec(),
            u: vectors.iter().map(|w| w[0]).collect(),
            v: vectors.iter().map(|w| w[1]).collect(),
            spacing: grid.spacing(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Anything that can be drawn as a vector field over its grid.
pub trait Quiver {
    fn quiver(&self) -> QuiverData;
}

impl Quiver for Field {
    fn quiver(&self) -> QuiverData {
        QuiverData::from_parts(self.grid(), self.data())
    }
}

impl Quiver for SpinLattice {
    fn quiver(&self) -> QuiverData {
        QuiverData::from_parts(self.grid(), self.spins())
    }
}

impl Quiver for Frame {
    fn quiver(&self) -> QuiverData {
        QuiverData::from_parts(&self.grid, &self.spins)
    }
}
