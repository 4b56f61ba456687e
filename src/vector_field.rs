// src/vector_field.rs

use std::sync::Arc;

use crate::error::{Result, SimError};
use crate::grid::Grid;

/// A 2D vector per grid site. Each cell stores (x, y).
#[derive(Debug, Clone)]
pub struct VectorField2D {
    pub grid: Arc<Grid>,
    pub data: Vec<[f64; 2]>,
}

impl VectorField2D {
    /// Create a zero field on the given grid.
    pub fn new(grid: Arc<Grid>) -> Self {
        let n = grid.n_sites();
        Self {
            grid,
            data: vec![[0.0, 0.0]; n],
        }
    }

    /// Wrap existing per-site vectors, checking the length against the grid.
    pub fn from_data(grid: Arc<Grid>, data: Vec<[f64; 2]>) -> Result<Self> {
        if data.len() != grid.n_sites() {
            return Err(SimError::len_mismatch(grid.n_sites(), data.len()));
        }
        Ok(Self { grid, data })
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        self.grid.idx(i, j)
    }

    /// x-components, row-major.
    pub fn x(&self) -> Vec<f64> {
        self.data.iter().map(|v| v[0]).collect()
    }

    /// y-components, row-major.
    pub fn y(&self) -> Vec<f64> {
        self.data.iter().map(|v| v[1]).collect()
    }

    /// Fail unless `other` lives on the identical mesh.
    pub fn check_same_mesh(&self, other: &VectorField2D) -> Result<()> {
        if !self.grid.same_mesh(&other.grid) {
            return Err(SimError::shape_mismatch(
                self.grid.shape(),
                other.grid.shape(),
            ));
        }
        Ok(())
    }
}
