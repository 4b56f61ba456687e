// src/coupled.rs
//
// Spin lattice driven by an external field plus nearest-neighbour coupling.
//
// Update rule (explicit, one rotation per step):
//   F = field_coefficient * field + spin_coefficient * neighbour_sum(s)
//   τ = s × F = s.x F.y − s.y F.x
//   s ← R(increment * τ) s
//
// With s at angle φ and F at angle ψ (both clockwise from +y) a step maps
// φ to φ + increment·|F|·sin(φ − ψ), which settles at φ = ψ + π. Spins end up
// antiparallel to their net force: a positive coefficient anti-aligns them
// with the field (or their neighbours), a negative one aligns them.
//
// There is no stability control: a large increment·τ overshoots instead of
// relaxing. Each step reads only the previous step's complete lattice.

use std::sync::Arc;

use log::trace;
use rayon::prelude::*;

use crate::error::Result;
use crate::field::{Field, FieldType};
use crate::grid::Grid;
use crate::params::SimParams;
use crate::spin_lattice::SpinLattice;
use crate::vec2;

#[inline]
fn site_torque(s: [f64; 2], field: [f64; 2], neighbors: [f64; 2], fc: f64, sc: f64) -> f64 {
    let force = vec2::add(vec2::scale(fc, field), vec2::scale(sc, neighbors));
    vec2::cross(s, force)
}

#[derive(Debug, Clone)]
pub struct SpinLatticeWithField {
    pub field_coefficient: f64,
    pub spin_coefficient: f64,
    field: Field,
    spin_lattice: SpinLattice,
    parallel: bool,
    steps_taken: usize,

    // reused per step
    neighbors: Vec<[f64; 2]>,
    theta: Vec<f64>,
}

impl SpinLatticeWithField {
    /// Couple an existing field and lattice. Both must sit on the same mesh.
    pub fn new(
        field: Field,
        spin_lattice: SpinLattice,
        field_coefficient: f64,
        spin_coefficient: f64,
    ) -> Result<Self> {
        field.vectors().check_same_mesh(&spin_lattice.spins)?;
        let n = spin_lattice.grid().n_sites();
        Ok(Self {
            field_coefficient,
            spin_coefficient,
            field,
            spin_lattice,
            parallel: false,
            steps_taken: 0,
            neighbors: vec![[0.0, 0.0]; n],
            theta: vec![0.0; n],
        })
    }

    /// Ready-to-run system on the default 20 × 20 grid with random spins.
    pub fn from_selector(
        field_type: &str,
        field_coefficient: f64,
        spin_coefficient: f64,
    ) -> Result<Self> {
        let grid = Arc::new(Grid::default());
        let field = Field::from_selector(Arc::clone(&grid), field_type)?;
        let spin_lattice = SpinLattice::new(grid, None);
        Self::new(field, spin_lattice, field_coefficient, spin_coefficient)
    }

    /// Fully configured system: grid, seed and parallelism from `params`.
    pub fn from_params(params: &SimParams) -> Result<Self> {
        params.validate()?;
        let grid = Arc::new(params.grid()?);
        let field = Field::new(Arc::clone(&grid), params.field_type);
        let spin_lattice = SpinLattice::new(grid, params.seed);
        let mut system = Self::new(
            field,
            spin_lattice,
            params.field_coefficient,
            params.spin_coefficient,
        )?;
        system.set_parallel(params.parallel);
        Ok(system)
    }

    /// Split the per-site passes of each step across rayon workers.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Net force per site: field term plus neighbour term.
    pub fn force(&self) -> Vec<[f64; 2]> {
        let (fc, sc) = (self.field_coefficient, self.spin_coefficient);
        self.field
            .data()
            .iter()
            .zip(self.spin_lattice.neighbor_sum())
            .map(|(&f, nb)| vec2::add(vec2::scale(fc, f), vec2::scale(sc, nb)))
            .collect()
    }

    /// Per-site torque τ = s × F.
    pub fn torque(&self) -> Vec<f64> {
        self.spin_lattice
            .spins()
            .iter()
            .zip(self.force())
            .map(|(&s, f)| vec2::cross(s, f))
            .collect()
    }

    /// Fill `self.theta` with increment·τ for the current state.
    fn compute_angles(&mut self, increment: f64) {
        self.spin_lattice.neighbor_sum_into(&mut self.neighbors);

        let (fc, sc) = (self.field_coefficient, self.spin_coefficient);
        let spins = self.spin_lattice.spins();
        let field = self.field.data();
        let neighbors = &self.neighbors;

        let angle = |k: usize| increment * site_torque(spins[k], field[k], neighbors[k], fc, sc);

        if self.parallel {
            self.theta
                .par_iter_mut()
                .enumerate()
                .for_each(|(k, t)| *t = angle(k));
        } else {
            for (k, t) in self.theta.iter_mut().enumerate() {
                *t = angle(k);
            }
        }
    }

    /// One integration step: rotate every spin by increment·τ.
    pub fn step(&mut self, increment: f64) {
        self.compute_angles(increment);
        // shapes are fixed at construction
        crate::spin_lattice::rotate_in_place(
            &mut self.spin_lattice.spins.data,
            &self.theta,
            self.parallel,
        );
        self.steps_taken += 1;
    }

    /// Apply `n_increments` sequential steps of size `increment`.
    pub fn advance(&mut self, increment: f64, n_increments: usize) {
        for _ in 0..n_increments {
            self.step(increment);
        }
        trace!(
            "advanced {} step(s) of {}, total {}",
            n_increments,
            increment,
            self.steps_taken
        );
    }

    /// Rotate the lattice by explicit per-site angles.
    pub fn rotate_spins(&mut self, theta: &[f64]) -> Result<()> {
        self.spin_lattice.rotate_with(theta, self.parallel)
    }

    /// Redraw random spins; the field and coefficients stay.
    pub fn reset_spin_lattice(&mut self) {
        self.spin_lattice.reset();
        self.steps_taken = 0;
    }

    /// Swap the field formula without touching the spins.
    pub fn change_field_type(&mut self, field_type: &str) -> Result<()> {
        self.field.change_type(field_type)
    }

    pub fn set_field_type(&mut self, field_type: FieldType) {
        self.field.set_type(field_type);
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn spin_lattice(&self) -> &SpinLattice {
        &self.spin_lattice
    }

    pub fn grid(&self) -> &Arc<Grid> {
        self.spin_lattice.grid()
    }

    /// Integration steps applied since construction or the last reset.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn single_site(angle: f64, field_type: FieldType) -> SpinLatticeWithField {
        let grid = Arc::new(Grid::new(1, 1, (3.0, 4.0), (4.0, 5.0)).unwrap());
        let field = Field::new(grid.clone(), field_type);
        let lattice = SpinLattice::from_angles(grid, &[angle]).unwrap();
        SpinLatticeWithField::new(field, lattice, 1.0, 1.0).unwrap()
    }

    #[test]
    fn torque_is_cross_product_of_spin_and_force() {
        // Spin (1, 0) in a uniform (1, 1) field: τ = 1·1 − 0·1 = 1.
        let system = single_site(FRAC_PI_2, FieldType::Uniform);
        let tau = system.torque();
        assert_abs_diff_eq!(tau[0], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn force_combines_field_and_neighbors() {
        let grid = Arc::new(Grid::new(1, 2, (1.0, 2.0), (0.0, 1.0)).unwrap());
        let field = Field::new(grid.clone(), FieldType::Uniform);
        let lattice = SpinLattice::from_angles(grid, &[FRAC_PI_2, 0.0]).unwrap();
        let system = SpinLatticeWithField::new(field, lattice, 0.5, 2.0).unwrap();

        let f = system.force();
        // site 0 sees neighbour (0, 1); site 1 sees neighbour (1, 0)
        assert_abs_diff_eq!(f[0][0], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(f[0][1], 2.5, epsilon = 1e-15);
        assert_abs_diff_eq!(f[1][0], 2.5, epsilon = 1e-15);
        assert_abs_diff_eq!(f[1][1], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn aligned_spin_feels_no_torque() {
        // Uniform field (1, 1) and spin at 45°: already parallel.
        let mut system = single_site(FRAC_PI_2 / 2.0, FieldType::Uniform);
        assert_abs_diff_eq!(system.torque()[0], 0.0, epsilon = 1e-15);
        let before = system.spin_lattice().spins()[0];
        system.advance(0.1, 50);
        let after = system.spin_lattice().spins()[0];
        assert_abs_diff_eq!(before[0], after[0], epsilon = 1e-12);
        assert_abs_diff_eq!(before[1], after[1], epsilon = 1e-12);
    }

    #[test]
    fn positive_coefficient_settles_antiparallel_to_field() {
        // Site at (3, 4): radial field (0.6, 0.8). φ ← φ + h·sin(φ − ψ) is
        // stable at φ = ψ + π.
        let mut system = single_site(2.5, FieldType::Radial);
        system.advance(0.05, 400);
        let s = system.spin_lattice().spins()[0];
        assert_abs_diff_eq!(s[0], -0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(s[1], -0.8, epsilon = 1e-6);
    }

    #[test]
    fn negative_coefficient_aligns_with_field() {
        let mut system = single_site(2.5, FieldType::Radial);
        system.field_coefficient = -1.0;
        system.advance(0.05, 400);
        let s = system.spin_lattice().spins()[0];
        assert_abs_diff_eq!(s[0], 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(s[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn zero_increments_is_a_no_op() {
        let mut system = SpinLatticeWithField::from_selector("curl", 1.0, 1.0).unwrap();
        let before = system.spin_lattice().spins().to_vec();
        system.advance(0.1, 0);
        assert_eq!(system.spin_lattice().spins(), before.as_slice());
        assert_eq!(system.steps_taken(), 0);
    }

    #[test]
    fn mismatched_mesh_is_rejected() {
        let a = Arc::new(Grid::new(4, 4, (0.0, 1.0), (0.0, 1.0)).unwrap());
        let b = Arc::new(Grid::new(4, 5, (0.0, 1.0), (0.0, 1.0)).unwrap());
        let field = Field::new(a, FieldType::Uniform);
        let lattice = SpinLattice::new(b, Some(1));
        let err = SpinLatticeWithField::new(field, lattice, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, SimError::DimensionMismatch { .. }));
    }

    #[test]
    fn unknown_selector_fails_at_construction() {
        assert!(matches!(
            SpinLatticeWithField::from_selector("vortex", 1.0, 1.0),
            Err(SimError::UnknownFieldType(_))
        ));
    }

    #[test]
    fn change_field_type_keeps_spins() {
        let mut system = SpinLatticeWithField::from_selector("uniform", 1.0, 0.5).unwrap();
        let before = system.spin_lattice().spins().to_vec();
        system.change_field_type("decreasing radial").unwrap();
        assert_eq!(system.field().field_type(), FieldType::DecreasingRadial);
        assert_eq!(system.spin_lattice().spins(), before.as_slice());
        assert!(system.change_field_type("bad").is_err());
        assert_eq!(system.field().field_type(), FieldType::DecreasingRadial);
    }

    #[test]
    fn step_rotates_by_torque_of_the_whole_previous_lattice() {
        let params = SimParams {
            n: 4,
            m: 5,
            field_type: FieldType::IncreasingCurl,
            field_coefficient: 0.7,
            spin_coefficient: -0.4,
            seed: Some(21),
            ..SimParams::default()
        };
        let h = 0.2;
        let mut stepped = SpinLatticeWithField::from_params(&params).unwrap();
        let mut manual = stepped.clone();

        for _ in 0..3 {
            stepped.step(h);
            let theta: Vec<f64> = manual.torque().iter().map(|t| h * t).collect();
            manual.rotate_spins(&theta).unwrap();
        }

        for (a, b) in stepped
            .spin_lattice()
            .spins()
            .iter()
            .zip(manual.spin_lattice().spins())
        {
            assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-14);
            assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-14);
        }

        // Updating sites one by one in place reads half-rotated neighbours.
        let mut in_place = SpinLatticeWithField::from_params(&params).unwrap();
        let mut spins = in_place.spin_lattice().spins().to_vec();
        for k in 0..spins.len() {
            in_place.spin_lattice.spins.data = spins.clone();
            let t = in_place.torque()[k];
            spins[k] = vec2::rotate(spins[k], h * t);
        }
        let mut reference = SpinLatticeWithField::from_params(&params).unwrap();
        reference.step(h);
        assert_ne!(reference.spin_lattice().spins(), spins.as_slice());
    }

    #[test]
    fn parallel_steps_match_serial_steps() {
        let params = SimParams {
            seed: Some(99),
            field_type: FieldType::IncreasingCurl,
            ..SimParams::default()
        };
        let mut serial = SpinLatticeWithField::from_params(&params).unwrap();
        let mut parallel = serial.clone();
        parallel.set_parallel(true);
        serial.advance(0.1, 25);
        parallel.advance(0.1, 25);
        assert_eq!(serial.spin_lattice().spins(), parallel.spin_lattice().spins());
    }
}
