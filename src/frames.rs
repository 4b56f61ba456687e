// src/frames.rs
//
// Frame sampling for animation.
//
// Each call to `next()` copies the current lattice, then advances the system by
// `n_per_frame` steps. Frame 0 is therefore the initial state, and after the
// iterator is exhausted the system has moved n_frames * n_per_frame steps.

use std::sync::Arc;

use log::{debug, info};

use crate::coupled::SpinLatticeWithField;
use crate::error::Result;
use crate::grid::Grid;
use crate::params::SimParams;

/// Owned snapshot of the spin lattice at one point in simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Position in the sequence, starting at 0.
    pub index: usize,
    /// Integration steps applied before this snapshot.
    pub step: usize,
    pub grid: Arc<Grid>,
    pub spins: Vec<[f64; 2]>,
}

impl Frame {
    pub fn x(&self) -> Vec<f64> {
        self.spins.iter().map(|s| s[0]).collect()
    }

    pub fn y(&self) -> Vec<f64> {
        self.spins.iter().map(|s| s[1]).collect()
    }
}

/// Drives a coupled system and yields `n_frames` snapshots. Consumed once.
pub struct FrameSequencer<'a> {
    system: &'a mut SpinLatticeWithField,
    increment: f64,
    n_frames: usize,
    n_per_frame: usize,
    produced: usize,
}

impl<'a> FrameSequencer<'a> {
    pub fn new(
        system: &'a mut SpinLatticeWithField,
        increment: f64,
        n_frames: usize,
        n_per_frame: usize,
    ) -> Self {
        Self {
            system,
            increment,
            n_frames,
            n_per_frame,
            produced: 0,
        }
    }
}

impl Iterator for FrameSequencer<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.produced == self.n_frames {
            return None;
        }

        let frame = Frame {
            index: self.produced,
            step: self.system.steps_taken(),
            grid: Arc::clone(self.system.grid()),
            spins: self.system.spin_lattice().spins().to_vec(),
        };
        self.produced += 1;

        self.system.advance(self.increment, self.n_per_frame);
        debug!(
            "frame {}/{} captured at step {}",
            frame.index + 1,
            self.n_frames,
            frame.step
        );
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.n_frames - self.produced;
        (left, Some(left))
    }
}

impl ExactSizeIterator for FrameSequencer<'_> {}

/// Build a fresh system from dashboard controls and collect its frames.
pub fn create_frames(
    field_type: &str,
    field_coefficient: f64,
    spin_coefficient: f64,
    increment: f64,
    n_frames: usize,
    n_per_frame: usize,
) -> Result<Vec<Frame>> {
    let params = SimParams {
        field_type: field_type.parse()?,
        field_coefficient,
        spin_coefficient,
        increment,
        n_frames,
        n_per_frame,
        ..SimParams::default()
    };
    create_frames_with(&params)
}

/// As [`create_frames`], with grid size, seed and parallelism from `params`.
pub fn create_frames_with(params: &SimParams) -> Result<Vec<Frame>> {
    let mut system = SpinLatticeWithField::from_params(params)?;
    info!(
        "running '{}' field: fc={} sc={} increment={} frames={}x{}",
        params.field_type,
        params.field_coefficient,
        params.spin_coefficient,
        params.increment,
        params.n_frames,
        params.n_per_frame
    );
    Ok(FrameSequencer::new(
        &mut system,
        params.increment,
        params.n_frames,
        params.n_per_frame,
    )
    .collect())
}
