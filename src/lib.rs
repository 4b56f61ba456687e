// src/lib.rs

pub mod config;
pub mod coupled;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod frames;
pub mod grid;
pub mod params;
pub mod quiver;
pub mod spin_lattice;
pub mod vec2;
pub mod vector_field;
pub mod visualisation;

pub use coupled::SpinLatticeWithField;
pub use error::{Result, SimError};
pub use field::{Field, FieldType};
pub use frames::{create_frames, create_frames_with, Frame, FrameSequencer};
pub use grid::Grid;
pub use params::SimParams;
pub use spin_lattice::SpinLattice;
