// src/params.rs

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::field::FieldType;
use crate::grid::Grid;

/// Everything needed to build and run one simulation.
///
/// Defaults reproduce the interactive dashboard: a 20 × 20 lattice over
/// (-10, 10)², uniform field, both couplings 1, increment 0.1 and
/// 30 frames of 10 steps each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub n: usize,
    pub m: usize,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),

    pub field_type: FieldType,
    pub field_coefficient: f64, // dashboard slider range [-1, 1]
    pub spin_coefficient: f64,  // dashboard slider range [-1, 1]

    pub increment: f64,
    pub n_frames: usize,
    pub n_per_frame: usize,

    /// Fixes the initial random angles. `None` draws from the OS.
    pub seed: Option<u64>,
    /// Spread per-site work of each step over rayon workers.
    pub parallel: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            n: 20,
            m: 20,
            x_range: (-10.0, 10.0),
            y_range: (-10.0, 10.0),
            field_type: FieldType::Uniform,
            field_coefficient: 1.0,
            spin_coefficient: 1.0,
            increment: 0.1,
            n_frames: 30,
            n_per_frame: 10,
            seed: None,
            parallel: false,
        }
    }
}

impl SimParams {
    pub fn grid(&self) -> Result<Grid> {
        Grid::new(self.n, self.m, self.x_range, self.y_range)
    }

    /// Coefficients and increment may be any real number, but not NaN/inf.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("field_coefficient", self.field_coefficient),
            ("spin_coefficient", self.spin_coefficient),
            ("increment", self.increment),
        ] {
            if !v.is_finite() {
                return Err(SimError::InvalidParameter(format!(
                    "{name} must be finite (got {v})"
                )));
            }
        }
        Ok(())
    }

    /// Load parameters from JSON. Missing keys fall back to the defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let params: SimParams = serde_json::from_reader(BufReader::new(file))?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let p: SimParams =
            serde_json::from_str(r#"{ "field_type": "decreasing curl", "seed": 5, "n": 8 }"#)
                .unwrap();
        assert_eq!(p.field_type, FieldType::DecreasingCurl);
        assert_eq!(p.seed, Some(5));
        assert_eq!(p.n, 8);
        assert_eq!(p.m, 20);
        assert_eq!(p.n_frames, 30);
    }

    #[test]
    fn unknown_field_type_in_json_is_an_error() {
        assert!(serde_json::from_str::<SimParams>(r#"{ "field_type": "swirl" }"#).is_err());
    }

    #[test]
    fn non_finite_increment_is_rejected() {
        let p = SimParams {
            increment: f64::NAN,
            ..SimParams::default()
        };
        assert!(matches!(p.validate(), Err(SimError::InvalidParameter(_))));
        assert!(SimParams::default().validate().is_ok());
    }

    #[test]
    fn default_grid_matches_dashboard() {
        assert_eq!(SimParams::default().grid().unwrap(), Grid::default());
    }
}
