// src/field.rs
//
// Static analytic force fields sampled on a grid.
//
// Radial and curl variants are evaluated straight from their formulas. At
// r = 0 they divide zero by zero, so a grid that contains the origin carries
// NaN at that site. This is left unguarded: the first step turns only that
// spin NaN, and each later step spreads it one site further through the
// neighbour sum.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::grid::Grid;
use crate::vector_field::VectorField2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    /// (1, 1)
    Uniform,
    /// (x, y) / 4
    IncreasingRadial,
    /// (x, y) / r
    Radial,
    /// 4 (x, y) / r²
    DecreasingRadial,
    /// (−y, x) / 4
    IncreasingCurl,
    /// (−y, x) / r
    Curl,
    /// 4 (−y, x) / r²
    DecreasingCurl,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::Uniform,
        FieldType::IncreasingRadial,
        FieldType::Radial,
        FieldType::DecreasingRadial,
        FieldType::IncreasingCurl,
        FieldType::Curl,
        FieldType::DecreasingCurl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::IncreasingRadial => "increasing radial",
            Self::Radial => "radial",
            Self::DecreasingRadial => "decreasing radial",
            Self::IncreasingCurl => "increasing curl",
            Self::Curl => "curl",
            Self::DecreasingCurl => "decreasing curl",
        }
    }

    /// Field vector at a single point.
    #[inline]
    pub fn evaluate(&self, x: f64, y: f64) -> [f64; 2] {
        let r2 = x * x + y * y;
        match self {
            Self::Uniform => [1.0, 1.0],
            Self::IncreasingRadial => [0.25 * x, 0.25 * y],
            Self::Radial => {
                let r = r2.sqrt();
                [x / r, y / r]
            }
            Self::DecreasingRadial => [4.0 * x / r2, 4.0 * y / r2],
            Self::IncreasingCurl => [-0.25 * y, 0.25 * x],
            Self::Curl => {
                let r = r2.sqrt();
                [-y / r, x / r]
            }
            Self::DecreasingCurl => [-4.0 * y / r2, 4.0 * x / r2],
        }
    }

    /// Whether the formula divides by r (undefined at the origin).
    pub fn is_singular_at_origin(&self) -> bool {
        !matches!(
            self,
            Self::Uniform | Self::IncreasingRadial | Self::IncreasingCurl
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = SimError;

    /// Case-insensitive; `_` and `-` count as spaces ("increasing-radial").
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | '-' => ' ',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        let key = key.split_whitespace().collect::<Vec<_>>().join(" ");

        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| SimError::UnknownFieldType(s.to_string()))
    }
}

impl TryFrom<String> for FieldType {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

/// The external force field: one static vector per grid site.
#[derive(Debug, Clone)]
pub struct Field {
    field_type: FieldType,
    vectors: VectorField2D,
}

impl Field {
    pub fn new(grid: Arc<Grid>, field_type: FieldType) -> Self {
        let mut field = Self {
            field_type,
            vectors: VectorField2D::new(grid),
        };
        field.generate();
        field
    }

    /// Build from a free-form selector such as `"decreasing curl"`.
    pub fn from_selector(grid: Arc<Grid>, field_type: &str) -> Result<Self> {
        Ok(Self::new(grid, field_type.parse()?))
    }

    fn generate(&mut self) {
        let grid = Arc::clone(&self.vectors.grid);
        let t = self.field_type;
        for (v, (&x, &y)) in self
            .vectors
            .data
            .iter_mut()
            .zip(grid.x().iter().zip(grid.y()))
        {
            *v = t.evaluate(x, y);
        }

        let bad = self.non_finite_sites();
        if bad > 0 {
            warn!(
                "field '{}' is non-finite at {} site(s) (origin singularity)",
                t, bad
            );
        }
    }

    /// Switch to a new formula by name. On error, the field is left unchanged.
    pub fn change_type(&mut self, field_type: &str) -> Result<()> {
        self.set_type(field_type.parse()?);
        Ok(())
    }

    /// Switch to a new formula and recompute every site.
    pub fn set_type(&mut self, field_type: FieldType) {
        self.field_type = field_type;
        self.generate();
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.vectors.grid
    }

    pub fn vectors(&self) -> &VectorField2D {
        &self.vectors
    }

    /// Per-site field vectors, row-major.
    pub fn data(&self) -> &[[f64; 2]] {
        &self.vectors.data
    }

    pub fn x(&self) -> Vec<f64> {
        self.vectors.x()
    }

    pub fn y(&self) -> Vec<f64> {
        self.vectors.y()
    }

    /// Number of sites where either component is NaN or infinite.
    pub fn non_finite_sites(&self) -> usize {
        self.vectors
            .data
            .iter()
            .filter(|v| !(v[0].is_finite() && v[1].is_finite()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_3x3() -> Arc<Grid> {
        // Contains the origin at (1, 1).
        Arc::new(Grid::new(3, 3, (-1.0, 1.0), (-1.0, 1.0)).unwrap())
    }

    #[test]
    fn parses_dashboard_names_and_variants() {
        for t in FieldType::ALL {
            assert_eq!(t.as_str().parse::<FieldType>().unwrap(), t);
        }
        assert_eq!(
            "Increasing-Radial".parse::<FieldType>().unwrap(),
            FieldType::IncreasingRadial
        );
        assert_eq!(
            " decreasing_curl ".parse::<FieldType>().unwrap(),
            FieldType::DecreasingCurl
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "spiral".parse::<FieldType>().unwrap_err();
        assert!(matches!(err, SimError::UnknownFieldType(ref s) if s == "spiral"));
        assert!(Field::from_selector(grid_3x3(), "").is_err());
    }

    #[test]
    fn formulas_match_reference_values() {
        let (x, y) = (3.0, 4.0);
        assert_eq!(FieldType::IncreasingRadial.evaluate(x, y), [0.75, 1.0]);
        assert_eq!(FieldType::IncreasingCurl.evaluate(x, y), [-1.0, 0.75]);

        let c = FieldType::Curl.evaluate(x, y);
        assert_relative_eq!(c[0], -0.8, epsilon = 1e-15);
        assert_relative_eq!(c[1], 0.6, epsilon = 1e-15);

        let d = FieldType::DecreasingRadial.evaluate(x, y);
        assert_relative_eq!(d[0], 12.0 / 25.0, epsilon = 1e-15);
        assert_relative_eq!(d[1], 16.0 / 25.0, epsilon = 1e-15);

        let d = FieldType::DecreasingCurl.evaluate(x, y);
        assert_relative_eq!(d[0], -16.0 / 25.0, epsilon = 1e-15);
        assert_relative_eq!(d[1], 12.0 / 25.0, epsilon = 1e-15);
    }

    #[test]
    fn origin_singularity_yields_nan_only_at_origin() {
        let grid = grid_3x3();
        for t in FieldType::ALL {
            let field = Field::new(grid.clone(), t);
            let centre = field.data()[grid.idx(1, 1)];
            if t.is_singular_at_origin() {
                assert!(centre[0].is_nan() && centre[1].is_nan(), "{t}: {centre:?}");
                assert_eq!(field.non_finite_sites(), 1, "{t}");
            } else {
                assert!(centre[0].is_finite() && centre[1].is_finite(), "{t}");
                assert_eq!(field.non_finite_sites(), 0, "{t}");
            }
        }
    }

    #[test]
    fn change_type_recomputes_and_keeps_state_on_error() {
        let mut field = Field::new(grid_3x3(), FieldType::Uniform);
        field.change_type("increasing curl").unwrap();
        assert_eq!(field.field_type(), FieldType::IncreasingCurl);
        assert_eq!(field.data()[0], [0.25, -0.25]); // site (-1, -1)

        assert!(field.change_type("nope").is_err());
        assert_eq!(field.field_type(), FieldType::IncreasingCurl);
        assert_eq!(field.data()[0], [0.25, -0.25]);
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&FieldType::DecreasingRadial).unwrap();
        assert_eq!(json, "\"decreasing radial\"");
        let back: FieldType = serde_json::from_str("\"curl\"").unwrap();
        assert_eq!(back, FieldType::Curl);
        assert!(serde_json::from_str::<FieldType>("\"bogus\"").is_err());
    }
}
