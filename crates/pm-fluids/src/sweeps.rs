//! Sweep definitions: ordered sample values for one property.
//!
//! Used by the sampler to drive the provider across a range, e.g. a
//! temperature sweep along an isobar or a volume sweep along an isotherm.

use crate::error::FluidError;
use crate::units::{Quantity, UnitError, parse_quantity};
use std::fmt;
use thiserror::Error;

/// Error building or running a sweep.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    /// Sweep bounds, point count or property combination is unusable.
    #[error("Invalid sweep configuration: {0}")]
    InvalidConfiguration(String),
    /// A bound did not parse.
    #[error("{bound} value error: {source}")]
    Unit {
        bound: &'static str,
        #[source]
        source: UnitError,
    },
}

impl From<SweepError> for FluidError {
    fn from(err: SweepError) -> Self {
        FluidError::InvalidInput {
            what: err.to_string(),
        }
    }
}

/// Type of sweep progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepType {
    /// Uniformly spaced points
    Linear,
    /// Logarithmically spaced points (positive bounds only)
    Logarithmic,
}

/// Definition of a single parameter sweep, bounds in canonical SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepDefinition {
    /// Quantity being swept (Temperature, Pressure, etc.)
    pub quantity: Quantity,
    /// Start value in canonical SI units
    pub start_si: f64,
    /// End value in canonical SI units
    pub end_si: f64,
    /// Number of points to generate
    pub num_points: usize,
    /// Spacing type
    pub sweep_type: SweepType,
}

impl SweepDefinition {
    /// Create a sweep from SI bounds.
    pub fn new(
        quantity: Quantity,
        start_si: f64,
        end_si: f64,
        num_points: usize,
        sweep_type: SweepType,
    ) -> Result<Self, SweepError> {
        if !start_si.is_finite() || !end_si.is_finite() {
            return Err(SweepError::InvalidConfiguration(
                "Sweep bounds must be finite".to_string(),
            ));
        }
        if num_points < 2 {
            return Err(SweepError::InvalidConfiguration(
                "Sweep must have at least 2 points".to_string(),
            ));
        }
        if (start_si - end_si).abs() < 1e-12 * start_si.abs().max(end_si.abs()).max(1.0) {
            return Err(SweepError::InvalidConfiguration(
                "Start and end values must be different".to_string(),
            ));
        }
        if sweep_type == SweepType::Logarithmic && (start_si <= 0.0 || end_si <= 0.0) {
            return Err(SweepError::InvalidConfiguration(
                "Logarithmic sweep bounds must be positive".to_string(),
            ));
        }

        Ok(Self {
            quantity,
            start_si,
            end_si,
            num_points,
            sweep_type,
        })
    }

    /// Create a sweep from user text inputs such as "25C" and "1 MPa".
    pub fn from_text(
        start_raw: &str,
        end_raw: &str,
        quantity: Quantity,
        num_points: usize,
        sweep_type: SweepType,
    ) -> Result<Self, SweepError> {
        let start_si = parse_quantity(start_raw, quantity).map_err(|source| SweepError::Unit {
            bound: "Start",
            source,
        })?;
        let end_si = parse_quantity(end_raw, quantity).map_err(|source| SweepError::Unit {
            bound: "End",
            source,
        })?;
        Self::new(quantity, start_si, end_si, num_points, sweep_type)
    }

    /// Generate all points in the sweep.
    pub fn generate_points(&self) -> Vec<f64> {
        match self.sweep_type {
            SweepType::Linear => linear_points(self.start_si, self.end_si, self.num_points),
            SweepType::Logarithmic => log_points(self.start_si, self.end_si, self.num_points),
        }
    }
}

/// `n` evenly spaced points from `start` to `end`, endpoints exact.
pub fn linear_points(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![start];
    }

    let delta = (end - start) / (n - 1) as f64;
    let mut points: Vec<f64> = (0..n).map(|i| start + i as f64 * delta).collect();
    points[n - 1] = end;
    points
}

/// `n` logarithmically spaced points from `start` to `end`, endpoints exact.
///
/// Falls back to linear spacing when either bound is not positive.
pub fn log_points(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![start];
    }
    if start <= 0.0 || end <= 0.0 {
        return linear_points(start, end, n);
    }

    let log_start = start.ln();
    let log_delta = (end.ln() - log_start) / (n - 1) as f64;
    let mut points: Vec<f64> = (0..n)
        .map(|i| (log_start + i as f64 * log_delta).exp())
        .collect();
    points[0] = start;
    points[n - 1] = end;
    points
}

impl fmt::Display for SweepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Logarithmic => write!(f, "Logarithmic"),
        }
    }
}

impl fmt::Display for SweepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sweep {} from {} to {} ({} points, {})",
            self.quantity, self.start_si, self.end_si, self.num_points, self.sweep_type
        )
    }
}
