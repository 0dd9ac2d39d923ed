//! Property provider trait and substance constants.

use crate::error::FluidResult;
use crate::state::{StateInput, ThermoState};
use crate::substance::Substance;
use pm_core::numeric::{Tolerances, nearly_equal};
use pm_core::units::{
    Density, Pressure, SpecVolume, Temperature, pressure_pa, temperature_k, volume_from_density,
};

/// Critical point constants of a pure substance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalPoint {
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub density: Density,
}

impl CriticalPoint {
    pub fn temperature_k(&self) -> f64 {
        temperature_k(self.temperature)
    }

    pub fn pressure_pa(&self) -> f64 {
        pressure_pa(self.pressure)
    }

    /// Critical specific volume [m³/kg].
    pub fn specific_volume(&self) -> SpecVolume {
        volume_from_density(self.density)
    }

    /// True when `t_k` is above T_crit by more than `tol`.
    pub fn is_above_temperature(&self, t_k: f64, tol: Tolerances) -> bool {
        t_k > self.temperature_k() && !nearly_equal(t_k, self.temperature_k(), tol)
    }

    /// True when `p_pa` is above P_crit by more than `tol`.
    pub fn is_above_pressure(&self, p_pa: f64, tol: Tolerances) -> bool {
        p_pa > self.pressure_pa() && !nearly_equal(p_pa, self.pressure_pa(), tol)
    }

    pub fn is_at_temperature(&self, t_k: f64, tol: Tolerances) -> bool {
        nearly_equal(t_k, self.temperature_k(), tol)
    }

    pub fn is_at_pressure(&self, p_pa: f64, tol: Tolerances) -> bool {
        nearly_equal(p_pa, self.pressure_pa(), tol)
    }
}

/// Source of thermodynamic states for one pure substance.
///
/// A provider wraps a single backend handle that holds exactly one state at a
/// time: every [`state`](PropertyProvider::state) call overwrites whatever the
/// handle held before. The `&mut self` receiver makes that explicit, and the
/// returned [`ThermoState`] is an owned snapshot captured right after the
/// update, so callers never read a stale handle.
pub trait PropertyProvider {
    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Substance this provider was created for.
    fn substance(&self) -> Substance;

    /// Fix a state from two independent properties and capture all others.
    ///
    /// Errors:
    /// - `InvalidInput` for malformed inputs or a dependent pair (e.g. P and T
    ///   on the saturation line),
    /// - `OutOfRange` / `ConvergenceFailed` when the backend cannot reach the
    ///   state,
    /// - `Backend` for anything else.
    fn state(&mut self, input: StateInput) -> FluidResult<ThermoState>;

    /// Critical point constants.
    fn critical_point(&self) -> CriticalPoint;

    /// Triple point temperature (lower end of the saturation line).
    fn triple_point_temperature(&self) -> Temperature;

    /// Valid temperature range of the equation of state `(min, max)`.
    fn temperature_limits(&self) -> (Temperature, Temperature);
}
