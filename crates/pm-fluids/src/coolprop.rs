//! CoolProp-based property provider.

use crate::error::{FluidError, FluidResult};
use crate::provider::{CriticalPoint, PropertyProvider};
use crate::state::{StateInput, StateProperties, ThermoState};
use crate::substance::Substance;
use pm_core::numeric::{Tolerances, nearly_equal};
use pm_core::units::{Temperature, k, kg_m3, pa, pressure_pa, temperature_k};
use rfluids::io::{FluidInputPair, FluidParam, FluidTrivialParam};
use rfluids::native::{AbstractState, CoolPropError};
use tracing::{debug, trace};

/// CoolProp backend (Helmholtz EOS) for one pure substance.
///
/// Owns a single `AbstractState`. Each query updates that handle and reads
/// every property back before returning.
pub struct CoolPropProvider {
    substance: Substance,
    handle: AbstractState,
    critical: CriticalPoint,
    t_triple_k: f64,
    t_min_k: f64,
    t_max_k: f64,
}

impl CoolPropProvider {
    /// CoolProp backend name.
    pub const BACKEND: &'static str = "HEOS";

    /// Create a provider and read the substance constants once.
    pub fn new(substance: Substance) -> FluidResult<Self> {
        let handle =
            AbstractState::new(Self::BACKEND, substance.coolprop_name()).map_err(|e| {
                FluidError::NotSupported {
                    what: format!("{} via {}: {}", substance, Self::BACKEND, e),
                }
            })?;

        let t_crit = trivial(&handle, FluidTrivialParam::TCritical, "T_crit")?;
        let p_crit = trivial(&handle, FluidTrivialParam::PCritical, "P_crit")?;
        let rho_crit = trivial(&handle, FluidTrivialParam::DMassCritical, "rho_crit")?;
        let t_triple_k = trivial(&handle, FluidTrivialParam::TTriple, "T_triple")?;
        let t_min_k = trivial(&handle, FluidTrivialParam::TMin, "T_min")?;
        let t_max_k = trivial(&handle, FluidTrivialParam::TMax, "T_max")?;

        debug!(
            substance = %substance,
            t_crit, p_crit, rho_crit, t_triple_k, "CoolProp provider ready"
        );

        Ok(Self {
            substance,
            handle,
            critical: CriticalPoint {
                temperature: k(t_crit),
                pressure: pa(p_crit),
                density: kg_m3(rho_crit),
            },
            t_triple_k,
            t_min_k,
            t_max_k,
        })
    }

    /// Push an input pair into the handle, replacing its current state.
    fn update(&mut self, input: StateInput) -> FluidResult<()> {
        let (pair, first, second) = match input {
            StateInput::PT { p, t } => (FluidInputPair::PT, pressure_pa(p), temperature_k(t)),
            StateInput::PQ { p, x } => (FluidInputPair::PQ, pressure_pa(p), x),
            StateInput::TQ { t, x } => (FluidInputPair::QT, x, temperature_k(t)),
            StateInput::TV { t, v } => (FluidInputPair::DMassT, 1.0 / v, temperature_k(t)),
            StateInput::PV { p, v } => (FluidInputPair::DMassP, 1.0 / v, pressure_pa(p)),
            StateInput::PH { p, h } => (FluidInputPair::HMassP, h, pressure_pa(p)),
            StateInput::PS { p, s } => (FluidInputPair::PSMass, pressure_pa(p), s),
        };
        self.handle
            .update(pair, first, second)
            .map_err(|e| backend_error(&input, e))
    }

    /// Read all properties of the state currently held by the handle.
    fn capture(&self, input: &StateInput) -> FluidResult<ThermoState> {
        let read = |param: FluidParam, label: &str| -> FluidResult<f64> {
            let value = read_param(&self.handle, param, input)?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(FluidError::ConvergenceFailed {
                    what: format!("non-finite {label} at {input}"),
                })
            }
        };

        let rho = read(FluidParam::DMass, "density")?;
        let quality = self
            .handle
            .keyed_output(FluidParam::Q)
            .ok()
            .filter(|q| (0.0..=1.0).contains(q));

        ThermoState::new(
            self.substance,
            StateProperties {
                t_k: read(FluidParam::T, "temperature")?,
                p_pa: read(FluidParam::P, "pressure")?,
                v_m3_kg: 1.0 / rho,
                quality,
                u_j_kg: read(FluidParam::UMass, "internal energy")?,
                h_j_kg: read(FluidParam::HMass, "enthalpy")?,
                s_j_kg_k: read(FluidParam::SMass, "entropy")?,
            },
        )
    }

    /// P and T only fix a state off the saturation line.
    ///
    /// Below the triple-point pressure the backend has no saturation line to
    /// compare against, so the pair is passed through.
    fn check_pt_independent(&mut self, input: &StateInput) -> FluidResult<()> {
        let StateInput::PT { p, t } = *input else {
            return Ok(());
        };
        let p_pa = pressure_pa(p);
        if p_pa >= self.critical.pressure_pa() {
            return Ok(());
        }
        let sat = StateInput::PQ { p, x: 0.0 };
        let t_sat = match self
            .update(sat)
            .and_then(|()| read_param(&self.handle, FluidParam::T, &sat))
        {
            Ok(t_sat) => t_sat,
            Err(err) if err.is_out_of_range() => {
                trace!(%input, error = %err, "no saturation line at this pressure");
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        };
        if nearly_equal(temperature_k(t), t_sat, tol) {
            return Err(FluidError::invalid(format!(
                "P and T are not independent on the saturation line ({input}); specify quality"
            )));
        }
        Ok(())
    }
}

impl PropertyProvider for CoolPropProvider {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn substance(&self) -> Substance {
        self.substance
    }

    fn state(&mut self, input: StateInput) -> FluidResult<ThermoState> {
        input.validate()?;
        self.check_pt_independent(&input)?;
        trace!(substance = %self.substance, %input, "fixing state");
        self.update(input)?;
        self.capture(&input)
    }

    fn critical_point(&self) -> CriticalPoint {
        self.critical
    }

    fn triple_point_temperature(&self) -> Temperature {
        k(self.t_triple_k)
    }

    fn temperature_limits(&self) -> (Temperature, Temperature) {
        (k(self.t_min_k), k(self.t_max_k))
    }
}

fn trivial(handle: &AbstractState, param: FluidTrivialParam, label: &str) -> FluidResult<f64> {
    handle.keyed_output(param).map_err(|e| FluidError::Backend {
        message: format!("reading {label}: {e}"),
    })
}

fn read_param(handle: &AbstractState, param: FluidParam, input: &StateInput) -> FluidResult<f64> {
    handle
        .keyed_output(param)
        .map_err(|e| backend_error(input, e))
}

/// Map a CoolProp failure onto the error taxonomy, keeping the input in the
/// message.
fn backend_error(input: &StateInput, err: CoolPropError) -> FluidError {
    match FluidError::from_backend_message(&err.to_string()) {
        FluidError::OutOfRange { what } => FluidError::OutOfRange {
            what: format!("{input}: {what}"),
        },
        FluidError::ConvergenceFailed { what } => FluidError::ConvergenceFailed {
            what: format!("{input}: {what}"),
        },
        FluidError::InvalidInput { what } => FluidError::InvalidInput {
            what: format!("{input}: {what}"),
        },
        FluidError::NotSupported { what } => FluidError::NotSupported {
            what: format!("{input}: {what}"),
        },
        FluidError::Backend { message } => FluidError::Backend {
            message: format!("{input}: {message}"),
        },
    }
}
