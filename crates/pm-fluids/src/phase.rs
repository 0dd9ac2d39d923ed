//! Phase classification from specific volume and the saturation envelope.

use crate::error::FluidResult;
use crate::provider::PropertyProvider;
use crate::saturation::SaturationEnvelope;
use crate::state::{StateInput, ThermoState, validation};
use pm_core::numeric::{Tolerances, nearly_equal};
use pm_core::units::{Pressure, SpecVolume, Temperature, pressure_pa, temperature_k};
use std::fmt;

/// Phase of a pure-substance state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// v < v_f
    CompressedLiquid,
    /// v == v_f
    SaturatedLiquid,
    /// v_f < v < v_g
    SaturatedMixture { quality: f64 },
    /// v == v_g
    SaturatedVapor,
    /// v > v_g
    SuperheatedVapor,
    /// Above both T_crit and P_crit, or exactly at the critical point.
    Supercritical,
}

impl Phase {
    /// Vapor mass fraction, defined only on the saturation envelope.
    pub fn quality(&self) -> Option<f64> {
        match *self {
            Phase::SaturatedLiquid => Some(0.0),
            Phase::SaturatedMixture { quality } => Some(quality),
            Phase::SaturatedVapor => Some(1.0),
            _ => None,
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.quality().is_some()
    }

    pub fn is_two_phase(&self) -> bool {
        matches!(self, Phase::SaturatedMixture { .. })
    }

    /// Position along increasing v at fixed subcritical P or T.
    pub fn rank(&self) -> u8 {
        match self {
            Phase::CompressedLiquid => 0,
            Phase::SaturatedLiquid => 1,
            Phase::SaturatedMixture { .. } => 2,
            Phase::SaturatedVapor => 3,
            Phase::SuperheatedVapor => 4,
            Phase::Supercritical => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::CompressedLiquid => "compressed liquid",
            Phase::SaturatedLiquid => "saturated liquid",
            Phase::SaturatedMixture { .. } => "saturated mixture",
            Phase::SaturatedVapor => "saturated vapor",
            Phase::SuperheatedVapor => "superheated vapor",
            Phase::Supercritical => "supercritical",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::SaturatedMixture { quality } => {
                write!(f, "{} (x={:.4})", self.label(), quality)
            }
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// Phase classifier with a configurable boundary tolerance.
///
/// v is treated as sitting on a saturation line when it matches v_f or v_g
/// within the tolerance.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    tol: Tolerances,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            tol: Tolerances::property(),
        }
    }
}

impl Classifier {
    pub fn with_tolerances(tol: Tolerances) -> Self {
        Self { tol }
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tol
    }

    /// Classify `v` against an envelope computed at the state's P or T.
    pub fn classify(&self, v: SpecVolume, envelope: &SaturationEnvelope) -> Phase {
        let (v_f, v_g) = (envelope.v_f(), envelope.v_g());

        if envelope.is_collapsed(self.tol) {
            return if nearly_equal(v, v_f, self.tol) {
                Phase::Supercritical
            } else if v < v_f {
                Phase::CompressedLiquid
            } else {
                Phase::SuperheatedVapor
            };
        }

        if nearly_equal(v, v_f, self.tol) {
            Phase::SaturatedLiquid
        } else if nearly_equal(v, v_g, self.tol) {
            Phase::SaturatedVapor
        } else if v < v_f {
            Phase::CompressedLiquid
        } else if v > v_g {
            Phase::SuperheatedVapor
        } else {
            Phase::SaturatedMixture {
                quality: (v - v_f) / (v_g - v_f),
            }
        }
    }

    /// Classify a state given by temperature and specific volume.
    ///
    /// Above T_crit there is no envelope at `t`, so the state is fixed to
    /// read its pressure and classified like a captured state.
    pub fn at_temperature<P>(
        &self,
        provider: &mut P,
        t: Temperature,
        v: SpecVolume,
    ) -> FluidResult<Phase>
    where
        P: PropertyProvider + ?Sized,
    {
        validation::validate_temperature(t)?;
        validation::validate_volume(v)?;
        if provider
            .critical_point()
            .is_above_temperature(temperature_k(t), self.tol)
        {
            let state = provider.state(StateInput::TV { t, v })?;
            return self.state(provider, &state);
        }
        let envelope = SaturationEnvelope::at_temperature(provider, t)?;
        Ok(self.classify(v, &envelope))
    }

    /// Classify a state given by pressure and specific volume.
    ///
    /// Above P_crit there is no envelope at `p`, so the state is fixed to
    /// read its temperature and classified like a captured state.
    pub fn at_pressure<P>(
        &self,
        provider: &mut P,
        p: Pressure,
        v: SpecVolume,
    ) -> FluidResult<Phase>
    where
        P: PropertyProvider + ?Sized,
    {
        validation::validate_pressure(p)?;
        validation::validate_volume(v)?;
        if provider
            .critical_point()
            .is_above_pressure(pressure_pa(p), self.tol)
        {
            let state = provider.state(StateInput::PV { p, v })?;
            return self.state(provider, &state);
        }
        let envelope = SaturationEnvelope::at_pressure(provider, p)?;
        Ok(self.classify(v, &envelope))
    }

    /// Classify a captured state.
    ///
    /// Supercritical only when both T and P lie above the critical point.
    /// Otherwise the envelope at the state's temperature decides, or at its
    /// pressure when T alone is above critical.
    pub fn state<P>(&self, provider: &mut P, state: &ThermoState) -> FluidResult<Phase>
    where
        P: PropertyProvider + ?Sized,
    {
        let critical = provider.critical_point();
        let above_t = critical.is_above_temperature(state.temperature_k(), self.tol);
        let above_p = critical.is_above_pressure(state.pressure_pa(), self.tol);
        let envelope = match (above_t, above_p) {
            (true, true) => return Ok(Phase::Supercritical),
            (true, false) => SaturationEnvelope::at_pressure(provider, state.pressure())?,
            (false, _) => SaturationEnvelope::at_temperature(provider, state.temperature())?,
        };
        Ok(self.classify(state.specific_volume(), &envelope))
    }
}

/// Classify `v` against `envelope` with the default tolerance.
pub fn classify(v: SpecVolume, envelope: &SaturationEnvelope) -> Phase {
    Classifier::default().classify(v, envelope)
}

pub fn classify_at_temperature<P>(
    provider: &mut P,
    t: Temperature,
    v: SpecVolume,
) -> FluidResult<Phase>
where
    P: PropertyProvider + ?Sized,
{
    Classifier::default().at_temperature(provider, t, v)
}

pub fn classify_at_pressure<P>(
    provider: &mut P,
    p: Pressure,
    v: SpecVolume,
) -> FluidResult<Phase>
where
    P: PropertyProvider + ?Sized,
{
    Classifier::default().at_pressure(provider, p, v)
}

pub fn classify_state<P>(provider: &mut P, state: &ThermoState) -> FluidResult<Phase>
where
    P: PropertyProvider + ?Sized,
{
    Classifier::default().state(provider, state)
}
