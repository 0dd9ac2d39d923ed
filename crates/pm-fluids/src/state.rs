//! Thermodynamic state definitions.

use crate::error::{FluidError, FluidResult};
use crate::substance::Substance;
use pm_core::units::{
    Density, Pressure, SpecEnthalpy, SpecEntropy, SpecInternalEnergy, SpecVolume, Temperature,
    density_from_volume, k, pa, pressure_pa, temperature_k,
};
use std::fmt;

/// Two independent intensive properties that fix a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateInput {
    /// Pressure and temperature (single-phase only).
    PT { p: Pressure, t: Temperature },
    /// Pressure and quality (saturated states).
    PQ { p: Pressure, x: f64 },
    /// Temperature and quality (saturated states).
    TQ { t: Temperature, x: f64 },
    /// Temperature and specific volume [m³/kg].
    TV { t: Temperature, v: SpecVolume },
    /// Pressure and specific volume [m³/kg].
    PV { p: Pressure, v: SpecVolume },
    /// Pressure and specific enthalpy [J/kg].
    PH { p: Pressure, h: SpecEnthalpy },
    /// Pressure and specific entropy [J/(kg·K)].
    PS { p: Pressure, s: SpecEntropy },
}

impl StateInput {
    /// Build an input from a pair tag and two raw SI values (first, second as
    /// ordered by [`PropertyPair::first`] / [`PropertyPair::second`]).
    pub fn from_pair(pair: PropertyPair, first: f64, second: f64) -> Self {
        match pair {
            PropertyPair::PT => StateInput::PT {
                p: pa(first),
                t: k(second),
            },
            PropertyPair::PQ => StateInput::PQ {
                p: pa(first),
                x: second,
            },
            PropertyPair::TQ => StateInput::TQ {
                t: k(first),
                x: second,
            },
            PropertyPair::TV => StateInput::TV {
                t: k(first),
                v: second,
            },
            PropertyPair::PV => StateInput::PV {
                p: pa(first),
                v: second,
            },
            PropertyPair::PH => StateInput::PH {
                p: pa(first),
                h: second,
            },
            PropertyPair::PS => StateInput::PS {
                p: pa(first),
                s: second,
            },
        }
    }

    pub fn pair(&self) -> PropertyPair {
        match self {
            StateInput::PT { .. } => PropertyPair::PT,
            StateInput::PQ { .. } => PropertyPair::PQ,
            StateInput::TQ { .. } => PropertyPair::TQ,
            StateInput::TV { .. } => PropertyPair::TV,
            StateInput::PV { .. } => PropertyPair::PV,
            StateInput::PH { .. } => PropertyPair::PH,
            StateInput::PS { .. } => PropertyPair::PS,
        }
    }

    /// Reject inputs that can never fix a state before they reach a backend.
    ///
    /// Malformed numbers are `InvalidInput`; a quality outside [0, 1] is a
    /// well-formed but unrealizable query and reports `OutOfRange`.
    pub fn validate(&self) -> FluidResult<()> {
        match *self {
            StateInput::PT { p, t } => {
                validation::validate_pressure(p)?;
                validation::validate_temperature(t)
            }
            StateInput::PQ { p, x } => {
                validation::validate_pressure(p)?;
                validation::validate_quality(x)
            }
            StateInput::TQ { t, x } => {
                validation::validate_temperature(t)?;
                validation::validate_quality(x)
            }
            StateInput::TV { t, v } => {
                validation::validate_temperature(t)?;
                validation::validate_volume(v)
            }
            StateInput::PV { p, v } => {
                validation::validate_pressure(p)?;
                validation::validate_volume(v)
            }
            StateInput::PH { p, h } => {
                validation::validate_pressure(p)?;
                validation::validate_finite(h, "enthalpy")
            }
            StateInput::PS { p, s } => {
                validation::validate_pressure(p)?;
                validation::validate_finite(s, "entropy")
            }
        }
    }
}

impl fmt::Display for StateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StateInput::PT { p, t } => {
                write!(f, "P={} Pa, T={} K", pressure_pa(p), temperature_k(t))
            }
            StateInput::PQ { p, x } => write!(f, "P={} Pa, x={}", pressure_pa(p), x),
            StateInput::TQ { t, x } => write!(f, "T={} K, x={}", temperature_k(t), x),
            StateInput::TV { t, v } => write!(f, "T={} K, v={} m3/kg", temperature_k(t), v),
            StateInput::PV { p, v } => write!(f, "P={} Pa, v={} m3/kg", pressure_pa(p), v),
            StateInput::PH { p, h } => write!(f, "P={} Pa, h={} J/kg", pressure_pa(p), h),
            StateInput::PS { p, s } => write!(f, "P={} Pa, s={} J/(kg K)", pressure_pa(p), s),
        }
    }
}

/// Single intensive property of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Temperature,
    Pressure,
    SpecificVolume,
    Density,
    Quality,
    InternalEnergy,
    Enthalpy,
    Entropy,
}

impl Property {
    pub const ALL: [Property; 8] = [
        Property::Temperature,
        Property::Pressure,
        Property::SpecificVolume,
        Property::Density,
        Property::Quality,
        Property::InternalEnergy,
        Property::Enthalpy,
        Property::Entropy,
    ];

    /// Column header with SI unit.
    pub fn label(self) -> &'static str {
        match self {
            Property::Temperature => "T [K]",
            Property::Pressure => "P [Pa]",
            Property::SpecificVolume => "v [m^3/kg]",
            Property::Density => "rho [kg/m^3]",
            Property::Quality => "x [-]",
            Property::InternalEnergy => "u [J/kg]",
            Property::Enthalpy => "h [J/kg]",
            Property::Entropy => "s [J/(kg K)]",
        }
    }

    /// Short machine-friendly name used for CSV headers.
    pub fn key(self) -> &'static str {
        match self {
            Property::Temperature => "temperature_k",
            Property::Pressure => "pressure_pa",
            Property::SpecificVolume => "specific_volume_m3_kg",
            Property::Density => "density_kg_m3",
            Property::Quality => "quality",
            Property::InternalEnergy => "internal_energy_j_kg",
            Property::Enthalpy => "enthalpy_j_kg",
            Property::Entropy => "entropy_j_kg_k",
        }
    }
}

/// Property pairs understood by [`StateInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyPair {
    PT,
    PQ,
    TQ,
    TV,
    PV,
    PH,
    PS,
}

impl PropertyPair {
    pub fn label(self) -> &'static str {
        match self {
            Self::PT => "P-T",
            Self::PQ => "P-x",
            Self::TQ => "T-x",
            Self::TV => "T-v",
            Self::PV => "P-v",
            Self::PH => "P-h",
            Self::PS => "P-s",
        }
    }

    pub fn first(self) -> Property {
        match self {
            Self::PT | Self::PQ | Self::PV | Self::PH | Self::PS => Property::Pressure,
            Self::TQ | Self::TV => Property::Temperature,
        }
    }

    pub fn second(self) -> Property {
        match self {
            Self::PT => Property::Temperature,
            Self::PQ | Self::TQ => Property::Quality,
            Self::TV | Self::PV => Property::SpecificVolume,
            Self::PH => Property::Enthalpy,
            Self::PS => Property::Entropy,
        }
    }

    /// Pair formed by two properties in either order, if supported.
    pub fn from_properties(a: Property, b: Property) -> Option<(Self, bool)> {
        use Property as P;
        let pair = match (a, b) {
            (P::Pressure, P::Temperature) | (P::Temperature, P::Pressure) => Self::PT,
            (P::Pressure, P::Quality) | (P::Quality, P::Pressure) => Self::PQ,
            (P::Temperature, P::Quality) | (P::Quality, P::Temperature) => Self::TQ,
            (P::Temperature, P::SpecificVolume) | (P::SpecificVolume, P::Temperature) => Self::TV,
            (P::Pressure, P::SpecificVolume) | (P::SpecificVolume, P::Pressure) => Self::PV,
            (P::Pressure, P::Enthalpy) | (P::Enthalpy, P::Pressure) => Self::PH,
            (P::Pressure, P::Entropy) | (P::Entropy, P::Pressure) => Self::PS,
            _ => return None,
        };
        let swapped = pair.first() != a;
        Some((pair, swapped))
    }
}

/// Raw SI values read back from a provider right after a state was fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateProperties {
    /// Temperature [K]
    pub t_k: f64,
    /// Pressure [Pa]
    pub p_pa: f64,
    /// Specific volume [m³/kg]
    pub v_m3_kg: SpecVolume,
    /// Vapor mass fraction, only for saturated states
    pub quality: Option<f64>,
    /// Specific internal energy [J/kg]
    pub u_j_kg: SpecInternalEnergy,
    /// Specific enthalpy [J/kg]
    pub h_j_kg: SpecEnthalpy,
    /// Specific entropy [J/(kg·K)]
    pub s_j_kg_k: SpecEntropy,
}

/// Immutable snapshot of a pure substance at equilibrium.
///
/// Density is never stored; it is always `1 / v`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermoState {
    substance: Substance,
    props: StateProperties,
}

impl ThermoState {
    /// Create a state, validating that T, P and v are positive and finite and
    /// that any quality lies in [0, 1].
    pub fn new(substance: Substance, props: StateProperties) -> FluidResult<Self> {
        validation::validate_temperature(k(props.t_k))?;
        validation::validate_pressure(pa(props.p_pa))?;
        validation::validate_volume(props.v_m3_kg)?;
        if let Some(x) = props.quality {
            validation::validate_quality(x)?;
        }
        validation::validate_finite(props.u_j_kg, "internal energy")?;
        validation::validate_finite(props.h_j_kg, "enthalpy")?;
        validation::validate_finite(props.s_j_kg_k, "entropy")?;
        Ok(Self { substance, props })
    }

    pub fn substance(&self) -> Substance {
        self.substance
    }

    pub fn temperature(&self) -> Temperature {
        k(self.props.t_k)
    }

    pub fn pressure(&self) -> Pressure {
        pa(self.props.p_pa)
    }

    pub fn temperature_k(&self) -> f64 {
        self.props.t_k
    }

    pub fn pressure_pa(&self) -> f64 {
        self.props.p_pa
    }

    /// Specific volume [m³/kg].
    pub fn specific_volume(&self) -> SpecVolume {
        self.props.v_m3_kg
    }

    pub fn density(&self) -> Density {
        density_from_volume(self.props.v_m3_kg)
    }

    pub fn density_kg_m3(&self) -> f64 {
        1.0 / self.props.v_m3_kg
    }

    /// Vapor mass fraction; `None` unless the state is saturated.
    pub fn quality(&self) -> Option<f64> {
        self.props.quality
    }

    pub fn internal_energy(&self) -> SpecInternalEnergy {
        self.props.u_j_kg
    }

    pub fn enthalpy(&self) -> SpecEnthalpy {
        self.props.h_j_kg
    }

    pub fn entropy(&self) -> SpecEntropy {
        self.props.s_j_kg_k
    }

    pub fn properties(&self) -> &StateProperties {
        &self.props
    }

    /// Value of `property` in SI units. Quality is `None` off the envelope.
    pub fn value(&self, property: Property) -> Option<f64> {
        match property {
            Property::Temperature => Some(self.props.t_k),
            Property::Pressure => Some(self.props.p_pa),
            Property::SpecificVolume => Some(self.props.v_m3_kg),
            Property::Density => Some(self.density_kg_m3()),
            Property::Quality => self.props.quality,
            Property::InternalEnergy => Some(self.props.u_j_kg),
            Property::Enthalpy => Some(self.props.h_j_kg),
            Property::Entropy => Some(self.props.s_j_kg_k),
        }
    }
}

impl fmt::Display for ThermoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: T={:.3} K, P={:.1} Pa, v={:.6e} m3/kg",
            self.substance, self.props.t_k, self.props.p_pa, self.props.v_m3_kg
        )?;
        if let Some(x) = self.props.quality {
            write!(f, ", x={:.4}", x)?;
        }
        Ok(())
    }
}

/// Validation helpers for state inputs and outputs.
pub(crate) mod validation {
    use super::*;
    use pm_core::numeric::{ensure_finite, ensure_positive};

    pub fn validate_pressure(p: Pressure) -> FluidResult<()> {
        ensure_positive(pressure_pa(p), "pressure")?;
        Ok(())
    }

    pub fn validate_temperature(t: Temperature) -> FluidResult<()> {
        ensure_positive(temperature_k(t), "temperature")?;
        Ok(())
    }

    pub fn validate_volume(v: SpecVolume) -> FluidResult<()> {
        ensure_positive(v, "specific volume")?;
        Ok(())
    }

    pub fn validate_quality(x: f64) -> FluidResult<()> {
        if !x.is_finite() {
            return Err(FluidError::invalid("quality must be finite"));
        }
        if !(0.0..=1.0).contains(&x) {
            return Err(FluidError::out_of_range(format!(
                "quality must be between 0 and 1, got {x}"
            )));
        }
        Ok(())
    }

    pub fn validate_finite(value: f64, what: &'static str) -> FluidResult<()> {
        ensure_finite(value, what)?;
        Ok(())
    }
}
