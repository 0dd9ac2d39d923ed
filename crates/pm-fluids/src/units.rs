//! Unit-aware numeric inputs.
//!
//! Values arrive as text with an optional unit tag ("25C", "1 MPa",
//! "0.32 m3/kg") and are converted to canonical SI:
//!
//! - temperature: K
//! - pressure: Pa (absolute)
//! - specific volume: m³/kg
//! - density: kg/m³
//! - specific enthalpy / internal energy: J/kg
//! - specific entropy: J/(kg·K)
//! - quality: fraction in [0, 1]
//!
//! A bare number is taken to already be in the canonical unit.

use pm_core::units::constants::{ATM_PA, CELSIUS_OFFSET_K};
use std::fmt;
use thiserror::Error;

/// Dimension/quantity family for a numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Temperature (canonical: Kelvin)
    Temperature,
    /// Absolute pressure (canonical: Pa)
    Pressure,
    /// Specific volume (canonical: m³/kg)
    SpecificVolume,
    /// Density (canonical: kg/m³)
    Density,
    /// Specific enthalpy / internal energy (canonical: J/kg)
    SpecificEnthalpy,
    /// Specific entropy (canonical: J/(kg·K))
    SpecificEntropy,
    /// Quality/dryness fraction (canonical: 0-1)
    Quality,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "Temperature"),
            Self::Pressure => write!(f, "Absolute Pressure"),
            Self::SpecificVolume => write!(f, "Specific Volume"),
            Self::Density => write!(f, "Density"),
            Self::SpecificEnthalpy => write!(f, "Specific Enthalpy"),
            Self::SpecificEntropy => write!(f, "Specific Entropy"),
            Self::Quality => write!(f, "Quality"),
        }
    }
}

/// Error in unit parsing or conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// Input text did not parse to a number + optional unit
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Unit not recognized for this quantity
    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit { unit: String, quantity: Quantity },
    /// Unit not allowed because it is ambiguous (plain "psi")
    #[error("Ambiguous unit '{unit}': {reason}")]
    AmbiguousUnit { unit: String, reason: &'static str },
    /// Value out of physical range (e.g., negative absolute temperature)
    #[error("Value {value} out of range: {reason}")]
    OutOfRange { value: f64, reason: &'static str },
}

/// Parse a quantity value from user input text into canonical SI units.
///
/// - `raw_text`: user input (e.g., "70F", "14.7 psia", "50%")
/// - `quantity`: dimension/quantity family for validation
pub fn parse_quantity(raw_text: &str, quantity: Quantity) -> Result<f64, UnitError> {
    let trimmed = raw_text.trim();

    match quantity {
        Quantity::Temperature => parse_temperature(trimmed),
        Quantity::Pressure => parse_pressure(trimmed),
        Quantity::SpecificVolume => parse_specific_volume(trimmed),
        Quantity::Density => parse_density(trimmed),
        Quantity::SpecificEnthalpy => parse_specific_enthalpy(trimmed),
        Quantity::SpecificEntropy => parse_specific_entropy(trimmed),
        Quantity::Quality => parse_quality(trimmed),
    }
}

/// Parse temperature in various units, return Kelvin.
fn parse_temperature(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let kelvin = match unit.to_lowercase().as_str() {
        "k" | "kelvin" => value,
        "c" | "°c" | "degc" | "celsius" => value + CELSIUS_OFFSET_K,
        "f" | "°f" | "degf" | "fahrenheit" => (value + 459.67) * 5.0 / 9.0,
        "r" | "°r" | "rankine" => value * 5.0 / 9.0,
        "" => value,
        _ => {
            return Err(UnitError::UnknownUnit {
                unit,
                quantity: Quantity::Temperature,
            });
        }
    };

    if kelvin <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: kelvin,
            reason: "Absolute temperature must be > 0 K",
        });
    }

    Ok(kelvin)
}

/// Parse pressure in various units, return Pa (absolute).
fn parse_pressure(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let pa = match unit.to_lowercase().as_str() {
        "pa" | "pascal" => value,
        "kpa" => value * 1e3,
        "mpa" => value * 1e6,
        "bar" => value * 1e5,
        "mbar" | "millibar" => value * 100.0,
        "atm" => value * ATM_PA,
        "torr" | "mmhg" => value * 133.322,
        "psia" => value * 6_894.76,
        "psi" => {
            return Err(UnitError::AmbiguousUnit {
                unit,
                reason: "Use 'psia' (absolute pressure)",
            });
        }
        "" => value,
        _ => {
            return Err(UnitError::UnknownUnit {
                unit,
                quantity: Quantity::Pressure,
            });
        }
    };

    if pa <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: pa,
            reason: "Absolute pressure must be positive",
        });
    }

    Ok(pa)
}

/// Parse specific volume in various units, return m³/kg.
fn parse_specific_volume(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let m3_kg = match unit.to_lowercase().as_str() {
        "m3/kg" | "m^3/kg" | "m³/kg" => value,
        "l/kg" | "dm3/kg" | "dm^3/kg" => value * 1e-3,
        "cm3/g" | "cm^3/g" | "cm³/g" => value * 1e-3,
        "ft3/lbm" | "ft^3/lbm" => value * 0.062_428,
        "" => value,
        _ => {
            return Err(UnitError::UnknownUnit {
                unit,
                quantity: Quantity::SpecificVolume,
            });
        }
    };

    if m3_kg <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: m3_kg,
            reason: "Specific volume must be positive",
        });
    }

    Ok(m3_kg)
}

/// Parse density in various units, return kg/m³.
fn parse_density(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let kg_m3 = match unit.to_lowercase().as_str() {
        "kg/m^3" | "kg/m³" | "kg/m3" => value,
        "g/cm^3" | "g/cm³" | "g/cm3" => value * 1e3,
        "lbm/ft^3" | "lbm/ft3" => value * 16.018_46,
        "" => value,
        _ => {
            return Err(UnitError::UnknownUnit {
                unit,
                quantity: Quantity::Density,
            });
        }
    };

    if kg_m3 <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: kg_m3,
            reason: "Density must be positive",
        });
    }

    Ok(kg_m3)
}

/// Parse specific enthalpy/internal energy in various units, return J/kg.
fn parse_specific_enthalpy(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let j_kg = match unit.to_lowercase().as_str() {
        "j/kg" => value,
        "kj/kg" => value * 1e3,
        "mj/kg" => value * 1e6,
        "btu/lbm" => value * 2_326.0,
        "" => value,
        _ => {
            return Err(UnitError::UnknownUnit {
                unit,
                quantity: Quantity::SpecificEnthalpy,
            });
        }
    };

    Ok(j_kg)
}

/// Parse specific entropy, return J/(kg·K).
fn parse_specific_entropy(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let j_kg_k = match unit.to_lowercase().as_str() {
        "j/(kg·k)" | "j/(kg k)" | "j/(kg*k)" | "j/kg/k" | "j/kgk" => value,
        "kj/(kg·k)" | "kj/(kg k)" | "kj/(kg*k)" | "kj/kg/k" | "kj/kgk" => value * 1e3,
        "btu/(lbm·r)" | "btu/(lbm r)" | "btu/(lbm*r)" => value * 4_186.8,
        "" => value,
        _ => {
            return Err(UnitError::UnknownUnit {
                unit,
                quantity: Quantity::SpecificEntropy,
            });
        }
    };

    Ok(j_kg_k)
}

/// Parse quality (0-1), accepting percent notation.
fn parse_quality(input: &str) -> Result<f64, UnitError> {
    let quality = if let Some(num_str) = input.strip_suffix('%') {
        let percent: f64 = num_str.trim().parse().map_err(|_| {
            UnitError::ParseError(format!("Could not parse quality from '{}'", input))
        })?;
        percent / 100.0
    } else {
        input.parse().map_err(|_| {
            UnitError::ParseError(format!("Could not parse quality from '{}'", input))
        })?
    };

    if !(0.0..=1.0).contains(&quality) {
        return Err(UnitError::OutOfRange {
            value: quality,
            reason: "Quality must be between 0 and 1",
        });
    }

    Ok(quality)
}

/// Split a value+unit string into (numeric_value, unit_string).
///
/// Examples:
/// - "70F" -> (70.0, "F")
/// - "14.7 psia" -> (14.7, "psia")
/// - "1e5 Pa" -> (100000.0, "Pa")
/// - "300" -> (300.0, "")
fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let trimmed = input.trim();

    let mut split_idx = trimmed.len();
    let mut prev: Option<char> = None;
    for (idx, c) in trimmed.char_indices() {
        let is_exponent = (c == 'e' || c == 'E')
            && prev.is_some_and(|p| p.is_ascii_digit() || p == '.')
            && trimmed[idx + 1..]
                .chars()
                .next()
                .is_some_and(|n| n.is_ascii_digit() || n == '-' || n == '+');
        let is_sign_after_exponent =
            (c == '-' || c == '+') && (idx == 0 || matches!(prev, Some('e' | 'E')));
        if !(c.is_ascii_digit() || c == '.' || is_exponent || is_sign_after_exponent) {
            split_idx = idx;
            break;
        }
        prev = Some(c);
    }

    let (num_part, unit_part) = trimmed.split_at(split_idx);
    let value: f64 = num_part.trim().parse().map_err(|_| {
        UnitError::ParseError(format!("Could not parse numeric value from '{}'", input))
    })?;

    Ok((value, unit_part.trim().to_string()))
}
