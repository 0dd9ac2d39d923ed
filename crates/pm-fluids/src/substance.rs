//! Pure substances available to the property provider.

use std::fmt;

/// Pure substance the provider can fix states for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Substance {
    /// Water (H₂O)
    Water,
    /// Nitrogen (N₂)
    Nitrogen,
    /// Oxygen (O₂)
    Oxygen,
    /// Argon (Ar)
    Argon,
    /// Carbon dioxide (CO₂)
    CarbonDioxide,
    /// Methane (CH₄)
    Methane,
    /// Propane (C₃H₈)
    Propane,
    /// Isobutane (R600a)
    Isobutane,
    /// Ammonia (NH₃, R717)
    Ammonia,
    /// Refrigerant R134a
    R134a,
    /// Refrigerant R32
    R32,
}

impl Substance {
    pub const ALL: [Substance; 11] = [
        Substance::Water,
        Substance::Nitrogen,
        Substance::Oxygen,
        Substance::Argon,
        Substance::CarbonDioxide,
        Substance::Methane,
        Substance::Propane,
        Substance::Isobutane,
        Substance::Ammonia,
        Substance::R134a,
        Substance::R32,
    ];

    /// Short key used in study files and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Substance::Water => "H2O",
            Substance::Nitrogen => "N2",
            Substance::Oxygen => "O2",
            Substance::Argon => "Ar",
            Substance::CarbonDioxide => "CO2",
            Substance::Methane => "CH4",
            Substance::Propane => "Propane",
            Substance::Isobutane => "Isobutane",
            Substance::Ammonia => "NH3",
            Substance::R134a => "R134a",
            Substance::R32 => "R32",
        }
    }

    /// CoolProp fluid name for this substance.
    pub fn coolprop_name(&self) -> &'static str {
        match self {
            Substance::Water => "Water",
            Substance::Nitrogen => "Nitrogen",
            Substance::Oxygen => "Oxygen",
            Substance::Argon => "Argon",
            Substance::CarbonDioxide => "CarbonDioxide",
            Substance::Methane => "Methane",
            Substance::Propane => "n-Propane",
            Substance::Isobutane => "Isobutane",
            Substance::Ammonia => "Ammonia",
            Substance::R134a => "R134a",
            Substance::R32 => "R32",
        }
    }
}

impl fmt::Display for Substance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coolprop_name())
    }
}

impl std::str::FromStr for Substance {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "H2O" | "WATER" | "STEAM" => Ok(Substance::Water),
            "N2" | "NITROGEN" => Ok(Substance::Nitrogen),
            "O2" | "OXYGEN" => Ok(Substance::Oxygen),
            "AR" | "ARGON" => Ok(Substance::Argon),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" | "R744" => Ok(Substance::CarbonDioxide),
            "CH4" | "METHANE" => Ok(Substance::Methane),
            "PROPANE" | "C3H8" | "N-PROPANE" | "R290" => Ok(Substance::Propane),
            "ISOBUTANE" | "I-BUTANE" | "R600A" => Ok(Substance::Isobutane),
            "NH3" | "AMMONIA" | "R717" => Ok(Substance::Ammonia),
            "R134A" => Ok(Substance::R134a),
            "R32" => Ok(Substance::R32),
            _ => Err("unknown substance"),
        }
    }
}
