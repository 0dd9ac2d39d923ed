//! pm-fluids: phase classification and state sampling for pure substances.
//!
//! Provides:
//! - Substance catalog (water, nitrogen, refrigerants, ...)
//! - Thermodynamic state representation and input pairs
//! - `PropertyProvider` trait with a CoolProp backend
//! - Saturation envelopes and the phase classifier
//! - Sweeps and the state sampler
//! - Vapor dome, T-v / P-v diagrams and simple processes
//! - CSV tables of the above
//!
//! # Architecture
//!
//! Everything above the provider works on the `PropertyProvider` trait, so
//! the classifier and sampler never touch CoolProp directly. A provider holds
//! one backend state at a time; each query returns an owned `ThermoState`.
//!
//! # Example
//!
//! ```no_run
//! use pm_core::units::{degc, mpa};
//! use pm_fluids::{
//!     CoolPropProvider, Phase, Substance, classify_at_pressure, classify_at_temperature,
//! };
//!
//! let mut water = CoolPropProvider::new(Substance::Water).unwrap();
//!
//! let phase = classify_at_temperature(&mut water, degc(25.0), 0.001001).unwrap();
//! assert_eq!(phase, Phase::CompressedLiquid);
//!
//! let phase = classify_at_pressure(&mut water, mpa(1.0), 0.32).unwrap();
//! assert_eq!(phase, Phase::SuperheatedVapor);
//! ```

pub mod coolprop;
pub mod dome;
pub mod error;
pub mod phase;
pub mod process;
pub mod provider;
pub mod sampler;
pub mod saturation;
pub mod state;
pub mod substance;
pub mod sweeps;
pub mod table;
pub mod units;

#[cfg(test)]
mod test_support;

// Re-exports for ergonomics
pub use coolprop::CoolPropProvider;
pub use dome::{
    DomeOptions, DomePoint, Isoline, PvDiagram, PvDiagramOptions, TvDiagram, TvDiagramOptions,
    VaporDome, VolumeRange,
};
pub use error::{FluidError, FluidResult};
pub use phase::{
    Classifier, Phase, classify, classify_at_pressure, classify_at_temperature, classify_state,
};
pub use process::{PhaseTransition, ProcessKind, ProcessPath, ProcessStep};
pub use provider::{CriticalPoint, PropertyProvider};
pub use sampler::{
    FixedProperty, Sample, SweepResult, SweptProperty, sample, sample_isobar,
    sample_isobar_volumes, sample_isochore, sample_isotherm, sample_sweep,
};
pub use saturation::{SaturationBasis, SaturationEnvelope};
pub use state::{Property, PropertyPair, StateInput, StateProperties, ThermoState};
pub use substance::Substance;
pub use sweeps::{SweepDefinition, SweepError, SweepType};
pub use table::{Table, TableError};
pub use units::{Quantity, UnitError, parse_quantity};
