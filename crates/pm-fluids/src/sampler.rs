//! State sampler: query the provider once per value of a swept property at a
//! fixed second property.
//!
//! A failed sample never aborts the sweep. It is recorded with its error,
//! dropped from the plotting arrays, and reported as NaN only when gaps are
//! asked for explicitly.

use crate::error::{FluidError, FluidResult};
use crate::phase::{Classifier, Phase};
use crate::provider::PropertyProvider;
use crate::state::{Property, StateInput, ThermoState};
use crate::substance::Substance;
use crate::sweeps::{SweepDefinition, SweepError};
use crate::units::Quantity;
use pm_core::units::{Pressure, SpecVolume, Temperature, k, pa, pressure_pa, temperature_k};
use tracing::{debug, warn};

/// Property held constant during a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedProperty {
    Pressure(Pressure),
    Temperature(Temperature),
    /// Specific volume [m³/kg]
    SpecificVolume(SpecVolume),
}

impl FixedProperty {
    pub fn property(&self) -> Property {
        match self {
            FixedProperty::Pressure(_) => Property::Pressure,
            FixedProperty::Temperature(_) => Property::Temperature,
            FixedProperty::SpecificVolume(_) => Property::SpecificVolume,
        }
    }

    /// Value in SI units.
    pub fn value_si(&self) -> f64 {
        match *self {
            FixedProperty::Pressure(p) => pressure_pa(p),
            FixedProperty::Temperature(t) => temperature_k(t),
            FixedProperty::SpecificVolume(v) => v,
        }
    }
}

/// Property varied during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweptProperty {
    Temperature,
    Pressure,
    SpecificVolume,
    Quality,
}

impl SweptProperty {
    pub fn property(self) -> Property {
        match self {
            SweptProperty::Temperature => Property::Temperature,
            SweptProperty::Pressure => Property::Pressure,
            SweptProperty::SpecificVolume => Property::SpecificVolume,
            SweptProperty::Quality => Property::Quality,
        }
    }

    /// Unit family of the swept values.
    pub fn quantity(self) -> Quantity {
        match self {
            SweptProperty::Temperature => Quantity::Temperature,
            SweptProperty::Pressure => Quantity::Pressure,
            SweptProperty::SpecificVolume => Quantity::SpecificVolume,
            SweptProperty::Quality => Quantity::Quality,
        }
    }

    pub fn from_quantity(quantity: Quantity) -> Option<Self> {
        match quantity {
            Quantity::Temperature => Some(SweptProperty::Temperature),
            Quantity::Pressure => Some(SweptProperty::Pressure),
            Quantity::SpecificVolume => Some(SweptProperty::SpecificVolume),
            Quantity::Quality => Some(SweptProperty::Quality),
            _ => None,
        }
    }
}

/// Build the provider input for one sample.
fn input_for(fixed: FixedProperty, swept: SweptProperty, value: f64) -> Option<StateInput> {
    use FixedProperty as F;
    use SweptProperty as S;

    let input = match (fixed, swept) {
        (F::Pressure(p), S::Temperature) => StateInput::PT { p, t: k(value) },
        (F::Pressure(p), S::SpecificVolume) => StateInput::PV { p, v: value },
        (F::Pressure(p), S::Quality) => StateInput::PQ { p, x: value },
        (F::Temperature(t), S::Pressure) => StateInput::PT { p: pa(value), t },
        (F::Temperature(t), S::SpecificVolume) => StateInput::TV { t, v: value },
        (F::Temperature(t), S::Quality) => StateInput::TQ { t, x: value },
        (F::SpecificVolume(v), S::Temperature) => StateInput::TV { t: k(value), v },
        (F::SpecificVolume(v), S::Pressure) => StateInput::PV { p: pa(value), v },
        _ => return None,
    };
    Some(input)
}

/// Outcome of one provider query in a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Swept value in SI units
    pub value: f64,
    /// Captured state, or the error that query produced
    pub outcome: FluidResult<ThermoState>,
}

impl Sample {
    pub fn state(&self) -> Option<&ThermoState> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&FluidError> {
        self.outcome.as_ref().err()
    }
}

/// Result of a property sweep.
#[derive(Debug, Clone)]
pub struct SweepResult {
    pub substance: Substance,
    pub fixed: FixedProperty,
    pub swept: SweptProperty,
    /// One entry per swept value, in sweep order
    pub samples: Vec<Sample>,
    pub num_successful: usize,
    pub num_failed: usize,
}

impl SweepResult {
    /// Successful states in sweep order.
    pub fn states(&self) -> impl Iterator<Item = &ThermoState> {
        self.samples.iter().filter_map(Sample::state)
    }

    /// Values of `property` over successful samples. Quality is NaN where the
    /// state is off the saturation envelope.
    pub fn series(&self, property: Property) -> Vec<f64> {
        self.states()
            .map(|state| state.value(property).unwrap_or(f64::NAN))
            .collect()
    }

    /// One value per sample (failed samples included as NaN), aligned with
    /// the swept values.
    pub fn series_with_gaps(&self, property: Property) -> Vec<f64> {
        self.samples
            .iter()
            .map(|sample| {
                sample
                    .state()
                    .and_then(|state| state.value(property))
                    .unwrap_or(f64::NAN)
            })
            .collect()
    }

    /// Swept values of successful samples.
    pub fn successful_values(&self) -> Vec<f64> {
        self.samples
            .iter()
            .filter(|sample| sample.outcome.is_ok())
            .map(|sample| sample.value)
            .collect()
    }

    /// All swept values, in order.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.value).collect()
    }

    /// `(index, value, error)` of every failed sample.
    pub fn failures(&self) -> Vec<(usize, f64, &FluidError)> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(idx, sample)| sample.error().map(|err| (idx, sample.value, err)))
            .collect()
    }

    pub fn temperature_k(&self) -> Vec<f64> {
        self.series(Property::Temperature)
    }

    pub fn pressure_pa(&self) -> Vec<f64> {
        self.series(Property::Pressure)
    }

    pub fn specific_volume_m3_kg(&self) -> Vec<f64> {
        self.series(Property::SpecificVolume)
    }

    pub fn density_kg_m3(&self) -> Vec<f64> {
        self.series(Property::Density)
    }

    pub fn quality(&self) -> Vec<f64> {
        self.series(Property::Quality)
    }

    pub fn internal_energy_j_kg(&self) -> Vec<f64> {
        self.series(Property::InternalEnergy)
    }

    pub fn enthalpy_j_kg(&self) -> Vec<f64> {
        self.series(Property::Enthalpy)
    }

    pub fn entropy_j_kg_k(&self) -> Vec<f64> {
        self.series(Property::Entropy)
    }

    /// Phase of each successful state.
    ///
    /// Classification needs fresh envelope queries, so it is opt-in rather
    /// than done during the sweep.
    pub fn phases<P>(&self, provider: &mut P) -> Vec<FluidResult<Phase>>
    where
        P: PropertyProvider + ?Sized,
    {
        let classifier = Classifier::default();
        self.states()
            .map(|state| classifier.state(provider, state))
            .collect()
    }
}

/// Query `provider` once per value of `swept` at the fixed property.
///
/// Returns `Err` only for an unusable configuration (e.g. sweeping the fixed
/// property itself, or no values); per-sample failures land in the result.
pub fn sample<P>(
    provider: &mut P,
    fixed: FixedProperty,
    swept: SweptProperty,
    values: &[f64],
) -> Result<SweepResult, SweepError>
where
    P: PropertyProvider + ?Sized,
{
    if values.is_empty() {
        return Err(SweepError::InvalidConfiguration(
            "Sweep has no values".to_string(),
        ));
    }
    if input_for(fixed, swept, values[0]).is_none() {
        return Err(SweepError::InvalidConfiguration(format!(
            "Cannot sweep {} at fixed {}",
            swept.property().label(),
            fixed.property().label()
        )));
    }

    let substance = provider.substance();
    debug!(
        substance = %substance,
        fixed = fixed.value_si(),
        swept = swept.property().key(),
        points = values.len(),
        "sweep start"
    );

    let mut samples = Vec::with_capacity(values.len());
    let mut num_successful = 0;
    let mut num_failed = 0;

    for (idx, &value) in values.iter().enumerate() {
        let outcome = match input_for(fixed, swept, value) {
            Some(input) => provider.state(input),
            None => Err(FluidError::invalid("unsupported property combination")),
        };
        match &outcome {
            Ok(_) => num_successful += 1,
            Err(err) => {
                warn!(index = idx, value, error = %err, "sample failed");
                num_failed += 1;
            }
        }
        samples.push(Sample { value, outcome });
    }

    debug!(num_successful, num_failed, "sweep done");

    Ok(SweepResult {
        substance,
        fixed,
        swept,
        samples,
        num_successful,
        num_failed,
    })
}

/// Sweep a [`SweepDefinition`] at a fixed property.
pub fn sample_sweep<P>(
    provider: &mut P,
    fixed: FixedProperty,
    sweep: &SweepDefinition,
) -> Result<SweepResult, SweepError>
where
    P: PropertyProvider + ?Sized,
{
    let swept = SweptProperty::from_quantity(sweep.quantity).ok_or_else(|| {
        SweepError::InvalidConfiguration(format!("Cannot sweep {}", sweep.quantity))
    })?;
    sample(provider, fixed, swept, &sweep.generate_points())
}

/// Temperature sweep at fixed pressure (T in K).
pub fn sample_isobar<P>(
    provider: &mut P,
    p: Pressure,
    temperatures_k: &[f64],
) -> Result<SweepResult, SweepError>
where
    P: PropertyProvider + ?Sized,
{
    sample(
        provider,
        FixedProperty::Pressure(p),
        SweptProperty::Temperature,
        temperatures_k,
    )
}

/// Specific volume sweep at fixed pressure (v in m³/kg).
pub fn sample_isobar_volumes<P>(
    provider: &mut P,
    p: Pressure,
    volumes: &[f64],
) -> Result<SweepResult, SweepError>
where
    P: PropertyProvider + ?Sized,
{
    sample(
        provider,
        FixedProperty::Pressure(p),
        SweptProperty::SpecificVolume,
        volumes,
    )
}

/// Specific volume sweep at fixed temperature (v in m³/kg).
pub fn sample_isotherm<P>(
    provider: &mut P,
    t: Temperature,
    volumes: &[f64],
) -> Result<SweepResult, SweepError>
where
    P: PropertyProvider + ?Sized,
{
    sample(
        provider,
        FixedProperty::Temperature(t),
        SweptProperty::SpecificVolume,
        volumes,
    )
}

/// Temperature sweep at fixed specific volume (T in K).
pub fn sample_isochore<P>(
    provider: &mut P,
    v: SpecVolume,
    temperatures_k: &[f64],
) -> Result<SweepResult, SweepError>
where
    P: PropertyProvider + ?Sized,
{
    sample(
        provider,
        FixedProperty::SpecificVolume(v),
        SweptProperty::Temperature,
        temperatures_k,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweeps::SweepType;
    use crate::test_support::{self, ToyProvider};

    #[test]
    fn isotherm_queries_once_per_sample() {
        let mut provider = ToyProvider::new();
        let volumes = [0.001, 0.01, 0.1, 1.0, 10.0];
        let result = sample_isotherm(&mut provider, k(450.0), &volumes).unwrap();

        assert_eq!(provider.queries, volumes.len());
        assert_eq!(result.num_successful, 5);
        assert_eq!(result.num_failed, 0);
        assert_eq!(result.specific_volume_m3_kg(), volumes.to_vec());
        assert!(result.temperature_k().iter().all(|&t| (t - 450.0).abs() < 1e-9));
    }

    #[test]
    fn failures_are_recorded_not_fatal() {
        let mut provider = ToyProvider::failing_near_critical(2.0);
        let temps = [590.0, 595.0, 599.0, 599.5, 605.0];
        let result = sample_isochore(&mut provider, test_support::V_CRIT, &temps).unwrap();

        assert_eq!(result.samples.len(), 5);
        assert_eq!(result.num_failed, 2);
        assert_eq!(result.num_successful, 3);
        assert_eq!(result.successful_values(), vec![590.0, 595.0, 605.0]);
        assert_eq!(result.temperature_k().len(), 3);

        let gaps = result.series_with_gaps(Property::Temperature);
        assert_eq!(gaps.len(), 5);
        assert!(gaps[2].is_nan() && gaps[3].is_nan());
        assert!(!gaps.iter().take(2).any(|t| t.is_nan()));

        let failures = result.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, 2);
        assert!(failures[0].2.is_out_of_range());
    }

    #[test]
    fn out_of_domain_quality_fails_only_that_sample() {
        let mut provider = ToyProvider::new();
        let p = pa(test_support::p_sat(450.0));
        let result = sample(
            &mut provider,
            FixedProperty::Pressure(p),
            SweptProperty::Quality,
            &[0.0, -0.5, 0.5, 1.0],
        )
        .unwrap();
        assert_eq!(result.num_failed, 1);
        assert!(matches!(
            result.samples[1].error(),
            Some(FluidError::OutOfRange { .. })
        ));
        let x = result.quality();
        assert_eq!(x.len(), 3);
        assert!((x[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sweeping_the_fixed_property_is_rejected() {
        let mut provider = ToyProvider::new();
        let err = sample(
            &mut provider,
            FixedProperty::Pressure(pa(1e5)),
            SweptProperty::Pressure,
            &[1e5, 2e5],
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::InvalidConfiguration(_)));
        assert_eq!(provider.queries, 0);
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let mut provider = ToyProvider::new();
        assert!(sample_isobar(&mut provider, pa(1e5), &[]).is_err());
    }

    #[test]
    fn sweep_definition_drives_sampler() {
        let mut provider = ToyProvider::new();
        let sweep =
            SweepDefinition::new(Quantity::SpecificVolume, 1e-3, 0.025, 9, SweepType::Logarithmic)
                .unwrap();
        let p = pa(test_support::p_sat(420.0));
        let result = sample_sweep(&mut provider, FixedProperty::Pressure(p), &sweep).unwrap();
        assert_eq!(result.values().len(), 9);
        assert_eq!(result.num_successful, 9);

        let phases: Vec<Phase> = result
            .phases(&mut provider)
            .into_iter()
            .map(|phase| phase.unwrap())
            .collect();
        assert_eq!(phases.first(), Some(&Phase::CompressedLiquid));
        assert_eq!(phases.last(), Some(&Phase::SuperheatedVapor));
        assert!(phases.windows(2).all(|w| w[0].rank() <= w[1].rank()));
    }

    #[test]
    fn sweep_of_unsupported_quantity_is_rejected() {
        let mut provider = ToyProvider::new();
        let sweep =
            SweepDefinition::new(Quantity::Density, 1.0, 10.0, 3, SweepType::Linear).unwrap();
        let err = sample_sweep(&mut provider, FixedProperty::Pressure(pa(1e5)), &sweep)
            .unwrap_err();
        assert!(matches!(err, SweepError::InvalidConfiguration(_)));
    }
}
