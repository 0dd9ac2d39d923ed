//! Simple closed-system processes traced as state sequences.

use crate::error::{FluidError, FluidResult};
use crate::phase::{Classifier, Phase};
use crate::provider::PropertyProvider;
use crate::sampler::{SweepResult, sample_isobar_volumes, sample_isochore, sample_isotherm};
use crate::state::ThermoState;
use crate::substance::Substance;
use crate::sweeps::linear_points;
use pm_core::units::{Pressure, SpecVolume, Temperature, temperature_k};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    /// Constant pressure, swept in v
    Isobaric,
    /// Constant temperature, swept in v
    Isothermal,
    /// Constant specific volume, swept in T
    Isochoric,
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessKind::Isobaric => write!(f, "isobaric"),
            ProcessKind::Isothermal => write!(f, "isothermal"),
            ProcessKind::Isochoric => write!(f, "isochoric"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStep {
    pub state: ThermoState,
    pub phase: Phase,
}

/// Change of phase region between two consecutive steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTransition {
    /// Index of the first step in the new region
    pub index: usize,
    pub from: Phase,
    pub to: Phase,
}

/// A process path from a start state to an end state.
///
/// Interior samples that fail are skipped; both end states must resolve.
#[derive(Debug, Clone)]
pub struct ProcessPath {
    kind: ProcessKind,
    substance: Substance,
    steps: Vec<ProcessStep>,
    num_failed: usize,
}

impl ProcessPath {
    /// Constant-pressure path from `v_start` to `v_end`.
    pub fn isobaric<P>(
        provider: &mut P,
        p: Pressure,
        v_start: SpecVolume,
        v_end: SpecVolume,
        n: usize,
    ) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
    {
        let sweep = sample_isobar_volumes(provider, p, &linear_points(v_start, v_end, n))?;
        let classifier = Classifier::default();
        Self::from_sweep(provider, ProcessKind::Isobaric, sweep, |provider, state| {
            classifier.at_pressure(provider, p, state.specific_volume())
        })
    }

    /// Constant-temperature path from `v_start` to `v_end`.
    pub fn isothermal<P>(
        provider: &mut P,
        t: Temperature,
        v_start: SpecVolume,
        v_end: SpecVolume,
        n: usize,
    ) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
    {
        let sweep = sample_isotherm(provider, t, &linear_points(v_start, v_end, n))?;
        let classifier = Classifier::default();
        Self::from_sweep(provider, ProcessKind::Isothermal, sweep, |provider, state| {
            classifier.at_temperature(provider, t, state.specific_volume())
        })
    }

    /// Constant-volume path from `t_start` to `t_end`.
    pub fn isochoric<P>(
        provider: &mut P,
        v: SpecVolume,
        t_start: Temperature,
        t_end: Temperature,
        n: usize,
    ) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
    {
        let temps = linear_points(temperature_k(t_start), temperature_k(t_end), n);
        let sweep = sample_isochore(provider, v, &temps)?;
        let classifier = Classifier::default();
        Self::from_sweep(provider, ProcessKind::Isochoric, sweep, |provider, state| {
            classifier.state(provider, state)
        })
    }

    fn from_sweep<P, F>(
        provider: &mut P,
        kind: ProcessKind,
        sweep: SweepResult,
        classify: F,
    ) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
        F: Fn(&mut P, &ThermoState) -> FluidResult<Phase>,
    {
        if sweep.samples.len() < 2 {
            return Err(FluidError::invalid(format!(
                "{kind} process needs at least 2 points"
            )));
        }
        let last = sweep.samples.len() - 1;
        for idx in [0, last] {
            if let Some(err) = sweep.samples[idx].error() {
                let end = if idx == 0 { "start" } else { "end" };
                return Err(err.clone().with_context(format!("{kind} process {end} state")));
            }
        }

        let mut steps = Vec::with_capacity(sweep.num_successful);
        let mut num_failed = sweep.num_failed;
        for state in sweep.states() {
            match classify(provider, state) {
                Ok(phase) => steps.push(ProcessStep {
                    state: state.clone(),
                    phase,
                }),
                Err(err) => {
                    warn!(
                        t_k = state.temperature_k(),
                        error = %err,
                        "could not classify process step"
                    );
                    num_failed += 1;
                }
            }
        }
        debug!(%kind, steps = steps.len(), num_failed, "process traced");

        Ok(Self {
            kind,
            substance: sweep.substance,
            steps,
            num_failed,
        })
    }

    pub fn kind(&self) -> ProcessKind {
        self.kind
    }

    pub fn substance(&self) -> Substance {
        self.substance
    }

    pub fn steps(&self) -> &[ProcessStep] {
        &self.steps
    }

    /// Samples dropped because the provider or classifier failed.
    pub fn num_failed(&self) -> usize {
        self.num_failed
    }

    pub fn start(&self) -> Option<&ThermoState> {
        self.steps.first().map(|s| &s.state)
    }

    pub fn end(&self) -> Option<&ThermoState> {
        self.steps.last().map(|s| &s.state)
    }

    /// Phase regions crossed, in path order. Quality changes inside the
    /// two-phase region do not count.
    pub fn phase_transitions(&self) -> Vec<PhaseTransition> {
        self.steps
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0].phase.rank() != w[1].phase.rank())
            .map(|(i, w)| PhaseTransition {
                index: i + 1,
                from: w[0].phase,
                to: w[1].phase,
            })
            .collect()
    }

    /// Boundary work done by the substance [J/kg].
    ///
    /// Exact `P·Δv` for isobaric paths, zero for isochoric paths, and the
    /// trapezoidal integral of `P dv` over the resolved steps for isothermal
    /// paths.
    pub fn boundary_work(&self) -> f64 {
        match self.kind {
            ProcessKind::Isochoric => 0.0,
            ProcessKind::Isobaric => match (self.start(), self.end()) {
                (Some(a), Some(b)) => a.pressure_pa() * (b.specific_volume() - a.specific_volume()),
                _ => 0.0,
            },
            ProcessKind::Isothermal => self
                .steps
                .windows(2)
                .map(|w| {
                    let (a, b) = (&w[0].state, &w[1].state);
                    0.5 * (a.pressure_pa() + b.pressure_pa())
                        * (b.specific_volume() - a.specific_volume())
                })
                .sum(),
        }
    }

    /// Change in specific internal energy end minus start [J/kg].
    pub fn delta_internal_energy(&self) -> f64 {
        self.delta(ThermoState::internal_energy)
    }

    /// Change in specific enthalpy [J/kg].
    pub fn delta_enthalpy(&self) -> f64 {
        self.delta(ThermoState::enthalpy)
    }

    /// Change in specific entropy [J/(kg·K)].
    pub fn delta_entropy(&self) -> f64 {
        self.delta(ThermoState::entropy)
    }

    /// Heat added per unit mass from the closed-system energy balance
    /// `q = Δu + w` [J/kg].
    pub fn heat(&self) -> f64 {
        self.delta_internal_energy() + self.boundary_work()
    }

    fn delta(&self, f: impl Fn(&ThermoState) -> f64) -> f64 {
        match (self.start(), self.end()) {
            (Some(a), Some(b)) => f(b) - f(a),
            _ => 0.0,
        }
    }
}
