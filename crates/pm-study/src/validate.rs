//! Study validation and resolution of unit strings into SI values.

use crate::schema::{
    JobDef, JobKind, ProcessDef, SpacingDef, StateDef, Study, SweepDef, VolumeRangeDef,
};
use pm_core::units::{Pressure, SpecVolume, Temperature, k, pa};
use pm_fluids::{
    DomeOptions, ProcessKind, Property, PropertyPair, Quantity, StateInput, Substance,
    SweepDefinition, SweepType, SweptProperty, VolumeRange, parse_quantity,
};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate job ID: {id}")]
    DuplicateId { id: String },

    #[error("Unknown substance: {name}")]
    UnknownSubstance { name: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(
    field: impl Into<String>,
    value: impl Into<String>,
    reason: impl Into<String>,
) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// Values of a sweep, in SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    pub swept: SweptProperty,
    pub values: Vec<f64>,
}

/// A job with every quantity resolved to SI.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    State(StateInput),
    SaturationAtPressure(Pressure),
    SaturationAtTemperature(Temperature),
    Dome(DomeOptions),
    TvDiagram {
        dome: DomeOptions,
        pressures: Vec<Pressure>,
        volumes: VolumeRange,
    },
    PvDiagram {
        dome: DomeOptions,
        temperatures: Vec<Temperature>,
        volumes: VolumeRange,
    },
    Isobar {
        pressure: Pressure,
        sweep: SweepPlan,
    },
    Process {
        kind: ProcessKind,
        hold: f64,
        start: f64,
        end: f64,
        points: usize,
    },
}

pub fn resolve_substance(study: &Study) -> Result<Substance, ValidationError> {
    Substance::from_str(&study.substance).map_err(|_| ValidationError::UnknownSubstance {
        name: study.substance.clone(),
    })
}

pub fn validate_study(study: &Study) -> Result<(), ValidationError> {
    if study.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: study.version,
        });
    }
    resolve_substance(study)?;

    let mut job_ids = HashSet::new();
    for job in &study.jobs {
        if !job_ids.insert(&job.id) {
            return Err(ValidationError::DuplicateId { id: job.id.clone() });
        }
        resolve_job(job)?;
    }
    Ok(())
}

pub fn resolve_job(job: &JobDef) -> Result<Job, ValidationError> {
    let ctx = |field: &str| format!("job '{}' {}", job.id, field);

    match &job.kind {
        JobKind::State(def) => resolve_state(def, &job.id).map(Job::State),
        JobKind::Saturation {
            pressure,
            temperature,
        } => match (pressure, temperature) {
            (Some(p), None) => Ok(Job::SaturationAtPressure(pa(quantity(
                &ctx("pressure"),
                p,
                Quantity::Pressure,
            )?))),
            (None, Some(t)) => Ok(Job::SaturationAtTemperature(k(quantity(
                &ctx("temperature"),
                t,
                Quantity::Temperature,
            )?))),
            _ => Err(invalid(
                ctx("saturation"),
                "",
                "give exactly one of pressure or temperature",
            )),
        },
        JobKind::Dome { t_start, points } => {
            Ok(Job::Dome(dome_options(&ctx("t_start"), t_start.as_deref(), *points)?))
        }
        JobKind::TvDiagram {
            pressures,
            volumes,
            dome_points,
        } => {
            if pressures.is_empty() {
                return Err(invalid(ctx("pressures"), "[]", "at least one isobar required"));
            }
            let pressures = pressures
                .iter()
                .map(|p| quantity(&ctx("pressures"), p, Quantity::Pressure).map(pa))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Job::TvDiagram {
                dome: dome_options(&ctx("dome_points"), None, *dome_points)?,
                pressures,
                volumes: volume_range(&ctx("volumes"), volumes)?,
            })
        }
        JobKind::PvDiagram {
            temperatures,
            volumes,
            dome_points,
        } => {
            if temperatures.is_empty() {
                return Err(invalid(
                    ctx("temperatures"),
                    "[]",
                    "at least one isotherm required",
                ));
            }
            let temperatures = temperatures
                .iter()
                .map(|t| quantity(&ctx("temperatures"), t, Quantity::Temperature).map(k))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Job::PvDiagram {
                dome: dome_options(&ctx("dome_points"), None, *dome_points)?,
                temperatures,
                volumes: volume_range(&ctx("volumes"), volumes)?,
            })
        }
        JobKind::Isobar {
            pressure,
            temperature,
            specific_volume,
        } => {
            let p = pa(quantity(&ctx("pressure"), pressure, Quantity::Pressure)?);
            let sweep = match (temperature, specific_volume) {
                (Some(def), None) => {
                    sweep_plan(&ctx("temperature"), def, SweptProperty::Temperature)?
                }
                (None, Some(def)) => {
                    sweep_plan(&ctx("specific_volume"), def, SweptProperty::SpecificVolume)?
                }
                _ => {
                    return Err(invalid(
                        ctx("isobar"),
                        "",
                        "give exactly one of temperature or specific_volume to sweep",
                    ));
                }
            };
            Ok(Job::Isobar { pressure: p, sweep })
        }
        JobKind::Process {
            process,
            hold,
            start,
            end,
            points,
        } => {
            if *points < 2 {
                return Err(invalid(ctx("points"), points.to_string(), "need at least 2 points"));
            }
            let (kind, hold_q, path_q) = match process {
                ProcessDef::Isobaric => (
                    ProcessKind::Isobaric,
                    Quantity::Pressure,
                    Quantity::SpecificVolume,
                ),
                ProcessDef::Isothermal => (
                    ProcessKind::Isothermal,
                    Quantity::Temperature,
                    Quantity::SpecificVolume,
                ),
                ProcessDef::Isochoric => (
                    ProcessKind::Isochoric,
                    Quantity::SpecificVolume,
                    Quantity::Temperature,
                ),
            };
            Ok(Job::Process {
                kind,
                hold: quantity(&ctx("hold"), hold, hold_q)?,
                start: quantity(&ctx("start"), start, path_q)?,
                end: quantity(&ctx("end"), end, path_q)?,
                points: *points,
            })
        }
    }
}

fn quantity(field: &str, text: &str, q: Quantity) -> Result<f64, ValidationError> {
    let value = parse_quantity(text, q).map_err(|e| invalid(field, text, e.to_string()))?;
    if !value.is_finite() {
        return Err(invalid(field, text, "must be finite"));
    }
    Ok(value)
}

fn resolve_state(def: &StateDef, id: &str) -> Result<StateInput, ValidationError> {
    let candidates = [
        (Property::Temperature, Quantity::Temperature, &def.temperature),
        (Property::Pressure, Quantity::Pressure, &def.pressure),
        (Property::SpecificVolume, Quantity::SpecificVolume, &def.specific_volume),
        (Property::Quality, Quantity::Quality, &def.quality),
        (Property::Enthalpy, Quantity::SpecificEnthalpy, &def.enthalpy),
        (Property::Entropy, Quantity::SpecificEntropy, &def.entropy),
    ];
    let given: Vec<(Property, f64)> = candidates
        .iter()
        .filter_map(|(prop, q, text)| text.as_deref().map(|t| (*prop, *q, t)))
        .map(|(prop, q, text)| {
            quantity(&format!("job '{id}' {}", prop.key()), text, q).map(|v| (prop, v))
        })
        .collect::<Result<_, _>>()?;

    let [(a, va), (b, vb)] = given.as_slice() else {
        return Err(invalid(
            format!("job '{id}' state"),
            given.len().to_string(),
            "exactly two properties are required",
        ));
    };
    let (pair, swapped) = PropertyPair::from_properties(*a, *b).ok_or_else(|| {
        invalid(
            format!("job '{id}' state"),
            format!("{} + {}", a.key(), b.key()),
            "unsupported property pair",
        )
    })?;
    let (first, second) = if swapped { (*vb, *va) } else { (*va, *vb) };
    Ok(StateInput::from_pair(pair, first, second))
}

fn dome_options(
    field: &str,
    t_start: Option<&str>,
    points: usize,
) -> Result<DomeOptions, ValidationError> {
    if points < 2 {
        return Err(invalid(field, points.to_string(), "need at least 2 points"));
    }
    let t_start = t_start
        .map(|t| quantity(field, t, Quantity::Temperature).map(k))
        .transpose()?;
    Ok(DomeOptions {
        t_start,
        num_points: points,
    })
}

fn volume_range(field: &str, def: &VolumeRangeDef) -> Result<VolumeRange, ValidationError> {
    let v_min: SpecVolume = quantity(field, &def.min, Quantity::SpecificVolume)?;
    let v_max: SpecVolume = quantity(field, &def.max, Quantity::SpecificVolume)?;
    if def.points < 2 {
        return Err(invalid(field, def.points.to_string(), "need at least 2 points"));
    }
    if v_min <= 0.0 || v_max <= v_min {
        return Err(invalid(
            field,
            format!("{} .. {}", def.min, def.max),
            "volumes must be positive and increasing",
        ));
    }
    Ok(VolumeRange {
        v_min,
        v_max,
        num_points: def.points,
        logarithmic: def.spacing == SpacingDef::Log,
    })
}

fn sweep_plan(
    field: &str,
    def: &SweepDef,
    swept: SweptProperty,
) -> Result<SweepPlan, ValidationError> {
    let sweep_type = match def.spacing {
        SpacingDef::Linear => SweepType::Linear,
        SpacingDef::Log => SweepType::Logarithmic,
    };
    let definition =
        SweepDefinition::from_text(&def.start, &def.end, swept.quantity(), def.points, sweep_type)
            .map_err(|e| invalid(field, format!("{} .. {}", def.start, def.end), e.to_string()))?;
    Ok(SweepPlan {
        swept,
        values: definition.generate_points(),
    })
}
