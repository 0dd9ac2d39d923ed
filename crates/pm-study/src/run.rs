//! Study execution.

use crate::schema::{JobDef, Study};
use crate::validate::{Job, resolve_job, resolve_substance};
use crate::{StudyError, StudyResult};
use pm_core::units::{k, pa};
use pm_fluids::{
    FixedProperty, ProcessKind, ProcessPath, PropertyProvider, PvDiagram, PvDiagramOptions,
    SaturationEnvelope, Substance, Table, TvDiagram, TvDiagramOptions, VaporDome, classify_state,
    sample,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Ok,
    Failed,
}

/// One line of the run report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobReport {
    pub id: String,
    pub kind: String,
    pub status: JobStatus,
    pub summary: String,
    /// Samples the provider could not resolve (sweeps, diagrams, processes)
    pub failed_samples: usize,
    /// Names of the tables this job produced
    pub tables: Vec<String>,
}

/// Result of running every job of a study.
#[derive(Debug, Clone)]
pub struct StudyRun {
    pub study: String,
    pub substance: Substance,
    pub reports: Vec<JobReport>,
    pub tables: Vec<Table>,
}

impl StudyRun {
    pub fn num_failed_jobs(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.status == JobStatus::Failed)
            .count()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Write one CSV per table plus `report.json` into `dir`.
    pub fn write_outputs(&self, dir: &Path) -> StudyResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.tables.len() + 1);
        for table in &self.tables {
            let path = dir.join(format!("{}.csv", table.name));
            table.save_csv(&path)?;
            written.push(path);
        }
        let report_path = dir.join("report.json");
        std::fs::write(&report_path, serde_json::to_string_pretty(&self.reports)?)?;
        written.push(report_path);
        Ok(written)
    }
}

struct JobOutcome {
    summary: String,
    failed_samples: usize,
    tables: Vec<Table>,
}

impl JobOutcome {
    fn new(summary: String, table: Table) -> Self {
        Self {
            summary,
            failed_samples: 0,
            tables: vec![table],
        }
    }
}

/// Run all jobs in order against `provider`.
///
/// A job that fails is reported and the remaining jobs still run. Only a
/// study that does not match the provider is an error.
pub fn run_study<P>(study: &Study, provider: &mut P) -> StudyResult<StudyRun>
where
    P: PropertyProvider + ?Sized,
{
    let substance = resolve_substance(study)?;
    if provider.substance() != substance {
        return Err(StudyError::SubstanceMismatch {
            study: substance,
            provider: provider.substance(),
        });
    }

    let mut reports = Vec::with_capacity(study.jobs.len());
    let mut tables = Vec::new();
    for job in &study.jobs {
        info!(job = %job.id, kind = job.kind.label(), "running job");
        let report = match run_job(job, provider) {
            Ok(outcome) => {
                let names = outcome.tables.iter().map(|t| t.name.clone()).collect();
                tables.extend(outcome.tables);
                JobReport {
                    id: job.id.clone(),
                    kind: job.kind.label().to_string(),
                    status: JobStatus::Ok,
                    summary: outcome.summary,
                    failed_samples: outcome.failed_samples,
                    tables: names,
                }
            }
            Err(err) => {
                warn!(job = %job.id, error = %err, "job failed");
                JobReport {
                    id: job.id.clone(),
                    kind: job.kind.label().to_string(),
                    status: JobStatus::Failed,
                    summary: err.to_string(),
                    failed_samples: 0,
                    tables: Vec::new(),
                }
            }
        };
        reports.push(report);
    }

    Ok(StudyRun {
        study: study.name.clone(),
        substance,
        reports,
        tables,
    })
}

fn run_job<P>(job: &JobDef, provider: &mut P) -> StudyResult<JobOutcome>
where
    P: PropertyProvider + ?Sized,
{
    let id = job.id.as_str();
    let outcome = match resolve_job(job)? {
        Job::State(input) => {
            let state = provider.state(input)?;
            let phase = classify_state(provider, &state)?;
            JobOutcome::new(
                format!("{state}; {phase}"),
                Table::from_states(id, [&state]),
            )
        }
        Job::SaturationAtPressure(p) => {
            let env = SaturationEnvelope::at_pressure(provider, p)?;
            JobOutcome::new(env.to_string(), saturation_table(id, &env)?)
        }
        Job::SaturationAtTemperature(t) => {
            let env = SaturationEnvelope::at_temperature(provider, t)?;
            JobOutcome::new(env.to_string(), saturation_table(id, &env)?)
        }
        Job::Dome(options) => {
            let dome = VaporDome::sample(provider, &options)?;
            let mut outcome = JobOutcome::new(dome_summary(&dome), Table::from_dome(id, &dome));
            outcome.failed_samples = usize::from(dome.is_truncated());
            outcome
        }
        Job::TvDiagram {
            dome,
            pressures,
            volumes,
        } => {
            let options = TvDiagramOptions {
                dome,
                isobars: pressures,
                volumes,
            };
            let diagram = TvDiagram::build(provider, &options)?;
            let mut tables = vec![Table::from_dome(format!("{id}_dome"), &diagram.dome)];
            let mut failed = 0;
            for (i, isobar) in diagram.isobars.iter().enumerate() {
                failed += isobar.sweep.num_failed;
                tables.push(Table::from_sweep(format!("{id}_isobar_{i}"), &isobar.sweep));
            }
            JobOutcome {
                summary: format!(
                    "{}; {} isobars",
                    dome_summary(&diagram.dome),
                    diagram.isobars.len()
                ),
                failed_samples: failed,
                tables,
            }
        }
        Job::PvDiagram {
            dome,
            temperatures,
            volumes,
        } => {
            let options = PvDiagramOptions {
                dome,
                isotherms: temperatures,
                volumes,
            };
            let diagram = PvDiagram::build(provider, &options)?;
            let mut tables = vec![Table::from_dome(format!("{id}_dome"), &diagram.dome)];
            let mut failed = 0;
            for (i, isotherm) in diagram.isotherms.iter().enumerate() {
                failed += isotherm.sweep.num_failed;
                tables.push(Table::from_sweep(
                    format!("{id}_isotherm_{i}"),
                    &isotherm.sweep,
                ));
            }
            JobOutcome {
                summary: format!(
                    "{}; {} isotherms",
                    dome_summary(&diagram.dome),
                    diagram.isotherms.len()
                ),
                failed_samples: failed,
                tables,
            }
        }
        Job::Isobar { pressure, sweep } => {
            let result = sample(
                provider,
                FixedProperty::Pressure(pressure),
                sweep.swept,
                &sweep.values,
            )?;
            JobOutcome {
                summary: format!(
                    "{}/{} samples resolved",
                    result.num_successful,
                    result.samples.len()
                ),
                failed_samples: result.num_failed,
                tables: vec![Table::from_sweep(id, &result)],
            }
        }
        Job::Process {
            kind,
            hold,
            start,
            end,
            points,
        } => {
            let path = match kind {
                ProcessKind::Isobaric => {
                    ProcessPath::isobaric(provider, pa(hold), start, end, points)?
                }
                ProcessKind::Isothermal => {
                    ProcessPath::isothermal(provider, k(hold), start, end, points)?
                }
                ProcessKind::Isochoric => {
                    ProcessPath::isochoric(provider, hold, k(start), k(end), points)?
                }
            };
            let regions: Vec<String> = path
                .steps()
                .first()
                .map(|s| s.phase.label().to_string())
                .into_iter()
                .chain(path.phase_transitions().iter().map(|t| t.to.label().to_string()))
                .collect();
            JobOutcome {
                summary: format!(
                    "{kind}: {}; w={:.1} J/kg, q={:.1} J/kg",
                    regions.join(" -> "),
                    path.boundary_work(),
                    path.heat()
                ),
                failed_samples: path.num_failed(),
                tables: vec![Table::from_process(id, &path)],
            }
        }
    };
    Ok(outcome)
}

fn saturation_table(name: &str, env: &SaturationEnvelope) -> StudyResult<Table> {
    let columns = ["temperature_k", "pressure_pa", "v_f_m3_kg", "v_g_m3_kg"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let mut table = Table::new(name, columns);
    table.push_row(vec![env.t_sat_k(), env.p_sat_pa(), env.v_f(), env.v_g()])?;
    Ok(table)
}

fn dome_summary(dome: &VaporDome) -> String {
    let truncated = if dome.is_truncated() { " (truncated)" } else { "" };
    format!("{} dome points{truncated}", dome.points().len())
}
