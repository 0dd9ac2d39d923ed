//! pm-study: YAML study files, validation and batch execution.

pub mod run;
pub mod schema;
pub mod validate;

pub use run::{JobReport, JobStatus, StudyRun, run_study};
pub use schema::*;
pub use validate::{
    Job, SweepPlan, ValidationError, resolve_job, resolve_substance, validate_study,
};

use pm_fluids::{FluidError, Substance, SweepError, TableError};

pub const LATEST_VERSION: u32 = 1;

pub type StudyResult<T> = Result<T, StudyError>;

#[derive(thiserror::Error, Debug)]
pub enum StudyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Study is for {study} but the provider serves {provider}")]
    SubstanceMismatch {
        study: Substance,
        provider: Substance,
    },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse and validate a study from YAML text.
pub fn parse_yaml(content: &str) -> StudyResult<Study> {
    let study: Study = serde_yaml::from_str(content)?;
    validate_study(&study)?;
    Ok(study)
}

pub fn load_yaml(path: &std::path::Path) -> StudyResult<Study> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn save_yaml(path: &std::path::Path, study: &Study) -> StudyResult<()> {
    validate_study(study)?;
    let content = serde_yaml::to_string(study)?;
    std::fs::write(path, content)?;
    Ok(())
}
