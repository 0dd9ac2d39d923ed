use pm_fluids::{FluidError, SweepError, TableError, UnitError};
use pm_study::{StudyError, ValidationError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error("Bad {what}: {source}")]
    Unit {
        what: &'static str,
        #[source]
        source: UnitError,
    },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),

    #[error("Study error: {0}")]
    Study(#[from] StudyError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Output error: {0}")]
    Table(#[from] TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
