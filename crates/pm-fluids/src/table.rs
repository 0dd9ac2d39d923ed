//! Column tables for plot data and their CSV export.

use crate::dome::VaporDome;
use crate::process::ProcessPath;
use crate::sampler::SweepResult;
use crate::state::{Property, ThermoState};
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Named numeric table. NaN cells are written as empty CSV fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<f64>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                found: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, if it exists.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), TableError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.columns)?;
        for row in &self.rows {
            csv.write_record(row.iter().map(|v| format_cell(*v)))?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, TableError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the table to `path`, creating parent directories.
    pub fn save_csv(&self, path: &Path) -> Result<(), TableError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(io::BufWriter::new(file))
    }

    /// One row per state, one column per property.
    pub fn from_states<'a>(
        name: impl Into<String>,
        states: impl IntoIterator<Item = &'a ThermoState>,
    ) -> Self {
        let mut table = Self::new(name, property_columns());
        for state in states {
            table.rows.push(state_row(state));
        }
        table
    }

    /// Sweep table with the swept value first and NaN rows for failures.
    pub fn from_sweep(name: impl Into<String>, sweep: &SweepResult) -> Self {
        let mut columns = vec![format!("swept_{}", sweep.swept.property().key())];
        columns.extend(property_columns());
        let mut table = Self::new(name, columns);
        for sample in &sweep.samples {
            let mut row = vec![sample.value];
            match sample.state() {
                Some(state) => row.extend(state_row(state)),
                None => row.extend(std::iter::repeat_n(f64::NAN, Property::ALL.len())),
            }
            table.rows.push(row);
        }
        table
    }

    pub fn from_dome(name: impl Into<String>, dome: &VaporDome) -> Self {
        let columns = ["temperature_k", "pressure_pa", "v_f_m3_kg", "v_g_m3_kg"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let mut table = Self::new(name, columns);
        for point in dome.points() {
            table
                .rows
                .push(vec![point.t_k, point.p_pa, point.v_f, point.v_g]);
        }
        table
    }

    /// Path states with the phase rank of each step.
    pub fn from_process(name: impl Into<String>, path: &ProcessPath) -> Self {
        let mut columns = property_columns();
        columns.push("phase_rank".to_string());
        let mut table = Self::new(name, columns);
        for step in path.steps() {
            let mut row = state_row(&step.state);
            row.push(f64::from(step.phase.rank()));
            table.rows.push(row);
        }
        table
    }
}

fn property_columns() -> Vec<String> {
    Property::ALL.iter().map(|p| p.key().to_string()).collect()
}

fn state_row(state: &ThermoState) -> Vec<f64> {
    Property::ALL
        .iter()
        .map(|p| state.value(*p).unwrap_or(f64::NAN))
        .collect()
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
