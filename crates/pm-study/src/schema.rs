//! Study file schema.
//!
//! Quantities are unit-tagged strings ("1 MPa", "25C", "0.5 m3/kg") and are
//! only turned into SI values during validation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Study {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    pub substance: String,
    /// Directory for CSV tables and the run report, relative to the working
    /// directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub jobs: Vec<JobDef>,
}

fn default_version() -> u32 {
    crate::LATEST_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobDef {
    pub id: String,
    #[serde(flatten)]
    pub kind: JobKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobKind {
    /// Fix a state from exactly two of the listed properties and classify it.
    State(StateDef),
    /// Saturation envelope at one pressure or one temperature.
    Saturation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pressure: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<String>,
    },
    Dome {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        t_start: Option<String>,
        #[serde(default = "default_dome_points")]
        points: usize,
    },
    TvDiagram {
        pressures: Vec<String>,
        #[serde(default)]
        volumes: VolumeRangeDef,
        #[serde(default = "default_dome_points")]
        dome_points: usize,
    },
    PvDiagram {
        temperatures: Vec<String>,
        #[serde(default)]
        volumes: VolumeRangeDef,
        #[serde(default = "default_dome_points")]
        dome_points: usize,
    },
    /// Sweep temperature or specific volume at fixed pressure.
    Isobar {
        pressure: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<SweepDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        specific_volume: Option<SweepDef>,
    },
    Process {
        process: ProcessDef,
        /// Value held constant (pressure, temperature or specific volume)
        hold: String,
        start: String,
        end: String,
        #[serde(default = "default_process_points")]
        points: usize,
    },
}

impl JobKind {
    pub fn label(&self) -> &'static str {
        match self {
            JobKind::State(_) => "state",
            JobKind::Saturation { .. } => "saturation",
            JobKind::Dome { .. } => "dome",
            JobKind::TvDiagram { .. } => "tv_diagram",
            JobKind::PvDiagram { .. } => "pv_diagram",
            JobKind::Isobar { .. } => "isobar",
            JobKind::Process { .. } => "process",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StateDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enthalpy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entropy: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpacingDef {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub start: String,
    pub end: String,
    pub points: usize,
    #[serde(default)]
    pub spacing: SpacingDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolumeRangeDef {
    pub min: String,
    pub max: String,
    #[serde(default = "default_isoline_points")]
    pub points: usize,
    #[serde(default = "default_volume_spacing")]
    pub spacing: SpacingDef,
}

impl Default for VolumeRangeDef {
    fn default() -> Self {
        Self {
            min: "0.001 m3/kg".to_string(),
            max: "100 m3/kg".to_string(),
            points: default_isoline_points(),
            spacing: default_volume_spacing(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessDef {
    /// Constant pressure; start/end are specific volumes
    Isobaric,
    /// Constant temperature; start/end are specific volumes
    Isothermal,
    /// Constant specific volume; start/end are temperatures
    Isochoric,
}

fn default_dome_points() -> usize {
    60
}

fn default_isoline_points() -> usize {
    200
}

fn default_process_points() -> usize {
    50
}

fn default_volume_spacing() -> SpacingDef {
    SpacingDef::Log
}
