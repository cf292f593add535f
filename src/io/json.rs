use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DataError;
use crate::dynamics::state::SimConfig;
use crate::error::SimError;
use crate::physics::aerodynamics::area_from_diameter;
use crate::sim::{EventKind, RunResult};

// ---------------------------------------------------------------------------
// Flight summary
// ---------------------------------------------------------------------------

/// Key numbers of one run, flat so it reads well as JSON.
///
/// Events that did not happen are `None` (`null` in JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub meco_t: Option<f64>,
    pub meco_h: Option<f64>,
    pub meco_v: Option<f64>,
    pub apogee_t: Option<f64>,
    pub apogee_h: Option<f64>,
    pub touchdown_t: Option<f64>,
    pub h_max: f64,
    pub v_max: f64,
    pub a_max: f64,
    pub t_end: f64,
}

impl FlightSummary {
    pub fn from_run(run: &RunResult) -> Self {
        let meco = run.event(EventKind::Meco);
        let apogee = run.event(EventKind::Apogee);
        let touchdown = run.event(EventKind::Touchdown);

        FlightSummary {
            meco_t: meco.map(|e| e.time),
            meco_h: meco.map(|e| e.alt),
            meco_v: meco.map(|e| e.vel),
            apogee_t: apogee.map(|e| e.time),
            apogee_h: apogee.map(|e| e.alt),
            touchdown_t: touchdown.map(|e| e.time),
            h_max: run.maxima.alt,
            v_max: run.maxima.vel,
            a_max: run.maxima.accel,
            t_end: run.final_state().time,
        }
    }
}

/// Write the summary as pretty JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> Result<(), DataError> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write the summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> Result<(), DataError> {
    let mut file = File::create(path)?;
    write_summary(&mut file, summary)
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// On-disk form of [`SimConfig`]: any subset of its fields, plus an optional
/// body diameter that replaces `area`.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(flatten)]
    config: SimConfig,
    #[serde(default, alias = "D")]
    diameter: Option<f64>,
}

/// Parse a run configuration. Missing fields keep their defaults.
pub fn load_config<R: Read>(reader: R) -> Result<SimConfig, DataError> {
    let file: ConfigFile = serde_json::from_reader(reader)?;
    let mut config = file.config;
    if let Some(d) = file.diameter {
        if !(d.is_finite() && d > 0.0) {
            return Err(SimError::DegenerateConfig(format!(
                "diameter must be positive, got {d}"
            ))
            .into());
        }
        config.area = area_from_diameter(d);
    }
    Ok(config)
}

pub fn load_config_file(path: impl AsRef<Path>) -> Result<SimConfig, DataError> {
    let file = File::open(path)?;
    load_config(BufReader::new(file))
}
