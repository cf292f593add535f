use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::DataError;
use crate::sim::RunResult;
use crate::vehicle::MotorCurve;

// ---------------------------------------------------------------------------
// Motor curve input
// ---------------------------------------------------------------------------

const TIME_COLUMN: &str = "time_s";
const FLOW_COLUMN: &str = "mdot_kg_s";

/// Read a motor mass-flow table.
///
/// The first non-blank line is a header. Columns are picked by name
/// (`time_s`, `mdot_kg_s`, any case); without those names the first two
/// columns are taken as time and flow. Blank lines are ignored.
pub fn read_motor_curve<R: BufRead>(reader: R) -> Result<MotorCurve, DataError> {
    let mut columns: Option<(usize, usize)> = None;
    let mut samples = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').map(|c| c.trim().trim_matches('"')).collect();

        let Some((ti, mi)) = columns else {
            columns = Some(header_columns(&cells, lineno)?);
            continue;
        };

        let cell = |i: usize, what: &str| -> Result<f64, DataError> {
            let raw = cells.get(i).ok_or_else(|| DataError::Parse {
                line: lineno,
                message: format!("missing {what} column"),
            })?;
            raw.parse::<f64>().map_err(|_| DataError::Parse {
                line: lineno,
                message: format!("{what} {raw:?} is not a number"),
            })
        };
        samples.push((cell(ti, "time")?, cell(mi, "mass flow")?));
    }

    if columns.is_none() {
        return Err(DataError::Parse {
            line: 0,
            message: "empty file, expected a header row".into(),
        });
    }
    Ok(MotorCurve::new(samples)?)
}

fn header_columns(cells: &[&str], lineno: usize) -> Result<(usize, usize), DataError> {
    if cells.len() < 2 {
        return Err(DataError::Parse {
            line: lineno,
            message: "header needs at least two columns".into(),
        });
    }
    if cells.iter().all(|c| c.parse::<f64>().is_ok()) {
        return Err(DataError::Parse {
            line: lineno,
            message: "missing header row".into(),
        });
    }
    let find = |name: &str| cells.iter().position(|c| c.eq_ignore_ascii_case(name));
    match (find(TIME_COLUMN), find(FLOW_COLUMN)) {
        (Some(t), Some(m)) => Ok((t, m)),
        _ => Ok((0, 1)),
    }
}

pub fn read_motor_curve_file(path: impl AsRef<Path>) -> Result<MotorCurve, DataError> {
    let file = File::open(path)?;
    read_motor_curve(BufReader::new(file))
}

// ---------------------------------------------------------------------------
// Trajectory output
// ---------------------------------------------------------------------------

/// Write the sampled trace to CSV, one row per state.
///
/// Columns: time_s, altitude_m, velocity_m_s, mass_kg, mdot_kg_s,
///          accel_m_s2, thrust_n, drag_n, weight_n
pub fn write_trajectory<W: Write>(writer: &mut W, run: &RunResult) -> io::Result<()> {
    writeln!(
        writer,
        "time_s,altitude_m,velocity_m_s,mass_kg,mdot_kg_s,\
         accel_m_s2,thrust_n,drag_n,weight_n"
    )?;

    for (s, f) in run.trajectory.iter().zip(&run.forces) {
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.6},{:.6},\
             {:.4},{:.4},{:.4},{:.4}",
            s.time, s.alt, s.vel, s.mass, f.mdot,
            f.accel, f.thrust, f.drag, f.weight,
        )?;
    }

    Ok(())
}

/// Write the trace to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, run: &RunResult) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_trajectory(&mut file, run)?;
    file.flush()
}
