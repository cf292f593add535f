use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rocket_1dof::io::{csv, json};
use rocket_1dof::physics::aerodynamics::area_from_diameter;
use rocket_1dof::physics::gravity::G0;
use rocket_1dof::sim::{self, convergence, EventKind, RunResult};
use rocket_1dof::vehicle::{presets, MotorCurve};
use rocket_1dof::SimConfig;

/// Vertical rocket flight from a propellant mass-flow curve.
///
/// Writes `trajectory.csv` and `metrics.json` to the output directory and
/// prints the summary JSON on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON file with any subset of the run parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Motor CSV with `time_s,mdot_kg_s` columns (built-in trapezoid if omitted)
    #[arg(long)]
    curve: Option<PathBuf>,

    #[arg(long)]
    dt: Option<f64>,
    #[arg(long)]
    tmax: Option<f64>,
    #[arg(long)]
    g: Option<f64>,
    #[arg(long)]
    rho: Option<f64>,
    #[arg(long)]
    cd: Option<f64>,
    /// Reference area (m^2)
    #[arg(long, conflicts_with = "diameter")]
    area: Option<f64>,
    /// Body diameter (m), sets the reference area
    #[arg(long)]
    diameter: Option<f64>,
    #[arg(long)]
    m_dry: Option<f64>,
    #[arg(long)]
    m_prop: Option<f64>,
    /// Effective exhaust velocity (m/s)
    #[arg(long)]
    ue: Option<f64>,

    /// Output directory
    #[arg(long, default_value = "plots")]
    out: PathBuf,

    /// Re-run at dt/2 and report the relative discrepancy
    #[arg(long)]
    check_convergence: bool,

    #[arg(long, default_value_t = convergence::DEFAULT_TOLERANCE)]
    tolerance: f64,
}

impl Cli {
    /// Defaults, then the config file, then individual flags.
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => json::load_config_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => SimConfig::default(),
        };

        let overrides = [
            (&mut config.dt, self.dt),
            (&mut config.max_time, self.tmax),
            (&mut config.g, self.g),
            (&mut config.rho, self.rho),
            (&mut config.cd, self.cd),
            (&mut config.area, self.area),
            (&mut config.dry_mass, self.m_dry),
            (&mut config.prop_mass, self.m_prop),
            (&mut config.exhaust_velocity, self.ue),
        ];
        for (field, value) in overrides {
            if let Some(v) = value {
                *field = v;
            }
        }
        if let Some(d) = self.diameter {
            if !(d.is_finite() && d > 0.0) {
                bail!("--diameter must be positive, got {d}");
            }
            config.area = area_from_diameter(d);
        }
        Ok(config)
    }

    fn motor(&self) -> Result<MotorCurve> {
        match &self.curve {
            Some(path) => csv::read_motor_curve_file(path)
                .with_context(|| format!("reading motor curve {}", path.display())),
            None => Ok(presets::sample_motor()),
        }
    }
}

fn main() -> Result<()> {
    // stdout carries only the summary JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.sim_config()?;
    let motor = cli.motor()?;
    info!(
        dt = config.dt,
        max_time = config.max_time,
        wet_mass = config.wet_mass(),
        twr = config.liftoff_twr(&motor),
        "configuration loaded"
    );

    let run = sim::simulate(&config, &motor).context("simulation failed")?;
    print_report(&config, &motor, &run);

    fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating output directory {}", cli.out.display()))?;
    let trajectory_path = cli.out.join("trajectory.csv");
    csv::write_trajectory_file(&trajectory_path, &run)
        .with_context(|| format!("writing {}", trajectory_path.display()))?;

    let summary = json::FlightSummary::from_run(&run);
    let metrics_path = cli.out.join("metrics.json");
    json::write_summary_file(&metrics_path, &summary)
        .with_context(|| format!("writing {}", metrics_path.display()))?;
    info!(dir = %cli.out.display(), "outputs written");

    json::write_summary(&mut io::stdout().lock(), &summary)?;

    if cli.check_convergence {
        let report = convergence::check(&config, &motor).context("convergence check failed")?;
        let verdict = if report.converged(cli.tolerance) { "PASS" } else { "FAIL" };
        eprintln!(
            "  Convergence (dt = {} vs {}): E_h = {:.3e}  E_V = {:.3e}  tol = {}  {}",
            report.dt,
            report.dt / 2.0,
            report.relative_error[&convergence::Signal::Altitude],
            report.relative_error[&convergence::Signal::Velocity],
            cli.tolerance,
            verdict,
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Console report (stderr)
// ---------------------------------------------------------------------------

fn print_report(config: &SimConfig, motor: &MotorCurve, run: &RunResult) {
    eprintln!();
    eprintln!("====================================================================");
    eprintln!("  VERTICAL FLIGHT SIMULATION");
    eprintln!("====================================================================");
    eprintln!();
    eprintln!("  Vehicle Parameters");
    eprintln!("  ──────────────────────────────────────────────────────────────────");
    eprintln!(
        "  Dry mass:      {:>8.3} kg    Propellant:   {:>8.3} kg",
        config.dry_mass, config.prop_mass
    );
    eprintln!(
        "  Liftoff TWR:   {:>8.2}       Ideal dv:     {:>8.0} m/s",
        config.liftoff_twr(motor),
        config.ideal_delta_v()
    );
    eprintln!(
        "  Cd:            {:>8.3}       Area:         {:>8.5} m^2",
        config.cd, config.area
    );
    eprintln!(
        "  Curve:         {:>8.2} s     Table prop:   {:>8.3} kg",
        motor.end_time() - motor.start_time(),
        motor.total_propellant()
    );
    eprintln!();

    eprintln!("  Flight Events");
    eprintln!("  ──────────────────────────────────────────────────────────────────");
    for kind in [EventKind::Meco, EventKind::Apogee, EventKind::Touchdown] {
        let label = match kind {
            EventKind::Meco => "MECO",
            EventKind::Apogee => "APOGEE",
            EventKind::Touchdown => "TOUCHDOWN",
        };
        match run.event(kind) {
            Some(e) => eprintln!(
                "  {:<10} t={:>7.3}s   alt={:>9.2}m   vel={:>8.2}m/s",
                label, e.time, e.alt, e.vel
            ),
            None => eprintln!("  {label:<10} not reached"),
        }
    }
    eprintln!();

    eprintln!("  Performance Summary");
    eprintln!("  ──────────────────────────────────────────────────────────────────");
    eprintln!("  Max altitude:  {:>8.2} m", run.maxima.alt);
    eprintln!("  Max velocity:  {:>8.2} m/s", run.maxima.vel);
    eprintln!(
        "  Max accel:     {:>8.2} m/s^2 ({:.1} g)",
        run.maxima.accel,
        run.maxima.accel / G0
    );
    eprintln!("  Flight time:   {:>8.2} s", run.final_state().time);
    eprintln!();
    eprintln!(
        "  Simulation: {} samples, dt={} s",
        run.trajectory.len(),
        config.dt
    );
    eprintln!("====================================================================");
    eprintln!();
}
