use rocket_1dof::io::csv;
use rocket_1dof::io::json::{self, FlightSummary};
use rocket_1dof::sim::{self, convergence};
use rocket_1dof::vehicle::presets;

fn main() {
    let config = presets::reference_config();
    let motor = presets::reference_motor();

    println!("Simulating reference flight (dt = {} s) ...", config.dt);
    let run = sim::simulate(&config, &motor).expect("reference flight failed");

    let summary = FlightSummary::from_run(&run);
    if let (Some(t), Some(h)) = (summary.apogee_t, summary.apogee_h) {
        println!("Apogee: {h:.1} m at {t:.2} s");
    }
    println!("Max velocity: {:.1} m/s", summary.v_max);
    println!("Flight time: {:.2} s", summary.t_end);

    let report = convergence::check(&config, &motor).expect("convergence check failed");
    println!(
        "Convergence vs dt/2: worst E_rel = {:.2e} ({})",
        report.worst(),
        if report.converged(convergence::DEFAULT_TOLERANCE) { "ok" } else { "refine dt" }
    );

    csv::write_trajectory_file("reference_trajectory.csv", &run)
        .expect("Failed to write CSV");
    json::write_summary_file("reference_summary.json", &summary)
        .expect("Failed to write JSON");

    println!("Exported: reference_trajectory.csv, reference_summary.json");
}
