use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use rocket_1dof::io::json::FlightSummary;
use rocket_1dof::sim::{self, RunResult};
use rocket_1dof::vehicle::presets;

fn main() -> eframe::Result {
    let config = presets::reference_config();
    let motor = presets::reference_motor();
    let run = match sim::simulate(&config, &motor) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            std::process::exit(1);
        }
    };

    let app = SimViz { summary: FlightSummary::from_run(&run), run };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Vertical Flight", options, Box::new(|_| Ok(Box::new(app))))
}

struct SimViz {
    run: RunResult,
    summary: FlightSummary,
}

/// One time-series panel: label, plot id, and named curves.
fn panel(ui: &mut egui::Ui, title: &str, id: &str, w: f32, h: f32, lines: Vec<(&str, Vec<[f64; 2]>)>) {
    ui.vertical(|ui| {
        ui.label(title);
        Plot::new(id)
            .width(w)
            .height(h)
            .x_axis_label("Time (s)")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (name, samples) in lines {
                    let points: PlotPoints = samples.into_iter().collect();
                    plot_ui.line(Line::new(name, points));
                }
            });
    });
}

fn fmt_opt(v: Option<f64>, unit: &str) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.2} {unit}"))
}

impl eframe::App for SimViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let n = self.run.trajectory.len();
        let step = (n / 2000).max(1);
        let rows: Vec<usize> = (0..n).step_by(step).collect();
        let series = |f: &dyn Fn(usize) -> f64| -> Vec<[f64; 2]> {
            rows.iter().map(|&i| [self.run.trajectory[i].time, f(i)]).collect()
        };

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Reference flight");
            let s = &self.summary;
            ui.label(format!(
                "MECO: {}  |  Apogee: {} at {}  |  Touchdown: {}  |  V max: {:.1} m/s  |  a max: {:.1} m/s^2",
                fmt_opt(s.meco_t, "s"),
                fmt_opt(s.apogee_h, "m"),
                fmt_opt(s.apogee_t, "s"),
                fmt_opt(s.touchdown_t, "s"),
                s.v_max,
                s.a_max,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let third_w = available.x / 3.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;
            let traj = &self.run.trajectory;
            let forces = &self.run.forces;

            ui.horizontal(|ui| {
                panel(ui, "Altitude (m)", "altitude", third_w, half_h,
                    vec![("h", series(&|i| traj[i].alt))]);
                panel(ui, "Velocity (m/s)", "velocity", third_w, half_h,
                    vec![("V", series(&|i| traj[i].vel))]);
                panel(ui, "Acceleration (m/s^2)", "accel", third_w, half_h,
                    vec![("a", series(&|i| forces[i].accel))]);
            });

            ui.horizontal(|ui| {
                panel(ui, "Mass (kg)", "mass", third_w, half_h,
                    vec![("m", series(&|i| traj[i].mass))]);
                panel(ui, "Mass flow (kg/s)", "mdot", third_w, half_h,
                    vec![("mdot", series(&|i| forces[i].mdot))]);
                panel(ui, "Forces (N)", "forces", third_w, half_h, vec![
                    ("Thrust", series(&|i| forces[i].thrust)),
                    ("Drag", series(&|i| forces[i].drag)),
                    ("Weight", series(&|i| forces[i].weight)),
                ]);
            });
        });
    }
}
