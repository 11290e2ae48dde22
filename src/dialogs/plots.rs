//! Sensor time-series plot windows.
//!
//! Depth is plotted negated so the profile reads downward like a dive log;
//! the axis formatter shows the magnitude.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::deployment::SensorLog;

#[derive(Default)]
pub struct PlotWindows {
    pub show_depth: bool,
    pub show_voltage: bool,
}

impl PlotWindows {
    pub fn show(&mut self, ctx: &egui::Context, sensors: &SensorLog, deployment_name: &str) {
        if self.show_depth {
            self.depth_window(ctx, sensors, deployment_name);
        }
        if self.show_voltage {
            self.voltage_window(ctx, sensors, deployment_name);
        }
    }

    fn depth_window(&mut self, ctx: &egui::Context, sensors: &SensorLog, deployment_name: &str) {
        egui::Window::new(format!("Depth Profile - {deployment_name}"))
            .open(&mut self.show_depth)
            .default_size([640.0, 360.0])
            .show(ctx, |ui| {
                let depth: Vec<[f64; 2]> = sensors
                    .depth_profile()
                    .into_iter()
                    .map(|[t, d]| [t, -d])
                    .collect();
                if depth.is_empty() {
                    ui.label("No attitude records in this deployment.");
                    return;
                }

                Plot::new("depth_profile")
                    .legend(Legend::default())
                    .x_axis_label("Time (s)")
                    .y_axis_label("Depth (m)")
                    .y_axis_formatter(|mark, _| format!("{:.0}", mark.value.abs()))
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new("Depth", PlotPoints::from(depth)));
                    });
            });
    }

    fn voltage_window(&mut self, ctx: &egui::Context, sensors: &SensorLog, deployment_name: &str) {
        egui::Window::new(format!("System Voltage and Temperature - {deployment_name}"))
            .open(&mut self.show_voltage)
            .default_size([640.0, 480.0])
            .show(ctx, |ui| {
                let volts = sensors.voltage_series();
                let temps = sensors.voltage_temperature_series();
                if volts.is_empty() && temps.is_empty() {
                    ui.label("No voltage records in this deployment.");
                    return;
                }

                let half = ui.available_height() / 2.0 - 8.0;
                Plot::new("system_voltage")
                    .legend(Legend::default())
                    .height(half)
                    .x_axis_label("Time (s)")
                    .y_axis_label("Voltage (V)")
                    .show(ui, |plot_ui| {
                        for (source, points) in volts {
                            plot_ui.line(Line::new(source, PlotPoints::from(points)));
                        }
                    });

                Plot::new("system_temperature")
                    .legend(Legend::default())
                    .height(half)
                    .x_axis_label("Time (s)")
                    .y_axis_label("Temperature (C)")
                    .show(ui, |plot_ui| {
                        for (source, points) in temps {
                            plot_ui.line(Line::new(source, PlotPoints::from(points)));
                        }
                    });
            });
    }
}
