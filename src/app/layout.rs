//! Panel layout: menu bar, dual viewers, transport and marks strip.

use eframe::egui::{self, Color32, RichText, ViewportCommand};

use crate::deployment::sensors::fmt_reading;
use crate::events::AppEvent;

use super::TrawlViewApp;

const PLAY_ACTIVE: Color32 = Color32::from_rgb(77, 223, 77);
const PLAY_IDLE: Color32 = Color32::from_rgb(150, 150, 150);

impl TrawlViewApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        self.menu_bar(ctx);
        self.control_strip(ctx);
        self.viewers(ctx);
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Deployment…").clicked() {
                        if let Some(dir) = rfd::FileDialog::new()
                            .set_title("Select Deployment Directory")
                            .set_directory(&self.settings.data_dir)
                            .pick_folder()
                        {
                            self.events_tx.emit(AppEvent::OpenDeployment(dir));
                        }
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(ViewportCommand::Close);
                    }
                });

                let has_deployment = self.deployment.is_some();
                ui.menu_button("Plots", |ui| {
                    if ui
                        .add_enabled(has_deployment, egui::Button::new("Depth Profile"))
                        .clicked()
                    {
                        self.plots.show_depth = true;
                        ui.close();
                    }
                    if ui
                        .add_enabled(
                            has_deployment,
                            egui::Button::new("System Voltage and Temperature"),
                        )
                        .clicked()
                    {
                        self.plots.show_voltage = true;
                        ui.close();
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.settings.show_tick_labels, "Tick labels");
                    let mut changed = false;
                    changed |= ui
                        .checkbox(&mut self.left_view.adjustments.enabled, "Enhance left")
                        .changed();
                    changed |= ui
                        .checkbox(&mut self.right_view.adjustments.enabled, "Enhance right")
                        .changed();
                    if changed {
                        // Reload the pair so the toggle takes effect now.
                        self.last_frame_queued = -1;
                        self.on_slider_changed();
                    }
                    ui.checkbox(
                        &mut self.settings.enhance_cal_export,
                        "Enhance calibration exports",
                    );
                });

                if let Some(deployment) = &self.deployment {
                    ui.separator();
                    ui.label(RichText::new(deployment.name()).strong());
                }
            });
        });
        self.slider_config.show_labels = self.settings.show_tick_labels;
    }

    fn control_strip(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("control_strip").show(ctx, |ui| {
            ui.add_space(4.0);

            // Scrub slider across the full strip; the slider widget claims
            // the remaining row width itself.
            let config = self.slider_config.clone();
            if self.slider.show(ui, &config).is_some() {
                self.on_slider_changed();
            }

            ui.horizontal(|ui| {
                self.transport_controls(ui);
                ui.separator();
                self.marks_controls(ui);
                ui.separator();
                self.export_controls(ui);
                ui.separator();
                self.sensor_readout(ui);
            });

            if !self.status.is_empty() {
                ui.separator();
                ui.label(&self.status);
            }
            ui.add_space(2.0);
        });
    }

    fn transport_controls(&mut self, ui: &mut egui::Ui) {
        let enabled = self.deployment.is_some();
        ui.add_enabled_ui(enabled, |ui| {
            let fill = if self.playback.is_playing() {
                PLAY_ACTIVE
            } else {
                PLAY_IDLE
            };
            if ui.add(egui::Button::new("Play").fill(fill)).clicked() {
                self.playback.toggle();
            }

            let mut fps = self.playback.fps();
            ui.label("Speed");
            if ui
                .add(
                    egui::DragValue::new(&mut fps)
                        .range(crate::core::playback::MIN_FPS..=crate::core::playback::MAX_FPS)
                        .speed(0.2)
                        .suffix(" fps"),
                )
                .changed()
            {
                self.playback.set_fps(fps);
            }

            if let (Some(deployment), Some(frame)) =
                (self.deployment.as_ref(), self.current_frame())
            {
                let first = deployment.first_frame().unwrap_or(0);
                let last = deployment.last_frame().unwrap_or(0);
                ui.monospace(format!("Frame {frame} [{first}..{last}]"));
            }
        });
    }

    fn marks_controls(&mut self, ui: &mut egui::Ui) {
        let enabled = self.deployment.is_some();
        ui.add_enabled_ui(enabled, |ui| {
            ui.label("Mark:");
            ui.add(
                egui::TextEdit::singleline(&mut self.mark_text)
                    .desired_width(160.0)
                    .hint_text("description"),
            );
            if ui.button("Mark").clicked() {
                let shift = ui.input(|i| i.modifiers.shift);
                self.mark_current(shift);
            }
            if ui.button("Prev").clicked() {
                self.navigate_mark(false);
            }
            if ui.button("Next").clicked() {
                self.navigate_mark(true);
            }

            let on_mark = self
                .current_frame()
                .zip(self.deployment.as_ref())
                .is_some_and(|(frame, d)| d.marks.contains(frame));
            if ui
                .add_enabled(on_mark, egui::Button::new("Delete"))
                .clicked()
            {
                if let Some(frame) = self.current_frame() {
                    self.confirm.ask(
                        "Delete mark?",
                        format!("Sure you want to delete the mark at frame {frame}?"),
                        AppEvent::RemoveMarkConfirmed(frame),
                    );
                }
            }
        });
    }

    fn export_controls(&mut self, ui: &mut egui::Ui) {
        let enabled = self.deployment.is_some();
        ui.add_enabled_ui(enabled, |ui| {
            if ui.button("Export Images").clicked() {
                self.export_current_images();
            }
            if ui.button("Export for Cal").clicked() {
                self.request_cal_export();
            }
            if ui.button("Export Metadata").clicked() {
                self.export_metadata();
            }
            if ui.button("Trim…").clicked() {
                self.trim_dialog.open();
            }
        });
    }

    fn sensor_readout(&mut self, ui: &mut egui::Ui) {
        let attitude = self
            .current_frame()
            .zip(self.deployment.as_ref())
            .and_then(|(frame, d)| d.sensors.attitude(frame));

        let (depth, pitch, roll, yaw) = match attitude {
            Some(a) => (
                fmt_reading(a.depth),
                fmt_reading(a.pitch),
                fmt_reading(a.roll),
                fmt_reading(a.yaw),
            ),
            None => (
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ),
        };
        ui.monospace(format!("Depth {depth}"));
        ui.monospace(format!("Pitch {pitch}"));
        ui.monospace(format!("Roll {roll}"));
        ui.monospace(format!("Yaw {yaw}"));
    }

    fn viewers(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.left_view.show(&mut columns[0]);
                self.right_view.show(&mut columns[1]);
            });
        });
    }
}
