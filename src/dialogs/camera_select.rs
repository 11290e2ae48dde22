//! Camera role assignment dialog.
//!
//! Shown when a deployment's cameras carry no left/right labels. The user
//! picks which camera feeds which channel; the same camera cannot serve both.

use eframe::egui;

use crate::events::{AppEvent, AppEventSender};

#[derive(Default)]
pub struct CameraSelectDialog {
    pub open: bool,
    cameras: Vec<String>,
    left_idx: usize,
    right_idx: usize,
}

impl CameraSelectDialog {
    pub fn open_with(&mut self, cameras: Vec<String>) {
        self.left_idx = 0;
        self.right_idx = if cameras.len() > 1 { 1 } else { 0 };
        self.cameras = cameras;
        self.open = true;
    }

    pub fn show(&mut self, ctx: &egui::Context, events: &AppEventSender) {
        if !self.open {
            return;
        }

        let mut close = false;
        egui::Window::new("Assign Cameras")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("This deployment has unlabeled cameras. Assign each channel:");
                ui.separator();

                egui::Grid::new("camera_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Left camera:");
                    combo(ui, "camsel_left", &self.cameras, &mut self.left_idx);
                    ui.end_row();

                    ui.label("Right camera:");
                    combo(ui, "camsel_right", &self.cameras, &mut self.right_idx);
                    ui.end_row();
                });

                let distinct = self.left_idx != self.right_idx;
                if !distinct {
                    ui.colored_label(
                        egui::Color32::LIGHT_RED,
                        "Left and right must be different cameras",
                    );
                }
                ui.separator();

                ui.horizontal(|ui| {
                    if ui.add_enabled(distinct, egui::Button::new("OK")).clicked() {
                        events.emit(AppEvent::CamerasAssigned {
                            left: self.cameras[self.left_idx].clone(),
                            right: self.cameras[self.right_idx].clone(),
                        });
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.open = false;
        }
    }
}

fn combo(ui: &mut egui::Ui, id: &str, cameras: &[String], selected: &mut usize) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(cameras.get(*selected).cloned().unwrap_or_default())
        .show_ui(ui, |ui| {
            for (idx, camera) in cameras.iter().enumerate() {
                ui.selectable_value(selected, idx, camera);
            }
        });
}
