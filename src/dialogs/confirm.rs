//! Generic OK/Cancel confirmation window.
//!
//! Destructive actions (trimming, deleting marks, replacing an export
//! directory) are staged as a pending event that is only emitted when the
//! user confirms.

use eframe::egui;

use crate::events::{AppEvent, AppEventSender};

#[derive(Default)]
pub struct ConfirmDialog {
    title: String,
    text: String,
    action: Option<AppEvent>,
}

impl ConfirmDialog {
    pub fn ask(&mut self, title: impl Into<String>, text: impl Into<String>, action: AppEvent) {
        self.title = title.into();
        self.text = text.into();
        self.action = Some(action);
    }

    pub fn is_open(&self) -> bool {
        self.action.is_some()
    }

    pub fn show(&mut self, ctx: &egui::Context, events: &AppEventSender) {
        if self.action.is_none() {
            return;
        }

        let mut decision: Option<bool> = None;
        egui::Window::new(self.title.clone())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&self.text);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                if let Some(action) = self.action.take() {
                    events.emit(action);
                }
            }
            Some(false) => {
                self.action = None;
            }
            None => {}
        }
    }
}
