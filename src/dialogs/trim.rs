//! Trim-deployment dialog.
//!
//! Start and end frames are captured from wherever the slider currently sits,
//! shown as red ticks while the dialog is open, and removed again on both
//! accept and cancel. The dialog emits `TrimRequested`; the destructive part
//! only happens after the main window's confirmation.

use eframe::egui;

use crate::events::{AppEvent, AppEventSender};
use crate::widgets::TickSlider;

pub const TRIM_START_TICK: &str = "trim-start";
pub const TRIM_END_TICK: &str = "trim-end";
pub const TRIM_TICK_COLOR: [u8; 3] = [240, 10, 10];

#[derive(Default)]
pub struct TrimDialog {
    pub open: bool,
    start: Option<i64>,
    end: Option<i64>,
    error: Option<String>,
}

impl TrimDialog {
    pub fn open(&mut self) {
        self.open = true;
        self.start = None;
        self.end = None;
        self.error = None;
    }

    /// Render the dialog. `slider` supplies the current position (in slider
    /// index space) and carries the bound ticks.
    pub fn show(&mut self, ctx: &egui::Context, slider: &mut TickSlider, events: &AppEventSender) {
        if !self.open {
            return;
        }

        let mut close = false;
        egui::Window::new("Trim Deployment")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Set the range of frames to KEEP. Everything outside it will be deleted.");
                ui.separator();

                egui::Grid::new("trim_grid").num_columns(3).show(ui, |ui| {
                    ui.label("Start frame:");
                    ui.label(self.start.map_or(String::new(), |v| v.to_string()));
                    if ui.button("Set From Slider").clicked() {
                        self.set_start(slider);
                    }
                    ui.end_row();

                    ui.label("End frame:");
                    ui.label(self.end.map_or(String::new(), |v| v.to_string()));
                    if ui.button("Set From Slider").clicked() {
                        self.set_end(slider);
                    }
                    ui.end_row();
                });

                if let Some(error) = &self.error {
                    ui.colored_label(egui::Color32::LIGHT_RED, error);
                }
                ui.separator();

                ui.horizontal(|ui| {
                    let ready = self.start.is_some() && self.end.is_some();
                    if ui.add_enabled(ready, egui::Button::new("Trim…")).clicked() {
                        if let (Some(start), Some(end)) = (self.start, self.end) {
                            events.emit(AppEvent::TrimRequested { start, end });
                        }
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            slider.remove_tick(TRIM_START_TICK);
            slider.remove_tick(TRIM_END_TICK);
            self.open = false;
        }
    }

    fn set_start(&mut self, slider: &mut TickSlider) {
        let val = slider.value();
        if self.end.is_none_or(|end| val < end) {
            self.start = Some(val);
            self.error = None;
            slider.add_tick(TRIM_START_TICK, val, 10.0, TRIM_TICK_COLOR, 3.0, 255);
        } else {
            self.error = Some("Start frame must be smaller than the end frame".to_string());
        }
    }

    fn set_end(&mut self, slider: &mut TickSlider) {
        let val = slider.value();
        if self.start.is_none_or(|start| start < val) {
            self.end = Some(val);
            self.error = None;
            slider.add_tick(TRIM_END_TICK, val, 10.0, TRIM_TICK_COLOR, 3.0, 255);
        } else {
            self.error = Some("End frame must be greater than the start frame".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_must_precede_end() {
        let mut dialog = TrimDialog::default();
        dialog.open();
        let mut slider = TickSlider::new(0, 100);

        slider.set_value(50);
        dialog.set_end(&mut slider);
        assert_eq!(dialog.end, Some(50));

        slider.set_value(80);
        dialog.set_start(&mut slider);
        assert_eq!(dialog.start, None);
        assert!(dialog.error.is_some());

        slider.set_value(10);
        dialog.set_start(&mut slider);
        assert_eq!(dialog.start, Some(10));
        assert!(dialog.error.is_none());
    }

    #[test]
    fn bound_ticks_follow_captures() {
        let mut dialog = TrimDialog::default();
        dialog.open();
        let mut slider = TickSlider::new(0, 100);

        slider.set_value(10);
        dialog.set_start(&mut slider);
        slider.set_value(60);
        dialog.set_end(&mut slider);

        assert_eq!(slider.tick(TRIM_START_TICK).map(|t| t.position), Some(10));
        assert_eq!(slider.tick(TRIM_END_TICK).map(|t| t.position), Some(60));

        // Re-capturing the start moves the same tick.
        slider.set_value(20);
        dialog.set_start(&mut slider);
        assert_eq!(slider.tick(TRIM_START_TICK).map(|t| t.position), Some(20));
        assert_eq!(slider.tick_count(), 2);
    }
}
