//! Input handling and event application.

use eframe::egui::{self, Align2, Key, Vec2};
use log::{info, warn};

use crate::core::prefetch::{DisplaySink, PrefetchRequest};
use crate::deployment::{Deployment, CALIBRATION_MARK};
use crate::events::AppEvent;
use crate::widgets::viewer::{HUD_COLOR, HUD_ENHANCE, HUD_FRAME, HUD_TIMESTAMP};
use crate::widgets::{ImageViewer, ARROW_JUMP, ARROW_STEP};

use super::{TrawlViewApp, MARK_TICK_COLOR};

/// Drained requests land here: one sink per channel per drain tick.
struct ChannelSink<'a> {
    viewer: &'a mut ImageViewer,
    ctx: &'a egui::Context,
    deployment: &'a Deployment,
    camera: &'a str,
}

impl DisplaySink for ChannelSink<'_> {
    fn show_frame(&mut self, request: &PrefetchRequest) {
        let Some(path) = &request.resolved_path else {
            self.clear_display();
            return;
        };
        self.viewer.set_image_or_clear(self.ctx, path);
        if !self.viewer.has_image() {
            // Load failed; leave the channel in the cleared state.
            self.remove_frame_hud();
            return;
        }

        let timestamp = self
            .deployment
            .timestamp(self.camera, request.frame_number)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| "--".to_string());
        self.viewer.set_hud_text(
            HUD_TIMESTAMP,
            timestamp,
            Vec2::new(0.98, 0.99),
            Align2::RIGHT_BOTTOM,
            HUD_COLOR,
        );
        self.viewer.set_hud_text(
            HUD_FRAME,
            format!("Frame: {}", request.frame_number),
            Vec2::new(0.02, 0.99),
            Align2::LEFT_BOTTOM,
            HUD_COLOR,
        );
        let enhance = if self.viewer.adjustments.enabled {
            "Enhancements: On"
        } else {
            "Enhancements: Off"
        };
        self.viewer.set_hud_text(
            HUD_ENHANCE,
            enhance,
            Vec2::new(0.02, 0.001),
            Align2::LEFT_TOP,
            HUD_COLOR,
        );
    }

    fn clear_display(&mut self) {
        self.viewer.clear();
        self.remove_frame_hud();
    }
}

impl ChannelSink<'_> {
    fn remove_frame_hud(&mut self) {
        self.viewer.remove_hud_item(HUD_TIMESTAMP);
        self.viewer.remove_hud_item(HUD_FRAME);
        self.viewer.remove_hud_item(HUD_ENHANCE);
    }
}

impl TrawlViewApp {
    /// Slider moved: resolve the frame for each channel and queue the loads.
    ///
    /// Loading happens on the drain tick, not here, so dragging the slider
    /// stays responsive no matter how slow the image files are.
    pub fn on_slider_changed(&mut self) {
        let Some(deployment) = &self.deployment else {
            return;
        };
        let Some(frame) = deployment.frame_at(self.slider.value() as usize) else {
            return;
        };
        if frame == self.last_frame_queued {
            return;
        }
        self.last_frame_queued = frame;

        // Cheap to do inline; no need to queue the marks readout.
        match deployment.marks.get(frame) {
            Some(description) => self.mark_text = description.to_string(),
            None => self.mark_text.clear(),
        }

        let left = self
            .left_camera
            .as_deref()
            .and_then(|camera| deployment.resolve(camera, frame));
        let right = self
            .right_camera
            .as_deref()
            .and_then(|camera| deployment.resolve(camera, frame));
        self.left_queue.request(frame, left);
        self.right_queue.request(frame, right);
    }

    /// Drain at most one pending request per channel.
    pub fn drain_queues(&mut self, ctx: &egui::Context) {
        let Some(deployment) = &self.deployment else {
            return;
        };
        if let Some(camera) = self.left_camera.as_deref() {
            self.left_queue.drain_into(&mut ChannelSink {
                viewer: &mut self.left_view,
                ctx,
                deployment,
                camera,
            });
        }
        if let Some(camera) = self.right_camera.as_deref() {
            self.right_queue.drain_into(&mut ChannelSink {
                viewer: &mut self.right_view,
                ctx,
                deployment,
                camera,
            });
        }
    }

    /// Arrow-key navigation: left/right one frame, up/down ten.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        // Don't steal arrows while the user types in a text field.
        if ctx.wants_keyboard_input() || self.deployment.is_none() {
            return;
        }

        let mut delta = 0i64;
        ctx.input(|i| {
            if i.key_pressed(Key::ArrowRight) {
                delta += ARROW_STEP;
            }
            if i.key_pressed(Key::ArrowLeft) {
                delta -= ARROW_STEP;
            }
            if i.key_pressed(Key::ArrowUp) {
                delta += ARROW_JUMP;
            }
            if i.key_pressed(Key::ArrowDown) {
                delta -= ARROW_JUMP;
            }
        });

        if delta != 0 && self.slider.set_value(self.slider.value() + delta) {
            self.on_slider_changed();
        }
    }

    // === Mark actions ===

    /// Mark the current frame. Shift-click marks it for calibration export.
    pub fn mark_current(&mut self, shift: bool) {
        let Some(frame) = self.current_frame() else {
            return;
        };
        let description = if shift {
            self.mark_text = CALIBRATION_MARK.to_string();
            CALIBRATION_MARK.to_string()
        } else {
            if self.mark_text.is_empty() {
                self.status = "Please enter a mark description.".to_string();
                return;
            }
            self.mark_text.clone()
        };

        let index = self.slider.value();
        if let Some(deployment) = self.deployment.as_mut() {
            deployment.marks.add(frame, description);
        }
        self.slider
            .add_tick(&frame.to_string(), index, 10.0, MARK_TICK_COLOR, 3.0, 255);
        self.save_sidecars_quietly();
    }

    /// Jump the slider to the neighboring mark, if there is one.
    pub fn navigate_mark(&mut self, forward: bool) {
        let Some(frame) = self.current_frame() else {
            return;
        };
        let Some(deployment) = &self.deployment else {
            return;
        };
        let hit = if forward {
            deployment.marks.next_after(frame)
        } else {
            deployment.marks.prev_before(frame)
        };
        let Some((mark_frame, description)) = hit else {
            return;
        };
        let description = description.to_string();
        let Some(index) = deployment.index_of(mark_frame) else {
            return;
        };
        if self.slider.set_value(index as i64) {
            self.on_slider_changed();
        }
        self.mark_text = description;
    }

    // === Event application ===

    pub fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::OpenDeployment(path) => self.open_deployment(path),
            AppEvent::CamerasAssigned { left, right } => self.assign_cameras(&left, &right),
            AppEvent::TrimRequested { start, end } => self.stage_trim(start, end),
            AppEvent::TrimConfirmed { start, end } => self.trim_deployment(start, end),
            AppEvent::RemoveMarkConfirmed(frame) => self.remove_mark(frame),
            AppEvent::ExportForCalConfirmed => self.export_for_cal(),
            AppEvent::ReplaceCalExportConfirmed => self.replace_cal_export(),
        }
    }

    /// Convert slider positions to frame numbers and ask for confirmation.
    fn stage_trim(&mut self, start_index: i64, end_index: i64) {
        let Some(deployment) = &self.deployment else {
            return;
        };
        let (Some(start), Some(end)) = (
            deployment.frame_at(start_index as usize),
            deployment.frame_at(end_index as usize),
        ) else {
            return;
        };
        self.confirm.ask(
            "Trim?",
            format!(
                "Are you REALLY sure you want to trim this deployment? This will \
                 PERMANENTLY delete ALL images before frame {start} and after frame {end}!"
            ),
            AppEvent::TrimConfirmed { start, end },
        );
    }

    fn trim_deployment(&mut self, start: i64, end: i64) {
        let Some(deployment) = self.deployment.as_mut() else {
            return;
        };
        self.status = "Deleting trimmed images...".to_string();
        match deployment.trim(start, end) {
            Ok(deleted) => {
                info!("trim removed {deleted} images");
                self.status = format!("Trim complete: {deleted} images deleted.");
            }
            Err(e) => {
                warn!("trim failed: {:#}", e);
                self.status = format!("Trim failed: {e}");
            }
        }
        if let Err(e) = deployment.save_sidecars() {
            warn!("failed to save sidecars after trim: {:#}", e);
        }

        // The frame index changed; rebind the slider and reload from scratch.
        let frame_count = deployment.frame_count() as i64;
        self.slider.set_range(0, (frame_count - 1).max(0));
        self.slider.set_value(0);
        self.left_queue.clear();
        self.right_queue.clear();
        self.reload_mark_ticks();
        self.last_frame_queued = -1;
        self.on_slider_changed();
    }

    fn remove_mark(&mut self, frame: i64) {
        if let Some(deployment) = self.deployment.as_mut() {
            deployment.marks.remove(frame);
        }
        self.slider.remove_tick(&frame.to_string());
        self.mark_text.clear();
        self.save_sidecars_quietly();
    }

    pub(super) fn save_sidecars_quietly(&mut self) {
        if let Some(deployment) = &self.deployment {
            if let Err(e) = deployment.save_sidecars() {
                warn!("failed to save deployment sidecars: {:#}", e);
            }
        }
    }
}
