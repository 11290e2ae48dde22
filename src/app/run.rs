//! Main application loop - eframe::App implementation.

use std::time::Duration;

use eframe::egui;

use super::TrawlViewApp;

impl eframe::App for TrawlViewApp {
    /// Per-frame update.
    ///
    /// Flow:
    /// 1. Playback tick advances the slider (same path as manual scrubbing)
    /// 2. Drain tick services at most one prefetch request per channel
    /// 3. Panels and dialogs render
    /// 4. Keyboard input, then queued events
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.playback.tick() {
            if self.slider.step(1) {
                self.on_slider_changed();
            } else {
                // End of the deployment; nothing further to play.
                self.playback.pause();
            }
        }

        if self.drain_ticker.tick() {
            self.drain_ticker.set_period(self.settings.drain_interval_ms);
            self.drain_queues(ctx);
        }

        self.render(ctx);

        // Dialogs draw on top of the panels.
        if let Some(deployment) = &self.deployment {
            self.plots.show(ctx, &deployment.sensors, deployment.name());
        }
        let events = self.events_tx.clone();
        self.trim_dialog.show(ctx, &mut self.slider, &events);
        self.camera_dialog.show(ctx, &events);
        self.confirm.show(ctx, &events);

        self.handle_keyboard_input(ctx);
        self.process_events();

        // Keep the drain and playback timers alive even when idle.
        let mut wakeup = self.drain_ticker.period();
        if self.playback.is_playing() {
            wakeup = wakeup.min(Duration::from_secs_f32(1.0 / self.playback.fps()));
        }
        if !self.left_queue.is_empty() || !self.right_queue.is_empty() || self.playback.is_playing()
        {
            ctx.request_repaint_after(wakeup);
        } else {
            // Nothing pending; a slow heartbeat is enough to pick up timers.
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.close_deployment();
    }
}
