//! Application module - TrawlViewApp and related functionality.
//!
//! Submodules:
//! - `events` - keyboard input, slider-change handling, event application
//! - `export` - image/calibration/metadata export operations
//! - `layout` - menu bar and panel rendering
//! - `run` - the eframe::App update loop

mod events;
mod export;
mod layout;
mod run;

use std::path::PathBuf;

use crossbeam_channel::Receiver;
use eframe::egui::{Align2, Vec2};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::core::{IntervalTicker, Playback, PrefetchQueue, DEFAULT_MAX_QUEUED};
use crate::core::ticker::DEFAULT_DRAIN_INTERVAL_MS;
use crate::deployment::Deployment;
use crate::dialogs::{CameraSelectDialog, ConfirmDialog, PlotWindows, TrimDialog};
use crate::events::{channel, AppEvent, AppEventSender};
use crate::widgets::viewer::{HUD_CAMERA, HUD_COLOR};
use crate::widgets::{ImageViewer, TickSlider, TickSliderConfig};

/// Color of mark ticks on the slider.
pub const MARK_TICK_COLOR: [u8; 3] = [10, 10, 240];

/// Persisted application settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory the last deployment was opened from.
    pub data_dir: PathBuf,
    /// Directory the last export went to.
    pub copy_dir: PathBuf,
    /// Apply the channel adjustments when exporting calibration images.
    pub enhance_cal_export: bool,
    pub max_queued: usize,
    pub drain_interval_ms: u64,
    pub show_tick_labels: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir: home.clone(),
            copy_dir: home,
            enhance_cal_export: true,
            max_queued: DEFAULT_MAX_QUEUED,
            drain_interval_ms: DEFAULT_DRAIN_INTERVAL_MS,
            show_tick_labels: true,
        }
    }
}

/// Main application state.
pub struct TrawlViewApp {
    pub settings: AppSettings,

    pub deployment: Option<Deployment>,
    pub left_camera: Option<String>,
    pub right_camera: Option<String>,

    pub slider: TickSlider,
    pub slider_config: TickSliderConfig,
    pub left_view: ImageViewer,
    pub right_view: ImageViewer,
    pub left_queue: PrefetchQueue,
    pub right_queue: PrefetchQueue,

    pub playback: Playback,
    pub drain_ticker: IntervalTicker,
    /// Frame number most recently pushed to the queues; guards against
    /// duplicate requests when the slider reports an unchanged position.
    pub last_frame_queued: i64,

    pub mark_text: String,
    pub status: String,

    pub trim_dialog: TrimDialog,
    pub camera_dialog: CameraSelectDialog,
    pub confirm: ConfirmDialog,
    pub plots: PlotWindows,

    pub events_tx: AppEventSender,
    pub events_rx: Receiver<AppEvent>,
}

impl TrawlViewApp {
    pub fn new(cc: &eframe::CreationContext<'_>, args: &Args) -> Self {
        let settings: AppSettings = cc
            .storage
            .filter(|_| !args.reset_window)
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let (events_tx, events_rx) = channel();

        let mut app = Self {
            left_queue: PrefetchQueue::new(settings.max_queued),
            right_queue: PrefetchQueue::new(settings.max_queued),
            drain_ticker: IntervalTicker::new(settings.drain_interval_ms),
            settings,
            deployment: None,
            left_camera: None,
            right_camera: None,
            slider: TickSlider::new(0, 0),
            slider_config: TickSliderConfig::default(),
            left_view: ImageViewer::new("left"),
            right_view: ImageViewer::new("right"),
            playback: Playback::default(),
            last_frame_queued: -1,
            mark_text: String::new(),
            status: String::new(),
            trim_dialog: TrimDialog::default(),
            camera_dialog: CameraSelectDialog::default(),
            confirm: ConfirmDialog::default(),
            plots: PlotWindows::default(),
            events_tx,
            events_rx,
        };
        app.slider.set_enabled(false);

        if let Some(fps) = args.fps {
            app.playback.set_fps(fps);
        }
        if let Some(path) = &args.deployment {
            app.open_deployment(path.clone());
            if let Some(index) = args.start_frame {
                if app.slider.set_value(index) {
                    app.on_slider_changed();
                }
            }
            if args.autoplay && app.deployment.is_some() {
                app.playback.play();
            }
        }
        app
    }

    /// Open a deployment directory, replacing any current one.
    pub fn open_deployment(&mut self, path: PathBuf) {
        self.close_deployment();

        let deployment = match Deployment::open(&path) {
            Ok(deployment) => deployment,
            Err(e) => {
                error!("failed to open {}: {:#}", path.display(), e);
                self.status = format!(
                    "Unable to open {}. Is this a deployment package?",
                    path.display()
                );
                return;
            }
        };

        self.settings.data_dir = path;
        let left = deployment.labeled_camera("left").map(str::to_string);
        let right = deployment.labeled_camera("right").map(str::to_string);
        self.deployment = Some(deployment);

        match (left, right) {
            (Some(left), Some(right)) => self.assign_cameras(&left, &right),
            _ => {
                // Unlabeled package: ask the user which camera is which.
                let cameras = self
                    .deployment
                    .as_ref()
                    .map(|d| d.camera_names())
                    .unwrap_or_default();
                self.camera_dialog.open_with(cameras);
            }
        }
    }

    /// Bind channel roles and bring the UI up for the open deployment.
    pub fn assign_cameras(&mut self, left: &str, right: &str) {
        let Some(deployment) = self.deployment.as_mut() else {
            return;
        };
        deployment.set_camera_labels(left, right);

        self.left_camera = Some(left.to_string());
        self.right_camera = Some(right.to_string());
        self.left_view.set_name(left);
        self.right_view.set_name(right);
        self.left_view.adjustments = deployment.adjustments_for(left);
        self.right_view.adjustments = deployment.adjustments_for(right);

        let frame_count = deployment.frame_count() as i64;
        self.slider.set_range(0, (frame_count - 1).max(0));
        self.slider.set_single_step(1);
        self.slider.set_page_step(10);
        self.slider.set_enabled(true);
        self.slider.set_value(0);

        for (viewer, camera) in [
            (&mut self.left_view, left.to_string()),
            (&mut self.right_view, right.to_string()),
        ] {
            viewer.set_hud_text(
                HUD_CAMERA,
                camera,
                Vec2::new(0.5, 0.001),
                Align2::CENTER_TOP,
                HUD_COLOR,
            );
        }

        self.reload_mark_ticks();
        self.last_frame_queued = -1;
        self.on_slider_changed();
        self.status.clear();
        info!("cameras assigned: left={left} right={right}");
    }

    /// Rebuild the slider's mark ticks from the deployment's mark set.
    pub fn reload_mark_ticks(&mut self) {
        self.slider.remove_all_ticks();
        let Some(deployment) = &self.deployment else {
            return;
        };
        for frame in deployment.marks.frames().collect::<Vec<_>>() {
            if let Some(index) = deployment.index_of(frame) {
                self.slider.add_tick(
                    &frame.to_string(),
                    index as i64,
                    10.0,
                    MARK_TICK_COLOR,
                    3.0,
                    255,
                );
            }
        }
    }

    /// Persist sidecars and tear down the viewing session.
    pub fn close_deployment(&mut self) {
        if let Some(deployment) = self.deployment.as_mut() {
            if let Some(camera) = &self.left_camera {
                deployment.set_adjustments(camera, self.left_view.adjustments);
            }
            if let Some(camera) = &self.right_camera {
                deployment.set_adjustments(camera, self.right_view.adjustments);
            }
            if let Err(e) = deployment.save_sidecars() {
                error!("failed to save deployment sidecars: {:#}", e);
            }
        }

        self.deployment = None;
        self.left_camera = None;
        self.right_camera = None;
        self.playback.pause();
        self.left_queue.clear();
        self.right_queue.clear();
        self.left_view.clear();
        self.left_view.remove_all_hud_items();
        self.right_view.clear();
        self.right_view.remove_all_hud_items();
        self.slider.remove_all_ticks();
        self.slider.set_enabled(false);
        self.last_frame_queued = -1;
        self.mark_text.clear();
    }

    /// Frame number under the slider, if a deployment is open.
    pub fn current_frame(&self) -> Option<i64> {
        self.deployment
            .as_ref()
            .and_then(|d| d.frame_at(self.slider.value() as usize))
    }
}
