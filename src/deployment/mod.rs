//! Deployment package access - camera imagery, marks, sensors, sidecars.
//!
//! A deployment is a directory tree:
//!
//! ```text
//! <deployment>/
//!   images/<camera>/<frame>_<timestamp>.jpg
//!   cameras.json       camera -> "left"/"right" role labels
//!   marks.json         frame bookmarks
//!   adjustments.json   per-camera image adjustments
//!   attitude.csv       frame-keyed attitude/depth records
//!   voltage.csv        battery and camera voltage samples
//! ```
//!
//! This module is the frame resolver the prefetch queues consume: given a
//! camera and a frame number it yields a file path, or None when that camera
//! missed the frame (the display is then cleared rather than erroring).

pub mod marks;
pub mod metadata;
pub mod sensors;

pub use marks::{MarkSet, CALIBRATION_MARK};
pub use metadata::{CameraIndex, ImageEntry};
pub use sensors::SensorLog;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use chrono::NaiveDateTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const IMAGES_DIR: &str = "images";
/// Calibration exports land here; the scanner must skip it.
pub const CAL_EXPORT_DIR: &str = "ExportForCal";

const CAMERA_LABELS_FILE: &str = "cameras.json";
const MARKS_FILE: &str = "marks.json";
const ADJUSTMENTS_FILE: &str = "adjustments.json";

/// Per-camera display adjustments, persisted across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageAdjustments {
    pub enabled: bool,
    pub brightness: i32,
    pub contrast: f32,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            enabled: false,
            brightness: 30,
            contrast: 15.0,
        }
    }
}

pub struct Deployment {
    root: PathBuf,
    name: String,
    cameras: BTreeMap<String, CameraIndex>,
    labels: BTreeMap<String, String>,
    frames: Vec<i64>,
    pub marks: MarkSet,
    pub sensors: SensorLog,
    adjustments: BTreeMap<String, ImageAdjustments>,
}

impl Deployment {
    /// Open a deployment directory: scan the image tree and load sidecars.
    pub fn open(root: &Path) -> Result<Self> {
        let images_root = root.join(IMAGES_DIR);
        if !images_root.is_dir() {
            bail!(
                "{} has no {IMAGES_DIR}/ directory; not a deployment package",
                root.display()
            );
        }

        let mut cameras = BTreeMap::new();
        for entry in fs::read_dir(&images_root)
            .with_context(|| format!("reading {}", images_root.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name == CAL_EXPORT_DIR {
                continue;
            }
            let index = metadata::scan_camera_dir(&entry.path())?;
            if index.is_empty() {
                warn!("camera directory {} holds no imagery, ignoring", name);
                continue;
            }
            cameras.insert(name, index);
        }
        if cameras.is_empty() {
            bail!("{} holds no camera imagery", root.display());
        }

        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("deployment")
            .to_string();

        let labels = load_labels(&root.join(CAMERA_LABELS_FILE))?;
        let marks = MarkSet::load(&root.join(MARKS_FILE))?;
        let sensors = SensorLog::load(root)?;
        let adjustments = load_adjustments(&root.join(ADJUSTMENTS_FILE))?;

        let mut deployment = Self {
            root: root.to_path_buf(),
            name,
            cameras,
            labels,
            frames: Vec::new(),
            marks,
            sensors,
            adjustments,
        };
        deployment.rebuild_frames();

        info!(
            "opened deployment {}: {} cameras, {} frames, {} marks",
            deployment.name,
            deployment.cameras.len(),
            deployment.frames.len(),
            deployment.marks.len()
        );
        Ok(deployment)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn camera_names(&self) -> Vec<String> {
        self.cameras.keys().cloned().collect()
    }

    /// Camera assigned the given role label ("left"/"right"), if any.
    pub fn labeled_camera(&self, label: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(_, l)| l.eq_ignore_ascii_case(label))
            .map(|(camera, _)| camera.as_str())
    }

    pub fn set_camera_labels(&mut self, left: &str, right: &str) {
        self.labels.clear();
        self.labels.insert(left.to_string(), "left".to_string());
        self.labels.insert(right.to_string(), "right".to_string());
    }

    // === Frame index ===

    /// Global ordered frame-number list, the slider's coordinate space.
    pub fn frames(&self) -> &[i64] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_at(&self, index: usize) -> Option<i64> {
        self.frames.get(index).copied()
    }

    pub fn index_of(&self, frame: i64) -> Option<usize> {
        self.frames.binary_search(&frame).ok()
    }

    pub fn first_frame(&self) -> Option<i64> {
        self.frames.first().copied()
    }

    pub fn last_frame(&self) -> Option<i64> {
        self.frames.last().copied()
    }

    fn rebuild_frames(&mut self) {
        let mut frames: Vec<i64> = self
            .cameras
            .values()
            .flat_map(|index| index.frames())
            .collect();
        frames.sort_unstable();
        frames.dedup();
        self.frames = frames;
    }

    // === Frame resolver boundary ===

    /// Resolve a (camera, frame) pair to an image path. None means "no image
    /// for this frame on this camera" and instructs the sink to clear.
    pub fn resolve(&self, camera: &str, frame: i64) -> Option<PathBuf> {
        self.cameras
            .get(camera)?
            .entry(frame)
            .map(|entry| entry.path.clone())
    }

    pub fn timestamp(&self, camera: &str, frame: i64) -> Option<NaiveDateTime> {
        self.cameras.get(camera)?.entry(frame)?.timestamp
    }

    // === Adjustments ===

    pub fn adjustments_for(&self, camera: &str) -> ImageAdjustments {
        self.adjustments.get(camera).copied().unwrap_or_default()
    }

    pub fn set_adjustments(&mut self, camera: &str, adjustments: ImageAdjustments) {
        self.adjustments.insert(camera.to_string(), adjustments);
    }

    // === Persistence ===

    /// Write marks, adjustments and camera labels back to the package.
    pub fn save_sidecars(&self) -> Result<()> {
        self.marks.save(&self.root.join(MARKS_FILE))?;
        let raw = serde_json::to_string_pretty(&self.adjustments)?;
        fs::write(self.root.join(ADJUSTMENTS_FILE), raw)?;
        let raw = serde_json::to_string_pretty(&self.labels)?;
        fs::write(self.root.join(CAMERA_LABELS_FILE), raw)?;
        Ok(())
    }

    // === Trim ===

    /// Permanently delete all images outside `[start, end]` (frame numbers,
    /// inclusive) on every camera, then rebuild the frame index and prune
    /// marks. Returns the number of files deleted.
    pub fn trim(&mut self, start: i64, end: i64) -> Result<usize> {
        if end < start {
            bail!("trim range end {end} precedes start {start}");
        }

        let mut deleted = 0usize;
        for index in self.cameras.values_mut() {
            let doomed: Vec<i64> = index
                .frames()
                .filter(|f| !(start..=end).contains(f))
                .collect();
            for frame in doomed {
                if let Some(entry) = index.remove(frame) {
                    fs::remove_file(&entry.path)
                        .with_context(|| format!("deleting {}", entry.path.display()))?;
                    deleted += 1;
                }
            }
        }

        self.marks.retain_range(start, end);
        self.rebuild_frames();
        info!("trimmed deployment to [{start}, {end}]: {deleted} images deleted");
        Ok(deleted)
    }

    /// Destination for calibration exports.
    pub fn cal_export_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR).join(CAL_EXPORT_DIR)
    }
}

fn load_labels(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn load_adjustments(path: &Path) -> Result<BTreeMap<String, ImageAdjustments>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_deployment(dir: &Path) {
        let left = dir.join(IMAGES_DIR).join("cam_port");
        let right = dir.join(IMAGES_DIR).join("cam_stbd");
        fs::create_dir_all(&left).expect("mkdir");
        fs::create_dir_all(&right).expect("mkdir");

        for frame in [1, 2, 3] {
            fs::write(left.join(format!("{frame:05}_20240607-1425{frame:02}.000.jpg")), b"L")
                .expect("write");
        }
        // Right camera missed frame 2.
        for frame in [1, 3, 4] {
            fs::write(right.join(format!("{frame:05}_20240607-1425{frame:02}.000.jpg")), b"R")
                .expect("write");
        }
        fs::write(
            dir.join(CAMERA_LABELS_FILE),
            r#"{"cam_port": "left", "cam_stbd": "right"}"#,
        )
        .expect("labels");
    }

    #[test]
    fn frames_are_union_over_cameras() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_deployment(dir.path());

        let deployment = Deployment::open(dir.path()).expect("open");
        assert_eq!(deployment.frames(), &[1, 2, 3, 4]);
        assert_eq!(deployment.frame_at(1), Some(2));
        assert_eq!(deployment.index_of(4), Some(3));
        assert_eq!(deployment.index_of(99), None);
    }

    #[test]
    fn resolver_returns_none_for_missed_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_deployment(dir.path());

        let deployment = Deployment::open(dir.path()).expect("open");
        assert!(deployment.resolve("cam_port", 2).is_some());
        assert!(deployment.resolve("cam_stbd", 2).is_none());
        assert!(deployment.resolve("cam_stbd", 4).is_some());
        assert!(deployment.resolve("no_such_cam", 1).is_none());
    }

    #[test]
    fn labels_assign_channel_roles() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_deployment(dir.path());

        let deployment = Deployment::open(dir.path()).expect("open");
        assert_eq!(deployment.labeled_camera("left"), Some("cam_port"));
        assert_eq!(deployment.labeled_camera("RIGHT"), Some("cam_stbd"));
        assert_eq!(deployment.labeled_camera("top"), None);
    }

    #[test]
    fn open_rejects_non_deployment_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(Deployment::open(dir.path()).is_err());
    }

    #[test]
    fn trim_deletes_outside_range_and_prunes_marks() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_deployment(dir.path());

        let mut deployment = Deployment::open(dir.path()).expect("open");
        deployment.marks.add(1, "early");
        deployment.marks.add(3, "keeper");

        // Keep [2, 3]: drops frame 1 on both cameras and frame 4 on the right.
        let deleted = deployment.trim(2, 3).expect("trim");
        assert_eq!(deleted, 3);
        assert_eq!(deployment.frames(), &[2, 3]);
        assert!(deployment.resolve("cam_port", 1).is_none());
        assert_eq!(deployment.marks.frames().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn trim_rejects_inverted_range() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_deployment(dir.path());
        let mut deployment = Deployment::open(dir.path()).expect("open");
        assert!(deployment.trim(3, 2).is_err());
    }

    #[test]
    fn sidecars_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_deployment(dir.path());

        {
            let mut deployment = Deployment::open(dir.path()).expect("open");
            deployment.marks.add(2, "interesting");
            deployment.set_adjustments(
                "cam_port",
                ImageAdjustments {
                    enabled: true,
                    brightness: 40,
                    contrast: 10.0,
                },
            );
            deployment.save_sidecars().expect("save");
        }

        let deployment = Deployment::open(dir.path()).expect("reopen");
        assert_eq!(deployment.marks.get(2), Some("interesting"));
        assert!(deployment.adjustments_for("cam_port").enabled);
        assert!(!deployment.adjustments_for("cam_stbd").enabled);
    }
}
