//! Image tree scanning and filename parsing.
//!
//! Deployments store images as `images/<camera>/<frame>_<YYYYMMDD>-<HHMMSS>.<mmm>.<ext>`.
//! The frame number is the global sequencing key across cameras; the embedded
//! timestamp is UTC acquisition time. Older packages wrote bare `<frame>.<ext>`
//! names, so the timestamp is optional.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

/// Extensions recognized as deployment imagery, tried in scan order.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff"];

static STEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:_(\d{8})-(\d{6})\.(\d{3}))?$").expect("stem regex"));

/// One image file on one camera.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageEntry {
    pub frame: i64,
    pub path: PathBuf,
    pub timestamp: Option<NaiveDateTime>,
}

/// All images of a single camera, keyed by frame number.
#[derive(Clone, Debug, Default)]
pub struct CameraIndex {
    pub name: String,
    images: BTreeMap<i64, ImageEntry>,
}

impl CameraIndex {
    pub fn entry(&self, frame: i64) -> Option<&ImageEntry> {
        self.images.get(&frame)
    }

    pub fn frames(&self) -> impl Iterator<Item = i64> + '_ {
        self.images.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn remove(&mut self, frame: i64) -> Option<ImageEntry> {
        self.images.remove(&frame)
    }
}

/// Parse an image file stem into (frame number, optional timestamp).
/// Returns None for files that are not deployment imagery.
pub fn parse_image_stem(stem: &str) -> Option<(i64, Option<NaiveDateTime>)> {
    let caps = STEM_RE.captures(stem)?;
    let frame: i64 = caps.get(1)?.as_str().parse().ok()?;

    let timestamp = match (caps.get(2), caps.get(3), caps.get(4)) {
        (Some(date), Some(time), Some(millis)) => {
            let raw = format!("{}-{}.{}", date.as_str(), time.as_str(), millis.as_str());
            NaiveDateTime::parse_from_str(&raw, "%Y%m%d-%H%M%S%.3f").ok()
        }
        _ => None,
    };
    Some((frame, timestamp))
}

/// Scan one camera directory into a frame-keyed index.
pub fn scan_camera_dir(dir: &Path) -> Result<CameraIndex> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_default();
    let mut index = CameraIndex {
        name,
        images: BTreeMap::new(),
    };

    for ext in IMAGE_EXTENSIONS {
        let pattern = dir.join(format!("*.{ext}"));
        let pattern = pattern.to_string_lossy();
        for path in glob::glob(&pattern)
            .with_context(|| format!("bad glob pattern {pattern}"))?
            .flatten()
        {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some((frame, timestamp)) = parse_image_stem(stem) else {
                debug!("skipping non-imagery file {}", path.display());
                continue;
            };
            index.images.insert(
                frame,
                ImageEntry {
                    frame,
                    path,
                    timestamp,
                },
            );
        }
    }

    info!("camera {}: {} images", index.name, index.len());
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use std::fs;

    #[test]
    fn parses_frame_and_timestamp() {
        let (frame, ts) = parse_image_stem("01234_20240607-142530.250").expect("parse");
        assert_eq!(frame, 1234);
        let ts = ts.expect("timestamp");
        assert_eq!(
            ts.date(),
            NaiveDate::from_ymd_opt(2024, 6, 7).expect("date")
        );
        assert_eq!(ts.hour(), 14);
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn parses_bare_frame_number() {
        let (frame, ts) = parse_image_stem("42").expect("parse");
        assert_eq!(frame, 42);
        assert!(ts.is_none());
    }

    #[test]
    fn rejects_non_imagery_names() {
        assert!(parse_image_stem("thumbs").is_none());
        assert!(parse_image_stem("12_badstamp").is_none());
        assert!(parse_image_stem("").is_none());
    }

    #[test]
    fn scans_directory_into_frame_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            "00003_20240607-142530.000.jpg",
            "00001_20240607-142528.000.jpg",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), b"x").expect("write");
        }

        let index = scan_camera_dir(dir.path()).expect("scan");
        assert_eq!(index.len(), 2);
        assert_eq!(index.frames().collect::<Vec<_>>(), vec![1, 3]);
        assert!(index.entry(1).is_some());
        assert!(index.entry(2).is_none());
    }
}
