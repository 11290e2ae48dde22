//! Frame marks (bookmarks) with descriptions and slider navigation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

/// Description used when a frame is shift-marked for calibration export.
pub const CALIBRATION_MARK: &str = "Selected for Calibration";

/// Marks keyed by frame number. Ordering matters for next/previous
/// navigation, so this stays a BTreeMap.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MarkSet {
    marks: BTreeMap<i64, String>,
}

impl MarkSet {
    /// Insert or replace the mark at `frame`.
    pub fn add(&mut self, frame: i64, description: impl Into<String>) {
        self.marks.insert(frame, description.into());
    }

    /// Remove the mark at `frame`. Missing marks are ignored.
    pub fn remove(&mut self, frame: i64) {
        self.marks.remove(&frame);
    }

    pub fn get(&self, frame: i64) -> Option<&str> {
        self.marks.get(&frame).map(String::as_str)
    }

    pub fn contains(&self, frame: i64) -> bool {
        self.marks.contains_key(&frame)
    }

    /// First mark strictly after `frame`, no wrapping.
    pub fn next_after(&self, frame: i64) -> Option<(i64, &str)> {
        self.marks
            .range(frame + 1..)
            .next()
            .map(|(f, d)| (*f, d.as_str()))
    }

    /// Last mark strictly before `frame`, no wrapping.
    pub fn prev_before(&self, frame: i64) -> Option<(i64, &str)> {
        self.marks
            .range(..frame)
            .next_back()
            .map(|(f, d)| (*f, d.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.marks.iter().map(|(f, d)| (*f, d.as_str()))
    }

    pub fn frames(&self) -> impl Iterator<Item = i64> + '_ {
        self.marks.keys().copied()
    }

    /// Drop marks outside `[start, end]`; used after a deployment trim.
    pub fn retain_range(&mut self, start: i64, end: i64) {
        self.marks.retain(|frame, _| (start..=end).contains(frame));
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MarkSet {
        let mut marks = MarkSet::default();
        marks.add(10, "fish school");
        marks.add(50, CALIBRATION_MARK);
        marks.add(90, "net contact");
        marks
    }

    #[test]
    fn navigation_finds_strict_neighbors() {
        let marks = sample();
        assert_eq!(marks.next_after(10), Some((50, CALIBRATION_MARK)));
        assert_eq!(marks.prev_before(50), Some((10, "fish school")));
        // Between marks.
        assert_eq!(marks.next_after(30), Some((50, CALIBRATION_MARK)));
        assert_eq!(marks.prev_before(30), Some((10, "fish school")));
        // No wrapping off either end.
        assert_eq!(marks.next_after(90), None);
        assert_eq!(marks.prev_before(10), None);
    }

    #[test]
    fn add_overwrites_and_remove_is_silent() {
        let mut marks = sample();
        marks.add(10, "updated");
        assert_eq!(marks.get(10), Some("updated"));
        assert_eq!(marks.len(), 3);

        marks.remove(999);
        marks.remove(10);
        assert!(!marks.contains(10));
    }

    #[test]
    fn retain_range_drops_trimmed_marks() {
        let mut marks = sample();
        marks.retain_range(20, 60);
        assert_eq!(marks.frames().collect::<Vec<_>>(), vec![50]);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("marks.json");
        let marks = sample();
        marks.save(&path).expect("save");
        assert_eq!(MarkSet::load(&path).expect("load"), marks);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let marks = MarkSet::load(Path::new("/no/such/marks.json")).expect("load");
        assert!(marks.is_empty());
    }
}
