//! Deployment sensor log: attitude records and system voltages.
//!
//! Attitude rows are keyed by frame number so the viewer can show the
//! depth/pitch/roll/yaw readout for whatever frame is on screen. Voltage
//! rows are free-running time series used only by the plot windows. Sensor
//! fields routinely contain garbage from a flaky serial line; unparseable
//! floats become NaN and render as a `--.-` placeholder, never an error.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use log::{info, warn};

pub const ATTITUDE_FILE: &str = "attitude.csv";
pub const VOLTAGE_FILE: &str = "voltage.csv";

const TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.3f", "%Y-%m-%d %H:%M:%S"];

#[derive(Clone, Debug, PartialEq)]
pub struct Attitude {
    pub time: Option<NaiveDateTime>,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub temperature: f64,
    pub depth: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoltageSample {
    pub source: String,
    pub time: Option<NaiveDateTime>,
    pub volts: f64,
    pub temperature: f64,
}

#[derive(Clone, Debug, Default)]
pub struct SensorLog {
    attitude: BTreeMap<i64, Attitude>,
    voltages: Vec<VoltageSample>,
}

impl SensorLog {
    /// Load `attitude.csv` / `voltage.csv` from the deployment root.
    /// Missing files yield an empty log; a deployment without sensor data is
    /// perfectly reviewable.
    pub fn load(root: &Path) -> Result<Self> {
        let mut log = Self::default();

        let attitude_path = root.join(ATTITUDE_FILE);
        if attitude_path.exists() {
            log.read_attitude(&attitude_path)?;
        }
        let voltage_path = root.join(VOLTAGE_FILE);
        if voltage_path.exists() {
            log.read_voltage(&voltage_path)?;
        }

        info!(
            "sensor log: {} attitude records, {} voltage samples",
            log.attitude.len(),
            log.voltages.len()
        );
        Ok(log)
    }

    fn read_attitude(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut reader = csv::Reader::from_reader(file);
        for record in reader.records() {
            let record = record?;
            let Some(frame) = record.get(0).and_then(|f| f.parse::<i64>().ok()) else {
                warn!("attitude row without frame number, skipping");
                continue;
            };
            self.attitude.insert(
                frame,
                Attitude {
                    time: record.get(1).and_then(parse_time),
                    yaw: to_float(record.get(2)),
                    pitch: to_float(record.get(3)),
                    roll: to_float(record.get(4)),
                    temperature: to_float(record.get(5)),
                    depth: to_float(record.get(6)),
                },
            );
        }
        Ok(())
    }

    fn read_voltage(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut reader = csv::Reader::from_reader(file);
        for record in reader.records() {
            let record = record?;
            let Some(source) = record.get(0).filter(|s| !s.is_empty()) else {
                continue;
            };
            self.voltages.push(VoltageSample {
                source: source.to_string(),
                time: record.get(1).and_then(parse_time),
                volts: to_float(record.get(2)),
                temperature: to_float(record.get(3)),
            });
        }
        Ok(())
    }

    pub fn attitude(&self, frame: i64) -> Option<&Attitude> {
        self.attitude.get(&frame)
    }

    pub fn has_attitude(&self) -> bool {
        !self.attitude.is_empty()
    }

    pub fn has_voltages(&self) -> bool {
        !self.voltages.is_empty()
    }

    /// Depth-vs-time points for the profile plot, seconds since the first
    /// record on the x axis.
    pub fn depth_profile(&self) -> Vec<[f64; 2]> {
        self.timed_attitude(|a| a.depth)
    }

    /// Water-temperature-vs-time points aligned with `depth_profile`.
    pub fn temperature_profile(&self) -> Vec<[f64; 2]> {
        self.timed_attitude(|a| a.temperature)
    }

    fn timed_attitude(&self, field: impl Fn(&Attitude) -> f64) -> Vec<[f64; 2]> {
        let Some(epoch) = self.first_time() else {
            return Vec::new();
        };
        self.attitude
            .values()
            .filter_map(|a| {
                let t = a.time?;
                let value = field(a);
                value.is_finite().then(|| {
                    [(t - epoch).num_milliseconds() as f64 / 1000.0, value]
                })
            })
            .collect()
    }

    /// Voltage series per source (battery, cameras) relative to the first
    /// attitude/voltage timestamp.
    pub fn voltage_series(&self) -> BTreeMap<String, Vec<[f64; 2]>> {
        self.voltage_field_series(|v| v.volts)
    }

    pub fn voltage_temperature_series(&self) -> BTreeMap<String, Vec<[f64; 2]>> {
        self.voltage_field_series(|v| v.temperature)
    }

    fn voltage_field_series(
        &self,
        field: impl Fn(&VoltageSample) -> f64,
    ) -> BTreeMap<String, Vec<[f64; 2]>> {
        let Some(epoch) = self.first_time() else {
            return BTreeMap::new();
        };
        let mut series: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
        for sample in &self.voltages {
            let Some(t) = sample.time else { continue };
            let value = field(sample);
            if !value.is_finite() {
                continue;
            }
            series
                .entry(sample.source.clone())
                .or_default()
                .push([(t - epoch).num_milliseconds() as f64 / 1000.0, value]);
        }
        series
    }

    fn first_time(&self) -> Option<NaiveDateTime> {
        let attitude = self.attitude.values().filter_map(|a| a.time).min();
        let voltage = self.voltages.iter().filter_map(|v| v.time).min();
        match (attitude, voltage) {
            (Some(a), Some(v)) => Some(a.min(v)),
            (a, v) => a.or(v),
        }
    }

    /// Export both logs as CSV next to `basename` (`<basename>_attitude.csv`
    /// and `<basename>_voltage.csv`).
    pub fn export_csv(&self, basename: &Path) -> Result<()> {
        let attitude_path = sibling(basename, "_attitude.csv");
        let mut writer = csv::Writer::from_path(&attitude_path)
            .with_context(|| format!("creating {}", attitude_path.display()))?;
        writer.write_record(["frame", "time", "yaw", "pitch", "roll", "temperature", "depth"])?;
        for (frame, a) in &self.attitude {
            writer.write_record([
                frame.to_string(),
                fmt_time(a.time),
                a.yaw.to_string(),
                a.pitch.to_string(),
                a.roll.to_string(),
                a.temperature.to_string(),
                a.depth.to_string(),
            ])?;
        }
        writer.flush()?;

        let voltage_path = sibling(basename, "_voltage.csv");
        let mut writer = csv::Writer::from_path(&voltage_path)
            .with_context(|| format!("creating {}", voltage_path.display()))?;
        writer.write_record(["source", "time", "volts", "temperature"])?;
        for v in &self.voltages {
            writer.write_record([
                v.source.clone(),
                fmt_time(v.time),
                v.volts.to_string(),
                v.temperature.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn sibling(basename: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = basename.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    basename.with_file_name(name)
}

fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn fmt_time(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_default()
}

fn to_float(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Format a sensor value for the readout labels, `--.-` when unavailable.
pub fn fmt_reading(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}")
    } else {
        "--.-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_logs(dir: &Path) {
        fs::write(
            dir.join(ATTITUDE_FILE),
            "frame,time,yaw,pitch,roll,temperature,depth\n\
             1,2024-06-07 14:25:28.000,182.1,-3.2,1.1,7.9,45.2\n\
             2,2024-06-07 14:25:29.000,183.0,bogus,1.0,7.9,45.9\n",
        )
        .expect("attitude");
        fs::write(
            dir.join(VOLTAGE_FILE),
            "source,time,volts,temperature\n\
             system,2024-06-07 14:25:28.000,14.8,21.0\n\
             cam_left,2024-06-07 14:25:28.500,12.1,30.5\n\
             system,2024-06-07 14:25:38.000,14.7,21.2\n",
        )
        .expect("voltage");
    }

    #[test]
    fn loads_and_indexes_by_frame() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_logs(dir.path());

        let log = SensorLog::load(dir.path()).expect("load");
        let a = log.attitude(1).expect("frame 1");
        assert_eq!(a.depth, 45.2);
        assert!(log.attitude(3).is_none());
    }

    #[test]
    fn malformed_float_becomes_placeholder() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_logs(dir.path());

        let log = SensorLog::load(dir.path()).expect("load");
        let a = log.attitude(2).expect("frame 2");
        assert!(a.pitch.is_nan());
        assert_eq!(fmt_reading(a.pitch), "--.-");
        assert_eq!(fmt_reading(a.depth), "45.9");
    }

    #[test]
    fn missing_files_yield_empty_log() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = SensorLog::load(dir.path()).expect("load");
        assert!(!log.has_attitude());
        assert!(!log.has_voltages());
        assert!(log.depth_profile().is_empty());
    }

    #[test]
    fn series_are_relative_to_first_timestamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_logs(dir.path());

        let log = SensorLog::load(dir.path()).expect("load");
        let depth = log.depth_profile();
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0], [0.0, 45.2]);
        assert_eq!(depth[1], [1.0, 45.9]);

        let volts = log.voltage_series();
        assert_eq!(volts.len(), 2);
        assert_eq!(volts["system"].len(), 2);
        assert_eq!(volts["system"][1][0], 10.0);
    }

    #[test]
    fn export_writes_both_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_logs(dir.path());
        let log = SensorLog::load(dir.path()).expect("load");

        let out = tempfile::tempdir().expect("outdir");
        let base = out.path().join("dep01");
        log.export_csv(&base).expect("export");

        let attitude = fs::read_to_string(out.path().join("dep01_attitude.csv")).expect("read");
        assert!(attitude.starts_with("frame,time,yaw"));
        assert_eq!(attitude.lines().count(), 3);
        assert!(out.path().join("dep01_voltage.csv").exists());
    }
}
