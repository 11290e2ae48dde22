//! Export operations: displayed images, calibration sets, metadata CSV.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use log::{info, warn};

use crate::deployment::{Deployment, ImageAdjustments};
use crate::events::AppEvent;

use super::TrawlViewApp;

impl TrawlViewApp {
    /// Export the currently displayed left/right images into a user-picked
    /// directory, keeping their source file names. Channel adjustments are
    /// baked into the exported copies.
    pub fn export_current_images(&mut self) {
        let Some(dir) = self.pick_export_dir("Select Export Location") else {
            return;
        };

        let mut copied = 0usize;
        for (path, adjustments) in [
            (self.left_view.current_path(), self.left_view.adjustments),
            (self.right_view.current_path(), self.right_view.adjustments),
        ] {
            let Some(path) = path else { continue };
            let result = path
                .file_name()
                .context("source image has no file name")
                .and_then(|name| write_image(path, &dir.join(name), Some(&adjustments)));
            match result {
                Ok(()) => copied += 1,
                Err(e) => warn!("image export failed: {:#}", e),
            }
        }
        self.status = format!("Exported {copied} images to {}.", dir.display());
    }

    /// Export attitude/voltage logs and marks as CSV files named after the
    /// deployment.
    pub fn export_metadata(&mut self) {
        let Some(dir) = self.pick_export_dir("Select Export Directory") else {
            return;
        };
        let Some(deployment) = &self.deployment else {
            return;
        };

        self.status = "Exporting metadata...".to_string();
        let base = dir.join(deployment.name());
        let result = deployment
            .sensors
            .export_csv(&base)
            .and_then(|()| export_marks_csv(deployment, &base));
        match result {
            Ok(()) => self.status = "Metadata export files created.".to_string(),
            Err(e) => {
                warn!("metadata export failed: {:#}", e);
                self.status = format!("Error exporting deployment metadata: {e}");
            }
        }
    }

    /// Entry point for the Export-for-Cal button: confirm intent first, and
    /// again if a previous export would be replaced.
    pub fn request_cal_export(&mut self) {
        self.confirm.ask(
            "Export for Calibration",
            "Export for calibration saves copies of all marked image pairs with \
             simplified names into 'images/ExportForCal' inside this deployment. \
             Do you want to export your marked files?",
            AppEvent::ExportForCalConfirmed,
        );
    }

    pub(super) fn export_for_cal(&mut self) {
        let Some(deployment) = &self.deployment else {
            return;
        };
        if deployment.cal_export_dir().is_dir() {
            self.confirm.ask(
                "Export Directory Exists",
                "A calibration export directory already exists. Do you want to \
                 replace it? All existing images will be deleted!",
                AppEvent::ReplaceCalExportConfirmed,
            );
            return;
        }
        self.run_cal_export();
    }

    pub(super) fn replace_cal_export(&mut self) {
        if let Some(deployment) = &self.deployment {
            let dir = deployment.cal_export_dir();
            if let Err(e) = fs::remove_dir_all(&dir) {
                warn!("failed to delete {}: {:#}", dir.display(), e);
                self.status = "Unable to delete existing export directory. Export aborted.".to_string();
                return;
            }
        }
        self.run_cal_export();
    }

    fn run_cal_export(&mut self) {
        let Some(deployment) = &self.deployment else {
            return;
        };
        let (Some(left), Some(right)) = (self.left_camera.clone(), self.right_camera.clone())
        else {
            return;
        };

        let enhance = self.settings.enhance_cal_export;
        let left_adjustments = self.left_view.adjustments;
        let right_adjustments = self.right_view.adjustments;

        match cal_export(
            deployment,
            &left,
            &right,
            enhance.then_some((left_adjustments, right_adjustments)),
        ) {
            Ok(count) => {
                info!("calibration export wrote {count} image pairs");
                self.status = format!("Export complete: {count} marked frames.");
            }
            Err(e) => {
                warn!("calibration export failed: {:#}", e);
                self.status = format!("Export aborted due to error: {e}");
            }
        }
    }

    fn pick_export_dir(&mut self, title: &str) -> Option<PathBuf> {
        let dir = rfd::FileDialog::new()
            .set_title(title)
            .set_directory(&self.settings.copy_dir)
            .pick_folder()?;
        self.settings.copy_dir = dir.clone();
        Some(dir)
    }
}

fn export_marks_csv(deployment: &Deployment, basename: &Path) -> Result<()> {
    let mut name = basename.file_name().unwrap_or_default().to_os_string();
    name.push("_marks.csv");
    let path = basename.with_file_name(name);

    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["frame", "description"])?;
    for (frame, description) in deployment.marks.iter() {
        writer.write_record([frame.to_string(), description.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Copy every marked frame pair into the deployment's calibration export
/// directory as `L<n>`/`R<n>`. With adjustments supplied, images are decoded,
/// adjusted and re-encoded instead of byte-copied. Returns the pair count.
fn cal_export(
    deployment: &Deployment,
    left_camera: &str,
    right_camera: &str,
    adjustments: Option<(ImageAdjustments, ImageAdjustments)>,
) -> Result<usize> {
    let export_dir = deployment.cal_export_dir();
    fs::create_dir_all(&export_dir)
        .with_context(|| format!("creating {}", export_dir.display()))?;

    let mut count = 0usize;
    for frame in deployment.marks.frames() {
        let (Some(left), Some(right)) = (
            deployment.resolve(left_camera, frame),
            deployment.resolve(right_camera, frame),
        ) else {
            warn!("frame {frame} is marked but missing on one camera, skipping");
            continue;
        };

        count += 1;
        let (left_adj, right_adj) = match &adjustments {
            Some((l, r)) => (Some(l), Some(r)),
            None => (None, None),
        };
        write_image(&left, &cal_dest(&export_dir, &left, &format!("L{count}"))?, left_adj)?;
        write_image(&right, &cal_dest(&export_dir, &right, &format!("R{count}"))?, right_adj)?;
    }
    Ok(count)
}

fn cal_dest(export_dir: &Path, source: &Path, stem: &str) -> Result<PathBuf> {
    let Some(ext) = source.extension().and_then(|e| e.to_str()) else {
        bail!("{} has no extension", source.display());
    };
    Ok(export_dir.join(format!("{stem}.{ext}")))
}

/// Write `source` to `dest`, decoding and re-encoding only when enabled
/// adjustments have to be baked in; otherwise a plain byte copy.
fn write_image(source: &Path, dest: &Path, adjustments: Option<&ImageAdjustments>) -> Result<()> {
    match adjustments {
        Some(adjustments) if adjustments.enabled => {
            let mut image = image::open(source)
                .with_context(|| format!("reading {}", source.display()))?;
            image = image
                .brighten(adjustments.brightness)
                .adjust_contrast(adjustments.contrast);
            image
                .save(dest)
                .with_context(|| format!("writing {}", dest.display()))?;
        }
        _ => {
            fs::copy(source, dest)
                .with_context(|| format!("copying {}", source.display()))?;
        }
    }
    Ok(())
}
