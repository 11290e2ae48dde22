//! Per-channel image viewer with HUD text overlays.
//!
//! Each camera channel owns one viewer. The viewer decodes the image on the
//! calling thread (the drain tick accepts the hitch), uploads it as an egui
//! texture, and paints keyed HUD labels over it. Unreadable files fail closed:
//! the channel is cleared and a warning is logged.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, TextureHandle, TextureOptions, Ui, Vec2};
use indexmap::IndexMap;
use log::warn;

use crate::deployment::ImageAdjustments;

/// HUD keys the drain path refreshes on every displayed frame.
pub const HUD_CAMERA: &str = "camera";
pub const HUD_TIMESTAMP: &str = "timestamp";
pub const HUD_FRAME: &str = "frame";
pub const HUD_ENHANCE: &str = "enhance";

/// Standard HUD text color matching the deployment overlays.
pub const HUD_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 250, 0, 150);

/// One keyed text overlay, positioned in relative viewer coordinates.
#[derive(Clone, Debug)]
pub struct HudItem {
    pub text: String,
    /// Relative position inside the viewer, 0.0..=1.0 on both axes.
    pub pos: Vec2,
    pub anchor: Align2,
    pub color: Color32,
}

pub struct ImageViewer {
    /// Texture name, also shown as the camera label.
    name: String,
    texture: Option<TextureHandle>,
    current_path: Option<PathBuf>,
    hud: IndexMap<String, HudItem>,
    pub adjustments: ImageAdjustments,
}

impl ImageViewer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: None,
            current_path: None,
            hud: IndexMap::new(),
            adjustments: ImageAdjustments::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn has_image(&self) -> bool {
        self.texture.is_some()
    }

    /// Decode `path`, apply the channel's adjustments, and upload the texture.
    pub fn set_image_from_file(&mut self, ctx: &egui::Context, path: &Path) -> Result<()> {
        let image = load_adjusted(path, &self.adjustments)?;
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        self.texture = Some(ctx.load_texture(&self.name, color_image, TextureOptions::LINEAR));
        self.current_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Like `set_image_from_file` but failing closed: errors clear the
    /// channel instead of propagating.
    pub fn set_image_or_clear(&mut self, ctx: &egui::Context, path: &Path) {
        if let Err(e) = self.set_image_from_file(ctx, path) {
            warn!("{}: failed to load {}: {:#}", self.name, path.display(), e);
            self.clear();
        }
    }

    /// Drop the displayed image. HUD items are kept; the drain path rewrites
    /// the per-frame ones and the camera label outlives individual frames.
    pub fn clear(&mut self) {
        self.texture = None;
        self.current_path = None;
    }

    pub fn set_hud_text(
        &mut self,
        key: &str,
        text: impl Into<String>,
        pos: Vec2,
        anchor: Align2,
        color: Color32,
    ) {
        self.hud.insert(
            key.to_string(),
            HudItem {
                text: text.into(),
                pos,
                anchor,
                color,
            },
        );
    }

    pub fn remove_hud_item(&mut self, key: &str) {
        self.hud.shift_remove(key);
    }

    pub fn remove_all_hud_items(&mut self) {
        self.hud.clear();
    }

    pub fn hud_text(&self, key: &str) -> Option<&str> {
        self.hud.get(key).map(|item| item.text.as_str())
    }

    /// Render the image letterboxed into the available space plus the HUD.
    pub fn show(&mut self, ui: &mut Ui) {
        let rect = ui.available_rect_before_wrap();
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(12));

        if let Some(texture) = &self.texture {
            let fitted = fit_rect(texture.size_vec2(), rect);
            painter.image(
                texture.id(),
                fitted,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        for item in self.hud.values() {
            let pos = Pos2::new(
                rect.min.x + item.pos.x * rect.width(),
                rect.min.y + item.pos.y * rect.height(),
            );
            painter.text(pos, item.anchor, &item.text, FontId::proportional(13.0), item.color);
        }

        ui.allocate_rect(rect, egui::Sense::hover());
    }
}

/// Scale `image_size` to fit `avail` preserving aspect, centered.
fn fit_rect(image_size: Vec2, avail: Rect) -> Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return avail;
    }
    let scale = (avail.width() / image_size.x).min(avail.height() / image_size.y);
    let size = image_size * scale;
    Rect::from_center_size(avail.center(), size)
}

fn load_adjusted(path: &Path, adjustments: &ImageAdjustments) -> Result<image::RgbaImage> {
    let mut image = image::open(path)
        .with_context(|| format!("reading image {}", path.display()))?;
    if adjustments.enabled {
        image = image
            .brighten(adjustments.brightness)
            .adjust_contrast(adjustments.contrast);
    }
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_preserves_aspect_and_centers() {
        let avail = Rect::from_min_max(Pos2::ZERO, Pos2::new(200.0, 100.0));
        let fitted = fit_rect(Vec2::new(400.0, 400.0), avail);
        assert_eq!(fitted.height(), 100.0);
        assert_eq!(fitted.width(), 100.0);
        assert_eq!(fitted.center(), avail.center());
    }

    #[test]
    fn hud_items_overwrite_by_key() {
        let mut viewer = ImageViewer::new("left");
        viewer.set_hud_text(HUD_FRAME, "Frame: 1", Vec2::new(0.02, 0.99), Align2::LEFT_BOTTOM, HUD_COLOR);
        viewer.set_hud_text(HUD_FRAME, "Frame: 2", Vec2::new(0.02, 0.99), Align2::LEFT_BOTTOM, HUD_COLOR);
        assert_eq!(viewer.hud_text(HUD_FRAME), Some("Frame: 2"));

        viewer.remove_hud_item(HUD_FRAME);
        assert_eq!(viewer.hud_text(HUD_FRAME), None);
        // Removing twice is fine.
        viewer.remove_hud_item(HUD_FRAME);
    }

    #[test]
    fn unreadable_file_fails_closed() {
        let mut viewer = ImageViewer::new("left");
        let ctx = egui::Context::default();
        viewer.set_image_or_clear(&ctx, Path::new("/nonexistent/frame.jpg"));
        assert!(!viewer.has_image());
        assert!(viewer.current_path().is_none());
    }
}
