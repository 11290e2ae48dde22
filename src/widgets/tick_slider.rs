//! Scrub slider with named, colored tick marks.
//!
//! The slider knows nothing about what a tick means; marks, trim bounds and
//! export bounds all reuse the same primitive and are distinguished only by
//! the name and color their owners choose. Tick names are unique per slider;
//! adding a tick under an existing name replaces it.

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Response, Sense, Ui, Vec2};
use indexmap::IndexMap;

/// Frames moved by a left/right arrow press.
pub const ARROW_STEP: i64 = 1;
/// Frames moved by an up/down arrow press. Intentionally not the page step:
/// the arrows give an order-of-magnitude jump for coarse navigation.
pub const ARROW_JUMP: i64 = 10;

/// Width of the drag handle in pixels. Tick positions are corrected by this
/// amount so marks line up with where the handle actually sits at that value.
const HANDLE_THICKNESS: f32 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A named annotation on the slider track.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub position: i64,
    pub padding: f32,
    pub color: [u8; 3],
    pub thickness: f32,
    pub alpha: u8,
}

/// Configuration for the slider widget rendering
#[derive(Clone, Debug)]
pub struct TickSliderConfig {
    pub height: f32,
    pub show_labels: bool,
    pub label_font: FontId,
}

impl Default for TickSliderConfig {
    fn default() -> Self {
        Self {
            height: 28.0,
            show_labels: true,
            label_font: FontId::proportional(10.0),
        }
    }
}

/// Scrub control over an inclusive integer range with tick annotations.
pub struct TickSlider {
    value: i64,
    min: i64,
    max: i64,
    single_step: i64,
    page_step: i64,
    orientation: Orientation,
    ticks: IndexMap<String, Tick>,
    enabled: bool,
}

impl Default for TickSlider {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl TickSlider {
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            value: min,
            min,
            max: max.max(min),
            single_step: 1,
            page_step: 10,
            orientation: Orientation::Horizontal,
            ticks: IndexMap::new(),
            enabled: true,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn minimum(&self) -> i64 {
        self.min
    }

    pub fn maximum(&self) -> i64 {
        self.max
    }

    pub fn set_range(&mut self, min: i64, max: i64) {
        self.min = min;
        self.max = max.max(min);
        self.value = self.value.clamp(self.min, self.max);
    }

    pub fn set_single_step(&mut self, step: i64) {
        self.single_step = step.max(1);
    }

    pub fn set_page_step(&mut self, step: i64) {
        self.page_step = step.max(1);
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Clamp `v` to the slider range and adopt it.
    /// Returns true exactly when the value actually changed, so callers get
    /// at most one change notification per distinct value.
    pub fn set_value(&mut self, v: i64) -> bool {
        let clamped = v.clamp(self.min, self.max);
        if clamped == self.value {
            return false;
        }
        self.value = clamped;
        true
    }

    /// Move by `count` single steps (negative moves left), clamped to range.
    pub fn step(&mut self, count: i64) -> bool {
        self.set_value(self.value + count * self.single_step)
    }

    /// Move by `count` page steps, clamped to range.
    pub fn page(&mut self, count: i64) -> bool {
        self.set_value(self.value + count * self.page_step)
    }

    /// Insert or silently replace the tick keyed by `name`.
    pub fn add_tick(
        &mut self,
        name: &str,
        position: i64,
        padding: f32,
        color: [u8; 3],
        thickness: f32,
        alpha: u8,
    ) {
        self.ticks.insert(
            name.to_string(),
            Tick {
                position,
                padding: padding / 2.0,
                color,
                thickness,
                alpha,
            },
        );
    }

    /// Remove the named tick. Silently ignores ticks that don't exist.
    pub fn remove_tick(&mut self, name: &str) {
        self.ticks.shift_remove(name);
    }

    pub fn remove_all_ticks(&mut self) {
        self.ticks.clear();
    }

    pub fn tick(&self, name: &str) -> Option<&Tick> {
        self.ticks.get(name)
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    /// Fractional position of a frame along the track.
    fn fraction(&self, position: i64) -> f32 {
        let span = (self.max - self.min + 1) as f32;
        (position - self.min) as f32 / span
    }

    /// Pixel offset along the primary axis for a frame position, corrected
    /// for the handle width so marks align with the handle center.
    fn position_to_px(&self, position: i64, axis_extent: f32) -> f32 {
        let pct = self.fraction(position);
        pct * axis_extent - (pct - 0.5) * HANDLE_THICKNESS
    }

    fn px_to_value(&self, offset: f32, axis_extent: f32) -> i64 {
        let span = (self.max - self.min + 1) as f32;
        let ratio = (offset / axis_extent).clamp(0.0, 1.0);
        (self.min + (ratio * span) as i64).min(self.max)
    }

    /// Render the slider and handle click/drag interaction.
    /// Returns Some(new_value) when the user moved the slider.
    pub fn show(&mut self, ui: &mut Ui, config: &TickSliderConfig) -> Option<i64> {
        let desired_size = match self.orientation {
            Orientation::Horizontal => Vec2::new(ui.available_width(), config.height),
            Orientation::Vertical => Vec2::new(config.height, ui.available_height()),
        };
        let (rect, response) = ui.allocate_exact_size(
            desired_size,
            if self.enabled {
                Sense::click_and_drag()
            } else {
                Sense::hover()
            },
        );

        if ui.is_rect_visible(rect) {
            self.paint(ui, rect, config);
        }

        if !self.enabled {
            return None;
        }
        self.handle_interaction(&response, rect)
    }

    fn paint(&self, ui: &Ui, rect: Rect, config: &TickSliderConfig) {
        let painter = ui.painter();
        let visuals = ui.visuals();

        // Groove along the primary axis
        let groove_color = visuals.widgets.inactive.bg_fill;
        let groove = match self.orientation {
            Orientation::Horizontal => Rect::from_min_max(
                Pos2::new(rect.min.x, rect.center().y - 2.0),
                Pos2::new(rect.max.x, rect.center().y + 2.0),
            ),
            Orientation::Vertical => Rect::from_min_max(
                Pos2::new(rect.center().x - 2.0, rect.min.y),
                Pos2::new(rect.center().x + 2.0, rect.max.y),
            ),
        };
        painter.rect_filled(groove, 2.0, groove_color);

        for (name, tick) in &self.ticks {
            self.paint_tick(painter, rect, name, tick, config);
        }

        self.paint_handle(painter, rect);
    }

    fn paint_tick(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        name: &str,
        tick: &Tick,
        config: &TickSliderConfig,
    ) {
        let color = Color32::from_rgba_unmultiplied(
            tick.color[0],
            tick.color[1],
            tick.color[2],
            tick.alpha,
        );
        let stroke = (tick.thickness, color);

        match self.orientation {
            Orientation::Horizontal => {
                let x = rect.min.x + self.position_to_px(tick.position, rect.width());
                // With labels on, the mark occupies the lower half and the
                // label sits in the band above it.
                let y1 = if config.show_labels {
                    rect.min.y + rect.height() / 2.0
                } else {
                    rect.min.y + tick.padding
                };
                let y2 = rect.max.y - tick.padding - 1.0;
                painter.line_segment([Pos2::new(x, y1), Pos2::new(x, y2)], stroke);

                if config.show_labels {
                    painter.text(
                        Pos2::new(x, rect.min.y),
                        Align2::CENTER_TOP,
                        name,
                        config.label_font.clone(),
                        color,
                    );
                }
            }
            Orientation::Vertical => {
                let y = rect.min.y + self.position_to_px(tick.position, rect.height());
                let x1 = if config.show_labels {
                    rect.min.x + rect.width() / 2.0
                } else {
                    rect.min.x + tick.padding
                };
                let x2 = rect.max.x - tick.padding - 1.0;
                painter.line_segment([Pos2::new(x1, y), Pos2::new(x2, y)], stroke);

                if config.show_labels {
                    painter.text(
                        Pos2::new(rect.min.x, y),
                        Align2::LEFT_CENTER,
                        name,
                        config.label_font.clone(),
                        color,
                    );
                }
            }
        }
    }

    fn paint_handle(&self, painter: &egui::Painter, rect: Rect) {
        let color = if self.enabled {
            Color32::from_rgb(255, 220, 100)
        } else {
            Color32::from_gray(110)
        };
        match self.orientation {
            Orientation::Horizontal => {
                let x = rect.min.x + self.position_to_px(self.value, rect.width());
                let handle = Rect::from_center_size(
                    Pos2::new(x, rect.center().y),
                    Vec2::new(HANDLE_THICKNESS / 2.0, rect.height() * 0.7),
                );
                painter.rect_filled(handle, 2.0, color);
            }
            Orientation::Vertical => {
                let y = rect.min.y + self.position_to_px(self.value, rect.height());
                let handle = Rect::from_center_size(
                    Pos2::new(rect.center().x, y),
                    Vec2::new(rect.width() * 0.7, HANDLE_THICKNESS / 2.0),
                );
                painter.rect_filled(handle, 2.0, color);
            }
        }
    }

    fn handle_interaction(&mut self, response: &Response, rect: Rect) -> Option<i64> {
        if response.dragged() || response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let new_value = match self.orientation {
                    Orientation::Horizontal => self.px_to_value(pos.x - rect.min.x, rect.width()),
                    Orientation::Vertical => self.px_to_value(pos.y - rect.min.y, rect.height()),
                };
                if self.set_value(new_value) {
                    return Some(self.value);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_value_clamps_to_range() {
        let mut slider = TickSlider::new(0, 99);
        assert!(slider.set_value(150));
        assert_eq!(slider.value(), 99);
        assert!(slider.set_value(-5));
        assert_eq!(slider.value(), 0);
    }

    #[test]
    fn unchanged_value_produces_no_notification() {
        let mut slider = TickSlider::new(0, 99);
        assert!(slider.set_value(50));
        assert!(!slider.set_value(50));
        // Clamped duplicates are also silent.
        slider.set_value(99);
        assert!(!slider.set_value(200));
    }

    #[test]
    fn arrow_jump_scenario() {
        let mut slider = TickSlider::new(0, 99);
        slider.set_value(50);
        assert!(slider.set_value(slider.value() + ARROW_JUMP));
        assert_eq!(slider.value(), 60);

        slider.set_value(95);
        slider.set_value(slider.value() + ARROW_JUMP);
        assert_eq!(slider.value(), 99);
    }

    #[test]
    fn single_steps_move_by_one() {
        let mut slider = TickSlider::new(0, 9);
        slider.set_value(5);
        assert!(slider.step(ARROW_STEP));
        assert_eq!(slider.value(), 6);
        assert!(slider.step(-ARROW_STEP));
        assert_eq!(slider.value(), 5);
        // Stepping off the end clamps and eventually stops notifying.
        slider.set_value(9);
        assert!(!slider.step(ARROW_STEP));
    }

    #[test]
    fn duplicate_tick_name_overwrites() {
        let mut slider = TickSlider::new(0, 100);
        slider.add_tick("A", 10, 10.0, [10, 10, 240], 3.0, 255);
        slider.add_tick("A", 20, 10.0, [240, 10, 10], 3.0, 255);

        assert_eq!(slider.tick_count(), 1);
        let tick = slider.tick("A").expect("tick A");
        assert_eq!(tick.position, 20);
        assert_eq!(tick.color, [240, 10, 10]);
    }

    #[test]
    fn remove_missing_tick_is_silent() {
        let mut slider = TickSlider::new(0, 100);
        slider.remove_tick("nope");
        slider.add_tick("A", 10, 10.0, [0, 0, 0], 3.0, 255);
        slider.remove_tick("A");
        slider.remove_tick("A");
        assert_eq!(slider.tick_count(), 0);
    }

    #[test]
    fn remove_all_ticks_clears_unconditionally() {
        let mut slider = TickSlider::new(0, 100);
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            slider.add_tick(name, i as i64, 10.0, [0, 0, 0], 3.0, 255);
        }
        slider.remove_all_ticks();
        assert_eq!(slider.tick_count(), 0);
        slider.remove_all_ticks();
        assert_eq!(slider.tick_count(), 0);
    }

    #[test]
    fn tick_sequence_equals_map_semantics() {
        // Any add/remove sequence ends up identical to replaying it over a map.
        let mut slider = TickSlider::new(0, 1000);
        let calls: &[(&str, Option<i64>)] = &[
            ("m1", Some(5)),
            ("m2", Some(10)),
            ("m1", Some(7)),
            ("m2", None),
            ("m3", Some(12)),
            ("missing", None),
        ];
        let mut expected: Vec<(&str, i64)> = Vec::new();
        for (name, op) in calls {
            match op {
                Some(pos) => {
                    slider.add_tick(name, *pos, 10.0, [0, 0, 0], 3.0, 255);
                    expected.retain(|(n, _)| n != name);
                    expected.push((name, *pos));
                }
                None => {
                    slider.remove_tick(name);
                    expected.retain(|(n, _)| n != name);
                }
            }
        }
        assert_eq!(slider.tick_count(), expected.len());
        for (name, pos) in expected {
            assert_eq!(slider.tick(name).map(|t| t.position), Some(pos));
        }
    }

    #[test]
    fn fraction_uses_inclusive_span() {
        let slider = TickSlider::new(0, 9);
        assert_eq!(slider.fraction(0), 0.0);
        assert_eq!(slider.fraction(5), 0.5);
        // The last frame maps inside the track, not onto its far edge.
        assert!(slider.fraction(9) < 1.0);
    }

    #[test]
    fn range_change_clamps_value() {
        let mut slider = TickSlider::new(0, 100);
        slider.set_value(80);
        slider.set_range(0, 50);
        assert_eq!(slider.value(), 50);
    }
}
