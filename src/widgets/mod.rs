//! UI widgets - tick slider and channel image viewers.

pub mod tick_slider;
pub mod viewer;

pub use tick_slider::{Orientation, Tick, TickSlider, TickSliderConfig, ARROW_JUMP, ARROW_STEP};
pub use viewer::ImageViewer;
