//! Playback state for stepping through the deployment.
//!
//! Timing is elapsed-time based: `tick()` is called every update and reports
//! whether the slider should advance by one frame. If the UI stalls longer
//! than one frame duration we still advance a single step rather than
//! dropping a burst of frames into the prefetch queues.

use std::time::Instant;

use log::trace;

/// Speed dial bounds, frames per second.
pub const MIN_FPS: f32 = 1.0;
pub const MAX_FPS: f32 = 30.0;

#[derive(Debug, Clone)]
pub struct Playback {
    playing: bool,
    fps: f32,
    last_advance: Option<Instant>,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            playing: false,
            fps: 5.0,
            last_advance: None,
        }
    }
}

impl Playback {
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
    }

    pub fn play(&mut self) {
        if !self.playing {
            trace!("playback started at {} fps", self.fps);
            self.playing = true;
            self.last_advance = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if self.playing {
            trace!("playback paused");
            self.playing = false;
            self.last_advance = None;
        }
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Returns true when one frame duration has elapsed and the slider
    /// should advance by a single step.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        let now = Instant::now();
        let frame_duration = 1.0 / self.fps;
        match self.last_advance {
            Some(last) if now.duration_since(last).as_secs_f32() >= frame_duration => {
                self.last_advance = Some(now);
                true
            }
            Some(_) => false,
            None => {
                self.last_advance = Some(now);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn paused_never_advances() {
        let mut playback = Playback::default();
        assert!(!playback.tick());
        std::thread::sleep(Duration::from_millis(5));
        assert!(!playback.tick());
    }

    #[test]
    fn advances_after_frame_duration() {
        let mut playback = Playback::default();
        playback.set_fps(MAX_FPS * 10.0); // clamped to MAX_FPS, ~33ms frames
        assert_eq!(playback.fps(), MAX_FPS);
        playback.play();
        assert!(!playback.tick());
        std::thread::sleep(Duration::from_millis(40));
        assert!(playback.tick());
        // Immediately after an advance the next frame is not yet due.
        assert!(!playback.tick());
    }

    #[test]
    fn pause_resets_timing() {
        let mut playback = Playback::default();
        playback.play();
        playback.pause();
        assert!(!playback.is_playing());
        assert!(!playback.tick());
    }

    #[test]
    fn fps_is_clamped() {
        let mut playback = Playback::default();
        playback.set_fps(0.0);
        assert_eq!(playback.fps(), MIN_FPS);
    }
}
