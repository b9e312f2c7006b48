use std::time::{Duration, Instant};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION_MS: u64 = 80;

/// Braille spinner driven by the app tick.
#[derive(Debug, Clone)]
pub struct Spinner {
    frame_index: usize,
    last_frame_time: Instant,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            frame_index: 0,
            last_frame_time: Instant::now(),
        }
    }

    /// Advance if a frame is due. Returns whether the frame changed.
    pub fn tick(&mut self) -> bool {
        if self.last_frame_time.elapsed() < Duration::from_millis(FRAME_DURATION_MS) {
            return false;
        }
        self.advance();
        true
    }

    fn advance(&mut self) {
        self.frame_index = (self.frame_index + 1) % FRAMES.len();
        self.last_frame_time = Instant::now();
    }

    pub fn current_frame(&self) -> &'static str {
        FRAMES[self.frame_index]
    }
}
