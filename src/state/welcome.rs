//! Welcome screen logo animation state

use std::time::{Duration, Instant};

/// Animation phase for the welcome logo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomePhase {
    /// Logo dropping into place
    Entering,
    /// Logo at rest, feature list visible
    Settled,
}

/// Welcome logo animation state
#[derive(Debug)]
pub struct WelcomeState {
    /// When the animation started
    pub start_time: Instant,
    /// Current animation phase
    pub phase: WelcomePhase,
    /// Rows the logo still sits above its resting place
    pub drop_offset: f32,
}

impl WelcomeState {
    /// Duration of the drop-in animation
    const ANIMATION_DURATION: Duration = Duration::from_millis(700);

    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase: WelcomePhase::Entering,
            drop_offset: f32::MAX,
        }
    }

    /// Update animation state based on elapsed time
    pub fn update(&mut self, terminal_height: u16) {
        let elapsed = self.start_time.elapsed();

        if elapsed < Self::ANIMATION_DURATION {
            self.phase = WelcomePhase::Entering;
            let progress = elapsed.as_secs_f32() / Self::ANIMATION_DURATION.as_secs_f32();
            // cubic ease-out: fast start, gentle landing
            let eased = simple_easing::cubic_out(progress);
            self.drop_offset = (1.0 - eased) * (terminal_height as f32 / 2.0);
        } else {
            self.settle();
        }
    }

    /// Jump to the resting position (user pressed a key)
    pub fn settle(&mut self) {
        self.phase = WelcomePhase::Settled;
        self.drop_offset = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        self.phase == WelcomePhase::Settled
    }
}

impl Default for WelcomeState {
    fn default() -> Self {
        Self::new()
    }
}
