use std::time::{Duration, Instant};

/// Delay and sound timers tick at 60 Hz no matter how fast instructions run
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Delay and sound timer pair, driven by wall clock time
#[derive(Clone, Copy, Debug)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
    /// Start of the current, not yet elapsed, timer period
    epoch: Instant,
}

impl Timers {
    pub fn new(epoch: Instant) -> Timers {
        Timers {
            delay: 0,
            sound: 0,
            epoch,
        }
    }

    /// Step both timers once for every whole period elapsed since the last
    /// update. Returns the number of periods consumed.
    pub fn catch_up(&mut self, now: Instant) -> u32 {
        let mut periods = 0;
        while now.saturating_duration_since(self.epoch) > TIMER_PERIOD {
            self.epoch += TIMER_PERIOD;
            self.step();
            periods += 1;
        }
        periods
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Single 60 Hz decrement, floored at zero
    pub fn step(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}
