//! Fixed-step tick accumulator for real-time frontends.

use crate::types::TICK_MS;

/// Banks wall-clock time and pays it out in whole ticks, so a slow frame
/// catches up instead of losing game time.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step_ms: u64,
    last_ms: Option<u64>,
    banked_ms: u64,
}

impl FixedStep {
    pub fn new(step_ms: u32) -> Self {
        Self {
            step_ms: u64::from(step_ms.max(1)),
            last_ms: None,
            banked_ms: 0,
        }
    }

    pub fn step_ms(&self) -> u32 {
        self.step_ms as u32
    }

    /// Record the clock reading `now_ms` and return how many ticks are due.
    /// The first reading only sets the reference point.
    pub fn advance(&mut self, now_ms: u64) -> u32 {
        let elapsed = self.last_ms.map_or(0, |last| now_ms.saturating_sub(last));
        self.last_ms = Some(now_ms);
        self.banked_ms += elapsed;
        let due = self.banked_ms / self.step_ms;
        self.banked_ms %= self.step_ms;
        u32::try_from(due).unwrap_or(u32::MAX)
    }

    /// Milliseconds until the next tick is due at `now_ms`.
    pub fn until_next_ms(&self, now_ms: u64) -> u64 {
        let since = self.last_ms.map_or(0, |last| now_ms.saturating_sub(last));
        self.step_ms.saturating_sub(self.banked_ms + since)
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(TICK_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_reading_only_anchors() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(5_000), 0);
        assert_eq!(clock.advance(5_016), 1);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut clock = FixedStep::new(16);
        clock.advance(0);
        assert_eq!(clock.advance(40), 2);
        assert_eq!(clock.until_next_ms(40), 8);
        assert_eq!(clock.advance(48), 1);
        assert_eq!(clock.until_next_ms(48), 16);
    }

    #[test]
    fn test_slow_frame_pays_out_every_tick() {
        let mut clock = FixedStep::new(16);
        clock.advance(0);
        // 62 ticks of 16 ms fit in one second, 8 ms stay banked.
        assert_eq!(clock.advance(1_000), 62);
        assert_eq!(clock.advance(1_008), 1);
    }

    #[test]
    fn test_clock_going_backwards_is_ignored() {
        let mut clock = FixedStep::new(16);
        clock.advance(100);
        assert_eq!(clock.advance(50), 0);
        assert_eq!(clock.advance(66), 1);
    }
}
