//! Countdown Timer
//!
//! Single-shot countdown used by rapid naming. The state machine here is
//! pure; the runtime owns the 1 second tick source and feeds ticks back
//! tagged with the generation they were started for.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Lifecycle of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running {
        started: Instant,
        deadline: Instant,
        seconds: u64,
    },
    Expired,
    Cancelled,
}

/// Outcome of feeding one tick into the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Tick from a replaced or stopped countdown
    Ignored,
    Remaining(u64),
    /// Emitted exactly once per countdown
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct Countdown {
    state: TimerState,
    generation: u64,
    display: String,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown, replacing any running one. Returns the generation
    /// the tick source must report.
    pub fn start(&mut self, seconds: u64, now: Instant) -> u64 {
        if self.cancel() {
            debug!("⏱️ Replacing running countdown");
        }
        self.generation += 1;
        self.state = TimerState::Running {
            started: now,
            deadline: now + Duration::from_secs(seconds),
            seconds,
        };
        self.display = seconds.to_string();
        debug!("⏱️ Countdown {} started: {}s", self.generation, seconds);
        self.generation
    }

    /// Recompute the remaining time from the wall clock
    pub fn tick(&mut self, generation: u64, now: Instant) -> Tick {
        if generation != self.generation {
            return Tick::Ignored;
        }
        let TimerState::Running {
            started, seconds, ..
        } = self.state
        else {
            return Tick::Ignored;
        };

        let elapsed = now.saturating_duration_since(started).as_secs();
        let remaining = seconds.saturating_sub(elapsed);
        if remaining == 0 {
            self.state = TimerState::Expired;
            self.display = "0".to_string();
            debug!("⏱️ Countdown {} expired", generation);
            Tick::Expired
        } else {
            self.display = remaining.to_string();
            Tick::Remaining(remaining)
        }
    }

    /// Stop without expiring. Returns true if a countdown was running.
    pub fn cancel(&mut self) -> bool {
        if self.is_active() {
            self.state = TimerState::Cancelled;
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Text for the remaining-time display
    pub fn display(&self) -> &str {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_runs_to_expiry_once() {
        let t0 = Instant::now();
        let mut timer = Countdown::new();
        let generation = timer.start(5, t0);
        assert_eq!(timer.display(), "5");

        let mut expiries = 0;
        for n in 1..=8 {
            match timer.tick(generation, t0 + secs(n)) {
                Tick::Expired => expiries += 1,
                Tick::Remaining(r) => assert_eq!(r, 5 - n),
                Tick::Ignored => {}
            }
            let shown: i64 = timer.display().parse().expect("numeric display");
            assert!(shown >= 0);
        }

        assert_eq!(expiries, 1);
        assert_eq!(timer.display(), "0");
        assert_eq!(timer.state(), TimerState::Expired);
    }

    #[test]
    fn test_uses_wall_clock_not_tick_count() {
        let t0 = Instant::now();
        let mut timer = Countdown::new();
        let generation = timer.start(10, t0);

        // A late first tick still reports the true remaining time
        assert_eq!(timer.tick(generation, t0 + secs(4)), Tick::Remaining(6));
        // A jittery early tick floors elapsed time
        assert_eq!(
            timer.tick(generation, t0 + Duration::from_millis(4900)),
            Tick::Remaining(6)
        );
        // A long stall jumps straight to expiry
        assert_eq!(timer.tick(generation, t0 + secs(30)), Tick::Expired);
    }

    #[test]
    fn test_restart_ignores_old_generation() {
        let t0 = Instant::now();
        let mut timer = Countdown::new();
        let first = timer.start(5, t0);
        let second = timer.start(15, t0 + secs(2));
        assert_ne!(first, second);

        assert_eq!(timer.tick(first, t0 + secs(6)), Tick::Ignored);
        assert_eq!(timer.tick(second, t0 + secs(6)), Tick::Remaining(11));
        assert!(timer.is_active());
    }

    #[test]
    fn test_cancel_suppresses_expiry() {
        let t0 = Instant::now();
        let mut timer = Countdown::new();
        let generation = timer.start(5, t0);

        assert!(timer.cancel());
        assert_eq!(timer.state(), TimerState::Cancelled);
        assert_eq!(timer.tick(generation, t0 + secs(10)), Tick::Ignored);
        assert!(!timer.cancel());
    }

    #[test]
    fn test_deadline_recorded() {
        let t0 = Instant::now();
        let mut timer = Countdown::new();
        assert_eq!(timer.state(), TimerState::Idle);
        timer.start(10, t0);
        assert!(matches!(
            timer.state(),
            TimerState::Running { deadline, seconds: 10, .. } if deadline == t0 + secs(10)
        ));
    }
}
