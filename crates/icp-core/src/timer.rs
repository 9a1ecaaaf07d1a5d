//! Pure timer state machines.
//!
//! Tasks in the application layer drive these with 1-second ticks; the
//! machines only decide what a tick means.

use std::time::Duration;

use tokio::time::Instant;

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Running(u64),
    /// Reported exactly once.
    Expired,
}

/// The interview time budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewCountdown {
    remaining: u64,
    expired: bool,
}

impl InterviewCountdown {
    pub fn new(remaining_secs: u64) -> Self {
        Self {
            remaining: remaining_secs,
            expired: false,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Advances one second. Returns `None` once expiry was already reported.
    pub fn tick(&mut self) -> Option<CountdownTick> {
        if self.expired {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            Some(CountdownTick::Expired)
        } else {
            Some(CountdownTick::Running(self.remaining))
        }
    }
}

/// Detects a stretch without user interaction.
#[derive(Debug, Clone)]
pub struct InactivityWatchdog {
    timeout: Duration,
    last_interaction: Instant,
    awaiting_answer: bool,
}

impl InactivityWatchdog {
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            last_interaction: now,
            awaiting_answer: false,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_interaction = now;
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.awaiting_answer
    }

    /// True exactly once per idle stretch, when the timeout is reached.
    pub fn check(&mut self, now: Instant) -> bool {
        if self.awaiting_answer {
            return false;
        }
        if now.saturating_duration_since(self.last_interaction) >= self.timeout {
            self.awaiting_answer = true;
            return true;
        }
        false
    }

    /// Closes the prompt raised by [`check`](Self::check) and restarts the window.
    pub fn resolve(&mut self, now: Instant) {
        self.awaiting_answer = false;
        self.last_interaction = now;
    }
}

/// Formats seconds as `mm:ss`, or `h:mm:ss` past an hour.
pub fn format_clock(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_expires_once() {
        let mut countdown = InterviewCountdown::new(2);
        assert_eq!(countdown.tick(), Some(CountdownTick::Running(1)));
        assert_eq!(countdown.tick(), Some(CountdownTick::Expired));
        assert_eq!(countdown.tick(), None);
        assert!(countdown.is_expired());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_zero_budget_expires_on_first_tick() {
        let mut countdown = InterviewCountdown::new(0);
        assert_eq!(countdown.tick(), Some(CountdownTick::Expired));
    }

    #[test]
    fn test_watchdog_fires_once_per_idle_stretch() {
        let start = Instant::now();
        let mut watchdog = InactivityWatchdog::new(Duration::from_secs(240), start);

        assert!(!watchdog.check(start + Duration::from_secs(239)));
        assert!(watchdog.check(start + Duration::from_secs(240)));
        assert!(!watchdog.check(start + Duration::from_secs(300)));

        watchdog.resolve(start + Duration::from_secs(300));
        assert!(!watchdog.is_awaiting_answer());
        assert!(!watchdog.check(start + Duration::from_secs(400)));
        assert!(watchdog.check(start + Duration::from_secs(540)));
    }

    #[test]
    fn test_touch_restarts_window() {
        let start = Instant::now();
        let mut watchdog = InactivityWatchdog::new(Duration::from_secs(10), start);
        watchdog.touch(start + Duration::from_secs(8));
        assert!(!watchdog.check(start + Duration::from_secs(12)));
        assert!(watchdog.check(start + Duration::from_secs(18)));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(1200), "20:00");
        assert_eq!(format_clock(3725), "1:02:05");
    }
}
