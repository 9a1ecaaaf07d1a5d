use std::time::Duration;

use tokio::time::Instant;

/// What the caller should do after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceSignal {
    Steady,
    /// Absence reached the escalation delay; ask the user to confirm.
    ConfirmationNeeded,
}

/// Tracks continuous face absence across detector polls.
///
/// At most one confirmation is requested per absence interval. The interval
/// ends only when a face is seen again.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    escalation: Duration,
    face_detected: bool,
    absent_since: Option<Instant>,
    prompted: bool,
}

impl PresenceTracker {
    pub fn new(escalation: Duration) -> Self {
        Self {
            escalation,
            face_detected: false,
            absent_since: None,
            prompted: false,
        }
    }

    pub fn face_detected(&self) -> bool {
        self.face_detected
    }

    pub fn absent_since(&self) -> Option<Instant> {
        self.absent_since
    }

    pub fn observe(&mut self, face: bool, now: Instant, session_active: bool) -> PresenceSignal {
        self.face_detected = face;
        if face {
            self.absent_since = None;
            self.prompted = false;
            return PresenceSignal::Steady;
        }

        if !session_active {
            self.absent_since = None;
            return PresenceSignal::Steady;
        }

        let since = *self.absent_since.get_or_insert(now);
        if !self.prompted && now.saturating_duration_since(since) >= self.escalation {
            self.prompted = true;
            return PresenceSignal::ConfirmationNeeded;
        }
        PresenceSignal::Steady
    }

    /// Forgets the current absence interval, e.g. when the camera is released.
    pub fn reset(&mut self) {
        self.face_detected = false;
        self.absent_since = None;
        self.prompted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_escalates_after_continuous_absence() {
        let t0 = Instant::now();
        let mut tracker = PresenceTracker::new(secs(15));

        for i in 0..15 {
            assert_eq!(tracker.observe(false, t0 + secs(i), true), PresenceSignal::Steady);
        }
        assert_eq!(
            tracker.observe(false, t0 + secs(15), true),
            PresenceSignal::ConfirmationNeeded
        );
        assert_eq!(tracker.absent_since(), Some(t0));
    }

    #[test]
    fn test_one_prompt_per_absence_interval() {
        let t0 = Instant::now();
        let mut tracker = PresenceTracker::new(secs(15));
        tracker.observe(false, t0, true);
        assert_eq!(
            tracker.observe(false, t0 + secs(15), true),
            PresenceSignal::ConfirmationNeeded
        );
        assert_eq!(tracker.observe(false, t0 + secs(60), true), PresenceSignal::Steady);

        tracker.observe(true, t0 + secs(61), true);
        assert!(tracker.face_detected());
        tracker.observe(false, t0 + secs(62), true);
        assert_eq!(
            tracker.observe(false, t0 + secs(77), true),
            PresenceSignal::ConfirmationNeeded
        );
    }

    #[test]
    fn test_face_resets_absence() {
        let t0 = Instant::now();
        let mut tracker = PresenceTracker::new(secs(15));
        tracker.observe(false, t0, true);
        tracker.observe(true, t0 + secs(10), true);
        assert_eq!(tracker.absent_since(), None);
        assert_eq!(tracker.observe(false, t0 + secs(16), true), PresenceSignal::Steady);
    }

    #[test]
    fn test_no_tracking_without_session() {
        let t0 = Instant::now();
        let mut tracker = PresenceTracker::new(secs(15));
        tracker.observe(false, t0, false);
        assert_eq!(tracker.observe(false, t0 + secs(30), false), PresenceSignal::Steady);
        assert_eq!(tracker.absent_since(), None);
        assert!(!tracker.face_detected());
    }
}
