use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Scheduled,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken(u64);

/// Recurring progress timer driven by the frame loop. Every schedule or
/// cancel bumps the generation, so a tick queued before a cancel is refused.
#[derive(Debug)]
pub struct SyncTimer {
    interval: Duration,
    generation: u64,
    deadline: Option<Instant>,
    state: TimerState,
}

impl SyncTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            deadline: None,
            state: TimerState::Idle,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_scheduled(&self) -> bool {
        self.state == TimerState::Scheduled
    }

    pub fn schedule(&mut self, now: Instant) {
        self.cancel();
        self.generation += 1;
        self.deadline = Some(now + self.interval);
        self.state = TimerState::Scheduled;
    }

    pub fn cancel(&mut self) {
        if self.state != TimerState::Scheduled {
            return;
        }
        self.generation += 1;
        self.deadline = None;
        self.state = TimerState::Cancelled;
    }

    pub fn poll(&mut self, now: Instant) -> Option<TickToken> {
        match self.deadline {
            Some(deadline) if self.state == TimerState::Scheduled && now >= deadline => {
                self.deadline = None;
                Some(TickToken(self.generation))
            }
            _ => None,
        }
    }

    // Stale tokens change nothing.
    pub fn fire(&mut self, token: TickToken, now: Instant) -> bool {
        if self.state != TimerState::Scheduled || token.0 != self.generation {
            return false;
        }
        self.deadline = Some(now + self.interval);
        true
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_millis(1000);

    #[test]
    fn idle_timer_never_ticks() {
        let now = Instant::now();
        let mut timer = SyncTimer::new(SECOND);
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.poll(now + SECOND * 10).is_none());
    }

    #[test]
    fn ticks_once_per_interval_and_rearms() {
        let t0 = Instant::now();
        let mut timer = SyncTimer::new(SECOND);
        timer.schedule(t0);

        assert!(timer.poll(t0 + Duration::from_millis(999)).is_none());
        let token = timer.poll(t0 + SECOND).unwrap();
        assert!(timer.poll(t0 + SECOND).is_none());
        assert!(timer.fire(token, t0 + SECOND));

        assert!(timer.poll(t0 + Duration::from_millis(1500)).is_none());
        assert!(timer.poll(t0 + SECOND * 2).is_some());
    }

    #[test]
    fn cancel_refuses_already_queued_tick() {
        let t0 = Instant::now();
        let mut timer = SyncTimer::new(SECOND);
        timer.schedule(t0);
        let queued = timer.poll(t0 + SECOND).unwrap();

        timer.cancel();
        assert_eq!(timer.state(), TimerState::Cancelled);
        assert!(!timer.fire(queued, t0 + SECOND));
        assert!(timer.poll(t0 + SECOND * 5).is_none());
    }

    #[test]
    fn rescheduling_invalidates_previous_schedule() {
        let t0 = Instant::now();
        let mut timer = SyncTimer::new(SECOND);
        timer.schedule(t0);
        let old = timer.poll(t0 + SECOND).unwrap();

        timer.schedule(t0 + SECOND);
        assert!(!timer.fire(old, t0 + SECOND));
        assert!(timer.poll(t0 + Duration::from_millis(1500)).is_none());

        let fresh = timer.poll(t0 + SECOND * 2).unwrap();
        assert!(timer.fire(fresh, t0 + SECOND * 2));
    }

    #[test]
    fn reports_time_until_due() {
        let t0 = Instant::now();
        let mut timer = SyncTimer::new(SECOND);
        assert_eq!(timer.time_until_due(t0), None);
        timer.schedule(t0);
        assert_eq!(
            timer.time_until_due(t0 + Duration::from_millis(400)),
            Some(Duration::from_millis(600))
        );
        assert_eq!(timer.time_until_due(t0 + SECOND * 3), Some(Duration::ZERO));
    }
}
