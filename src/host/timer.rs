//! Deterministic timer queue driven by explicit time steps.

use std::time::Duration;

use super::TimerHandle;

#[derive(Debug, Clone)]
struct TimerEntry {
    handle: TimerHandle,
    due: Duration,
    period: Option<Duration>,
}

/// Timers against a virtual clock that only moves in [`TimerQueue::advance`].
///
/// Timers fire in due-time order; ties fire in scheduling order. Repeating
/// timers re-arm relative to their previous due time, so a large step fires
/// them once per elapsed period.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerQueue {
    /// Empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Whether `handle` is still pending.
    #[must_use]
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Schedule a timer `delay` from now. A repeating timer with a zero
    /// delay would never let the clock move, so it is armed as one-shot.
    pub fn schedule(&mut self, delay: Duration, repeat: bool) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle::from_raw(self.next_id);
        let period = if repeat && !delay.is_zero() {
            Some(delay)
        } else {
            if repeat {
                log::warn!("repeating timer with zero period armed as one-shot");
            }
            None
        };
        let due = self.now.checked_add(delay).unwrap_or_else(|| {
            log::warn!("timer {delay:?} past {:?} overflows the clock", self.now);
            Duration::MAX
        });
        self.entries.push(TimerEntry {
            handle,
            due,
            period,
        });
        handle
    }

    /// Cancel a pending timer.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Move the clock forward by `dt`, returning every timer that fired in
    /// firing order.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerHandle> {
        let target = self.now.saturating_add(dt);
        let mut fired = Vec::new();

        // Entries stay in scheduling order, so the first minimum found is
        // the earliest-scheduled among equal due times.
        while let Some(pos) = self.next_due(target) {
            let TimerEntry {
                handle,
                due,
                period,
            } = self.entries[pos].clone();
            self.now = due;
            fired.push(handle);
            match period.and_then(|period| due.checked_add(period)) {
                Some(next) => self.entries[pos].due = next,
                None => {
                    if period.is_some() {
                        log::warn!("repeating timer past {due:?} dropped");
                    }
                    let _ = self.entries.remove(pos);
                }
            }
        }

        self.now = target;
        fired
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= target)
            .min_by_key(|(_, e)| e.due)
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once() {
        let mut timers = TimerQueue::new();
        let h = timers.schedule(Duration::from_secs(5), false);
        assert!(timers.advance(Duration::from_secs(4)).is_empty());
        assert_eq!(timers.advance(Duration::from_secs(1)), vec![h]);
        assert!(timers.advance(Duration::from_secs(10)).is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn repeating_fires_once_per_period() {
        let mut timers = TimerQueue::new();
        let h = timers.schedule(Duration::from_millis(500), true);
        let fired = timers.advance(Duration::from_millis(1600));
        assert_eq!(fired, vec![h, h, h]);
        assert!(timers.is_scheduled(h));
        assert_eq!(timers.now(), Duration::from_millis(1600));
    }

    #[test]
    fn fires_in_due_order_then_schedule_order() {
        let mut timers = TimerQueue::new();
        let late = timers.schedule(Duration::from_secs(2), false);
        let early = timers.schedule(Duration::from_secs(1), false);
        let tied = timers.schedule(Duration::from_secs(1), false);
        assert_eq!(
            timers.advance(Duration::from_secs(3)),
            vec![early, tied, late]
        );
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerQueue::new();
        let h = timers.schedule(Duration::from_secs(1), true);
        assert!(timers.cancel(h));
        assert!(!timers.cancel(h));
        assert!(timers.advance(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn far_future_timers_do_not_overflow() {
        let mut timers = TimerQueue::new();
        let _ = timers.advance(Duration::from_secs(1));
        let never = timers.schedule(Duration::MAX, false);
        assert!(timers.advance(Duration::from_secs(1)).is_empty());
        assert!(timers.is_scheduled(never));
    }

    #[test]
    fn repeating_timer_is_dropped_when_rearm_overflows() {
        let mut timers = TimerQueue::new();
        let h = timers.schedule(Duration::MAX, true);
        assert_eq!(timers.advance(Duration::MAX), vec![h]);
        assert_eq!(timers.pending(), 0);
        assert_eq!(timers.now(), Duration::MAX);
    }

    #[test]
    fn zero_period_repeat_is_one_shot() {
        let mut timers = TimerQueue::new();
        let h = timers.schedule(Duration::ZERO, true);
        assert_eq!(timers.advance(Duration::from_secs(1)), vec![h]);
        assert_eq!(timers.pending(), 0);
    }
}
