use std::time::Duration;

/// Holds the latest value until no newer one has arrived for `window`.
///
/// Time is passed in rather than read, so callers can drive it from a
/// browser clock, a tokio clock or a test.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replaces any pending value; the quiet period restarts at `at`.
    pub fn push(&mut self, value: T, at: Duration) {
        self.pending = Some((value, at));
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(_, at)| *at + self.window)
    }

    /// Releases the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match self.deadline() {
            Some(due) if now >= due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn last_value_in_window_wins() {
        let mut debounce = Debouncer::new(ms(500));
        debounce.push("c", ms(0));
        debounce.push("ca", ms(120));
        debounce.push("cas", ms(300));

        assert_eq!(debounce.poll(ms(500)), None);
        assert_eq!(debounce.poll(ms(799)), None);
        assert_eq!(debounce.poll(ms(800)), Some("cas"));
        assert_eq!(debounce.poll(ms(2000)), None);
    }

    #[test]
    fn spaced_values_each_fire() {
        let mut debounce = Debouncer::new(ms(500));
        debounce.push(1, ms(0));
        assert_eq!(debounce.poll(ms(600)), Some(1));
        debounce.push(2, ms(700));
        debounce.cancel();
        assert_eq!(debounce.poll(ms(5000)), None);
    }
}
