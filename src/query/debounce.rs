//! Debounced input coalescing.
//!
//! The [`Debouncer`] holds no timer of its own: it records a deadline and the
//! runtime polls it. Cancelling is therefore just forgetting the deadline, and
//! dropping a debouncer can never leave a timer firing into torn-down state.

use std::time::{Duration, Instant};

/// Default quiet window before a free-text value settles.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(1000);

/// Coalesces rapid changes into a single settled value.
///
/// # Example
///
/// ```rust
/// use dashflow::query::Debouncer;
/// use std::time::{Duration, Instant};
///
/// let t0 = Instant::now();
/// let mut search = Debouncer::new(Duration::from_millis(1000));
///
/// search.on_change("a".to_string(), t0);
/// search.on_change("ab".to_string(), t0 + Duration::from_millis(200));
///
/// assert_eq!(search.poll(t0 + Duration::from_millis(1100)), None);
/// assert_eq!(search.poll(t0 + Duration::from_millis(1200)), Some("ab".to_string()));
/// assert_eq!(search.poll(t0 + Duration::from_millis(5000)), None);
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
    settled: Option<T>,
}

impl<T: Clone> Debouncer<T> {
    /// Creates a debouncer that settles after `quiet` without changes.
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            settled: None,
        }
    }

    #[must_use]
    pub const fn quiet_window(&self) -> Duration {
        self.quiet
    }

    /// Records a raw change, superseding any pending emission.
    pub fn on_change(&mut self, raw: T, now: Instant) {
        self.pending = Some((raw, now + self.quiet));
    }

    /// Emits the pending value once its quiet window has elapsed.
    ///
    /// Returns `Some` at most once per pending value.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                let (value, _) = self.pending.take()?;
                self.settled = Some(value.clone());
                Some(value)
            }
            _ => None,
        }
    }

    /// When the pending value (if any) will settle.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// A change is waiting for its quiet window to elapse.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Last settled value.
    #[must_use]
    pub const fn settled(&self) -> Option<&T> {
        self.settled.as_ref()
    }

    /// Drops any pending emission. Called on teardown.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            tracing::trace!("pending debounced value cancelled");
        }
    }
}

impl<T: Clone> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_of_changes_settles_once_to_last_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(1000));
        let mut settled = Vec::new();

        for (i, raw) in ["a", "ac", "acm", "acme", "acme "].iter().enumerate() {
            let at = t0 + ms(100 * i as u64);
            d.on_change((*raw).to_string(), at);
            settled.extend(d.poll(at));
        }
        for step in 0..30 {
            settled.extend(d.poll(t0 + ms(400 + step * 100)));
        }

        assert_eq!(settled, vec!["acme ".to_string()]);
        assert_eq!(d.settled().map(String::as_str), Some("acme "));
    }

    #[test]
    fn single_change_settles_after_full_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(1500));
        d.on_change(7_u32, t0);

        assert_eq!(d.poll(t0 + ms(1499)), None);
        assert_eq!(d.poll(t0 + ms(1500)), Some(7));
        assert_eq!(d.poll(t0 + ms(3000)), None);
    }

    #[test]
    fn new_change_pushes_deadline_forward() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(1000));
        d.on_change(1, t0);
        d.on_change(2, t0 + ms(900));

        assert_eq!(d.deadline(), Some(t0 + ms(1900)));
        assert_eq!(d.poll(t0 + ms(1000)), None);
        assert_eq!(d.poll(t0 + ms(1900)), Some(2));
    }

    #[test]
    fn cancel_discards_pending_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(1000));
        d.on_change("draft", t0);
        d.cancel();

        assert!(!d.is_pending());
        assert_eq!(d.deadline(), None);
        assert_eq!(d.poll(t0 + ms(5000)), None);
        assert_eq!(d.settled(), None);
    }
}
