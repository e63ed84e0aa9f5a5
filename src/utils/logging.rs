use log::{Level, log_enabled, warn};
use std::time::{Duration, Instant};

/// Times a labelled section of a collision tick. Start and end are traced;
/// a timer given a budget warns from [`ScopedTimer::finish`] when the
/// section overran it.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
    budget_ms: Option<f32>,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
            budget_ms: None,
        }
    }

    /// Timer that reports overruns of `budget_ms`. A budget of zero or less
    /// disables the check.
    pub fn with_budget(label: &'a str, budget_ms: f32) -> Self {
        let mut timer = Self::new(label);
        timer.budget_ms = Some(budget_ms);
        timer
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stops the timer and returns the elapsed time.
    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        if let Some(budget_ms) = self.budget_ms {
            warn_if_over_budget(self.label, elapsed, budget_ms);
        }
        elapsed
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            log::trace!("end {} ({} µs)", self.label, self.start.elapsed().as_micros());
        }
    }
}

/// Logs a warning when `label` took longer than `budget_ms`. Returns whether
/// the budget was exceeded.
pub fn warn_if_over_budget(label: &str, duration: Duration, budget_ms: f32) -> bool {
    let elapsed_ms = duration.as_secs_f32() * 1000.0;
    if budget_ms > 0.0 && elapsed_ms > budget_ms {
        warn!("{label} exceeded budget: {elapsed_ms:.2} ms > {budget_ms:.2} ms");
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_check_only_fires_above_budget() {
        assert!(warn_if_over_budget("tick", Duration::from_millis(10), 4.0));
        assert!(!warn_if_over_budget("tick", Duration::from_millis(1), 4.0));
        assert!(!warn_if_over_budget("tick", Duration::from_millis(10), 0.0));
    }

    #[test]
    fn finish_reports_elapsed_time() {
        let timer = ScopedTimer::with_budget("tick", 1_000.0);
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.finish() >= Duration::from_millis(2));
    }
}
