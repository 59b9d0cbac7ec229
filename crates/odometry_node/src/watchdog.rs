//! Missing-input watchdog.

use std::time::{Duration, Instant};

use contracts::SyncMode;
use tracing::warn;

/// Warns when no synchronized group arrived for a while
#[derive(Debug, Clone)]
pub struct CallbackMonitor {
    warn_after: Duration,
    last_callback: Instant,
    last_warning: Option<Instant>,
    subscription: String,
    mode: SyncMode,
}

impl CallbackMonitor {
    /// `subscription` is the human-readable channel summary quoted in warnings.
    pub fn new(warn_after: Duration, subscription: String, mode: SyncMode, now: Instant) -> Self {
        Self {
            warn_after,
            last_callback: now,
            last_warning: None,
            subscription,
            mode,
        }
    }

    pub fn record_callback(&mut self, now: Instant) {
        self.last_callback = now;
        self.last_warning = None;
    }

    pub fn last_callback(&self) -> Instant {
        self.last_callback
    }

    /// Emit at most one warning per period while input is missing.
    ///
    /// Returns the warning text when one was emitted.
    pub fn check(&mut self, now: Instant) -> Option<String> {
        let silent_for = now.saturating_duration_since(self.last_callback);
        if silent_for < self.warn_after {
            return None;
        }
        if let Some(last) = self.last_warning {
            if now.saturating_duration_since(last) < self.warn_after {
                return None;
            }
        }
        self.last_warning = Some(now);

        let mut message = format!(
            "Did not receive data since {:.1} seconds! Make sure the input channels are \
             published and their timestamps are set correctly. {}",
            silent_for.as_secs_f64(),
            self.subscription
        );
        if self.mode == SyncMode::Exact {
            message.push_str(
                " Exact synchronization is enabled, so all input stamps must be identical \
                 for a group to complete; consider approximate synchronization.",
            );
        }
        warn!(silent_s = silent_for.as_secs_f64(), "{}", message);
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(mode: SyncMode, start: Instant) -> CallbackMonitor {
        CallbackMonitor::new(
            Duration::from_secs(5),
            "Subscribed to: rgbd_image".to_string(),
            mode,
            start,
        )
    }

    #[test]
    fn test_quiet_before_deadline() {
        let start = Instant::now();
        let mut monitor = monitor(SyncMode::Approximate, start);
        assert!(monitor.check(start + Duration::from_secs(4)).is_none());
    }

    #[test]
    fn test_warns_once_per_period() {
        let start = Instant::now();
        let mut monitor = monitor(SyncMode::Approximate, start);
        let message = monitor.check(start + Duration::from_secs(6)).unwrap();
        assert!(message.contains("rgbd_image"));
        assert!(!message.contains("Exact synchronization"));

        assert!(monitor.check(start + Duration::from_secs(8)).is_none());
        assert!(monitor.check(start + Duration::from_secs(11)).is_some());
    }

    #[test]
    fn test_callback_rearms() {
        let start = Instant::now();
        let mut monitor = monitor(SyncMode::Exact, start);
        let message = monitor.check(start + Duration::from_secs(5)).unwrap();
        assert!(message.contains("Exact synchronization"));

        monitor.record_callback(start + Duration::from_secs(6));
        assert!(monitor.check(start + Duration::from_secs(9)).is_none());
        assert!(monitor.check(start + Duration::from_secs(11)).is_some());
    }
}
