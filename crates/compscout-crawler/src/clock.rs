//! Time source for timestamps and scheduled delays.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local};
use futures::future::{self, BoxFuture, FutureExt};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Wall-clock time and real tokio sleeps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// A clock frozen at one instant whose sleeps complete immediately.
///
/// Every requested delay is recorded so schedules can be inspected.
#[derive(Debug)]
pub struct FixedClock {
    at: DateTime<Local>,
    slept: Mutex<Vec<Duration>>,
}

impl FixedClock {
    #[must_use]
    pub fn new(at: DateTime<Local>) -> Self {
        Self {
            at,
            slept: Mutex::new(Vec::new()),
        }
    }

    /// Delays requested so far, in request order.
    #[must_use]
    pub fn slept(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn total_slept(&self) -> Duration {
        self.slept().into_iter().sum()
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.at
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
        future::ready(()).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn fixed_clock_records_without_waiting() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap();
        let clock = FixedClock::new(at);

        clock.sleep(Duration::from_secs(5)).await;
        clock.sleep(Duration::from_secs(10)).await;

        assert_eq!(clock.now(), at);
        assert_eq!(
            clock.slept(),
            [Duration::from_secs(5), Duration::from_secs(10)]
        );
        assert_eq!(clock.total_slept(), Duration::from_secs(15));
    }
}
