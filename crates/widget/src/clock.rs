//! Time source for timestamps, notice expiry and simulated delays.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Wall clock plus an awaitable delay.
///
/// Futures returned by `sleep` need not be `Send`; the widget runs on a
/// single UI thread.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;

    /// Suspends for `duration` without blocking the event loop.
    async fn sleep(&self, duration: Duration);
}

/// Native clock backed by tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds a std duration to a timestamp, saturating at the far future.
pub(crate) fn deadline(now: DateTime<Utc>, after: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(after)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
