//! Global admission control for outbound HTTP requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Process-wide rate gate emitting one permit per tick.
///
/// Every outbound HTTP request, JSON fetches and media downloads alike,
/// must consume one permit before issuing. Callers suspend on
/// [`RateGate::acquire`] until the next tick; there is no burst
/// allowance, a missed tick is delayed rather than replayed.
#[derive(Debug)]
pub struct RateGate {
    ticker: Mutex<Interval>,
}

impl RateGate {
    /// Create a gate releasing `permits_per_sec` permits per second.
    #[must_use]
    pub fn new(permits_per_sec: u32) -> Self {
        let period = Duration::from_secs(1) / permits_per_sec.max(1);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker: Mutex::new(ticker),
        }
    }

    /// Wait for the next permit.
    pub async fn acquire(&self) {
        self.ticker.lock().await.tick().await;
    }
}
