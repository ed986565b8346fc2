//! Request spacing for page fetches
//!
//! This module handles:
//! - Combining the configured politeness delay with the robots.txt crawl delay
//! - Handing out fetch slots at most once per interval across all workers

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Calculates the effective delay between page fetches
///
/// This takes the maximum of:
/// - The configured politeness delay
/// - The robots.txt crawl delay (if specified)
pub fn effective_delay(politeness: Duration, robots_delay: Option<Duration>) -> Duration {
    std::cmp::max(politeness, robots_delay.unwrap_or(Duration::ZERO))
}

/// Run-wide fetch pacing shared by all workers
///
/// With a zero interval `acquire` never waits.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until this caller may issue its page fetch
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let wait_until = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(slot + self.interval);
            slot
        };

        if wait_until > Instant::now() {
            tracing::trace!("Throttling for {:?}", wait_until - Instant::now());
            tokio::time::sleep_until(wait_until).await;
        }
    }
}
