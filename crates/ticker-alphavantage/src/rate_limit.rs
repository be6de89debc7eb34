//! Sliding-window request limiter.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

/// Length of the limiter window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Extra wait added after the window expires.
pub const SAFETY_BUFFER: Duration = Duration::from_secs(1);

/// Caps requests to `capacity` per window.
///
/// [`acquire`](Self::acquire) never rejects: when the window is full the caller
/// sleeps until the oldest request leaves it. The history lock is held across
/// the sleep so concurrent callers queue up behind each other.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    capacity: usize,
    window: Duration,
    buffer: Duration,
    history: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter allowing `requests_per_minute` requests per minute.
    #[must_use]
    pub fn per_minute(requests_per_minute: usize) -> Self {
        Self::new(requests_per_minute, WINDOW, SAFETY_BUFFER)
    }

    /// Creates a limiter with a custom window and buffer. A zero capacity is treated as one.
    #[must_use]
    pub fn new(capacity: usize, window: Duration, buffer: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            window,
            buffer,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Maximum requests per window.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Waits until a request may be sent, then records it.
    pub async fn acquire(&self) {
        let mut history = self.history.lock().await;

        if history.len() >= self.capacity {
            if let Some(&oldest) = history.front() {
                let elapsed = oldest.elapsed();
                if elapsed < self.window {
                    let wait = self.window - elapsed + self.buffer;
                    info!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
                    tokio::time::sleep(wait).await;
                }
            }
            while history.len() >= self.capacity {
                history.pop_front();
            }
        }

        history.push_back(Instant::now());
    }
}
