//! Bounded reconnect policy and driver.

use std::time::Duration;

use tracing::{info, warn};

use crate::client::{ClientHandler, Connector};
use crate::transport::TransportError;

// ---------------------------------------------------------------------------
// ReconnectPolicy
// ---------------------------------------------------------------------------

/// Capped exponential backoff over a bounded number of attempts.
///
/// `delay_for(n)` is the wait before the `n`-th consecutive failed attempt
/// is retried (1-based); `None` once attempts are exhausted. The attempt
/// counter resets on every successful connect.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy {
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        // Doubling per failure, capped; the shift is clamped so the
        // multiplier cannot overflow.
        let exp = (attempt - 1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exp);
        Some(delay.min(self.max_delay))
    }
}

// ---------------------------------------------------------------------------
// ReconnectError
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ReconnectError {
    /// All attempts failed; carries the last connect error.
    AttemptsExhausted { attempts: u32, last: anyhow::Error },
    /// The handler refused to continue.
    Handler(anyhow::Error),
}

impl std::fmt::Display for ReconnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconnectError::AttemptsExhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempts: {last}")
            }
            ReconnectError::Handler(err) => write!(f, "handler error: {err}"),
        }
    }
}

impl std::error::Error for ReconnectError {}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Client-side connection driver.
///
/// Each successful connect is a brand-new session on the server: nothing
/// carries over, so `handler.on_connected` must re-issue every subscribe
/// the client cares about. Events published during the disconnect window
/// are gone; the handler will simply never see them.
pub async fn run_with_reconnect(
    connector: &mut dyn Connector,
    policy: ReconnectPolicy,
    handler: &mut dyn ClientHandler,
) -> Result<(), ReconnectError> {
    let mut failures: u32 = 0;
    loop {
        match connector.connect().await {
            Ok(mut transport) => {
                failures = 0;
                info!("connected; re-issuing subscriptions");
                handler
                    .on_connected(transport.as_mut())
                    .await
                    .map_err(ReconnectError::Handler)?;

                loop {
                    match transport.recv().await {
                        Some(Ok(event)) => {
                            handler.on_event(event).await.map_err(ReconnectError::Handler)?;
                        }
                        Some(Err(TransportError::Protocol(msg))) => {
                            warn!(%msg, "malformed server frame skipped");
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                warn!("connection lost; reconnecting");
            }
            Err(err) => {
                failures += 1;
                match policy.delay_for(failures) {
                    Some(delay) => {
                        warn!(attempt = failures, ?delay, "connect failed; backing off");
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        return Err(ReconnectError::AttemptsExhausted {
                            attempts: failures,
                            last: err,
                        });
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_and_cap() {
        let p = ReconnectPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
        };
        assert_eq!(p.delay_for(1), Some(Duration::from_millis(500)));
        assert_eq!(p.delay_for(2), Some(Duration::from_secs(1)));
        assert_eq!(p.delay_for(3), Some(Duration::from_secs(2)));
        // Capped from 4s.
        assert_eq!(p.delay_for(4), Some(Duration::from_secs(3)));
        assert_eq!(p.delay_for(5), Some(Duration::from_secs(3)));
    }

    #[test]
    fn attempts_are_bounded() {
        let p = ReconnectPolicy::default();
        assert!(p.delay_for(5).is_some());
        assert_eq!(p.delay_for(6), None);
        assert_eq!(p.delay_for(0), None, "attempt count is 1-based");
    }

    #[test]
    fn huge_attempt_numbers_do_not_overflow() {
        let p = ReconnectPolicy {
            max_attempts: u32::MAX,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        };
        assert_eq!(p.delay_for(40), Some(Duration::from_secs(30)));
        assert_eq!(p.delay_for(u32::MAX), Some(Duration::from_secs(30)));
    }
}
