//! Explicit poll policy for long-running remote operations.
//!
//! Orders and workflow executions finish minutes to hours after submission;
//! callers wait by re-issuing status calls. The policy makes the schedule
//! explicit: a bounded exponential interval plus an attempt cap and a
//! deadline, instead of an unbounded fixed-sleep loop.

use std::time::{Duration, Instant};

use crate::error::ClientError;

/// Schedule for re-issuing status probes.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Interval before the first re-probe.
    pub initial_interval: Duration,

    /// Upper bound on the interval.
    pub max_interval: Duration,

    /// Interval growth factor per attempt; 1.0 gives a fixed interval.
    pub multiplier: f64,

    /// Maximum number of probes, unbounded when `None`.
    pub max_attempts: Option<u32>,

    /// Total wall-clock budget, unbounded when `None`.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(30),
            max_interval: Duration::from_secs(300),
            multiplier: 2.0,
            max_attempts: None,
            deadline: Some(Duration::from_secs(2 * 60 * 60)),
        }
    }
}

impl PollPolicy {
    /// Fixed-interval policy with no growth.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            ..Self::default()
        }
    }

    /// Builder method to cap the number of probes.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Builder method to set the wall-clock budget.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Interval to wait after the given zero-based attempt.
    pub fn interval_for(&self, attempt: u32) -> Duration {
        let scaled = self.initial_interval.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max_interval.as_secs_f64()))
    }

    /// Start a backoff sequence governed by this policy.
    pub fn backoff(&self) -> Backoff<'_> {
        Backoff {
            policy: self,
            attempts: 0,
            started: Instant::now(),
        }
    }
}

/// Live backoff state for one wait loop.
///
/// Callers probe, then `wait()`; the call sleeps for the next interval or
/// fails with [`ClientError::PollTimeout`] once the policy is exhausted.
pub struct Backoff<'a> {
    policy: &'a PollPolicy,
    attempts: u32,
    started: Instant,
}

impl Backoff<'_> {
    /// Number of completed (unsuccessful) probes so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Sleep until the next probe is due.
    pub async fn wait(&mut self) -> Result<(), ClientError> {
        self.attempts += 1;

        if let Some(max) = self.policy.max_attempts {
            if self.attempts >= max {
                return Err(ClientError::PollTimeout {
                    attempts: self.attempts,
                });
            }
        }

        let interval = self.policy.interval_for(self.attempts - 1);
        if let Some(deadline) = self.policy.deadline {
            if self.started.elapsed() + interval > deadline {
                return Err(ClientError::PollTimeout {
                    attempts: self.attempts,
                });
            }
        }

        tokio::time::sleep(interval).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_schedule_is_bounded() {
        let policy = PollPolicy::default();
        let secs: Vec<u64> = (0..6).map(|a| policy.interval_for(a).as_secs()).collect();
        assert_eq!(secs, [30, 60, 120, 240, 300, 300]);
    }

    #[test]
    fn test_fixed_interval() {
        let policy = PollPolicy::fixed(Duration::from_secs(300));
        assert_eq!(policy.interval_for(0), Duration::from_secs(300));
        assert_eq!(policy.interval_for(7), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_attempt_cap_exhausts() {
        let policy = PollPolicy::fixed(Duration::from_millis(1)).with_max_attempts(3);
        let mut backoff = policy.backoff();

        let mut probes = 0;
        let err = loop {
            probes += 1;
            if let Err(e) = backoff.wait().await {
                break e;
            }
        };

        assert_eq!(probes, 3);
        assert!(matches!(err, ClientError::PollTimeout { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_deadline_exhausts_before_sleeping_past_it() {
        let policy = PollPolicy {
            initial_interval: Duration::from_secs(60),
            max_interval: Duration::from_secs(60),
            multiplier: 1.0,
            max_attempts: None,
            deadline: Some(Duration::from_millis(10)),
        };
        let mut backoff = policy.backoff();

        let err = backoff.wait().await.unwrap_err();
        assert!(matches!(err, ClientError::PollTimeout { attempts: 1 }));
    }
}
