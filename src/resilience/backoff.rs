//! Exponential backoff with jitter for readiness checks.

use std::time::Duration;

use rand::Rng;

/// Delay schedule between attempts: `base * 2^(n-1)`, capped at `max`,
/// plus up to 10% jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            attempt: 0,
        }
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        delay_for(self.attempt, self.base, self.max)
    }

    /// Number of delays handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

fn delay_for(attempt: u32, base: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    let capped = base.saturating_mul(factor).min(max);

    let jitter_ms = capped.as_millis() as u64 / 10;
    let jitter = if jitter_ms > 0 {
        rand::thread_rng().gen_range(0..jitter_ms)
    } else {
        0
    };
    capped + Duration::from_millis(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_grow_and_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(1000));

        let first = backoff.next_delay();
        assert!(first >= Duration::from_millis(100) && first < Duration::from_millis(110));

        let second = backoff.next_delay();
        assert!(second >= Duration::from_millis(200) && second < Duration::from_millis(220));

        for _ in 0..20 {
            backoff.next_delay();
        }
        let capped = backoff.next_delay();
        assert!(capped >= Duration::from_millis(1000) && capped < Duration::from_millis(1100));
        assert_eq!(backoff.attempts(), 23);
    }

    #[test]
    fn test_max_never_below_base() {
        let mut backoff = Backoff::new(Duration::from_millis(50), Duration::ZERO);
        assert!(backoff.next_delay() >= Duration::from_millis(50));
    }

    #[test]
    fn test_zero_base() {
        let mut backoff = Backoff::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(backoff.next_delay(), Duration::ZERO);
    }
}
