//! Reconnect delay policy.

use std::time::Duration;
use rand::Rng;

/// Lower bound on any reconnect delay, so a zero setting cannot spin.
pub const MIN_RECONNECT_DELAY: Duration = Duration::from_millis(10);

/// How long to wait before each reconnect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Same delay before every attempt.
    Fixed(Duration),
    /// Doubling delay starting at `base`, capped at `max`, with up to 10% jitter.
    Exponential { base: Duration, max: Duration },
}

impl ReconnectPolicy {
    /// Delay before the given attempt (1 for the first reconnect), never
    /// below `MIN_RECONNECT_DELAY`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match *self {
            ReconnectPolicy::Fixed(delay) => delay,
            ReconnectPolicy::Exponential { base, max } => calculate_backoff(
                attempt.max(1),
                base.as_millis() as u64,
                max.as_millis() as u64,
            ),
        };
        delay.max(MIN_RECONNECT_DELAY)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Fixed(Duration::from_secs(10))
    }
}

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200 && b2.as_millis() < 220);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000 && max.as_millis() < 1100);
    }

    #[test]
    fn fixed_policy_ignores_attempt() {
        let policy = ReconnectPolicy::Fixed(Duration::from_secs(10));
        assert_eq!(policy.delay(1), Duration::from_secs(10));
        assert_eq!(policy.delay(7), Duration::from_secs(10));
    }

    #[test]
    fn exponential_policy_grows_then_caps() {
        let policy = ReconnectPolicy::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(8),
        };
        assert!(policy.delay(1) >= Duration::from_secs(1));
        assert!(policy.delay(3) >= Duration::from_secs(4));
        let capped = policy.delay(20);
        assert!(capped >= Duration::from_secs(8) && capped < Duration::from_millis(8800));
    }

    #[test]
    fn zero_delays_are_raised_to_the_floor() {
        assert_eq!(ReconnectPolicy::Fixed(Duration::ZERO).delay(1), MIN_RECONNECT_DELAY);
        let policy = ReconnectPolicy::Exponential {
            base: Duration::ZERO,
            max: Duration::ZERO,
        };
        assert_eq!(policy.delay(4), MIN_RECONNECT_DELAY);
    }

    #[test]
    fn default_is_ten_second_fixed() {
        assert_eq!(ReconnectPolicy::default(), ReconnectPolicy::Fixed(Duration::from_secs(10)));
    }
}
