use std::time::Duration;

use sbar_model::IntervalSecs;

/// Tasks updating more often than this retry after [`FAST_RETRY`].
const FAST_INTERVAL_SECS: IntervalSecs = 60;
/// Tasks updating more often than this (but not fast) retry after [`MEDIUM_RETRY`].
const MEDIUM_INTERVAL_SECS: IntervalSecs = 15 * 60;

const FAST_RETRY: Duration = Duration::from_secs(5);
const MEDIUM_RETRY: Duration = Duration::from_secs(60);
const SLOW_RETRY: Duration = Duration::from_secs(5 * 60);

/// Delay before retrying a task after a transient error.
///
/// The tier depends only on the configured interval:
/// - below 1 minute: 5 seconds;
/// - below 15 minutes: 1 minute;
/// - otherwise: 5 minutes.
pub fn retry_delay(interval: IntervalSecs) -> Duration {
    match interval {
        i if i < FAST_INTERVAL_SECS => FAST_RETRY,
        i if i < MEDIUM_INTERVAL_SECS => MEDIUM_RETRY,
        _ => SLOW_RETRY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_configured_interval() {
        let cases = [
            (1, 5),
            (59, 5),
            (60, 60),
            (899, 60),
            (900, 300),
            (3_600, 300),
        ];

        for (interval, want_secs) in cases {
            assert_eq!(
                retry_delay(interval),
                Duration::from_secs(want_secs),
                "interval {interval}"
            );
        }
    }
}
