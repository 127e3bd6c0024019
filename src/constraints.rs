// =============================================================================
// constraints.rs - THE WINDOW OF RELEVANCE
// =============================================================================
//
// Contest sites happily return fifteen years of history and the occasional
// "contest" that lasts until 2099. DateConstraints is the pure predicate that
// throws those out: start not too far ahead, end not too far behind, and a
// duration that a human being could plausibly sit through.
//
// Loaders use it twice: to parametrize server-side queries where the backend
// supports it, and as a client-side second pass where it does not.
// =============================================================================

use chrono::{DateTime, Duration, Utc};

use crate::models::Contest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateConstraints {
    /// Latest acceptable start.
    pub max_start_time: DateTime<Utc>,
    /// Earliest acceptable end.
    pub min_end_time: DateTime<Utc>,
    /// Longest acceptable duration.
    pub max_duration: Duration,
}

impl DateConstraints {
    pub fn new(max_start_time: DateTime<Utc>, min_end_time: DateTime<Utc>, max_duration: Duration) -> Self {
        Self {
            max_start_time,
            min_end_time,
            max_duration,
        }
    }

    /// Window centred on `now`: contests starting at most `start_ahead` from
    /// now and ending no earlier than `end_behind` ago.
    pub fn around(now: DateTime<Utc>, start_ahead: Duration, end_behind: Duration, max_duration: Duration) -> Self {
        Self::new(now + start_ahead, now - end_behind, max_duration)
    }

    /// Every bound is inclusive.
    pub fn check(&self, start_time: DateTime<Utc>, duration: Duration) -> bool {
        duration <= self.max_duration
            && start_time <= self.max_start_time
            && start_time + duration >= self.min_end_time
    }

    pub fn check_contest(&self, contest: &Contest) -> bool {
        self.check(contest.start_time, contest.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn constraints() -> DateConstraints {
        DateConstraints::around(now(), Duration::days(30), Duration::days(7), Duration::days(14))
    }

    #[test]
    fn test_accepts_contest_inside_window() {
        assert!(constraints().check(now() + Duration::days(1), Duration::hours(2)));
    }

    #[test]
    fn test_duration_bound() {
        let c = constraints();
        let start = now();
        assert!(c.check(start, Duration::days(14)));
        assert!(!c.check(start, Duration::days(14) + Duration::seconds(1)));
    }

    #[test]
    fn test_max_start_bound() {
        let c = constraints();
        let max_start = now() + Duration::days(30);
        assert!(c.check(max_start, Duration::hours(2)));
        assert!(!c.check(max_start + Duration::seconds(1), Duration::hours(2)));
    }

    #[test]
    fn test_min_end_bound() {
        let c = constraints();
        let min_end = now() - Duration::days(7);
        let duration = Duration::hours(3);
        assert!(c.check(min_end - duration, duration));
        assert!(!c.check(min_end - duration - Duration::seconds(1), duration));
    }
}
