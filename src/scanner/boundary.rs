use chrono::{DateTime, Duration, Utc};

/// Cutoff for one scan: `now - lookback_days`. Walking stops once history reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackBoundary {
    cutoff: DateTime<Utc>,
    lookback_days: u32,
}

impl LookbackBoundary {
    pub fn new(now: DateTime<Utc>, lookback_days: u32) -> Self {
        Self {
            cutoff: now - Duration::days(i64::from(lookback_days)),
            lookback_days,
        }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// True once the oldest message seen is not strictly newer than the cutoff.
    pub fn is_crossed_by(&self, oldest: DateTime<Utc>) -> bool {
        oldest <= self.cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cutoff_is_lookback_days_before_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 8, 0, 0).unwrap();
        let boundary = LookbackBoundary::new(now, 30);

        assert_eq!(boundary.cutoff(), Utc.with_ymd_and_hms(2024, 5, 31, 8, 0, 0).unwrap());
        assert_eq!(boundary.lookback_days(), 30);
    }

    #[test]
    fn test_crossing_is_inclusive_of_the_cutoff() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 8, 0, 0).unwrap();
        let boundary = LookbackBoundary::new(now, 1);

        assert!(boundary.is_crossed_by(boundary.cutoff()));
        assert!(boundary.is_crossed_by(boundary.cutoff() - Duration::seconds(1)));
        assert!(!boundary.is_crossed_by(boundary.cutoff() + Duration::seconds(1)));
    }

    #[test]
    fn test_zero_day_lookback_is_crossed_by_now() {
        let now = Utc::now();
        assert!(LookbackBoundary::new(now, 0).is_crossed_by(now));
    }
}
