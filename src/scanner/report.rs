use chrono::{DateTime, Utc};

use super::activity::ActivityMap;
use super::identity::IdentityIndex;
use super::walker::WalkTerminal;

/// How long ago a member was last seen.
///
/// `NotSeen` covers both "inactive for longer than the window" and "never active"; the
/// scanned history cannot tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastActivity {
    DaysAgo(i64),
    NotSeen { lookback_days: u32 },
}

impl std::fmt::Display for LastActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LastActivity::DaysAgo(days) => write!(f, "{}", days),
            LastActivity::NotSeen { lookback_days } => write!(f, ">{}", lookback_days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub nickname: String,
    pub last_activity: LastActivity,
}

/// Result of an inactivity scan for one group.
#[derive(Debug, Clone)]
pub struct InactivityReport {
    pub group_name: String,
    pub lookback_days: u32,
    /// One row per roster nickname, in roster order
    pub rows: Vec<ReportRow>,
    /// How the history walk ended; a partial walk means some rows may be overstated
    pub walk_terminal: WalkTerminal,
    pub messages_scanned: usize,
}

/// One row per member in the index, whether or not any activity was found for them.
pub fn build_rows(
    index: &IdentityIndex,
    activity: &ActivityMap,
    now: DateTime<Utc>,
    lookback_days: u32,
) -> Vec<ReportRow> {
    index
        .members_by_nickname()
        .map(|(nickname, _)| {
            let last_activity = match activity.last_seen(nickname) {
                // clock skew can put a message slightly in the future
                Some(seen) => LastActivity::DaysAgo((now - seen).num_days().max(0)),
                None => LastActivity::NotSeen { lookback_days },
            };
            ReportRow {
                nickname: nickname.to_string(),
                last_activity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Member;
    use chrono::{Duration, TimeZone};

    fn index(nicknames: &[&str]) -> IdentityIndex {
        let roster: Vec<Member> = nicknames
            .iter()
            .enumerate()
            .map(|(i, nickname)| Member {
                member_id: format!("m{}", i),
                user_id: format!("u{}", i),
                nickname: nickname.to_string(),
            })
            .collect();
        IdentityIndex::build(&roster)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sentinel_renders_with_lookback() {
        assert_eq!(LastActivity::NotSeen { lookback_days: 365 }.to_string(), ">365");
        assert_eq!(LastActivity::DaysAgo(12).to_string(), "12");
    }

    #[test]
    fn test_rows_follow_roster_not_activity() {
        let index = index(&["Zed", "Ann", "Mo"]);
        let mut activity = ActivityMap::new();
        activity.record("Ann", now() - Duration::days(3));
        activity.record("Stranger", now() - Duration::days(1));

        let rows = build_rows(&index, &activity, now(), 30);

        let names: Vec<&str> = rows.iter().map(|r| r.nickname.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Ann", "Mo"]);
        assert_eq!(rows[0].last_activity, LastActivity::NotSeen { lookback_days: 30 });
        assert_eq!(rows[1].last_activity, LastActivity::DaysAgo(3));
    }

    #[test]
    fn test_partial_days_round_down() {
        let index = index(&["Ann"]);
        let mut activity = ActivityMap::new();
        activity.record("Ann", now() - Duration::hours(47));

        let rows = build_rows(&index, &activity, now(), 30);

        assert_eq!(rows[0].last_activity, LastActivity::DaysAgo(1));
    }

    #[test]
    fn test_future_activity_counts_as_today() {
        let index = index(&["Ann"]);
        let mut activity = ActivityMap::new();
        activity.record("Ann", now() + Duration::minutes(5));

        let rows = build_rows(&index, &activity, now(), 30);

        assert_eq!(rows[0].last_activity, LastActivity::DaysAgo(0));
    }

    #[test]
    fn test_empty_roster_produces_no_rows() {
        let mut activity = ActivityMap::new();
        activity.record("Ann", now());
        assert!(build_rows(&index(&[]), &activity, now(), 30).is_empty());
    }
}
