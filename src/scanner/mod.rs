//! Inactivity scanning
//!
//! Resolves a group, indexes its roster, walks message history back to the lookback
//! boundary and reports how many days ago each member was last active. Members are matched
//! to messages by nickname because message author ids do not line up with membership ids.

mod activity;
mod boundary;
mod identity;
mod report;
mod resolver;
mod walker;


pub use activity::{ActivityMap, aggregate_activity, fold_messages};
pub use boundary::LookbackBoundary;
pub use identity::IdentityIndex;
pub use report::{InactivityReport, LastActivity, ReportRow, build_rows};
pub use resolver::resolve_group;
pub use walker::{HistoryWalker, StopReason, WalkOutcome, WalkState, WalkTerminal};

use chrono::{DateTime, Utc};

use crate::api::{GroupDirectory, MessageArchive};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::types::{Group, Member};

/// Row of the membership listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub member_id: String,
    pub nickname: String,
}

#[derive(Debug, Clone)]
pub struct MembershipListing {
    pub group: Group,
    pub rows: Vec<MemberRow>,
}

/// Lists the current members of `group_id`, in roster order.
pub async fn list_members<D>(directory: &D, group_id: &str) -> Result<MembershipListing>
where
    D: GroupDirectory + ?Sized,
{
    let (group, roster) = resolve_with_roster(directory, group_id).await?;
    let rows = roster
        .into_iter()
        .map(|member| MemberRow {
            member_id: member.member_id,
            nickname: member.nickname,
        })
        .collect();
    Ok(MembershipListing { group, rows })
}

async fn resolve_with_roster<D>(directory: &D, group_id: &str) -> Result<(Group, Vec<Member>)>
where
    D: GroupDirectory + ?Sized,
{
    tracing::debug!(target: "groupme_idle::scanner", "Loading list of GroupMe groups...");
    let groups = directory.list_groups().await?;
    tracing::debug!(target: "groupme_idle::scanner", "{} GroupMe groups loaded", groups.len());

    let group = resolve_group(&groups, group_id)?.clone();
    // listings only carry the members the caller has seen; ask for the group's own roster
    let roster = directory.members(&group).await?;
    Ok((group, roster))
}

/// Drives one inactivity scan against a directory and an archive.
pub struct InactivityScanner<'a, D: ?Sized, A: ?Sized> {
    directory: &'a D,
    archive: &'a A,
    config: ScanConfig,
}

impl<'a, D, A> InactivityScanner<'a, D, A>
where
    D: GroupDirectory + ?Sized,
    A: MessageArchive + ?Sized,
{
    pub fn new(directory: &'a D, archive: &'a A, config: ScanConfig) -> Self {
        Self {
            directory,
            archive,
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub async fn scan(&self, group_id: &str) -> Result<InactivityReport> {
        self.scan_at(group_id, Utc::now()).await
    }

    /// Same as [`Self::scan`] with an explicit notion of "now".
    pub async fn scan_at(&self, group_id: &str, now: DateTime<Utc>) -> Result<InactivityReport> {
        let boundary = LookbackBoundary::new(now, self.config.lookback_days);
        tracing::info!(
            target: "groupme_idle::scanner",
            "Will check for messages newer than {} ({} days ago)",
            boundary.cutoff(),
            self.config.lookback_days
        );

        let (group, roster) = resolve_with_roster(self.directory, group_id).await?;
        let index = IdentityIndex::build(&roster);
        tracing::info!(
            target: "groupme_idle::scanner",
            "Done indexing {} members of {}. Checking old messages.",
            roster.len(),
            group.name
        );

        let outcome = HistoryWalker::new(self.archive, &group.id, self.config.page_size, boundary)
            .walk()
            .await?;
        let activity = aggregate_activity(&outcome.messages, &index);
        let rows = build_rows(&index, &activity, now, self.config.lookback_days);

        Ok(InactivityReport {
            group_name: group.name,
            lookback_days: self.config.lookback_days,
            rows,
            walk_terminal: outcome.terminal,
            messages_scanned: outcome.messages.len(),
        })
    }
}
