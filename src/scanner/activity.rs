//! Folding message history into per-nickname last activity.
//!
//! Two signals count as activity: authoring a message and liking one. A like is dated with
//! the liked message's creation time because the archive does not expose when the like
//! happened.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::identity::IdentityIndex;
use crate::types::Message;

/// Latest known activity per nickname. Entries only ever move forward in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityMap {
    latest: HashMap<String, DateTime<Utc>>,
}

impl ActivityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records activity for `nickname` at `at`. Returns true when the entry moved forward.
    pub fn record(&mut self, nickname: &str, at: DateTime<Utc>) -> bool {
        match self.latest.get_mut(nickname) {
            Some(existing) if *existing >= at => false,
            Some(existing) => {
                *existing = at;
                true
            }
            None => {
                self.latest.insert(nickname.to_string(), at);
                true
            }
        }
    }

    pub fn last_seen(&self, nickname: &str) -> Option<DateTime<Utc>> {
        self.latest.get(nickname).copied()
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

/// Folds every message and every like on it into `activity`.
///
/// Order of `messages` does not matter, and running it again over the same messages
/// changes nothing.
pub fn fold_messages(activity: &mut ActivityMap, messages: &[Message], index: &IdentityIndex) {
    for message in messages {
        tracing::debug!(
            target: "groupme_idle::scanner::activity",
            "Analyzing message: UID {} name: {} date: {}",
            message.author_user_id,
            message.author_nickname,
            message.created_at
        );

        if activity.record(&message.author_nickname, message.created_at) {
            tracing::debug!(
                target: "groupme_idle::scanner::activity",
                "Found more recent activity for user '{}': updating time",
                message.author_nickname
            );
        }

        for reactor in index.reactors(message) {
            if activity.record(&reactor.nickname, message.created_at) {
                tracing::debug!(
                    target: "groupme_idle::scanner::activity",
                    "Found more recent activity for user '{}' (liked a message): updating time",
                    reactor.nickname
                );
            }
        }
    }
}

/// Builds a fresh [`ActivityMap`] from `messages`.
pub fn aggregate_activity(messages: &[Message], index: &IdentityIndex) -> ActivityMap {
    let mut activity = ActivityMap::new();
    fold_messages(&mut activity, messages, index);
    activity
}
