//! Roster lookups used to correlate message activity with members.
//!
//! Messages name their author by nickname and their likers by user id, while the roster is
//! keyed by membership id. Nicknames are not guaranteed unique by the service; when two
//! members share one, the later roster entry replaces the earlier one in place.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::types::{Member, Message};

#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    by_member_id: IndexMap<String, Member>,
    by_nickname: IndexMap<String, Member>,
    by_user_id: HashMap<String, Member>,
}

impl IdentityIndex {
    pub fn build(roster: &[Member]) -> Self {
        let mut index = Self::default();

        for member in roster {
            tracing::debug!(
                target: "groupme_idle::scanner::identity",
                "Indexing member ID {} ({})",
                member.member_id,
                member.nickname
            );

            if let Some(previous) = index
                .by_nickname
                .insert(member.nickname.clone(), member.clone())
            {
                tracing::debug!(
                    target: "groupme_idle::scanner::identity",
                    "Nickname '{}' shared by members {} and {}, keeping {}",
                    member.nickname,
                    previous.member_id,
                    member.member_id,
                    member.member_id
                );
            }
            index
                .by_member_id
                .insert(member.member_id.clone(), member.clone());
            index
                .by_user_id
                .insert(member.user_id.clone(), member.clone());
        }

        index
    }

    pub fn by_member_id(&self, member_id: &str) -> Option<&Member> {
        self.by_member_id.get(member_id)
    }

    pub fn by_nickname(&self, nickname: &str) -> Option<&Member> {
        self.by_nickname.get(nickname)
    }

    pub fn by_user_id(&self, user_id: &str) -> Option<&Member> {
        self.by_user_id.get(user_id)
    }

    /// Members keyed by nickname, in roster order.
    pub fn members_by_nickname(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.by_nickname
            .iter()
            .map(|(nickname, member)| (nickname.as_str(), member))
    }

    /// Roster members who liked `message`. Likes from users outside the roster are skipped.
    pub fn reactors<'a>(&'a self, message: &'a Message) -> impl Iterator<Item = &'a Member> + 'a {
        message.favorited_by.iter().filter_map(move |user_id| {
            let member = self.by_user_id(user_id);
            if member.is_none() {
                tracing::debug!(
                    target: "groupme_idle::scanner::identity",
                    "Like on message {} from user {} who is not in the roster",
                    message.id,
                    user_id
                );
            }
            member
        })
    }

    /// Number of distinct nicknames, which is the number of rows a report will have.
    pub fn len(&self) -> usize {
        self.by_nickname.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_nickname.is_empty()
    }
}
