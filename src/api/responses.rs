//! Wire shapes of the GroupMe v3 responses and their conversion into [`crate::types`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Group, Member, Message};

/// Every v3 payload is wrapped as `{"response": ..., "meta": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub response: Option<T>,
}

/// Ids are documented as strings but older endpoints hand out numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Text(String),
    Number(i64),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireGroup {
    pub id: WireId,
    pub name: String,
    #[serde(default)]
    pub creator_user_id: Option<WireId>,
    #[serde(default)]
    pub members: Vec<WireMember>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMember {
    pub id: WireId,
    pub user_id: WireId,
    pub nickname: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessagePage {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    pub id: WireId,
    pub created_at: i64,
    pub user_id: WireId,
    pub name: String,
    #[serde(default)]
    pub favorited_by: Vec<WireId>,
}

impl From<WireMember> for Member {
    fn from(member: WireMember) -> Self {
        Self {
            member_id: member.id.into(),
            user_id: member.user_id.into(),
            nickname: member.nickname,
        }
    }
}

impl From<WireGroup> for Group {
    fn from(group: WireGroup) -> Self {
        Self {
            id: group.id.into(),
            name: group.name,
            creator_user_id: group.creator_user_id.map(String::from),
            members: group.members.into_iter().map(Member::from).collect(),
        }
    }
}

impl WireMessage {
    /// Fails with the offending message id when `created_at` is outside the representable range.
    pub fn into_message(self) -> Result<Message, String> {
        let id = String::from(self.id);
        let created_at: DateTime<Utc> = DateTime::from_timestamp(self.created_at, 0)
            .ok_or_else(|| format!("message {} has invalid created_at {}", id, self.created_at))?;

        Ok(Message {
            id,
            author_user_id: self.user_id.into(),
            author_nickname: self.name,
            created_at,
            favorited_by: self.favorited_by.into_iter().map(String::from).collect(),
        })
    }
}
