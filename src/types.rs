use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A group visible to the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Group identifier, always held as a string so numeric and textual ids compare equal
    pub id: String,
    /// Display name of the group
    pub name: String,
    /// User id of the group's creator, when the service reports one
    pub creator_user_id: Option<String>,
    /// Current member roster. Empty when the group came from a listing that omits members.
    pub members: Vec<Member>,
}

/// A group-scoped membership record.
///
/// `member_id` is the membership identifier and does not match the user id carried on
/// messages. `nickname` is what messages report as their author name, which makes it the
/// practical join key between the roster and message history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Member {
    pub member_id: String,
    pub user_id: String,
    pub nickname: String,
}

/// A single message from a group's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Message identifier, used as the "before" cursor when paging backwards
    pub id: String,
    /// User id of the author
    pub author_user_id: String,
    /// Nickname of the author at the time the message was sent
    pub author_nickname: String,
    /// Creation time. Likes carry no timestamp of their own and are dated with this too.
    pub created_at: DateTime<Utc>,
    /// User ids of the members who liked the message
    pub favorited_by: Vec<String>,
}

/// One window of messages, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessagePage {
    pub messages: Vec<Message>,
}

impl MessagePage {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The oldest message on the page by creation time. On ties the one appearing later in
    /// the page wins, since pages are ordered newest first.
    pub fn oldest(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .min_by_key(|message| message.created_at)
    }
}

/// Result of asking the archive for a page of history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    /// A normal page with at least one message
    Page(MessagePage),
    /// The start of history was reached; there is nothing older
    Exhausted,
    /// The archive answered with something that cannot be read as a page
    /// (a not-modified answer or a malformed body)
    StaleOrInvalid(String),
}
