//! Backward walk through a group's message history.
//!
//! The archive can only be paged towards older messages, so the walk starts at the newest
//! page and uses the oldest message seen so far as the cursor for the next request. Fetches
//! are strictly sequential since every cursor depends on the previous answer.
//!
//! ```text
//! Initial -> Fetching -> HavePage -> Fetching -> ... -> BoundaryCrossed
//!                 |                     |
//!                 +-> Exhausted         +-> ErrorStopped (cursor did not move)
//!                 +-> ErrorStopped (stale/invalid answer, transport failure)
//! ```

use chrono::{DateTime, Utc};

use super::boundary::LookbackBoundary;
use crate::api::MessageArchive;
use crate::error::Result;
use crate::types::{Message, PageFetch};

/// Why a walk ended before reaching the boundary or the start of history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The archive answered with something that is not a page
    StaleOrInvalid(String),
    /// A fetch did not move the cursor; continuing would request it again
    NoProgress { cursor: String },
    /// A later fetch failed outright
    Transport(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::StaleOrInvalid(reason) => {
                write!(f, "stale or invalid archive response: {}", reason)
            }
            StopReason::NoProgress { cursor } => {
                write!(f, "pagination made no progress past message {}", cursor)
            }
            StopReason::Transport(reason) => write!(f, "archive request failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkState {
    Initial,
    Fetching { before: Option<String> },
    HavePage,
    BoundaryCrossed,
    Exhausted,
    ErrorStopped(StopReason),
}

/// Terminal state of a finished walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkTerminal {
    BoundaryCrossed,
    Exhausted,
    Stopped(StopReason),
}

impl WalkTerminal {
    /// True when the walk ended early and the collected history may be incomplete.
    pub fn is_partial(&self) -> bool {
        matches!(self, WalkTerminal::Stopped(_))
    }
}

#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// Every message collected, newest page first
    pub messages: Vec<Message>,
    pub terminal: WalkTerminal,
    /// Number of archive requests issued
    pub fetches: usize,
    /// Creation time of the oldest message collected
    pub oldest: Option<DateTime<Utc>>,
}

pub struct HistoryWalker<'a, A: MessageArchive + ?Sized> {
    archive: &'a A,
    group_id: &'a str,
    page_size: u32,
    boundary: LookbackBoundary,
}

impl<'a, A: MessageArchive + ?Sized> HistoryWalker<'a, A> {
    pub fn new(
        archive: &'a A,
        group_id: &'a str,
        page_size: u32,
        boundary: LookbackBoundary,
    ) -> Self {
        Self {
            archive,
            group_id,
            page_size,
            boundary,
        }
    }

    /// Runs the walk to a terminal state.
    ///
    /// Only a failure of the very first request is returned as an error; anything that goes
    /// wrong afterwards ends the walk with the messages gathered so far.
    pub async fn walk(self) -> Result<WalkOutcome> {
        let mut state = WalkState::Initial;
        let mut messages: Vec<Message> = Vec::new();
        let mut oldest: Option<(String, DateTime<Utc>)> = None;
        let mut last_cursor: Option<String> = None;
        let mut fetches = 0usize;

        let terminal = loop {
            state = match state {
                WalkState::Initial => WalkState::Fetching { before: None },

                WalkState::Fetching { before } => {
                    fetches += 1;
                    let fetched = match before.as_deref() {
                        None => {
                            self.archive
                                .fetch_most_recent_page(self.group_id, self.page_size)
                                .await
                        }
                        Some(cursor) => {
                            self.archive
                                .fetch_page_before(self.group_id, cursor, self.page_size)
                                .await
                        }
                    };
                    last_cursor = before;

                    match fetched {
                        Ok(PageFetch::Page(page)) if !page.is_empty() => {
                            if let Some(page_oldest) = page.oldest() {
                                let older = oldest
                                    .as_ref()
                                    .is_none_or(|(_, at)| page_oldest.created_at <= *at);
                                if older {
                                    oldest = Some((page_oldest.id.clone(), page_oldest.created_at));
                                }
                            }
                            messages.extend(page.messages);

                            if let Some((_, at)) = &oldest {
                                tracing::info!(
                                    target: "groupme_idle::scanner::walker",
                                    "{} messages loaded, oldest dated {}",
                                    messages.len(),
                                    at
                                );
                            }
                            WalkState::HavePage
                        }
                        Ok(PageFetch::Page(_)) | Ok(PageFetch::Exhausted) => {
                            tracing::info!(
                                target: "groupme_idle::scanner::walker",
                                "Reached the start of group history after {} messages",
                                messages.len()
                            );
                            WalkState::Exhausted
                        }
                        Ok(PageFetch::StaleOrInvalid(reason)) => {
                            WalkState::ErrorStopped(StopReason::StaleOrInvalid(reason))
                        }
                        Err(e) if fetches == 1 => return Err(e.into()),
                        Err(e) => WalkState::ErrorStopped(StopReason::Transport(e.to_string())),
                    }
                }

                WalkState::HavePage => match &oldest {
                    None => WalkState::Exhausted,
                    Some((_, at)) if self.boundary.is_crossed_by(*at) => WalkState::BoundaryCrossed,
                    Some((id, _)) if last_cursor.as_deref() == Some(id.as_str()) => {
                        WalkState::ErrorStopped(StopReason::NoProgress { cursor: id.clone() })
                    }
                    Some((id, _)) => WalkState::Fetching {
                        before: Some(id.clone()),
                    },
                },

                WalkState::BoundaryCrossed => break WalkTerminal::BoundaryCrossed,
                WalkState::Exhausted => break WalkTerminal::Exhausted,
                WalkState::ErrorStopped(reason) => {
                    tracing::warn!(
                        target: "groupme_idle::scanner::walker",
                        "Stopping history walk early ({}), proceeding with {} messages",
                        reason,
                        messages.len()
                    );
                    break WalkTerminal::Stopped(reason);
                }
            };
        };

        let oldest = oldest.map(|(_, at)| at);
        tracing::debug!(
            target: "groupme_idle::scanner::walker",
            "Final: {} messages loaded in {} fetches, oldest dated {:?}",
            messages.len(),
            fetches,
            oldest
        );

        Ok(WalkOutcome {
            messages,
            terminal,
            fetches,
            oldest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{self, ApiError};
    use crate::types::MessagePage;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Archive answering from a script and recording the cursor of every request.
    struct ScriptedArchive {
        answers: Mutex<VecDeque<api::Result<PageFetch>>>,
        cursors: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedArchive {
        fn new(answers: Vec<api::Result<PageFetch>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, cursor: Option<&str>) -> api::Result<PageFetch> {
            self.cursors.lock().unwrap().push(cursor.map(str::to_string));
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(PageFetch::Exhausted))
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageArchive for ScriptedArchive {
        async fn fetch_most_recent_page(
            &self,
            _group_id: &str,
            _page_size: u32,
        ) -> api::Result<PageFetch> {
            self.next(None)
        }

        async fn fetch_page_before(
            &self,
            _group_id: &str,
            before_id: &str,
            _page_size: u32,
        ) -> api::Result<PageFetch> {
            self.next(Some(before_id))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn message(id: u32, days_ago: i64) -> Message {
        Message {
            id: id.to_string(),
            author_user_id: "u1".to_string(),
            author_nickname: "Ann".to_string(),
            created_at: now() - Duration::days(days_ago),
            favorited_by: vec![],
        }
    }

    fn page(messages: Vec<Message>) -> api::Result<PageFetch> {
        Ok(PageFetch::Page(MessagePage::new(messages)))
    }

    async fn walk(archive: &ScriptedArchive, lookback_days: u32) -> WalkOutcome {
        HistoryWalker::new(archive, "g1", 2, LookbackBoundary::new(now(), lookback_days))
            .walk()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_stops_once_boundary_is_crossed() {
        let archive = ScriptedArchive::new(vec![
            page(vec![message(6, 1), message(5, 3)]),
            page(vec![message(4, 8), message(3, 12)]),
            page(vec![message(2, 40), message(1, 50)]),
        ]);

        let outcome = walk(&archive, 10).await;

        assert_eq!(outcome.terminal, WalkTerminal::BoundaryCrossed);
        assert_eq!(outcome.fetches, 2);
        assert_eq!(outcome.messages.len(), 4);
        assert_eq!(outcome.oldest, Some(now() - Duration::days(12)));
        assert_eq!(archive.cursors(), vec![None, Some("5".to_string())]);
    }

    #[tokio::test]
    async fn test_first_page_already_past_boundary() {
        let archive = ScriptedArchive::new(vec![page(vec![message(2, 1), message(1, 400)])]);

        let outcome = walk(&archive, 365).await;

        assert_eq!(outcome.terminal, WalkTerminal::BoundaryCrossed);
        assert_eq!(outcome.fetches, 1);
    }

    #[tokio::test]
    async fn test_exhausted_before_boundary() {
        let archive = ScriptedArchive::new(vec![
            page(vec![message(4, 1), message(3, 2)]),
            page(vec![message(2, 3)]),
            Ok(PageFetch::Exhausted),
        ]);

        let outcome = walk(&archive, 30).await;

        assert_eq!(outcome.terminal, WalkTerminal::Exhausted);
        assert_eq!(outcome.messages.len(), 3);
        assert_eq!(
            archive.cursors(),
            vec![None, Some("3".to_string()), Some("2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_group_is_exhausted_immediately() {
        let archive = ScriptedArchive::new(vec![Ok(PageFetch::Exhausted)]);

        let outcome = walk(&archive, 30).await;

        assert_eq!(outcome.terminal, WalkTerminal::Exhausted);
        assert!(outcome.messages.is_empty());
        assert_eq!(outcome.oldest, None);
    }

    #[tokio::test]
    async fn test_stale_response_keeps_collected_messages() {
        let archive = ScriptedArchive::new(vec![
            page(vec![message(4, 1), message(3, 2)]),
            Ok(PageFetch::StaleOrInvalid("304".to_string())),
        ]);

        let outcome = walk(&archive, 30).await;

        assert_eq!(
            outcome.terminal,
            WalkTerminal::Stopped(StopReason::StaleOrInvalid("304".to_string()))
        );
        assert!(outcome.terminal.is_partial());
        assert_eq!(outcome.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_cursor_stops_the_walk() {
        // upstream answers the same page again instead of older history
        let archive = ScriptedArchive::new(vec![
            page(vec![message(4, 1), message(3, 2)]),
            page(vec![message(4, 1), message(3, 2)]),
            page(vec![message(4, 1), message(3, 2)]),
        ]);

        let outcome = walk(&archive, 30).await;

        assert_eq!(
            outcome.terminal,
            WalkTerminal::Stopped(StopReason::NoProgress {
                cursor: "3".to_string()
            })
        );
        assert_eq!(outcome.fetches, 2);
        let cursors = archive.cursors();
        assert!(cursors.windows(2).all(|pair| pair[0] != pair[1]));
    }

    #[tokio::test]
    async fn test_newer_page_does_not_move_cursor_forward() {
        let archive = ScriptedArchive::new(vec![
            page(vec![message(4, 1), message(3, 5)]),
            page(vec![message(9, 0)]),
        ]);

        let outcome = walk(&archive, 30).await;

        assert!(matches!(
            outcome.terminal,
            WalkTerminal::Stopped(StopReason::NoProgress { .. })
        ));
        assert_eq!(outcome.oldest, Some(now() - Duration::days(5)));
    }

    #[tokio::test]
    async fn test_first_fetch_failure_is_an_error() {
        let archive = ScriptedArchive::new(vec![Err(ApiError::Status {
            status: 401,
            body: "unauthorized".to_string(),
        })]);

        let result = HistoryWalker::new(&archive, "g1", 2, LookbackBoundary::new(now(), 30))
            .walk()
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_later_fetch_failure_degrades() {
        let archive = ScriptedArchive::new(vec![
            page(vec![message(2, 1), message(1, 2)]),
            Err(ApiError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }),
        ]);

        let outcome = walk(&archive, 30).await;

        assert!(matches!(
            outcome.terminal,
            WalkTerminal::Stopped(StopReason::Transport(_))
        ));
        assert_eq!(outcome.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_count_bounded_by_relevant_pages() {
        let page_size = 2usize;
        // 7 messages inside a 30 day window, then older history
        let mut script = Vec::new();
        let mut id = 100;
        let ages = [1, 2, 3, 4, 5, 6, 7, 45, 46, 47];
        for chunk in ages.chunks(page_size) {
            let messages = chunk
                .iter()
                .map(|age| {
                    id -= 1;
                    message(id, *age)
                })
                .collect();
            script.push(page(messages));
        }
        let archive = ScriptedArchive::new(script);

        let outcome = walk(&archive, 30).await;

        let relevant = 7usize;
        assert_eq!(outcome.terminal, WalkTerminal::BoundaryCrossed);
        assert!(outcome.fetches <= relevant.div_ceil(page_size) + 1);
    }
}
