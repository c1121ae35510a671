//! Remote collaborators of the scanner.
//!
//! The scanner only ever talks to the two traits defined here. [`GroupMeClient`] implements
//! both against the GroupMe v3 REST API; tests substitute in-memory fakes.

mod client;
mod responses;

pub use client::GroupMeClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Group, Member, PageFetch};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response envelope had no payload")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Lists the groups visible to the caller and their rosters.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Current member roster of `group`.
    async fn members(&self, group: &Group) -> Result<Vec<Member>>;
}

/// Reverse-chronological, cursor-paged access to a group's messages.
///
/// Anomalies that still leave the archive reachable are reported as
/// [`PageFetch::StaleOrInvalid`], not as errors.
#[async_trait]
pub trait MessageArchive: Send + Sync {
    async fn fetch_most_recent_page(&self, group_id: &str, page_size: u32) -> Result<PageFetch>;

    async fn fetch_page_before(
        &self,
        group_id: &str,
        before_id: &str,
        page_size: u32,
    ) -> Result<PageFetch>;
}
