use async_trait::async_trait;
use reqwest::StatusCode;

use super::responses::{Envelope, WireGroup, WireMember, WireMessagePage};
use super::{ApiError, GroupDirectory, MessageArchive, Result};
use crate::config::ClientConfig;
use crate::types::{Group, Member, MessagePage, PageFetch};

/// Groups requested per listing page
const GROUPS_PER_PAGE: usize = 100;

/// `reqwest` backed implementation of the directory and archive traits.
#[derive(Debug, Clone)]
pub struct GroupMeClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GroupMeClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(target: "groupme_idle::api::client", "GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .header("X-Access-Token", &self.token)
            .query(query)
            .send()
            .await?;
        Ok(response)
    }

    async fn get_payload<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.get(path, query).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        envelope.response.ok_or(ApiError::EmptyResponse)
    }

    async fn fetch_messages(
        &self,
        group_id: &str,
        before_id: Option<&str>,
        page_size: u32,
    ) -> Result<PageFetch> {
        let mut query = vec![("limit", page_size.to_string())];
        if let Some(before_id) = before_id {
            query.push(("before_id", before_id.to_string()));
        }

        let response = self
            .get(&format!("/groups/{}/messages", group_id), &query)
            .await?;
        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            return Ok(PageFetch::StaleOrInvalid(
                "archive answered 304 Not Modified".to_string(),
            ));
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(classify_message_body(&body))
    }
}

/// Turns a successful messages response body into a [`PageFetch`].
fn classify_message_body(body: &str) -> PageFetch {
    let envelope: Envelope<WireMessagePage> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => return PageFetch::StaleOrInvalid(format!("undecodable message page: {}", e)),
    };

    let Some(page) = envelope.response else {
        return PageFetch::StaleOrInvalid("message page without a response payload".to_string());
    };

    if page.messages.is_empty() {
        return PageFetch::Exhausted;
    }

    match page
        .messages
        .into_iter()
        .map(|message| message.into_message())
        .collect::<std::result::Result<Vec<_>, _>>()
    {
        Ok(messages) => PageFetch::Page(MessagePage::new(messages)),
        Err(reason) => PageFetch::StaleOrInvalid(reason),
    }
}

#[async_trait]
impl GroupDirectory for GroupMeClient {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups = Vec::new();
        let mut page = 1usize;

        loop {
            let batch: Vec<WireGroup> = self
                .get_payload(
                    "/groups",
                    &[
                        ("page", page.to_string()),
                        ("per_page", GROUPS_PER_PAGE.to_string()),
                    ],
                )
                .await?;
            let batch_len = batch.len();
            groups.extend(batch.into_iter().map(Group::from));

            tracing::debug!(
                target: "groupme_idle::api::client::list_groups",
                "Loaded group page {} ({} groups)",
                page,
                batch_len
            );

            if batch_len < GROUPS_PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(groups)
    }

    async fn members(&self, group: &Group) -> Result<Vec<Member>> {
        #[derive(serde::Deserialize)]
        struct GroupMembers {
            #[serde(default)]
            members: Vec<WireMember>,
        }

        let detail: GroupMembers = self
            .get_payload(&format!("/groups/{}", group.id), &[])
            .await?;
        Ok(detail.members.into_iter().map(Member::from).collect())
    }
}

#[async_trait]
impl MessageArchive for GroupMeClient {
    async fn fetch_most_recent_page(&self, group_id: &str, page_size: u32) -> Result<PageFetch> {
        self.fetch_messages(group_id, None, page_size).await
    }

    async fn fetch_page_before(
        &self,
        group_id: &str,
        before_id: &str,
        page_size: u32,
    ) -> Result<PageFetch> {
        self.fetch_messages(group_id, Some(before_id), page_size)
            .await
    }
}
