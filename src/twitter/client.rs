//! Minimal REST v1.1 client bound to a single identity.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, info};

use super::oauth;
use crate::config::secrets::Credentials;
use crate::error::{Error, Result};
use crate::model::{ObservedItem, PostReceipt};

/// Account returned by `account/verify_credentials`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id_str: String,
    pub screen_name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    statuses: Vec<Status>,
}

#[derive(Debug, Deserialize)]
struct User {
    screen_name: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    id_str: String,
    user: User,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    favorite_count: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    quote_count: u64,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    retweeted_status: Option<IgnoredAny>,
}

impl From<Status> for ObservedItem {
    fn from(s: Status) -> Self {
        Self {
            id: s.id_str,
            author: s.user.screen_name,
            is_reshare: s.retweeted_status.is_some(),
            created_at: s.created_at,
            favorite_count: s.favorite_count,
            reply_count: s.reply_count,
            reshare_count: s.retweet_count,
            quote_count: s.quote_count,
            text: s.full_text.or(s.text).unwrap_or_default(),
        }
    }
}

pub struct TwitterClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl TwitterClient {
    /// `base_url` is the API root, e.g. `https://api.twitter.com/1.1`.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Check that the credentials are accepted and return the account.
    pub async fn verify_credentials(&self) -> Result<Account> {
        let account: Account = self
            .get(
                "account/verify_credentials.json",
                &[
                    ("include_email", "true".to_string()),
                    ("skip_status", "true".to_string()),
                ],
            )
            .await?;
        info!(account = %account.screen_name, id = %account.id_str, "credentials verified");
        Ok(account)
    }

    /// Search recent statuses mentioning `query`.
    pub async fn search(&self, query: &str, count: u32) -> Result<Vec<ObservedItem>> {
        let response: SearchResponse = self
            .get(
                "search/tweets.json",
                &[
                    ("count", count.to_string()),
                    ("q", query.to_string()),
                    ("tweet_mode", "extended".to_string()),
                ],
            )
            .await?;
        debug!(query, found = response.statuses.len(), "search complete");
        Ok(response.statuses.into_iter().map(ObservedItem::from).collect())
    }

    /// Post `text` as a reply to status `in_reply_to`.
    pub async fn update_status(&self, text: &str, in_reply_to: &str) -> Result<PostReceipt> {
        let status: Status = self
            .post_form(
                "statuses/update.json",
                &[
                    ("in_reply_to_status_id", in_reply_to.to_string()),
                    ("status", text.to_string()),
                ],
            )
            .await?;
        Ok(PostReceipt {
            id: status.id_str,
            author: status.user.screen_name,
        })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        let header = oauth::authorization_header(&self.credentials, "GET", &url, params);
        let full_url = if params.is_empty() {
            url
        } else {
            format!("{url}?{}", oauth::encode_pairs(params))
        };

        let response = self
            .http
            .get(&full_url)
            .header(AUTHORIZATION, header)
            .send()
            .await?;
        decode(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        let header = oauth::authorization_header(&self.credentials, "POST", &url, params);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, header)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(oauth::encode_pairs(params))
            .send()
            .await?;
        decode(response).await
    }
}

/// Map HTTP status to the error taxonomy, then decode the JSON body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Error::Auth(format!("{status}: {body}"))
            }
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimit(format!("{status}: {body}")),
            _ => Error::Network(format!("{status}: {body}")),
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Format(format!("bad response body: {e}")))
}
