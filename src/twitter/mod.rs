//! Twitter REST collaborators.
//!
//! One [`TwitterClient`] per identity. The search identity is only ever
//! exposed as an [`ItemSource`] and the posting identity only as an
//! [`ActionSink`].

pub mod client;
pub mod oauth;

pub use client::{Account, TwitterClient};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{ObservedItem, PostReceipt};
use crate::source::{ActionSink, ItemSource};

/// Search-only capability.
pub struct SearchHandle(TwitterClient);

impl SearchHandle {
    pub fn new(client: TwitterClient) -> Self {
        Self(client)
    }

    pub async fn verify(&self) -> Result<Account> {
        self.0.verify_credentials().await
    }
}

#[async_trait]
impl ItemSource for SearchHandle {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<ObservedItem>> {
        self.0.search(query, limit).await
    }
}

/// Post-only capability.
pub struct PostHandle(TwitterClient);

impl PostHandle {
    pub fn new(client: TwitterClient) -> Self {
        Self(client)
    }

    pub async fn verify(&self) -> Result<Account> {
        self.0.verify_credentials().await
    }
}

#[async_trait]
impl ActionSink for PostHandle {
    async fn post(&self, text: &str, in_reply_to: &str) -> Result<PostReceipt> {
        self.0.update_status(text, in_reply_to).await
    }
}
