//! Boundaries between the action loop and the outside world.
//!
//! The loop only ever sees these traits. Search and post are deliberately
//! separate so that each can be backed by its own credentials.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{CandidateRecord, ObservedItem, PostReceipt};

/// Finds items mentioning a query.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Up to `limit` items matching `query`, in source order.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<ObservedItem>>;
}

/// Performs the externally visible side effect: posting a reply.
#[async_trait]
pub trait ActionSink: Send + Sync {
    /// Post `text` as a reply to the item `in_reply_to`.
    async fn post(&self, text: &str, in_reply_to: &str) -> Result<PostReceipt>;
}

/// Produces the candidate list for a run.
#[async_trait]
pub trait CandidateLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<CandidateRecord>>;
}
