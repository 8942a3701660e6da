//! Core data model.
//!
//! A candidate is one site to search for. An observed item is one search hit
//! for that site. A ledger entry is the permanent record that we replied to
//! an observed item, keyed by the item's id.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// One subject to search for during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    /// Query sent to the item source (a site domain).
    pub search_key: String,

    /// Locality tag (a US state). Empty means "no location".
    pub locality: String,

    /// Remaining columns of the source row. Carried for logging only.
    pub details: SiteDetails,
}

impl CandidateRecord {
    pub fn new(search_key: impl Into<String>, locality: impl Into<String>) -> Self {
        Self {
            search_key: search_key.into(),
            locality: locality.into(),
            details: SiteDetails::default(),
        }
    }

    pub fn has_locality(&self) -> bool {
        !self.locality.is_empty()
    }
}

/// Pass-through columns of a sites table row.
///
/// None of these influence the action loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDetails {
    pub aws_origin: String,
    pub lat: String,
    pub lng: String,
    pub location_verified: String,
    pub http_response_code: String,
    pub content_length: String,
    pub facebook_url: String,
    pub site_name: String,
    pub twitter_username: String,
    pub itunes_app_store_url: String,
    pub twitter_account_created_at: String,
    pub twitter_user_id: String,
    pub twitter_followers: String,
    pub twitter_following: String,
    pub twitter_tweets: String,
    pub site_operator: String,
}

// ---------------------------------------------------------------------------
// Observed item
// ---------------------------------------------------------------------------

/// One item returned by the item source for a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedItem {
    /// Dedup key.
    pub id: String,
    /// Author handle, without the leading `@`.
    pub author: String,
    /// True when the item is a re-share of another item.
    pub is_reshare: bool,
    pub created_at: String,
    pub favorite_count: u64,
    pub reply_count: u64,
    pub reshare_count: u64,
    pub quote_count: u64,
    pub text: String,
}

impl ObservedItem {
    /// Public URL of the item, for log lines.
    pub fn url(&self) -> String {
        format!("https://twitter.com/{}/status/{}", self.author, self.id)
    }
}

// ---------------------------------------------------------------------------
// Post receipt
// ---------------------------------------------------------------------------

/// What the action sink hands back after a successful post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    /// Id of the reply itself.
    pub id: String,
    /// Handle of the account that posted it.
    pub author: String,
}

impl PostReceipt {
    pub fn url(&self) -> String {
        format!("https://twitter.com/{}/status/{}", self.author, self.id)
    }
}

// ---------------------------------------------------------------------------
// Ledger entry
// ---------------------------------------------------------------------------

/// Permanent record that a reply was posted for an item.
///
/// Field order is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub user_name: String,
    pub domain: String,
    pub reply_tweet_id: String,
    /// Id of the item replied to. Unique across the ledger.
    pub id_str: String,
    pub created_at: String,
    pub favorite_count: String,
    pub reply_count: String,
    pub retweet_count: String,
    pub quote_count: String,
    pub full_text: String,
}

impl LedgerEntry {
    /// Build the record for a reply to `item`, found while searching for
    /// `candidate`.
    pub fn for_reply(candidate: &CandidateRecord, item: &ObservedItem, reply: &PostReceipt) -> Self {
        Self {
            user_name: item.author.clone(),
            domain: candidate.search_key.clone(),
            reply_tweet_id: reply.id.clone(),
            id_str: item.id.clone(),
            created_at: item.created_at.clone(),
            favorite_count: item.favorite_count.to_string(),
            reply_count: item.reply_count.to_string(),
            retweet_count: item.reshare_count.to_string(),
            quote_count: item.quote_count.to_string(),
            full_text: item.text.clone(),
        }
    }
}
