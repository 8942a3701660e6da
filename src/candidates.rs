//! Candidate supply: the sites table and the per-run search order.
//!
//! The sites table is a CSV with a header row and 18 columns per row. Only
//! the domain and state columns drive the loop; the rest ride along in
//! [`SiteDetails`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{CandidateRecord, SiteDetails};
use crate::source::CandidateLoader;

/// Number of columns every sites row must have.
pub const SITE_COLUMNS: usize = 18;

/// Positional layout of one sites row.
#[derive(Debug, Deserialize)]
struct SiteRow {
    aws_origin: String,
    domain: String,
    state: String,
    lat: String,
    lng: String,
    location_verified: String,
    http_response_code: String,
    content_length: String,
    facebook_url: String,
    site_name: String,
    twitter_username: String,
    itunes_app_store_url: String,
    twitter_account_created_at: String,
    twitter_user_id: String,
    twitter_followers: String,
    twitter_following: String,
    twitter_tweets: String,
    site_operator: String,
}

impl From<SiteRow> for CandidateRecord {
    fn from(row: SiteRow) -> Self {
        Self {
            search_key: row.domain,
            locality: row.state,
            details: SiteDetails {
                aws_origin: row.aws_origin,
                lat: row.lat,
                lng: row.lng,
                location_verified: row.location_verified,
                http_response_code: row.http_response_code,
                content_length: row.content_length,
                facebook_url: row.facebook_url,
                site_name: row.site_name,
                twitter_username: row.twitter_username,
                itunes_app_store_url: row.itunes_app_store_url,
                twitter_account_created_at: row.twitter_account_created_at,
                twitter_user_id: row.twitter_user_id,
                twitter_followers: row.twitter_followers,
                twitter_following: row.twitter_following,
                twitter_tweets: row.twitter_tweets,
                site_operator: row.site_operator,
            },
        }
    }
}

/// Parse a sites table. The first row is a header and is discarded.
///
/// Any row without exactly [`SITE_COLUMNS`] fields fails the whole parse;
/// nothing is returned for the rows before it.
pub fn parse_candidates<R: Read>(reader: R) -> Result<Vec<CandidateRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut candidates = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // +1 for the header, +1 for 1-based line numbers.
        let line = i + 2;
        if record.len() != SITE_COLUMNS {
            return Err(Error::Format(format!(
                "sites row {line}: expected {SITE_COLUMNS} fields, found {}",
                record.len()
            )));
        }
        let row: SiteRow = record.deserialize(None)?;
        candidates.push(row.into());
    }

    info!(candidates = candidates.len(), "parsed sites table");
    Ok(candidates)
}

/// Parse a sites table from a local file.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateRecord>> {
    let file = std::fs::File::open(path)?;
    parse_candidates(file)
}

/// Uniformly permute the candidates.
pub fn shuffle<R: rand::Rng + ?Sized>(
    mut candidates: Vec<CandidateRecord>,
    rng: &mut R,
) -> Vec<CandidateRecord> {
    candidates.shuffle(rng);
    candidates
}

/// RNG seeded from the wall clock, once per process.
pub fn time_seeded_rng() -> StdRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    StdRng::seed_from_u64(nanos)
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Reads an already-present sites file.
pub struct LocalCandidates {
    pub path: PathBuf,
}

#[async_trait]
impl CandidateLoader for LocalCandidates {
    async fn load(&self) -> Result<Vec<CandidateRecord>> {
        load_candidates(&self.path)
    }
}

/// Downloads the sites file to a local cache path, then parses it.
pub struct RemoteCandidates {
    client: reqwest::Client,
    url: String,
    cache_path: PathBuf,
}

impl RemoteCandidates {
    pub fn new(url: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            cache_path: cache_path.into(),
        }
    }

    /// Stream the remote file to the cache path.
    pub async fn download(&self) -> Result<()> {
        info!(url = %self.url, path = %self.cache_path.display(), "downloading sites table");

        let mut response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "GET {} returned {}",
                self.url,
                response.status()
            )));
        }

        let mut out = tokio::fs::File::create(&self.cache_path).await?;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk).await?;
        }
        out.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl CandidateLoader for RemoteCandidates {
    async fn load(&self) -> Result<Vec<CandidateRecord>> {
        self.download().await?;
        load_candidates(&self.cache_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "awsOrigin,domain,state,lat,lng,locationVerified,httpResponseCode,contentLength,facebookUrl,siteName,twitterUsername,itunesAppStoreUrl,twitterAccountCreatedAt,twitterUserId,twitterFollowers,twitterFollowing,twitterTweets,siteOperator";

    fn row(domain: &str, state: &str) -> String {
        format!(
            "a,{domain},{state},41.5,-81.7,true,200,1234,https://fb.example/{domain},Site,handle,,2019,777,10,20,30,Operator"
        )
    }

    #[test]
    fn parses_rows_and_skips_header() {
        let csv = format!("{HEADER}\n{}\n{}\n", row("a.com", "Ohio"), row("b.com", ""));
        let candidates = parse_candidates(csv.as_bytes()).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].search_key, "a.com");
        assert_eq!(candidates[0].locality, "Ohio");
        assert_eq!(candidates[0].details.twitter_user_id, "777");
        assert_eq!(candidates[0].details.twitter_account_created_at, "2019");
        assert_eq!(candidates[1].locality, "");
    }

    #[test]
    fn short_row_is_a_format_error() {
        let csv = format!("{HEADER}\n{}\na,c.com,Ohio\n", row("a.com", "Ohio"));
        let err = parse_candidates(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");
    }

    #[test]
    fn header_only_yields_nothing() {
        let candidates = parse_candidates(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn seeded_shuffle_is_deterministic_permutation() {
        let input: Vec<_> = (0..20)
            .map(|i| CandidateRecord::new(format!("site{i}.com"), ""))
            .collect();

        let a = shuffle(input.clone(), &mut StdRng::seed_from_u64(7));
        let b = shuffle(input.clone(), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);

        let mut sorted: Vec<_> = a.iter().map(|c| c.search_key.clone()).collect();
        sorted.sort();
        let mut expected: Vec<_> = input.iter().map(|c| c.search_key.clone()).collect();
        expected.sort();
        assert_eq!(sorted, expected);
    }
}
