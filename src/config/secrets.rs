//! Secret handling utilities.
//!
//! Re-exports secrecy types and groups the four OAuth 1.0a values that make
//! up one API identity.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

use crate::error::Result;

/// One API identity: consumer key/secret plus the user's access token pair.
///
/// Debug output is redacted by `SecretString`.
#[derive(Debug)]
pub struct Credentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_token: SecretString,
    pub access_token_secret: SecretString,
}

impl Credentials {
    /// Read `{prefix}CONSUMERKEY`, `{prefix}CONSUMERSECRET`,
    /// `{prefix}ACCESSTOKEN` and `{prefix}ACCESSTOKENSECRET`.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let var = |suffix: &str| -> Result<SecretString> {
            super::required_var(&format!("{prefix}{suffix}")).map(SecretString::from)
        };
        Ok(Self {
            consumer_key: var("CONSUMERKEY")?,
            consumer_secret: var("CONSUMERSECRET")?,
            access_token: var("ACCESSTOKEN")?,
            access_token_secret: var("ACCESSTOKENSECRET")?,
        })
    }
}
