//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Every request carries an `Authorization: OAuth ...` header whose
//! signature covers the method, the base URL and all query/body parameters.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::ExposeSecret;
use sha1::Sha1;

use crate::config::secrets::Credentials;

/// RFC 3986 unreserved characters stay literal; everything else is escaped.
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, RFC3986).to_string()
}

/// Encode `k=v&k=v` for a query string or form body.
pub fn encode_pairs(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the `Authorization` header value for a request.
pub fn authorization_header(
    credentials: &Credentials,
    method: &str,
    url: &str,
    params: &[(&str, String)],
) -> String {
    let nonce: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let timestamp = chrono::Utc::now().timestamp().to_string();
    authorization_header_with(credentials, method, url, params, &nonce, &timestamp)
}

pub(crate) fn authorization_header_with(
    credentials: &Credentials,
    method: &str,
    url: &str,
    params: &[(&str, String)],
    nonce: &str,
    timestamp: &str,
) -> String {
    let mut oauth: Vec<(&str, String)> = vec![
        (
            "oauth_consumer_key",
            credentials.consumer_key.expose_secret().to_string(),
        ),
        ("oauth_nonce", nonce.to_string()),
        ("oauth_signature_method", "HMAC-SHA1".to_string()),
        ("oauth_timestamp", timestamp.to_string()),
        (
            "oauth_token",
            credentials.access_token.expose_secret().to_string(),
        ),
        ("oauth_version", "1.0".to_string()),
    ];

    let base = signature_base_string(method, url, oauth.iter().chain(params.iter()));
    let signature = sign(
        &base,
        credentials.consumer_secret.expose_secret(),
        credentials.access_token_secret.expose_secret(),
    );
    oauth.push(("oauth_signature", signature));
    oauth.sort_by(|a, b| a.0.cmp(b.0));

    let fields = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}

/// `METHOD&enc(url)&enc(sorted params)`.
pub(crate) fn signature_base_string<'a>(
    method: &str,
    url: &str,
    params: impl Iterator<Item = &'a (&'a str, String)>,
) -> String {
    let mut encoded: Vec<(String, String)> = params.map(|(k, v)| (encode(k), encode(v))).collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

pub(crate) fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac =
        Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
