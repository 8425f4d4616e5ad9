//! HMAC-SHA256 URL signing.
//!
//! The service authenticates the WebSocket handshake through three query
//! parameters: `authorization`, `date` and `host`. The signature covers the
//! host, the RFC-1123 date and the request line, so a signed URL is only
//! valid for a short window and must be derived again for every request.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chat_core::Credentials;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use crate::error::{LLMError, Result};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "hmac-sha256";
const SIGNED_HEADERS: &str = "host date request-line";

/// Result of signing an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub host: String,
    pub date: String,
    pub signature: String,
}

#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign `endpoint` with the current time.
    pub fn sign(&self, endpoint: &str) -> Result<SignedUrl> {
        self.sign_at(endpoint, Utc::now())
    }

    /// Sign `endpoint` as of `now`. Deterministic for a fixed instant.
    pub fn sign_at(&self, endpoint: &str, now: DateTime<Utc>) -> Result<SignedUrl> {
        let mut url = Url::parse(endpoint.trim())
            .map_err(|e| LLMError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(LLMError::InvalidEndpoint(format!(
                "{endpoint}: expected a ws:// or wss:// url"
            )));
        }

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(LLMError::InvalidEndpoint(format!("{endpoint}: missing host")))
            }
        };
        let date = rfc1123_date(now);

        let signature = hmac_sha256_base64(
            &self.credentials.api_secret,
            &canonical_string(&host, &date, url.path()),
        )?;
        let authorization_origin = format!(
            "api_key=\"{}\", algorithm=\"{}\", headers=\"{}\", signature=\"{}\"",
            self.credentials.api_key, ALGORITHM, SIGNED_HEADERS, signature
        );
        let authorization = STANDARD.encode(authorization_origin.as_bytes());

        url.query_pairs_mut()
            .append_pair("authorization", &authorization)
            .append_pair("date", &date)
            .append_pair("host", &host);

        Ok(SignedUrl {
            url: url.to_string(),
            host,
            date,
            signature,
        })
    }
}

/// Format an instant as an RFC-1123 HTTP date, e.g. `Mon, 19 Oct 2026 08:00:00 GMT`.
pub fn rfc1123_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// The string covered by the signature.
pub fn canonical_string(host: &str, date: &str, path: &str) -> String {
    format!("host: {host}\ndate: {date}\nGET {path} HTTP/1.1")
}

pub fn hmac_sha256_base64(key: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| LLMError::Config(format!("signing key rejected: {e}")))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
