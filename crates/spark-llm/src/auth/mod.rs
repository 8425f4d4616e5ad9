//! Request authentication for the Spark WebSocket endpoints.

mod signer;

pub use signer::{canonical_string, hmac_sha256_base64, rfc1123_date, RequestSigner, SignedUrl};
