use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests whose timestamp is further than this from the local clock are refused.
pub const MAX_CLOCK_SKEW_SECS: u64 = 5 * 60;

const VERSION_PREFIX: &str = "v0=";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signing secret is not configured")]
    MissingSecret,
    #[error("request timestamp `{0}` is not a unix timestamp")]
    InvalidTimestamp(String),
    #[error("request timestamp is {skew_secs}s away from the local clock")]
    Stale { skew_secs: u64 },
    #[error("signature header is malformed")]
    Malformed,
    #[error("signature does not match the request body")]
    Mismatch,
}

/// Checks `v0=<hex hmac-sha256 of "v0:{timestamp}:{body}">` against the signing secret.
pub fn verify_signature(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now_unix: i64,
) -> Result<(), SignatureError> {
    if signing_secret.is_empty() {
        return Err(SignatureError::MissingSecret);
    }

    let sent_at = timestamp
        .trim()
        .parse::<i64>()
        .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;
    let skew_secs = now_unix.abs_diff(sent_at);
    if skew_secs > MAX_CLOCK_SKEW_SECS {
        return Err(SignatureError::Stale { skew_secs });
    }

    let provided = signature
        .trim()
        .strip_prefix(VERSION_PREFIX)
        .and_then(decode_hex)
        .ok_or(SignatureError::Malformed)?;

    // verify_slice compares in constant time.
    signed_payload_mac(signing_secret, timestamp.trim(), body)?
        .verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

/// Produces the header value Slack would send for this request.
pub fn sign(signing_secret: &str, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mac = signed_payload_mac(signing_secret, timestamp, body)?;
    Ok(format!("{VERSION_PREFIX}{}", encode_hex(mac.finalize().into_bytes().as_slice())))
}

fn signed_payload_mac(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .map_err(|_| SignatureError::MissingSecret)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|index| u8::from_str_radix(value.get(index..index + 2)?, 16).ok())
        .collect()
}
