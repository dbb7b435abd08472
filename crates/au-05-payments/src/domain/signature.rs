//! Webhook signature verification
//!
//! The processor signs `"{t}.{payload}"` with HMAC-SHA256 and sends
//! `t=<unix>,v1=<hex>[,v1=<hex>...]`. Several `v1` entries appear while a
//! secret is being rolled; any one of them may match.

use crate::error::SignatureError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Default allowed clock skew between the processor and us.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Name of the header carrying the signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::SignatureMismatch)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verify `header` against `payload`.
///
/// `now` and `tolerance_secs` are explicit so callers and tests control the
/// clock. The tolerance applies in both directions.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    candidates.push(bytes);
                }
            }
            // v0 and future schemes are not trusted.
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if candidates.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    // `abs_diff` cannot overflow on hostile timestamps such as `i64::MIN`.
    let skew = now.abs_diff(timestamp);
    if skew > tolerance_secs.unsigned_abs() {
        return Err(SignatureError::TimestampOutsideTolerance {
            timestamp,
            tolerance_secs,
        });
    }

    let expected = mac_for(secret, timestamp, payload)?.finalize().into_bytes();
    let matched = candidates
        .iter()
        .fold(false, |found, candidate| {
            found | bool::from(expected.as_slice().ct_eq(candidate.as_slice()))
        });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::SignatureMismatch)
    }
}

/// Build a signature header the way the processor does.
///
/// Used by the fake processor and tests to produce deliverable webhooks.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, SignatureError> {
    let signature = hex::encode(mac_for(secret, timestamp, payload)?.finalize().into_bytes());
    Ok(format!("t={timestamp},v1={signature}"))
}
