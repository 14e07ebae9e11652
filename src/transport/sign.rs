use sha2::{Digest, Sha256};

use crate::domain::SmsKey;
use crate::transport::params::ParameterSet;

pub const SIGNATURE_FIELD: &str = "signature";

/// Compute the SMS request signature.
///
/// Text parameters other than `smsKey` and `signature` are sorted by key and
/// joined as `k=v&k=v`, wrapped as `secret&params&secret`, then hashed with
/// SHA-256 and hex-encoded in lowercase. Insertion order does not matter.
pub fn signature(params: &ParameterSet, secret: &str) -> String {
    let mut fields = params
        .text_fields()
        .filter(|(key, _)| *key != SmsKey::FIELD && *key != SIGNATURE_FIELD)
        .collect::<Vec<_>>();
    fields.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let canonical = fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(format!("{secret}&{canonical}&{secret}").as_bytes());
    hex::encode(hasher.finalize())
}

/// Sign `params` in place, replacing any previous `signature` field.
pub fn sign(params: &mut ParameterSet, secret: &SmsKey) {
    let digest = signature(params, secret.as_str());
    params.set(SIGNATURE_FIELD, digest);
}
