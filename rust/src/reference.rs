//! SHA-256 reference runs. Showing a real digest next to a toy pipeline makes
//! the difference in avalanche behaviour visible with the same three
//! single-character mutations.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::pipeline::avalanche::{bit_diff_percent, char_diff_percent, Mutation, ORIGINAL_LABEL};
use crate::pipeline::AvalancheRow;

/// Raw SHA-256 digest of `password` followed by `salt`.
pub fn sha256_digest(password: &str, salt: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.finalize().into()
}

/// Lowercase hex form of [`sha256_digest`].
pub fn sha256_hex(password: &str, salt: &str) -> String {
    hex::encode(sha256_digest(password, salt))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceReport {
    pub algorithm: &'static str,
    pub rows: Vec<AvalancheRow>,
}

/// The avalanche table for SHA-256 over the same inputs a pipeline sees.
pub fn sha256_avalanche(password: &str, salt: &str) -> ReferenceReport {
    let base = sha256_hex(password, salt);
    let mut rows = vec![AvalancheRow {
        label: ORIGINAL_LABEL,
        hash: base.clone(),
        diff_percent: 0,
        bit_diff_percent: 0,
    }];
    rows.extend(Mutation::ALL.into_iter().map(|mutation| {
        let hash = sha256_hex(&mutation.apply(password), salt);
        AvalancheRow {
            label: mutation.label(),
            diff_percent: char_diff_percent(&base, &hash),
            bit_diff_percent: bit_diff_percent(&base, &hash),
            hash,
        }
    }));
    ReferenceReport {
        algorithm: "SHA-256",
        rows,
    }
}
