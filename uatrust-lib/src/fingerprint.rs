//! Certificate thumbprint (digest) computation.

use digest::Digest;
use serde::Serialize;

/// Digest algorithm for certificate thumbprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DigestAlgorithm {
    /// SHA-1, the conventional certificate-thumbprint digest in industrial
    /// protocol stacks. Identification only, never a security boundary.
    Sha1,
    Sha256,
}

/// Compute the thumbprint of DER-encoded certificate bytes.
///
/// Returns a colon-separated uppercase hex string (e.g., "AB:CD:EF:...").
pub fn thumbprint(der_bytes: &[u8], algorithm: DigestAlgorithm) -> String {
    let hash_bytes: Vec<u8> = match algorithm {
        DigestAlgorithm::Sha1 => sha1::Sha1::digest(der_bytes).to_vec(),
        DigestAlgorithm::Sha256 => sha2::Sha256::digest(der_bytes).to_vec(),
    };

    hash_bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}
