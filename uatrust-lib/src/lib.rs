//! uatrust-lib: Certificate trust-decision engine.
//!
//! Produces a definitive accept/reject verdict for a peer-presented X.509
//! certificate (plus any certificates bundled with it) against locally held
//! trust material: a trust list, an issuer list, and a revocation list.
//! Follows the X.509 path-validation model, adapted for protocols that need
//! deterministic, bounded-time decisions during connection setup.
//!
//! The entry points are [`TrustListVerifier`] (a shareable verification
//! context with atomically reloadable stores) and the free functions
//! [`verify_certificate`] and [`verify_application_uri`] for callers that
//! manage their own [`CertificateStore`].

mod encoding;
mod fingerprint;
mod name;
mod store;
pub mod verify;

pub use encoding::{is_pem, split_certificate_blob};
pub use fingerprint::{thumbprint, DigestAlgorithm};
pub use name::render_name;
pub use store::{CertificateStore, RevocationRecord, StoreDirectories};
pub use verify::{
    verify_application_uri, verify_certificate, verify_certificate_at, TrustListVerifier, Verdict,
};

/// Errors returned by uatrust-lib.
///
/// These cover trust-material *loading* failures only. Verification outcomes
/// are never errors; they are [`Verdict`] values.
#[derive(Debug, thiserror::Error)]
pub enum UatrustError {
    #[error("Failed to parse certificate: {0}")]
    ParseError(String),

    #[error("Invalid PEM format: {0}")]
    PemError(String),

    #[error("Invalid DER format: {0}")]
    DerError(String),

    #[error("Failed to parse revocation list: {0}")]
    CrlError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The seam the rest of the stack calls through.
///
/// Exactly three operations are exposed to other subsystems (secure-channel
/// handshake, access control). Callers depend on this trait, never on the
/// concrete store representation.
pub trait CertificateVerification: Send + Sync {
    /// Verify a peer-presented certificate. The input may concatenate several
    /// chained certificates (PEM or DER); the first is the end-entity
    /// certificate, the rest are the bundled chain.
    fn verify_certificate(&self, input: &[u8]) -> Verdict;

    /// Check that the certificate's alternative-name extension contains the
    /// expected application identifier. Independent of the trust verdict;
    /// callers invoke it after `verify_certificate` returns [`Verdict::Good`].
    fn verify_application_uri(&self, input: &[u8], expected_uri: &str) -> Verdict;

    /// Release all trust-material resources. Subsequent verifications run
    /// against an empty store.
    fn clear(&self);
}
