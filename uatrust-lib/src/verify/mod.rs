//! Certificate chain verification against explicit trust material.
//!
//! The chain verifier builds a path from the presented end-entity certificate
//! to a trust anchor, drawing issuer candidates from the bundled chain, the
//! issuer store, and the trust store in that order, and produces one verdict
//! from a closed taxonomy. When several candidate paths fail for different
//! reasons, the most specific failure wins over a bare "no path found".

mod chain;
mod checks;
pub mod crl;
mod issuer;
mod uri;

use crate::encoding::split_certificate_blob;
use crate::name::render_name;
use crate::store::CertificateStore;
use log::{debug, warn};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use x509_parser::prelude::*;

pub(crate) use chain::MAX_CHAIN_DEPTH;
use issuer::CandidatePools;

pub use crl::is_revoked;
pub use uri::verify_application_uri;

/// Outcome of a certificate verification. Closed set; every helper returns
/// plain values and only the chain verifier accumulates them into this
/// taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// The certificate chains to a trust anchor and nothing disqualifies it.
    Good,
    /// Structural parse failure, or the signature failed against the only
    /// issuer candidates whose name matched (wrong issuer guess).
    CertificateInvalid,
    /// The end-entity certificate is itself CA-flagged.
    LeafUseNotAllowed,
    /// The end-entity certificate is outside its validity interval.
    TimeInvalid,
    /// A certificate above the leaf is outside its validity interval.
    IssuerTimeInvalid,
    /// The end-entity certificate appears on a revocation list.
    Revoked,
    /// A certificate above the leaf appears on a revocation list.
    IssuerRevoked,
    /// A name-matching issuer candidate lacks CA rights
    /// (BasicConstraints CA / KeyUsage keyCertSign+cRLSign).
    IssuerUseNotAllowed,
    /// No path to a trust anchor within the depth bound, or a loop was
    /// detected.
    ChainIncomplete,
    /// A well-formed self-signed terminus was found but is absent from the
    /// trust store.
    Untrusted,
    /// The expected application identifier is absent from the certificate's
    /// alternative-name extension (secondary check only).
    ApplicationUriInvalid,
}

impl Verdict {
    /// Whether the certificate was accepted.
    pub fn is_good(self) -> bool {
        self == Verdict::Good
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Good => "Good",
            Verdict::CertificateInvalid => "CertificateInvalid",
            Verdict::LeafUseNotAllowed => "LeafUseNotAllowed",
            Verdict::TimeInvalid => "TimeInvalid",
            Verdict::IssuerTimeInvalid => "IssuerTimeInvalid",
            Verdict::Revoked => "Revoked",
            Verdict::IssuerRevoked => "IssuerRevoked",
            Verdict::IssuerUseNotAllowed => "IssuerUseNotAllowed",
            Verdict::ChainIncomplete => "ChainIncomplete",
            Verdict::Untrusted => "Untrusted",
            Verdict::ApplicationUriInvalid => "ApplicationUriInvalid",
        };
        write!(f, "{}", s)
    }
}

/// Verify a certificate against the store at the current time.
///
/// The input may be PEM or DER and may concatenate several chained
/// certificates; the first is the end-entity certificate, the rest are the
/// bundled chain.
pub fn verify_certificate(store: &CertificateStore, input: &[u8]) -> Verdict {
    let now_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    verify_certificate_at(store, input, now_ts)
}

/// Verify a certificate against the store at a specific Unix timestamp.
///
/// Useful for reproducing historical decisions and for testing around
/// validity intervals.
pub fn verify_certificate_at(store: &CertificateStore, input: &[u8], at_time: i64) -> Verdict {
    let blobs = match split_certificate_blob(input) {
        Ok(blobs) => blobs,
        Err(e) => {
            warn!("certificate rejected: CertificateInvalid ({})", e);
            return Verdict::CertificateInvalid;
        }
    };
    // split_certificate_blob never returns an empty list.
    let Some((leaf_der, bundle_der)) = blobs.split_first() else {
        return Verdict::CertificateInvalid;
    };
    let leaf = match X509Certificate::from_der(leaf_der) {
        Ok((_, cert)) => cert,
        Err(e) => {
            warn!("certificate rejected: CertificateInvalid ({})", e);
            return Verdict::CertificateInvalid;
        }
    };

    // A CA certificate must not be accepted as an end-entity identity.
    if checks::is_cert_authority(&leaf) {
        warn!(
            "certificate rejected: LeafUseNotAllowed ({})",
            render_name(leaf.subject())
        );
        return Verdict::LeafUseNotAllowed;
    }

    let bundle: Vec<X509Certificate> = bundle_der
        .iter()
        .filter_map(|der| X509Certificate::from_der(der).ok().map(|(_, c)| c))
        .collect();
    let issuers: Vec<X509Certificate> = store
        .issuers_der()
        .filter_map(|der| X509Certificate::from_der(der).ok().map(|(_, c)| c))
        .collect();
    let trusted: Vec<X509Certificate> = store
        .trusted_der()
        .filter_map(|der| X509Certificate::from_der(der).ok().map(|(_, c)| c))
        .collect();
    let pools = CandidatePools {
        bundle,
        issuers,
        trusted,
    };

    // Per-call state: ancestors indexed by depth, for loop detection.
    let mut ancestors: Vec<Vec<u8>> = Vec::with_capacity(MAX_CHAIN_DEPTH);
    let verdict = chain::validate(
        &pools,
        store.revocation_records(),
        at_time,
        &leaf,
        0,
        &mut ancestors,
    );

    if verdict.is_good() {
        debug!("certificate accepted: {}", render_name(leaf.subject()));
    } else {
        warn!(
            "certificate rejected: {} ({})",
            verdict,
            render_name(leaf.subject())
        );
    }
    verdict
}

/// A shareable verification context bundling the three stores.
///
/// The store is read-mostly: every verification reads a consistent snapshot
/// via one `Arc` clone, and [`reload`](TrustListVerifier::reload) installs a
/// fully-formed replacement store with a single atomic swap. An in-flight
/// verification never observes a partially replaced store.
pub struct TrustListVerifier {
    store: RwLock<Arc<CertificateStore>>,
}

impl TrustListVerifier {
    pub fn new(store: CertificateStore) -> Self {
        TrustListVerifier {
            store: RwLock::new(Arc::new(store)),
        }
    }

    /// The current store snapshot.
    pub fn snapshot(&self) -> Arc<CertificateStore> {
        match self.store.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Re-scan the store's directories and atomically install the rebuilt
    /// store. On error the previous store stays in place untouched.
    pub fn reload(&self) -> Result<(), crate::UatrustError> {
        let fresh = self.snapshot().reload()?;
        self.install(fresh);
        Ok(())
    }

    fn install(&self, store: CertificateStore) {
        let fresh = Arc::new(store);
        match self.store.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }
}

impl crate::CertificateVerification for TrustListVerifier {
    fn verify_certificate(&self, input: &[u8]) -> Verdict {
        verify_certificate(&self.snapshot(), input)
    }

    fn verify_application_uri(&self, input: &[u8], expected_uri: &str) -> Verdict {
        verify_application_uri(input, expected_uri)
    }

    fn clear(&self) {
        self.install(CertificateStore::empty());
    }
}
