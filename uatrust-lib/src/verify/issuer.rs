//! Issuer candidate enumeration.
//!
//! Candidates for "who signed this certificate" are drawn, in fixed
//! precedence, from the bundled chain, then the issuer store, then the trust
//! store, falling through to the next source only once the current one is
//! exhausted. The cursor is an explicit tagged position so the chain walker
//! can backtrack and resume past a previously tried candidate without
//! identity comparisons.

use super::checks::{key_compatible, same_name};
use x509_parser::prelude::*;

/// The three candidate sources, parsed once per verification call.
pub(crate) struct CandidatePools<'a> {
    /// Certificates bundled with the incoming handshake, leaf excluded.
    pub(crate) bundle: Vec<X509Certificate<'a>>,
    /// Intermediate-issuer store.
    pub(crate) issuers: Vec<X509Certificate<'a>>,
    /// Trust store.
    pub(crate) trusted: Vec<X509Certificate<'a>>,
}

/// Position of the next candidate to consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateCursor {
    /// The certificate's own self-signature has not been considered yet.
    SelfSigned,
    Bundle(usize),
    IssuerStore(usize),
    TrustStore(usize),
    Exhausted,
}

impl CandidateCursor {
    pub(crate) fn start() -> Self {
        CandidateCursor::SelfSigned
    }
}

/// An issuer candidate together with where it came from.
pub(crate) struct Candidate<'p, 'a> {
    pub(crate) cert: &'p X509Certificate<'a>,
    /// True when the candidate is the certificate under test itself
    /// (subject equals issuer).
    pub(crate) is_self: bool,
}

/// Whether `candidate` can have issued `cert`: matching names and a key type
/// able to carry the signature algorithm. CA rights and signature validity
/// are the caller's concern.
fn qualifies(cert: &X509Certificate, candidate: &X509Certificate) -> bool {
    same_name(cert.issuer(), candidate.subject())
        && key_compatible(candidate.public_key(), &cert.signature_algorithm)
}

/// Yield the next issuer candidate for `cert` at or after `cursor`, along
/// with the cursor to resume from. Returns `None` once all sources are
/// exhausted.
pub(crate) fn next_issuer_candidate<'p, 'a>(
    pools: &'p CandidatePools<'a>,
    cert: &'p X509Certificate<'a>,
    cursor: CandidateCursor,
) -> Option<(Candidate<'p, 'a>, CandidateCursor)> {
    let mut cursor = cursor;
    loop {
        match cursor {
            CandidateCursor::SelfSigned => {
                cursor = CandidateCursor::Bundle(0);
                if same_name(cert.issuer(), cert.subject())
                    && key_compatible(cert.public_key(), &cert.signature_algorithm)
                {
                    return Some((
                        Candidate {
                            cert,
                            is_self: true,
                        },
                        cursor,
                    ));
                }
            }
            CandidateCursor::Bundle(from) => {
                for (i, candidate) in pools.bundle.iter().enumerate().skip(from) {
                    if qualifies(cert, candidate) {
                        return Some((
                            Candidate {
                                cert: candidate,
                                is_self: false,
                            },
                            CandidateCursor::Bundle(i + 1),
                        ));
                    }
                }
                cursor = CandidateCursor::IssuerStore(0);
            }
            CandidateCursor::IssuerStore(from) => {
                for (i, candidate) in pools.issuers.iter().enumerate().skip(from) {
                    if qualifies(cert, candidate) {
                        return Some((
                            Candidate {
                                cert: candidate,
                                is_self: false,
                            },
                            CandidateCursor::IssuerStore(i + 1),
                        ));
                    }
                }
                cursor = CandidateCursor::TrustStore(0);
            }
            CandidateCursor::TrustStore(from) => {
                for (i, candidate) in pools.trusted.iter().enumerate().skip(from) {
                    if qualifies(cert, candidate) {
                        return Some((
                            Candidate {
                                cert: candidate,
                                is_self: false,
                            },
                            CandidateCursor::TrustStore(i + 1),
                        ));
                    }
                }
                cursor = CandidateCursor::Exhausted;
            }
            CandidateCursor::Exhausted => return None,
        }
    }
}
