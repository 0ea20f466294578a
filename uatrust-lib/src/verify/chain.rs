//! The recursive path-building core.
//!
//! Evaluates one certificate at a time, depth-indexed, hypothesizing issuer
//! candidates in source order and recursing upwards until a trust anchor, a
//! disqualifying condition, or the depth bound is reached. When several
//! candidate paths fail for different reasons, the verdict keeps the most
//! specific failure: `best` is only ever updated by outcomes that represent
//! progress past a bare lookup failure.

use super::checks::{is_cert_authority, same_body, signature_verifies, time_valid};
use super::crl::{is_revoked, revocation_reason};
use super::issuer::{next_issuer_candidate, CandidateCursor, CandidatePools};
use super::Verdict;
use crate::name::render_name;
use crate::store::RevocationRecord;
use log::debug;
use x509_parser::prelude::*;

/// Maximum chain depth. Chains longer than this are reported as incomplete
/// rather than searched further; together with the ancestor loop guard this
/// bounds the search.
pub(crate) const MAX_CHAIN_DEPTH: usize = 20;

/// Evaluate `cert` at `depth`, with `ancestors` holding the to-be-signed
/// bytes of the issuers accepted at shallower depths.
pub(crate) fn validate<'p, 'a>(
    pools: &'p CandidatePools<'a>,
    revocations: &[RevocationRecord],
    at_time: i64,
    cert: &'p X509Certificate<'a>,
    depth: usize,
    ancestors: &mut Vec<Vec<u8>>,
) -> Verdict {
    if depth >= MAX_CHAIN_DEPTH {
        return Verdict::ChainIncomplete;
    }
    if !time_valid(cert, at_time) {
        return if depth == 0 {
            Verdict::TimeInvalid
        } else {
            Verdict::IssuerTimeInvalid
        };
    }
    if is_revoked(revocations, cert) {
        debug!(
            "depth {}: {} revoked ({})",
            depth,
            render_name(cert.subject()),
            revocation_reason(revocations, cert).unwrap_or("unspecified")
        );
        return if depth == 0 {
            Verdict::Revoked
        } else {
            Verdict::IssuerRevoked
        };
    }

    let mut best = Verdict::ChainIncomplete;
    let mut cursor = CandidateCursor::start();
    while let Some((candidate, next)) = next_issuer_candidate(pools, cert, cursor) {
        cursor = next;

        // A candidate that *is* this certificate (self-signed, or a stored
        // copy with identical to-be-signed bytes) is a terminal hypothesis,
        // exempt from the CA-rights check.
        let terminus = candidate.is_self || same_body(cert, candidate.cert);

        if !terminus && !is_cert_authority(candidate.cert) {
            debug!(
                "depth {}: candidate {} lacks CA rights",
                depth,
                render_name(candidate.cert.subject())
            );
            best = Verdict::IssuerUseNotAllowed;
            continue;
        }
        if !signature_verifies(cert, candidate.cert) {
            // Name matched but the key did not: wrong issuer guess.
            debug!(
                "depth {}: signature of {} does not verify against {}",
                depth,
                render_name(cert.subject()),
                render_name(candidate.cert.subject())
            );
            best = Verdict::CertificateInvalid;
            continue;
        }
        if terminus {
            // Self-signed terminus: resolved below against the trust store,
            // never recursed on.
            best = Verdict::Untrusted;
            continue;
        }

        // Loop guard: an issuer already accepted at a shallower depth must
        // not be revisited.
        let candidate_tbs = candidate.cert.tbs_certificate.as_ref();
        if ancestors
            .iter()
            .take(depth)
            .any(|tbs| tbs.as_slice() == candidate_tbs)
        {
            debug!(
                "depth {}: loop detected through {}",
                depth,
                render_name(candidate.cert.subject())
            );
            return Verdict::ChainIncomplete;
        }

        ancestors.truncate(depth);
        ancestors.push(candidate_tbs.to_vec());
        best = validate(pools, revocations, at_time, candidate.cert, depth + 1, ancestors);
        if best == Verdict::Good {
            break;
        }
    }

    if best == Verdict::Untrusted {
        // A self-signed terminus counts as an anchor only if this exact
        // certificate body is in the trust store.
        if pools.trusted.iter().any(|t| same_body(cert, t)) {
            return Verdict::Good;
        }
        return Verdict::Untrusted;
    }
    best
}
