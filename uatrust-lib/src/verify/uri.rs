//! Application-URI checking.
//!
//! An independent secondary check that a certificate's alternative-name
//! extension contains an expected identifier string. This is a best-effort
//! byte-substring search over the raw extension value rather than a
//! structured alternative-name parse; it never feeds back into the trust
//! decision and is invoked by callers only after chain verification
//! succeeded.

use super::Verdict;
use crate::encoding::split_certificate_blob;
use log::warn;
use x509_parser::prelude::*;

const SUBJECT_ALT_NAME_OID: &str = "2.5.29.17";

/// Check that the certificate's SubjectAltName extension contains the
/// expected application identifier, byte for byte.
///
/// Returns [`Verdict::Good`] when present, [`Verdict::ApplicationUriInvalid`]
/// when absent (or when the extension is missing), and
/// [`Verdict::CertificateInvalid`] when the certificate does not parse.
pub fn verify_application_uri(input: &[u8], expected_uri: &str) -> Verdict {
    if expected_uri.is_empty() {
        return Verdict::ApplicationUriInvalid;
    }
    let blobs = match split_certificate_blob(input) {
        Ok(blobs) => blobs,
        Err(_) => return Verdict::CertificateInvalid,
    };
    let Some(leaf_der) = blobs.first() else {
        return Verdict::CertificateInvalid;
    };
    let cert = match X509Certificate::from_der(leaf_der) {
        Ok((_, cert)) => cert,
        Err(_) => return Verdict::CertificateInvalid,
    };

    let needle = expected_uri.as_bytes();
    let found = cert.extensions().iter().any(|ext| {
        ext.oid.to_id_string() == SUBJECT_ALT_NAME_OID && contains_bytes(ext.value, needle)
    });

    if found {
        Verdict::Good
    } else {
        warn!(
            "application URI {:?} not present in certificate alternative names",
            expected_uri
        );
        Verdict::ApplicationUriInvalid
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}
