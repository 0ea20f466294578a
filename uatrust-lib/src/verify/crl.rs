//! Revocation checking against the store's distilled revocation lists.

use crate::store::RevocationRecord;
use x509_parser::prelude::*;

/// Whether any revocation list issued by the certificate's issuer lists the
/// certificate's serial number.
pub fn is_revoked(revocations: &[RevocationRecord], cert: &X509Certificate) -> bool {
    let issuer_raw = cert.issuer().as_raw();
    let serial = cert.raw_serial();
    revocations
        .iter()
        .any(|record| record.issuer_raw == issuer_raw && record.revokes(serial))
}

/// RFC 5280 reason string for a revoked certificate, for diagnostics.
pub(crate) fn revocation_reason<'r>(
    revocations: &'r [RevocationRecord],
    cert: &X509Certificate,
) -> Option<&'r str> {
    let issuer_raw = cert.issuer().as_raw();
    let serial = cert.raw_serial();
    revocations
        .iter()
        .filter(|record| record.issuer_raw == issuer_raw)
        .find_map(|record| record.revoked.get(serial).copied())
}
