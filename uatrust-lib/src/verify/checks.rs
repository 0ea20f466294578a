//! Pure comparison and predicate functions used by the issuer resolver and
//! the chain walker. Every function returns a plain boolean; taxonomy
//! accumulation happens in the chain verifier alone.

use x509_parser::prelude::*;

// Signature algorithm OIDs (RFC 3279 / RFC 8410).
const SHA1_WITH_RSA: &str = "1.2.840.113549.1.1.5";
const SHA224_WITH_RSA: &str = "1.2.840.113549.1.1.14";
const SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";
const SHA384_WITH_RSA: &str = "1.2.840.113549.1.1.12";
const SHA512_WITH_RSA: &str = "1.2.840.113549.1.1.13";
const ECDSA_WITH_SHA1: &str = "1.2.840.10045.4.1";
const ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";
const ECDSA_WITH_SHA384: &str = "1.2.840.10045.4.3.3";
const ECDSA_WITH_SHA512: &str = "1.2.840.10045.4.3.4";
const ED25519: &str = "1.3.101.112";

// Public key type OIDs.
const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";

/// Byte-for-byte equality of two distinguished names on their raw DER
/// encoding. Deterministic and bounded; no textual canonicalization.
pub(crate) fn same_name(a: &X509Name, b: &X509Name) -> bool {
    a.as_raw() == b.as_raw()
}

/// Exact equality of the to-be-signed byte ranges: "this is literally the
/// same certificate", independent of name equality. Guards against spoofed
/// self-signed names.
pub(crate) fn same_body(a: &X509Certificate, b: &X509Certificate) -> bool {
    a.tbs_certificate.as_ref() == b.tbs_certificate.as_ref()
}

/// Whether the issuer's key type supports the signature algorithm used.
pub(crate) fn key_compatible(
    issuer_key: &SubjectPublicKeyInfo,
    signature_algorithm: &AlgorithmIdentifier,
) -> bool {
    let key_oid = issuer_key.algorithm.algorithm.to_id_string();
    match signature_algorithm.algorithm.to_id_string().as_str() {
        SHA1_WITH_RSA | SHA224_WITH_RSA | SHA256_WITH_RSA | SHA384_WITH_RSA | SHA512_WITH_RSA => {
            key_oid == RSA_ENCRYPTION
        }
        ECDSA_WITH_SHA1 | ECDSA_WITH_SHA256 | ECDSA_WITH_SHA384 | ECDSA_WITH_SHA512 => {
            key_oid == EC_PUBLIC_KEY
        }
        ED25519 => key_oid == ED25519,
        _ => false,
    }
}

/// Derived "is CA" flag: BasicConstraints CA plus, when a KeyUsage extension
/// is present, both the keyCertSign and cRLSign bits.
pub(crate) fn is_cert_authority(cert: &X509Certificate) -> bool {
    let ca = cert
        .basic_constraints()
        .ok()
        .flatten()
        .map(|bc| bc.value.ca)
        .unwrap_or(false);
    if !ca {
        return false;
    }
    match cert.key_usage() {
        Ok(Some(ku)) => ku.value.key_cert_sign() && ku.value.crl_sign(),
        // No KeyUsage extension: BasicConstraints alone decides.
        _ => true,
    }
}

/// Whether the timestamp falls inside the certificate's validity interval.
pub(crate) fn time_valid(cert: &X509Certificate, at_time: i64) -> bool {
    let validity = cert.validity();
    at_time >= validity.not_before.timestamp() && at_time <= validity.not_after.timestamp()
}

/// Cryptographically check the certificate's signature against the candidate
/// issuer's public key. Stateless; digest selection follows the certificate's
/// signature algorithm identifier.
pub(crate) fn signature_verifies(cert: &X509Certificate, issuer: &X509Certificate) -> bool {
    cert.verify_signature(Some(issuer.public_key())).is_ok()
}
