//! Input decoding: PEM/DER detection and certificate-boundary splitting.
//!
//! A peer may present a single certificate or several chained certificates in
//! one buffer, PEM or DER. Callers of the chain verifier need them split on
//! certificate boundaries, end-entity first.

use crate::UatrustError;
use x509_parser::prelude::*;
use x509_parser::revocation_list::CertificateRevocationList;

/// Whether the input looks like PEM ("-----BEGIN" after leading whitespace).
pub fn is_pem(input: &[u8]) -> bool {
    let trimmed = match input.iter().position(|b| !b.is_ascii_whitespace()) {
        Some(pos) => input.get(pos..).unwrap_or(input),
        None => return false,
    };
    trimmed.starts_with(b"-----BEGIN ")
}

/// Split a buffer containing one or more certificates into individual
/// DER-encoded certificates, preserving order.
///
/// PEM armor is detected automatically; the armored contents are copied out
/// defensively so downstream parsers always see clean, owned DER. For DER
/// input, certificates are peeled off the front of the buffer one at a time.
pub fn split_certificate_blob(input: &[u8]) -> Result<Vec<Vec<u8>>, UatrustError> {
    if input.is_empty() {
        return Err(UatrustError::ParseError("empty input".into()));
    }
    if is_pem(input) {
        split_pem_certificates(input)
    } else {
        split_der_certificates(input)
    }
}

fn split_pem_certificates(input: &[u8]) -> Result<Vec<Vec<u8>>, UatrustError> {
    let mut certs = Vec::new();
    for pem_result in Pem::iter_from_buffer(input) {
        match pem_result {
            Ok(pem) => {
                if pem.label == "CERTIFICATE" || pem.label == "TRUSTED CERTIFICATE" {
                    certs.push(pem.contents);
                }
            }
            Err(e) => {
                // Trailing garbage after at least one certificate is tolerated.
                if !certs.is_empty() {
                    break;
                }
                return Err(UatrustError::PemError(format!("failed to parse PEM: {}", e)));
            }
        }
    }
    if certs.is_empty() {
        return Err(UatrustError::PemError(
            "no certificates found in PEM input".into(),
        ));
    }
    Ok(certs)
}

fn split_der_certificates(input: &[u8]) -> Result<Vec<Vec<u8>>, UatrustError> {
    let mut certs = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        match X509Certificate::from_der(rest) {
            Ok((remaining, _)) => {
                let consumed = rest.len() - remaining.len();
                certs.push(rest.get(..consumed).unwrap_or(rest).to_vec());
                rest = remaining;
            }
            Err(e) => {
                if !certs.is_empty() {
                    break;
                }
                return Err(UatrustError::DerError(format!("{}", e)));
            }
        }
    }
    Ok(certs)
}

/// Split a buffer containing one or more revocation lists into individual
/// DER-encoded CRLs. Accepts PEM ("X509 CRL" blocks) or concatenated DER
/// CRLs, peeled off the front like certificates.
pub(crate) fn split_crl_blob(input: &[u8]) -> Result<Vec<Vec<u8>>, UatrustError> {
    if input.is_empty() {
        return Err(UatrustError::CrlError("empty input".into()));
    }
    if is_pem(input) {
        let mut crls = Vec::new();
        for pem_result in Pem::iter_from_buffer(input) {
            match pem_result {
                Ok(pem) => {
                    if pem.label == "X509 CRL" {
                        crls.push(pem.contents);
                    }
                }
                Err(e) => {
                    if !crls.is_empty() {
                        break;
                    }
                    return Err(UatrustError::CrlError(format!(
                        "failed to parse CRL PEM: {}",
                        e
                    )));
                }
            }
        }
        if crls.is_empty() {
            return Err(UatrustError::CrlError("no CRLs found in PEM input".into()));
        }
        Ok(crls)
    } else {
        let mut crls = Vec::new();
        let mut rest = input;
        while !rest.is_empty() {
            match CertificateRevocationList::from_der(rest) {
                Ok((remaining, _)) => {
                    let consumed = rest.len() - remaining.len();
                    crls.push(rest.get(..consumed).unwrap_or(rest).to_vec());
                    rest = remaining;
                }
                Err(e) => {
                    if !crls.is_empty() {
                        break;
                    }
                    return Err(UatrustError::CrlError(format!("{}", e)));
                }
            }
        }
        Ok(crls)
    }
}
