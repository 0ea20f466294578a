//! Certificate record store: trusted certificates, intermediate issuers,
//! and revocation lists.
//!
//! A store is built once from byte buffers or from three directories, and is
//! immutable afterwards. Loading is fail-closed: a single malformed entry
//! fails the whole load, so a store is either fully populated or not created.
//! Directory-backed stores can be [`reload`](CertificateStore::reload)ed into
//! a fully-formed *replacement* store; the original is never mutated.

use crate::encoding::{split_certificate_blob, split_crl_blob};
use crate::fingerprint::{thumbprint, DigestAlgorithm};
use crate::{name, UatrustError};
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use x509_parser::prelude::*;
use x509_parser::revocation_list::CertificateRevocationList;

/// A certificate held by the store: owned DER plus the SHA-1 thumbprint used
/// to identify it in logs.
#[derive(Clone)]
pub(crate) struct CertificateRecord {
    pub(crate) der: Vec<u8>,
    pub(crate) thumbprint: String,
}

/// A revocation list distilled at load time: the issuer's raw DER name and
/// the set of revoked serial numbers, each with its RFC 5280 reason string.
#[derive(Clone)]
pub struct RevocationRecord {
    pub(crate) issuer_raw: Vec<u8>,
    pub(crate) revoked: HashMap<Vec<u8>, &'static str>,
}

impl RevocationRecord {
    /// Whether this list revokes the given serial number.
    pub fn revokes(&self, serial: &[u8]) -> bool {
        self.revoked.contains_key(serial)
    }

    /// Number of revoked serials on this list.
    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

/// Directory provenance of a store, enabling reload.
#[derive(Debug, Clone)]
pub struct StoreDirectories {
    pub trusted: PathBuf,
    pub issuers: PathBuf,
    pub revocations: PathBuf,
}

/// Three independent, order-irrelevant collections of trust material.
pub struct CertificateStore {
    trusted: Vec<CertificateRecord>,
    issuers: Vec<CertificateRecord>,
    revocations: Vec<RevocationRecord>,
    provenance: Option<StoreDirectories>,
}

impl std::fmt::Debug for CertificateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateStore")
            .field("trusted", &self.trusted.len())
            .field("issuers", &self.issuers.len())
            .field("revocations", &self.revocations.len())
            .finish()
    }
}

impl Default for CertificateStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl CertificateStore {
    /// Create a store with no trust material. Every chain verification
    /// against it fails; used by `clear`.
    pub fn empty() -> Self {
        CertificateStore {
            trusted: Vec::new(),
            issuers: Vec::new(),
            revocations: Vec::new(),
            provenance: None,
        }
    }

    /// Build a store from in-memory buffers.
    ///
    /// Each buffer may be PEM or DER (auto-detected) and may contain several
    /// certificates; revocation buffers hold CRLs. Any malformed entry fails
    /// the whole call.
    pub fn from_der_lists(
        trusted: &[impl AsRef<[u8]>],
        issuers: &[impl AsRef<[u8]>],
        revocations: &[impl AsRef<[u8]>],
    ) -> Result<Self, UatrustError> {
        let mut store = CertificateStore::empty();
        for buf in trusted {
            store.add_certificates(buf.as_ref(), Collection::Trusted)?;
        }
        for buf in issuers {
            store.add_certificates(buf.as_ref(), Collection::Issuers)?;
        }
        for buf in revocations {
            store.add_revocation_lists(buf.as_ref())?;
        }
        info!(
            "loaded certificate store: {} trusted, {} issuers, {} revocation lists",
            store.trusted.len(),
            store.issuers.len(),
            store.revocations.len()
        );
        Ok(store)
    }

    /// Build a store by scanning three directories for certificate and CRL
    /// files, recording the paths so the store can be reloaded.
    pub fn from_directories(
        trusted_dir: &Path,
        issuer_dir: &Path,
        revocation_dir: &Path,
    ) -> Result<Self, UatrustError> {
        let mut store = CertificateStore::empty();
        for path in cert_files_in(trusted_dir)? {
            let data = read_file(&path)?;
            store.add_certificates(&data, Collection::Trusted)?;
        }
        for path in cert_files_in(issuer_dir)? {
            let data = read_file(&path)?;
            store.add_certificates(&data, Collection::Issuers)?;
        }
        for path in crl_files_in(revocation_dir)? {
            let data = read_file(&path)?;
            store.add_revocation_lists(&data)?;
        }
        store.provenance = Some(StoreDirectories {
            trusted: trusted_dir.to_path_buf(),
            issuers: issuer_dir.to_path_buf(),
            revocations: revocation_dir.to_path_buf(),
        });
        info!(
            "loaded certificate store from directories: {} trusted, {} issuers, {} revocation lists",
            store.trusted.len(),
            store.issuers.len(),
            store.revocations.len()
        );
        Ok(store)
    }

    /// Re-scan the configured directories and build a fully-formed
    /// replacement store. Only directory-backed stores can be reloaded.
    pub fn reload(&self) -> Result<Self, UatrustError> {
        let dirs = self.provenance.as_ref().ok_or_else(|| {
            UatrustError::StoreError("store is not directory-backed, cannot reload".into())
        })?;
        Self::from_directories(&dirs.trusted, &dirs.issuers, &dirs.revocations)
    }

    /// Number of trusted certificates.
    pub fn trusted_len(&self) -> usize {
        self.trusted.len()
    }

    /// Number of intermediate-issuer certificates.
    pub fn issuers_len(&self) -> usize {
        self.issuers.len()
    }

    /// Number of revocation lists.
    pub fn revocations_len(&self) -> usize {
        self.revocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trusted.is_empty() && self.issuers.is_empty() && self.revocations.is_empty()
    }

    /// The directories this store was loaded from, if any.
    pub fn directories(&self) -> Option<&StoreDirectories> {
        self.provenance.as_ref()
    }

    /// DER bytes of the trusted certificates, in load order.
    pub fn trusted_der(&self) -> impl Iterator<Item = &[u8]> {
        self.trusted.iter().map(|r| r.der.as_slice())
    }

    /// DER bytes of the issuer certificates, in load order.
    pub fn issuers_der(&self) -> impl Iterator<Item = &[u8]> {
        self.issuers.iter().map(|r| r.der.as_slice())
    }

    /// The distilled revocation lists.
    pub fn revocation_records(&self) -> &[RevocationRecord] {
        &self.revocations
    }

    fn add_certificates(&mut self, data: &[u8], which: Collection) -> Result<(), UatrustError> {
        for der in split_certificate_blob(data)? {
            // split guarantees DER-structural soundness for DER input; PEM
            // contents still need a full parse to be admitted.
            let (_, cert) = X509Certificate::from_der(&der)
                .map_err(|e| UatrustError::ParseError(format!("{}", e)))?;
            let tp = thumbprint(&der, DigestAlgorithm::Sha1);
            log::debug!(
                "store add {:?}: {} [{}]",
                which,
                name::render_name(cert.subject()),
                tp
            );
            let record = CertificateRecord {
                thumbprint: tp,
                der,
            };
            match which {
                Collection::Trusted => self.trusted.push(record),
                Collection::Issuers => self.issuers.push(record),
            }
        }
        Ok(())
    }

    fn add_revocation_lists(&mut self, data: &[u8]) -> Result<(), UatrustError> {
        for der in split_crl_blob(data)? {
            let (_, crl) = CertificateRevocationList::from_der(&der)
                .map_err(|e| UatrustError::CrlError(format!("{}", e)))?;
            let mut revoked = HashMap::new();
            for entry in crl.iter_revoked_certificates() {
                let reason = entry
                    .reason_code()
                    .map(|rc| format_crl_reason(&rc.1))
                    .unwrap_or("unspecified");
                revoked.insert(entry.raw_serial().to_vec(), reason);
            }
            log::debug!(
                "store add revocation list issued by {}: {} serials",
                name::render_name(crl.issuer()),
                revoked.len()
            );
            self.revocations.push(RevocationRecord {
                issuer_raw: crl.issuer().as_raw().to_vec(),
                revoked,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Collection {
    Trusted,
    Issuers,
}

/// Format a CRL revocation reason code as an RFC 5280-style string
/// (Section 5.3.1).
fn format_crl_reason(rc: &x509_parser::x509::ReasonCode) -> &'static str {
    match rc.0 {
        0 => "unspecified",
        1 => "keyCompromise",
        2 => "cACompromise",
        3 => "affiliationChanged",
        4 => "superseded",
        5 => "cessationOfOperation",
        6 => "certificateHold",
        // 7 is unused per RFC 5280
        8 => "removeFromCRL",
        9 => "privilegeWithdrawn",
        10 => "aACompromise",
        _ => "unspecified",
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, UatrustError> {
    std::fs::read(path).map_err(|e| {
        UatrustError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// Certificate files in a directory: `.pem`, `.der`, `.crt`, `.cer`.
fn cert_files_in(dir: &Path) -> Result<Vec<PathBuf>, UatrustError> {
    files_with_extensions(dir, &["pem", "der", "crt", "cer"])
}

/// Revocation-list files in a directory: `.crl`, plus `.pem`/`.der` files.
fn crl_files_in(dir: &Path) -> Result<Vec<PathBuf>, UatrustError> {
    files_with_extensions(dir, &["crl", "pem", "der"])
}

fn files_with_extensions(dir: &Path, exts: &[&str]) -> Result<Vec<PathBuf>, UatrustError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        UatrustError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", dir.display(), e),
        ))
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| exts.iter().any(|x| e.eq_ignore_ascii_case(x)));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
