#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Store loading, fail-closed behavior, directory reload, and the
//! three-operation verification seam.

use std::path::{Path, PathBuf};
use uatrust_lib::*;

const AT_VALID: i64 = 1_790_000_000;

fn testdata_dir() -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.pop();
    p.push("testdata");
    p
}

fn testdata(name: &str) -> Vec<u8> {
    let p = testdata_dir().join(name);
    std::fs::read(&p).unwrap_or_else(|e| panic!("failed to read {}: {}", p.display(), e))
}

/// A scratch directory layout with trusted/, issuers/, and crls/ subdirs,
/// freshly created per test and removed on drop.
struct ScratchPki {
    root: PathBuf,
}

impl ScratchPki {
    fn new(tag: &str) -> Self {
        let root = std::env::temp_dir().join(format!("uatrust_test_{}_{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        for sub in ["trusted", "issuers", "crls"] {
            std::fs::create_dir_all(root.join(sub)).expect("create scratch dir");
        }
        ScratchPki { root }
    }

    fn dir(&self, sub: &str) -> PathBuf {
        self.root.join(sub)
    }

    fn put(&self, sub: &str, fixture: &str) {
        std::fs::copy(testdata_dir().join(fixture), self.root.join(sub).join(fixture))
            .expect("copy fixture");
    }

    fn load(&self) -> CertificateStore {
        CertificateStore::from_directories(
            &self.dir("trusted"),
            &self.dir("issuers"),
            &self.dir("crls"),
        )
        .expect("scratch store must load")
    }
}

impl Drop for ScratchPki {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

// =========================================================================
// Loading from buffers
// =========================================================================

#[test]
fn load_counts_all_three_collections() {
    let store = CertificateStore::from_der_lists(
        &[testdata("root_ca.pem")],
        &[testdata("intermediate_ca.pem"), testdata("revoked_ca.pem")],
        &[testdata("crl_intermediate.pem"), testdata("crl_root.pem")],
    )
    .expect("store must load");
    assert_eq!(store.trusted_len(), 1);
    assert_eq!(store.issuers_len(), 2);
    assert_eq!(store.revocations_len(), 2);
    assert!(!store.is_empty());
    assert!(store.directories().is_none());
}

#[test]
fn pem_bundle_buffer_yields_multiple_records() {
    let mut bundle = testdata("root_ca.pem");
    bundle.extend_from_slice(&testdata("intermediate_ca.pem"));
    let store =
        CertificateStore::from_der_lists(&[bundle], &[] as &[Vec<u8>], &[] as &[Vec<u8>])
            .expect("bundle must load");
    assert_eq!(store.trusted_len(), 2);
}

#[test]
fn malformed_trusted_entry_fails_the_whole_load() {
    let result = CertificateStore::from_der_lists(
        &[testdata("root_ca.pem"), testdata("malformed.der")],
        &[] as &[Vec<u8>],
        &[] as &[Vec<u8>],
    );
    assert!(result.is_err(), "load must be fail-closed");
}

#[test]
fn malformed_revocation_entry_fails_the_whole_load() {
    let result = CertificateStore::from_der_lists(
        &[testdata("root_ca.pem")],
        &[] as &[Vec<u8>],
        &[testdata("malformed.der")],
    );
    assert!(result.is_err(), "load must be fail-closed");
}

#[test]
fn certificate_fed_as_revocation_list_fails_the_load() {
    let result = CertificateStore::from_der_lists(
        &[] as &[Vec<u8>],
        &[] as &[Vec<u8>],
        &[testdata("root_ca.pem")],
    );
    assert!(result.is_err(), "a certificate is not a CRL");
}

#[test]
fn empty_store_is_empty() {
    let store = CertificateStore::empty();
    assert!(store.is_empty());
    assert_eq!(store.trusted_len(), 0);
}

// =========================================================================
// Revocation records
// =========================================================================

#[test]
fn revocation_record_lists_the_revoked_serial() {
    let store = CertificateStore::from_der_lists(
        &[] as &[Vec<u8>],
        &[] as &[Vec<u8>],
        &[testdata("crl_intermediate.pem")],
    )
    .expect("crl must load");
    let records = store.revocation_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].len(), 1);

    // serial 2004 (0x07D4) is server_revoked's serial
    assert!(records[0].revokes(&[0x07, 0xD4]));
    assert!(!records[0].revokes(&[0x07, 0xD1]));
}

#[test]
fn concatenated_der_crls_load_as_separate_records() {
    // crl_bundle.der is crl_intermediate and crl_root back to back in DER;
    // each must come out as its own record, like concatenated certificates.
    let store = CertificateStore::from_der_lists(
        &[] as &[Vec<u8>],
        &[] as &[Vec<u8>],
        &[testdata("crl_bundle.der")],
    )
    .expect("crl bundle must load");
    assert_eq!(store.revocations_len(), 2);

    let records = store.revocation_records();
    // serial 2004 (server_revoked) and serial 1004 (revoked_ca)
    assert!(records.iter().any(|r| r.revokes(&[0x07, 0xD4])));
    assert!(records.iter().any(|r| r.revokes(&[0x03, 0xEC])));
}

#[test]
fn is_revoked_matches_issuer_and_serial() {
    use uatrust_lib::verify::is_revoked;
    use x509_parser::prelude::*;

    let store = CertificateStore::from_der_lists(
        &[] as &[Vec<u8>],
        &[] as &[Vec<u8>],
        &[testdata("crl_intermediate.pem")],
    )
    .expect("crl must load");

    let revoked_der = split_certificate_blob(&testdata("server_revoked.pem")).unwrap();
    let (_, revoked) = X509Certificate::from_der(&revoked_der[0]).unwrap();
    assert!(is_revoked(store.revocation_records(), &revoked));

    let ok_der = split_certificate_blob(&testdata("server.pem")).unwrap();
    let (_, ok) = X509Certificate::from_der(&ok_der[0]).unwrap();
    assert!(!is_revoked(store.revocation_records(), &ok));
}

// =========================================================================
// Directory-backed stores and reload
// =========================================================================

#[test]
fn directory_store_loads_and_verifies() {
    let pki = ScratchPki::new("dirload");
    pki.put("trusted", "root_ca.pem");
    pki.put("issuers", "intermediate_ca.pem");
    pki.put("crls", "crl_intermediate.pem");

    let store = pki.load();
    assert_eq!(store.trusted_len(), 1);
    assert_eq!(store.issuers_len(), 1);
    assert_eq!(store.revocations_len(), 1);
    assert!(store.directories().is_some());
    assert_eq!(
        verify_certificate_at(&store, &testdata("server.pem"), AT_VALID),
        Verdict::Good
    );
}

#[test]
fn memory_backed_store_cannot_reload() {
    let store = CertificateStore::from_der_lists(
        &[testdata("root_ca.pem")],
        &[] as &[Vec<u8>],
        &[] as &[Vec<u8>],
    )
    .expect("store must load");
    assert!(store.reload().is_err());
}

#[test]
fn reload_picks_up_trust_material_added_to_the_directories() {
    let pki = ScratchPki::new("reload");
    pki.put("issuers", "intermediate_ca.pem");

    let verifier = TrustListVerifier::new(pki.load());
    let server = testdata("server.pem");
    assert_ne!(
        verify_certificate_at(&verifier.snapshot(), &server, AT_VALID),
        Verdict::Good
    );

    // Drop the root into the trusted directory; nothing changes until an
    // explicit reload installs the replacement store.
    pki.put("trusted", "root_ca.pem");
    assert_ne!(
        verify_certificate_at(&verifier.snapshot(), &server, AT_VALID),
        Verdict::Good
    );

    verifier.reload().expect("reload must succeed");
    assert_eq!(
        verify_certificate_at(&verifier.snapshot(), &server, AT_VALID),
        Verdict::Good
    );
}

#[test]
fn failed_reload_leaves_the_previous_store_in_place() {
    let pki = ScratchPki::new("badreload");
    pki.put("trusted", "root_ca.pem");
    pki.put("issuers", "intermediate_ca.pem");

    let verifier = TrustListVerifier::new(pki.load());
    let server = testdata("server.pem");
    assert_eq!(
        verify_certificate_at(&verifier.snapshot(), &server, AT_VALID),
        Verdict::Good
    );

    // Poison the trusted directory with a malformed entry: reload must fail
    // closed and keep serving the old store.
    std::fs::write(pki.dir("trusted").join("broken.der"), b"not a certificate")
        .expect("write broken file");
    assert!(verifier.reload().is_err());
    assert_eq!(
        verify_certificate_at(&verifier.snapshot(), &server, AT_VALID),
        Verdict::Good
    );
}

#[test]
fn missing_directory_fails_the_load() {
    let pki = ScratchPki::new("missingdir");
    let result = CertificateStore::from_directories(
        &pki.dir("trusted"),
        &Path::new("/nonexistent/uatrust/issuers").to_path_buf(),
        &pki.dir("crls"),
    );
    assert!(result.is_err());
}

// =========================================================================
// The three-operation seam
// =========================================================================

#[test]
fn verification_seam_exposes_verify_uri_and_clear() {
    let store = CertificateStore::from_der_lists(
        &[testdata("root_ca.pem")],
        &[testdata("intermediate_ca.pem")],
        &[] as &[Vec<u8>],
    )
    .expect("store must load");
    let verifier: Box<dyn CertificateVerification> = Box::new(TrustListVerifier::new(store));

    let server = testdata("server.pem");
    // Fixture validity spans ~100 years, so wall-clock "now" is inside it.
    assert_eq!(verifier.verify_certificate(&server), Verdict::Good);
    assert_eq!(
        verifier.verify_application_uri(&server, "urn:example:server"),
        Verdict::Good
    );

    verifier.clear();
    assert_eq!(
        verifier.verify_certificate(&server),
        Verdict::ChainIncomplete
    );
}
