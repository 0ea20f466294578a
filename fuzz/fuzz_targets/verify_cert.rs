#![no_main]

use libfuzzer_sys::fuzz_target;
use uatrust_lib::{verify_application_uri, verify_certificate, CertificateStore};

fuzz_target!(|data: &[u8]| {
    // Verification must terminate with a verdict and never panic, whatever
    // the peer presents.
    let store = CertificateStore::empty();
    let _ = verify_certificate(&store, data);
    let _ = verify_application_uri(data, "urn:example:fuzz");
});
