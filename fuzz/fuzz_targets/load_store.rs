#![no_main]

use libfuzzer_sys::fuzz_target;
use uatrust_lib::CertificateStore;

fuzz_target!(|data: &[u8]| {
    // Store loading must never panic, whatever the bytes; it either builds
    // a fully populated store or fails closed.
    let buffers = [data.to_vec()];
    let _ = CertificateStore::from_der_lists(&buffers, &buffers, &buffers);
    let _ = uatrust_lib::split_certificate_blob(data);
});
