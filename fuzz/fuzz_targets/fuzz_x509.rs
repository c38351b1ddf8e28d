#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = certkit_pki::x509::Certificate::load(data);
    let _ = certkit_pki::x509::CertificationRequest::load(data);
});
