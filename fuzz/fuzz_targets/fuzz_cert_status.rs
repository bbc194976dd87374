#![no_main]
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use tlsext_tls::config::TlsConfig;
use tlsext_tls::connection::Connection;
use tlsext_tls::extensions::cert_status::CertStatusExtension;
use tlsext_tls::extensions::TlsExtension;
use tlsext_tls::stuffer::Stuffer;

fuzz_target!(|data: &[u8]| {
    let config = Arc::new(TlsConfig::builder().build());
    let mut conn = Connection::new(config);
    conn.x509_validator.mark_chain_validated(Vec::new());

    let mut input = Stuffer::from_bytes(data);
    let before = input.remaining();
    match CertStatusExtension.recv(&mut conn, &mut input) {
        Ok(()) => assert!(input.remaining() <= before),
        // A failed recv must never leave a partial response behind
        Err(_) => assert!(conn.status_response.is_empty()),
    }
});
