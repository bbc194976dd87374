#![no_main]
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use tlsext_tls::config::TlsConfig;
use tlsext_tls::connection::Connection;
use tlsext_tls::extensions::{recv_extension_list, ExtensionType};
use tlsext_tls::stuffer::Stuffer;

fuzz_target!(|data: &[u8]| {
    let config = Arc::new(TlsConfig::builder().verify_peer(false).build());
    let mut conn = Connection::new(config);
    let mut input = Stuffer::from_bytes(data);
    let _ = recv_extension_list(&mut conn, &[ExtensionType::STATUS_REQUEST], &mut input);
});
