//! Certificate status encode/decode benchmarks.
//!
//! Run with: cargo bench -p tlsext-tls

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tlsext_tls::cert::{CertChainAndKey, KeyAlgorithm, PrivateKey};
use tlsext_tls::config::TlsConfig;
use tlsext_tls::connection::Connection;
use tlsext_tls::extensions::cert_status::{CertStatusExtension, StatusRequestType};
use tlsext_tls::extensions::TlsExtension;
use tlsext_tls::stuffer::Stuffer;
use tlsext_tls::TlsRole;

fn stapling_server(ocsp_len: usize) -> Connection {
    let ck = CertChainAndKey::new(
        vec![vec![0x30; 512]],
        PrivateKey::new(KeyAlgorithm::Ecdsa, vec![0x01; 32]),
    )
    .unwrap()
    .with_ocsp_data(&vec![0xA5; ocsp_len])
    .unwrap();
    let mut conn = Connection::new(Arc::new(TlsConfig::builder().role(TlsRole::Server).build()));
    conn.status_type = StatusRequestType::Ocsp;
    conn.set_our_chain_and_key(Arc::new(ck));
    conn.x509_validator.mark_chain_validated(Vec::new());
    conn
}

fn bench_cert_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("cert_status");

    for size in [256, 2048, 16384] {
        let server = stapling_server(size);

        group.bench_with_input(BenchmarkId::new("send", size), &size, |bench, _| {
            bench.iter(|| {
                let mut out = Stuffer::growable(0);
                CertStatusExtension.send(&server, &mut out).unwrap();
                out
            });
        });

        let mut encoded = Stuffer::growable(0);
        CertStatusExtension.send(&server, &mut encoded).unwrap();
        let wire = encoded.data().to_vec();
        let config = Arc::new(TlsConfig::builder().verify_peer(false).build());

        group.bench_with_input(BenchmarkId::new("recv", size), &size, |bench, _| {
            bench.iter(|| {
                let mut peer = Connection::new(config.clone());
                let mut input = Stuffer::from_bytes(&wire);
                CertStatusExtension.recv(&mut peer, &mut input).unwrap();
                peer
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cert_status);
criterion_main!(benches);
