#![forbid(unsafe_code)]
#![doc = "TLS handshake extension layer: byte buffer, extension contract and certificate status (OCSP stapling)."]

pub mod alert;
pub mod cert;
pub mod config;
pub mod connection;
pub mod extensions;
pub mod stuffer;
pub mod x509;

pub use tlsext_types::TlsError;

/// The role of a TLS endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsRole {
    Client,
    Server,
}
