//! Per-handshake connection state touched by the extension layer.

use std::sync::Arc;

use crate::cert::CertChainAndKey;
use crate::config::TlsConfig;
use crate::extensions::cert_status::StatusRequestType;
use crate::x509::X509Validator;
use crate::TlsRole;

/// Parameters negotiated during the handshake.
#[derive(Debug, Default)]
pub struct HandshakeParams {
    /// The local certificate selected for this handshake, shared with every
    /// other connection that selects it.
    pub our_chain_and_key: Option<Arc<CertChainAndKey>>,
}

/// Mutable state of a single handshake.
///
/// Owned by one handshake flow at a time; the extension layer reads it in
/// `should_send`/`send` and mutates it only in `recv`.
#[derive(Debug)]
pub struct Connection {
    /// Local role.
    pub role: TlsRole,
    /// Certificate status type requested by the client (as sent, for a
    /// client; as received, for a server).
    pub status_type: StatusRequestType,
    pub handshake_params: HandshakeParams,
    pub x509_validator: X509Validator,
    /// Stapled OCSP response received from the peer; empty until one is accepted.
    pub status_response: Vec<u8>,
    config: Arc<TlsConfig>,
}

impl Connection {
    /// Start a new handshake using `config`.
    ///
    /// Clients request the configured status type and validate the server's
    /// certificate. Servers start with no status request and do not validate
    /// client certificates in this layer.
    pub fn new(config: Arc<TlsConfig>) -> Self {
        let role = config.role;
        let (status_type, x509_validator) = match role {
            TlsRole::Client => (
                config.status_request_type,
                X509Validator::from_config(&config),
            ),
            TlsRole::Server => (StatusRequestType::None, X509Validator::without_validation()),
        };
        Self {
            role,
            status_type,
            handshake_params: HandshakeParams::default(),
            x509_validator,
            status_response: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &TlsConfig {
        &self.config
    }

    /// Select the local certificate for this handshake.
    pub fn set_our_chain_and_key(&mut self, chain_and_key: Arc<CertChainAndKey>) {
        self.handshake_params.our_chain_and_key = Some(chain_and_key);
    }

    /// The accepted stapled OCSP response, if one was received.
    pub fn ocsp_response(&self) -> Option<&[u8]> {
        if self.status_response.is_empty() {
            None
        } else {
            Some(&self.status_response)
        }
    }
}
