//! Certificate chain and private key bundle.
//!
//! A [`CertChainAndKey`] is configured once by its owner and then shared
//! read-only (behind `Arc`) by every connection that selects it. The optional
//! OCSP response attached here is what the server staples.

use std::fmt;

use tlsext_types::TlsError;
use zeroize::Zeroize;

use crate::stuffer::U24_MAX;

/// Algorithm of a private key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    Ecdsa,
    Ed25519,
}

/// DER-encoded private key material, zeroized on drop.
#[derive(Clone)]
pub struct PrivateKey {
    algorithm: KeyAlgorithm,
    der: Vec<u8>,
}

impl PrivateKey {
    pub fn new(algorithm: KeyAlgorithm, der: Vec<u8>) -> Self {
        Self { algorithm, der }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.der.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .field("der", &format_args!("[{} bytes]", self.der.len()))
            .finish()
    }
}

/// A certificate chain (DER, leaf first), its private key and an optional
/// OCSP response to staple.
pub struct CertChainAndKey {
    cert_chain: Vec<Vec<u8>>,
    private_key: PrivateKey,
    /// Never `Some(empty)`; length always fits a 24-bit field.
    ocsp_status: Option<Vec<u8>>,
}

impl fmt::Debug for CertChainAndKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertChainAndKey")
            .field("chain_len", &self.cert_chain.len())
            .field("private_key", &self.private_key)
            .field(
                "ocsp_status",
                &self.ocsp_status.as_ref().map(|d| format!("[{} bytes]", d.len())),
            )
            .finish()
    }
}

impl CertChainAndKey {
    /// Bundle a non-empty chain with its key.
    pub fn new(cert_chain: Vec<Vec<u8>>, private_key: PrivateKey) -> Result<Self, TlsError> {
        if cert_chain.is_empty() || cert_chain.iter().any(|c| c.is_empty()) {
            return Err(TlsError::InvalidArgument(
                "certificate chain must contain non-empty certificates".into(),
            ));
        }
        Ok(Self {
            cert_chain,
            private_key,
            ocsp_status: None,
        })
    }

    /// Attach an OCSP response to staple. Empty `data` removes any attached response.
    pub fn set_ocsp_data(&mut self, data: &[u8]) -> Result<(), TlsError> {
        if data.is_empty() {
            self.ocsp_status = None;
            return Ok(());
        }
        if data.len() > U24_MAX as usize {
            return Err(TlsError::IntegerOverflow {
                value: data.len() as u64,
                bits: 24,
            });
        }
        self.ocsp_status = Some(data.to_vec());
        Ok(())
    }

    /// Builder-style variant of [`set_ocsp_data`](Self::set_ocsp_data).
    pub fn with_ocsp_data(mut self, data: &[u8]) -> Result<Self, TlsError> {
        self.set_ocsp_data(data)?;
        Ok(self)
    }

    pub fn clear_ocsp_data(&mut self) {
        self.ocsp_status = None;
    }

    /// The attached OCSP response, if any. Never returns an empty slice.
    pub fn ocsp_data(&self) -> Option<&[u8]> {
        self.ocsp_status.as_deref()
    }

    pub fn cert_chain(&self) -> &[Vec<u8>] {
        &self.cert_chain
    }

    pub fn leaf(&self) -> &[u8] {
        &self.cert_chain[0]
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}
