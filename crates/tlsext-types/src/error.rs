/// TLS extension layer errors.
///
/// Every variant is terminal for the handshake that produced it; nothing in
/// the extension layer retries or recovers locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TlsError {
    // Buffer errors
    #[error("buffer underflow: need {requested} bytes, {available} available")]
    BufferUnderflow { requested: usize, available: usize },
    #[error("buffer full: need {requested} bytes, {available} available")]
    BufferFull { requested: usize, available: usize },
    #[error("integer overflow: {value} does not fit in {bits} bits")]
    IntegerOverflow { value: u64, bits: u32 },

    // Certificate status errors
    #[error("invalid ocsp response")]
    InvalidOcspResponse,
    #[error("certificate is untrusted")]
    CertUntrusted,
    #[error("certificate validator in invalid state")]
    InvalidCertState,

    // Extension framing errors
    #[error("duplicate extension 0x{0:04X}")]
    DuplicateExtension(u16),
    #[error("bad message: {0}")]
    BadMessage(String),

    // Setup errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl TlsError {
    /// Shorthand for an underflow while reading `requested` bytes.
    pub fn underflow(requested: usize, available: usize) -> Self {
        TlsError::BufferUnderflow {
            requested,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TlsError::underflow(4, 1).to_string(),
            "buffer underflow: need 4 bytes, 1 available"
        );
        assert_eq!(
            TlsError::DuplicateExtension(5).to_string(),
            "duplicate extension 0x0005"
        );
        assert_eq!(TlsError::CertUntrusted.to_string(), "certificate is untrusted");
    }
}
