//! Alerts raised when an extension fails to encode or decode.
//!
//! The extension layer never sends alerts itself; the handshake driver uses
//! [`Alert::for_error`] to pick the fatal alert matching a failure.

use tlsext_types::TlsError;

/// Alert severity level. Every failure in this layer is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlertLevel {
    Fatal = 2,
}

/// Alert descriptions the extension layer can map failures to (RFC 8446 §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlertDescription {
    BadCertificate = 42,
    IllegalParameter = 47,
    DecodeError = 50,
    InternalError = 80,
    BadCertificateStatusResponse = 113,
}

impl AlertDescription {
    /// Convert from u8 to AlertDescription.
    pub fn from_u8(v: u8) -> Result<Self, u8> {
        match v {
            42 => Ok(AlertDescription::BadCertificate),
            47 => Ok(AlertDescription::IllegalParameter),
            50 => Ok(AlertDescription::DecodeError),
            80 => Ok(AlertDescription::InternalError),
            113 => Ok(AlertDescription::BadCertificateStatusResponse),
            _ => Err(v),
        }
    }
}

/// A TLS alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub description: AlertDescription,
}

impl Alert {
    pub fn fatal(description: AlertDescription) -> Self {
        Self {
            level: AlertLevel::Fatal,
            description,
        }
    }

    /// The fatal alert to send when an extension operation fails with `err`.
    pub fn for_error(err: &TlsError) -> Self {
        let description = match err {
            TlsError::BufferUnderflow { .. } | TlsError::BadMessage(_) => {
                AlertDescription::DecodeError
            }
            TlsError::InvalidOcspResponse => AlertDescription::BadCertificateStatusResponse,
            TlsError::CertUntrusted => AlertDescription::BadCertificate,
            TlsError::DuplicateExtension(_) => AlertDescription::IllegalParameter,
            TlsError::BufferFull { .. }
            | TlsError::IntegerOverflow { .. }
            | TlsError::InvalidCertState
            | TlsError::InvalidArgument(_) => AlertDescription::InternalError,
        };
        Self::fatal(description)
    }

    /// Wire encoding: `level(1) || description(1)`.
    pub fn to_bytes(self) -> [u8; 2] {
        [self.level as u8, self.description as u8]
    }
}
