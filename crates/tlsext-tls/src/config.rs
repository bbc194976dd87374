//! Connection configuration with builder pattern.

use std::fmt;
use std::sync::Arc;

use crate::extensions::cert_status::StatusRequestType;
use crate::x509::ocsp::OcspResponse;
use crate::TlsRole;

/// Decides whether a structurally valid stapled OCSP response is trusted.
///
/// Receives the parsed response and the peer chain (DER, leaf first) recorded
/// by the chain validator. Signature checking lives behind this callback.
/// Return `Err(reason)` to reject the response as untrusted.
pub type OcspVerifyCallback =
    Arc<dyn Fn(&OcspResponse<'_>, &[Vec<u8>]) -> Result<(), String> + Send + Sync>;

/// Configuration shared by every connection created from it.
#[derive(Clone)]
pub struct TlsConfig {
    /// The role (client or server).
    pub role: TlsRole,
    /// Whether to validate the peer's certificate chain at all.
    pub verify_peer: bool,
    /// Whether a stapled OCSP response received from the peer is checked.
    pub check_stapled_ocsp: bool,
    /// Run-time switch for OCSP stapling support. Only effective when the
    /// `ocsp-stapling` feature is compiled in.
    pub ocsp_stapling: bool,
    /// Status type a client requests from the server.
    pub status_request_type: StatusRequestType,
    /// Trust decision for stapled OCSP responses.
    pub ocsp_verify_callback: Option<OcspVerifyCallback>,
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig")
            .field("role", &self.role)
            .field("verify_peer", &self.verify_peer)
            .field("check_stapled_ocsp", &self.check_stapled_ocsp)
            .field("ocsp_stapling", &self.ocsp_stapling)
            .field("status_request_type", &self.status_request_type)
            .field(
                "ocsp_verify_callback",
                &self.ocsp_verify_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl TlsConfig {
    /// Create a builder for TLS configuration.
    pub fn builder() -> TlsConfigBuilder {
        TlsConfigBuilder::default()
    }

    /// Whether stapled OCSP responses can be validated in this build and configuration.
    pub fn ocsp_stapling_supported(&self) -> bool {
        cfg!(feature = "ocsp-stapling") && self.ocsp_stapling
    }
}

/// Builder for `TlsConfig`.
pub struct TlsConfigBuilder {
    role: TlsRole,
    verify_peer: bool,
    check_stapled_ocsp: bool,
    ocsp_stapling: bool,
    status_request_type: StatusRequestType,
    ocsp_verify_callback: Option<OcspVerifyCallback>,
}

impl Default for TlsConfigBuilder {
    fn default() -> Self {
        Self {
            role: TlsRole::Client,
            verify_peer: true,
            check_stapled_ocsp: true,
            ocsp_stapling: true,
            status_request_type: StatusRequestType::None,
            ocsp_verify_callback: None,
        }
    }
}

impl fmt::Debug for TlsConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfigBuilder")
            .field("role", &self.role)
            .field("status_request_type", &self.status_request_type)
            .finish_non_exhaustive()
    }
}

impl TlsConfigBuilder {
    pub fn role(mut self, role: TlsRole) -> Self {
        self.role = role;
        self
    }

    pub fn verify_peer(mut self, verify: bool) -> Self {
        self.verify_peer = verify;
        self
    }

    pub fn check_stapled_ocsp(mut self, check: bool) -> Self {
        self.check_stapled_ocsp = check;
        self
    }

    /// Disable (or re-enable) OCSP stapling support at run time.
    pub fn ocsp_stapling(mut self, enabled: bool) -> Self {
        self.ocsp_stapling = enabled;
        self
    }

    pub fn status_request_type(mut self, status_type: StatusRequestType) -> Self {
        self.status_request_type = status_type;
        self
    }

    pub fn ocsp_verify_callback(mut self, cb: OcspVerifyCallback) -> Self {
        self.ocsp_verify_callback = Some(cb);
        self
    }

    pub fn build(self) -> TlsConfig {
        TlsConfig {
            role: self.role,
            verify_peer: self.verify_peer,
            check_stapled_ocsp: self.check_stapled_ocsp,
            ocsp_stapling: self.ocsp_stapling,
            status_request_type: self.status_request_type,
            ocsp_verify_callback: self.ocsp_verify_callback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let config = TlsConfig::builder().build();
        assert_eq!(config.role, TlsRole::Client);
        assert!(config.verify_peer);
        assert!(config.check_stapled_ocsp);
        assert!(config.ocsp_stapling);
        assert_eq!(config.status_request_type, StatusRequestType::None);
        assert!(config.ocsp_verify_callback.is_none());
        assert_eq!(
            config.ocsp_stapling_supported(),
            cfg!(feature = "ocsp-stapling")
        );
    }

    #[test]
    fn test_config_builder_stapling_disabled() {
        let config = TlsConfig::builder()
            .role(TlsRole::Server)
            .ocsp_stapling(false)
            .build();
        assert_eq!(config.role, TlsRole::Server);
        assert!(!config.ocsp_stapling_supported());
    }

    #[test]
    fn test_config_builder_client_ocsp() {
        let config = TlsConfig::builder()
            .status_request_type(StatusRequestType::Ocsp)
            .check_stapled_ocsp(false)
            .verify_peer(false)
            .ocsp_verify_callback(Arc::new(|_: &OcspResponse<'_>, _: &[Vec<u8>]| Ok(())))
            .build();
        assert_eq!(config.status_request_type, StatusRequestType::Ocsp);
        assert!(!config.check_stapled_ocsp);
        assert!(!config.verify_peer);
        assert!(config.ocsp_verify_callback.is_some());
    }

    #[test]
    fn test_config_debug_elides_callback() {
        let config = TlsConfig::builder()
            .ocsp_verify_callback(Arc::new(|_: &OcspResponse<'_>, _: &[Vec<u8>]| {
                Err("no".to_string())
            }))
            .build();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("<callback>"));
    }
}
