//! Per-connection certificate trust validator.
//!
//! Chain verification itself happens elsewhere; it reports its outcome through
//! [`X509Validator::mark_chain_validated`] or
//! [`X509Validator::mark_chain_rejected`]. The extension layer only reads
//! [`X509Validator::state`] and asks the validator to judge a stapled OCSP
//! response once the chain has been accepted.

use std::fmt;

use tlsext_types::TlsError;
use tracing::{debug, warn};

use crate::config::{OcspVerifyCallback, TlsConfig};
use crate::x509::ocsp::{OcspResponse, OcspResponseStatus};

/// Chain validation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorState {
    /// No chain has been processed yet.
    Unstarted,
    /// The peer chain was accepted.
    Validated,
    /// The peer chain was accepted and a stapled OCSP response was accepted for it.
    OcspValidated,
    /// The peer chain was rejected.
    Rejected,
}

/// Why a stapled OCSP response was refused.
///
/// When stapling support is unavailable, every refusal is `Untrusted`; the
/// malformed/untrusted split only exists when responses can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StapleRejection {
    /// The response is not a structurally valid OCSP response.
    Malformed,
    /// The response cannot be trusted, or cannot be checked at all.
    Untrusted,
    /// A staple arrived before the chain was validated.
    InvalidState,
}

impl From<StapleRejection> for TlsError {
    fn from(r: StapleRejection) -> Self {
        match r {
            StapleRejection::Malformed => TlsError::InvalidOcspResponse,
            StapleRejection::Untrusted => TlsError::CertUntrusted,
            StapleRejection::InvalidState => TlsError::InvalidCertState,
        }
    }
}

/// Trust validator owned by a single connection.
pub struct X509Validator {
    state: ValidatorState,
    skip_cert_validation: bool,
    check_stapled_ocsp: bool,
    stapling_supported: bool,
    ocsp_verify_callback: Option<OcspVerifyCallback>,
    peer_chain: Vec<Vec<u8>>,
}

impl fmt::Debug for X509Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X509Validator")
            .field("state", &self.state)
            .field("skip_cert_validation", &self.skip_cert_validation)
            .field("check_stapled_ocsp", &self.check_stapled_ocsp)
            .field("stapling_supported", &self.stapling_supported)
            .field("peer_chain_len", &self.peer_chain.len())
            .finish_non_exhaustive()
    }
}

impl X509Validator {
    /// Build a validator from the connection configuration.
    pub fn from_config(config: &TlsConfig) -> Self {
        if !config.verify_peer {
            return Self::without_validation();
        }
        Self {
            state: ValidatorState::Unstarted,
            skip_cert_validation: false,
            check_stapled_ocsp: config.check_stapled_ocsp,
            stapling_supported: config.ocsp_stapling_supported(),
            ocsp_verify_callback: config.ocsp_verify_callback.clone(),
            peer_chain: Vec::new(),
        }
    }

    /// A validator that accepts whatever the peer presents.
    pub fn without_validation() -> Self {
        Self {
            state: ValidatorState::Unstarted,
            skip_cert_validation: true,
            check_stapled_ocsp: false,
            stapling_supported: false,
            ocsp_verify_callback: None,
            peer_chain: Vec::new(),
        }
    }

    pub fn state(&self) -> ValidatorState {
        self.state
    }

    pub fn skips_validation(&self) -> bool {
        self.skip_cert_validation
    }

    pub fn stapling_supported(&self) -> bool {
        self.stapling_supported
    }

    /// Record that the chain verifier accepted `chain` (DER, leaf first).
    pub fn mark_chain_validated(&mut self, chain: Vec<Vec<u8>>) {
        self.peer_chain = chain;
        self.state = ValidatorState::Validated;
    }

    /// Record that the chain verifier rejected the peer chain.
    pub fn mark_chain_rejected(&mut self) {
        self.peer_chain.clear();
        self.state = ValidatorState::Rejected;
    }

    /// The chain recorded by [`mark_chain_validated`](Self::mark_chain_validated).
    pub fn peer_chain(&self) -> &[Vec<u8>] {
        &self.peer_chain
    }

    /// Judge a stapled OCSP response against the already-validated chain.
    ///
    /// On success the state moves to `OcspValidated`. On failure the state is
    /// left unchanged.
    pub fn validate_stapled_ocsp_response(
        &mut self,
        response: &[u8],
    ) -> Result<(), StapleRejection> {
        self.check_stapled_ocsp_response(response)?;
        self.mark_ocsp_validated();
        Ok(())
    }

    /// Same checks as [`validate_stapled_ocsp_response`](Self::validate_stapled_ocsp_response)
    /// without recording the outcome.
    pub fn check_stapled_ocsp_response(&self, response: &[u8]) -> Result<(), StapleRejection> {
        if self.skip_cert_validation || !self.check_stapled_ocsp {
            debug!(len = response.len(), "stapled ocsp response not checked");
            return Ok(());
        }

        if self.state != ValidatorState::Validated {
            warn!(state = ?self.state, "stapled ocsp response before chain validation");
            return Err(StapleRejection::InvalidState);
        }

        if !self.stapling_supported {
            warn!("ocsp stapling unsupported, treating response as untrusted");
            return Err(StapleRejection::Untrusted);
        }

        self.check_response(response).map_err(|r| {
            warn!(rejection = ?r, "stapled ocsp response rejected");
            r
        })?;

        debug!(len = response.len(), "stapled ocsp response accepted");
        Ok(())
    }

    /// Record that a stapled OCSP response passed
    /// [`check_stapled_ocsp_response`](Self::check_stapled_ocsp_response).
    pub fn mark_ocsp_validated(&mut self) {
        self.state = ValidatorState::OcspValidated;
    }

    fn check_response(&self, response: &[u8]) -> Result<(), StapleRejection> {
        let parsed = OcspResponse::from_der(response).map_err(|e| {
            debug!(error = %e, "ocsp response parse failed");
            StapleRejection::Malformed
        })?;

        if parsed.status != OcspResponseStatus::Successful {
            debug!(status = ?parsed.status, "ocsp responder did not answer successfully");
            return Err(StapleRejection::Untrusted);
        }

        parsed.basic_response().map_err(|e| {
            debug!(error = %e, "ocsp basic response unusable");
            StapleRejection::Malformed
        })?;

        let cb = self
            .ocsp_verify_callback
            .as_ref()
            .ok_or(StapleRejection::Untrusted)?;
        cb(&parsed, self.peer_chain.as_slice()).map_err(|reason| {
            debug!(%reason, "ocsp verify callback rejected response");
            StapleRejection::Untrusted
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x509::ocsp::build_test_ocsp_response;
    #[cfg(feature = "ocsp-stapling")]
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn good_response() -> Vec<u8> {
        build_test_ocsp_response(OcspResponseStatus::Successful, Some(&[0x02, 0x01, 0x00]))
    }

    fn accept_all() -> OcspVerifyCallback {
        Arc::new(|_: &OcspResponse<'_>, _: &[Vec<u8>]| Ok(()))
    }

    #[cfg(feature = "ocsp-stapling")]
    fn checking_validator(callback: Option<OcspVerifyCallback>) -> X509Validator {
        let mut builder = TlsConfig::builder();
        if let Some(cb) = callback {
            builder = builder.ocsp_verify_callback(cb);
        }
        let mut v = X509Validator::from_config(&builder.build());
        v.mark_chain_validated(vec![vec![0x30, 0x01]]);
        v
    }

    #[test]
    fn test_without_validation_accepts_anything() {
        let mut v = X509Validator::without_validation();
        assert!(v.skips_validation());
        v.validate_stapled_ocsp_response(b"anything").unwrap();
        assert_eq!(v.state(), ValidatorState::OcspValidated);
    }

    #[test]
    fn test_verify_peer_false_skips() {
        let config = TlsConfig::builder().verify_peer(false).build();
        let v = X509Validator::from_config(&config);
        assert!(v.skips_validation());
    }

    #[test]
    fn test_check_disabled_accepts() {
        let config = TlsConfig::builder().check_stapled_ocsp(false).build();
        let mut v = X509Validator::from_config(&config);
        v.validate_stapled_ocsp_response(b"garbage").unwrap();
        assert_eq!(v.state(), ValidatorState::OcspValidated);
    }

    #[test]
    fn test_check_leaves_state_alone() {
        let config = TlsConfig::builder().check_stapled_ocsp(false).build();
        let mut v = X509Validator::from_config(&config);
        v.mark_chain_validated(vec![vec![0x30]]);
        v.check_stapled_ocsp_response(b"garbage").unwrap();
        assert_eq!(v.state(), ValidatorState::Validated);
        v.mark_ocsp_validated();
        assert_eq!(v.state(), ValidatorState::OcspValidated);
    }

    #[test]
    fn test_state_transitions() {
        let mut v = X509Validator::from_config(&TlsConfig::builder().build());
        assert_eq!(v.state(), ValidatorState::Unstarted);
        v.mark_chain_validated(vec![vec![1], vec![2]]);
        assert_eq!(v.state(), ValidatorState::Validated);
        assert_eq!(v.peer_chain().len(), 2);
        v.mark_chain_rejected();
        assert_eq!(v.state(), ValidatorState::Rejected);
        assert!(v.peer_chain().is_empty());
    }

    #[test]
    fn test_staple_before_chain_validation() {
        let mut v = X509Validator::from_config(&TlsConfig::builder().build());
        assert_eq!(
            v.validate_stapled_ocsp_response(&good_response()),
            Err(StapleRejection::InvalidState)
        );
        assert_eq!(v.state(), ValidatorState::Unstarted);
    }

    #[test]
    fn test_unsupported_rejects_everything_as_untrusted() {
        let config = TlsConfig::builder()
            .ocsp_stapling(false)
            .ocsp_verify_callback(accept_all())
            .build();
        let mut v = X509Validator::from_config(&config);
        v.mark_chain_validated(vec![vec![0x30]]);
        assert!(!v.stapling_supported());

        for input in [&b"OCSP DATA"[..], &good_response()[..]] {
            assert_eq!(
                v.validate_stapled_ocsp_response(input),
                Err(StapleRejection::Untrusted)
            );
        }
        assert_eq!(v.state(), ValidatorState::Validated);
    }

    #[cfg(feature = "ocsp-stapling")]
    #[test]
    fn test_malformed_response() {
        let mut v = checking_validator(Some(accept_all()));
        assert_eq!(
            v.validate_stapled_ocsp_response(b"OCSP DATA"),
            Err(StapleRejection::Malformed)
        );
        let no_bytes = build_test_ocsp_response(OcspResponseStatus::Successful, None);
        assert_eq!(
            v.validate_stapled_ocsp_response(&no_bytes),
            Err(StapleRejection::Malformed)
        );
        assert_eq!(v.state(), ValidatorState::Validated);
    }

    #[cfg(feature = "ocsp-stapling")]
    #[test]
    fn test_unsuccessful_status_is_untrusted() {
        let mut v = checking_validator(Some(accept_all()));
        let resp = build_test_ocsp_response(OcspResponseStatus::Unauthorized, None);
        assert_eq!(
            v.validate_stapled_ocsp_response(&resp),
            Err(StapleRejection::Untrusted)
        );
    }

    #[cfg(feature = "ocsp-stapling")]
    #[test]
    fn test_no_callback_is_untrusted() {
        let mut v = checking_validator(None);
        assert_eq!(
            v.validate_stapled_ocsp_response(&good_response()),
            Err(StapleRejection::Untrusted)
        );
    }

    #[cfg(feature = "ocsp-stapling")]
    #[test]
    fn test_callback_decides_trust() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let cb: OcspVerifyCallback = Arc::new(move |resp: &OcspResponse<'_>, chain: &[Vec<u8>]| {
            c.fetch_add(1, Ordering::SeqCst);
            assert_eq!(chain, &[vec![0x30, 0x01]]);
            if resp.basic_response().is_ok() {
                Ok(())
            } else {
                Err("unexpected".to_string())
            }
        });
        let mut v = checking_validator(Some(cb));
        v.validate_stapled_ocsp_response(&good_response()).unwrap();
        assert_eq!(v.state(), ValidatorState::OcspValidated);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let reject: OcspVerifyCallback =
            Arc::new(|_: &OcspResponse<'_>, _: &[Vec<u8>]| Err("untrusted signer".to_string()));
        let mut v = checking_validator(Some(reject));
        assert_eq!(
            v.validate_stapled_ocsp_response(&good_response()),
            Err(StapleRejection::Untrusted)
        );
        assert_eq!(v.state(), ValidatorState::Validated);
    }

    #[test]
    fn test_rejection_maps_to_tls_error() {
        assert_eq!(
            TlsError::from(StapleRejection::Malformed),
            TlsError::InvalidOcspResponse
        );
        assert_eq!(
            TlsError::from(StapleRejection::Untrusted),
            TlsError::CertUntrusted
        );
        assert_eq!(
            TlsError::from(StapleRejection::InvalidState),
            TlsError::InvalidCertState
        );
    }
}
