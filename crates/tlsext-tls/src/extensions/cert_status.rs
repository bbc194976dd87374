//! Certificate Status extension: OCSP stapling (RFC 6066 §8).
//!
//! Body: `status_type(1) || ocsp_response_length(3) || ocsp_response`. The
//! length and response are only present when `status_type` is ocsp(1).

use tlsext_types::TlsError;
use tracing::debug;

use crate::connection::Connection;
use crate::extensions::{no_effect, ExtensionType, RecvEffect, TlsExtension};
use crate::stuffer::{Stuffer, U24_MAX};
use crate::x509::ValidatorState;
use crate::TlsRole;

/// Certificate status type (RFC 6066 `CertificateStatusType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StatusRequestType {
    #[default]
    None = 0,
    Ocsp = 1,
}

impl StatusRequestType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::None),
            1 => Some(Self::Ocsp),
            _ => None,
        }
    }
}

/// The certificate status extension descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CertStatusExtension;

impl CertStatusExtension {
    fn ocsp_data(conn: &Connection) -> Option<&[u8]> {
        conn.handshake_params
            .our_chain_and_key
            .as_deref()
            .and_then(|ck| ck.ocsp_data())
            .filter(|data| !data.is_empty())
    }
}

impl TlsExtension for CertStatusExtension {
    fn extension_type(&self) -> ExtensionType {
        ExtensionType::STATUS_REQUEST
    }

    fn should_send(&self, conn: &Connection) -> bool {
        conn.role == TlsRole::Server
            && conn.status_type == StatusRequestType::Ocsp
            && Self::ocsp_data(conn).is_some()
            && conn.x509_validator.state() == ValidatorState::Validated
    }

    fn send(&self, conn: &Connection, out: &mut Stuffer) -> Result<(), TlsError> {
        let ocsp = Self::ocsp_data(conn).ok_or_else(|| {
            TlsError::BadMessage("certificate status: no ocsp response to send".into())
        })?;
        // Checked before writing so a failure leaves `out` untouched.
        let len = u32::try_from(ocsp.len())
            .ok()
            .filter(|&len| len <= U24_MAX)
            .ok_or(TlsError::IntegerOverflow {
                value: ocsp.len() as u64,
                bits: 24,
            })?;

        out.write_u8(StatusRequestType::Ocsp as u8)?;
        out.write_u24(len)?;
        out.write_bytes(ocsp)?;
        debug!(len, "certificate status written");
        Ok(())
    }

    fn parse(&self, conn: &Connection, input: &mut Stuffer) -> Result<RecvEffect, TlsError> {
        let status_type = input.read_u8()?;
        if status_type != StatusRequestType::Ocsp as u8 {
            debug!(status_type, "ignoring non-ocsp certificate status");
            return Ok(no_effect());
        }

        let len = input.read_u24()? as usize;
        let response = input.read_bytes(len)?;
        conn.x509_validator.check_stapled_ocsp_response(response)?;

        let response = response.to_vec();
        Ok(Box::new(move |conn: &mut Connection| {
            conn.x509_validator.mark_ocsp_validated();
            conn.status_response = response;
            debug!(len, "stapled ocsp response stored");
        }))
    }
}
