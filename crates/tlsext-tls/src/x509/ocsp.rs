//! Structural decoding of DER-encoded OCSP responses (RFC 6960 §4.2.1).
//!
//! Only the `OCSPResponse` envelope is decoded here:
//!
//! ```text
//! OCSPResponse ::= SEQUENCE {
//!     responseStatus  ENUMERATED,
//!     responseBytes   [0] EXPLICIT ResponseBytes OPTIONAL }
//! ResponseBytes ::= SEQUENCE {
//!     responseType    OBJECT IDENTIFIER,
//!     response        OCTET STRING }
//! ```
//!
//! Signatures and per-certificate statuses are checked by the configured
//! verify callback.

const TAG_OCTET_STRING: u8 = 0x04;
const TAG_OID: u8 = 0x06;
const TAG_ENUMERATED: u8 = 0x0A;
const TAG_SEQUENCE: u8 = 0x30;
const TAG_CONTEXT_0: u8 = 0xA0;

/// Content octets of id-pkix-ocsp-basic (1.3.6.1.5.5.7.48.1.1).
pub const OID_PKIX_OCSP_BASIC: &[u8] = &[0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01, 0x01];

/// Errors from decoding an OCSP response envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OcspParseError {
    #[error("ocsp: truncated input")]
    Truncated,
    #[error("ocsp: expected tag 0x{expected:02X}, found 0x{found:02X}")]
    UnexpectedTag { expected: u8, found: u8 },
    #[error("ocsp: unsupported length encoding")]
    BadLength,
    #[error("ocsp: trailing data")]
    TrailingData,
    #[error("ocsp: unknown response status {0}")]
    UnknownStatus(u8),
    #[error("ocsp: missing response bytes")]
    MissingResponseBytes,
    #[error("ocsp: unsupported response type")]
    UnsupportedResponseType,
}

/// OCSP response status (RFC 6960 §4.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OcspResponseStatus {
    Successful = 0,
    MalformedRequest = 1,
    InternalError = 2,
    TryLater = 3,
    SigRequired = 5,
    Unauthorized = 6,
}

impl OcspResponseStatus {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Successful),
            1 => Some(Self::MalformedRequest),
            2 => Some(Self::InternalError),
            3 => Some(Self::TryLater),
            5 => Some(Self::SigRequired),
            6 => Some(Self::Unauthorized),
            _ => None,
        }
    }
}

/// A decoded `OCSPResponse` envelope borrowing from the input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcspResponse<'a> {
    pub status: OcspResponseStatus,
    /// Content octets of `responseType`, if response bytes are present.
    pub response_type: Option<&'a [u8]>,
    /// Content of the `response` OCTET STRING, if present.
    pub response: Option<&'a [u8]>,
}

impl<'a> OcspResponse<'a> {
    /// Decode an OCSP response envelope. The whole input must be one DER element.
    pub fn from_der(data: &'a [u8]) -> Result<Self, OcspParseError> {
        let mut top = Decoder::new(data);
        let outer = top.read_expected(TAG_SEQUENCE)?;
        top.finish()?;

        let mut seq = Decoder::new(outer);
        let status_bytes = seq.read_expected(TAG_ENUMERATED)?;
        let status_val = match status_bytes {
            [v] => *v,
            _ => return Err(OcspParseError::BadLength),
        };
        let status = OcspResponseStatus::from_u8(status_val)
            .ok_or(OcspParseError::UnknownStatus(status_val))?;

        let (response_type, response) = if seq.is_empty() {
            (None, None)
        } else {
            let mut explicit = Decoder::new(seq.read_expected(TAG_CONTEXT_0)?);
            let mut bytes = Decoder::new(explicit.read_expected(TAG_SEQUENCE)?);
            explicit.finish()?;
            let oid = bytes.read_expected(TAG_OID)?;
            let octets = bytes.read_expected(TAG_OCTET_STRING)?;
            bytes.finish()?;
            (Some(oid), Some(octets))
        };
        seq.finish()?;

        Ok(Self {
            status,
            response_type,
            response,
        })
    }

    /// The `BasicOCSPResponse` DER, checked to be a single SEQUENCE of type
    /// id-pkix-ocsp-basic.
    pub fn basic_response(&self) -> Result<&'a [u8], OcspParseError> {
        let (oid, der) = match (self.response_type, self.response) {
            (Some(oid), Some(der)) => (oid, der),
            _ => return Err(OcspParseError::MissingResponseBytes),
        };
        if oid != OID_PKIX_OCSP_BASIC {
            return Err(OcspParseError::UnsupportedResponseType);
        }
        let mut dec = Decoder::new(der);
        dec.read_expected(TAG_SEQUENCE)?;
        dec.finish()?;
        Ok(der)
    }
}

/// Minimal DER reader over single-byte tags.
struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn finish(&self) -> Result<(), OcspParseError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(OcspParseError::TrailingData)
        }
    }

    fn next_byte(&mut self) -> Result<u8, OcspParseError> {
        let b = *self.data.get(self.pos).ok_or(OcspParseError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn read_length(&mut self) -> Result<usize, OcspParseError> {
        let first = self.next_byte()?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        // 0x80 is the indefinite form, which DER forbids
        let num_bytes = (first & 0x7F) as usize;
        if num_bytes == 0 || num_bytes > 4 {
            return Err(OcspParseError::BadLength);
        }
        let mut length: usize = 0;
        for i in 0..num_bytes {
            let b = self.next_byte()?;
            if i == 0 && b == 0 {
                return Err(OcspParseError::BadLength);
            }
            length = (length << 8) | b as usize;
        }
        // DER requires the short form below 128
        if length < 0x80 {
            return Err(OcspParseError::BadLength);
        }
        Ok(length)
    }

    /// Read one element with tag `expected` and return its content octets.
    fn read_expected(&mut self, expected: u8) -> Result<&'a [u8], OcspParseError> {
        let found = self.next_byte()?;
        if found != expected {
            return Err(OcspParseError::UnexpectedTag { expected, found });
        }
        let length = self.read_length()?;
        let end = self
            .pos
            .checked_add(length)
            .filter(|&end| end <= self.data.len())
            .ok_or(OcspParseError::Truncated)?;
        let value = &self.data[self.pos..end];
        self.pos = end;
        Ok(value)
    }
}

// ---- Test helpers for building synthetic OCSP responses ----

#[cfg(test)]
pub(crate) fn der(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xFF {
        out.extend_from_slice(&[0x81, len as u8]);
    } else {
        out.extend_from_slice(&[0x82, (len >> 8) as u8, len as u8]);
    }
    out.extend_from_slice(content);
    out
}

/// Build an `OCSPResponse` with the given status and, optionally, a
/// basic response body (wrapped as id-pkix-ocsp-basic).
#[cfg(test)]
pub(crate) fn build_test_ocsp_response(
    status: OcspResponseStatus,
    basic_body: Option<&[u8]>,
) -> Vec<u8> {
    let mut content = der(TAG_ENUMERATED, &[status as u8]);
    if let Some(body) = basic_body {
        let basic = der(TAG_SEQUENCE, body);
        let mut bytes = der(TAG_OID, OID_PKIX_OCSP_BASIC);
        bytes.extend_from_slice(&der(TAG_OCTET_STRING, &basic));
        content.extend_from_slice(&der(TAG_CONTEXT_0, &der(TAG_SEQUENCE, &bytes)));
    }
    der(TAG_SEQUENCE, &content)
}
