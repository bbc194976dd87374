//! TLS extension contract and the static extension registry.
//!
//! Each extension type is a stateless descriptor implementing [`TlsExtension`].
//! Descriptors are `'static` and shared by every connection; all per-handshake
//! state lives in [`Connection`].

pub mod cert_status;

use tlsext_types::TlsError;
use tracing::{debug, trace};

use crate::connection::Connection;
use crate::stuffer::Stuffer;

use self::cert_status::CertStatusExtension;

/// TLS extension type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionType(pub u16);

impl ExtensionType {
    pub const SERVER_NAME: Self = Self(0);
    pub const STATUS_REQUEST: Self = Self(5);
}

/// The operations every extension type provides to the handshake driver.
pub trait TlsExtension: Send + Sync {
    /// Wire code of this extension.
    fn extension_type(&self) -> ExtensionType;

    /// Whether this extension belongs in the message being built.
    ///
    /// Must have no side effects. When it returns true, [`send`](Self::send)
    /// must succeed for the same connection state.
    fn should_send(&self, conn: &Connection) -> bool;

    /// Write the extension body. Never mutates the connection.
    fn send(&self, conn: &Connection, out: &mut Stuffer) -> Result<(), TlsError>;

    /// Consume exactly this extension's body from `input` and return the
    /// connection update it implies. Never mutates the connection.
    fn parse(&self, conn: &Connection, input: &mut Stuffer) -> Result<RecvEffect, TlsError>;

    /// Consume exactly this extension's body from `input` and apply its effect.
    fn recv(&self, conn: &mut Connection, input: &mut Stuffer) -> Result<(), TlsError> {
        let effect = self.parse(conn, input)?;
        effect(conn);
        Ok(())
    }
}

/// Connection update produced by [`TlsExtension::parse`], applied only once
/// the whole body has been accepted.
pub type RecvEffect = Box<dyn FnOnce(&mut Connection) + Send>;

/// An effect that leaves the connection untouched.
pub fn no_effect() -> RecvEffect {
    Box::new(|_: &mut Connection| {})
}

static CERT_STATUS: CertStatusExtension = CertStatusExtension;

static EXTENSIONS: &[&dyn TlsExtension] = &[&CERT_STATUS];

/// Look up the descriptor for an extension type.
pub fn extension_for(extension_type: ExtensionType) -> Option<&'static dyn TlsExtension> {
    EXTENSIONS
        .iter()
        .copied()
        .find(|ext| ext.extension_type() == extension_type)
}

/// Write `type(2) || length(2) || body` for `ext` if its predicate holds.
///
/// Returns whether the extension was written. On error `out` is left as it
/// was before the call.
pub fn send_extension(
    ext: &dyn TlsExtension,
    conn: &Connection,
    out: &mut Stuffer,
) -> Result<bool, TlsError> {
    let ty = ext.extension_type();
    if !ext.should_send(conn) {
        trace!(extension = ty.0, "extension not sent");
        return Ok(false);
    }
    let start = out.written();
    if let Err(e) = write_extension(ext, conn, out) {
        out.truncate(start);
        return Err(e);
    }
    debug!(extension = ty.0, "extension sent");
    Ok(true)
}

fn write_extension(
    ext: &dyn TlsExtension,
    conn: &Connection,
    out: &mut Stuffer,
) -> Result<(), TlsError> {
    out.write_u16(ext.extension_type().0)?;
    let size = out.reserve_u16()?;
    ext.send(conn, out)?;
    out.write_vector_size(size)
}

/// Write a length-prefixed extension list containing every type in `types`
/// whose predicate holds. Types without a registered descriptor are skipped.
pub fn send_extension_list(
    conn: &Connection,
    types: &[ExtensionType],
    out: &mut Stuffer,
) -> Result<(), TlsError> {
    let size = out.reserve_u16()?;
    for ty in types {
        if let Some(ext) = extension_for(*ty) {
            send_extension(ext, conn, out)?;
        }
    }
    out.write_vector_size(size)
}

/// Parse a length-prefixed extension list and dispatch each extension whose
/// type appears in `types`.
///
/// Other extensions are skipped. Each dispatched body is parsed from its own
/// buffer and must be consumed exactly before its effect is applied. A
/// repeated type is rejected.
pub fn recv_extension_list(
    conn: &mut Connection,
    types: &[ExtensionType],
    input: &mut Stuffer,
) -> Result<(), TlsError> {
    let list_len = input.read_u16()? as usize;
    let mut list = Stuffer::from_bytes(input.read_bytes(list_len)?);
    let mut seen: Vec<u16> = Vec::new();

    while !list.is_consumed() {
        let ty = list.read_u16()?;
        let len = list.read_u16()? as usize;
        let mut body = Stuffer::from_bytes(list.read_bytes(len)?);

        if seen.contains(&ty) {
            return Err(TlsError::DuplicateExtension(ty));
        }
        seen.push(ty);

        let ext = match extension_for(ExtensionType(ty)) {
            Some(ext) if types.contains(&ExtensionType(ty)) => ext,
            _ => {
                trace!(extension = ty, len, "ignoring extension");
                continue;
            }
        };

        let effect = ext.parse(conn, &mut body)?;
        if !body.is_consumed() {
            return Err(TlsError::BadMessage(format!(
                "extension 0x{ty:04X}: {} trailing bytes",
                body.remaining()
            )));
        }
        effect(conn);
        debug!(extension = ty, len, "extension received");
    }
    Ok(())
}
