#![forbid(unsafe_code)]
#![doc = "Common error types for the tlsext workspace."]

pub mod error;

pub use error::*;
