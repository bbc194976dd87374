//! Certificate trust state and stapled OCSP response checks.

pub mod ocsp;
pub mod validator;

pub use validator::{StapleRejection, ValidatorState, X509Validator};
