//! `sheetbill-auth`: login check and session tokens.
//!
//! Decoupled from HTTP: the API layer extracts the bearer token and hands it
//! here.

pub mod claims;
pub mod login;
pub mod session;

pub use claims::{validate_claims, SessionClaims, TokenValidationError};
pub use login::{AuthError, LoginCredentials};
pub use session::{SessionTokens, SESSION_TTL_HOURS};
