//! Session and identity model for the Cantina client.
//!
//! This crate provides:
//! - Typed claims decoded from the access token payload (no signature
//!   verification; the server is the verifier)
//! - Process-wide session state with login/logout and role-derived
//!   capability flags
//! - Synchronous route guarding for protected areas

mod claims;
mod guard;
mod session;
mod token;

pub use claims::{Claims, Role};
pub use guard::{evaluate_route, RouteAccess, RouteDecision};
pub use session::{SessionCallback, SessionChange, SessionContext};
pub use token::{decode_token, DecodedToken};
