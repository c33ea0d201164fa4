//! Resilient HTTP client for the Cantina backend.
//!
//! Every request goes through one pipeline: the stored access token is
//! attached as a bearer credential, a 401 triggers a single refresh
//! exchange followed by one replay, and every failure surfaces as a
//! normalized [`ApiError`] with a status code and a display message.

mod client;
mod error;
mod login;

pub use client::{ApiClient, SessionExpiredCallback, DEFAULT_TIMEOUT_SECS};
pub use error::{ApiError, ApiResult};
pub use login::LoginOutcome;
