//! Storage key constants.

/// Storage keys used by the client.
///
/// The literal values match what earlier client releases persisted, so a
/// session written by a previous run keeps loading.
pub struct StorageKeys;

impl StorageKeys {
    /// Access token (short-lived, attached to each authenticated request)
    pub const ACCESS_TOKEN: &'static str = "token";

    /// Refresh token (longer-lived, exchanged for new access tokens)
    pub const REFRESH_TOKEN: &'static str = "refreshToken";
}
