//! Process-wide authenticated-identity state.
//!
//! The vault is the durable source of truth; the principal held here is
//! an in-memory cache rebuilt from it. Two states only: principal
//! present (authenticated) or absent (unauthenticated).

use crate::claims::{Claims, Role};
use crate::token::decode_token;
use credential_store::{CredentialPair, TokenVault};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Payload delivered to the state-change callback.
#[derive(Debug, Clone)]
pub struct SessionChange {
    pub authenticated: bool,
    pub subject: Option<String>,
    pub role: Option<Role>,
}

/// Callback type for session state change notifications.
pub type SessionCallback = Box<dyn Fn(SessionChange) + Send + Sync>;

/// Authenticated-identity state derived from the stored access token.
pub struct SessionContext {
    vault: Arc<TokenVault>,
    principal: Mutex<Option<Claims>>,
    /// Optional callback for state change notifications.
    state_callback: Mutex<Option<SessionCallback>>,
}

impl SessionContext {
    /// Create a new session context over the given vault.
    pub fn new(vault: Arc<TokenVault>) -> Self {
        Self {
            vault,
            principal: Mutex::new(None),
            state_callback: Mutex::new(None),
        }
    }

    /// Set a callback to be notified when the session flips between
    /// authenticated and unauthenticated.
    ///
    /// This is how UI collaborators learn to re-render or navigate.
    pub fn set_state_callback(&self, callback: SessionCallback) {
        let mut cb = self.state_callback.lock().unwrap();
        *cb = Some(callback);
    }

    /// Rebuild the principal from the stored access token.
    ///
    /// Called at process start, and again whenever the stored
    /// credentials may have changed. No network is involved: an expired
    /// but decodable token still yields a principal, and the request
    /// pipeline refreshes it on the first 401.
    pub fn initialize(&self) {
        let token = match self.vault.access_token() {
            Some(token) => token,
            None => {
                debug!("No stored access token, session starts unauthenticated");
                self.set_principal(None);
                return;
            }
        };

        match decode_token(&token) {
            Some(decoded) => {
                if decoded.is_expired {
                    debug!("Stored access token is expired; the first 401 will refresh it");
                }
                info!(
                    subject = %decoded.claims.subject,
                    role = ?decoded.claims.role,
                    "Session restored from stored token"
                );
                self.set_principal(Some(decoded.claims));
            }
            None => {
                warn!("Stored access token is not decodable, clearing credentials");
                self.vault.clear();
                self.set_principal(None);
            }
        }
    }

    /// Establish an authenticated session.
    ///
    /// When the login surface has already persisted the tokens it may
    /// pass `None`; otherwise the pair is stored here so both tokens
    /// land together.
    pub fn login(&self, principal: Claims, credentials: Option<&CredentialPair>) {
        if let Some(pair) = credentials {
            self.vault
                .store_tokens(&pair.access_token, &pair.refresh_token);
        }
        info!(subject = %principal.subject, role = ?principal.role, "Logged in");
        self.set_principal(Some(principal));
    }

    /// Terminate the session and clear stored credentials.
    pub fn logout(&self) {
        self.vault.clear();
        info!("Logged out");
        self.set_principal(None);
    }

    /// Whether a principal is currently present.
    pub fn is_authenticated(&self) -> bool {
        self.principal.lock().unwrap().is_some()
    }

    /// The current principal, if any.
    pub fn principal(&self) -> Option<Claims> {
        self.principal.lock().unwrap().clone()
    }

    /// The current principal's role, if any.
    pub fn role(&self) -> Option<Role> {
        self.principal.lock().unwrap().as_ref().map(|c| c.role)
    }

    /// Whether the current principal may enter the admin area.
    pub fn can_access_admin(&self) -> bool {
        self.role().map(Role::can_access_admin).unwrap_or(false)
    }

    /// Public surfaces are open to everyone, signed in or not.
    pub fn can_access_public_area(&self) -> bool {
        true
    }

    fn set_principal(&self, next: Option<Claims>) {
        let mut guard = self.principal.lock().unwrap();
        let was_authenticated = guard.is_some();
        *guard = next;
        let change = SessionChange {
            authenticated: guard.is_some(),
            subject: guard.as_ref().map(|c| c.subject.clone()),
            role: guard.as_ref().map(|c| c.role),
        };
        drop(guard);

        if was_authenticated != change.authenticated {
            debug!(authenticated = change.authenticated, "Session state changed");
            self.notify(change);
        }
    }

    fn notify(&self, change: SessionChange) {
        let cb = self.state_callback.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback(change);
        }
    }
}
