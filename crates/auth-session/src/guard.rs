//! Synchronous route guarding for protected areas.

use crate::session::SessionContext;

/// Access class a route declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Open to everyone, signed in or not.
    Public,
    /// Requires an authenticated manager or staff principal.
    AdminOnly,
}

/// What the caller should do with the navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// No session at all: the visitor must sign in first.
    RedirectToLogin,
    /// Authenticated but not permitted here: bounce to a page the
    /// principal can use, never back to login.
    RedirectToHome,
}

/// Decide whether the current session may enter a route.
///
/// Purely local: the decision reads session state already in memory and
/// never touches the network.
pub fn evaluate_route(session: &SessionContext, access: RouteAccess) -> RouteDecision {
    match access {
        RouteAccess::Public => RouteDecision::Allow,
        RouteAccess::AdminOnly => {
            if !session.is_authenticated() {
                return RouteDecision::RedirectToLogin;
            }
            if !session.can_access_admin() {
                return RouteDecision::RedirectToHome;
            }
            RouteDecision::Allow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Claims, Role};
    use credential_store::{CredentialStorage, StorageResult, TokenVault};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct MemoryStorage {
        data: Mutex<HashMap<String, String>>,
    }

    impl MemoryStorage {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
            }
        }
    }

    impl CredentialStorage for MemoryStorage {
        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.data
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        fn remove(&self, key: &str) -> StorageResult<bool> {
            Ok(self.data.lock().unwrap().remove(key).is_some())
        }
    }

    fn session_with_role(role: Option<Role>) -> SessionContext {
        let vault = Arc::new(TokenVault::new(Box::new(MemoryStorage::new())));
        let session = SessionContext::new(vault);
        if let Some(role) = role {
            let principal = Claims {
                subject: "u1".to_string(),
                email: None,
                role,
                expires_at: None,
            };
            session.login(principal, None);
        }
        session
    }

    #[test]
    fn public_routes_are_open_to_everyone() {
        for role in [None, Some(Role::Manager), Some(Role::Staff), Some(Role::Customer)] {
            let session = session_with_role(role);
            assert_eq!(
                evaluate_route(&session, RouteAccess::Public),
                RouteDecision::Allow
            );
        }
    }

    #[test]
    fn admin_routes_redirect_anonymous_visitors_to_login() {
        let session = session_with_role(None);
        assert_eq!(
            evaluate_route(&session, RouteAccess::AdminOnly),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn admin_routes_admit_manager_and_staff() {
        for role in [Role::Manager, Role::Staff] {
            let session = session_with_role(Some(role));
            assert_eq!(
                evaluate_route(&session, RouteAccess::AdminOnly),
                RouteDecision::Allow
            );
        }
    }

    #[test]
    fn admin_routes_bounce_customers_home_not_to_login() {
        // A valid session must never be sent back through login.
        let session = session_with_role(Some(Role::Customer));
        assert_eq!(
            evaluate_route(&session, RouteAccess::AdminOnly),
            RouteDecision::RedirectToHome
        );
    }
}
