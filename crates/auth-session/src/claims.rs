//! Typed claims and role model.

use serde::{Deserialize, Serialize};

/// Role carried in the access token.
///
/// Unrecognized or absent role values map to `Customer`. Privileged
/// areas are gated on `Manager`/`Staff`, so an unknown role string
/// cannot reach them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Manager,
    Staff,
    Customer,
}

impl Role {
    /// Map a raw role claim to a Role. Matching is case-insensitive.
    pub fn from_claim(value: Option<&str>) -> Self {
        match value.map(|v| v.to_ascii_uppercase()).as_deref() {
            Some("MANAGER") => Role::Manager,
            Some("STAFF") => Role::Staff,
            _ => Role::Customer,
        }
    }

    /// Wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "MANAGER",
            Role::Staff => "STAFF",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Whether this role may enter the admin area.
    pub fn can_access_admin(self) -> bool {
        matches!(self, Role::Manager | Role::Staff)
    }
}

/// Application-focused representation of the access token claims.
///
/// A typed optional-field record rather than an open map, so downstream
/// code cannot silently accept malformed claims.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    /// Subject identifier; empty when the `sub` claim is absent.
    pub subject: String,
    pub email: Option<String>,
    pub role: Role,
    /// Expiry as epoch seconds; `None` means the token carries no expiry.
    pub expires_at: Option<i64>,
}

impl Claims {
    /// Placeholder principal for an accepted token whose payload could
    /// not be decoded: no subject, customer role.
    pub fn anonymous() -> Self {
        Self {
            subject: String::new(),
            email: None,
            role: Role::Customer,
            expires_at: None,
        }
    }
}

/// Raw payload shape as it appears on the wire. Every field is optional
/// and loosely typed; the conversion below normalizes it.
#[derive(Debug, Deserialize)]
pub(crate) struct ClaimsRepr {
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    email: Option<serde_json::Value>,
    #[serde(default)]
    role: Option<serde_json::Value>,
    #[serde(default)]
    exp: Option<serde_json::Value>,
}

impl From<ClaimsRepr> for Claims {
    fn from(repr: ClaimsRepr) -> Self {
        let subject = match repr.sub {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let email = repr
            .email
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let role = Role::from_claim(repr.role.as_ref().and_then(|v| v.as_str()));

        let expires_at = repr
            .exp
            .as_ref()
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)));

        Self {
            subject,
            email,
            role,
            expires_at,
        }
    }
}
