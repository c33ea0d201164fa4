//! Login flows for the two sign-in surfaces.

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use auth_session::{decode_token, Claims, Role};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginEnvelope {
    data: LoginTokens,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginTokens {
    access_token: String,
    refresh_token: String,
}

/// Result of a successful login: the credential pair is already stored,
/// and the principal is decoded from the new access token.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub principal: Claims,
}

impl ApiClient {
    /// Exchange credentials for a token pair and persist it.
    ///
    /// The principal is decoded locally from the returned access token.
    /// A token the server accepted but whose payload is not decodable
    /// still logs in, with an anonymous customer principal.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginOutcome> {
        let envelope: LoginEnvelope = self
            .post("login", &LoginRequest { email, password })
            .await?;

        let tokens = envelope.data;
        self.vault()
            .store_tokens(&tokens.access_token, &tokens.refresh_token);

        let principal = match decode_token(&tokens.access_token) {
            Some(decoded) => decoded.claims,
            None => {
                warn!("Login succeeded but the access token payload is not decodable");
                Claims::anonymous()
            }
        };
        info!(subject = %principal.subject, role = ?principal.role, "Login succeeded");

        Ok(LoginOutcome {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            principal,
        })
    }

    /// Login for the staff-facing surface: customers are turned away
    /// after the exchange.
    ///
    /// The stored tokens are kept even when the gate rejects; only the
    /// surface is refused, not the session.
    pub async fn login_admin(&self, email: &str, password: &str) -> ApiResult<LoginOutcome> {
        let outcome = self.login(email, password).await?;
        if outcome.principal.role == Role::Customer {
            return Err(ApiError::AccessDenied {
                message: "restricted area: use the customer sign-in".to_string(),
            });
        }
        Ok(outcome)
    }

    /// Login for the customer-facing surface: staff and managers are
    /// turned away after the exchange.
    pub async fn login_customer(&self, email: &str, password: &str) -> ApiResult<LoginOutcome> {
        let outcome = self.login(email, password).await?;
        if outcome.principal.role != Role::Customer {
            return Err(ApiError::AccessDenied {
                message: "only customers can use this sign-in".to_string(),
            });
        }
        Ok(outcome)
    }
}
