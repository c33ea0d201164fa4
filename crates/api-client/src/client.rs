//! Request pipeline: bearer credentials, refresh-and-replay, typed
//! request helpers.

use crate::error::{normalize_failure, normalize_transport, ApiError, ApiResult};
use client_core::{Config, CoreResult};
use credential_store::TokenVault;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Request timeout applied when no configuration is supplied.
pub const DEFAULT_TIMEOUT_SECS: u64 = client_core::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Callback invoked when the session cannot be renewed and the stored
/// credentials have been cleared. UI collaborators use this to send the
/// visitor back to the sign-in screen.
pub type SessionExpiredCallback = Box<dyn Fn() + Send + Sync>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(serde::Deserialize)]
struct RefreshResponse {
    token: Option<String>,
}

/// HTTP client for the Cantina backend.
///
/// All requests share one pipeline:
/// - the stored access token is attached as a bearer credential
/// - a 401 triggers one refresh exchange and one replay of the request
/// - a failed refresh clears the stored credentials and surfaces the
///   original 401
/// - every failure is a normalized [`ApiError`]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    vault: Arc<TokenVault>,
    /// Serializes refresh exchanges so concurrent 401s coalesce into a
    /// single round-trip.
    refresh_lock: tokio::sync::Mutex<()>,
    session_expired: Mutex<Option<SessionExpiredCallback>>,
}

impl ApiClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str, vault: Arc<TokenVault>) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            vault,
            refresh_lock: tokio::sync::Mutex::new(()),
            session_expired: Mutex::new(None),
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config, vault: Arc<TokenVault>) -> CoreResult<Self> {
        let base_url = config.api_base_url()?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            timeout: Duration::from_secs(config.request_timeout_secs),
            vault,
            refresh_lock: tokio::sync::Mutex::new(()),
            session_expired: Mutex::new(None),
        })
    }

    /// Set a callback to be notified when the session terminates because
    /// a refresh exchange failed.
    pub fn set_session_expired_callback(&self, callback: SessionExpiredCallback) {
        let mut cb = self.session_expired.lock().unwrap();
        *cb = Some(callback);
    }

    pub(crate) fn vault(&self) -> &Arc<TokenVault> {
        &self.vault
    }

    /// GET a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(Method::GET, path, None).await?;
        decode_body(response).await
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = encode_body(body)?;
        let response = self.send(Method::POST, path, Some(body)).await?;
        decode_body(response).await
    }

    /// PUT a JSON body and decode a JSON response.
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = encode_body(body)?;
        let response = self.send(Method::PUT, path, Some(body)).await?;
        decode_body(response).await
    }

    /// DELETE a resource, ignoring any response body.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Run one request through the full pipeline.
    ///
    /// The credential is captured before dispatch so that, on a 401, the
    /// refresh step can tell whether a concurrent request already
    /// replaced it.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<reqwest::Response> {
        let credential = self.vault.access_token();

        let response = self
            .dispatch(&method, path, body.as_ref(), credential.as_deref())
            .await
            .map_err(normalize_transport)?;

        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }
        if status != 401 {
            return Err(normalize_failure(response).await);
        }

        // 401: renew the session once and replay. The original error is
        // kept so a failed renewal surfaces the rejection that started
        // it, not the refresh endpoint's.
        let original = normalize_failure(response).await;
        debug!(%method, path, "Request rejected with 401, attempting refresh");

        if let Err(err) = self.refresh_access_token(credential.as_deref()).await {
            warn!(error = %err, "Refresh exchange failed, terminating session");
            self.vault.clear();
            self.notify_session_expired();
            return Err(original);
        }

        let fresh = self.vault.access_token();
        let replayed = self
            .dispatch(&method, path, body.as_ref(), fresh.as_deref())
            .await
            .map_err(normalize_transport)?;

        // A second 401 propagates as-is; one replay only.
        if replayed.status().as_u16() < 400 {
            debug!(%method, path, "Replay after refresh succeeded");
            Ok(replayed)
        } else {
            Err(normalize_failure(replayed).await)
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        credential: Option<&str>,
    ) -> reqwest::Result<reqwest::Response> {
        let mut request = self
            .http
            .request(method.clone(), self.endpoint(path))
            .timeout(self.timeout);
        if let Some(token) = credential {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Concurrent callers coalesce: the exchange runs under a lock, and
    /// a caller whose stale credential no longer matches the vault knows
    /// another request already renewed the session.
    async fn refresh_access_token(&self, stale: Option<&str>) -> ApiResult<()> {
        let _guard = self.refresh_lock.lock().await;

        if self.vault.access_token().as_deref() != stale {
            debug!("Access token already renewed by a concurrent request");
            return Ok(());
        }

        let refresh_token = self.vault.refresh_token().ok_or_else(|| {
            ApiError::Unauthenticated {
                message: "no refresh token stored".to_string(),
            }
        })?;

        // The exchange itself carries no bearer credential.
        let response = self
            .http
            .post(self.endpoint("refresh-token"))
            .timeout(self.timeout)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(normalize_transport)?;

        if !response.status().is_success() {
            return Err(normalize_failure(response).await);
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Serialization(err.to_string()))?;
        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Serialization("refresh response missing token".to_string()))?;

        // Only the access token is replaced; the refresh token stays.
        self.vault.store_access_token(&token);
        info!("Access token renewed");
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn notify_session_expired(&self) {
        let cb = self.session_expired.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback();
        }
    }
}

fn encode_body<B: Serialize>(body: &B) -> ApiResult<serde_json::Value> {
    serde_json::to_value(body).map_err(|err| ApiError::Serialization(err.to_string()))
}

async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    response
        .json()
        .await
        .map_err(|err| ApiError::Serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use credential_store::{CredentialStorage, StorageResult};
    use std::collections::HashMap;

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

    fn make_client(base_url: &str) -> ApiClient {
        let vault = Arc::new(TokenVault::new(Box::new(MemoryStorage::new())));
        ApiClient::new(base_url, vault).unwrap()
    }

    #[test]
    fn endpoint_joins_base_and_path() {
        let client = make_client("http://localhost:3000/api");
        assert_eq!(
            client.endpoint("products"),
            "http://localhost:3000/api/products"
        );
    }

    #[test]
    fn endpoint_tolerates_redundant_slashes() {
        let client = make_client("http://localhost:3000/api/");
        assert_eq!(client.endpoint("/orders"), "http://localhost:3000/api/orders");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let vault = Arc::new(TokenVault::new(Box::new(MemoryStorage::new())));
        assert!(ApiClient::new("not a url", vault).is_err());
    }
}
