//! HTTP adapters for the sign-in collaborators.
//!
//! - Identity provider: GoTrue-style auth API (`/auth/v1/user`, `/auth/v1/logout`)
//! - Role store: PostgREST-style table query (`/rest/v1/<table>`)
//! - Token verifier: JSON endpoint answering `{"success": bool}`
//!
//! Provider and role store are built per request because they act with the
//! caller's access token.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use commissionhub_auth::{
    AccessToken, Identity, PortError, RoleStore, Session, SessionProvider, TokenVerifier,
    UserRoleRecord, Verification,
};
use commissionhub_core::SubjectId;

/// Log-safe summary of a response body (it may echo tokens back).
fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

fn transport(err: reqwest::Error) -> PortError {
    PortError::transport(err.to_string())
}

async fn status_error(response: reqwest::Response, what: &str) -> PortError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body_summary = summarize_response_body(&body);
    tracing::warn!(status = %status, body_summary = %body_summary, "{what} failed");
    PortError::Status {
        status: status.as_u16(),
        body: body_summary,
    }
}

/// Shared client for the provider's auth and REST APIs.
#[derive(Clone)]
pub struct SupabaseClient {
    http_client: reqwest::Client,
    api_url: String,
    anon_key: String,
    role_table: String,
}

impl SupabaseClient {
    /// # Arguments
    /// * `api_url` - project base URL (e.g., `https://xyz.supabase.co`)
    /// * `anon_key` - public API key sent as `apikey`
    /// * `role_table` - table holding the `role` column keyed by user `id`
    pub fn new(
        api_url: impl Into<String>,
        anon_key: impl Into<String>,
        role_table: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into(),
            anon_key: anon_key.into(),
            role_table: role_table.into(),
        }
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.api_url, endpoint)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }

    /// Session provider acting for the given (possibly absent) token.
    pub fn session(&self, token: Option<AccessToken>) -> SupabaseSessionProvider {
        SupabaseSessionProvider {
            client: self.clone(),
            token,
        }
    }

    /// Role lookups authenticated as the caller, so row-level policies apply.
    pub fn role_store(&self, token: Option<AccessToken>) -> SupabaseRoleStore {
        SupabaseRoleStore {
            client: self.clone(),
            token,
        }
    }

    fn bearer<'a>(&'a self, token: Option<&'a AccessToken>) -> &'a str {
        token.map(AccessToken::expose).unwrap_or(self.anon_key.as_str())
    }

    async fn fetch_user(&self, token: &AccessToken) -> Result<Option<Identity>, PortError> {
        let response = self
            .http_client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token.expose())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            s if s.is_success() => {
                let identity: Identity = response
                    .json()
                    .await
                    .map_err(|e| PortError::decode(e.to_string()))?;
                tracing::debug!(subject = %identity.subject, "provider returned user");
                Ok(Some(identity))
            }
            // Expired or revoked token: there is no user behind it.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::debug!(status = %response.status(), "provider rejected session token");
                Ok(None)
            }
            _ => Err(status_error(response, "fetch user").await),
        }
    }
}

impl core::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("api_url", &self.api_url)
            .field("role_table", &self.role_table)
            .finish_non_exhaustive()
    }
}

/// Request-scoped session provider.
#[derive(Debug, Clone)]
pub struct SupabaseSessionProvider {
    client: SupabaseClient,
    token: Option<AccessToken>,
}

impl SessionProvider for SupabaseSessionProvider {
    async fn get_session(&self) -> Result<Option<Session>, PortError> {
        let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let identity = self.client.fetch_user(token).await?;
        Ok(Some(Session::new(token.clone(), identity)))
    }

    async fn get_user(&self) -> Result<Option<Identity>, PortError> {
        match self.token.as_ref().filter(|t| !t.is_empty()) {
            Some(token) => self.client.fetch_user(token).await,
            None => Ok(None),
        }
    }

    async fn sign_out(&self) -> Result<(), PortError> {
        let Some(token) = self.token.as_ref() else {
            return Ok(());
        };
        let response = self
            .client
            .http_client
            .post(self.client.auth_url("logout"))
            .header("apikey", &self.client.anon_key)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response, "sign out").await);
        }
        tracing::debug!("provider session revoked");
        Ok(())
    }
}

/// Request-scoped role lookup.
#[derive(Debug, Clone)]
pub struct SupabaseRoleStore {
    client: SupabaseClient,
    token: Option<AccessToken>,
}

impl RoleStore for SupabaseRoleStore {
    async fn find_role(&self, subject: &SubjectId) -> Result<Option<UserRoleRecord>, PortError> {
        let client = &self.client;
        let filter = format!("eq.{subject}");
        let response = client
            .http_client
            .get(client.rest_url(&client.role_table))
            .query(&[("id", filter.as_str()), ("select", "role"), ("limit", "1")])
            .header("apikey", &client.anon_key)
            .bearer_auth(client.bearer(self.token.as_ref()))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response, "role lookup").await);
        }

        let rows: Vec<UserRoleRecord> = response
            .json()
            .await
            .map_err(|e| PortError::decode(e.to_string()))?;
        Ok(rows.into_iter().next())
    }
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Backend verification action reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTokenVerifier {
    http_client: reqwest::Client,
    verify_url: String,
}

impl HttpTokenVerifier {
    pub fn new(verify_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            verify_url: verify_url.into(),
        }
    }
}

impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &AccessToken) -> Result<Verification, PortError> {
        let response = self
            .http_client
            .post(&self.verify_url)
            .json(&VerifyRequest {
                token: token.expose(),
            })
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            s if s.is_success() => {
                let body: VerifyResponse = response
                    .json()
                    .await
                    .map_err(|e| PortError::decode(e.to_string()))?;
                if body.success {
                    Ok(Verification::Verified)
                } else {
                    Ok(Verification::rejected(
                        body.error.unwrap_or_else(|| "verification failed".to_string()),
                    ))
                }
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(Verification::rejected(
                format!("verifier answered {}", response.status()),
            )),
            _ => Err(status_error(response, "token verification").await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> AccessToken {
        AccessToken::new("user-token")
    }

    #[tokio::test]
    async fn session_carries_provider_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("apikey", "anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "0b6f3f1e-user",
                "email": "owner@store.example",
                "aud": "authenticated"
            })))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon", "users");
        let session = client.session(Some(token())).get_session().await.unwrap().unwrap();
        let identity = session.identity.unwrap();
        assert_eq!(identity.subject.as_str(), "0b6f3f1e-user");
        assert_eq!(identity.email.as_deref(), Some("owner@store.example"));
    }

    #[tokio::test]
    async fn rejected_token_yields_no_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon", "users");
        let session = client.session(Some(token())).get_session().await.unwrap().unwrap();
        assert!(session.identity.is_none());
        assert!(client.session(Some(token())).get_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn no_token_means_no_session_and_no_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon", "users");
        assert!(client.session(None).get_session().await.unwrap().is_none());
        client.session(None).sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn provider_outage_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon", "users");
        let err = client.session(Some(token())).get_session().await.unwrap_err();
        assert!(matches!(err, PortError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn role_lookup_queries_single_row_by_subject() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.user-1"))
            .and(query_param("select", "role"))
            .and(query_param("limit", "1"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "role": "StorePartner" }])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon", "profiles");
        let record = client
            .role_store(Some(token()))
            .find_role(&SubjectId::new("user-1"))
            .await
            .unwrap();
        assert_eq!(record, Some(UserRoleRecord::new("StorePartner")));
    }

    #[tokio::test]
    async fn role_lookup_without_rows_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon", "users");
        let record = client
            .role_store(None)
            .find_role(&SubjectId::new("user-1"))
            .await
            .unwrap();
        assert_eq!(record, None);
    }

    #[tokio::test]
    async fn verifier_maps_success_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .and(body_json(json!({ "token": "user-token" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let verifier = HttpTokenVerifier::new(format!("{}/verify", server.uri()));
        assert_eq!(verifier.verify(&token()).await.unwrap(), Verification::Verified);
    }

    #[tokio::test]
    async fn verifier_failure_result_is_a_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": false, "error": "token expired" })),
            )
            .mount(&server)
            .await;

        let verifier = HttpTokenVerifier::new(format!("{}/verify", server.uri()));
        assert_eq!(
            verifier.verify(&token()).await.unwrap(),
            Verification::rejected("token expired")
        );
    }

    #[tokio::test]
    async fn verifier_server_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let verifier = HttpTokenVerifier::new(format!("{}/verify", server.uri()));
        assert!(verifier.verify(&token()).await.is_err());
    }

    #[test]
    fn body_summary_hides_content() {
        let summary = summarize_response_body("secret-token-echo");
        assert!(summary.starts_with("len=17,"));
        assert!(!summary.contains("secret"));
    }
}
