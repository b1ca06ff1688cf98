// Hosted database + auth client (PostgREST and GoTrue REST endpoints)

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use crate::models::{AccessGrant, AuthProvider, AuthSession, Profile, TransactionCompletion};

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Supabase API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// =============================================================================
// SEAMS
// =============================================================================

/// Reads and patches rows in the hosted `profiles` / `payment_transactions` tables
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, SupabaseError>;

    async fn grant_access(&self, email: &str, grant: &AccessGrant) -> Result<(), SupabaseError>;

    async fn complete_transaction(
        &self,
        completion: &TransactionCompletion,
    ) -> Result<(), SupabaseError>;
}

/// The hosted auth platform's OAuth surface
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    fn authorize_url(
        &self,
        provider: AuthProvider,
        redirect_to: &str,
        code_challenge: &str,
        provider_params: &[(&str, &str)],
    ) -> Result<String, SupabaseError>;

    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, SupabaseError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

const PROFILES_TABLE: &str = "profiles";
const TRANSACTIONS_TABLE: &str = "payment_transactions";

#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
    anon_key: String,
}

impl SupabaseClient {
    /// `anon_key` is used as the `apikey` header on auth endpoints; falls back to the service key
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        anon_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let service_key = service_key.into();
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            anon_key: anon_key.unwrap_or_else(|| service_key.clone()),
            base_url,
            service_key,
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn with_service_role(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    /// Map non-2xx responses to `SupabaseError::Api`, keeping the platform's message when present
    async fn check_status(response: Response) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|key| body.get(*key).and_then(|v| v.as_str()).map(String::from))
            })
            .unwrap_or(text);

        error!("Supabase request failed. Status: {}, Error: {}", status, message);

        Err(SupabaseError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    #[instrument(skip(self))]
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, SupabaseError> {
        let request = self
            .client
            .get(self.rest_url(PROFILES_TABLE))
            .query(&[
                ("email", format!("eq.{}", email)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ]);

        let response = Self::check_status(self.with_service_role(request).send().await?).await?;
        let mut rows: Vec<Profile> = response.json().await?;

        debug!("Profile lookup returned {} row(s)", rows.len());
        Ok(rows.pop())
    }

    #[instrument(skip(self, grant))]
    async fn grant_access(&self, email: &str, grant: &AccessGrant) -> Result<(), SupabaseError> {
        let request = self
            .client
            .patch(self.rest_url(PROFILES_TABLE))
            .query(&[("email", format!("eq.{}", email))])
            .header("Prefer", "return=minimal")
            .json(grant);

        Self::check_status(self.with_service_role(request).send().await?).await?;
        Ok(())
    }

    #[instrument(skip(self, completion), fields(reference = %completion.reference))]
    async fn complete_transaction(
        &self,
        completion: &TransactionCompletion,
    ) -> Result<(), SupabaseError> {
        let request = self
            .client
            .patch(self.rest_url(TRANSACTIONS_TABLE))
            .query(&[("reference", format!("eq.{}", completion.reference))])
            .header("Prefer", "return=minimal")
            .json(&completion.as_update());

        Self::check_status(self.with_service_role(request).send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityBackend for SupabaseClient {
    fn authorize_url(
        &self,
        provider: AuthProvider,
        redirect_to: &str,
        code_challenge: &str,
        provider_params: &[(&str, &str)],
    ) -> Result<String, SupabaseError> {
        let mut url = Url::parse(&self.auth_url("authorize"))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("provider", provider.as_str())
                .append_pair("redirect_to", redirect_to)
                .append_pair("code_challenge", code_challenge)
                .append_pair("code_challenge_method", "s256");
            for (key, value) in provider_params {
                query.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    #[instrument(skip_all)]
    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "pkce")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "auth_code": auth_code,
                "code_verifier": code_verifier,
            }))
            .send()
            .await?;

        let session = Self::check_status(response).await?.json().await?;
        Ok(session)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }
}
