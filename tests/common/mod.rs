// Common test utilities: in-memory fakes for the external services and a request helper
// Shared across all test files to avoid duplication
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use course_portal_backend::{
    app_config::{AppConfig, ContactConfig, Environment, PaystackConfig, SupabaseConfig},
    build_router,
    models::{
        AccessGrant, AppMetadata, AuthProvider, AuthSession, Profile, SessionUser,
        TransactionCompletion, TransactionStatus,
    },
    services::{
        FormRelay, GatewayVerdict, IdentityBackend, PaymentGateway, PaystackError, ProfileStore,
        RelayError, SupabaseError, VerifiedCharge,
    },
    AppState,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_SITE_URL: &str = "http://localhost:5173";
pub const TEST_CALLBACK_URL: &str = "http://localhost:8080/auth/callback";
pub const TEST_PAYSTACK_SECRET: &str = "sk_test_secret";

// =============================================================================
// FIXTURES
// =============================================================================

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_address: "127.0.0.1:0".to_string(),
        port: 0,
        environment: Environment::Test,
        site_url: TEST_SITE_URL.to_string(),
        auth_callback_url: TEST_CALLBACK_URL.to_string(),
        http_client_timeout_secs: 5,
        supabase: SupabaseConfig {
            url: Some("https://project.supabase.co".to_string()),
            service_role_key: Some("service-key".to_string()),
            anon_key: None,
        },
        paystack: PaystackConfig {
            secret_key: Some(TEST_PAYSTACK_SECRET.to_string()),
            ..PaystackConfig::default()
        },
        contact: ContactConfig {
            form_endpoint_url: Some("https://forms.example.com/f/abc".to_string()),
        },
    }
}

pub fn profile(email: &str, provider: AuthProvider, has_access: bool) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: None,
        auth_provider: provider,
        has_access,
        plan: None,
        created_at: None,
    }
}

pub fn google_session(user_id: Uuid, email: &str) -> AuthSession {
    AuthSession {
        access_token: format!("access-{}", user_id),
        refresh_token: Some("refresh".to_string()),
        expires_in: Some(3600),
        token_type: Some("bearer".to_string()),
        user: SessionUser {
            id: user_id,
            email: Some(email.to_string()),
            app_metadata: AppMetadata {
                provider: Some("google".to_string()),
                providers: vec!["google".to_string()],
            },
        },
    }
}

/// The `payment_transactions` columns the fake store tracks
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub reference: String,
    pub status: String,
    pub paystack_transaction_id: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

pub fn pending_transaction(reference: &str) -> TransactionRow {
    TransactionRow {
        reference: reference.to_string(),
        status: TransactionStatus::Pending.as_str().to_string(),
        paystack_transaction_id: None,
        completed_at: None,
    }
}

pub fn successful_charge(reference: &str, plan: Option<&str>, email: Option<&str>) -> GatewayVerdict {
    GatewayVerdict::Success(VerifiedCharge {
        transaction_id: 4099260516,
        reference: reference.to_string(),
        amount: 500000,
        customer_email: email.map(String::from),
        plan: plan.map(String::from),
    })
}

// =============================================================================
// FAKES
// =============================================================================

#[derive(Default)]
pub struct FakeStore {
    pub profiles: Mutex<HashMap<String, Profile>>,
    pub transactions: Mutex<HashMap<String, TransactionRow>>,
    pub grants: Mutex<Vec<(String, AccessGrant)>>,
    pub fail_lookup: AtomicBool,
    pub fail_grant: AtomicBool,
    pub fail_transaction_update: AtomicBool,
}

impl FakeStore {
    pub fn with_profile(self, profile: Profile) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.email.clone(), profile);
        self
    }

    pub fn with_transaction(self, transaction: TransactionRow) -> Self {
        self.transactions
            .lock()
            .unwrap()
            .insert(transaction.reference.clone(), transaction);
        self
    }

    pub fn profile(&self, email: &str) -> Option<Profile> {
        self.profiles.lock().unwrap().get(email).cloned()
    }

    pub fn transaction(&self, reference: &str) -> Option<TransactionRow> {
        self.transactions.lock().unwrap().get(reference).cloned()
    }

    fn api_error() -> SupabaseError {
        SupabaseError::Api {
            status: 500,
            message: "simulated failure".to_string(),
        }
    }
}

#[async_trait]
impl ProfileStore for FakeStore {
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, SupabaseError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(Self::api_error());
        }
        Ok(self.profile(email))
    }

    async fn grant_access(&self, email: &str, grant: &AccessGrant) -> Result<(), SupabaseError> {
        if self.fail_grant.load(Ordering::SeqCst) {
            return Err(Self::api_error());
        }

        self.grants
            .lock()
            .unwrap()
            .push((email.to_string(), grant.clone()));

        // PATCH semantics: zero matching rows is not an error
        if let Some(profile) = self.profiles.lock().unwrap().get_mut(email) {
            profile.has_access = grant.has_access;
            if grant.plan.is_some() {
                profile.plan = grant.plan.clone();
            }
        }
        Ok(())
    }

    async fn complete_transaction(
        &self,
        completion: &TransactionCompletion,
    ) -> Result<(), SupabaseError> {
        if self.fail_transaction_update.load(Ordering::SeqCst) {
            return Err(Self::api_error());
        }

        if let Some(transaction) = self
            .transactions
            .lock()
            .unwrap()
            .get_mut(&completion.reference)
        {
            transaction.status = TransactionStatus::Completed.as_str().to_string();
            transaction.paystack_transaction_id = Some(completion.paystack_transaction_id.clone());
            transaction.completed_at = Some(completion.completed_at);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeIdentity {
    pub session: Mutex<Option<AuthSession>>,
    pub exchanges: Mutex<Vec<(String, String)>>,
    pub signed_out: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn with_session(session: AuthSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
            ..Self::default()
        }
    }

    pub fn signed_out_tokens(&self) -> Vec<String> {
        self.signed_out.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityBackend for FakeIdentity {
    fn authorize_url(
        &self,
        provider: AuthProvider,
        redirect_to: &str,
        code_challenge: &str,
        provider_params: &[(&str, &str)],
    ) -> Result<String, SupabaseError> {
        let extra: Vec<String> = provider_params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        Ok(format!(
            "https://auth.test/authorize?provider={}&redirect_to={}&code_challenge={}&{}",
            provider.as_str(),
            redirect_to,
            code_challenge,
            extra.join("&")
        ))
    }

    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, SupabaseError> {
        self.exchanges
            .lock()
            .unwrap()
            .push((auth_code.to_string(), code_verifier.to_string()));

        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SupabaseError::Api {
                status: 400,
                message: "invalid flow state".to_string(),
            })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        self.signed_out
            .lock()
            .unwrap()
            .push(access_token.to_string());
        Ok(())
    }
}

pub struct FakeGateway {
    pub verdict: Mutex<Option<GatewayVerdict>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn answering(verdict: GatewayVerdict) -> Self {
        Self {
            verdict: Mutex::new(Some(verdict)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Gateway that fails with an undecodable response
    pub fn broken() -> Self {
        Self {
            verdict: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn verify_transaction(&self, reference: &str) -> Result<GatewayVerdict, PaystackError> {
        self.calls.lock().unwrap().push(reference.to_string());
        self.verdict
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PaystackError::Decode("unexpected body".to_string()))
    }
}

#[derive(Default)]
pub struct FakeRelay {
    pub received: Mutex<Vec<Bytes>>,
    pub reject_with: Option<u16>,
}

impl FakeRelay {
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

    pub fn received(&self) -> Vec<Bytes> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl FormRelay for FakeRelay {
    async fn forward(&self, body: Bytes) -> Result<(), RelayError> {
        self.received.lock().unwrap().push(body);
        match self.reject_with {
            Some(status) => Err(RelayError::Rejected {
                status,
                message: "Failed to submit form".to_string(),
            }),
            None => Ok(()),
        }
    }
}

// =============================================================================
// TEST APP
// =============================================================================

/// Test application wrapper; every integration starts unconfigured
pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            state: AppState {
                config: Arc::new(test_config()),
                profile_store: None,
                identity: None,
                payment_gateway: None,
                form_relay: None,
            },
        }
    }

    pub fn with_store(mut self, store: Arc<FakeStore>) -> Self {
        self.state.profile_store = Some(store);
        self
    }

    pub fn with_identity(mut self, identity: Arc<FakeIdentity>) -> Self {
        self.state.identity = Some(identity);
        self
    }

    pub fn with_gateway(mut self, gateway: Arc<FakeGateway>) -> Self {
        self.state.payment_gateway = Some(gateway);
        self
    }

    pub fn with_relay(mut self, relay: Arc<FakeRelay>) -> Self {
        self.state.form_relay = Some(relay);
        self
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Send a POST request
    pub fn post(&self, uri: &str) -> TestRequest {
        TestRequest::new(self.router(), "POST", uri)
    }

    /// Send a GET request
    pub fn get(&self, uri: &str) -> TestRequest {
        TestRequest::new(self.router(), "GET", uri)
    }

    pub fn options(&self, uri: &str) -> TestRequest {
        TestRequest::new(self.router(), "OPTIONS", uri)
    }
}

/// Test request builder
pub struct TestRequest {
    router: Router,
    method: &'static str,
    uri: String,
    headers: Vec<(String, String)>,
    body: Body,
}

impl TestRequest {
    fn new(router: Router, method: &'static str, uri: &str) -> Self {
        Self {
            router,
            method,
            uri: uri.to_string(),
            headers: Vec::new(),
            body: Body::empty(),
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(self, body: &T) -> Self {
        let bytes = serde_json::to_vec(body).unwrap();
        self.raw_body("application/json", bytes)
    }

    pub fn raw_body(mut self, content_type: &str, bytes: impl Into<Bytes>) -> Self {
        self.headers
            .push((header::CONTENT_TYPE.to_string(), content_type.to_string()));
        self.body = Body::from(bytes.into());
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        let request = builder.body(self.body).unwrap();

        let response = self.router.oneshot(request).await.unwrap();
        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    /// Get status code
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    pub fn headers_all(&self, name: &str) -> Vec<String> {
        self.response
            .headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(String::from)
            .collect()
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Get response body as text
    pub async fn text(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}
