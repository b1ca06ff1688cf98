// Centralized configuration management for the course portal backend
// All env vars are read once at startup; integrations stay optional until a request needs them

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,

    /// Front-end base URL that callback redirects land on
    pub site_url: String,
    /// Public URL of this service's `/auth/callback` route
    pub auth_callback_url: String,
    pub http_client_timeout_secs: u64,

    pub supabase: SupabaseConfig,
    pub paystack: PaystackConfig,
    pub contact: ContactConfig,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Hosted database / auth platform settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub service_role_key: Option<String>,
    #[serde(skip_serializing)]
    pub anon_key: Option<String>,
}

/// Payment gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaystackConfig {
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub base_url: String,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            base_url: DEFAULT_PAYSTACK_BASE_URL.to_string(),
        }
    }
}

/// Contact form relay settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactConfig {
    pub form_endpoint_url: Option<String>,
}

pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        // Blank values count as unset so an empty `.env` entry reads as "not configured"
        let get_optional = |key: &str| -> Option<String> {
            env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let environment = Environment::from(get_or_default("ENVIRONMENT", "development"));

        let site_url = get_or_default("SITE_URL", "http://localhost:5173");
        url::Url::parse(&site_url)
            .map_err(|e| ConfigError::InvalidValue("SITE_URL".to_string(), e.to_string()))?;

        let auth_callback_url = get_or_default(
            "AUTH_CALLBACK_URL",
            &format!("http://localhost:{}/auth/callback", port),
        );
        url::Url::parse(&auth_callback_url).map_err(|e| {
            ConfigError::InvalidValue("AUTH_CALLBACK_URL".to_string(), e.to_string())
        })?;

        let http_client_timeout_secs = parse_u64_or_default("HTTP_CLIENT_TIMEOUT_SECS", "30")?;

        let supabase = SupabaseConfig {
            url: get_optional("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            service_role_key: get_optional("SUPABASE_SERVICE_ROLE_KEY"),
            anon_key: get_optional("SUPABASE_ANON_KEY"),
        };

        let paystack = PaystackConfig {
            secret_key: get_optional("PAYSTACK_SECRET_KEY"),
            base_url: get_or_default("PAYSTACK_BASE_URL", DEFAULT_PAYSTACK_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        };

        let contact = ContactConfig {
            form_endpoint_url: get_optional("FORM_ENDPOINT_URL"),
        };

        // The service role key bypasses row level security
        if environment == Environment::Production
            && supabase.url.is_some()
            && supabase.service_role_key.is_none()
        {
            return Err(ConfigError::MissingVar(
                "SUPABASE_SERVICE_ROLE_KEY".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            port,
            environment,
            site_url,
            auth_callback_url,
            http_client_timeout_secs,
            supabase,
            paystack,
            contact,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
