// Profile record from the hosted `profiles` table
// Rows are created by a database trigger on first sign-in; this service only reads and patches them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// How a profile's identity was established
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[serde(alias = "email")]
    Manual, // email + password
    Google,
    /// Null or unrecognised column value
    #[default]
    #[serde(other)]
    Unknown,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Manual => "manual",
            AuthProvider::Google => "google",
            AuthProvider::Unknown => "unknown",
        }
    }
}

fn provider_or_unknown<'de, D>(deserializer: D) -> Result<AuthProvider, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<AuthProvider>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "provider_or_unknown")]
    pub auth_provider: AuthProvider,
    #[serde(default)]
    pub has_access: bool,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn is_manual(&self) -> bool {
        self.auth_provider == AuthProvider::Manual
    }
}

/// Patch applied once a payment is verified
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccessGrant {
    pub has_access: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl AccessGrant {
    pub fn with_plan(plan: Option<String>) -> Self {
        Self {
            has_access: true,
            plan,
        }
    }
}

/// Profiles are keyed by lowercased, trimmed email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
