// OAuth callback reconciliation
//
// Given a session freshly issued by the identity provider, decide how it relates to the
// `profiles` row for the same email and where the user goes next. Password-based accounts
// must never be taken over by an OAuth login for the same address, so any provider
// mismatch ends the session.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::models::{AuthProvider, AuthSession, Profile, SessionUser};
use crate::services::supabase::{IdentityBackend, ProfileStore};

pub const EMAIL_ALREADY_REGISTERED: &str =
    "This email is already registered. Please sign in with your email and password.";
pub const USE_PASSWORD_SIGN_IN: &str =
    "This account uses email and password sign-in. Please log in with your password.";
pub const ACCOUNT_MISMATCH: &str =
    "We couldn't match this sign-in to your account. Please try again.";
pub const AUTHENTICATION_FAILED: &str = "Authentication failed. Please try again.";

// =============================================================================
// OUTCOME TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Dashboard,
    Enroll,
    Login,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Dashboard => "/dashboard",
            Destination::Enroll => "/enroll",
            Destination::Login => "/login",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Info => "info",
            NoticeKind::Error => "error",
        }
    }
}

/// Toast shown by the front end after the redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub destination: Destination,
    /// The provider session must be revoked before redirecting
    pub sign_out: bool,
    pub notice: Option<Notice>,
}

impl CallbackOutcome {
    fn route(destination: Destination, notice: Notice) -> Self {
        Self {
            destination,
            sign_out: false,
            notice: Some(notice),
        }
    }

    fn reject(message: &str) -> Self {
        Self {
            destination: Destination::Login,
            sign_out: true,
            notice: Some(Notice::new(NoticeKind::Error, message)),
        }
    }

    /// Lookup or exchange failure: back to login, nothing to revoke
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self {
            destination: Destination::Login,
            sign_out: false,
            notice: Some(Notice::new(NoticeKind::Error, message)),
        }
    }

    /// `{site_url}{path}?notice=…&notice_kind=…`; any path prefix on `site_url` is kept
    pub fn redirect_url(&self, site_url: &str) -> Result<String, url::ParseError> {
        let mut url = Url::parse(site_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(self.destination.path().trim_start_matches('/'));
        if let Some(notice) = &self.notice {
            url.query_pairs_mut()
                .append_pair("notice", &notice.message)
                .append_pair("notice_kind", notice.kind.as_str());
        }
        Ok(url.into())
    }
}

// =============================================================================
// DECISION
// =============================================================================

/// Pure reconciliation of a session user against the profile found for their email
pub fn reconcile(user: &SessionUser, profile: Option<&Profile>) -> CallbackOutcome {
    let Some(profile) = profile else {
        // The database trigger creates the profile asynchronously
        return CallbackOutcome::route(
            Destination::Enroll,
            Notice::new(
                NoticeKind::Success,
                "Account created! Choose a plan to get started.",
            ),
        );
    };

    if profile.id != user.id {
        return match profile.auth_provider {
            AuthProvider::Manual => CallbackOutcome::reject(EMAIL_ALREADY_REGISTERED),
            AuthProvider::Google | AuthProvider::Unknown => {
                CallbackOutcome::reject(ACCOUNT_MISMATCH)
            },
        };
    }

    // Same identity but recorded as a password account: inconsistent, end the session
    if profile.is_manual() {
        return CallbackOutcome::reject(USE_PASSWORD_SIGN_IN);
    }

    if profile.has_access {
        CallbackOutcome::route(
            Destination::Dashboard,
            Notice::new(NoticeKind::Success, "Welcome back!"),
        )
    } else {
        CallbackOutcome::route(
            Destination::Enroll,
            Notice::new(NoticeKind::Info, "Choose a plan to unlock the course."),
        )
    }
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct AuthCallbackService {
    store: Arc<dyn ProfileStore>,
    identity: Arc<dyn IdentityBackend>,
}

impl AuthCallbackService {
    pub fn new(store: Arc<dyn ProfileStore>, identity: Arc<dyn IdentityBackend>) -> Self {
        Self { store, identity }
    }

    /// Look up the profile, decide, and revoke the session when the decision says so
    #[instrument(skip_all, fields(user_id = %session.user.id))]
    pub async fn handle(&self, session: &AuthSession) -> CallbackOutcome {
        let Some(email) = session.user.normalized_email() else {
            warn!("OAuth session carried no email address");
            return CallbackOutcome::authentication_failed(AUTHENTICATION_FAILED);
        };

        let profile = match self.store.find_profile_by_email(&email).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Profile lookup failed during OAuth callback: {}", e);
                return CallbackOutcome::authentication_failed(AUTHENTICATION_FAILED);
            },
        };

        let outcome = reconcile(&session.user, profile.as_ref());

        if outcome.sign_out {
            warn!(
                "Rejecting OAuth session for {}: provider conflict with existing profile",
                email
            );
            // Sign-out failure does not change the routing decision
            if let Err(e) = self.identity.sign_out(&session.access_token).await {
                error!("Failed to sign out rejected session: {}", e);
            }
        } else {
            info!(
                "OAuth callback for {} (provider: {:?}) routed to {}",
                email,
                session.user.app_metadata.provider,
                outcome.destination.path()
            );
        }

        outcome
    }
}
