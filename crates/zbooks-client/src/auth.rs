//! Authentication operations.
//!
//! All operations return `Result` so no transport error ever escapes to the
//! embedding layer uncaught; render failures with
//! [`ApiError::display_message`](crate::ApiError::display_message).

use reqwest::Method;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{AuthenticatedUser, OtpGrant, RegisterForm, TokenPair};
use crate::session::Session;

/// Result of a successful login: the issued token pair and the freshly
/// fetched user profile.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated user, including organizations.
    pub user: AuthenticatedUser,
    /// The session that was stored.
    pub session: Session,
}

impl ApiClient {
    /// Log in with email and password.
    ///
    /// On success the token pair is persisted and the user profile is
    /// fetched. Tokens are stored as soon as `/auth/login/` succeeds, so a
    /// failing profile fetch leaves a valid session behind and surfaces its
    /// own error. On login failure the store is untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        debug!(%email, "logging in");
        let pair: TokenPair = self
            .post_json(
                "/auth/login/",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;

        let session = Session::new(pair.access, pair.refresh);
        self.store().save(&session).await?;

        let user = self.me().await?;
        Ok(LoginOutcome { user, session })
    }

    /// Register a new account, then log in with the same credentials.
    ///
    /// Registration itself returns no tokens; the implicit login obtains
    /// the session. The form is borrowed, not consumed, so a rejected
    /// submission leaves the caller's values intact for correction.
    pub async fn register(&self, form: &RegisterForm) -> Result<LoginOutcome, ApiError> {
        let payload = form.to_payload();
        debug!(email = %payload.email, "registering account");
        self.post_empty("/auth/register/", Some(serde_json::to_value(&payload)?))
            .await?;

        self.login(&form.email, &form.password).await
    }

    /// Fetch the authenticated user profile, including the current
    /// organization and the organization list.
    pub async fn me(&self) -> Result<AuthenticatedUser, ApiError> {
        self.get_json("/auth/me/").await
    }

    /// Log out: best-effort server notification, unconditional local teardown.
    ///
    /// A failing server call is logged and swallowed; the stored session is
    /// cleared regardless. This operation cannot fail from the caller's
    /// perspective.
    pub async fn logout(&self) {
        let body = match self.store().load().await {
            Ok(Some(session)) => {
                Some(serde_json::json!({ "refresh_token": session.refresh_token }))
            }
            _ => None,
        };

        match self.send(Method::POST, "/auth/logout/", body).await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "logout not acknowledged by server");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "logout notification failed"),
        }

        if let Err(e) = self.store().clear().await {
            warn!(error = %e, "failed to clear stored session");
        }
    }

    /// Request a one-time passcode for `destination` (email or mobile).
    pub async fn request_otp(&self, destination: &str) -> Result<(), ApiError> {
        self.post_empty(
            "/auth/otp/request/",
            Some(serde_json::json!({ "destination": destination })),
        )
        .await
    }

    /// Verify a one-time passcode, persisting the issued session.
    ///
    /// This is the one endpoint that bundles tokens and user in a single
    /// response; everything else uses the flat `{access, refresh}` envelope.
    pub async fn verify_otp(
        &self,
        destination: &str,
        code: &str,
    ) -> Result<LoginOutcome, ApiError> {
        let grant: OtpGrant = self
            .post_json(
                "/auth/otp/verify/",
                serde_json::json!({ "destination": destination, "code": code }),
            )
            .await?;

        let session = Session::new(grant.access, grant.refresh);
        self.store().save(&session).await?;
        Ok(LoginOutcome { user: grant.user, session })
    }
}
