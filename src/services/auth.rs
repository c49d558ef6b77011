// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in state: login, registration, token refresh and logout.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use serde_json::Value;
use validator::Validate;

use super::password::{LoginForm, RegisterForm};
use crate::client::api::join_path;
use crate::client::{ApiError, AuthorizedClient, RequestOptions};
use crate::models::{
    AuthResponse, ForgotPasswordRequest, LoginCredentials, RegisterData, TechInterestsUpdate,
    User,
};

/// Reply to every password reset request, whether or not the account exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

#[derive(Clone)]
pub struct AuthService {
    client: AuthorizedClient,
}

impl AuthService {
    pub fn new(client: AuthorizedClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthorizedClient {
        &self.client
    }

    /// Validate, authenticate and persist the resulting session.
    pub async fn login(&self, form: LoginForm) -> Result<User, ApiError> {
        form.validate()?;
        let credentials = LoginCredentials::from(form);

        let auth: AuthResponse = self
            .client
            .post("users/authenticate", &credentials, RequestOptions::default())
            .await?;

        self.client.session().save_auth(&auth)?;
        tracing::info!(user_id = %auth.user.id, "Signed in");
        Ok(auth.user)
    }

    /// Validate, create the account and sign it in.
    pub async fn register(&self, form: RegisterForm) -> Result<User, ApiError> {
        form.validate()?;
        let data = RegisterData::from(form);

        let auth: AuthResponse = self
            .client
            .post("users", &data, RequestOptions::default())
            .await?;

        self.client.session().save_auth(&auth)?;
        tracing::info!(user_id = %auth.user.id, "Registered");
        Ok(auth.user)
    }

    /// New access token, sharing any refresh already in flight.
    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        self.client.refresh().await
    }

    pub fn logout(&self) {
        self.client.session().clear_all();
        tracing::info!("Signed out");
    }

    pub fn current_user(&self) -> Option<User> {
        self.client.session().user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().has_valid_session()
    }

    /// True when there is no stored token or its `exp` has passed.
    pub fn is_token_expired(&self) -> bool {
        match self.client.session().access_token() {
            Some(token) => is_expired(&token, Utc::now().timestamp()),
            None => true,
        }
    }

    /// Resume a stored session, refreshing an expired access token.
    ///
    /// Returns the signed-in user, or `None` when there is no usable
    /// session. A failed refresh signs the user out.
    pub async fn restore_session(&self) -> Option<User> {
        if !self.is_authenticated() {
            return None;
        }

        if self.is_token_expired() {
            tracing::info!("Stored token expired, refreshing");
            if let Err(e) = self.refresh_token().await {
                tracing::warn!(error = %e, "Could not restore session");
                self.logout();
                return None;
            }
        }

        self.current_user()
    }

    /// Fetch the signed-in user from the server and store it.
    pub async fn me(&self) -> Result<User, ApiError> {
        let user: User = self.client.get("users/me", RequestOptions::default()).await?;
        self.client.session().save_user(&user)?;
        Ok(user)
    }

    pub async fn update_tech_interests(&self, interests: Vec<String>) -> Result<User, ApiError> {
        let current = self
            .current_user()
            .ok_or_else(|| ApiError::named("NO_SESSION", "Not signed in"))?;

        let id = urlencoding::encode(&current.id);
        let endpoint = join_path(&["users", id.as_ref(), "tech-interests"]);
        let body = TechInterestsUpdate {
            tech_interests: interests,
        };
        let user: User = self
            .client
            .put(&endpoint, &body, RequestOptions::default())
            .await?;

        self.client.session().save_user(&user)?;
        Ok(user)
    }

    /// Request a reset link. The answer never reveals whether the account
    /// exists, so upstream failures are logged and swallowed.
    pub async fn forgot_password(&self, email: &str) -> String {
        let body = ForgotPasswordRequest {
            email: email.trim().to_string(),
        };
        let result: Result<Value, ApiError> = self
            .client
            .post("users/forgot-password", &body, RequestOptions::default())
            .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, "Password reset request failed");
        }
        FORGOT_PASSWORD_MESSAGE.to_string()
    }
}

/// `exp` claim of a JWT, read without verifying the signature.
pub fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

/// Undecodable tokens count as expired.
pub fn is_expired(token: &str, now: i64) -> bool {
    token_expiry(token).map_or(true, |exp| exp < now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiClient, ErrorCode, Session};
    use serde_json::json;

    fn token_with(claims: Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.signature", header, payload)
    }

    fn offline_service() -> (AuthService, Session) {
        let session = Session::in_memory();
        let client = AuthorizedClient::new(ApiClient::new("http://127.0.0.1:9"), session.clone());
        (AuthService::new(client), session)
    }

    #[test]
    fn test_token_expiry() {
        let token = token_with(json!({"sub": "1", "exp": 1_700_000_000}));
        assert_eq!(token_expiry(&token), Some(1_700_000_000));
        assert!(is_expired(&token, 1_700_000_001));
        assert!(!is_expired(&token, 1_700_000_000));
    }

    #[test]
    fn test_garbage_tokens_are_expired() {
        assert!(is_expired("not-a-jwt", 0));
        assert!(is_expired("a.!!!.c", 0));
        assert!(is_expired(&token_with(json!({"sub": "1"})), 0));
    }

    #[test]
    fn test_is_token_expired_without_token() {
        let (service, session) = offline_service();
        assert!(service.is_token_expired());

        let fresh = token_with(json!({"exp": Utc::now().timestamp() + 600}));
        session.save_access_token(&fresh).unwrap();
        assert!(!service.is_token_expired());
    }

    #[tokio::test]
    async fn test_invalid_login_never_reaches_network() {
        let (service, _) = offline_service();
        let err = service
            .login(LoginForm::new("not-an-email", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_update_interests_requires_session() {
        let (service, _) = offline_service();
        let err = service
            .update_tech_interests(vec!["Rust".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Named("NO_SESSION".to_string()));
    }

    #[tokio::test]
    async fn test_forgot_password_hides_failures() {
        let (service, _) = offline_service();
        let message = service.forgot_password("ghost@example.com").await;
        assert_eq!(message, FORGOT_PASSWORD_MESSAGE);
    }
}
