// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account and token routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_access_token, AuthUser};
use crate::models::{
    AuthResponse, Envelope, ForgotPasswordRequest, LoginCredentials, RefreshRequest, RegisterData,
    TechInterestsUpdate, TokenPair, User,
};
use crate::AppState;

/// Routes reachable without a token.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(register))
        .route("/users/authenticate", post(authenticate))
        .route("/users/refresh", post(refresh))
        .route("/users/forgot-password", post(forgot_password))
}

/// Routes behind the auth middleware (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/{id}/tech-interests", put(update_tech_interests))
}

fn access_token_for(state: &AppState, user: &User) -> Result<String> {
    Ok(create_access_token(
        user,
        &state.config.jwt_signing_key,
        state.config.access_token_ttl_secs,
    )?)
}

fn sign_in(state: &AppState, user: User) -> Result<AuthResponse> {
    Ok(AuthResponse {
        access_token: access_token_for(state, &user)?,
        refresh_token: state.db.issue_refresh_token(&user.id)?,
        user,
    })
}

async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<Envelope<AuthResponse>>> {
    let user = state
        .db
        .authenticate(&credentials.email, &credentials.password)?;
    tracing::info!(user_id = %user.id, "User authenticated");

    Ok(Json(Envelope::ok("Login successful", sign_in(&state, user)?)))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<RegisterData>,
) -> Result<(StatusCode, Json<Envelope<AuthResponse>>)> {
    if registration.email.trim().is_empty() || registration.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }
    if registration.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let user = state.db.create_user(&registration)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Registration successful", sign_in(&state, user)?)),
    ))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<Envelope<TokenPair>>> {
    let (user, refresh_token) = state.db.rotate_refresh_token(&request.refresh_token)?;

    let tokens = TokenPair {
        access_token: access_token_for(&state, &user)?,
        refresh_token,
    };
    Ok(Json(Envelope::ok("Token refreshed", tokens)))
}

/// Always succeeds so the response cannot be used to probe for accounts.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Json<Envelope<Value>> {
    if state.db.user_exists(&request.email) {
        tracing::info!("Password reset link issued");
    } else {
        tracing::debug!("Password reset requested for unknown account");
    }
    Json(Envelope::ok("Password reset requested", Value::Null))
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Envelope<User>>> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .ok_or_else(|| AppError::NotFound(format!("user {}", auth.user_id)))?;
    Ok(Json(Envelope::ok("User retrieved", user)))
}

async fn update_tech_interests(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<TechInterestsUpdate>,
) -> Result<Json<Envelope<User>>> {
    if id != auth.user_id {
        return Err(AppError::Forbidden(
            "cannot modify another user's interests".to_string(),
        ));
    }

    let user = state.db.update_tech_interests(&id, update.tech_interests)?;
    Ok(Json(Envelope::ok("Tech interests updated", user)))
}
