// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use course_watcher::client::{ApiClient, AuthorizedClient, Session};
use course_watcher::config::Config;
use course_watcher::db::fixtures::SEED_PASSWORD;
use course_watcher::db::MemoryDb;
use course_watcher::middleware::auth::create_access_token;
use course_watcher::models::User;
use course_watcher::routes::create_router;
use course_watcher::services::{AuthService, CourseService, LoginForm};
use course_watcher::AppState;
use std::sync::Arc;

/// Seeded account used by most tests.
#[allow(dead_code)]
pub const TEST_EMAIL: &str = "john.doe@example.com";

/// Nothing listens here; connections are refused immediately.
#[allow(dead_code)]
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

#[allow(dead_code)]
pub fn login_form() -> LoginForm {
    LoginForm::new(TEST_EMAIL, SEED_PASSWORD)
}

/// Create a test app over the seeded in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::default(),
        db: MemoryDb::seeded().expect("Failed to seed database"),
    });
    (create_router(state.clone()), state)
}

/// Serve `router` on an ephemeral local port; returns its base URL.
#[allow(dead_code)]
pub async fn spawn_router(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{}", addr)
}

/// A running mock upstream server.
#[allow(dead_code)]
pub struct TestServer {
    pub base_url: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn start() -> Self {
        let (router, state) = create_test_app();
        let base_url = spawn_router(router).await;
        Self { base_url, state }
    }

    /// Client with an empty in-memory session.
    pub fn client(&self) -> AuthorizedClient {
        AuthorizedClient::new(ApiClient::new(&self.base_url), Session::in_memory())
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.client())
    }

    /// Access token for `user` that expired a minute ago.
    pub fn expired_token(&self, user: &User) -> String {
        create_access_token(user, &self.state.config.jwt_signing_key, -60)
            .expect("Failed to sign token")
    }

    /// Signed-in services sharing one client, with the stored access token
    /// already expired.
    pub async fn signed_in_with_expired_token(&self) -> (AuthService, CourseService) {
        let auth = self.auth_service();
        let user = auth.login(login_form()).await.expect("Login failed");

        let expired = self.expired_token(&user);
        auth.client()
            .session()
            .save_access_token(&expired)
            .expect("Failed to store token");

        let courses = CourseService::new(auth.client().clone());
        (auth, courses)
    }
}
