// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store backing the mock upstream API.
//!
//! Provides typed operations for:
//! - Users (accounts, password digests)
//! - Refresh tokens (single use, rotated on every refresh)
//! - Courses (raw records, click counts)
//! - Reviews

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use subtle::ConstantTimeEq;

use super::fixtures;
use crate::error::AppError;
use crate::models::{NewReview, RawCourse, RegisterData, Review, User};

/// Bytes of entropy in a refresh token.
const REFRESH_TOKEN_BYTES: usize = 32;

struct Account {
    user: User,
    password_digest: [u8; 32],
}

/// Mock database. Cheap to share behind an `Arc`; every method takes `&self`.
pub struct MemoryDb {
    accounts: DashMap<String, Account>,
    /// Lowercased email -> user id
    emails: DashMap<String, String>,
    /// Refresh token -> user id
    refresh_tokens: DashMap<String, String>,
    courses: Vec<RawCourse>,
    clicks: DashMap<String, u64>,
    /// Course id -> reviews, oldest first
    reviews: DashMap<String, Vec<Review>>,
    next_user_id: AtomicU64,
    next_review_id: AtomicU64,
    refreshes: AtomicU64,
    rng: SystemRandom,
}

impl MemoryDb {
    /// Empty store with the given course catalog.
    pub fn new(courses: Vec<RawCourse>) -> Self {
        Self {
            accounts: DashMap::new(),
            emails: DashMap::new(),
            refresh_tokens: DashMap::new(),
            courses,
            clicks: DashMap::new(),
            reviews: DashMap::new(),
            next_user_id: AtomicU64::new(1),
            next_review_id: AtomicU64::new(1),
            refreshes: AtomicU64::new(0),
            rng: SystemRandom::new(),
        }
    }

    /// Store populated with the fixture users, courses and reviews.
    pub fn seeded() -> Result<Self, AppError> {
        let db = Self::new(fixtures::courses());

        for registration in fixtures::users() {
            db.create_user(&registration)?;
        }
        for review in fixtures::reviews() {
            db.next_review_id.fetch_max(
                review.id.parse::<u64>().unwrap_or(0) + 1,
                Ordering::Relaxed,
            );
            db.reviews
                .entry(review.course_id.clone())
                .or_default()
                .push(review);
        }

        tracing::info!(
            users = db.accounts.len(),
            courses = db.courses.len(),
            "Mock database seeded"
        );
        Ok(db)
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Register a new account. Emails are unique, case-insensitively.
    pub fn create_user(&self, registration: &RegisterData) -> Result<User, AppError> {
        let email_key = registration.email.trim().to_lowercase();

        let slot = match self.emails.entry(email_key) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(
                    "An account with this email already exists".to_string(),
                ))
            }
            Entry::Vacant(slot) => slot,
        };

        let id = self.next_user_id.fetch_add(1, Ordering::Relaxed).to_string();
        let now = Utc::now();
        let user = User {
            id: id.clone(),
            email: registration.email.trim().to_string(),
            name: registration.name.trim().to_string(),
            avatar: None,
            tech_interests: registration.tech_interests.clone(),
            created_at: now,
            updated_at: now,
        };

        self.accounts.insert(
            id.clone(),
            Account {
                user: user.clone(),
                password_digest: digest(&registration.password),
            },
        );
        slot.insert(id);

        tracing::debug!(user_id = %user.id, "Account created");
        Ok(user)
    }

    /// Check credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let id = self
            .emails
            .get(&email.trim().to_lowercase())
            .map(|id| id.value().clone())
            .ok_or(AppError::InvalidCredentials)?;
        let account = self.accounts.get(&id).ok_or(AppError::InvalidCredentials)?;

        let supplied = digest(password);
        if bool::from(supplied.ct_eq(&account.password_digest)) {
            Ok(account.user.clone())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    pub fn get_user(&self, id: &str) -> Option<User> {
        self.accounts.get(id).map(|a| a.user.clone())
    }

    pub fn user_exists(&self, email: &str) -> bool {
        self.emails.contains_key(&email.trim().to_lowercase())
    }

    pub fn update_tech_interests(&self, id: &str, interests: Vec<String>) -> Result<User, AppError> {
        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        account.user.tech_interests = interests;
        account.user.updated_at = Utc::now();
        Ok(account.user.clone())
    }

    // ─── Refresh Token Operations ────────────────────────────────

    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String, AppError> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Random source unavailable")))?;

        let token = hex::encode(bytes);
        self.refresh_tokens
            .insert(token.clone(), user_id.to_string());
        Ok(token)
    }

    /// Consume a refresh token, returning its user and a replacement.
    ///
    /// Each token works once; a replayed token is rejected.
    pub fn rotate_refresh_token(&self, token: &str) -> Result<(User, String), AppError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;

        let (_, user_id) = self
            .refresh_tokens
            .remove(token)
            .ok_or(AppError::InvalidToken)?;
        let user = self.get_user(&user_id).ok_or(AppError::InvalidToken)?;
        let replacement = self.issue_refresh_token(&user_id)?;

        tracing::debug!(user_id = %user_id, refresh = n, "Refresh token rotated");
        Ok((user, replacement))
    }

    /// Number of refresh attempts received, successful or not.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    // ─── Course Operations ───────────────────────────────────────

    pub fn courses(&self) -> &[RawCourse] {
        &self.courses
    }

    pub fn course(&self, id: &str) -> Option<&RawCourse> {
        self.courses.iter().find(|c| c.course_id == id)
    }

    pub fn click_count(&self, id: &str) -> u64 {
        self.clicks.get(id).map(|c| *c).unwrap_or(0)
    }

    pub fn record_click(&self, id: &str) -> Result<u64, AppError> {
        if self.course(id).is_none() {
            return Err(AppError::NotFound(format!("course {}", id)));
        }
        let mut count = self.clicks.entry(id.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    // ─── Review Operations ───────────────────────────────────────

    pub fn reviews_for(&self, course_id: &str) -> Vec<Review> {
        self.reviews
            .get(course_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    pub fn total_reviews(&self) -> usize {
        self.reviews.iter().map(|r| r.value().len()).sum()
    }

    pub fn add_review(
        &self,
        course_id: &str,
        user_id: &str,
        review: NewReview,
    ) -> Result<Review, AppError> {
        if self.course(course_id).is_none() {
            return Err(AppError::NotFound(format!("course {}", course_id)));
        }

        let now = Utc::now();
        let stored = Review {
            id: self
                .next_review_id
                .fetch_add(1, Ordering::Relaxed)
                .to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            rating: review.rating,
            title: review.title,
            content: review.content,
            pros: review.pros,
            cons: review.cons,
            helpful: 0,
            created_at: now,
            updated_at: now,
        };

        self.reviews
            .entry(course_id.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }
}

/// Unsalted SHA-256. Fine for seeded mock accounts only; real password
/// storage needs a salted, slow KDF such as argon2.
fn digest(password: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(password.as_bytes()));
    out
}
