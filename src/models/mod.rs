// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod api_response;
pub mod auth;
pub mod course;
pub mod review;
pub mod user;

pub use api_response::{Envelope, Meta, PaginationMeta, TimestampMeta};
pub use auth::{
    AuthResponse, Claims, ForgotPasswordRequest, LoginCredentials, RefreshRequest, RegisterData,
    TokenPair,
};
pub use course::{Course, Difficulty, Platform, RawCourse};
pub use review::{NewReview, Review};
pub use user::{TechInterestsUpdate, User};
