// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod catalog;
pub mod course;
pub mod password;

pub use auth::{AuthService, FORGOT_PASSWORD_MESSAGE};
pub use catalog::{CatalogStats, CourseFilters, Page, SortKey, SortOrder};
pub use course::{CoursePage, CourseService};
pub use password::{LoginForm, PasswordStrength, RegisterForm};
