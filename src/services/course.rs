// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course catalog access through the upstream API.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use validator::Validate;

use super::catalog::{CourseFilters, DEFAULT_PAGE_SIZE};
use crate::client::api::join_path;
use crate::client::{ApiError, AuthorizedClient, RequestOptions};
use crate::models::{Course, NewReview, PaginationMeta, RawCourse, Review};

/// One page of adapted courses.
#[derive(Debug, Clone, PartialEq)]
pub struct CoursePage {
    pub courses: Vec<Course>,
    pub pagination: PaginationMeta,
}

/// Body of a click-tracking response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickCount {
    pub click_count: u64,
}

#[derive(Clone)]
pub struct CourseService {
    client: AuthorizedClient,
}

impl CourseService {
    pub fn new(client: AuthorizedClient) -> Self {
        Self { client }
    }

    /// Fetch one filtered page.
    ///
    /// Pagination comes from the envelope `meta`; a response without it is
    /// treated as a single page holding everything returned.
    pub async fn list_courses(&self, filters: &CourseFilters) -> Result<CoursePage, ApiError> {
        let query = serde_json::to_value(filters).map_err(|e| {
            ApiError::named("SERIALIZATION_ERROR", format!("Invalid filters: {}", e))
        })?;

        let captured: Arc<Mutex<Option<PaginationMeta>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        let options = RequestOptions::new()
            .params_from(&query)
            .on_meta(move |meta| {
                *sink.lock().unwrap_or_else(PoisonError::into_inner) =
                    PaginationMeta::from_meta(meta);
            });

        let raw: Vec<RawCourse> = self.client.get("course", options).await?;
        let courses: Vec<Course> = raw.into_iter().map(Course::from_raw).collect();

        let pagination = captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(|| {
                PaginationMeta::for_page(
                    courses.len() as u64,
                    filters.page.unwrap_or(1),
                    filters.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                )
            });

        tracing::debug!(
            count = courses.len(),
            total = pagination.total,
            page = pagination.page,
            "Fetched courses"
        );
        Ok(CoursePage {
            courses,
            pagination,
        })
    }

    /// A single course; `None` when the upstream does not know the id.
    pub async fn get_course(&self, id: &str) -> Result<Option<Course>, ApiError> {
        let endpoint = course_path(id, None);
        match self
            .client
            .get::<RawCourse>(&endpoint, RequestOptions::default())
            .await
        {
            Ok(raw) => Ok(Some(Course::from_raw(raw))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Record a visit; returns the updated click count.
    pub async fn record_click(&self, id: &str) -> Result<u64, ApiError> {
        let endpoint = course_path(id, Some("click"));
        let count: ClickCount = self
            .client
            .post(&endpoint, &serde_json::json!({}), RequestOptions::default())
            .await?;
        Ok(count.click_count)
    }

    pub async fn reviews_for_course(&self, id: &str) -> Result<Vec<Review>, ApiError> {
        let endpoint = course_path(id, Some("reviews"));
        self.client.get(&endpoint, RequestOptions::default()).await
    }

    /// Validate and submit a review as the signed-in user.
    pub async fn submit_review(&self, id: &str, review: &NewReview) -> Result<Review, ApiError> {
        review.validate()?;
        let endpoint = course_path(id, Some("reviews"));
        let created: Review = self
            .client
            .post(&endpoint, review, RequestOptions::default())
            .await?;
        tracing::info!(course_id = %id, review_id = %created.id, "Review submitted");
        Ok(created)
    }
}

fn course_path(id: &str, action: Option<&str>) -> String {
    let id = urlencoding::encode(id);
    match action {
        Some(action) => join_path(&["course", id.as_ref(), action]),
        None => join_path(&["course", id.as_ref()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiClient, ErrorCode, Session};

    #[test]
    fn test_course_path_encodes_id() {
        assert_eq!(course_path("123", None), "course/123");
        assert_eq!(course_path("a b/c", Some("click")), "course/a%20b%2Fc/click");
    }

    #[tokio::test]
    async fn test_invalid_review_rejected_locally() {
        let client = AuthorizedClient::new(ApiClient::new("http://127.0.0.1:9"), Session::in_memory());
        let service = CourseService::new(client);
        let review = NewReview {
            rating: 9,
            title: "Too good".to_string(),
            content: "Off the scale".to_string(),
            pros: vec![],
            cons: vec![],
        };

        let err = service.submit_review("1", &review).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.message, "Rating must be between 1 and 5");
    }
}
