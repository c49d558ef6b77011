// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course catalog routes. All require authentication.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Course, Envelope, NewReview, RawCourse, Review};
use crate::services::catalog::{self, CourseFilters, DEFAULT_PAGE_SIZE};
use crate::services::course::ClickCount;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/course", get(list_courses))
        .route("/course/{id}", get(get_course))
        .route("/course/{id}/click", post(record_click))
        .route(
            "/course/{id}/reviews",
            get(list_reviews).post(create_review),
        )
}

/// Build filters from query pairs. `technologies` may repeat; unknown
/// keys are ignored.
pub fn filters_from_query(pairs: &[(String, String)]) -> Result<CourseFilters> {
    let mut filters = CourseFilters::default();

    for (key, value) in pairs {
        match key.as_str() {
            "search" => filters.search = Some(value.clone()),
            "level" => filters.level.push(value.clone()),
            "isPaid" => filters.is_paid = Some(parse(key, value)?),
            "minPrice" => filters.min_price = Some(parse(key, value)?),
            "maxPrice" => filters.max_price = Some(parse(key, value)?),
            "minDuration" => filters.min_duration = Some(parse(key, value)?),
            "maxDuration" => filters.max_duration = Some(parse(key, value)?),
            "minSubscribers" => filters.min_subscribers = Some(parse(key, value)?),
            "platform" => filters.platform = Some(parse_enum(key, value)?),
            "technologies" => filters.technologies.push(value.clone()),
            "sortBy" => filters.sort_by = Some(parse_enum(key, value)?),
            "sortOrder" => filters.sort_order = Some(parse_enum(key, value)?),
            "page" => filters.page = Some(parse(key, value)?),
            "limit" => filters.limit = Some(parse(key, value)?),
            _ => {}
        }
    }

    Ok(filters)
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {}: {:?}", key, value)))
}

fn parse_enum<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    serde_json::from_value(Value::String(value.to_string()))
        .map_err(|_| AppError::BadRequest(format!("invalid {}: {:?}", key, value)))
}

fn require_course<'a>(state: &'a AppState, id: &str) -> Result<&'a RawCourse> {
    state
        .db
        .course(id)
        .ok_or_else(|| AppError::NotFound(format!("course {}", id)))
}

/// Filter, sort and page the catalog. Data is raw records; pagination
/// goes in `meta`.
async fn list_courses(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Envelope<Vec<RawCourse>>>> {
    let filters = filters_from_query(&pairs)?;

    let courses: Vec<Course> = state
        .db
        .courses()
        .iter()
        .map(|raw| {
            let mut course = Course::from_raw(raw.clone());
            course.click_count = state.db.click_count(&raw.course_id);
            course
        })
        .collect();

    let matching = catalog::apply(&courses, &filters);
    let page = catalog::paginate(
        &matching,
        filters.page.unwrap_or(1),
        filters.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let raw: Vec<RawCourse> = page
        .items
        .iter()
        .filter_map(|c| state.db.course(&c.id).cloned())
        .collect();

    tracing::debug!(
        matched = matching.len(),
        returned = raw.len(),
        page = page.pagination.page,
        "Courses listed"
    );
    Ok(Json(
        Envelope::ok("Courses retrieved", raw).with_meta(page.pagination.to_meta()),
    ))
}

async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<RawCourse>>> {
    let course = require_course(&state, &id)?.clone();
    Ok(Json(Envelope::ok("Course retrieved", course)))
}

async fn record_click(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<ClickCount>>> {
    let click_count = state.db.record_click(&id)?;
    Ok(Json(Envelope::ok("Click recorded", ClickCount { click_count })))
}

async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Vec<Review>>>> {
    require_course(&state, &id)?;
    Ok(Json(Envelope::ok("Reviews retrieved", state.db.reviews_for(&id))))
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(review): Json<NewReview>,
) -> Result<(StatusCode, Json<Envelope<Review>>)> {
    review.validate()?;
    let created = state.db.add_review(&id, &auth.user_id, review)?;
    tracing::info!(course_id = %id, review_id = %created.id, "Review created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Review created", created)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::{SortKey, SortOrder};

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_filters_from_query() {
        let filters = filters_from_query(&pairs(&[
            ("search", "rust"),
            ("isPaid", "false"),
            ("minPrice", "10"),
            ("sortBy", "price"),
            ("sortOrder", "desc"),
            ("technologies", "Go"),
            ("technologies", "Rust"),
            ("level", "Beginner"),
            ("level", "Expert Level"),
            ("page", "2"),
            ("utm_source", "ignored"),
        ]))
        .unwrap();

        assert_eq!(filters.search.as_deref(), Some("rust"));
        assert_eq!(filters.is_paid, Some(false));
        assert_eq!(filters.min_price, Some(10.0));
        assert_eq!(filters.sort_by, Some(SortKey::Price));
        assert_eq!(filters.sort_order, Some(SortOrder::Desc));
        assert_eq!(filters.technologies, vec!["Go", "Rust"]);
        assert_eq!(filters.level, vec!["Beginner", "Expert Level"]);
        assert_eq!(filters.page, Some(2));
    }

    #[test]
    fn test_bad_query_values_rejected() {
        assert!(matches!(
            filters_from_query(&pairs(&[("page", "two")])),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            filters_from_query(&pairs(&[("sortBy", "popularity")])),
            Err(AppError::BadRequest(_))
        ));
    }
}
