// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course listing, detail, clicks and reviews through the client.

use course_watcher::client::ErrorCode;
use course_watcher::models::{Difficulty, NewReview};
use course_watcher::services::{CourseFilters, CourseService, SortKey, SortOrder};

mod common;
use common::{login_form, TestServer};

async fn signed_in(server: &TestServer) -> CourseService {
    let auth = server.auth_service();
    auth.login(login_form()).await.unwrap();
    CourseService::new(auth.client().clone())
}

#[tokio::test]
async fn test_list_courses_with_pagination_meta() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;

    let page = courses.list_courses(&CourseFilters::default()).await.unwrap();
    let total = server.state.db.courses().len() as u64;
    assert_eq!(page.pagination.total, total);
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.courses.len() as u64, total.min(12));

    let third = courses
        .list_courses(&CourseFilters {
            page: Some(3),
            limit: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(third.pagination.total_pages, total.div_ceil(5));
    assert_eq!(third.pagination.page, 3);
    assert_eq!(third.courses.len() as u64, total - 10);
}

#[tokio::test]
async fn test_list_courses_adapts_raw_records() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;

    let page = courses
        .list_courses(&CourseFilters {
            search: Some("python bootcamp".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.courses.len(), 1);
    let course = &page.courses[0];
    assert_eq!(course.id, "764164");
    assert!(course.technologies.contains(&"Python".to_string()));
    assert_eq!(course.difficulty, Difficulty::AllLevels);
    assert_eq!(course.duration, "24 hours");
}

#[tokio::test]
async fn test_free_courses_only() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;

    let page = courses
        .list_courses(&CourseFilters {
            is_paid: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(!page.courses.is_empty());
    assert!(page.courses.iter().all(|c| !c.is_paid && c.price == 0.0));
    assert_eq!(page.pagination.total, page.courses.len() as u64);
}

#[tokio::test]
async fn test_level_filter_accepts_several_levels() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;

    let page = courses
        .list_courses(&CourseFilters {
            level: vec!["Intermediate".to_string(), "Expert".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.pagination.total, 4);
    assert!(page
        .courses
        .iter()
        .all(|c| matches!(c.difficulty, Difficulty::Intermediate | Difficulty::Advanced)));
}

#[tokio::test]
async fn test_price_range_and_sort() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;

    let page = courses
        .list_courses(&CourseFilters {
            min_price: Some(20.0),
            max_price: Some(95.0),
            sort_by: Some(SortKey::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        })
        .await
        .unwrap();

    let prices: Vec<f64> = page.courses.iter().map(|c| c.price).collect();
    assert!(!prices.is_empty());
    assert!(prices.iter().all(|p| (20.0..=95.0).contains(p)));
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(prices.first(), Some(&20.0));
    assert_eq!(prices.last(), Some(&95.0));
}

#[tokio::test]
async fn test_get_course_and_missing_course() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;

    let course = courses.get_course("289230").await.unwrap().unwrap();
    assert_eq!(course.title, "Git Complete: The definitive guide");
    assert_eq!(course.technologies, vec!["Git".to_string()]);

    assert!(courses.get_course("does-not-exist").await.unwrap().is_none());
}

#[tokio::test]
async fn test_record_click() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;

    assert_eq!(courses.record_click("173548").await.unwrap(), 1);
    assert_eq!(courses.record_click("173548").await.unwrap(), 2);
    assert_eq!(server.state.db.click_count("173548"), 2);

    let err = courses.record_click("nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_reviews() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;

    let existing = courses.reviews_for_course("625204").await.unwrap();
    assert_eq!(existing.len(), 1);

    let review = NewReview {
        rating: 4,
        title: "Great refresher".to_string(),
        content: "Covered everything I had forgotten.".to_string(),
        pros: vec!["Concise".to_string()],
        cons: vec![],
    };
    let created = courses.submit_review("625204", &review).await.unwrap();
    assert_eq!(created.course_id, "625204");
    assert_eq!(created.user_id, "1");
    assert_eq!(created.rating, 4);

    let after = courses.reviews_for_course("625204").await.unwrap();
    assert_eq!(after.len(), 2);
}

#[tokio::test]
async fn test_invalid_review_stops_before_network() {
    let server = TestServer::start().await;
    let courses = signed_in(&server).await;
    let before = server.state.db.total_reviews();

    let review = NewReview {
        rating: 0,
        title: String::new(),
        content: "x".to_string(),
        pros: vec![],
        cons: vec![],
    };
    let err = courses.submit_review("625204", &review).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(server.state.db.total_reviews(), before);
}

#[tokio::test]
async fn test_signed_out_requests_fail_with_401() {
    let server = TestServer::start().await;
    let courses = CourseService::new(server.client());

    let err = courses
        .list_courses(&CourseFilters::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, "Authentication required");
    assert_eq!(server.state.db.refresh_count(), 0);
}
