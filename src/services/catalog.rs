// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side catalog operations over an already fetched course list:
//! filtering, sorting, paging, plus recommendations and summary stats.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::course::COURSE_LEVELS;
use crate::models::{Course, Difficulty, PaginationMeta, Platform};

/// Page size used when none is requested.
pub const DEFAULT_PAGE_SIZE: u64 = 12;

/// Sortable course attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CourseTitle,
    Price,
    NumReviews,
    #[default]
    NumSubscribers,
    ContentDuration,
    PublishedTimestamp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Catalog filter. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Raw level ("Beginner", "Expert Level") or difficulty slug
    /// ("beginner"). Matches when the course has any of these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub level: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_subscribers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Matches when the course has any of these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl CourseFilters {
    /// Whether `course` passes every set constraint.
    pub fn matches(&self, course: &Course) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !matches_search(course, &term.to_lowercase()) {
                return false;
            }
        }

        let levels: Vec<&str> = self
            .level
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        if !levels.is_empty() && !levels.iter().any(|l| matches_level(course, l)) {
            return false;
        }

        if self.is_paid.is_some_and(|paid| course.is_paid != paid) {
            return false;
        }
        if self.min_price.is_some_and(|min| course.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| course.price > max) {
            return false;
        }
        if self.min_duration.is_some_and(|min| course.content_duration < min) {
            return false;
        }
        if self.max_duration.is_some_and(|max| course.content_duration > max) {
            return false;
        }
        if self
            .min_subscribers
            .is_some_and(|min| course.num_subscribers < min)
        {
            return false;
        }
        if self.platform.is_some_and(|p| course.platform != p) {
            return false;
        }
        if !self.technologies.is_empty()
            && !self
                .technologies
                .iter()
                .any(|tech| course.technologies.contains(tech))
        {
            return false;
        }

        true
    }
}

/// Exact raw level, difficulty slug, or one of the known upstream level
/// names mapped onto the same difficulty. All case-insensitive.
fn matches_level(course: &Course, wanted: &str) -> bool {
    course.level.eq_ignore_ascii_case(wanted)
        || course.difficulty.as_str().eq_ignore_ascii_case(wanted)
        || (COURSE_LEVELS.iter().any(|l| l.eq_ignore_ascii_case(wanted))
            && Difficulty::from_level(wanted) == course.difficulty)
}

fn matches_search(course: &Course, term: &str) -> bool {
    course.title.to_lowercase().contains(term)
        || course.description.to_lowercase().contains(term)
        || course.instructor.to_lowercase().contains(term)
        || course
            .technologies
            .iter()
            .any(|tech| tech.to_lowercase().contains(term))
}

/// Filter then sort. Paging is separate, see [`paginate`].
pub fn apply(courses: &[Course], filters: &CourseFilters) -> Vec<Course> {
    let mut result: Vec<Course> = courses
        .iter()
        .filter(|c| filters.matches(c))
        .cloned()
        .collect();

    if let Some(key) = filters.sort_by {
        sort(&mut result, key, filters.sort_order.unwrap_or_default());
    }

    result
}

/// Stable sort; equal keys keep their relative order in both directions.
pub fn sort(courses: &mut [Course], key: SortKey, order: SortOrder) {
    courses.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &Course, b: &Course, key: SortKey) -> Ordering {
    match key {
        SortKey::CourseTitle => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::NumReviews => a.review_count.cmp(&b.review_count),
        SortKey::NumSubscribers => a.num_subscribers.cmp(&b.num_subscribers),
        SortKey::ContentDuration => a.content_duration.total_cmp(&b.content_duration),
        SortKey::PublishedTimestamp => a.created_at.cmp(&b.created_at),
    }
}

/// One window of a list plus its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Slice page `page` (1-based) of size `limit`.
///
/// Page 0 is treated as page 1, limit 0 as the default size. Pages past
/// the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: u64, limit: u64) -> Page<T> {
    let page = page.max(1);
    let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };

    let start = usize::try_from((page - 1).saturating_mul(limit)).unwrap_or(usize::MAX);
    let window = usize::try_from(limit).unwrap_or(usize::MAX);

    Page {
        items: items.iter().skip(start).take(window).cloned().collect(),
        pagination: PaginationMeta::for_page(items.len() as u64, page, limit),
    }
}

/// Courses whose technologies overlap the user's interests, best rated first.
pub fn recommend(courses: &[Course], interests: &[String], limit: usize) -> Vec<Course> {
    let interests: Vec<String> = interests.iter().map(|i| i.to_lowercase()).collect();

    let mut recommended: Vec<Course> = courses
        .iter()
        .filter(|course| {
            course.technologies.iter().any(|tech| {
                let tech = tech.to_lowercase();
                interests
                    .iter()
                    .any(|interest| tech.contains(interest.as_str()) || interest.contains(tech.as_str()))
            })
        })
        .cloned()
        .collect();

    recommended.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    recommended.truncate(limit);
    recommended
}

/// Most clicked courses first.
pub fn popular(courses: &[Course], limit: usize) -> Vec<Course> {
    let mut popular = courses.to_vec();
    popular.sort_by(|a, b| b.click_count.cmp(&a.click_count));
    popular.truncate(limit);
    popular
}

/// Every technology tag in the list, sorted and de-duplicated.
pub fn all_technologies(courses: &[Course]) -> Vec<String> {
    courses
        .iter()
        .flat_map(|c| c.technologies.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Catalog summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_courses: usize,
    pub total_reviews: usize,
    /// Rounded to one decimal; 0 for an empty catalog.
    pub average_rating: f64,
    pub platform_distribution: BTreeMap<String, usize>,
}

pub fn stats(courses: &[Course], total_reviews: usize) -> CatalogStats {
    let mut platform_distribution = BTreeMap::new();
    for course in courses {
        *platform_distribution
            .entry(course.platform.as_str().to_string())
            .or_insert(0) += 1;
    }

    let average_rating = if courses.is_empty() {
        0.0
    } else {
        let sum: f64 = courses.iter().map(|c| c.rating).sum();
        (sum / courses.len() as f64 * 10.0).round() / 10.0
    };

    CatalogStats {
        total_courses: courses.len(),
        total_reviews,
        average_rating,
        platform_distribution,
    }
}
