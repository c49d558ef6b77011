// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course records: the raw upstream shape and the enriched client model.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Levels the upstream platform reports verbatim.
pub const COURSE_LEVELS: [&str; 5] = ["All Levels", "Beginner", "Intermediate", "Advanced", "Expert"];

/// Fallback tag when no known technology appears in a title.
pub const DEFAULT_TECHNOLOGY: &str = "Programming";

/// Instructor shown when the title names nobody.
pub const DEFAULT_INSTRUCTOR: &str = "Udemy Instructor";

const TECH_KEYWORDS: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "React",
    "Angular",
    "Vue",
    "Node",
    "Python",
    "Django",
    "Flask",
    "Java",
    "Spring",
    "C#",
    "ASP.NET",
    "PHP",
    "Laravel",
    "Ruby",
    "Rails",
    "Go",
    "Rust",
    "Swift",
    "Kotlin",
    "Flutter",
    "React Native",
    "iOS",
    "Android",
    "HTML",
    "CSS",
    "Sass",
    "Bootstrap",
    "Tailwind",
    "SQL",
    "MongoDB",
    "PostgreSQL",
    "MySQL",
    "Redis",
    "AWS",
    "Azure",
    "Docker",
    "Kubernetes",
    "Git",
    "Machine Learning",
    "AI",
    "Data Science",
    "DevOps",
];

/// Course record exactly as the upstream platform emits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourse {
    pub course_id: String,
    pub course_title: String,
    pub url: String,
    pub is_paid: bool,
    pub price: f64,
    pub num_subscribers: u64,
    pub num_reviews: u64,
    pub num_lectures: u64,
    /// "All Levels", "Beginner", "Intermediate", "Advanced" or "Expert"
    pub level: String,
    /// Hours of video content
    pub content_duration: f64,
    /// ISO 8601
    pub published_timestamp: String,
}

/// Normalised difficulty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    AllLevels,
}

impl Difficulty {
    /// Map an upstream level string onto a bucket.
    pub fn from_level(level: &str) -> Self {
        let normalized = level.to_lowercase();
        if normalized.contains("beginner") {
            Difficulty::Beginner
        } else if normalized.contains("intermediate") {
            Difficulty::Intermediate
        } else if normalized.contains("advanced") || normalized.contains("expert") {
            Difficulty::Advanced
        } else {
            Difficulty::AllLevels
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::AllLevels => "all-levels",
        }
    }
}

/// Platform a course is hosted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Udemy,
    Youtube,
    Coursera,
    Freecodecamp,
    #[serde(other)]
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Udemy => "udemy",
            Platform::Youtube => "youtube",
            Platform::Coursera => "coursera",
            Platform::Freecodecamp => "freecodecamp",
            Platform::Other => "other",
        }
    }
}

/// Course as the rest of the client consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub is_paid: bool,
    pub price: f64,

    pub image_url: String,
    pub instructor: String,
    pub technologies: Vec<String>,
    pub difficulty: Difficulty,
    pub rating: f64,
    pub review_count: u64,
    /// Human readable, e.g. "4.5 hours"
    pub duration: String,

    pub num_subscribers: u64,
    pub num_lectures: u64,
    pub level: String,
    pub content_duration: f64,

    pub platform: Platform,
    pub currency: String,
    pub click_count: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Adapt a raw upstream record into the client model.
    pub fn from_raw(raw: RawCourse) -> Self {
        let technologies = extract_technologies(&raw.course_title);
        let published = parse_timestamp(&raw.published_timestamp);

        Self {
            image_url: image_url_for(&technologies, &raw.course_id),
            instructor: extract_instructor(&raw.course_title),
            difficulty: Difficulty::from_level(&raw.level),
            rating: estimate_rating(raw.num_reviews, raw.num_subscribers),
            duration: format_duration(raw.content_duration),
            technologies,

            id: raw.course_id,
            title: raw.course_title,
            description: String::new(),
            url: raw.url,
            is_paid: raw.is_paid,
            price: raw.price,
            review_count: raw.num_reviews,
            num_subscribers: raw.num_subscribers,
            num_lectures: raw.num_lectures,
            level: raw.level,
            content_duration: raw.content_duration,

            platform: Platform::Udemy,
            currency: "USD".to_string(),
            click_count: 0,
            created_at: published,
            updated_at: published,
        }
    }
}

impl From<RawCourse> for Course {
    fn from(raw: RawCourse) -> Self {
        Course::from_raw(raw)
    }
}

/// Known technologies mentioned in a title, in keyword-list order.
pub fn extract_technologies(title: &str) -> Vec<String> {
    let lower_title = title.to_lowercase();
    let found: Vec<String> = TECH_KEYWORDS
        .iter()
        .filter(|tech| lower_title.contains(&tech.to_lowercase()))
        .map(|tech| tech.to_string())
        .collect();

    if found.is_empty() {
        vec![DEFAULT_TECHNOLOGY.to_string()]
    } else {
        found
    }
}

static INSTRUCTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:by|with)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)")
        .expect("instructor pattern is valid")
});

/// Name following "by" or "with" in a title, if any.
pub fn extract_instructor(title: &str) -> String {
    INSTRUCTOR_RE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_INSTRUCTOR.to_string())
}

/// Heuristic rating from review engagement: 3.5 base, up to +1.5.
pub fn estimate_rating(num_reviews: u64, num_subscribers: u64) -> f64 {
    if num_subscribers == 0 {
        return 0.0;
    }

    let ratio = num_reviews as f64 / num_subscribers as f64;
    let bonus = (ratio * 20.0).min(1.5);
    ((3.5 + bonus) * 10.0).round() / 10.0
}

pub fn format_duration(hours: f64) -> String {
    if hours < 1.0 {
        let minutes = (hours * 60.0).round();
        return format!("{} min", minutes);
    }
    if hours == 1.0 {
        return "1 hour".to_string();
    }
    let rounded = (hours * 10.0).round() / 10.0;
    format!("{} hours", rounded)
}

fn image_url_for(technologies: &[String], course_id: &str) -> String {
    let main_tech = technologies
        .first()
        .map(|t| t.to_lowercase())
        .unwrap_or_else(|| "programming".to_string());

    let images: &[&str] = match main_tech.as_str() {
        "javascript" => &[
            "/assets/images/courses/javascript-1.jpg",
            "/assets/images/courses/javascript-2.jpg",
            "/assets/images/courses/javascript-3.jpg",
        ],
        "react" => &[
            "/assets/images/courses/react-1.jpg",
            "/assets/images/courses/react-2.jpg",
        ],
        "angular" => &[
            "/assets/images/courses/angular-1.jpg",
            "/assets/images/courses/angular-2.jpg",
        ],
        "python" => &[
            "/assets/images/courses/python-1.jpg",
            "/assets/images/courses/python-2.jpg",
        ],
        _ => &["/assets/images/courses/default.jpg"],
    };

    let hash = course_id.parse::<u64>().unwrap_or(0);
    images[(hash % images.len() as u64) as usize].to_string()
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}
