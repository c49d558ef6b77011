// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Seed data for the mock upstream API.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{RawCourse, RegisterData, Review};

/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "password";

// (id, title, paid, price, subscribers, reviews, lectures, level, hours, published)
type CourseRow = (
    &'static str,
    &'static str,
    bool,
    f64,
    u64,
    u64,
    u64,
    &'static str,
    f64,
    &'static str,
);

const COURSES: &[CourseRow] = &[
    ("1070968", "Ultimate Investment Banking Course", true, 200.0, 2147, 23, 51, "All Levels", 1.5, "2017-01-18T20:58:58Z"),
    ("625204", "The Web Developer Bootcamp with Colt Steele", true, 200.0, 121584, 27445, 342, "All Levels", 43.0, "2015-11-02T21:13:27Z"),
    ("173548", "Learn JavaScript Basics for Beginners", false, 0.0, 98867, 4236, 41, "Beginner Level", 3.5, "2014-04-08T16:21:30Z"),
    ("764164", "The Complete Python Bootcamp", true, 195.0, 69186, 23834, 185, "All Levels", 24.0, "2016-02-17T21:18:41Z"),
    ("1362070", "React Native: Advanced Concepts", true, 95.0, 11421, 1530, 140, "Expert Level", 12.5, "2017-09-28T18:09:10Z"),
    ("289230", "Git Complete: The definitive guide", true, 50.0, 29167, 2314, 79, "Beginner Level", 6.0, "2014-09-04T19:35:31Z"),
    ("1035638", "Docker and Kubernetes: The Complete Guide", true, 180.0, 35512, 5012, 303, "Intermediate Level", 21.5, "2018-01-24T20:14:38Z"),
    ("405282", "Free Intro to HTML and CSS", false, 0.0, 47320, 1120, 25, "Beginner Level", 0.75, "2015-03-10T09:00:00Z"),
    ("1565838", "Go: The Complete Developer's Guide", true, 95.0, 18544, 2711, 120, "Intermediate Level", 9.0, "2018-03-05T17:44:02Z"),
    ("950390", "Machine Learning A-Z with Python and R", true, 200.0, 98105, 21011, 296, "All Levels", 40.5, "2016-09-09T15:29:10Z"),
    ("1796828", "Rust Programming for Absolute Beginners", true, 20.0, 8120, 640, 64, "Beginner Level", 1.0, "2018-06-27T12:00:00Z"),
    ("1192006", "SQL & PostgreSQL for Intermediate Developers", true, 35.0, 12890, 1450, 90, "Intermediate Level", 10.0, "2017-05-02T08:30:00Z"),
];

pub fn courses() -> Vec<RawCourse> {
    COURSES
        .iter()
        .map(
            |&(id, title, is_paid, price, subs, reviews, lectures, level, hours, published)| {
                RawCourse {
                    course_id: id.to_string(),
                    course_title: title.to_string(),
                    url: format!("https://www.udemy.com/course/{}/", id),
                    is_paid,
                    price,
                    num_subscribers: subs,
                    num_reviews: reviews,
                    num_lectures: lectures,
                    level: level.to_string(),
                    content_duration: hours,
                    published_timestamp: published.to_string(),
                }
            },
        )
        .collect()
}

/// Accounts created at startup, all with [`SEED_PASSWORD`].
pub fn users() -> Vec<RegisterData> {
    [
        ("john.doe@example.com", "John Doe", &["Angular", "Node", "PostgreSQL"][..]),
        ("sarah.wilson@example.com", "Sarah Wilson", &["React", "Python", "Machine Learning"][..]),
        ("mike.chen@example.com", "Mike Chen", &["Vue", "Docker", "AWS"][..]),
    ]
    .into_iter()
    .map(|(email, name, interests)| RegisterData {
        email: email.to_string(),
        password: SEED_PASSWORD.to_string(),
        name: name.to_string(),
        tech_interests: interests.iter().map(|s| s.to_string()).collect(),
    })
    .collect()
}

/// Reviews keyed to the seeded course ids. User ids follow seeding order.
pub fn reviews() -> Vec<Review> {
    vec![
        review(
            "1", "1", "625204", 5,
            "Best bootcamp out there",
            "Covers the whole stack with plenty of exercises.",
            &["Great projects", "Clear explanations"],
            &["Some sections are dated"],
            "2024-03-15",
        ),
        review(
            "2", "2", "764164", 5,
            "Python finally clicked",
            "The notebooks make it easy to follow along.",
            &["Good pacing", "Practical examples"],
            &["Could be longer"],
            "2024-03-20",
        ),
        review(
            "3", "3", "1035638", 4,
            "Solid container foundation",
            "Good coverage of Docker, Kubernetes part moves fast.",
            &["Real deployments"],
            &["Fast paced", "Needs updating"],
            "2024-04-01",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn review(
    id: &str,
    user_id: &str,
    course_id: &str,
    rating: u8,
    title: &str,
    content: &str,
    pros: &[&str],
    cons: &[&str],
    date: &str,
) -> Review {
    let at = date_at_midnight(date);
    Review {
        id: id.to_string(),
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        rating,
        title: title.to_string(),
        content: content.to_string(),
        pros: pros.iter().map(|s| s.to_string()).collect(),
        cons: cons.iter().map(|s| s.to_string()).collect(),
        helpful: 0,
        created_at: at,
        updated_at: at,
    }
}

fn date_at_midnight(date: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}
