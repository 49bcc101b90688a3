//! Course catalogue and enrollment rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub first_video_link: Option<String>,
    pub live_video_link: Option<String>,
    pub archived_video_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Limited view for callers who are not enrolled: catalogue data and the
    /// teaser video only.
    pub fn preview(&self) -> CoursePreview {
        CoursePreview {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            first_video_link: self.first_video_link.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoursePreview {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub first_video_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Enrollment {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_omits_paid_content() {
        let course = Course {
            id: Uuid::new_v4(),
            title: "Rust 101".into(),
            description: "Intro".into(),
            price: 49.0,
            first_video_link: Some("https://cdn/intro".into()),
            live_video_link: Some("https://cdn/live".into()),
            archived_video_link: Some("https://cdn/archive".into()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(course.preview()).unwrap().to_string();
        assert!(json.contains("intro"));
        assert!(!json.contains("live"));
        assert!(!json.contains("archive"));
    }
}
