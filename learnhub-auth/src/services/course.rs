//! Course catalogue and enrollments.

use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::auth::CourseRequest;
use crate::models::{Course, CoursePreview, Enrollment};
use crate::services::ServiceError;

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Public catalogue: previews only.
    pub async fn list(&self) -> Result<Vec<CoursePreview>, ServiceError> {
        let courses: Vec<Course> =
            sqlx::query_as("SELECT * FROM courses ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(courses.iter().map(Course::preview).collect())
    }

    pub async fn find(&self, course_id: Uuid) -> Result<Course, ServiceError> {
        let course: Option<Course> = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        course.ok_or(ServiceError::CourseNotFound)
    }

    pub async fn create(&self, request: &CourseRequest) -> Result<Course, ServiceError> {
        let course: Course = sqlx::query_as(
            "INSERT INTO courses (title, description, price, first_video_link, \
             live_video_link, archived_video_link) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price)
        .bind(&request.first_video_link)
        .bind(&request.live_video_link)
        .bind(&request.archived_video_link)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(course_id = %course.id, "Course created");

        Ok(course)
    }

    pub async fn update(
        &self,
        course_id: Uuid,
        request: &CourseRequest,
    ) -> Result<Course, ServiceError> {
        let course: Option<Course> = sqlx::query_as(
            "UPDATE courses SET title = $1, description = $2, price = $3, \
             first_video_link = $4, live_video_link = $5, archived_video_link = $6 \
             WHERE id = $7 RETURNING *",
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price)
        .bind(&request.first_video_link)
        .bind(&request.live_video_link)
        .bind(&request.archived_video_link)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        course.ok_or(ServiceError::CourseNotFound)
    }

    pub async fn delete(&self, course_id: Uuid) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::CourseNotFound);
        }

        Ok(())
    }

    pub async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> Result<(), ServiceError> {
        // Idempotent: re-enrolling is a no-op, not an error.
        sqlx::query(
            "INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, course_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %user_id, course_id = %course_id, "Enrollment recorded");

        Ok(())
    }

    /// Idempotent like `enroll`: removing a missing enrollment is a no-op.
    pub async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn is_enrolled(&self, user_id: Uuid, course_id: Uuid) -> Result<bool, ServiceError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    pub async fn enrollments_for(&self, user_id: Uuid) -> Result<Vec<Enrollment>, ServiceError> {
        let rows: Vec<Enrollment> = sqlx::query_as(
            "SELECT * FROM enrollments WHERE user_id = $1 ORDER BY enrolled_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
