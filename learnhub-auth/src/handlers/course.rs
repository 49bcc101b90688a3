use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use learnhub_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::auth::{CourseRequest, EnrollRequest},
    middleware::{ensure_self_or_admin, CurrentUser},
    utils::validation::ValidatedJson,
    AppState,
};

/// Public catalogue listing: previews only, no session required.
pub async fn list_courses(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let courses = state.courses.list().await.map_err(AppError::from)?;

    Ok(Json(courses))
}

/// Course detail. Enrolled users and admins see the paid video links;
/// everyone else gets the preview.
pub async fn get_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let course = state.courses.find(course_id).await.map_err(AppError::from)?;

    let full_access = user.is_admin()
        || state
            .courses
            .is_enrolled(user.id, course_id)
            .await
            .map_err(AppError::from)?;

    if full_access {
        Ok(Json(serde_json::to_value(&course).map_err(|e| {
            AppError::InternalError(anyhow::Error::new(e))
        })?))
    } else {
        Ok(Json(serde_json::to_value(course.preview()).map_err(
            |e| AppError::InternalError(anyhow::Error::new(e)),
        )?))
    }
}

pub async fn create_course(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = state.courses.create(&request).await.map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = state
        .courses
        .update(course_id, &request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.courses.delete(course_id).await.map_err(AppError::from)?;

    Ok(Json(serde_json::json!({ "message": "Course deleted" })))
}

/// Enroll an account in a course: self-service, or any account for admins.
pub async fn enroll(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(request): ValidatedJson<EnrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_self_or_admin(&user, request.user_id)?;

    // 404 before insert so enrollments never point at a missing course.
    state
        .courses
        .find(request.course_id)
        .await
        .map_err(AppError::from)?;

    state
        .courses
        .enroll(request.user_id, request.course_id)
        .await
        .map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Enrolled" })),
    ))
}

pub async fn list_enrollments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure_self_or_admin(&user, user_id)?;

    let enrollments = state
        .courses
        .enrollments_for(user_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(enrollments))
}

pub async fn unenroll(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((user_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    ensure_self_or_admin(&user, user_id)?;

    state
        .courses
        .unenroll(user_id, course_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(serde_json::json!({ "message": "Enrollment removed" })))
}
