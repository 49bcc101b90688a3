mod common;

use axum::http::StatusCode;
use common::{app, cleanup, get_with_token, login, post_json, register_user, test_state};

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn duplicate_email_is_a_conflict() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "correct horse battery").await;

    let (status, body) = post_json(
        &app,
        "/auth/register",
        None,
        serde_json::json!({
            "username": "other", "email": email, "password": "another password"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "state_conflict");
}

/// Unknown email and wrong password are indistinguishable to the caller.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn login_failures_are_uniform() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "correct horse battery").await;

    let (status_wrong, body_wrong) = post_json(
        &app,
        "/auth/login",
        None,
        serde_json::json!({
            "email": email, "password": "wrong password!", "device_id": "d1"
        }),
    )
    .await;

    let (status_unknown, body_unknown) = post_json(
        &app,
        "/auth/login",
        None,
        serde_json::json!({
            "email": "nobody@example.com", "password": "wrong password!", "device_id": "d1"
        }),
    )
    .await;

    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(body_wrong, body_unknown);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn malformed_register_payload_is_a_validation_failure() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let (status, body) = post_json(
        &app,
        "/auth/register",
        None,
        serde_json::json!({
            "username": "ab", "email": "not-an-email", "password": "short"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_failure");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn session_responses_never_carry_secrets() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "correct horse battery").await;
    let token = login(&app, &email, "correct horse battery", "device-1").await;

    let (status, body) = get_with_token(&app, "/users/me", &token).await;
    assert_eq!(status, StatusCode::OK);

    let text = body.to_string();
    assert!(!text.contains("password_hash"));
    assert!(!text.contains("totp_secret"));
}

/// Management routes need the admin role, not just a session.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn admin_routes_reject_normal_users() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "correct horse battery").await;
    let token = login(&app, &email, "correct horse battery", "device-1").await;

    let (status, body) = get_with_token(&app, "/admin/users", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "authorization_failure");

    sqlx::query("UPDATE users SET role = 'admin' WHERE email = $1")
        .bind(&email)
        .execute(&state.pool)
        .await
        .unwrap();

    let (status, _) = get_with_token(&app, "/admin/users", &token).await;
    assert_eq!(status, StatusCode::OK);
}

/// Requests without a credential never reach protected handlers.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn missing_credential_is_unauthorized() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let (status, body) = get_with_token(&app, "/users/me", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "authentication_failure");
}
