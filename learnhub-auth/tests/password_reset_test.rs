mod common;

use axum::http::StatusCode;
use common::{app, cleanup, login, post_json, register_user, test_state};

async fn reset_token_for(pool: &sqlx::PgPool, email: &str) -> String {
    let (token,): (String,) = sqlx::query_as(
        "SELECT token FROM password_resets WHERE email = $1 AND status = 'pending' \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("no pending reset token");
    token
}

/// The response is identical whether or not the email is registered, so the
/// endpoint cannot be used to enumerate accounts.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn request_does_not_disclose_account_existence() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "original password").await;

    let (status_known, body_known) = post_json(
        &app,
        "/auth/password-reset/request",
        None,
        serde_json::json!({ "email": email, "captcha_token": "proof" }),
    )
    .await;

    let (status_unknown, body_unknown) = post_json(
        &app,
        "/auth/password-reset/request",
        None,
        serde_json::json!({ "email": "nobody@example.com", "captcha_token": "proof" }),
    )
    .await;

    assert_eq!(status_known, StatusCode::OK);
    assert_eq!(status_unknown, StatusCode::OK);
    assert_eq!(body_known, body_unknown);
}

/// A rejected bot check stops the flow before any token is minted.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn rejected_bot_check_blocks_the_request() {
    let state = test_state(false).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "original password").await;

    let (status, _) = post_json(
        &app,
        "/auth/password-reset/request",
        None,
        serde_json::json!({ "email": email, "captcha_token": "proof" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM password_resets")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

/// Happy path: the minted token replaces the credential exactly once.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn token_is_single_use() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "original password").await;

    let (status, _) = post_json(
        &app,
        "/auth/password-reset/request",
        None,
        serde_json::json!({ "email": email, "captcha_token": "proof" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = reset_token_for(&state.pool, &email).await;

    let (status, _) = post_json(
        &app,
        "/auth/password-reset/confirm",
        None,
        serde_json::json!({ "token": token, "new_password": "replacement pass" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old credential is gone, new one works.
    let (status, _) = post_json(
        &app,
        "/auth/login",
        None,
        serde_json::json!({
            "email": email, "password": "original password", "device_id": "d1"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    login(&app, &email, "replacement pass", "d1").await;

    // Replay of the consumed token is a state conflict.
    let (status, body) = post_json(
        &app,
        "/auth/password-reset/confirm",
        None,
        serde_json::json!({ "token": token, "new_password": "third password!" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "state_conflict");
}

/// A token past its horizon is rejected before any state changes.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn expired_token_is_rejected() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "original password").await;

    let (status, _) = post_json(
        &app,
        "/auth/password-reset/request",
        None,
        serde_json::json!({ "email": email, "captcha_token": "proof" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = reset_token_for(&state.pool, &email).await;

    sqlx::query("UPDATE password_resets SET expires_at = NOW() - INTERVAL '1 minute' WHERE token = $1")
        .bind(&token)
        .execute(&state.pool)
        .await
        .unwrap();

    let (status, _) = post_json(
        &app,
        "/auth/password-reset/confirm",
        None,
        serde_json::json!({ "token": token, "new_password": "replacement pass" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The old credential still works.
    login(&app, &email, "original password", "d1").await;
}

/// A second request retires the first token even inside its lifetime.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn newer_request_retires_older_pending_tokens() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let email = register_user(&app, "original password").await;

    for _ in 0..2 {
        let (status, _) = post_json(
            &app,
            "/auth/password-reset/request",
            None,
            serde_json::json!({ "email": email, "captcha_token": "proof" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (pending,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM password_resets WHERE email = $1 AND status = 'pending'",
    )
    .bind(&email)
    .fetch_one(&state.pool)
    .await
    .unwrap();
    assert_eq!(pending, 1);
}

/// Unknown tokens 404 rather than hinting at near-misses.
#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn unknown_token_is_not_found() {
    let state = test_state(true).await;
    cleanup(&state.pool).await;
    let app = app(&state);

    let (status, body) = post_json(
        &app,
        "/auth/password-reset/confirm",
        None,
        serde_json::json!({ "token": "0".repeat(64), "new_password": "replacement pass" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
