//! HTTP-level tests for the auth service routes.

mod common;

use agora_core::roles::Role;
use agora_core::store::SessionStore;
use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, call, login, seed_user, set_refresh_cookie};
use serde_json::json;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_creates_user() {
    let app = build_test_app();

    let response = call(Method::POST, "/api/v1/auth/register")
        .json(json!({ "name": "alice", "email": "alice@example.com", "password": "long-enough-pw" }))
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["role"], "user");
    assert_eq!(json["data"]["is_blocked"], false);
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_duplicate_email_is_conflict() {
    let app = build_test_app();
    seed_user(&app, "taken@example.com", Role::User).await;

    let response = call(Method::POST, "/api/v1/auth/register")
        .json(json!({ "name": "bob", "email": "taken@example.com", "password": "long-enough-pw" }))
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_short_password_is_rejected() {
    let app = build_test_app();

    let response = call(Method::POST, "/api/v1/auth/register")
        .json(json!({ "name": "carol", "email": "carol@example.com", "password": "short" }))
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_sets_cookie_and_returns_access_token() {
    let app = build_test_app();
    seed_user(&app, "dave@example.com", Role::User).await;

    let response = call(Method::POST, "/api/v1/auth/login")
        .header("user-agent", "curl/8.0")
        .json(json!({ "email": "dave@example.com", "password": common::PASSWORD }))
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/api/v1/auth"));

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert!(json.get("refresh_token").is_none());

    assert_eq!(app.sessions.len().await, 1);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = build_test_app();
    seed_user(&app, "erin@example.com", Role::User).await;

    let wrong_password = call(Method::POST, "/api/v1/auth/login")
        .json(json!({ "email": "erin@example.com", "password": "not-the-password" }))
        .send(&app)
        .await;
    let unknown_email = call(Method::POST, "/api/v1/auth/login")
        .json(json!({ "email": "nobody@example.com", "password": "not-the-password" }))
        .send(&app)
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[tokio::test]
async fn blocked_user_cannot_log_in() {
    let app = build_test_app();
    let user = seed_user(&app, "frank@example.com", Role::User).await;
    agora_core::store::UserStore::block(app.users.as_ref(), user.id)
        .await
        .unwrap();

    let response = call(Method::POST, "/api/v1/auth/login")
        .json(json!({ "email": "frank@example.com", "password": common::PASSWORD }))
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "USER_BLOCKED");
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_rotates_cookie_once() {
    let app = build_test_app();
    seed_user(&app, "gina@example.com", Role::User).await;
    let (_, old_refresh) = login(&app, "gina@example.com").await;

    let response = call(Method::POST, "/api/v1/auth/refresh")
        .refresh_cookie(&old_refresh)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let new_refresh = set_refresh_cookie(&response).unwrap();
    assert_ne!(new_refresh, old_refresh);
    assert!(body_json(response).await["access_token"].is_string());

    let replay = call(Method::POST, "/api/v1/auth/refresh")
        .refresh_cookie(&old_refresh)
        .send(&app)
        .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(replay).await["error"], "Invalid or expired refresh token");

    assert_eq!(app.sessions.len().await, 1);
}

#[tokio::test]
async fn refresh_without_cookie_is_unauthorized() {
    let app = build_test_app();

    let response = call(Method::POST, "/api/v1/auth/refresh").send(&app).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn refresh_with_garbage_cookie_is_unauthorized() {
    let app = build_test_app();

    let response = call(Method::POST, "/api/v1/auth/refresh")
        .refresh_cookie("definitely.not.ajwt")
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_and_clears_cookie() {
    let app = build_test_app();
    seed_user(&app, "hank@example.com", Role::User).await;
    let (_, refresh) = login(&app, "hank@example.com").await;

    let response = call(Method::POST, "/api/v1/auth/logout")
        .refresh_cookie(&refresh)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cleared.starts_with("refresh_token=;"));
    assert!(cleared.contains("Max-Age=0"));

    assert!(app.sessions.is_empty().await);

    let again = call(Method::POST, "/api/v1/auth/logout")
        .refresh_cookie(&refresh)
        .send(&app)
        .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_without_cookie_is_bad_request() {
    let app = build_test_app();
    let response = call(Method::POST, "/api/v1/auth/logout").send(&app).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sessions_listed_then_not_found_after_logout_all() {
    let app = build_test_app();
    seed_user(&app, "ivy@example.com", Role::User).await;
    let (access, _) = login(&app, "ivy@example.com").await;
    login(&app, "ivy@example.com").await;

    let response = call(Method::GET, "/api/v1/auth/sessions")
        .bearer(&access)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let sessions = json["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["user_agent"], "integration-test");
    assert!(sessions[0].get("refresh_token_hash").is_none());

    let response = call(Method::POST, "/api/v1/auth/logout-all")
        .bearer(&access)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = call(Method::GET, "/api/v1/auth/sessions")
        .bearer(&access)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_require_bearer() {
    let app = build_test_app();
    let response = call(Method::GET, "/api/v1/auth/sessions").send(&app).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn me_returns_profile() {
    let app = build_test_app();
    let user = seed_user(&app, "jack@example.com", Role::User).await;
    let (access, _) = login(&app, "jack@example.com").await;

    let response = call(Method::GET, "/api/v1/users/me")
        .bearer(&access)
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], user.id);
}

#[tokio::test]
async fn update_other_user_is_forbidden() {
    let app = build_test_app();
    seed_user(&app, "kate@example.com", Role::User).await;
    let other = seed_user(&app, "liam@example.com", Role::User).await;
    let (access, _) = login(&app, "kate@example.com").await;

    let response = call(Method::PUT, &format!("/api/v1/users/{}", other.id))
        .bearer(&access)
        .json(json!({ "name": "hijacked" }))
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn update_own_profile() {
    let app = build_test_app();
    let user = seed_user(&app, "mia@example.com", Role::User).await;
    let (access, _) = login(&app, "mia@example.com").await;

    let response = call(Method::PUT, &format!("/api/v1/users/{}", user.id))
        .bearer(&access)
        .json(json!({ "name": "Mia", "email": "mia@new.example.com" }))
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Mia");
    assert_eq!(json["data"]["email"], "mia@new.example.com");
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let app = build_test_app();
    seed_user(&app, "ned@example.com", Role::User).await;
    let (access, _) = login(&app, "ned@example.com").await;

    let response = call(Method::GET, "/api/v1/admin/users")
        .bearer(&access)
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn block_revokes_sessions_and_refresh_fails() {
    let app = build_test_app();
    seed_user(&app, "root@example.com", Role::Admin).await;
    let target = seed_user(&app, "olga@example.com", Role::User).await;
    let (admin_access, _) = login(&app, "root@example.com").await;
    let (_, target_refresh) = login(&app, "olga@example.com").await;

    let response = call(Method::POST, &format!("/api/v1/admin/users/{}/block", target.id))
        .bearer(&admin_access)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let remaining = app
        .sessions
        .list_active_by_user(target.id, chrono::Utc::now())
        .await
        .unwrap();
    assert!(remaining.is_empty());

    let refresh = call(Method::POST, "/api/v1/auth/refresh")
        .refresh_cookie(&target_refresh)
        .send(&app)
        .await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);

    let response = call(Method::GET, "/api/v1/admin/users")
        .bearer(&admin_access)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let olga = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"] == target.id)
        .unwrap()
        .clone();
    assert_eq!(olga["is_blocked"], true);

    let response = call(Method::POST, &format!("/api/v1/admin/users/{}/unblock", target.id))
        .bearer(&admin_access)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn block_unknown_user_is_not_found() {
    let app = build_test_app();
    seed_user(&app, "root@example.com", Role::Admin).await;
    let (admin_access, _) = login(&app, "root@example.com").await;

    let response = call(Method::POST, "/api/v1/admin/users/9999/block")
        .bearer(&admin_access)
        .send(&app)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Internal verification / health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_verify_resolves_identity() {
    let app = build_test_app();
    let user = seed_user(&app, "pia@example.com", Role::Admin).await;
    let (access, refresh) = login(&app, "pia@example.com").await;

    let response = call(Method::POST, "/api/v1/internal/verify")
        .bearer(&access)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user_id"], user.id);
    assert_eq!(json["role"], "admin");

    // A refresh token is not an access token.
    let response = call(Method::POST, "/api/v1/internal/verify")
        .bearer(&refresh)
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = build_test_app();
    let response = call(Method::GET, "/health").send(&app).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json.get("db_healthy").is_none());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = build_test_app();
    let response = call(Method::GET, "/health").send(&app).await;
    assert!(response.headers().contains_key("x-request-id"));
}
