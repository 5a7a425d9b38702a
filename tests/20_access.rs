mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use docman_api::auth::permissions::{
    CAN_CREATE_MY_DOCUMENT, CAN_MANAGE_TAG, CAN_MANAGE_USER,
};
use docman_api::auth::{generate_jwt, Claims};

use common::{admin_token, offline_app, send, send_multipart, token_for, token_user};

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let (app, _config, _dir) = offline_app()?;

    let (status, body) = send(&app, Method::GET, "/api/v1/users/me", None, None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_unauthorized() -> Result<()> {
    let (app, _config, _dir) = offline_app()?;

    let (status, body) =
        send(&app, Method::GET, "/api/v1/users/me", Some("not.a.jwt"), None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Could not validate credentials");
    Ok(())
}

#[tokio::test]
async fn token_from_another_secret_is_unauthorized() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let mut security = config.security.clone();
    security.jwt_secret = "some-other-secret".to_string();
    let token = generate_jwt(token_user(1, &[]), &security)?;

    let (status, _body) = send(&app, Method::GET, "/api/v1/users/me", Some(&token), None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "1".to_string(),
        user: token_user(1, &[]),
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.security.jwt_secret.as_bytes()),
    )?;

    let (status, body) = send(&app, Method::GET, "/api/v1/users/me", Some(&token), None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");
    Ok(())
}

#[tokio::test]
async fn inactive_user_is_forbidden() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let mut user = token_user(1, &[CAN_MANAGE_USER]);
    user.is_active = false;
    let token = token_for(&config, user);

    let (status, body) = send(&app, Method::GET, "/api/v1/users", Some(&token), None).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn me_needs_no_permission() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = token_for(&config, token_user(42, &[]));

    let (status, _body) = send(&app, Method::GET, "/api/v1/users/me", Some(&token), None).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn missing_permission_is_forbidden() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = token_for(&config, token_user(1, &[CAN_MANAGE_TAG]));

    let (status, body) = send(&app, Method::GET, "/api/v1/users", Some(&token), None).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn role_writes_are_admin_only() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = token_for(&config, token_user(1, &[CAN_MANAGE_USER]));

    let (status, _body) = send(
        &app,
        Method::POST,
        "/api/v1/users/roles",
        Some(&token),
        Some(json!({ "name": "clerk", "permissions": ["manage_tag"] })),
    )
    .await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn permitted_request_reaches_the_database() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = token_for(&config, token_user(1, &[CAN_MANAGE_TAG]));

    let (status, body) = send(&app, Method::GET, "/api/v1/tags", Some(&token), None).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    Ok(())
}

#[tokio::test]
async fn admin_bypasses_permission_checks() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = admin_token(&config, 1);

    let (status, _body) = send(&app, Method::GET, "/api/v1/users", Some(&token), None).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn non_integer_id_is_rejected() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = admin_token(&config, 1);

    let (status, body) = send(&app, Method::GET, "/api/v1/tags/abc", Some(&token), None).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["id"].is_string());
    Ok(())
}

#[tokio::test]
async fn page_below_one_is_rejected() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = admin_token(&config, 1);

    let (status, body) =
        send(&app, Method::GET, "/api/v1/categories?page=0", Some(&token), None).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["page"].is_string());
    Ok(())
}

#[tokio::test]
async fn document_form_requires_category() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = token_for(&config, token_user(1, &[CAN_CREATE_MY_DOCUMENT]));

    let (status, body) = send_multipart(
        &app,
        "/api/v1/documents",
        &token,
        &[("name", "Quarterly report")],
        Some(("report.txt", &b"numbers"[..])),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["category_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn document_form_rejects_non_integer_category() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = token_for(&config, token_user(1, &[CAN_CREATE_MY_DOCUMENT]));

    let (status, body) = send_multipart(
        &app,
        "/api/v1/documents",
        &token,
        &[("name", "Quarterly report"), ("category_id", "finance")],
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["category_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn document_upload_without_permission_is_forbidden() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = token_for(&config, token_user(1, &[CAN_MANAGE_TAG]));

    let (status, _body) = send_multipart(
        &app,
        "/api/v1/documents",
        &token,
        &[("name", "Quarterly report"), ("category_id", "1")],
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn huge_page_is_rejected() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = admin_token(&config, 1);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/categories?page=9223372036854775807&size=10",
        Some(&token),
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["page"].is_string());
    Ok(())
}

#[tokio::test]
async fn role_update_requires_a_permission() -> Result<()> {
    let (app, config, _dir) = offline_app()?;
    let token = admin_token(&config, 1);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/users/roles/1",
        Some(&token),
        Some(json!({ "permissions": [] })),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["permissions"].is_string());
    Ok(())
}
