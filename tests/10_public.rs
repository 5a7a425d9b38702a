mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{offline_app, send};

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let (app, _config, _dir) = offline_app()?;

    let (status, body) = send(&app, Method::GET, "/", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Docman API");
    Ok(())
}

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let (app, _config, _dir) = offline_app()?;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    Ok(())
}

#[tokio::test]
async fn login_rejects_malformed_email() -> Result<()> {
    let (app, _config, _dir) = offline_app()?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "not-an-email", "password": "secret123" })),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_rejects_short_password() -> Result<()> {
    let (app, _config, _dir) = offline_app()?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "clerk@example.com", "password": "abc" })),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_rejects_missing_fields() -> Result<()> {
    let (app, _config, _dir) = offline_app()?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "clerk@example.com" })),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> Result<()> {
    let (app, _config, _dir) = offline_app()?;

    let (status, _body) = send(&app, Method::GET, "/api/v1/nothing-here", None, None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
