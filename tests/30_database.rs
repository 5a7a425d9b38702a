//! Contract tests against a live Postgres; set TEST_DATABASE_URL to run them.

mod common;

use anyhow::Result;
use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use docman_api::auth::permissions::{
    CAN_DELETE_MY_DOCUMENT, CAN_EDIT_MY_DOCUMENT, CAN_SHOW_MY_DOCUMENT,
};
use docman_api::middleware::AuthUser;
use docman_api::services::document_service::{DocumentFields, DocumentService};
use docman_api::services::user_service::{CreateUserRequest, UserService};
use docman_api::storage::UploadedFile;

use common::{send, send_multipart, token_for, token_user, unique, TestContext};

async fn post(ctx: &TestContext, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    send(&ctx.app, Method::POST, uri, Some(&ctx.admin_token), Some(body)).await
}

async fn create_category(ctx: &TestContext) -> Result<i64> {
    let (status, body) = post(ctx, "/api/v1/categories", json!({ "title": unique("category") })).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["data"]["id"].as_i64().unwrap_or_default())
}

async fn create_sub_category(ctx: &TestContext, category_id: i64) -> Result<i64> {
    let (status, body) = post(
        ctx,
        "/api/v1/categories/sub-categories",
        json!({ "title": unique("sub"), "category_id": category_id }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["data"]["id"].as_i64().unwrap_or_default())
}

async fn create_document(
    ctx: &TestContext,
    owner: &AuthUser,
    category_id: i64,
    sub_category_id: Option<i64>,
    file: Option<UploadedFile>,
) -> Result<i32> {
    let fields = DocumentFields {
        name: unique("doc"),
        category_id: category_id as i32,
        sub_category_id: sub_category_id.map(|id| id as i32),
        description: Some("draft".to_string()),
        ..Default::default()
    };
    let detail = DocumentService::new(ctx.pool.clone(), ctx.state.store.clone())
        .create_document(owner, fields, file)
        .await?;
    Ok(detail.document.id)
}

fn upload(name: &str, content: &str) -> UploadedFile {
    UploadedFile {
        file_name: Some(name.to_string()),
        content_type: Some("text/plain".to_string()),
        bytes: Bytes::from(content.to_string()),
    }
}

#[tokio::test]
async fn login_issues_a_usable_token() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let email = format!("{}@example.com", unique("clerk"));
    let (status, _) = post(&ctx, "/api/v1/users", json!({ "email": email, "password": "secret123" })).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &ctx.app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": email.to_uppercase(), "password": "secret123" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "bearer");
    let token = body["data"]["access_token"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&ctx.app, Method::GET, "/api/v1/users/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], email);
    assert!(body["data"].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };

    let (wrong_status, wrong_body) = send(
        &ctx.app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": ctx.admin.email, "password": "not-the-password" })),
    )
    .await?;
    let (unknown_status, unknown_body) = send(
        &ctx.app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": format!("{}@example.com", unique("ghost")), "password": "secret123" })),
    )
    .await?;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["message"], unknown_body["message"]);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let body = json!({ "email": format!("{}@example.com", unique("dup")), "password": "secret123" });

    let (first, _) = post(&ctx, "/api/v1/users", body.clone()).await?;
    let (second, response) = post(&ctx, "/api/v1/users", body).await?;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(response["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn unknown_role_is_a_validation_error() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };

    let (status, body) = post(
        &ctx,
        "/api/v1/users",
        json!({
            "email": format!("{}@example.com", unique("norole")),
            "password": "secret123",
            "role_id": i32::MAX
        }),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["role_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn duplicate_tag_conflicts() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let title = unique("tag");

    let (first, _) = post(&ctx, "/api/v1/tags", json!({ "title": title })).await?;
    let (second, _) = post(&ctx, "/api/v1/tags", json!({ "title": title })).await?;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn role_in_use_cannot_be_deleted() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let name = unique("role");

    let (status, role) = post(
        &ctx,
        "/api/v1/users/roles",
        json!({ "name": name, "permissions": ["manage_tag", "show_my_document"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let mut permissions: Vec<String> = serde_json::from_value(role["data"]["permissions"].clone())?;
    permissions.sort();
    assert_eq!(permissions, vec!["manage_tag", "show_my_document"]);
    let role_id = role["data"]["id"].as_i64().unwrap_or_default();

    let (status, _) = post(&ctx, "/api/v1/users/roles", json!({ "name": name, "permissions": ["manage_tag"] })).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(
        &ctx,
        "/api/v1/users",
        json!({
            "email": format!("{}@example.com", unique("member")),
            "password": "secret123",
            "role_id": role_id
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/users/roles/{}", role_id);
    let (status, _) = send(&ctx.app, Method::DELETE, &uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn category_with_sub_categories_cannot_be_deleted() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let category_id = create_category(&ctx).await?;

    let (status, _) = post(
        &ctx,
        "/api/v1/categories/sub-categories",
        json!({ "title": unique("sub"), "category_id": category_id }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/categories/{}", category_id);
    let (status, body) = send(&ctx.app, Method::GET, &uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sub_categories"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(&ctx.app, Method::DELETE, &uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn pagination_reports_total() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    for _ in 0..3 {
        create_category(&ctx).await?;
    }

    let (status, body) = send(
        &ctx.app,
        Method::GET,
        "/api/v1/categories?page=1&size=2",
        Some(&ctx.admin_token),
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current"], 1);
    assert_eq!(body["data"]["size"], 2);
    assert!(body["data"]["total"].as_i64().unwrap_or_default() >= 3);
    assert_eq!(body["data"]["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn document_upload_round_trip() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let category_id = create_category(&ctx).await?.to_string();

    let (status, body) = send_multipart(
        &ctx.app,
        "/api/v1/documents",
        &ctx.admin_token,
        &[
            ("name", "Contract"),
            ("category_id", category_id.as_str()),
            ("tags", "legal, legal ,draft"),
        ],
        Some(("contract.txt", &b"first draft"[..])),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tags"], json!(["legal", "draft"]));
    assert_eq!(body["data"]["current_version"]["version_number"], 1);
    let id = body["data"]["id"].as_i64().unwrap_or_default();

    let (status, body) = send_multipart(
        &ctx.app,
        &format!("/api/v1/documents/{}/versions", id),
        &ctx.admin_token,
        &[],
        Some(("contract.txt", &b"second draft"[..])),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["version_number"], 2);

    let uri = format!("/api/v1/documents/{}/history", id);
    let (status, body) = send(&ctx.app, Method::GET, &uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["total"].as_i64().unwrap_or_default() >= 2);
    Ok(())
}

#[tokio::test]
async fn concurrent_uploads_keep_one_current_version() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let category_id = create_category(&ctx).await? as i32;
    let admin = ctx.admin_user();

    let service = DocumentService::new(ctx.pool.clone(), ctx.state.store.clone());
    let fields = DocumentFields {
        name: unique("ledger"),
        category_id,
        ..Default::default()
    };
    let detail = service
        .create_document(&admin, fields, Some(upload("ledger.txt", "v1")))
        .await?;
    let id = detail.document.id;

    let mut tasks = Vec::new();
    for n in 2..=6 {
        let service = DocumentService::new(ctx.pool.clone(), ctx.state.store.clone());
        let admin = admin.clone();
        tasks.push(tokio::spawn(async move {
            service
                .create_version(&admin, id, upload("ledger.txt", &format!("v{}", n)))
                .await
        }));
    }
    for task in tasks {
        task.await??;
    }

    let versions = service.list_versions(id).await?;
    let numbers: Vec<i32> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![6, 5, 4, 3, 2, 1]);

    let current: Vec<_> = versions.iter().filter(|v| v.current_version).collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].version_number, 6);

    let download = service.download_current(id).await?;
    assert_eq!(download.file_name, "ledger.txt");
    Ok(())
}

#[tokio::test]
async fn sub_category_used_by_a_document_stays_put() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let category_id = create_category(&ctx).await?;
    let other_category_id = create_category(&ctx).await?;
    let sub_category_id = create_sub_category(&ctx, category_id).await?;
    let document_id =
        create_document(&ctx, &ctx.admin_user(), category_id, Some(sub_category_id), None).await?;

    let sub_uri = format!("/api/v1/categories/sub-categories/{}", sub_category_id);
    let (status, body) = send(&ctx.app, Method::DELETE, &sub_uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = send(
        &ctx.app,
        Method::PUT,
        &sub_uri,
        Some(&ctx.admin_token),
        Some(json!({ "category_id": other_category_id })),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // renaming in place is still allowed
    let (status, _) = send(
        &ctx.app,
        Method::PUT,
        &sub_uri,
        Some(&ctx.admin_token),
        Some(json!({ "title": unique("renamed"), "category_id": category_id })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let doc_uri = format!("/api/v1/documents/{}", document_id);
    let (status, body) = send(
        &ctx.app,
        Method::PUT,
        &doc_uri,
        Some(&ctx.admin_token),
        Some(json!({ "sub_category_id": null, "description": null })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["sub_category_id"].is_null());
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["category_id"].as_i64(), Some(category_id));

    let (status, _) = send(&ctx.app, Method::DELETE, &sub_uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn owner_permissions_only_reach_own_documents() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let category_id = create_category(&ctx).await?;
    let owner = UserService::new(ctx.pool.clone())
        .create_user(CreateUserRequest {
            email: format!("{}@example.com", unique("owner")),
            password: "secret123".to_string(),
            first_name: None,
            last_name: None,
            phone_number: None,
            role_id: None,
        })
        .await?;
    let permissions = [CAN_EDIT_MY_DOCUMENT, CAN_SHOW_MY_DOCUMENT, CAN_DELETE_MY_DOCUMENT];
    let token = token_for(&ctx.config, token_user(owner.id, &permissions));
    let owner_user = AuthUser {
        id: owner.id,
        email: owner.email.clone(),
        is_active: true,
        is_superuser: false,
        is_admin: false,
        role: None,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    };

    let theirs = create_document(&ctx, &ctx.admin_user(), category_id, None, None).await?;
    let mine = create_document(&ctx, &owner_user, category_id, None, None).await?;
    let theirs_uri = format!("/api/v1/documents/{}", theirs);
    let mine_uri = format!("/api/v1/documents/{}", mine);

    let (status, _) = send(&ctx.app, Method::GET, &theirs_uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&ctx.app, Method::GET, &mine_uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"].as_i64(), Some(owner.id as i64));

    let rename = json!({ "name": unique("renamed") });
    let (status, _) = send(&ctx.app, Method::PUT, &theirs_uri, Some(&token), Some(rename.clone())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&ctx.app, Method::PUT, &mine_uri, Some(&token), Some(rename)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&ctx.app, Method::DELETE, &theirs_uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&ctx.app, Method::DELETE, &mine_uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&ctx.app, Method::GET, &theirs_uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn deleting_a_document_keeps_versions_and_history() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let category_id = create_category(&ctx).await?;
    let admin = ctx.admin_user();
    let service = DocumentService::new(ctx.pool.clone(), ctx.state.store.clone());
    let fields = DocumentFields {
        name: unique("archive"),
        category_id: category_id as i32,
        ..Default::default()
    };
    let detail = service
        .create_document(&admin, fields, Some(upload("archive.txt", "kept")))
        .await?;
    let id = detail.document.id;
    let version_id = detail.current_version.map(|v| v.id).unwrap_or_default();

    let uri = format!("/api/v1/documents/{}", id);
    let (status, _) = post(&ctx, &format!("{}/comments", uri), json!({ "comment": "looks fine" })).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&ctx.app, Method::DELETE, &uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&ctx.app, Method::GET, &uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let comments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM document_comments WHERE document_id = $1")
            .bind(id)
            .fetch_one(&ctx.pool)
            .await?;
    assert_eq!(comments, 0);

    let version_document: Option<Option<i32>> =
        sqlx::query_scalar("SELECT document_id FROM version_histories WHERE id = $1")
            .bind(version_id)
            .fetch_optional(&ctx.pool)
            .await?;
    assert_eq!(version_document, Some(None));

    let deleted: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM document_histories \
         WHERE document_id IS NULL AND action = 'deleted' AND action_by = $1 AND description = $2",
    )
    .bind(admin.id)
    .bind(format!("Deleted document {}", detail.document.name))
    .fetch_one(&ctx.pool)
    .await?;
    assert_eq!(deleted, 1);
    Ok(())
}

#[tokio::test]
async fn comments_are_listed_oldest_first() -> Result<()> {
    let Some(ctx) = TestContext::from_env().await? else {
        return Ok(());
    };
    let category_id = create_category(&ctx).await?;
    let id = create_document(&ctx, &ctx.admin_user(), category_id, None, None).await?;
    let uri = format!("/api/v1/documents/{}/comments", id);

    let (status, body) = post(&ctx, &uri, json!({ "comment": "   " })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["comment"].is_string());

    for text in ["first", "second"] {
        let (status, _) = post(&ctx, &uri, json!({ "comment": text })).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&ctx.app, Method::GET, &uri, Some(&ctx.admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body["data"]
        .as_array()
        .map(|comments| comments.iter().filter_map(|c| c["comment"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(texts, vec!["first", "second"]);

    let (status, _) = post(&ctx, "/api/v1/documents/2147483647/comments", json!({ "comment": "lost" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
