mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use common::{seed_user, spawn_app_with, test_config, TestApp, TestUser};
use inspection_api::config::StorageBackend;
use inspection_api::rbac::Role;

const BOUNDARY: &str = "----inspection-evidence-boundary";

fn multipart(file_name: &str, mime: &str, bytes: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(
    app: &TestApp,
    user: &TestUser,
    inspection_id: Uuid,
    file_name: &str,
    mime: &str,
    bytes: &[u8],
    fields: &[(&str, &str)],
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/inspections/{}/evidence", inspection_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", user.token))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart(file_name, mime, bytes, fields)))
        .expect("request");
    app.send(request).await
}

async fn small_limits_app() -> TestApp {
    let mut config = test_config();
    config.evidence.max_file_bytes = 1024;
    config.evidence.max_inspection_bytes = 2048;
    spawn_app_with(config).await
}

#[tokio::test]
async fn upload_records_checksum_and_location() -> Result<()> {
    let app = small_limits_app().await;
    let id = app.draft_inspection().await;
    let photo = vec![0xFFu8; 600];

    let (status, body) = upload(
        &app,
        &app.inspector,
        id,
        "north span.jpg",
        "image/jpeg",
        &photo,
        &[("latitude", "-33.852"), ("longitude", "151.211"), ("accuracy", "4.5")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let data = &body["data"];
    assert_eq!(data["mimeType"], "image/jpeg");
    assert_eq!(data["sizeBytes"], 600);
    assert_eq!(data["checksum"], format!("{:x}", Sha256::digest(&photo)));
    assert_eq!(data["latitude"], -33.852);
    assert!(data["url"].as_str().expect("url").starts_with("http://localhost:3000/files/"));
    assert_eq!(app.storage.len().await, 1);

    let (status, body) = app.get(&format!("/api/inspections/{}/evidence", id), &app.manager).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn disallowed_type_is_rejected() -> Result<()> {
    let app = small_limits_app().await;
    let id = app.draft_inspection().await;

    let (status, body) = upload(&app, &app.inspector, id, "notes.txt", "text/plain", b"hello", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "file");
    assert_eq!(app.storage.len().await, 0);
    Ok(())
}

#[tokio::test]
async fn oversized_file_is_rejected() -> Result<()> {
    let app = small_limits_app().await;
    let id = app.draft_inspection().await;

    let (status, body) = upload(&app, &app.inspector, id, "big.png", "image/png", &[1u8; 1025], &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "file");
    Ok(())
}

#[tokio::test]
async fn cumulative_limit_applies_per_inspection() -> Result<()> {
    let app = small_limits_app().await;
    let id = app.draft_inspection().await;

    for _ in 0..2 {
        let (status, body) = upload(&app, &app.inspector, id, "clip.mp4", "video/mp4", &[7u8; 1000], &[]).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
    let (status, body) = upload(&app, &app.inspector, id, "clip.mp4", "video/mp4", &[7u8; 1000], &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"][0]["message"].as_str().expect("message").contains("total"));
    assert_eq!(app.storage.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn uploader_can_delete_their_evidence() -> Result<()> {
    let app = small_limits_app().await;
    let id = app.draft_inspection().await;

    let (_, body) = upload(&app, &app.inspector, id, "crack.webp", "image/webp", &[3u8; 64], &[]).await;
    let evidence_id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, body) = app.delete(&format!("/api/evidence/{}", evidence_id), &app.inspector).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(app.storage.len().await, 0);

    let (status, _) = app.get(&format!("/api/evidence/{}", evidence_id), &app.manager).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn invalid_annotations_are_a_field_error() -> Result<()> {
    let app = small_limits_app().await;
    let id = app.draft_inspection().await;

    let (status, body) = upload(
        &app,
        &app.inspector,
        id,
        "deck.heic",
        "image/heic",
        &[9u8; 32],
        &[("annotations", "{not json")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "annotations");
    Ok(())
}

#[tokio::test]
async fn stored_files_need_inspection_access() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = test_config();
    config.storage.backend = StorageBackend::Postgres;
    config.storage.evidence_dir = dir.path().to_path_buf();
    let app = spawn_app_with(config).await;
    let id = app.draft_inspection().await;
    let other = seed_user(&app.store, &app.config, "other@example.com", "Oli Other", Role::Inspector).await;

    std::fs::create_dir_all(dir.path().join(id.to_string()))?;
    std::fs::write(dir.path().join(id.to_string()).join("e1-deck.txt"), "crack at joint 7")?;
    let uri = format!("/files/{}/e1-deck.txt", id);

    let (status, _) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get(&uri, &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/files/{}/e1-deck.txt", Uuid::new_v4()), &app.manager).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for user in [&app.inspector, &app.manager] {
        let (status, body) = app.get(&uri, user).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("crack at joint 7".into()));
    }
    Ok(())
}
