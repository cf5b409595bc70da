mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::json;

use common::spawn_app;
use inspection_api::rbac::Role;

#[derive(Clone, Copy, Debug)]
enum Caller {
    Executive,
    Manager,
    Inspector,
}

#[rstest]
#[case(Method::GET, "/api/users", Caller::Executive, StatusCode::OK)]
#[case(Method::GET, "/api/users", Caller::Manager, StatusCode::OK)]
#[case(Method::GET, "/api/users", Caller::Inspector, StatusCode::FORBIDDEN)]
#[case(Method::POST, "/api/projects", Caller::Executive, StatusCode::BAD_REQUEST)]
#[case(Method::POST, "/api/projects", Caller::Manager, StatusCode::BAD_REQUEST)]
#[case(Method::POST, "/api/projects", Caller::Inspector, StatusCode::FORBIDDEN)]
#[case(Method::GET, "/api/projects", Caller::Inspector, StatusCode::OK)]
#[case(Method::GET, "/api/escalations", Caller::Manager, StatusCode::OK)]
#[case(Method::GET, "/api/escalations", Caller::Inspector, StatusCode::FORBIDDEN)]
#[case(Method::GET, "/api/analytics/overview", Caller::Executive, StatusCode::OK)]
#[case(Method::GET, "/api/analytics/overview", Caller::Inspector, StatusCode::FORBIDDEN)]
#[case(Method::GET, "/api/audit-logs", Caller::Executive, StatusCode::OK)]
#[case(Method::GET, "/api/audit-logs", Caller::Manager, StatusCode::FORBIDDEN)]
#[case(Method::GET, "/api/audit-logs", Caller::Inspector, StatusCode::FORBIDDEN)]
#[case(Method::GET, "/api/notifications", Caller::Manager, StatusCode::OK)]
#[case(Method::GET, "/api/notifications", Caller::Inspector, StatusCode::OK)]
#[case(Method::GET, "/api/notifications", Caller::Executive, StatusCode::OK)]
#[tokio::test]
async fn role_gates(
    #[case] method: Method,
    #[case] uri: &str,
    #[case] caller: Caller,
    #[case] expected: StatusCode,
) -> Result<()> {
    let app = spawn_app().await;
    let user = match caller {
        Caller::Executive => &app.executive,
        Caller::Manager => &app.manager,
        Caller::Inspector => &app.inspector,
    };
    let body = (method == Method::POST).then(|| json!({}));
    let (status, response) = app.request(method, uri, Some(&user.token), body).await;
    assert_eq!(status, expected, "{caller:?} {uri}: {response}");
    if status == StatusCode::FORBIDDEN {
        assert_eq!(response["success"], false);
        assert_eq!(response["code"], "FORBIDDEN");
    }
    Ok(())
}

#[tokio::test]
async fn only_executives_change_roles() -> Result<()> {
    let app = spawn_app().await;
    let uri = format!("/api/users/{}/role", app.inspector.id());

    let (status, _) = app.patch(&uri, &app.manager, json!({ "role": "PROJECT_MANAGER" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&uri, &app.executive, json!({ "role": "SUPERUSER" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "role");

    let (status, body) = app.patch(&uri, &app.executive, json!({ "role": "PROJECT_MANAGER" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], Role::ProjectManager.as_str());

    // The stored role wins over the one in the (unchanged) token
    let (status, _) = app.get("/api/users", &app.inspector).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn missing_or_bad_tokens_are_unauthorized() -> Result<()> {
    let app = spawn_app().await;

    let (status, body) = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.request(Method::GET, "/api/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut other = common::test_config();
    other.security.jwt_secret = "some-other-secret".to_string();
    let forged = common::token_for(&other, &app.executive.user);
    let (status, _) = app.request(Method::GET, "/api/auth/me", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_for_unknown_user_is_rejected() -> Result<()> {
    let app = spawn_app().await;
    let mut ghost = app.manager.user.clone();
    ghost.id = uuid::Uuid::new_v4();
    let token = common::token_for(&app.config, &ghost);

    let (status, _) = app.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_returns_the_stored_user() -> Result<()> {
    let app = spawn_app().await;
    let (status, body) = app.get("/api/auth/me", &app.manager).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "pm@example.com");
    assert_eq!(body["data"]["role"], "PROJECT_MANAGER");
    Ok(())
}

#[tokio::test]
async fn public_routes_need_no_token() -> Result<()> {
    let app = spawn_app().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = app.request(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["version"].is_string());
    Ok(())
}
