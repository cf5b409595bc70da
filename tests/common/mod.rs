#![allow(dead_code)]

pub mod flaky;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use inspection_api::auth::{generate_jwt, Claims};
use inspection_api::config::{AppConfig, StorageBackend};
use inspection_api::database::models::{NewUser, User};
use inspection_api::database::{Datastore, MemoryDatastore};
use inspection_api::rbac::Role;
use inspection_api::routes;
use inspection_api::state::AppState;
use inspection_api::storage::MemoryStorage;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDatastore>,
    pub storage: Arc<MemoryStorage>,
    pub config: AppConfig,
    pub executive: TestUser,
    pub manager: TestUser,
    pub inspector: TestUser,
}

#[derive(Clone)]
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.storage.backend = StorageBackend::Memory;
    config.security.jwt_secret = "integration-test-secret".to_string();
    config
}

/// Router over the in-memory backends with one user per role
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    spawn_app_over(config, |store| store as Arc<dyn Datastore>).await
}

/// Like [`spawn_app_with`], but the router sees the store through `wrap`
pub async fn spawn_app_over<F>(config: AppConfig, wrap: F) -> TestApp
where
    F: FnOnce(Arc<MemoryDatastore>) -> Arc<dyn Datastore>,
{
    let store = Arc::new(MemoryDatastore::new());
    let storage = Arc::new(MemoryStorage::new(config.storage.public_base_url.clone()));

    let executive = seed_user(&store, &config, "exec@example.com", "Erin Exec", Role::Executive).await;
    let manager = seed_user(&store, &config, "pm@example.com", "Pat Manager", Role::ProjectManager).await;
    let inspector = seed_user(&store, &config, "inspector@example.com", "Ira Inspector", Role::Inspector).await;

    let state = AppState::new(wrap(store.clone()), storage.clone(), config.clone());
    TestApp {
        router: routes::app(state),
        store,
        storage,
        config,
        executive,
        manager,
        inspector,
    }
}

pub async fn seed_user(store: &MemoryDatastore, config: &AppConfig, email: &str, name: &str, role: Role) -> TestUser {
    let user = store
        .create_user(NewUser {
            id: None,
            email: email.to_string(),
            full_name: name.to_string(),
            role,
        })
        .await
        .expect("seed user");
    let token = token_for(config, &user);
    TestUser { user, token }
}

pub fn token_for(config: &AppConfig, user: &User) -> String {
    let claims = Claims::new(user.id, user.email.clone(), user.role, 1);
    generate_jwt(&claims, &config.security.jwt_secret).expect("sign token")
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&user.token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(&user.token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(&user.token), None).await
    }

    /// Project with the inspector on the team and an active two-question checklist
    pub async fn project_with_checklist(&self) -> (Uuid, Uuid) {
        let (status, body) = self
            .post(
                "/api/projects",
                &self.manager,
                json!({
                    "name": "Harbour bridge retrofit",
                    "startDate": "2025-01-01",
                    "endDate": "2025-06-30",
                    "teamMembers": [self.inspector.id().to_string()],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let project_id = id_of(&body);

        let (status, body) = self
            .post(
                &format!("/api/projects/{}/checklists", project_id),
                &self.manager,
                json!({
                    "name": "Deck survey",
                    "questions": [
                        { "id": "condition", "label": "Surface condition", "type": "select", "required": true, "options": ["good", "poor"] },
                        { "id": "safe", "label": "Safe to access", "type": "boolean", "required": true }
                    ]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (project_id, id_of(&body))
    }

    /// Draft inspection assigned to the seeded inspector
    pub async fn draft_inspection(&self) -> Uuid {
        let (project_id, checklist_id) = self.project_with_checklist().await;
        let (status, body) = self
            .post(
                "/api/inspections",
                &self.manager,
                json!({
                    "projectId": project_id.to_string(),
                    "checklistId": checklist_id.to_string(),
                    "assignedTo": self.inspector.id().to_string(),
                    "title": "Span 4 deck inspection",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Fill in the responses and submit as the inspector
    pub async fn submit(&self, inspection_id: Uuid) {
        let uri = format!("/api/inspections/{}", inspection_id);
        let (status, body) = self
            .patch(&uri, &self.inspector, json!({ "responses": { "condition": "poor", "safe": true } }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let (status, body) = self.post(&format!("{}/submit", uri), &self.inspector, json!({})).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], "pending");
    }

    /// Poll until the fire-and-forget audit writer has caught up
    pub async fn wait_for_audit(&self, entity_type: &str, action: &str) -> Value {
        for _ in 0..50 {
            let (_, body) = self
                .get(&format!("/api/audit-logs?entityType={}", entity_type), &self.executive)
                .await;
            if let Some(entry) = body["data"]["items"]
                .as_array()
                .and_then(|items| items.iter().find(|e| e["action"] == action))
            {
                return entry.clone();
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("no {entity_type}/{action} audit entry was written");
    }
}

pub fn id_of(body: &Value) -> Uuid {
    body["data"]["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("response has no id: {body}"))
}
