mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{seed_user, spawn_app, spawn_app_with, test_config, TestApp};
use inspection_api::rbac::Role;

async fn reject(app: &TestApp, inspection_id: Uuid, notes: &str) {
    let (status, body) = app
        .post(
            &format!("/api/inspections/{}/approvals", inspection_id),
            &app.manager,
            json!({ "decision": "rejected", "notes": notes }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["inspection"]["status"], "rejected");
}

async fn resubmit(app: &TestApp, inspection_id: Uuid) {
    let (status, body) = app
        .post(&format!("/api/inspections/{}/submit", inspection_id), &app.inspector, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn third_rejection_requires_escalation() -> Result<()> {
    let app = spawn_app().await;
    let id = app.draft_inspection().await;
    let approvals = format!("/api/inspections/{}/approvals", id);

    app.submit(id).await;
    reject(&app, id, "Photos are blurry").await;
    resubmit(&app, id).await;
    reject(&app, id, "Still missing the north span").await;

    let (_, body) = app.get(&format!("/api/inspections/{}", id), &app.manager).await;
    assert_eq!(body["data"]["rejectionCount"], 2);
    resubmit(&app, id).await;

    let (status, body) = app
        .post(&approvals, &app.manager, json!({ "decision": "rejected", "notes": "Again" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "escalate");

    let (status, body) = app
        .post(
            &approvals,
            &app.manager,
            json!({
                "decision": "rejected",
                "notes": "Third attempt still incomplete",
                "escalate": true,
                "escalationReason": "Inspector keeps skipping the north span",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let data = &body["data"];
    assert_eq!(data["inspection"]["status"], "rejected");
    assert_eq!(data["inspection"]["rejectionCount"], 2);
    assert_eq!(data["approval"]["escalated"], true);
    assert_eq!(data["escalation"]["status"], "QUEUED");
    let escalation_id = data["escalation"]["id"].as_str().expect("escalation id").to_string();

    // Executives hear about unaddressed escalations
    let (_, body) = app.get("/api/notifications", &app.executive).await;
    let kinds: Vec<&str> = body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|n| n["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"escalation-created"));

    let (_, body) = app.get(&approvals, &app.inspector).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));

    let escalation = format!("/api/escalations/{}/status", escalation_id);
    let (status, _) = app.patch(&escalation, &app.manager, json!({ "status": "NOTIFIED" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.patch(&escalation, &app.executive, json!({ "status": "RESOLVED" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.patch(&escalation, &app.executive, json!({ "status": "NOTIFIED" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .patch(
            &escalation,
            &app.executive,
            json!({ "status": "RESOLVED", "resolutionNotes": "Reassigned to a senior inspector" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "RESOLVED");
    assert!(body["data"]["resolvedAt"].is_string());

    let (status, _) = app.patch(&escalation, &app.executive, json!({ "status": "EXPIRED" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn escalating_early_is_rejected() -> Result<()> {
    let app = spawn_app().await;
    let id = app.draft_inspection().await;
    app.submit(id).await;

    let (status, body) = app
        .post(
            &format!("/api/inspections/{}/approvals", id),
            &app.manager,
            json!({ "decision": "rejected", "notes": "No", "escalate": true, "escalationReason": "Too soon" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "escalate");

    let (status, body) = app
        .post(
            "/api/escalations",
            &app.manager,
            json!({ "inspectionId": id.to_string(), "reason": "Too soon" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "escalate");
    Ok(())
}

#[tokio::test]
async fn rejection_needs_notes() -> Result<()> {
    let app = spawn_app().await;
    let id = app.draft_inspection().await;
    app.submit(id).await;

    let (status, body) = app
        .post(&format!("/api/inspections/{}/approvals", id), &app.manager, json!({ "decision": "rejected" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "notes");
    Ok(())
}

#[tokio::test]
async fn approved_inspections_are_locked() -> Result<()> {
    let app = spawn_app().await;
    let id = app.draft_inspection().await;
    app.submit(id).await;

    let (status, _) = app
        .post(&format!("/api/inspections/{}/review", id), &app.manager, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(&format!("/api/inspections/{}/approvals", id), &app.inspector, json!({ "decision": "approved" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&format!("/api/inspections/{}/approvals", id), &app.manager, json!({ "decision": "approved" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["inspection"]["status"], "approved");

    let (status, _) = app
        .patch(&format!("/api/inspections/{}", id), &app.inspector, json!({ "notes": "late edit" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&format!("/api/inspections/{}/approvals", id), &app.manager, json!({ "decision": "approved" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/notifications", &app.inspector).await;
    let kinds: Vec<&str> = body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|n| n["kind"].as_str())
        .collect();
    assert_eq!(kinds, vec!["inspection-approved", "inspection-assigned"]);
    Ok(())
}

#[tokio::test]
async fn submission_requires_every_required_answer() -> Result<()> {
    let app = spawn_app().await;
    let id = app.draft_inspection().await;
    let uri = format!("/api/inspections/{}", id);

    let (status, _) = app.patch(&uri, &app.inspector, json!({ "responses": { "condition": "good" } })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post(&format!("{}/submit", uri), &app.inspector, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "responses.safe");
    Ok(())
}

#[tokio::test]
async fn inspectors_cannot_see_other_assignments() -> Result<()> {
    let app = spawn_app().await;
    let id = app.draft_inspection().await;
    let other = seed_user(&app.store, &app.config, "other@example.com", "Oli Other", Role::Inspector).await;

    let (status, _) = app.get(&format!("/api/inspections/{}", id), &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/inspections", &other).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    let (_, body) = app.get("/api/inspections", &app.inspector).await;
    assert_eq!(body["data"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn unknown_ids_are_not_found() -> Result<()> {
    let app = spawn_app().await;
    let (status, body) = app.get(&format!("/api/inspections/{}", Uuid::new_v4()), &app.manager).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app.get("/api/inspections/not-a-uuid", &app.manager).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn assignee_must_be_an_inspector_on_the_team() -> Result<()> {
    let app = spawn_app().await;
    let (project_id, checklist_id) = app.project_with_checklist().await;
    let outsider = seed_user(&app.store, &app.config, "outsider@example.com", "Oz Outsider", Role::Inspector).await;

    let cases = [
        (outsider.id(), "user is not a member of this project"),
        (app.executive.id(), "user cannot perform inspections"),
        (Uuid::new_v4(), "user does not exist"),
    ];
    for (assignee, message) in cases {
        let (status, body) = app
            .post(
                "/api/inspections",
                &app.manager,
                json!({
                    "projectId": project_id.to_string(),
                    "checklistId": checklist_id.to_string(),
                    "assignedTo": assignee.to_string(),
                    "title": "Pile cap survey",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["details"][0]["field"], "assignedTo");
        assert_eq!(body["details"][0]["message"], message);
    }
    let (_, body) = app.get("/api/inspections", &app.manager).await;
    assert_eq!(body["data"]["total"], 0);

    let id = app.draft_inspection().await;
    let uri = format!("/api/inspections/{}", id);
    let (status, body) = app
        .patch(&uri, &app.manager, json!({ "assignedTo": outsider.id().to_string() }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["details"][0]["field"], "assignedTo");

    let (_, body) = app.get(&uri, &app.manager).await;
    assert_eq!(body["data"]["assignedTo"], app.inspector.id().to_string());
    Ok(())
}

#[tokio::test]
async fn every_executive_hears_about_unaddressed_escalations() -> Result<()> {
    let mut config = test_config();
    config.api.max_page_size = 1;
    let app = spawn_app_with(config).await;
    let second = seed_user(&app.store, &app.config, "exec2@example.com", "Eden Exec", Role::Executive).await;
    let id = app.draft_inspection().await;

    app.submit(id).await;
    reject(&app, id, "Photos are blurry").await;
    resubmit(&app, id).await;
    reject(&app, id, "Still missing the north span").await;
    resubmit(&app, id).await;
    let (status, body) = app
        .post(
            &format!("/api/inspections/{}/approvals", id),
            &app.manager,
            json!({
                "decision": "rejected",
                "notes": "Third attempt still incomplete",
                "escalate": true,
                "escalationReason": "Inspector keeps skipping the north span",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    for exec in [&app.executive, &second] {
        let (_, body) = app.get("/api/notifications/unread-count", exec).await;
        assert_eq!(body["data"]["count"], 1, "{} was not notified", exec.user.email);
    }
    Ok(())
}
