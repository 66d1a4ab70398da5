mod common;

use axum::http::StatusCode;
use common::{parse_body, TestApp};
use project_tracker::domain::{models::project::NewProject, ports::ProjectRepository};
use serde_json::{json, Value};

async fn file_project_for(app: &TestApp, student_id: &str, title: &str, teacher_name: &str) -> Value {
    let res = app.create_file_project(
        &[("studentId", student_id), ("title", title), ("scale", "1:100"), ("teacherName", teacher_name)],
        None,
    ).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await
}

async fn activate(app: &TestApp, project: &Value) {
    let res = app.send_json("PATCH", "/api/v1/projects/activate", json!({ "qrnumber": project["qrnumber"] })).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_student_projects_split_by_activation() {
    let app = TestApp::new().await;
    let sid = app.create_student("amira", json!({ "teacherName": "T1" })).await;
    let project = file_project_for(&app, &sid, "Bridge Design", "T1").await;

    // 1. Freshly submitted work is non-active
    let res = app.get(&format!("/api/v1/projects/student/{}", sid)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let inactive = parse_body(res).await;
    assert_eq!(inactive.as_array().unwrap().len(), 1);
    assert_eq!(inactive[0]["id"], project["id"]);

    let res = app.get(&format!("/api/v1/projects/student/{}/active", sid)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["error"], "No active projects found for this student");

    // 2. After activation it moves across
    activate(&app, &project).await;

    let res = app.get(&format!("/api/v1/projects/student/{}/active", sid)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await.as_array().unwrap().len(), 1);

    let res = app.get(&format!("/api/v1/projects/student/{}", sid)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_projects_default_to_unclaimed_templates() {
    let app = TestApp::new().await;
    let sid = app.create_student("amira", json!({ "teacherName": "T1" })).await;

    let template = app.create_text_project("T1", "Template Brief", "1:50").await;
    file_project_for(&app, &sid, "Submitted Work", "T1").await;
    app.create_text_project("T2", "Other Teacher", "1:50").await;

    // 1. Default: non-active and unassigned only
    let res = app.get("/api/v1/projects/teacher/T1").await;
    assert_eq!(res.status(), StatusCode::OK);
    let list = parse_body(res).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], template["id"]);

    // 2. Including assigned work
    let res = app.get("/api/v1/projects/teacher/T1?unassigned=false").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await.as_array().unwrap().len(), 2);

    // 3. Nothing active yet
    let res = app.get("/api/v1/projects/teacher/T1?active=true").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    activate(&app, &template).await;

    let res = app.get("/api/v1/projects/teacher/T1?active=true").await;
    assert_eq!(res.status(), StatusCode::OK);
    let active = parse_body(res).await;
    assert_eq!(active.as_array().unwrap().len(), 1);
    assert_eq!(active[0]["active"], true);

    // 4. Unknown teacher
    let res = app.get("/api/v1/projects/teacher/Nobody").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_and_student_query_reports_no_match_as_client_error() {
    let app = TestApp::new().await;
    let sid = app.create_student("amira", json!({ "teacherName": "T1" })).await;

    let res = app.get(&format!("/api/v1/projects/active/T1/{}", sid)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert!(body.is_object(), "expected an error object, not a list");
    assert!(body["error"].as_str().unwrap().contains("No active projects found"));
}

#[tokio::test]
async fn test_teacher_and_student_query_enriches_with_username() {
    let app = TestApp::new().await;
    let sid = app.create_student("amira", json!({ "teacherName": "T1" })).await;

    let project = file_project_for(&app, &sid, "Bridge Design", "T1").await;
    // Inactive work of the same pair is not listed
    file_project_for(&app, &sid, "Draft", "T1").await;
    activate(&app, &project).await;

    let res = app.get(&format!("/api/v1/projects/active/T1/{}", sid)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let list = parse_body(res).await;
    let list = list.as_array().unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], project["id"]);
    assert_eq!(list[0]["title"], "Bridge Design");
    assert_eq!(list[0]["username"], "amira");
}

#[tokio::test]
async fn test_dangling_student_reference_is_tagged_unknown() {
    let app = TestApp::new().await;

    // Stored directly so the student reference points at no user
    let orphan = NewProject::new(
        Some("ghost-student".to_string()),
        "Orphaned Work".to_string(),
        "1:10".to_string(),
        "T1".to_string(),
        "QR-GHOST1".to_string(),
        None,
    );
    let stored = app.state.project_repo.create(&orphan).await.unwrap();
    assert!(stored.ticket >= 500);

    let res = app.send_json("PATCH", "/api/v1/projects/activate", json!({ "qrnumber": "QR-GHOST1" })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.get("/api/v1/projects/active/T1/ghost-student").await;
    assert_eq!(res.status(), StatusCode::OK);
    let list = parse_body(res).await;
    assert_eq!(list[0]["username"], "Unknown User");
    assert_eq!(list[0]["qrnumber"], "QR-GHOST1");
}
