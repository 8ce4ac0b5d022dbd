//! HR staff: volunteer records, job overview and hiring

use serde_json::{json, Value};

use crate::common::{hr_payload, unique_national_id, JobBuilder, TestApp, VolunteerBuilder};

#[tokio::test]
async fn test_hr_bootstrap_and_login() {
    let app = TestApp::new().await;
    let (email, payload) = hr_payload();

    let response = app.post_json("/api/hr/hr", None, payload.clone()).await;
    response.assert_created();
    assert_eq!(response.message(), "HR user created successfully");
    assert!(response.json::<Value>()["hr_id"].as_i64().is_some());

    let body = app.login(&email, crate::common::TEST_PASSWORD).await;
    assert_eq!(body["role"], "hr");

    app.post_json("/api/hr/hr", None, payload)
        .await
        .assert_conflict();
}

#[tokio::test]
async fn test_hr_bootstrap_rejects_bad_email() {
    let app = TestApp::new().await;
    let (_, mut payload) = hr_payload();
    payload["email"] = json!("not-an-email");

    app.post_json("/api/hr/hr", None, payload)
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_create_volunteer_with_national_id_password() {
    let app = TestApp::new().await;
    let hr = app.signup_hr().await;
    let national_id = unique_national_id();

    let response = app
        .post_json(
            "/api/hr/volunteers",
            Some(&hr.token),
            json!({
                "email": "recruit@example.com",
                "full_name": "Dana Levi",
                "national_id": national_id,
                "phone": "052-7654321"
            }),
        )
        .await;
    response.assert_created();
    assert_eq!(response.message(), "Volunteer created successfully");
    let created: Value = response.json();
    let volunteer_id = created["volunteer_id"].as_i64().unwrap();

    let body = app.login("recruit@example.com", &national_id).await;
    assert_eq!(body["role"], "volunteer");
    assert_eq!(body["user"]["id"], volunteer_id);
    let avatar = body["user"]["imageUrl"].as_str().unwrap();
    assert!(avatar.ends_with(".jpg"));

    let response = app
        .post_json(
            "/api/hr/volunteers",
            Some(&hr.token),
            json!({
                "email": "another@example.com",
                "full_name": "Dana Levi",
                "national_id": national_id
            }),
        )
        .await;
    response.assert_conflict();
    assert_eq!(response.message(), "National ID already registered");
}

#[tokio::test]
async fn test_list_and_get_volunteers() {
    let app = TestApp::new().await;
    let hr = app.signup_hr().await;
    let volunteer = app.signup_volunteer().await;

    let volunteers: Vec<Value> = app
        .get("/api/hr/volunteers", Some(&hr.token))
        .await
        .json();
    assert!(volunteers.iter().any(|v| v["id"] == volunteer.id));

    let response = app
        .get(&format!("/api/hr/volunteers/{}", volunteer.id), Some(&hr.token))
        .await;
    response.assert_ok();
    let detail: Value = response.json();
    assert_eq!(detail["email"], volunteer.email.as_str());
    assert!(detail["jobStatuses"].as_object().unwrap().is_empty());

    app.get("/api/hr/volunteers/9999", Some(&hr.token))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_update_volunteer_ignores_unknown_fields() {
    let app = TestApp::new().await;
    let hr = app.signup_hr().await;
    let volunteer = app.signup_volunteer().await;
    let uri = format!("/api/hr/volunteers/{}", volunteer.id);

    let response = app
        .put_json(
            &uri,
            Some(&hr.token),
            json!({
                "address": "Base 7",
                "date_of_birth": "1999-04-02",
                "clearance": "top secret"
            }),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.message(), "Volunteer updated successfully");
    assert_eq!(response.json::<Value>()["volunteer_id"], volunteer.id);

    let detail: Value = app.get(&uri, Some(&hr.token)).await.json();
    assert_eq!(detail["address"], "Base 7");
    assert!(detail["age"].as_i64().is_some());

    app.put_json(
        "/api/hr/volunteers/9999",
        Some(&hr.token),
        json!({"address": "Nowhere"}),
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_update_volunteer_to_taken_national_id() {
    let app = TestApp::new().await;
    let hr = app.signup_hr().await;
    let taken = VolunteerBuilder::new();
    let national_id = taken.national_id.clone();
    app.signup_volunteer_with(taken).await;
    let volunteer = app.signup_volunteer().await;
    let uri = format!("/api/hr/volunteers/{}", volunteer.id);

    let response = app
        .put_json(&uri, Some(&hr.token), json!({"national_id": national_id}))
        .await;
    response.assert_conflict();
    assert_eq!(response.message(), "National ID already registered");

    let fresh = unique_national_id();
    app.put_json(&uri, Some(&hr.token), json!({"national_id": fresh}))
        .await
        .assert_ok();
    let detail: Value = app.get(&uri, Some(&hr.token)).await.json();
    assert_eq!(detail["idNumber"], fresh.as_str());
}

#[tokio::test]
async fn test_jobs_and_applications_overview() {
    let app = TestApp::new().await;
    let hr = app.signup_hr().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app
        .create_job(&commander, JobBuilder::new().with_name("Cook"))
        .await;
    app.apply(&volunteer, job_id).await.assert_created();

    let jobs: Vec<Value> = app.get("/api/hr/jobs", Some(&hr.token)).await.json();
    let job = jobs
        .iter()
        .find(|j| j["id"] == job_id.to_string())
        .unwrap();
    assert_eq!(job["jobName"], "Cook");
    assert_eq!(job["applications_count"], 1);
    assert!(job.get("commonQuestions").is_some());

    let by_volunteer: Vec<Value> = app
        .get(
            &format!("/api/hr/volunteers/{}/applications", volunteer.id),
            Some(&hr.token),
        )
        .await
        .json();
    assert_eq!(by_volunteer.len(), 1);
    assert_eq!(by_volunteer[0]["job_title"], "Cook");
    assert_eq!(by_volunteer[0]["status"], "pending");

    let by_job: Vec<Value> = app
        .get(
            &format!("/api/hr/jobs/{}/applications", job_id),
            Some(&hr.token),
        )
        .await
        .json();
    assert_eq!(by_job.len(), 1);
    assert_eq!(by_job[0]["id"], by_volunteer[0]["id"]);
}

#[tokio::test]
async fn test_assignment_requires_final_preference() {
    let app = TestApp::new().await;
    let hr = app.signup_hr().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;
    app.apply(&volunteer, job_id).await.assert_created();

    let assignment = json!({"volunteer_id": volunteer.id, "job_id": job_id});
    let response = app
        .post_json("/api/hr/assignments", Some(&hr.token), assignment.clone())
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.message(),
        "Application must be accepted by commander first"
    );

    app.post_json(
        "/api/hr/assignments",
        Some(&hr.token),
        json!({"volunteer_id": volunteer.id, "job_id": 9999}),
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_assignment_fills_positions_and_closes_job() {
    let app = TestApp::new().await;
    let hr = app.signup_hr().await;
    let commander = app.signup_commander().await;
    let first = app.signup_volunteer().await;
    let second = app.signup_volunteer().await;
    let job_id = app
        .create_job(&commander, JobBuilder::new().with_positions(1))
        .await;

    for volunteer in [&first, &second] {
        app.apply(volunteer, job_id).await.assert_created();
        app.set_status(&commander, job_id, volunteer.id, "preferred_final")
            .await
            .assert_ok();
    }

    let response = app
        .post_json(
            "/api/hr/assignments",
            Some(&hr.token),
            json!({"volunteer_id": first.id, "job_id": job_id}),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.message(), "Volunteer assigned successfully");
    assert!(response.json::<Value>()["application_id"].as_i64().is_some());

    let jobs: Vec<Value> = app.get("/api/hr/jobs", Some(&hr.token)).await.json();
    let job = jobs
        .iter()
        .find(|j| j["id"] == job_id.to_string())
        .unwrap();
    assert_eq!(job["positions"], 0);
    assert_eq!(job["status"], "CLOSED");

    let detail: Value = app
        .get(&format!("/api/hr/volunteers/{}", first.id), Some(&hr.token))
        .await
        .json();
    assert_eq!(detail["jobStatuses"][job_id.to_string()], "hired");

    let response = app
        .post_json(
            "/api/hr/assignments",
            Some(&hr.token),
            json!({"volunteer_id": second.id, "job_id": job_id}),
        )
        .await;
    response.assert_bad_request();
    assert_eq!(response.message(), "No vacant positions available");
}

#[tokio::test]
async fn test_hr_routes_require_hr_role() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;

    app.get("/api/hr/jobs", Some(&commander.token))
        .await
        .assert_forbidden();
    app.post_json(
        "/api/hr/assignments",
        Some(&commander.token),
        json!({"volunteer_id": 1, "job_id": 1}),
    )
    .await
    .assert_forbidden();
}
