//! Commander job postings, selection pipeline, interviews and exports

use serde_json::{json, Value};

use crate::common::{JobBuilder, TestAccount, TestApp, VolunteerBuilder};

/// Commander with one job and one volunteer who applied to it
async fn pipeline() -> (TestApp, TestAccount, TestAccount, i64) {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;
    app.apply(&volunteer, job_id).await.assert_created();
    (app, commander, volunteer, job_id)
}

fn interviews_uri(job_id: i64, volunteer_id: i64) -> String {
    format!(
        "/api/commander/jobs/{}/volunteers/{}/interviews",
        job_id, volunteer_id
    )
}

#[tokio::test]
async fn test_create_and_list_jobs() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let other = app.signup_commander().await;

    let response = app
        .post_json(
            "/api/commander/jobs",
            Some(&commander.token),
            JobBuilder::new()
                .with_name("Radio operator")
                .with_positions(3)
                .with_question("Morse code?")
                .payload(),
        )
        .await;
    response.assert_created();
    assert_eq!(response.message(), "Job created successfully");
    let job_id = response.json::<Value>()["job_id"].as_i64().unwrap();

    let jobs: Vec<Value> = app
        .get("/api/commander/jobs", Some(&commander.token))
        .await
        .json();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], job_id.to_string());
    assert_eq!(jobs[0]["jobName"], "Radio operator");
    assert_eq!(jobs[0]["positions"], 3);
    assert_eq!(jobs[0]["openBase"], true);
    assert_eq!(jobs[0]["questions"][0]["question_text"], "Morse code?");

    let other_jobs: Vec<Value> = app
        .get("/api/commander/jobs", Some(&other.token))
        .await
        .json();
    assert!(other_jobs.is_empty());
}

#[tokio::test]
async fn test_create_job_validation() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;

    app.post_json(
        "/api/commander/jobs",
        Some(&commander.token),
        JobBuilder::new().with_name("").payload(),
    )
    .await
    .assert_bad_request();

    app.post_json(
        "/api/commander/jobs",
        Some(&commander.token),
        JobBuilder::new().with_positions(-1).payload(),
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn test_patch_job_syncs_questions() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let job_id = app
        .create_job(
            &commander,
            JobBuilder::new()
                .with_question("Keep me")
                .with_question("Drop me"),
        )
        .await;

    let jobs: Vec<Value> = app
        .get("/api/commander/jobs", Some(&commander.token))
        .await
        .json();
    let questions = jobs[0]["questions"].as_array().unwrap();
    let keep = questions
        .iter()
        .find(|q| q["question_text"] == "Keep me")
        .unwrap();

    let response = app
        .patch_json(
            &format!("/api/commander/jobs/{}", job_id),
            Some(&commander.token),
            json!({
                "name": "Renamed",
                "positions": 5,
                "questions": [
                    {"id": keep["id"], "question_text": "Kept and edited"},
                    {"question_text": "Brand new"}
                ]
            }),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.message(), "Job updated successfully");

    let job = &response.json::<Value>()["job"];
    assert_eq!(job["jobName"], "Renamed");
    assert_eq!(job["positions"], 5);
    let mut texts: Vec<&str> = job["questions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|q| q["question_text"].as_str())
        .collect();
    texts.sort_unstable();
    assert_eq!(texts, vec!["Brand new", "Kept and edited"]);
}

#[tokio::test]
async fn test_patch_job_rejects_bad_status() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;

    let response = app
        .patch_json(
            &format!("/api/commander/jobs/{}", job_id),
            Some(&commander.token),
            json!({"status": "archived"}),
        )
        .await;
    response.assert_bad_request();
    assert_eq!(response.message(), "Invalid status value: archived");
}

#[tokio::test]
async fn test_foreign_job_access() {
    let (app, _commander, volunteer, job_id) = pipeline().await;
    let intruder = app.signup_commander().await;

    app.patch_json(
        &format!("/api/commander/jobs/{}", job_id),
        Some(&intruder.token),
        json!({"name": "Hijacked"}),
    )
    .await
    .assert_forbidden();

    app.get(
        &format!("/api/commander/jobs/{}/applications", job_id),
        Some(&intruder.token),
    )
    .await
    .assert_not_found();

    app.set_status(&intruder, job_id, volunteer.id, "preferred")
        .await
        .assert_forbidden();

    app.patch_json(
        "/api/commander/jobs/9999",
        Some(&intruder.token),
        json!({"name": "Ghost"}),
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_applicants_and_status_changes() {
    let (app, commander, volunteer, job_id) = pipeline().await;

    let applicants: Vec<Value> = app
        .get(
            &format!("/api/commander/jobs/{}/applications", job_id),
            Some(&commander.token),
        )
        .await
        .json();
    assert_eq!(applicants.len(), 1);
    assert_eq!(applicants[0]["candidateUserId"], volunteer.id);
    assert_eq!(applicants[0]["status"], "pending");

    let response = app
        .set_status(&commander, job_id, volunteer.id, "Preferred")
        .await;
    response.assert_ok();
    assert_eq!(
        response.message(),
        "Job application status updated successfully"
    );
    let application = &response.json::<Value>()["application"];
    assert_eq!(application["status"], "PREFERRED");
    let application_id: i64 = application["id"].as_str().unwrap().parse().unwrap();

    let response = app
        .put_json(
            &format!("/api/commander/applications/{}/status", application_id),
            Some(&commander.token),
            json!({"status": "rejected"}),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.message(), "Status updated successfully");

    let applicants: Vec<Value> = app
        .get(
            &format!("/api/commander/jobs/{}/applications", job_id),
            Some(&commander.token),
        )
        .await
        .json();
    assert_eq!(applicants[0]["status"], "rejected");
}

#[tokio::test]
async fn test_status_change_validation() {
    let (app, commander, volunteer, job_id) = pipeline().await;

    let response = app
        .patch_json(
            &format!("/api/commander/jobs/{}/volunteers/{}", job_id, volunteer.id),
            Some(&commander.token),
            json!({}),
        )
        .await;
    response.assert_bad_request();
    assert_eq!(response.message(), "Missing 'status' field in request data.");

    let response = app
        .set_status(&commander, job_id, volunteer.id, "interview_scheduled")
        .await;
    response.assert_bad_request();
    assert_eq!(response.message(), "Invalid status value: interview_scheduled");

    let stranger = app.signup_volunteer().await;
    let response = app
        .set_status(&commander, job_id, stranger.id, "preferred")
        .await;
    response.assert_not_found();
    assert_eq!(response.message(), "Job application not found");
}

#[tokio::test]
async fn test_interview_lifecycle() {
    let (app, commander, volunteer, job_id) = pipeline().await;
    let uri = interviews_uri(job_id, volunteer.id);

    app.get(&uri, Some(&commander.token))
        .await
        .assert_not_found();

    let response = app
        .post_json(
            &uri,
            Some(&commander.token),
            json!({
                "interviewNotes": "Bring ID",
                "interviewDate": "2026-11-20T09:30:00+02:00",
                "automaticMessage": "See you at the gate"
            }),
        )
        .await;
    response.assert_created();
    assert_eq!(response.message(), "Interview created successfully");
    let interview = &response.json::<Value>()["interview"];
    assert_eq!(interview["candidateId"], volunteer.id.to_string());
    assert_eq!(interview["interviewDate"], "2026-11-20T07:30:00");
    assert_eq!(interview["status"], "scheduled");

    app.post_json(&uri, Some(&commander.token), json!({}))
        .await
        .assert_conflict();

    let fetched: Value = app.get(&uri, Some(&commander.token)).await.json();
    assert_eq!(fetched["interviewNotes"], "Bring ID");
    assert!(fetched["applicationId"].as_i64().is_some());

    let response = app
        .patch_json(
            &uri,
            Some(&commander.token),
            json!({"interviewDate": null, "status": "cancelled"}),
        )
        .await;
    response.assert_ok();
    let patched: Value = response.json();
    assert!(patched["interviewDate"].is_null());
    assert_eq!(patched["status"], "cancelled");
    assert_eq!(patched["automaticMessage"], "See you at the gate");

    let response = app.delete(&uri, Some(&commander.token)).await;
    response.assert_ok();
    assert_eq!(response.message(), "Interview deleted successfully");
    app.get(&uri, Some(&commander.token))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_interview_rejects_bad_date() {
    let (app, commander, volunteer, job_id) = pipeline().await;

    app.post_json(
        &interviews_uri(job_id, volunteer.id),
        Some(&commander.token),
        json!({"interviewDate": "tomorrow at noon"}),
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn test_schedule_interview_and_record_results() {
    let (app, commander, volunteer, job_id) = pipeline().await;
    let response = app
        .set_status(&commander, job_id, volunteer.id, "preferred")
        .await;
    let application_id: i64 = response.json::<Value>()["application"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let response = app
        .post_json(
            &format!("/api/commander/applications/{}/interview", application_id),
            Some(&commander.token),
            json!({"scheduled_date": "2026-12-01T10:00:00Z", "schedule": "Room 4"}),
        )
        .await;
    response.assert_created();
    assert_eq!(response.message(), "Interview scheduled successfully");
    let interview_id = response.json::<Value>()["interview_id"].as_i64().unwrap();

    let response = app
        .put_json(
            &format!("/api/commander/interviews/{}/results", interview_id),
            Some(&commander.token),
            json!({
                "management_results": "Strong",
                "personal_results": "Calm under pressure",
                "summary": "Recommend"
            }),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.message(), "Interview results recorded successfully");

    let interview: Value = app
        .get(
            &interviews_uri(job_id, volunteer.id),
            Some(&commander.token),
        )
        .await
        .json();
    assert_eq!(interview["status"], "completed");
    assert_eq!(interview["interviewDate"], "2026-12-01T10:00:00");

    app.put_json(
        "/api/commander/interviews/9999/results",
        Some(&commander.token),
        json!({"summary": "n/a"}),
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_view_volunteer_requires_application() {
    let (app, commander, volunteer, job_id) = pipeline().await;
    let stranger = app.signup_volunteer().await;

    app.get(
        &format!("/api/commander/volunteers/{}", stranger.id),
        Some(&commander.token),
    )
    .await
    .assert_not_found();

    let response = app
        .get(
            &format!("/api/commander/volunteers/{}", volunteer.id),
            Some(&commander.token),
        )
        .await;
    response.assert_ok();
    let detail: Value = response.json();
    assert_eq!(detail["id"], volunteer.id);
    assert_eq!(detail["jobStatuses"][job_id.to_string()], "pending");
}

#[tokio::test]
async fn test_resume_download() {
    let (app, commander, volunteer, job_id) = pipeline().await;
    let download = format!(
        "/api/commander/jobs/{}/volunteers/{}/resume",
        job_id, volunteer.id
    );

    let response = app.get(&download, Some(&commander.token)).await;
    response.assert_not_found();
    assert_eq!(response.message(), "Resume not found for this application");

    app.post_file(
        &format!("/api/volunteer/jobs/{}/resume", job_id),
        &volunteer.token,
        "resume",
        "my cv.pdf",
        b"%PDF-1.4 resume body",
    )
    .await
    .assert_created();

    let response = app.get(&download, Some(&commander.token)).await;
    response.assert_ok();
    assert_eq!(response.header("content-type"), Some("application/pdf"));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"my cv.pdf\"")
    );
    assert_eq!(response.body.as_ref(), b"%PDF-1.4 resume body");

    let intruder = app.signup_commander().await;
    app.get(&download, Some(&intruder.token))
        .await
        .assert_forbidden();
}

#[tokio::test]
async fn test_export_applications_csv() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;
    let export = format!("/api/commander/jobs/{}/applications/export", job_id);

    let response = app.get(&export, Some(&commander.token)).await;
    response.assert_not_found();
    assert_eq!(response.message(), "No applications found");

    let volunteer = app
        .signup_volunteer_with(
            VolunteerBuilder::new()
                .with_field("education", json!("B.Sc, Computer Science")),
        )
        .await;
    app.apply(&volunteer, job_id).await.assert_created();

    let response = app.get(&export, Some(&commander.token)).await;
    response.assert_ok();
    assert_eq!(
        response.header("content-type"),
        Some("text/csv; charset=utf-8")
    );
    assert_eq!(
        response.header("content-disposition"),
        Some(format!("attachment; filename=\"applications_job_{}.csv\"", job_id).as_str())
    );

    let csv = response.text();
    let mut lines = csv.split("\r\n");
    assert_eq!(
        lines.next(),
        Some("Application ID,Volunteer Name,Status,Application Date,Phone,Email,Education,Interview Status")
    );
    let row = lines.next().unwrap();
    assert!(row.contains(&volunteer.email));
    assert!(row.contains("\"B.Sc, Computer Science\""));
    assert!(row.ends_with("No interview"));
}
