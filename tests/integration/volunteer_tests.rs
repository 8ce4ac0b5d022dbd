//! Volunteer job board, applications, resumes and profile

use axum::http::StatusCode;
use serde_json::{json, Value};

use chrono::Utc;
use volunteer_portal::{
    db::VolunteerRepository, models::NewVolunteer, utils::error::AppError,
};

use crate::common::{JobBuilder, TestApp, VolunteerBuilder};

#[tokio::test]
async fn test_job_board_lists_open_jobs_with_questions() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app
        .create_job(
            &commander,
            JobBuilder::new()
                .with_name("Search and rescue")
                .with_question("Can you swim?"),
        )
        .await;

    let response = app.get("/api/volunteer/jobs", Some(&volunteer.token)).await;
    response.assert_ok();
    let jobs: Vec<Value> = response.json();
    let job = jobs
        .iter()
        .find(|j| j["id"] == job_id)
        .expect("job missing from board");
    assert_eq!(job["title"], "Search and rescue");
    assert_eq!(job["status"], "OPEN");
    assert_eq!(job["questions"][0]["question_text"], "Can you swim?");
}

#[tokio::test]
async fn test_closed_jobs_leave_the_board() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;

    app.patch_json(
        &format!("/api/commander/jobs/{}", job_id),
        Some(&commander.token),
        json!({"status": "closed"}),
    )
    .await
    .assert_ok();

    let jobs: Vec<Value> = app
        .get("/api/volunteer/jobs", Some(&volunteer.token))
        .await
        .json();
    assert!(jobs.iter().all(|j| j["id"] != job_id));

    let response = app.apply(&volunteer, job_id).await;
    response.assert_bad_request();
    assert_eq!(response.message(), "This job is not accepting applications");
}

#[tokio::test]
async fn test_apply_and_check_application() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;
    let check = format!("/api/volunteer/jobs/{}/check-application", job_id);

    let before: Value = app.get(&check, Some(&volunteer.token)).await.json();
    assert_eq!(before["alreadyApplied"], false);

    let response = app.apply(&volunteer, job_id).await;
    response.assert_created();
    assert_eq!(response.message(), "Application submitted successfully");

    let after: Value = app.get(&check, Some(&volunteer.token)).await.json();
    assert_eq!(after["alreadyApplied"], true);
}

#[tokio::test]
async fn test_apply_twice_is_rejected() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;

    app.apply(&volunteer, job_id).await.assert_created();
    let response = app.apply(&volunteer, job_id).await;
    response.assert_bad_request();
    assert_eq!(response.message(), "You have already applied for this job");
}

#[tokio::test]
async fn test_apply_to_missing_job() {
    let app = TestApp::new().await;
    let volunteer = app.signup_volunteer().await;
    app.apply(&volunteer, 9999).await.assert_not_found();
}

#[tokio::test]
async fn test_apply_with_answers_and_foreign_question() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app
        .create_job(&commander, JobBuilder::new().with_question("Driving license?"))
        .await;
    let jobs: Vec<Value> = app
        .get("/api/volunteer/jobs", Some(&volunteer.token))
        .await
        .json();
    let question_id = jobs
        .iter()
        .find(|j| j["id"] == job_id)
        .and_then(|j| j["questions"][0]["id"].as_i64())
        .unwrap();

    let uri = format!("/api/volunteer/jobs/{}/apply", job_id);
    let response = app
        .post_json(
            &uri,
            Some(&volunteer.token),
            json!({"answers": [{"question_id": question_id + 100, "text": "Yes"}]}),
        )
        .await;
    response.assert_bad_request();

    app.post_json(
        &uri,
        Some(&volunteer.token),
        json!({"answers": [{"question_id": question_id, "text": "Yes, class B"}]}),
    )
    .await
    .assert_created();
}

#[tokio::test]
async fn test_withdraw_application() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app
        .create_job(&commander, JobBuilder::new().with_question("Night shifts?"))
        .await;
    let uri = format!("/api/volunteer/jobs/{}/apply", job_id);

    app.delete(&uri, Some(&volunteer.token))
        .await
        .assert_not_found();

    let jobs: Vec<Value> = app
        .get("/api/volunteer/jobs", Some(&volunteer.token))
        .await
        .json();
    let question_id = jobs
        .iter()
        .find(|j| j["id"] == job_id)
        .and_then(|j| j["questions"][0]["id"].as_i64())
        .unwrap();
    app.post_json(
        &uri,
        Some(&volunteer.token),
        json!({"answers": [{"question_id": question_id, "text": "Yes"}]}),
    )
    .await
    .assert_created();
    app.post_file(
        &format!("/api/volunteer/jobs/{}/resume", job_id),
        &volunteer.token,
        "resume",
        "cv.pdf",
        b"%PDF-1.4 resume",
    )
    .await
    .assert_created();
    app.post_json(
        &format!(
            "/api/commander/jobs/{}/volunteers/{}/interviews",
            job_id, volunteer.id
        ),
        Some(&commander.token),
        json!({"interviewDate": "2026-11-20T09:30:00Z"}),
    )
    .await
    .assert_created();

    let stored_files = || {
        std::fs::read_dir(app.state.storage.root())
            .map(|entries| entries.count())
            .unwrap_or(0)
    };
    assert_eq!(stored_files(), 1);

    let response = app.delete(&uri, Some(&volunteer.token)).await;
    response.assert_ok();
    assert_eq!(response.message(), "Application deleted successfully");

    for table in ["application_answers", "resumes", "interviews", "job_applications"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&app.state.db)
            .await
            .unwrap();
        assert_eq!(count, 0, "{} not cleared on withdraw", table);
    }
    assert_eq!(stored_files(), 0);

    // A withdrawn application can be submitted again
    app.apply(&volunteer, job_id).await.assert_created();
}

#[tokio::test]
async fn test_commander_cannot_apply() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;

    app.apply(&commander, job_id).await.assert_forbidden();
}

#[tokio::test]
async fn test_resume_upload_flow() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;
    let uri = format!("/api/volunteer/jobs/{}/resume", job_id);

    let response = app
        .post_file(&uri, &volunteer.token, "resume", "cv.pdf", b"%PDF-1.4 resume")
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.message(),
        "You must apply for the job first before uploading a resume"
    );

    app.apply(&volunteer, job_id).await.assert_created();

    let response = app
        .post_file(&uri, &volunteer.token, "resume", "cv.pdf", b"%PDF-1.4 resume")
        .await;
    response.assert_created();
    let body: Value = response.json();
    assert!(body["resume_id"].as_i64().is_some());

    let response = app
        .post_file(&uri, &volunteer.token, "resume", "cv2.pdf", b"%PDF-1.4 again")
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.message(),
        "A resume has already been uploaded for this application"
    );
}

#[tokio::test]
async fn test_resume_upload_validation() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;
    let volunteer = app.signup_volunteer().await;
    let job_id = app.create_job(&commander, JobBuilder::new()).await;
    app.apply(&volunteer, job_id).await.assert_created();
    let uri = format!("/api/volunteer/jobs/{}/resume", job_id);

    let response = app
        .post_file(&uri, &volunteer.token, "attachment", "cv.pdf", b"data")
        .await;
    response.assert_bad_request();
    assert_eq!(response.message(), "No resume file uploaded");

    let response = app
        .post_file(&uri, &volunteer.token, "resume", "cv.exe", b"MZ")
        .await;
    response.assert_bad_request();
    assert!(response.message().starts_with("File type not allowed"));

    let oversized = vec![b'a'; app.state.config.storage.max_upload_bytes + 1];
    let response = app
        .post_file(&uri, &volunteer.token, "resume", "cv.txt", &oversized)
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_profile_details_and_update() {
    let app = TestApp::new().await;
    let volunteer = app.signup_volunteer().await;

    let response = app
        .get("/api/volunteer/get-profile-details", Some(&volunteer.token))
        .await;
    response.assert_ok();
    let profile: Value = response.json();
    assert_eq!(profile["id"], volunteer.id);
    assert_eq!(profile["email"], volunteer.email.as_str());

    let response = app
        .patch_json(
            &format!("/api/volunteer/{}", volunteer.id),
            Some(&volunteer.token),
            json!({
                "address": "12 Herzl St",
                "date_of_birth": "2000-Nov-11",
                "gender": "female",
                "phone": "050-1234567"
            }),
        )
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    assert_eq!(updated["address"], "12 Herzl St");
    assert_eq!(updated["date_of_birth"], "2000-11-11");
    assert_eq!(updated["phone"], "050-1234567");
}

#[tokio::test]
async fn test_profile_update_rejects_unknown_fields() {
    let app = TestApp::new().await;
    let volunteer = app.signup_volunteer().await;

    let response = app
        .patch_json(
            &format!("/api/volunteer/{}", volunteer.id),
            Some(&volunteer.token),
            json!({"rank": "General"}),
        )
        .await;
    response.assert_bad_request();
    assert_eq!(response.message(), "Invalid field to update: rank");
}

#[tokio::test]
async fn test_profile_update_of_someone_else() {
    let app = TestApp::new().await;
    let volunteer = app.signup_volunteer().await;
    let other = app.signup_volunteer().await;

    app.patch_json(
        &format!("/api/volunteer/{}", other.id),
        Some(&volunteer.token),
        json!({"address": "Elsewhere"}),
    )
    .await
    .assert_forbidden();
}

#[tokio::test]
async fn test_profile_update_to_taken_email() {
    let app = TestApp::new().await;
    let volunteer = app.signup_volunteer().await;
    let other = app
        .signup_volunteer_with(VolunteerBuilder::new())
        .await;

    app.patch_json(
        &format!("/api/volunteer/{}", volunteer.id),
        Some(&volunteer.token),
        json!({"email": other.email}),
    )
    .await
    .assert_conflict();
}

#[tokio::test]
async fn test_profile_update_to_taken_national_id() {
    let app = TestApp::new().await;
    let taken = VolunteerBuilder::new();
    let national_id = taken.national_id.clone();
    app.signup_volunteer_with(taken).await;
    let volunteer = app.signup_volunteer().await;
    let uri = format!("/api/volunteer/{}", volunteer.id);

    let response = app
        .patch_json(&uri, Some(&volunteer.token), json!({"national_id": national_id}))
        .await;
    response.assert_conflict();
    assert_eq!(response.message(), "National ID already registered");

    let own: Value = app
        .get("/api/volunteer/get-profile-details", Some(&volunteer.token))
        .await
        .json();
    app.patch_json(
        &uri,
        Some(&volunteer.token),
        json!({"national_id": own["national_id"], "address": "Same ID"}),
    )
    .await
    .assert_ok();
}

#[tokio::test]
async fn test_unique_violation_in_repository_maps_to_conflict() {
    let app = TestApp::new().await;
    let taken = VolunteerBuilder::new();
    let national_id = taken.national_id.clone();
    app.signup_volunteer_with(taken).await;
    let commander = app.signup_commander().await;

    let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(&commander.email)
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    let mut conn = app.state.db.acquire().await.unwrap();
    let err = VolunteerRepository::insert(
        &mut conn,
        &NewVolunteer {
            user_id,
            full_name: "Duplicate".to_string(),
            national_id,
            join_date: Utc::now(),
        },
    )
    .await
    .unwrap_err();

    let err = AppError::from(err);
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}
