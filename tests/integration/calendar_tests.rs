//! Interview invitations through the calendar API

use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, ResponseTemplate,
};

use crate::common::{
    MockCalendar, TestApp, MOCK_ACCESS_TOKEN, MOCK_EVENT_LINK, MOCK_MEET_LINK,
};

const INVITATION_URI: &str = "/api/commander/send-interview-invitation";

fn invitation() -> Value {
    json!({
        "candidate_email": "candidate@example.com",
        "commander_email": "commander@example.com",
        "job_title": "Field medic",
        "interview_time": "2026-11-20T09:30:00+02:00",
        "commander_name": "Capt. Cohen",
        "candidate_name": "Noa",
    })
}

#[tokio::test]
async fn test_invitation_creates_event_with_meet_link() {
    let calendar = MockCalendar::start().await;
    calendar.mount_token(1).await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(header(
            "authorization",
            format!("Bearer {}", MOCK_ACCESS_TOKEN).as_str(),
        ))
        .and(body_partial_json(json!({
            "summary": "Interview for Field medic Position",
            "start": {"dateTime": "2026-11-20T09:30:00+02:00", "timeZone": "Asia/Jerusalem"},
            "end": {"dateTime": "2026-11-20T10:30:00+02:00"},
            "conferenceData": {"createRequest": {"conferenceSolutionKey": {"type": "hangoutsMeet"}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "htmlLink": MOCK_EVENT_LINK,
            "conferenceData": {"entryPoints": [{"uri": MOCK_MEET_LINK}]}
        })))
        .expect(1)
        .mount(&calendar.server)
        .await;

    let app = TestApp::with_calendar(calendar.config()).await;
    let commander = app.signup_commander().await;

    let response = app
        .post_json(INVITATION_URI, Some(&commander.token), invitation())
        .await;
    response.assert_created();
    let body: Value = response.json();
    assert_eq!(body["message"], "Interview scheduled successfully");
    assert_eq!(body["event_link"], MOCK_EVENT_LINK);
    assert_eq!(body["meeting_link"], MOCK_MEET_LINK);
    assert_eq!(body["scheduled_time"], "2026-11-20T09:30:00+02:00");
}

#[tokio::test]
async fn test_access_token_is_reused() {
    let calendar = MockCalendar::start().await;
    calendar.mount_token(1).await;
    calendar.mount_event_created().await;

    let app = TestApp::with_calendar(calendar.config()).await;
    let commander = app.signup_commander().await;

    for _ in 0..2 {
        app.post_json(INVITATION_URI, Some(&commander.token), invitation())
            .await
            .assert_created();
    }
}

#[tokio::test]
async fn test_invitation_without_meet_link() {
    let calendar = MockCalendar::start().await;
    calendar.mount_token(1).await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "htmlLink": MOCK_EVENT_LINK
        })))
        .mount(&calendar.server)
        .await;

    let app = TestApp::with_calendar(calendar.config()).await;
    let commander = app.signup_commander().await;
    let mut payload = invitation();
    payload["include_meet_link"] = json!(false);

    let response = app
        .post_json(INVITATION_URI, Some(&commander.token), payload)
        .await;
    response.assert_created();
    let body: Value = response.json();
    assert_eq!(body["event_link"], MOCK_EVENT_LINK);
    assert!(body["meeting_link"].is_null());
}

#[tokio::test]
async fn test_calendar_failure_is_bad_gateway() {
    let calendar = MockCalendar::start().await;
    calendar.mount_token(1).await;
    calendar.mount_event_failure(500).await;

    let app = TestApp::with_calendar(calendar.config()).await;
    let commander = app.signup_commander().await;

    let response = app
        .post_json(INVITATION_URI, Some(&commander.token), invitation())
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["error"], "calendar_error");
}

#[tokio::test]
async fn test_invitation_validation() {
    let calendar = MockCalendar::start().await;
    calendar.mount_token(0).await;

    let app = TestApp::with_calendar(calendar.config()).await;
    let commander = app.signup_commander().await;

    let mut missing = invitation();
    missing.as_object_mut().unwrap().remove("job_title");
    let response = app
        .post_json(INVITATION_URI, Some(&commander.token), missing)
        .await;
    response.assert_bad_request();
    assert_eq!(response.message(), "Missing required fields");

    let mut bad_time = invitation();
    bad_time["interview_time"] = json!("next week");
    let response = app
        .post_json(INVITATION_URI, Some(&commander.token), bad_time)
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.message(),
        "Invalid interview time format. Use ISO 8601 format"
    );
}

#[tokio::test]
async fn test_invitation_without_calendar_configured() {
    let app = TestApp::new().await;
    let commander = app.signup_commander().await;

    let response = app
        .post_json(INVITATION_URI, Some(&commander.token), invitation())
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_invitation_requires_commander() {
    let app = TestApp::new().await;
    let volunteer = app.signup_volunteer().await;

    app.post_json(INVITATION_URI, Some(&volunteer.token), invitation())
        .await
        .assert_forbidden();
}
