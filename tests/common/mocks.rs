//! Mock external services
//!
//! A `wiremock` server standing in for the Google OAuth token endpoint and
//! the Calendar events API.

use serde_json::json;
use wiremock::{
    matchers::{body_string_contains, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use volunteer_portal::config::CalendarConfig;

pub const MOCK_ACCESS_TOKEN: &str = "ya29.mock-access-token";
pub const MOCK_EVENT_LINK: &str = "https://calendar.example.com/event?eid=abc123";
pub const MOCK_MEET_LINK: &str = "https://meet.example.com/abc-defg-hij";

/// Mock Google endpoints
pub struct MockCalendar {
    pub server: MockServer,
}

impl MockCalendar {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Calendar settings pointing at the mock server
    pub fn config(&self) -> CalendarConfig {
        CalendarConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            refresh_token: "refresh-token".to_string(),
            calendar_id: "primary".to_string(),
            time_zone: "Asia/Jerusalem".to_string(),
            api_base_url: self.server.uri(),
            token_url: format!("{}/token", self.server.uri()),
            timeout_secs: 5,
        }
    }

    /// Token endpoint granting an hour-long access token; expects `times` calls
    pub async fn mount_token(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": MOCK_ACCESS_TOKEN,
                "expires_in": 3599,
                "token_type": "Bearer",
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Event insertion returning an event with a Meet link
    pub async fn mount_event_created(&self) {
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(query_param("conferenceDataVersion", "1"))
            .and(query_param("sendUpdates", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc123",
                "htmlLink": MOCK_EVENT_LINK,
                "conferenceData": {
                    "entryPoints": [
                        {"entryPointType": "video", "uri": MOCK_MEET_LINK}
                    ]
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Event insertion failing with `status`
    pub async fn mount_event_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": status, "message": "Backend Error"}
            })))
            .mount(&self.server)
            .await;
    }
}
