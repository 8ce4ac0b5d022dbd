//! Google Calendar client
//!
//! Creates interview events on the organizer's calendar with both parties as
//! attendees. Access tokens come from the OAuth 2.0 refresh-token grant and are
//! cached until shortly before they expire.

use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::CalendarConfig;
use crate::utils::dates::parse_iso_datetime;
use crate::utils::error::{AppError, AppResult};

/// Interviews are booked for one hour
const INTERVIEW_LENGTH_MINUTES: i64 = 60;
/// Refresh the access token this long before Google expires it
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Start time of an interview, keeping the caller's UTC offset when given
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventTime {
    Zoned(DateTime<FixedOffset>),
    /// Wall-clock time in the calendar's configured time zone
    Local(NaiveDateTime),
}

impl EventTime {
    /// Parse an ISO 8601 timestamp; a trailing `Z` means UTC
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(EventTime::Zoned(dt));
        }
        if value.ends_with('Z') {
            return parse_iso_datetime(value)
                .map(|dt| EventTime::Zoned(dt.and_utc().fixed_offset()));
        }
        parse_iso_datetime(value).map(EventTime::Local)
    }

    pub fn plus_minutes(&self, minutes: i64) -> Self {
        let delta = chrono::Duration::minutes(minutes);
        match self {
            EventTime::Zoned(dt) => EventTime::Zoned(*dt + delta),
            EventTime::Local(dt) => EventTime::Local(*dt + delta),
        }
    }

    /// ISO 8601 form sent to the calendar and echoed to clients
    pub fn to_iso(&self) -> String {
        match self {
            EventTime::Zoned(dt) => dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            EventTime::Local(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

/// Everything needed to book an interview
#[derive(Debug, Clone)]
pub struct InterviewInvitation {
    pub candidate_email: String,
    pub commander_email: String,
    pub job_title: String,
    pub start: EventTime,
    pub commander_name: Option<String>,
    pub candidate_name: Option<String>,
    pub additional_info: Option<String>,
    pub include_meet_link: bool,
}

/// Links of a created event
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub event_link: Option<String>,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct EventResponse {
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
    #[serde(rename = "conferenceData")]
    conference_data: Option<ConferenceData>,
}

#[derive(Debug, Deserialize)]
struct ConferenceData {
    #[serde(rename = "entryPoints", default)]
    entry_points: Vec<EntryPoint>,
}

#[derive(Debug, Deserialize)]
struct EntryPoint {
    uri: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Google Calendar v3 API client
pub struct CalendarClient {
    client: Client,
    config: CalendarConfig,
    token: RwLock<Option<CachedToken>>,
}

impl CalendarClient {
    pub fn new(config: &CalendarConfig) -> anyhow::Result<Self> {
        info!(
            "Initializing calendar client for calendar '{}'",
            config.calendar_id
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build calendar HTTP client: {}", e))?;

        Ok(Self {
            client,
            config: config.clone(),
            token: RwLock::new(None),
        })
    }

    /// Create the interview event and notify all attendees
    pub async fn create_interview_event(
        &self,
        invitation: &InterviewInvitation,
    ) -> AppResult<ScheduledEvent> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/calendars/{}/events?conferenceDataVersion=1&sendUpdates=all",
            self.config.api_base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.calendar_id)
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&self.build_event(invitation))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Calendar rejected interview event");
            if status == reqwest::StatusCode::UNAUTHORIZED {
                *self.token.write().await = None;
            }
            return Err(AppError::Calendar(format!(
                "Event creation failed with status {}: {}",
                status, body
            )));
        }

        let event: EventResponse = response.json().await?;
        let meeting_link = event
            .conference_data
            .and_then(|data| data.entry_points.into_iter().find_map(|entry| entry.uri));

        info!(job_title = %invitation.job_title, "Interview event created");

        Ok(ScheduledEvent {
            event_link: event.html_link,
            meeting_link,
        })
    }

    /// Event resource for an interview
    pub fn build_event(&self, invitation: &InterviewInvitation) -> Value {
        let end = invitation.start.plus_minutes(INTERVIEW_LENGTH_MINUTES);
        let description = format!(
            "Interview for the position of {}\n\nCommander: {}\nCandidate: {}\n\nAdditional Information:\n{}",
            invitation.job_title,
            invitation
                .commander_name
                .as_deref()
                .unwrap_or("Interview Commander"),
            invitation.candidate_name.as_deref().unwrap_or("Candidate"),
            invitation.additional_info.as_deref().unwrap_or(""),
        );

        let mut event = json!({
            "summary": format!("Interview for {} Position", invitation.job_title),
            "location": "Online",
            "description": description,
            "start": {
                "dateTime": invitation.start.to_iso(),
                "timeZone": self.config.time_zone,
            },
            "end": {
                "dateTime": end.to_iso(),
                "timeZone": self.config.time_zone,
            },
            "attendees": [
                {
                    "email": invitation.commander_email,
                    "responseStatus": "accepted",
                    "optional": false,
                },
                {
                    "email": invitation.candidate_email,
                    "responseStatus": "needsAction",
                    "optional": false,
                },
            ],
            "reminders": {
                "useDefault": false,
                "overrides": [
                    {"method": "email", "minutes": 24 * 60},
                    {"method": "popup", "minutes": 30},
                ],
            },
            "guestsCanModify": false,
            "guestsCanInviteOthers": false,
        });

        if invitation.include_meet_link {
            event["conferenceData"] = json!({
                "createRequest": {
                    "requestId": format!("interview-{}", Utc::now().timestamp_millis()),
                    "conferenceSolutionKey": {"type": "hangoutsMeet"},
                }
            });
        }

        event
    }

    /// Cached access token, refreshed when missing or about to expire
    async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Instant::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.token.write().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Refreshing calendar access token");
        let body = format!(
            "grant_type=refresh_token&client_id={}&client_secret={}&refresh_token={}",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.client_secret),
            urlencoding::encode(&self.config.refresh_token),
        );

        let response = self
            .client
            .post(&self.config.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Calendar token refresh failed");
            return Err(AppError::Calendar(format!(
                "Token refresh failed with status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }
}
