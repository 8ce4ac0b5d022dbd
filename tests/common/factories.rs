//! Test factories for request payloads
//!
//! Names and texts are randomized with `fake`; emails and national ids get a
//! unique suffix so factories can be used repeatedly against one database.

use std::sync::atomic::{AtomicU64, Ordering};

use fake::{
    faker::{
        address::en::CityName,
        job::en::Title,
        lorem::en::Sentence,
        name::en::Name,
    },
    Fake,
};
use serde_json::{json, Value};
use uuid::Uuid;

/// Password used by every factory-made account
pub const TEST_PASSWORD: &str = "correct-horse-battery";

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_email(prefix: &str) -> String {
    format!("{}.{}@example.com", prefix, Uuid::new_v4().simple())
}

/// Nine-digit national id, unique within the test process
pub fn unique_national_id() -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let base: u64 = (100_000..999_999).fake();
    format!("{:06}{:03}", base, n % 1000)
}

/// Builder for volunteer registration payloads
#[derive(Debug, Clone)]
pub struct VolunteerBuilder {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub national_id: String,
    extra: serde_json::Map<String, Value>,
}

impl Default for VolunteerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VolunteerBuilder {
    pub fn new() -> Self {
        Self {
            email: unique_email("volunteer"),
            password: TEST_PASSWORD.to_string(),
            full_name: Name().fake(),
            national_id: unique_national_id(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn payload(&self) -> Value {
        let mut payload = json!({
            "email": self.email,
            "password": self.password,
            "role": "volunteer",
            "full_name": self.full_name,
            "national_id": self.national_id,
        });
        if let Value::Object(map) = &mut payload {
            map.extend(self.extra.clone());
        }
        payload
    }
}

/// Commander registration payload
pub fn commander_payload() -> (String, Value) {
    let email = unique_email("commander");
    let name: String = Name().fake();
    let payload = json!({
        "email": email,
        "password": TEST_PASSWORD,
        "role": "commander",
        "name": name,
        "rank": "Captain",
        "department": "Logistics",
    });
    (email, payload)
}

/// HR bootstrap payload
pub fn hr_payload() -> (String, Value) {
    let email = unique_email("hr");
    let name: String = Name().fake();
    let payload = json!({
        "email": email,
        "password": TEST_PASSWORD,
        "name": name,
        "department": "Personnel",
    });
    (email, payload)
}

/// Builder for job creation payloads
#[derive(Debug, Clone)]
pub struct JobBuilder {
    name: String,
    positions: i64,
    questions: Vec<String>,
}

impl Default for JobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JobBuilder {
    pub fn new() -> Self {
        Self {
            name: Title().fake(),
            positions: 2,
            questions: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_positions(mut self, positions: i64) -> Self {
        self.positions = positions;
        self
    }

    pub fn with_question(mut self, text: &str) -> Self {
        self.questions.push(text.to_string());
        self
    }

    pub fn payload(&self) -> Value {
        let description: String = Sentence(4..10).fake();
        let city: String = CityName().fake();
        json!({
            "name": self.name,
            "description": description,
            "positions": self.positions,
            "category": "Operations",
            "unit": "Unit 8200",
            "address": city,
            "openBase": true,
            "workExperience": "None required",
            "questions": self
                .questions
                .iter()
                .map(|q| json!({"question_text": q}))
                .collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_ids_are_nine_digits() {
        let id = unique_national_id();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_volunteer_payload_merges_extra_fields() {
        let payload = VolunteerBuilder::new()
            .with_field("gender", json!("female"))
            .payload();
        assert_eq!(payload["role"], "volunteer");
        assert_eq!(payload["gender"], "female");
    }
}
