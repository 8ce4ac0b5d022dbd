//! Volunteer profile model

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ApplicationStatus;
use crate::utils::dates::age_today;

/// Gender as stored (`Male`/`Female`); the upper-case name is used by some views
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Stored value, e.g. `Male`
    pub fn value(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    /// Enumeration name, e.g. `MALE`
    pub fn name(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

/// Volunteer profile row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub national_id: String,
    pub join_date: DateTime<Utc>,
    pub address: Option<String>,
    pub primary_profession: Option<String>,
    pub education: Option<String>,
    pub area_of_interest: Option<String>,
    pub contact_reference: Option<String>,
    pub profile: Option<i64>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub experience: Option<String>,
    pub courses: Option<String>,
    pub languages: Option<String>,
    pub interests: Option<String>,
    pub personal_summary: Option<String>,
}

/// Volunteer joined with the contact fields of its account
#[derive(Debug, Clone)]
pub struct VolunteerProfile {
    pub volunteer: Volunteer,
    pub email: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

impl VolunteerProfile {
    pub fn age(&self) -> Option<i32> {
        self.volunteer.date_of_birth.map(age_today)
    }
}

/// Columns inserted for a new volunteer profile
#[derive(Debug, Clone)]
pub struct NewVolunteer {
    pub user_id: i64,
    pub full_name: String,
    pub national_id: String,
    pub join_date: DateTime<Utc>,
}

/// Free-text volunteer columns that can be edited by name
pub const VOLUNTEER_TEXT_FIELDS: &[&str] = &[
    "full_name",
    "national_id",
    "address",
    "primary_profession",
    "education",
    "area_of_interest",
    "contact_reference",
    "experience",
    "courses",
    "languages",
    "interests",
    "personal_summary",
];

/// Columns that may never be cleared
pub const VOLUNTEER_REQUIRED_FIELDS: &[&str] = &["full_name", "national_id"];

/// Partial update of a volunteer profile.
///
/// The outer `Option` says whether a column is touched, the inner one whether
/// it is cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolunteerChanges {
    pub text: Vec<(&'static str, Option<String>)>,
    pub profile: Option<Option<i64>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub gender: Option<Option<Gender>>,
}

impl VolunteerChanges {
    /// Record a text column change; returns false when `column` is not editable
    pub fn set_text(&mut self, column: &str, value: Option<String>) -> bool {
        match VOLUNTEER_TEXT_FIELDS.iter().find(|c| **c == column) {
            Some(column) => {
                self.text.retain(|(c, _)| c != column);
                self.text.push((column, value));
                true
            }
            None => false,
        }
    }

    /// New value recorded for a text column, if it is being changed
    pub fn text_value(&self, column: &str) -> Option<&str> {
        self.text
            .iter()
            .find(|(c, _)| *c == column)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.profile.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
    }
}

/// Volunteer as returned at login and on the profile page
#[derive(Debug, Clone, Serialize)]
pub struct VolunteerAccountView {
    pub email: String,
    pub phone: Option<String>,
    pub id: i64,
    pub full_name: String,
    pub national_id: String,
    pub address: Option<String>,
    pub primary_profession: Option<String>,
    pub education: Option<String>,
    pub area_of_interest: Option<String>,
    pub profile: Option<i64>,
    pub date_of_birth: Option<String>,
    pub age: Option<i32>,
    /// Enumeration name (`MALE`/`FEMALE`)
    pub gender: Option<&'static str>,
    pub experience: Option<String>,
    pub courses: Option<String>,
    pub languages: Option<String>,
    pub interests: Option<String>,
    pub personal_summary: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl VolunteerAccountView {
    /// Build the view, formatting the birth date with `date_format`
    pub fn new(profile: &VolunteerProfile, date_format: &str) -> Self {
        let v = &profile.volunteer;
        Self {
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            id: v.id,
            full_name: v.full_name.clone(),
            national_id: v.national_id.clone(),
            address: v.address.clone(),
            primary_profession: v.primary_profession.clone(),
            education: v.education.clone(),
            area_of_interest: v.area_of_interest.clone(),
            profile: v.profile,
            date_of_birth: v.date_of_birth.map(|d| d.format(date_format).to_string()),
            age: profile.age(),
            gender: v.gender.map(|g| g.name()),
            experience: v.experience.clone(),
            courses: v.courses.clone(),
            languages: v.languages.clone(),
            interests: v.interests.clone(),
            personal_summary: v.personal_summary.clone(),
            image_url: profile.image_url.clone(),
        }
    }
}

/// Volunteer as returned after a self-service profile edit
#[derive(Debug, Clone, Serialize)]
pub struct VolunteerProfileView {
    pub id: i64,
    pub full_name: String,
    pub address: Option<String>,
    pub primary_profession: Option<String>,
    pub education: Option<String>,
    pub area_of_interest: Option<String>,
    pub contact_reference: Option<String>,
    pub profile: Option<i64>,
    pub date_of_birth: Option<String>,
    /// Stored value (`Male`/`Female`)
    pub gender: Option<&'static str>,
    pub experience: Option<String>,
    pub courses: Option<String>,
    pub languages: Option<String>,
    pub interests: Option<String>,
    pub personal_summary: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl From<&VolunteerProfile> for VolunteerProfileView {
    fn from(profile: &VolunteerProfile) -> Self {
        let v = &profile.volunteer;
        Self {
            id: v.id,
            full_name: v.full_name.clone(),
            address: v.address.clone(),
            primary_profession: v.primary_profession.clone(),
            education: v.education.clone(),
            area_of_interest: v.area_of_interest.clone(),
            contact_reference: v.contact_reference.clone(),
            profile: v.profile,
            date_of_birth: v.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            gender: v.gender.map(|g| g.value()),
            experience: v.experience.clone(),
            courses: v.courses.clone(),
            languages: v.languages.clone(),
            interests: v.interests.clone(),
            personal_summary: v.personal_summary.clone(),
            phone: profile.phone.clone(),
            email: profile.email.clone(),
            image_url: profile.image_url.clone(),
        }
    }
}

/// Volunteer card shown to HR and commanders, with per-job application status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerDetailView {
    pub id: i64,
    pub full_name: String,
    pub id_number: String,
    pub date_of_birth: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<&'static str>,
    pub profile: Option<i64>,
    pub phone: Option<String>,
    pub email: String,
    pub address: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub courses: Option<String>,
    pub languages: Option<String>,
    pub interests: Option<String>,
    pub personal_summary: Option<String>,
    /// Job id (as string) to application status
    pub job_statuses: BTreeMap<String, ApplicationStatus>,
    pub image_url: Option<String>,
}

impl VolunteerDetailView {
    pub fn new(profile: &VolunteerProfile, job_statuses: BTreeMap<String, ApplicationStatus>) -> Self {
        let v = &profile.volunteer;
        Self {
            id: v.id,
            full_name: v.full_name.clone(),
            id_number: v.national_id.clone(),
            date_of_birth: v.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            age: profile.age(),
            gender: v.gender.map(|g| g.value()),
            profile: v.profile,
            phone: profile.phone.clone(),
            email: profile.email.clone(),
            address: v.address.clone(),
            experience: v.experience.clone(),
            education: v.education.clone(),
            courses: v.courses.clone(),
            languages: v.languages.clone(),
            interests: v.interests.clone(),
            personal_summary: v.personal_summary.clone(),
            job_statuses,
            image_url: profile.image_url.clone(),
        }
    }
}
