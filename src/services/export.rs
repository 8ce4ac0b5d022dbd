//! CSV export of a job's applications

use crate::models::ApplicationExportRow;

const HEADER: [&str; 8] = [
    "Application ID",
    "Volunteer Name",
    "Status",
    "Application Date",
    "Phone",
    "Email",
    "Education",
    "Interview Status",
];

/// Quote a field when it contains a delimiter, quote or line break
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_record<S: AsRef<str>>(csv: &mut String, fields: &[S]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    csv.push_str(&line);
    csv.push_str("\r\n");
}

/// Render the applications export with CRLF line endings
pub fn applications_csv(rows: &[ApplicationExportRow]) -> String {
    let mut csv = String::new();
    push_record(&mut csv, &HEADER);

    for row in rows {
        push_record(
            &mut csv,
            &[
                row.application_id.to_string(),
                row.volunteer_name.clone(),
                row.status.as_str().to_string(),
                row.application_date.format("%Y-%m-%d").to_string(),
                row.phone.clone().unwrap_or_default(),
                row.email.clone(),
                row.education.clone().unwrap_or_default(),
                row.interview_status
                    .clone()
                    .unwrap_or_else(|| "No interview".to_string()),
            ],
        );
    }

    csv
}

/// Attachment file name for a job's export
pub fn export_filename(job_id: i64) -> String {
    format!("applications_job_{}.csv", job_id)
}
