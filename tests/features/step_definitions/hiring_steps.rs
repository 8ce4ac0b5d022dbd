//! Job posting, application and hiring steps

use cucumber::{given, then, when};
use serde_json::{json, Value};

use crate::common::JobBuilder;
use crate::features::support::TestWorld;

#[given(expr = "{string} has posted the job {string} with {int} position(s)")]
async fn posted_job(world: &mut TestWorld, commander: String, title: String, positions: i64) {
    let commander = world.account(&commander);
    let job_id = world
        .app()
        .await
        .create_job(
            &commander,
            JobBuilder::new().with_name(&title).with_positions(positions),
        )
        .await;
    world.jobs.insert(title, job_id);
}

async fn submit_application(world: &mut TestWorld, volunteer: &str, title: &str) {
    let volunteer = world.account(volunteer);
    let job_id = world.job(title);
    let response = world.app().await.apply(&volunteer, job_id).await;
    world.last_response = Some(response);
}

#[when(expr = "{string} applies to {string}")]
async fn applies(world: &mut TestWorld, volunteer: String, title: String) {
    submit_application(world, &volunteer, &title).await;
}

#[given(expr = "{string} has applied to {string}")]
async fn has_applied(world: &mut TestWorld, volunteer: String, title: String) {
    submit_application(world, &volunteer, &title).await;
    world.response().assert_created();
}

#[when(expr = "{string} marks the application of {string} to {string} as {string}")]
async fn marks_application(
    world: &mut TestWorld,
    commander: String,
    volunteer: String,
    title: String,
    status: String,
) {
    let commander = world.account(&commander);
    let volunteer = world.account(&volunteer);
    let job_id = world.job(&title);
    let response = world
        .app()
        .await
        .set_status(&commander, job_id, volunteer.id, &status)
        .await;
    world.last_response = Some(response);
}

#[when(expr = "{string} assigns {string} to {string}")]
async fn assigns(world: &mut TestWorld, hr: String, volunteer: String, title: String) {
    let hr = world.account(&hr);
    let volunteer = world.account(&volunteer);
    let job_id = world.job(&title);
    let response = world
        .app()
        .await
        .post_json(
            "/api/hr/assignments",
            Some(&hr.token),
            json!({"volunteer_id": volunteer.id, "job_id": job_id}),
        )
        .await;
    world.last_response = Some(response);
}

#[then(expr = "{string} sees the job {string} as {string} with {int} position(s)")]
async fn sees_job(world: &mut TestWorld, hr: String, title: String, status: String, positions: i64) {
    let hr = world.account(&hr);
    let job_id = world.job(&title).to_string();
    let jobs: Vec<Value> = world
        .app()
        .await
        .get("/api/hr/jobs", Some(&hr.token))
        .await
        .json();
    let job = jobs
        .iter()
        .find(|j| j["id"] == job_id.as_str())
        .unwrap_or_else(|| panic!("Job {} not listed", title));
    assert_eq!(job["status"], status.as_str());
    assert_eq!(job["positions"], positions);
}

#[then(expr = "{string} sees {string} as {string} for {string}")]
async fn sees_volunteer_status(
    world: &mut TestWorld,
    hr: String,
    volunteer: String,
    status: String,
    title: String,
) {
    let hr = world.account(&hr);
    let volunteer = world.account(&volunteer);
    let job_id = world.job(&title).to_string();
    let detail: Value = world
        .app()
        .await
        .get(&format!("/api/hr/volunteers/{}", volunteer.id), Some(&hr.token))
        .await
        .json();
    assert_eq!(detail["jobStatuses"][job_id.as_str()], status.as_str());
}
