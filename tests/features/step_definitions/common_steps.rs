//! Account setup and response assertions shared across features

use cucumber::{given, then};

use crate::features::support::TestWorld;

#[given(expr = "a commander {string}")]
async fn a_commander(world: &mut TestWorld, name: String) {
    let account = world.app().await.signup_commander().await;
    world.accounts.insert(name, account);
}

#[given(expr = "a volunteer {string}")]
async fn a_volunteer(world: &mut TestWorld, name: String) {
    let account = world.app().await.signup_volunteer().await;
    world.accounts.insert(name, account);
}

#[given(expr = "an HR officer {string}")]
async fn an_hr_officer(world: &mut TestWorld, name: String) {
    let account = world.app().await.signup_hr().await;
    world.accounts.insert(name, account);
}

#[then(expr = "the response status should be {int}")]
async fn response_status(world: &mut TestWorld, status: u16) {
    assert_eq!(world.response().status.as_u16(), status, "{}", world.response().text());
}

#[then(expr = "the response message should be {string}")]
async fn response_message(world: &mut TestWorld, message: String) {
    assert_eq!(world.response().message(), message);
}
