//! Test world for Cucumber scenarios

use std::collections::HashMap;
use std::fmt;

use cucumber::World;

use crate::common::{TestAccount, TestApp, TestResponse};

/// State carried across the steps of one scenario
#[derive(Default, World)]
pub struct TestWorld {
    /// Application under test, created on first use
    app: Option<TestApp>,

    /// Accounts by the name used in the scenario
    pub accounts: HashMap<String, TestAccount>,

    /// Job ids by title
    pub jobs: HashMap<String, i64>,

    /// Response from the last API call
    pub last_response: Option<TestResponse>,
}

impl fmt::Debug for TestWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestWorld")
            .field("accounts", &self.accounts.keys().collect::<Vec<_>>())
            .field("jobs", &self.jobs)
            .field("last_status", &self.last_response.as_ref().map(|r| r.status))
            .finish()
    }
}

impl TestWorld {
    pub async fn app(&mut self) -> &TestApp {
        if self.app.is_none() {
            self.app = Some(TestApp::new().await);
        }
        self.app.as_ref().expect("test app initialized")
    }

    pub fn account(&self, name: &str) -> TestAccount {
        self.accounts
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("No account named {}", name))
    }

    pub fn job(&self, title: &str) -> i64 {
        *self
            .jobs
            .get(title)
            .unwrap_or_else(|| panic!("No job titled {}", title))
    }

    pub fn response(&self) -> &TestResponse {
        self.last_response.as_ref().expect("No response available")
    }
}
