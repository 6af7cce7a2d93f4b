//! Shared server state: the in-memory store plus a request journal.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;

use crate::models::{Build, LogLine, RegistryInput, Repo, SecretInput, Stage, User};

/// One request as seen by the server, captured before authorization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub csrf: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Default)]
pub struct Db {
    pub user: Option<User>,
    pub repos: BTreeMap<String, Repo>,
    pub builds: BTreeMap<String, Vec<Build>>,
    pub logs: BTreeMap<(String, u64, u64, u64), Vec<LogLine>>,
    pub secrets: BTreeMap<String, BTreeMap<String, SecretInput>>,
    pub registries: BTreeMap<String, BTreeMap<String, RegistryInput>>,
}

impl Db {
    /// One user, one active repository with two builds (the second blocked
    /// on approval) and one inactive repository.
    pub fn seeded() -> Self {
        let mut db = Db {
            user: Some(User {
                id: 1,
                login: "octocat".to_string(),
                email: "octocat@example.com".to_string(),
                admin: false,
            }),
            ..Db::default()
        };

        let mut hello = Repo::new(1, "octocat", "hello-world");
        hello.active = true;
        let spoon = Repo::new(2, "octocat", "spoon-knife");
        let slug = hello.slug.clone();

        db.builds.insert(
            slug.clone(),
            vec![
                Build {
                    number: 1,
                    status: "success".to_string(),
                    event: "push".to_string(),
                    stages: vec![stage(1, "default", "success")],
                },
                Build {
                    number: 2,
                    status: "blocked".to_string(),
                    event: "pull_request".to_string(),
                    stages: vec![stage(1, "default", "blocked")],
                },
            ],
        );
        db.logs.insert(
            (slug, 1, 1, 1),
            vec![
                LogLine {
                    pos: 0,
                    out: "+ cargo build\n".to_string(),
                },
                LogLine {
                    pos: 1,
                    out: "Finished release\n".to_string(),
                },
            ],
        );
        db.repos.insert(hello.slug.clone(), hello);
        db.repos.insert(spoon.slug.clone(), spoon);
        db
    }
}

fn stage(number: u64, name: &str, status: &str) -> Stage {
    Stage {
        number,
        name: name.to_string(),
        status: status.to_string(),
    }
}

/// Cloneable handle shared by every handler and by embedding tests.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Db>>,
    token: Option<String>,
    journal: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl AppState {
    /// Seeded state. With `Some(token)` every request must carry
    /// `Authorization: Bearer <token>`.
    pub fn new(token: Option<String>) -> Self {
        Self {
            db: Arc::new(RwLock::new(Db::seeded())),
            token,
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn record(&self, request: RecordedRequest) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }

    /// Snapshot of every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(None)
    }
}
