use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub email: String,
    pub admin: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repo {
    pub id: u64,
    pub namespace: String,
    pub name: String,
    pub slug: String,
    pub active: bool,
    pub config_path: String,
    pub protected: bool,
    pub trusted: bool,
    pub timeout: u64,
    pub visibility: String,
}

impl Repo {
    pub fn new(id: u64, namespace: &str, name: &str) -> Self {
        Self {
            id,
            namespace: namespace.to_string(),
            name: name.to_string(),
            slug: format!("{namespace}/{name}"),
            active: false,
            config_path: ".drone.yml".to_string(),
            protected: false,
            trusted: false,
            timeout: 60,
            visibility: "public".to_string(),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct RepoPatch {
    pub config_path: Option<String>,
    pub protected: Option<bool>,
    pub trusted: Option<bool>,
    pub timeout: Option<u64>,
    pub visibility: Option<String>,
}

impl RepoPatch {
    pub fn apply(self, repo: &mut Repo) {
        if let Some(config_path) = self.config_path {
            repo.config_path = config_path;
        }
        if let Some(protected) = self.protected {
            repo.protected = protected;
        }
        if let Some(trusted) = self.trusted {
            repo.trusted = trusted;
        }
        if let Some(timeout) = self.timeout {
            repo.timeout = timeout;
        }
        if let Some(visibility) = self.visibility {
            repo.visibility = visibility;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub number: u64,
    pub name: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Build {
    pub number: u64,
    pub status: String,
    pub event: String,
    pub stages: Vec<Stage>,
}

/// Feed entry: the repository slug joined with one of its builds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub slug: String,
    pub build: Build,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogLine {
    pub pos: u64,
    pub out: String,
}

/// Secret as stored. `data` is never returned to clients.
#[derive(Clone, Debug, Deserialize)]
pub struct SecretInput {
    pub name: String,
    pub data: String,
    #[serde(default)]
    pub pull_request: bool,
}

#[derive(Deserialize)]
pub struct SecretPatch {
    pub data: Option<String>,
    pub pull_request: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretView {
    pub name: String,
    pub pull_request: bool,
}

impl From<&SecretInput> for SecretView {
    fn from(secret: &SecretInput) -> Self {
        Self {
            name: secret.name.clone(),
            pull_request: secret.pull_request,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegistryInput {
    pub address: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryView {
    pub address: String,
    pub username: String,
}

impl From<&RegistryInput> for RegistryView {
    fn from(registry: &RegistryInput) -> Self {
        Self {
            address: registry.address.clone(),
            username: registry.username.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct SignInput {
    pub data: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signed {
    pub data: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}
