//! Request payloads for the write endpoints.
//!
//! Every body-carrying operation accepts any `Serialize` value; these types
//! are a convenience for callers who would rather not hand-build JSON. They
//! are not validated before sending.

use serde::{Deserialize, Serialize};

/// A repository secret as sent to the create and update endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub data: String,
    #[serde(default)]
    pub pull_request: bool,
    #[serde(default)]
    pub pull_request_push: bool,
}

/// Container registry credentials scoped to a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub address: String,
    pub username: String,
    pub password: String,
}

/// Partial repository settings. Only the fields present are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_forks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_pull_requests: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_pulls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_push: Option<bool>,
}

/// Body of the config signing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    pub data: String,
}
