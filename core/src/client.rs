//! Blocking client for the Drone CI REST API.
//!
//! # Design
//! `DroneClient` holds an immutable `ClientConfig` and a `Transport`; there
//! is no other state. Every named operation formats a server-relative path
//! (plus a query string or JSON body where the endpoint takes one) and
//! delegates to [`DroneClient::request`]. `build_request` and
//! `parse_response` are the pure halves of that round-trip.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::query::QueryOptions;
use crate::response::{ApiResponse, JSON_CONTENT_TYPE};
use crate::types::SignRequest;

/// Synchronous, stateless client for a Drone server.
#[derive(Debug, Clone)]
pub struct DroneClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl DroneClient<UreqTransport> {
    pub fn new(server: impl Into<String>, token: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(server, token))
    }

    /// Client configured from `DRONE_SERVER`, `DRONE_TOKEN` and `DRONE_CSRF`.
    pub fn from_env() -> Self {
        Self::from_config(ClientConfig::from_env())
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> DroneClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Generic request
    // -----------------------------------------------------------------------

    /// Send one request and interpret the response.
    ///
    /// `path` is resolved against the server address and may already carry
    /// a query string. Statuses of 300 and above come back as
    /// `ApiResponse::Failure`; only transport and local faults are `Err`.
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        let request = self.build_request(method, path, body)?;
        log::debug!("{} {}", request.method, request.url);
        let response = self.transport.execute(&request)?;
        log::trace!("{} {} -> {}", request.method, request.url, response.status);
        self.parse_response(response)
    }

    /// Resolve `path` and attach credentials and the JSON body.
    ///
    /// An empty body (`null`, `false`, `0`, `""`, `[]` or `{}`) is not sent.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<HttpRequest, ApiError> {
        let url = Url::parse(self.config.server())?.join(path)?;

        let mut headers = Vec::new();
        if let Some(token) = self.config.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if let Some(csrf) = self.config.csrf() {
            headers.push(("X-CSRF-TOKEN".to_string(), csrf.to_string()));
        }

        let body = match body.filter(|value| !is_empty_body(value)) {
            Some(value) => {
                headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
                Some(serde_json::to_string(value).map_err(ApiError::Serialization)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    pub fn parse_response(&self, response: HttpResponse) -> Result<ApiResponse, ApiError> {
        ApiResponse::from_http(response)
    }

    fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Get, path, None)
    }

    fn post(&self, path: &str, data: Option<&Value>) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Post, path, data)
    }

    fn patch(&self, path: &str, data: &Value) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Patch, path, Some(data))
    }

    fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Delete, path, None)
    }

    // -----------------------------------------------------------------------
    // Repositories
    // -----------------------------------------------------------------------

    /// Repositories visible to the authenticated user.
    pub fn get_repo_list(&self, opts: &QueryOptions) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/api/user/repos?{}", opts.encode()))
    }

    /// A single repository by `owner/repo`.
    pub fn get_repo(&self, owner: &str, repo: &str) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/api/repos/{owner}/{repo}"))
    }

    /// Enable builds for a repository.
    pub fn activate_repo(&self, owner: &str, repo: &str) -> Result<ApiResponse, ApiError> {
        self.post(&format!("/api/repos/{owner}/{repo}"), None)
    }

    /// Patch repository settings. `data` is serialized as the JSON body.
    pub fn update_repo<D: Serialize + ?Sized>(
        &self,
        owner: &str,
        repo: &str,
        data: &D,
    ) -> Result<ApiResponse, ApiError> {
        self.patch(&format!("/api/repos/{owner}/{repo}"), &to_body(data)?)
    }

    /// Disable a repository.
    pub fn delete_repo(&self, owner: &str, repo: &str) -> Result<ApiResponse, ApiError> {
        self.delete(&format!("/api/repos/{owner}/{repo}"))
    }

    /// Re-sync the user's repository list with the source control provider.
    pub fn synchronize(&self) -> Result<ApiResponse, ApiError> {
        self.post("/api/user/repos", None)
    }

    /// Sign a pipeline configuration file.
    pub fn sign(&self, owner: &str, repo: &str, data: &str) -> Result<ApiResponse, ApiError> {
        let body = to_body(&SignRequest {
            data: data.to_string(),
        })?;
        self.post(&format!("/api/repos/{owner}/{repo}/sign"), Some(&body))
    }

    // -----------------------------------------------------------------------
    // Builds
    // -----------------------------------------------------------------------

    /// Builds of one repository, newest first.
    pub fn get_build_list(
        &self,
        owner: &str,
        repo: &str,
        opts: &QueryOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/api/repos/{owner}/{repo}/builds?{}", opts.encode()))
    }

    /// A single build by its sequential `number`.
    pub fn get_build(&self, owner: &str, repo: &str, number: u64) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/api/repos/{owner}/{repo}/builds/{number}"))
    }

    /// Recent builds across all of the user's repositories.
    pub fn get_build_feed(&self, opts: &QueryOptions) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/api/user/feed?{}", opts.encode()))
    }

    /// Cancel the running build `number`.
    pub fn cancel_build(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<ApiResponse, ApiError> {
        self.delete(&format!("/api/repos/{owner}/{repo}/builds/{number}"))
    }

    /// Approve a blocked stage: `build` is the build number, `stage` the stage number within it.
    pub fn approve_build(
        &self,
        owner: &str,
        repo: &str,
        build: u64,
        stage: u64,
    ) -> Result<ApiResponse, ApiError> {
        self.post(
            &format!("/api/repos/{owner}/{repo}/builds/{build}/approve/{stage}"),
            None,
        )
    }

    /// Decline a blocked stage: `build` is the build number, `stage` the stage number within it.
    pub fn decline_build(
        &self,
        owner: &str,
        repo: &str,
        build: u64,
        stage: u64,
    ) -> Result<ApiResponse, ApiError> {
        self.post(
            &format!("/api/repos/{owner}/{repo}/builds/{build}/decline/{stage}"),
            None,
        )
    }

    /// Restart a build. Sent as a GET with the options in the query string.
    pub fn restart_build(
        &self,
        owner: &str,
        repo: &str,
        build: u64,
        opts: &QueryOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.get(&format!(
            "/api/repos/{owner}/{repo}/builds/{build}?{}",
            opts.encode()
        ))
    }

    /// Log output of one step, addressed as build number, then stage number, then step number.
    pub fn get_logs(
        &self,
        owner: &str,
        repo: &str,
        build: u64,
        stage: u64,
        step: u64,
    ) -> Result<ApiResponse, ApiError> {
        self.get(&format!(
            "/api/repos/{owner}/{repo}/builds/{build}/logs/{stage}/{step}"
        ))
    }

    // -----------------------------------------------------------------------
    // Secrets and registries
    // -----------------------------------------------------------------------

    /// Secrets of a repository.
    pub fn get_secret_list(&self, owner: &str, repo: &str) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/api/repos/{owner}/{repo}/secrets"))
    }

    /// Create a secret. `secret` is serialized as the JSON body, usually a [`crate::Secret`].
    pub fn create_secret<S: Serialize + ?Sized>(
        &self,
        owner: &str,
        repo: &str,
        secret: &S,
    ) -> Result<ApiResponse, ApiError> {
        let body = to_body(secret)?;
        self.post(&format!("/api/repos/{owner}/{repo}/secrets"), Some(&body))
    }

    /// Patch the secret called `name`.
    pub fn update_secret<S: Serialize + ?Sized>(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        secret: &S,
    ) -> Result<ApiResponse, ApiError> {
        self.patch(
            &format!("/api/repos/{owner}/{repo}/secrets/{name}"),
            &to_body(secret)?,
        )
    }

    /// Delete the secret called `name`.
    pub fn delete_secret(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<ApiResponse, ApiError> {
        self.delete(&format!("/api/repos/{owner}/{repo}/secrets/{name}"))
    }

    /// Registry credentials of a repository.
    pub fn get_registry_list(&self, owner: &str, repo: &str) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/api/repos/{owner}/{repo}/registry"))
    }

    /// Add registry credentials, usually a [`crate::Registry`].
    pub fn create_registry<R: Serialize + ?Sized>(
        &self,
        owner: &str,
        repo: &str,
        registry: &R,
    ) -> Result<ApiResponse, ApiError> {
        let body = to_body(registry)?;
        self.post(&format!("/api/repos/{owner}/{repo}/registry"), Some(&body))
    }

    /// Remove the credentials for registry `address`.
    pub fn delete_registry(
        &self,
        owner: &str,
        repo: &str,
        address: &str,
    ) -> Result<ApiResponse, ApiError> {
        self.delete(&format!("/api/repos/{owner}/{repo}/registry/{address}"))
    }

    // -----------------------------------------------------------------------
    // Account
    // -----------------------------------------------------------------------

    /// The currently authenticated user.
    pub fn get_self(&self) -> Result<ApiResponse, ApiError> {
        self.get("/api/user")
    }

    /// Issue the user's personal API token.
    pub fn get_token(&self) -> Result<ApiResponse, ApiError> {
        self.post("/api/user/token", None)
    }
}

fn to_body<D: Serialize + ?Sized>(data: &D) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(ApiError::Serialization)
}

fn is_empty_body(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
