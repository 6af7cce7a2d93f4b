use std::collections::BTreeMap;

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::{
    Build, FeedEntry, LogLine, Message, RegistryInput, RegistryView, Repo, RepoPatch, SecretInput,
    SecretPatch, SecretView, SignInput, Signed, Token, User,
};
use crate::state::{AppState, RecordedRequest};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Message>)>;

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Message>) {
    (
        status,
        Json(Message {
            message: message.to_string(),
        }),
    )
}

fn not_found() -> (StatusCode, Json<Message>) {
    error(StatusCode::NOT_FOUND, "Not Found")
}

fn slug(owner: &str, repo: &str) -> String {
    format!("{owner}/{repo}")
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

pub async fn record(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // The borrow of `req` must end before the await; `Body` is not `Sync`.
    let recorded = {
        let header_value = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            authorization: header_value(header::AUTHORIZATION.as_str()),
            csrf: header_value("x-csrf-token"),
            content_type: header_value(header::CONTENT_TYPE.as_str()),
        }
    };
    log::info!("{} {}", recorded.method, recorded.path);
    state.record(recorded);
    next.run(req).await
}

/// Rejects requests without the configured bearer token with a plain-text 401.
pub async fn authorize(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(token) = state.token() {
        let expected = format!("Bearer {token}");
        let presented = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    }
    next.run(req).await
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

pub async fn get_self(State(state): State<AppState>) -> ApiResult<User> {
    let db = state.db.read().await;
    db.user.clone().map(Json).ok_or_else(not_found)
}

pub async fn issue_token(State(state): State<AppState>) -> Json<Token> {
    let token = state.token().unwrap_or("mock-token").to_string();
    Json(Token { token })
}

pub async fn list_repos(State(state): State<AppState>) -> Json<Vec<Repo>> {
    let db = state.db.read().await;
    Json(db.repos.values().cloned().collect())
}

pub async fn synchronize(State(state): State<AppState>) -> Json<Vec<Repo>> {
    list_repos(State(state)).await
}

pub async fn build_feed(State(state): State<AppState>) -> Json<Vec<FeedEntry>> {
    let db = state.db.read().await;
    let feed = db
        .builds
        .iter()
        .filter_map(|(slug, builds)| {
            builds.iter().max_by_key(|b| b.number).map(|build| FeedEntry {
                slug: slug.clone(),
                build: build.clone(),
            })
        })
        .collect();
    Json(feed)
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

pub async fn get_repo(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Repo> {
    let db = state.db.read().await;
    db.repos.get(&slug(&owner, &repo)).cloned().map(Json).ok_or_else(not_found)
}

pub async fn activate_repo(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Repo> {
    let mut db = state.db.write().await;
    let repo = db.repos.get_mut(&slug(&owner, &repo)).ok_or_else(not_found)?;
    repo.active = true;
    Ok(Json(repo.clone()))
}

pub async fn update_repo(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Json(patch): Json<RepoPatch>,
) -> ApiResult<Repo> {
    let mut db = state.db.write().await;
    let repo = db.repos.get_mut(&slug(&owner, &repo)).ok_or_else(not_found)?;
    patch.apply(repo);
    Ok(Json(repo.clone()))
}

/// Deactivates rather than removes, as Drone does.
pub async fn delete_repo(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Repo> {
    let mut db = state.db.write().await;
    let repo = db.repos.get_mut(&slug(&owner, &repo)).ok_or_else(not_found)?;
    repo.active = false;
    Ok(Json(repo.clone()))
}

pub async fn sign(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Json(input): Json<SignInput>,
) -> ApiResult<Signed> {
    let db = state.db.read().await;
    if !db.repos.contains_key(&slug(&owner, &repo)) {
        return Err(not_found());
    }
    let checksum: u32 = input.data.bytes().map(u32::from).sum();
    let sep = if input.data.ends_with('\n') { "" } else { "\n" };
    Ok(Json(Signed {
        data: format!(
            "{}{sep}---\nkind: signature\nhmac: {checksum:08x}\n",
            input.data
        ),
    }))
}

// ---------------------------------------------------------------------------
// Builds
// ---------------------------------------------------------------------------

pub async fn list_builds(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Vec<Build>> {
    let db = state.db.read().await;
    let slug = slug(&owner, &repo);
    if !db.repos.contains_key(&slug) {
        return Err(not_found());
    }
    let mut builds = db.builds.get(&slug).cloned().unwrap_or_default();
    builds.sort_by(|a, b| b.number.cmp(&a.number));
    Ok(Json(builds))
}

/// Also serves restart requests, which arrive as GETs with a query string.
pub async fn get_build(
    State(state): State<AppState>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
) -> ApiResult<Build> {
    let db = state.db.read().await;
    db.builds
        .get(&slug(&owner, &repo))
        .and_then(|builds| builds.iter().find(|b| b.number == number))
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn cancel_build(
    State(state): State<AppState>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
) -> ApiResult<Build> {
    update_build(&state, &owner, &repo, number, |build| {
        build.status = "killed".to_string();
        for stage in &mut build.stages {
            stage.status = "killed".to_string();
        }
        Ok(())
    })
    .await
}

pub async fn approve_build(
    State(state): State<AppState>,
    Path((owner, repo, number, stage)): Path<(String, String, u64, u64)>,
) -> ApiResult<Build> {
    review_stage(&state, &owner, &repo, number, stage, "pending").await
}

pub async fn decline_build(
    State(state): State<AppState>,
    Path((owner, repo, number, stage)): Path<(String, String, u64, u64)>,
) -> ApiResult<Build> {
    review_stage(&state, &owner, &repo, number, stage, "declined").await
}

async fn review_stage(
    state: &AppState,
    owner: &str,
    repo: &str,
    number: u64,
    stage: u64,
    outcome: &str,
) -> ApiResult<Build> {
    update_build(state, owner, repo, number, |build| {
        let target = build
            .stages
            .iter_mut()
            .find(|s| s.number == stage)
            .ok_or_else(not_found)?;
        if target.status != "blocked" {
            return Err(error(StatusCode::BAD_REQUEST, "stage is not blocked"));
        }
        target.status = outcome.to_string();
        build.status = outcome.to_string();
        Ok(())
    })
    .await
}

async fn update_build<F>(
    state: &AppState,
    owner: &str,
    repo: &str,
    number: u64,
    change: F,
) -> ApiResult<Build>
where
    F: FnOnce(&mut Build) -> Result<(), (StatusCode, Json<Message>)>,
{
    let mut db = state.db.write().await;
    let build = db
        .builds
        .get_mut(&slug(owner, repo))
        .and_then(|builds| builds.iter_mut().find(|b| b.number == number))
        .ok_or_else(not_found)?;
    change(build)?;
    Ok(Json(build.clone()))
}

pub async fn get_logs(
    State(state): State<AppState>,
    Path((owner, repo, build, stage, step)): Path<(String, String, u64, u64, u64)>,
) -> ApiResult<Vec<LogLine>> {
    let db = state.db.read().await;
    db.logs
        .get(&(slug(&owner, &repo), build, stage, step))
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

pub async fn list_secrets(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Json<Vec<SecretView>> {
    let db = state.db.read().await;
    let secrets = db
        .secrets
        .get(&slug(&owner, &repo))
        .map(|secrets| secrets.values().map(SecretView::from).collect())
        .unwrap_or_default();
    Json(secrets)
}

pub async fn create_secret(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Json(input): Json<SecretInput>,
) -> (StatusCode, Json<SecretView>) {
    let view = SecretView::from(&input);
    let mut db = state.db.write().await;
    db.secrets
        .entry(slug(&owner, &repo))
        .or_insert_with(BTreeMap::new)
        .insert(input.name.clone(), input);
    (StatusCode::OK, Json(view))
}

pub async fn update_secret(
    State(state): State<AppState>,
    Path((owner, repo, name)): Path<(String, String, String)>,
    Json(patch): Json<SecretPatch>,
) -> ApiResult<SecretView> {
    let mut db = state.db.write().await;
    let secret = db
        .secrets
        .get_mut(&slug(&owner, &repo))
        .and_then(|secrets| secrets.get_mut(&name))
        .ok_or_else(not_found)?;
    if let Some(data) = patch.data {
        secret.data = data;
    }
    if let Some(pull_request) = patch.pull_request {
        secret.pull_request = pull_request;
    }
    Ok(Json(SecretView::from(&*secret)))
}

pub async fn delete_secret(
    State(state): State<AppState>,
    Path((owner, repo, name)): Path<(String, String, String)>,
) -> Result<StatusCode, (StatusCode, Json<Message>)> {
    let mut db = state.db.write().await;
    db.secrets
        .get_mut(&slug(&owner, &repo))
        .and_then(|secrets| secrets.remove(&name))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

// ---------------------------------------------------------------------------
// Registries
// ---------------------------------------------------------------------------

pub async fn list_registries(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Json<Vec<RegistryView>> {
    let db = state.db.read().await;
    let registries = db
        .registries
        .get(&slug(&owner, &repo))
        .map(|registries| registries.values().map(RegistryView::from).collect())
        .unwrap_or_default();
    Json(registries)
}

pub async fn create_registry(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Json(input): Json<RegistryInput>,
) -> Json<RegistryView> {
    let view = RegistryView::from(&input);
    let mut db = state.db.write().await;
    db.registries
        .entry(slug(&owner, &repo))
        .or_insert_with(BTreeMap::new)
        .insert(input.address.clone(), input);
    Json(view)
}

pub async fn delete_registry(
    State(state): State<AppState>,
    Path((owner, repo, address)): Path<(String, String, String)>,
) -> Result<StatusCode, (StatusCode, Json<Message>)> {
    let mut db = state.db.write().await;
    db.registries
        .get_mut(&slug(&owner, &repo))
        .and_then(|registries| registries.remove(&address))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}
