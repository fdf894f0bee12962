use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{ApplicationId, Identity, JobId};
use super::flash::{paths, Outcome};
use super::forms::{
    ApplicationForm, JobForm, LoginForm, ProfileForm, RegisterForm, StatusUpdateForm,
    VisibilityForm,
};
use super::password::password_strength;
use super::repository::{BoardRepository, RepositoryError};
use super::search::SearchParams;
use super::service::{blocking, BoardError, JobBoardService};

const BEARER_PREFIX: &str = "Bearer ";

/// Router exposing the web flows: search, postings, applications,
/// bookmarks, dashboards, and accounts.
pub fn board_router<R>(service: Arc<JobBoardService<R>>) -> Router
where
    R: BoardRepository + 'static,
{
    Router::new()
        .route("/", get(home_handler::<R>))
        .route("/health/", get(health_handler::<R>))
        .route("/jobs/create/", post(create_job_handler::<R>))
        .route("/jobs/:job_id/", get(job_detail_handler::<R>))
        .route("/jobs/:job_id/edit/", post(edit_job_handler::<R>))
        .route("/jobs/:job_id/delete/", post(delete_job_handler::<R>))
        .route("/jobs/:job_id/visibility/", post(job_visibility_handler::<R>))
        .route("/jobs/:job_id/apply/", post(apply_handler::<R>))
        .route("/jobs/:job_id/save/", post(save_job_handler::<R>))
        .route("/jobs/:job_id/unsave/", post(unsave_job_handler::<R>))
        .route(
            "/jobs/:job_id/applications/",
            get(job_applications_handler::<R>),
        )
        .route("/saved-jobs/", get(saved_jobs_handler::<R>))
        .route("/my-applications/", get(my_applications_handler::<R>))
        .route("/employer/dashboard/", get(dashboard_handler::<R>))
        .route(
            "/applications/:application_id/update-status/",
            post(update_status_handler::<R>),
        )
        .route("/accounts/register/", post(register_handler::<R>))
        .route("/accounts/login/", post(login_handler::<R>))
        .route(
            "/accounts/profile/",
            get(profile_handler::<R>).post(update_profile_handler::<R>),
        )
        .route("/accounts/password-strength/", post(password_strength_handler))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub(crate) page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicationsQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PasswordProbe {
    pub(crate) password: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn viewer<R>(
    service: &JobBoardService<R>,
    token: Option<&str>,
) -> Result<Option<Identity>, BoardError>
where
    R: BoardRepository + 'static,
{
    match token {
        Some(token) => service.authenticate(token),
        None => Ok(None),
    }
}

fn require_identity<R>(
    service: &JobBoardService<R>,
    token: Option<&str>,
) -> Result<Identity, BoardError>
where
    R: BoardRepository + 'static,
{
    viewer(service, token)?.ok_or(BoardError::Unauthenticated)
}

/// `303 See Other` pointing at `location`, carrying `body` for API clients.
fn see_other(location: &str, body: impl Serialize) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string())],
        Json(body),
    )
        .into_response()
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let location = self.redirect.clone();
        see_other(&location, self)
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            BoardError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": message, "redirect": paths::login() })),
            )
                .into_response(),
            BoardError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
            }
            BoardError::EmployerRequired => Outcome::redirect(paths::home())
                .error("Access denied. Employer account required.")
                .into_response(),
            BoardError::NotFound(_) | BoardError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            BoardError::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            BoardError::Repository(RepositoryError::Conflict) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            BoardError::Repository(
                RepositoryError::Unavailable(_) | RepositoryError::Query(_),
            ) => {
                error!(error = %message, "storage failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
            BoardError::PasswordHash(_) | BoardError::Worker(_) => {
                error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

/// Interstitial shown instead of the listing while tables are missing.
pub(crate) fn setup_in_progress(error: &BoardError) -> Response {
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Database setup in progress</title></head>\n<body>\n\
         <h1>Database setup in progress</h1>\n\
         <p>The job board is still being provisioned. Please try again in a few minutes.</p>\n\
         <p>Error: {}</p>\n\
         <p><a href=\"/health/\">Check system health</a></p>\n\
         </body>\n</html>\n",
        escape_html(&error.to_string())
    );
    (StatusCode::SERVICE_UNAVAILABLE, Html(page)).into_response()
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub(crate) async fn home_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match blocking(&service, move |service| service.search(params)).await {
        Ok(results) => Json(results).into_response(),
        Err(error) if error.is_storage_failure() => {
            error!(error = %error, "search unavailable, serving setup page");
            setup_in_progress(&error)
        }
        Err(other) => other.into_response(),
    }
}

pub(crate) async fn health_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let report = blocking(&service, |service| Ok(service.health())).await?;
    Ok(Json(report).into_response())
}

pub(crate) async fn job_detail_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    let detail = blocking(&service, move |service| {
        let viewer = viewer(service, token.as_deref())?;
        service.job_detail(viewer.as_ref(), JobId(job_id))
    })
    .await?;
    Ok(Json(detail).into_response())
}

pub(crate) async fn create_job_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Json(form): Json<JobForm>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.create_job(&identity, form)
    })
    .await
}

pub(crate) async fn edit_job_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
    Json(form): Json<JobForm>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.edit_job(&identity, JobId(job_id), form)
    })
    .await
}

pub(crate) async fn delete_job_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.delete_job(&identity, JobId(job_id))
    })
    .await
}

pub(crate) async fn job_visibility_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
    Json(form): Json<VisibilityForm>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.set_job_visibility(&identity, JobId(job_id), form)
    })
    .await
}

pub(crate) async fn apply_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
    Json(form): Json<ApplicationForm>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.apply(&identity, JobId(job_id), form)
    })
    .await
}

pub(crate) async fn save_job_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.save_job(&identity, JobId(job_id))
    })
    .await
}

pub(crate) async fn unsave_job_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.unsave_job(&identity, JobId(job_id))
    })
    .await
}

pub(crate) async fn saved_jobs_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    let page = blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.saved_jobs(&identity, query.page.as_deref())
    })
    .await?;
    Ok(Json(page).into_response())
}

pub(crate) async fn my_applications_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    let page = blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.my_applications(&identity, query.page.as_deref())
    })
    .await?;
    Ok(Json(page).into_response())
}

pub(crate) async fn dashboard_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    let dashboard = blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.employer_dashboard(&identity)
    })
    .await?;
    Ok(Json(dashboard).into_response())
}

pub(crate) async fn job_applications_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
    Query(query): Query<ApplicationsQuery>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    let view = blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.job_applications(
            &identity,
            JobId(job_id),
            query.status.as_deref(),
            query.page.as_deref(),
        )
    })
    .await?;
    Ok(Json(view).into_response())
}

pub(crate) async fn update_status_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
    Json(form): Json<StatusUpdateForm>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.update_application_status(&identity, ApplicationId(application_id), form)
    })
    .await
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Json(form): Json<RegisterForm>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let grant = blocking(&service, move |service| service.register(form)).await?;
    let location = grant.outcome.redirect.clone();
    Ok(see_other(&location, grant))
}

pub(crate) async fn login_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Json(form): Json<LoginForm>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let grant = blocking(&service, move |service| service.login(form)).await?;
    let location = grant.outcome.redirect.clone();
    Ok(see_other(&location, grant))
}

pub(crate) async fn profile_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    let account = blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.account(&identity)
    })
    .await?;
    Ok(Json(account).into_response())
}

pub(crate) async fn update_profile_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    headers: HeaderMap,
    Json(form): Json<ProfileForm>,
) -> Result<Outcome, BoardError>
where
    R: BoardRepository + 'static,
{
    let token = bearer_token(&headers);
    blocking(&service, move |service| {
        let identity = require_identity(service, token.as_deref())?;
        service.update_profile(&identity, form)
    })
    .await
}

pub(crate) async fn password_strength_handler(Json(probe): Json<PasswordProbe>) -> Response {
    Json(password_strength(&probe.password)).into_response()
}
