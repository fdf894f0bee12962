use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tower::ServiceExt;

use super::common::{
    build_service, company, draft, employer, post_job, read_json_body, read_text_body,
    router_with_service, seeker, session, unmigrated_service,
};
use crate::board::forms::ApplicationForm;
use crate::board::repository::{ApplicationRepository, JobRepository};
use crate::board::router;
use crate::board::service::{blocking, BoardError};
use crate::storage::SqliteStore;

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
    );
    headers
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn apply_handler_redirects_with_flash_messages() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let jane = seeker(&store, "jane");
    let token = session(&store, &jane);
    let job = post_job(&store, &owner, draft(&company(&store, "Acme"), "Designer"));

    let response = router::apply_handler::<SqliteStore>(
        State(service.clone()),
        bearer(&token),
        Path(job.id.0),
        Json(ApplicationForm {
            cover_letter: "Hi".to_string(),
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    assert_eq!(location.as_deref(), Some(format!("/jobs/{}/", job.id.0).as_str()));

    let body = read_json_body(response).await;
    assert_eq!(body["messages"][0]["level"], "success");
    assert_eq!(body["messages"][0]["text"], "Applied successfully");
    assert!(store
        .application_for(job.id, jane.id)
        .expect("lookup")
        .is_some());
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let job = post_job(&store, &owner, draft(&company(&store, "Acme"), "Designer"));
    let app = router_with_service(service);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/jobs/{}/save/", job.id.0),
            None,
            json!({}),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json_body(response).await;
    assert_eq!(body["redirect"], "/accounts/login/");

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/jobs/{}/save/", job.id.0),
            Some("tok_forged"),
            json!({}),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seekers_are_redirected_away_from_the_dashboard() {
    let (service, store) = build_service();
    let jane = seeker(&store, "jane");
    let token = session(&store, &jane);

    let request = Request::builder()
        .uri("/employer/dashboard/")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let response = router_with_service(service)
        .oneshot(request)
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).map(HeaderValue::as_bytes),
        Some("/".as_bytes())
    );
    let body = read_json_body(response).await;
    assert_eq!(
        body["messages"][0]["text"],
        "Access denied. Employer account required."
    );
}

#[tokio::test]
async fn non_owner_sees_not_found_for_applications_listing() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let rival = employer(&store, "globex_hr");
    let token = session(&store, &rival);
    let job = post_job(&store, &owner, draft(&company(&store, "Acme"), "Designer"));

    let request = Request::builder()
        .uri(format!("/jobs/{}/applications/?status=pending", job.id.0))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let response = router_with_service(service)
        .oneshot(request)
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_job_form_is_unprocessable() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let token = session(&store, &owner);

    let response = router_with_service(service)
        .oneshot(json_request(
            "POST",
            "/jobs/create/",
            Some(&token),
            json!({ "title": "", "employment_type": "gig" }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["employment_type"].is_array());
    assert_eq!(store.total_jobs().expect("count"), 0);
}

#[tokio::test]
async fn home_serves_listing_as_json() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    post_job(&store, &owner, draft(&company(&store, "Acme"), "Designer"));

    let response = router_with_service(service)
        .oneshot(get("/?q=design&page=4"))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["jobs"]["number"], 1);
    assert_eq!(body["jobs"]["items"][0]["title"], "Designer");
    assert_eq!(body["params"]["q"], "design");
}

#[tokio::test]
async fn home_shows_setup_page_while_tables_are_missing() {
    let response = router_with_service(unmigrated_service())
        .oneshot(get("/"))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let page = read_text_body(response).await;
    assert!(page.contains("Database setup in progress"));
    assert!(page.contains("href=\"/health/\""));
}

#[tokio::test]
async fn health_always_answers_ok() {
    let healthy = router_with_service(build_service().0)
        .oneshot(get("/health/"))
        .await
        .expect("router response");
    assert_eq!(healthy.status(), StatusCode::OK);
    let body = read_json_body(healthy).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["job_count"], 0);

    let broken = router_with_service(unmigrated_service())
        .oneshot(get("/health/"))
        .await
        .expect("router response");
    assert_eq!(broken.status(), StatusCode::OK);
    let body = read_json_body(broken).await;
    assert_eq!(body["status"], "error");
    assert!(body["errors"].as_array().is_some_and(|errors| !errors.is_empty()));
}

#[tokio::test]
async fn rest_detail_hides_closed_postings() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme");
    let open = post_job(&store, &owner, draft(&acme, "Designer"));
    let closed = post_job(&store, &owner, draft(&acme, "Writer"));
    store.set_job_active(closed.id, false).expect("closed");
    let app = router_with_service(service);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/jobs/{}/", open.id.0)))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["company"]["name"], "Acme");

    let response = app
        .clone()
        .oneshot(get(&format!("/api/jobs/{}/", closed.id.0)))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get("/api/jobs/"))
        .await
        .expect("router response");
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn password_strength_probe_scores_input() {
    let response = router_with_service(build_service().0)
        .oneshot(json_request(
            "POST",
            "/accounts/password-strength/",
            None,
            json!({ "password": "" }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["score"], 0);
    assert_eq!(body["strength"], "none");
}

#[tokio::test]
async fn visibility_route_closes_a_posting() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let token = session(&store, &owner);
    let job = post_job(&store, &owner, draft(&company(&store, "Acme"), "Designer"));

    let response = router_with_service(Arc::clone(&service))
        .oneshot(json_request(
            "POST",
            &format!("/jobs/{}/visibility/", job.id.0),
            Some(&token),
            json!({ "is_active": false }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(!store.job(job.id).expect("lookup").expect("job").is_active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn register_login_and_profile_run_off_the_async_workers() {
    let (service, _store) = build_service();
    let app = router_with_service(service);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/accounts/register/",
            None,
            json!({
                "username": "mira",
                "email": "mira@example.com",
                "first_name": "Mira",
                "last_name": "Okafor",
                "password1": "Lantern#Coast58",
                "password2": "Lantern#Coast58",
                "role": "job_seeker",
            }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let body = read_json_body(response).await;
    assert_eq!(body["messages"][0]["text"], "Registration successful");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/accounts/login/",
            None,
            json!({ "username": "mira", "password": "Lantern#Coast58" }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let body = read_json_body(response).await;
    let token = body["token"].as_str().expect("session token").to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/accounts/profile/")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["identity"]["username"], "mira");
    assert_eq!(body["profile"]["role"], "job_seeker");
}

#[tokio::test]
async fn panicking_blocking_work_is_a_server_error() {
    let (service, _store) = build_service();

    let err = blocking(&service, |_| -> Result<(), BoardError> { panic!("worker died") })
        .await
        .expect_err("join failure");
    assert!(matches!(err, BoardError::Worker(_)));
    assert_eq!(
        err.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
