use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::board::domain::{
    Category, Company, EmploymentType, ExperienceLevel, Identity, Job, Role, WorkMode,
};
use crate::board::forms::JobForm;
use crate::board::repository::{
    CatalogRepository, IdentityRepository, JobDraft, JobRepository, NewIdentity, ProfileDetails,
};
use crate::board::{api_router, board_router, JobBoardService};
use crate::storage::SqliteStore;

pub(super) type Service = JobBoardService<SqliteStore>;

/// Migrated in-memory store plus a service over it.
pub(super) fn build_service() -> (Arc<Service>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store"));
    store.migrate().expect("migrations apply");
    (Arc::new(JobBoardService::new(store.clone())), store)
}

/// Service over a database whose tables were never created.
pub(super) fn unmigrated_service() -> Arc<Service> {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store"));
    Arc::new(JobBoardService::new(store))
}

/// Identities are created straight through storage to keep argon2 out of
/// the hot path of every test.
pub(super) fn identity(store: &SqliteStore, username: &str, role: Role) -> Identity {
    store
        .create_identity(NewIdentity {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Test".to_string(),
            last_name: username.to_string(),
            password_hash: "unused".to_string(),
            is_staff: false,
            role,
            profile: ProfileDetails::default(),
        })
        .expect("identity created")
}

pub(super) fn employer(store: &SqliteStore, username: &str) -> Identity {
    identity(store, username, Role::Employer)
}

pub(super) fn seeker(store: &SqliteStore, username: &str) -> Identity {
    identity(store, username, Role::JobSeeker)
}

/// Bearer token bound to `identity`.
pub(super) fn session(store: &SqliteStore, identity: &Identity) -> String {
    let token = format!("tok_test_{}", identity.username);
    store
        .create_session(identity.id, &token)
        .expect("session created");
    token
}

pub(super) fn company(store: &SqliteStore, name: &str) -> Company {
    store.ensure_company(name).expect("company").0
}

pub(super) fn category(store: &SqliteStore, name: &str) -> Category {
    let slug = crate::board::domain::slugify(name);
    store.ensure_category(name, &slug).expect("category").0
}

pub(super) fn draft(company: &Company, title: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: format!("{title} wanted"),
        requirements: String::new(),
        responsibilities: String::new(),
        salary_min: None,
        salary_max: None,
        salary_currency: "USD".to_string(),
        location: "Remote".to_string(),
        employment_type: EmploymentType::FullTime,
        work_mode: WorkMode::Remote,
        experience_level: ExperienceLevel::Mid,
        skills_required: String::new(),
        company_id: company.id,
        category_id: None,
        application_deadline: None,
    }
}

pub(super) fn post_job(store: &SqliteStore, owner: &Identity, draft: JobDraft) -> Job {
    store.insert_job(owner.id, &draft).expect("job inserted")
}

pub(super) fn job_form(company: &Company) -> JobForm {
    JobForm {
        title: "Backend Engineer".to_string(),
        description: "Design and run our APIs".to_string(),
        location: "Lisbon".to_string(),
        employment_type: "contract".to_string(),
        work_mode: "hybrid".to_string(),
        experience_level: "senior".to_string(),
        skills_required: "Rust, Postgres".to_string(),
        salary_min: Some(70000),
        salary_max: Some(95000),
        company: Some(company.id.0),
        ..JobForm::default()
    }
}

pub(super) fn router_with_service(service: Arc<Service>) -> axum::Router {
    board_router(service.clone()).merge(api_router(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
