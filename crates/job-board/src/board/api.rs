use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    positive, Category, CategoryId, Company, CompanyId, EmploymentType, Faq, Job, JobId,
    Testimonial, WorkMode,
};
use super::repository::BoardRepository;
use super::search::{
    non_empty, JobFilters, JobOrdering, LocationMatch, TextSearch, API_SEARCH_FIELDS,
};
use super::service::{blocking, BoardError, JobBoardService};

const LIST_SKILLS: usize = 6;

/// Query parameters accepted by `GET /api/jobs/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub work_mode: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
}

impl JobQuery {
    /// Search terms are split on whitespace and commas; each term must match
    /// at least one searchable field.
    pub fn filters(&self) -> JobFilters {
        let text = self
            .search
            .as_deref()
            .unwrap_or_default()
            .split(|ch: char| ch.is_whitespace() || ch == ',')
            .filter(|term| !term.is_empty())
            .map(|term| TextSearch {
                needle: term.to_string(),
                fields: API_SEARCH_FIELDS,
            })
            .collect();

        JobFilters {
            active_only: true,
            text,
            location: non_empty(&self.location).map(LocationMatch::Exact),
            category_slug: None,
            employment_type: non_empty(&self.employment_type),
            work_mode: non_empty(&self.work_mode),
            experience_level: non_empty(&self.experience_level),
            salary_at_least: None,
        }
    }

    pub fn ordering(&self) -> JobOrdering {
        JobOrdering::from_param(self.ordering.as_deref())
    }
}

/// Compact row of the job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobListItem {
    pub id: JobId,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub work_mode: WorkMode,
    pub experience: &'static str,
    pub salary: String,
    pub skills: Vec<String>,
    pub posted_date: String,
}

impl From<&Job> for JobListItem {
    fn from(job: &Job) -> Self {
        let salary = match (positive(job.salary_min), positive(job.salary_max)) {
            (Some(min), Some(max)) => format!("{}K-{}K", thousands(min), thousands(max)),
            _ => "Not specified".to_string(),
        };
        let mut skills = job.skills_list();
        skills.truncate(LIST_SKILLS);

        Self {
            id: job.id,
            title: job.title.clone(),
            company_name: job.company.name.clone(),
            location: job.location.clone(),
            employment_type: job.employment_type,
            work_mode: job.work_mode,
            experience: job.experience_level.short_display(),
            salary,
            skills,
            posted_date: posted_date(job),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobResource {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub responsibilities: String,
    pub company: Company,
    pub category: Option<Category>,
    pub location: String,
    pub employment_type: EmploymentType,
    pub work_mode: WorkMode,
    pub experience: &'static str,
    pub salary: String,
    pub skills: Vec<String>,
    pub is_active: bool,
    pub posted_date: String,
    pub application_deadline: Option<NaiveDate>,
}

impl From<Job> for JobResource {
    fn from(job: Job) -> Self {
        let salary = match (positive(job.salary_min), positive(job.salary_max)) {
            (Some(min), Some(max)) => format!("{}K-{}K", thousands(min), thousands(max)),
            (Some(min), None) => format!("{}K+", thousands(min)),
            _ => "Not specified".to_string(),
        };

        Self {
            skills: job.skills_list(),
            posted_date: posted_date(&job),
            experience: job.experience_level.short_display(),
            salary,
            id: job.id,
            title: job.title,
            description: job.description,
            requirements: job.requirements,
            responsibilities: job.responsibilities,
            company: job.company,
            category: job.category,
            location: job.location,
            employment_type: job.employment_type,
            work_mode: job.work_mode,
            is_active: job.is_active,
            application_deadline: job.application_deadline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestimonialResource {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub company: String,
    pub content: String,
    pub rating: u8,
}

impl From<Testimonial> for TestimonialResource {
    fn from(testimonial: Testimonial) -> Self {
        Self {
            id: testimonial.id,
            name: testimonial.name,
            position: testimonial.position,
            company: testimonial.company,
            content: testimonial.content,
            rating: testimonial.rating,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqResource {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub order: i64,
}

impl From<Faq> for FaqResource {
    fn from(faq: Faq) -> Self {
        Self {
            id: faq.id,
            question: faq.question,
            answer: faq.answer,
            order: faq.order,
        }
    }
}

fn thousands(amount: i64) -> i64 {
    amount.div_euclid(1000)
}

fn posted_date(job: &Job) -> String {
    job.created_at.format("%a %b %d %Y").to_string()
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    /// Active postings for the REST listing. Unpaginated.
    pub fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobListItem>, BoardError> {
        let jobs = self
            .repository
            .find_jobs(&query.filters(), query.ordering(), usize::MAX, 0)?;
        Ok(jobs.iter().map(JobListItem::from).collect())
    }

    /// Inactive postings are hidden from the REST detail.
    pub fn active_job(&self, id: JobId) -> Result<JobResource, BoardError> {
        match self.repository.job(id)? {
            Some(job) if job.is_active => Ok(JobResource::from(job)),
            _ => Err(BoardError::NotFound("job")),
        }
    }

    pub fn companies(&self) -> Result<Vec<Company>, BoardError> {
        Ok(self.repository.companies()?)
    }

    pub fn company(&self, id: CompanyId) -> Result<Company, BoardError> {
        self.repository
            .company(id)?
            .ok_or(BoardError::NotFound("company"))
    }

    pub fn categories(&self) -> Result<Vec<Category>, BoardError> {
        Ok(self.repository.categories()?)
    }

    pub fn category(&self, id: CategoryId) -> Result<Category, BoardError> {
        self.repository
            .category(id)?
            .ok_or(BoardError::NotFound("category"))
    }

    pub fn testimonials(&self) -> Result<Vec<TestimonialResource>, BoardError> {
        let testimonials = self.repository.testimonials()?;
        Ok(testimonials.into_iter().map(TestimonialResource::from).collect())
    }

    pub fn testimonial(&self, id: i64) -> Result<TestimonialResource, BoardError> {
        self.repository
            .testimonial(id)?
            .map(TestimonialResource::from)
            .ok_or(BoardError::NotFound("testimonial"))
    }

    pub fn faqs(&self) -> Result<Vec<FaqResource>, BoardError> {
        let faqs = self.repository.faqs()?;
        Ok(faqs.into_iter().map(FaqResource::from).collect())
    }

    pub fn faq(&self, id: i64) -> Result<FaqResource, BoardError> {
        self.repository
            .faq(id)?
            .map(FaqResource::from)
            .ok_or(BoardError::NotFound("faq"))
    }
}

/// Read-only REST surface under `/api/`.
pub fn api_router<R>(service: Arc<JobBoardService<R>>) -> Router
where
    R: BoardRepository + 'static,
{
    Router::new()
        .route("/api/", get(api_root_handler))
        .route("/api/jobs/", get(job_list_handler::<R>))
        .route("/api/jobs/:id/", get(job_resource_handler::<R>))
        .route("/api/companies/", get(company_list_handler::<R>))
        .route("/api/companies/:id/", get(company_handler::<R>))
        .route("/api/categories/", get(category_list_handler::<R>))
        .route("/api/categories/:id/", get(category_handler::<R>))
        .route("/api/testimonials/", get(testimonial_list_handler::<R>))
        .route("/api/testimonials/:id/", get(testimonial_handler::<R>))
        .route("/api/faqs/", get(faq_list_handler::<R>))
        .route("/api/faqs/:id/", get(faq_handler::<R>))
        .with_state(service)
}

pub(crate) async fn api_root_handler() -> Response {
    Json(json!({
        "jobs": "/api/jobs/",
        "companies": "/api/companies/",
        "categories": "/api/categories/",
        "testimonials": "/api/testimonials/",
        "faqs": "/api/faqs/",
    }))
    .into_response()
}

pub(crate) async fn job_list_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Query(query): Query<JobQuery>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, move |service| service.list_jobs(&query)).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn job_resource_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Path(id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, move |service| service.active_job(JobId(id))).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn company_list_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, |service| service.companies()).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn company_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Path(id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, move |service| service.company(CompanyId(id))).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn category_list_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, |service| service.categories()).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn category_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Path(id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, move |service| service.category(CategoryId(id))).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn testimonial_list_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, |service| service.testimonials()).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn testimonial_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Path(id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, move |service| service.testimonial(id)).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn faq_list_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, |service| service.faqs()).await?;
    Ok(Json(body).into_response())
}

pub(crate) async fn faq_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Path(id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let body = blocking(&service, move |service| service.faq(id)).await?;
    Ok(Json(body).into_response())
}
