use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Category, CategoryId, Company, CompanyId,
    EmploymentType, ExperienceLevel, Faq, Identity, IdentityId, Job, JobId, Profile, Role,
    SavedJob, Testimonial, WorkMode,
};
use super::search::{JobFilters, JobOrdering};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    /// Storage cannot serve requests yet, e.g. tables have not been provisioned.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
}

/// Contact details carried on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDetails {
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub company_name: String,
    pub website: String,
}

/// Everything needed to register an identity together with its profile.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub role: Role,
    pub profile: ProfileDetails,
}

/// Identity paired with its stored password hash, for login checks only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identity: Identity,
    pub password_hash: String,
}

/// Validated posting fields, shared by create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub responsibilities: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub work_mode: WorkMode,
    pub experience_level: ExperienceLevel,
    pub skills_required: String,
    pub company_id: CompanyId,
    pub category_id: Option<CategoryId>,
    pub application_deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestimonial {
    pub name: String,
    pub position: String,
    pub company: String,
    pub content: String,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
    pub order: i64,
}

/// A posting annotated with the number of applications it received.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job: Job,
    pub application_count: usize,
}

/// Which applications a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationScope {
    Applicant(IdentityId),
    /// `status` is matched verbatim; a value naming no status matches nothing.
    Job {
        job: JobId,
        status: Option<String>,
    },
    JobOwner(IdentityId),
}

pub trait IdentityRepository: Send + Sync {
    /// Create the identity and its profile in one transaction.
    fn create_identity(&self, identity: NewIdentity) -> Result<Identity, RepositoryError>;
    fn identity(&self, id: IdentityId) -> Result<Option<Identity>, RepositoryError>;
    fn credentials(&self, username: &str) -> Result<Option<Credentials>, RepositoryError>;
    fn username_taken(&self, username: &str) -> Result<bool, RepositoryError>;
    fn profile(&self, id: IdentityId) -> Result<Option<Profile>, RepositoryError>;
    fn update_profile(
        &self,
        id: IdentityId,
        details: &ProfileDetails,
    ) -> Result<Profile, RepositoryError>;
    fn create_session(&self, id: IdentityId, token: &str) -> Result<(), RepositoryError>;
    fn identity_for_token(&self, token: &str) -> Result<Option<Identity>, RepositoryError>;
}

pub trait CatalogRepository: Send + Sync {
    fn companies(&self) -> Result<Vec<Company>, RepositoryError>;
    fn company(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError>;
    /// Returns the company and whether it was created by this call.
    fn ensure_company(&self, name: &str) -> Result<(Company, bool), RepositoryError>;
    fn total_companies(&self) -> Result<usize, RepositoryError>;
    fn categories(&self) -> Result<Vec<Category>, RepositoryError>;
    fn category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;
    fn ensure_category(&self, name: &str, slug: &str)
        -> Result<(Category, bool), RepositoryError>;
    fn testimonials(&self) -> Result<Vec<Testimonial>, RepositoryError>;
    fn testimonial(&self, id: i64) -> Result<Option<Testimonial>, RepositoryError>;
    /// Keyed on the author's name.
    fn ensure_testimonial(&self, testimonial: &NewTestimonial) -> Result<bool, RepositoryError>;
    fn faqs(&self) -> Result<Vec<Faq>, RepositoryError>;
    fn faq(&self, id: i64) -> Result<Option<Faq>, RepositoryError>;
    /// Keyed on the question text.
    fn ensure_faq(&self, faq: &NewFaq) -> Result<bool, RepositoryError>;
}

pub trait JobRepository: Send + Sync {
    fn insert_job(&self, owner: IdentityId, draft: &JobDraft) -> Result<Job, RepositoryError>;
    fn update_job(&self, id: JobId, draft: &JobDraft) -> Result<Job, RepositoryError>;
    fn set_job_active(&self, id: JobId, active: bool) -> Result<Job, RepositoryError>;
    /// Removing a job cascades to its applications and bookmarks.
    fn delete_job(&self, id: JobId) -> Result<(), RepositoryError>;
    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    fn count_jobs(&self, filters: &JobFilters) -> Result<usize, RepositoryError>;
    fn find_jobs(
        &self,
        filters: &JobFilters,
        ordering: JobOrdering,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>, RepositoryError>;
    fn owner_jobs(&self, owner: IdentityId) -> Result<Vec<JobSummary>, RepositoryError>;
    fn total_jobs(&self) -> Result<usize, RepositoryError>;
}

pub trait ApplicationRepository: Send + Sync {
    /// Fails with `Conflict` when the (job, applicant) pair already exists.
    fn insert_application(
        &self,
        job: JobId,
        applicant: IdentityId,
        cover_letter: &str,
    ) -> Result<Application, RepositoryError>;
    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn application_for(
        &self,
        job: JobId,
        applicant: IdentityId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;
    fn count_applications(&self, scope: &ApplicationScope) -> Result<usize, RepositoryError>;
    fn applications(
        &self,
        scope: &ApplicationScope,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Application>, RepositoryError>;
}

pub trait BookmarkRepository: Send + Sync {
    /// Returns `true` when a new bookmark row was written.
    fn save_job(&self, user: IdentityId, job: JobId) -> Result<bool, RepositoryError>;
    /// Returns `true` when a bookmark row was removed.
    fn unsave_job(&self, user: IdentityId, job: JobId) -> Result<bool, RepositoryError>;
    fn is_saved(&self, user: IdentityId, job: JobId) -> Result<bool, RepositoryError>;
    fn count_saved(&self, user: IdentityId) -> Result<usize, RepositoryError>;
    fn saved_jobs(
        &self,
        user: IdentityId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SavedJob>, RepositoryError>;
}

/// Low-level probes used by the health report.
pub trait StorageProbe: Send + Sync {
    fn engine_version(&self) -> Result<String, RepositoryError>;
    fn table_names(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Everything the board services need from storage.
pub trait BoardRepository:
    IdentityRepository
    + CatalogRepository
    + JobRepository
    + ApplicationRepository
    + BookmarkRepository
    + StorageProbe
{
}

impl<T> BoardRepository for T where
    T: IdentityRepository
        + CatalogRepository
        + JobRepository
        + ApplicationRepository
        + BookmarkRepository
        + StorageProbe
{
}
