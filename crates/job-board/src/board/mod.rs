//! Job board domain: postings, search, applications, bookmarks, accounts,
//! and the HTTP surfaces built on them.

pub mod accounts;
pub mod api;
pub mod applications;
pub mod bookmarks;
pub mod domain;
pub mod flash;
pub mod forms;
pub mod health;
pub mod password;
pub mod postings;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;

#[cfg(test)]
mod tests;

pub use accounts::{AccountView, SessionGrant};
pub use api::{api_router, FaqResource, JobListItem, JobQuery, JobResource, TestimonialResource};
pub use applications::{JobApplicationsView, LISTING_PAGE_SIZE};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, Category, CategoryId, Company, CompanyId,
    EmploymentType, ExperienceLevel, Faq, Identity, IdentityId, Job, JobId, Profile, Role,
    SavedJob, Testimonial, WorkMode,
};
pub use flash::{FlashLevel, FlashMessage, Outcome};
pub use forms::{
    ApplicationForm, FormErrors, JobForm, LoginForm, ProfileForm, RegisterForm, StatusUpdateForm,
    VisibilityForm,
};
pub use health::{HealthReport, HealthStatus};
pub use postings::{EmployerDashboard, JobDetailView};
pub use repository::{
    ApplicationRepository, ApplicationScope, BoardRepository, BookmarkRepository,
    CatalogRepository, IdentityRepository, JobDraft, JobRepository, NewFaq, NewIdentity,
    NewTestimonial, ProfileDetails, RepositoryError, StorageProbe,
};
pub use router::board_router;
pub use search::{Page, Paginator, SearchParams, SearchResults, SEARCH_PAGE_SIZE};
pub use service::{BoardError, JobBoardService};
