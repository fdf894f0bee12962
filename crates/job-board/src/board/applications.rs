use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    status_choices, Application, ApplicationId, ApplicationStatus, Choice, Identity, Job, JobId,
};
use super::flash::{paths, Outcome};
use super::forms::{ApplicationForm, StatusUpdateForm};
use super::repository::{ApplicationScope, BoardRepository, RepositoryError};
use super::search::{Page, Paginator};
use super::service::{BoardError, JobBoardService};

/// Per-page size of every application and bookmark listing.
pub const LISTING_PAGE_SIZE: usize = 10;

const ALREADY_APPLIED: &str = "You have already applied for this job";

#[derive(Debug, Clone, Serialize)]
pub struct JobApplicationsView {
    pub job: Job,
    pub applications: Page<Application>,
    pub status_filter: Option<String>,
    pub status_choices: Vec<Choice>,
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    /// Apply once per (job, applicant). A repeat attempt is answered with a
    /// message instead of a second row.
    pub fn apply(
        &self,
        applicant: &Identity,
        job_id: JobId,
        form: ApplicationForm,
    ) -> Result<Outcome, BoardError> {
        let job = self.find_job(job_id)?;
        let back_to_job = Outcome::redirect(paths::job_detail(job.id));

        if self
            .repository
            .application_for(job.id, applicant.id)?
            .is_some()
        {
            return Ok(back_to_job.error(ALREADY_APPLIED));
        }

        match self
            .repository
            .insert_application(job.id, applicant.id, form.cover_letter.trim())
        {
            Ok(application) => {
                info!(
                    application = application.id.0,
                    job = job.id.0,
                    applicant = applicant.id.0,
                    "application submitted"
                );
                Ok(back_to_job.success("Applied successfully"))
            }
            Err(RepositoryError::Conflict) => {
                warn!(job = job.id.0, applicant = applicant.id.0, "concurrent duplicate application");
                Ok(back_to_job.error(ALREADY_APPLIED))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn my_applications(
        &self,
        applicant: &Identity,
        page: Option<&str>,
    ) -> Result<Page<Application>, BoardError> {
        self.application_page(ApplicationScope::Applicant(applicant.id), page)
    }

    /// Applications received by one of the owner's jobs.
    pub fn job_applications(
        &self,
        owner: &Identity,
        job_id: JobId,
        status: Option<&str>,
        page: Option<&str>,
    ) -> Result<JobApplicationsView, BoardError> {
        let job = self.owned_job(owner, job_id)?;
        let status_filter = status
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(str::to_string);
        let applications = self.application_page(
            ApplicationScope::Job {
                job: job.id,
                status: status_filter.clone(),
            },
            page,
        )?;

        Ok(JobApplicationsView {
            job,
            applications,
            status_filter,
            status_choices: status_choices(),
        })
    }

    /// Any status may be set from any other; only the job's owner may set it.
    pub fn update_application_status(
        &self,
        owner: &Identity,
        application_id: ApplicationId,
        form: StatusUpdateForm,
    ) -> Result<Outcome, BoardError> {
        let application = match self.repository.application(application_id)? {
            Some(application) if application.job_owner == owner.id => application,
            _ => return Err(BoardError::NotFound("application")),
        };
        let outcome = Outcome::redirect(paths::job_applications(application.job_id));

        let Some(status) = ApplicationStatus::parse(form.status.trim()) else {
            return Ok(outcome);
        };

        let updated = self
            .repository
            .set_application_status(application.id, status)?;
        info!(
            application = updated.id.0,
            status = status.label(),
            "application status updated"
        );

        Ok(outcome.success(format!(
            "Application status updated to {}",
            status.display()
        )))
    }

    fn application_page(
        &self,
        scope: ApplicationScope,
        page: Option<&str>,
    ) -> Result<Page<Application>, BoardError> {
        let total = self.repository.count_applications(&scope)?;
        let window = Paginator::new(LISTING_PAGE_SIZE).window(page, total);
        let items = self
            .repository
            .applications(&scope, window.limit(), window.offset())?;
        Ok(window.into_page(items))
    }
}
