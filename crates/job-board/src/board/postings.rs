use serde::Serialize;
use tracing::info;

use super::domain::{Application, CategoryId, CompanyId, Identity, Job, JobId};
use super::flash::{paths, Outcome};
use super::forms::{FormErrors, JobForm, VisibilityForm};
use super::repository::{ApplicationScope, BoardRepository, JobDraft, JobSummary};
use super::service::{BoardError, JobBoardService};

const RECENT_APPLICATIONS: usize = 10;

/// Posting as shown on its detail page.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetailView {
    pub job: Job,
    pub skills_list: Vec<String>,
    pub salary_range: String,
    pub is_saved: bool,
    pub has_applied: bool,
    pub is_owner: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerDashboard {
    pub jobs: Vec<JobSummary>,
    pub recent_applications: Vec<Application>,
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_applications: usize,
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    pub fn job_detail(
        &self,
        viewer: Option<&Identity>,
        job_id: JobId,
    ) -> Result<JobDetailView, BoardError> {
        let job = self.find_job(job_id)?;

        let (is_saved, has_applied) = match viewer {
            Some(identity) => (
                self.repository.is_saved(identity.id, job.id)?,
                self.repository
                    .application_for(job.id, identity.id)?
                    .is_some(),
            ),
            None => (false, false),
        };

        Ok(JobDetailView {
            skills_list: job.skills_list(),
            salary_range: job.salary_range(),
            is_owner: viewer.is_some_and(|identity| job.is_owned_by(identity.id)),
            is_saved,
            has_applied,
            job,
        })
    }

    /// Post a new job on behalf of an employer.
    pub fn create_job(&self, owner: &Identity, form: JobForm) -> Result<Outcome, BoardError> {
        self.require_employer(owner)?;
        let draft = self.clean_job_form(&form)?;
        let job = self.repository.insert_job(owner.id, &draft)?;

        info!(job = job.id.0, owner = owner.id.0, "job posted");
        Ok(Outcome::redirect(paths::job_detail(job.id)).success("Job posted"))
    }

    pub fn edit_job(
        &self,
        owner: &Identity,
        job_id: JobId,
        form: JobForm,
    ) -> Result<Outcome, BoardError> {
        let job = self.owned_job(owner, job_id)?;
        let draft = self.clean_job_form(&form)?;
        self.repository.update_job(job.id, &draft)?;

        info!(job = job.id.0, "job updated");
        Ok(Outcome::redirect(paths::job_detail(job.id)).success("Job updated"))
    }

    pub fn delete_job(&self, owner: &Identity, job_id: JobId) -> Result<Outcome, BoardError> {
        let job = self.owned_job(owner, job_id)?;
        self.repository.delete_job(job.id)?;

        info!(job = job.id.0, "job deleted");
        Ok(Outcome::redirect(paths::home()).success("Job deleted"))
    }

    /// Open or close a posting. Staff may toggle any job; employers only
    /// their own.
    pub fn set_job_visibility(
        &self,
        actor: &Identity,
        job_id: JobId,
        form: VisibilityForm,
    ) -> Result<Outcome, BoardError> {
        let job = if actor.is_staff {
            self.find_job(job_id)?
        } else {
            self.owned_job(actor, job_id)?
        };
        let job = self.repository.set_job_active(job.id, form.is_active)?;

        info!(job = job.id.0, active = job.is_active, "job visibility changed");
        let message = if job.is_active { "Job reopened" } else { "Job closed" };
        Ok(Outcome::redirect(paths::job_detail(job.id)).success(message))
    }

    pub fn employer_dashboard(&self, owner: &Identity) -> Result<EmployerDashboard, BoardError> {
        self.require_employer(owner)?;

        let jobs = self.repository.owner_jobs(owner.id)?;
        let scope = ApplicationScope::JobOwner(owner.id);
        let recent_applications = self
            .repository
            .applications(&scope, RECENT_APPLICATIONS, 0)?;
        let total_applications = self.repository.count_applications(&scope)?;
        let active_jobs = jobs.iter().filter(|summary| summary.job.is_active).count();

        Ok(EmployerDashboard {
            total_jobs: jobs.len(),
            active_jobs,
            total_applications,
            recent_applications,
            jobs,
        })
    }

    pub(crate) fn find_job(&self, job_id: JobId) -> Result<Job, BoardError> {
        self.repository
            .job(job_id)?
            .ok_or(BoardError::NotFound("job"))
    }

    /// Jobs are looked up scoped to their owner; anyone else sees a 404.
    pub(crate) fn owned_job(&self, owner: &Identity, job_id: JobId) -> Result<Job, BoardError> {
        match self.repository.job(job_id)? {
            Some(job) if job.is_owned_by(owner.id) => Ok(job),
            _ => Err(BoardError::NotFound("job")),
        }
    }

    fn require_employer(&self, identity: &Identity) -> Result<(), BoardError> {
        let profile = self
            .repository
            .profile(identity.id)?
            .ok_or(BoardError::NotFound("profile"))?;
        if profile.is_employer() {
            Ok(())
        } else {
            Err(BoardError::EmployerRequired)
        }
    }

    fn clean_job_form(&self, form: &JobForm) -> Result<JobDraft, BoardError> {
        let (draft, mut errors) = match form.clean() {
            Ok(draft) => (Some(draft), FormErrors::default()),
            Err(errors) => (None, errors),
        };

        if let Some(id) = form.company {
            if self.repository.company(CompanyId(id))?.is_none() {
                errors.add("company", invalid_choice());
            }
        }
        if let Some(id) = form.category {
            if self.repository.category(CategoryId(id))?.is_none() {
                errors.add("category", invalid_choice());
            }
        }

        match draft {
            Some(draft) if errors.is_empty() => Ok(draft),
            _ => Err(errors.into()),
        }
    }
}

fn invalid_choice() -> &'static str {
    "Select a valid choice. That choice is not one of the available choices."
}
