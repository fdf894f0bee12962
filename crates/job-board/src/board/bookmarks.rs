use tracing::debug;

use super::applications::LISTING_PAGE_SIZE;
use super::domain::{Identity, JobId, SavedJob};
use super::flash::{paths, Outcome};
use super::repository::BoardRepository;
use super::search::{Page, Paginator};
use super::service::{BoardError, JobBoardService};

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    /// Saving twice is a no-op reported as information, not an error.
    pub fn save_job(&self, user: &Identity, job_id: JobId) -> Result<Outcome, BoardError> {
        let job = self.find_job(job_id)?;
        let created = self.repository.save_job(user.id, job.id)?;
        debug!(job = job.id.0, user = user.id.0, created, "bookmark saved");

        let outcome = Outcome::redirect(paths::job_detail(job.id));
        Ok(if created {
            outcome.success("Job saved successfully")
        } else {
            outcome.info("Job already saved")
        })
    }

    /// Removes the bookmark when present; succeeds either way.
    pub fn unsave_job(&self, user: &Identity, job_id: JobId) -> Result<Outcome, BoardError> {
        let job = self.find_job(job_id)?;
        let removed = self.repository.unsave_job(user.id, job.id)?;
        debug!(job = job.id.0, user = user.id.0, removed, "bookmark removed");

        Ok(Outcome::redirect(paths::job_detail(job.id)).success("Job removed from saved jobs"))
    }

    pub fn saved_jobs(
        &self,
        user: &Identity,
        page: Option<&str>,
    ) -> Result<Page<SavedJob>, BoardError> {
        let total = self.repository.count_saved(user.id)?;
        let window = Paginator::new(LISTING_PAGE_SIZE).window(page, total);
        let items = self
            .repository
            .saved_jobs(user.id, window.limit(), window.offset())?;
        Ok(window.into_page(items))
    }
}
