use std::sync::Arc;

use tokio::task;

use super::forms::FormErrors;
use super::repository::{BoardRepository, RepositoryError};

/// Facade over the board's storage. Behavior is split across the
/// `accounts`, `postings`, `applications`, `bookmarks`, and `search` modules.
pub struct JobBoardService<R> {
    pub(crate) repository: Arc<R>,
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }
}

/// Error raised by the board services.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("access denied. employer account required")]
    EmployerRequired,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Invalid(#[from] FormErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("blocking task failed: {0}")]
    Worker(#[from] task::JoinError),
}

impl BoardError {
    /// Storage could not serve the request at all, as opposed to a
    /// business-rule rejection.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            BoardError::Repository(RepositoryError::Unavailable(_) | RepositoryError::Query(_))
        )
    }
}

impl From<argon2::password_hash::Error> for BoardError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(value.to_string())
    }
}

/// Run synchronous service work (SQLite queries, argon2) on tokio's blocking
/// pool instead of an async worker thread.
pub(crate) async fn blocking<R, T, F>(
    service: &Arc<JobBoardService<R>>,
    work: F,
) -> Result<T, BoardError>
where
    R: BoardRepository + 'static,
    T: Send + 'static,
    F: FnOnce(&JobBoardService<R>) -> Result<T, BoardError> + Send + 'static,
{
    let service = Arc::clone(service);
    task::spawn_blocking(move || work(&service)).await?
}
