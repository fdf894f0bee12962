//! Provisioning scripts: migrate, create the default admin, seed sample data.

mod sample_data;

use std::fmt;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::board::domain::{Identity, Role};
use crate::board::password::hash_password;
use crate::board::repository::{
    BoardRepository, JobRepository, NewIdentity, ProfileDetails, RepositoryError, StorageProbe,
};
use crate::storage::{Migration, SqliteStore};

pub use sample_data::{
    seed_sample_data, SeedReport, SAMPLE_EMPLOYERS, SAMPLE_JOBS, SAMPLE_JOB_SEEKERS,
    SAMPLE_PASSWORD,
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";

#[derive(Debug)]
pub enum SetupError {
    Storage(RepositoryError),
    Csv(csv::Error),
    PasswordHash(String),
    MissingTable(&'static str),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Storage(err) => write!(f, "storage error: {}", err),
            SetupError::Csv(err) => write!(f, "invalid sample data: {}", err),
            SetupError::PasswordHash(err) => write!(f, "password hashing failed: {}", err),
            SetupError::MissingTable(table) => {
                write!(f, "table `{}` missing after migrations", table)
            }
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Storage(err) => Some(err),
            SetupError::Csv(err) => Some(err),
            SetupError::PasswordHash(_) | SetupError::MissingTable(_) => None,
        }
    }
}

impl From<RepositoryError> for SetupError {
    fn from(value: RepositoryError) -> Self {
        Self::Storage(value)
    }
}

impl From<csv::Error> for SetupError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<argon2::password_hash::Error> for SetupError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub tables_before: Vec<String>,
    pub applied: Vec<&'static Migration>,
    pub tables_after: Vec<String>,
}

/// Apply pending migrations and confirm the job table exists afterwards.
pub fn run_migrations(store: &SqliteStore) -> Result<MigrationReport, SetupError> {
    let tables_before = store.table_names()?;
    info!(tables = ?tables_before, "tables before migrating");

    let applied = store.migrate()?;
    for migration in &applied {
        info!(version = migration.version, name = migration.name, "applied");
    }

    let tables_after = store.table_names()?;
    info!(tables = ?tables_after, "tables after migrating");

    if !tables_after.iter().any(|table| table == "jobs") {
        return Err(SetupError::MissingTable("jobs"));
    }

    Ok(MigrationReport {
        tables_before,
        applied,
        tables_after,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminOutcome {
    Created(Identity),
    AlreadyExists,
}

/// Create the default staff account unless a user named `admin` exists.
pub fn create_admin<R>(repository: &R, password: &str) -> Result<AdminOutcome, SetupError>
where
    R: BoardRepository,
{
    if repository.username_taken(ADMIN_USERNAME)? {
        warn!(username = ADMIN_USERNAME, "admin account already exists");
        return Ok(AdminOutcome::AlreadyExists);
    }

    let identity = repository.create_identity(NewIdentity {
        username: ADMIN_USERNAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: hash_password(password)?,
        is_staff: true,
        role: Role::JobSeeker,
        profile: ProfileDetails::default(),
    })?;
    info!(username = ADMIN_USERNAME, "admin account created");
    Ok(AdminOutcome::Created(identity))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleDataOutcome {
    Seeded(SeedReport),
    /// The job table already had this many rows.
    AlreadyPresent(usize),
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct SetupReport {
    pub migrations: MigrationReport,
    /// `Err` carries the failure message; setup continues past it.
    pub admin: Result<AdminOutcome, String>,
    pub sample_data: SampleDataOutcome,
}

/// Full provisioning sequence. Connection and migration failures abort;
/// admin and sample-data failures are logged and skipped.
pub fn setup_database(
    store: &SqliteStore,
    admin_password: &str,
    today: NaiveDate,
) -> Result<SetupReport, SetupError> {
    if let Err(err) = store.check_connection() {
        error!(error = %err, "database connection failed");
        return Err(err.into());
    }
    info!("database connection successful");

    let migrations = run_migrations(store).map_err(|err| {
        error!(error = %err, "migration failed");
        err
    })?;

    let admin = create_admin(store, admin_password).map_err(|err| {
        warn!(error = %err, "admin creation failed");
        err.to_string()
    });

    let sample_data = match store.total_jobs() {
        Ok(0) => match seed_sample_data(store, today) {
            Ok(report) => SampleDataOutcome::Seeded(report),
            Err(err) => {
                warn!(error = %err, "sample data population skipped");
                SampleDataOutcome::Skipped(err.to_string())
            }
        },
        Ok(existing) => {
            warn!(jobs = existing, "sample data already exists");
            SampleDataOutcome::AlreadyPresent(existing)
        }
        Err(err) => {
            warn!(error = %err, "sample data population skipped");
            SampleDataOutcome::Skipped(err.to_string())
        }
    };

    info!("database setup completed");
    Ok(SetupReport {
        migrations,
        admin,
        sample_data,
    })
}
