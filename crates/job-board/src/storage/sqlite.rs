use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, Transaction};
use tracing::{debug, info};

use crate::board::domain::{
    Application, ApplicationId, ApplicationStatus, Category, CategoryId, Company, CompanyId,
    EmploymentType, ExperienceLevel, Faq, Identity, IdentityId, Job, JobId, Profile, Role,
    SavedJob, Testimonial, WorkMode,
};
use crate::board::repository::{
    ApplicationRepository, ApplicationScope, BookmarkRepository, CatalogRepository, Credentials,
    IdentityRepository, JobDraft, JobRepository, JobSummary, NewFaq, NewIdentity,
    NewTestimonial, ProfileDetails, RepositoryError, StorageProbe,
};
use crate::board::search::{JobFilters, JobOrdering, LocationMatch, SearchField};
use crate::config::DatabaseLocation;

use super::schema::{self, Migration};

/// SQLite-backed repository. Every call serializes on one connection.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `location`. Tables are not
    /// created here; run [`SqliteStore::migrate`] for that.
    pub fn open(location: &DatabaseLocation) -> Result<Self, RepositoryError> {
        let connection = match location {
            DatabaseLocation::InMemory => Connection::open_in_memory(),
            DatabaseLocation::File(path) => Connection::open(path),
        }
        .map_err(map_error)?;

        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(map_error)?;
        connection
            .busy_timeout(std::time::Duration::from_secs(5))
            .map_err(map_error)?;
        register_fold_case(&connection).map_err(map_error)?;

        debug!(database = %location, "database opened");
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::open(&DatabaseLocation::InMemory)
    }

    /// Apply pending migrations; returns the ones applied by this call.
    pub fn migrate(&self) -> Result<Vec<&'static Migration>, RepositoryError> {
        let mut connection = self.lock()?;
        let applied = schema::apply_pending(&mut connection).map_err(map_error)?;
        info!(applied = applied.len(), "schema up to date");
        Ok(applied)
    }

    /// Round-trip a trivial query to prove the database answers.
    pub fn check_connection(&self) -> Result<(), RepositoryError> {
        self.read(|connection| connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .map(|_| ())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.connection
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection mutex poisoned".to_string()))
    }

    fn read<T>(
        &self,
        work: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, RepositoryError> {
        let connection = self.lock()?;
        work(&connection).map_err(map_error)
    }

    fn write<T>(
        &self,
        work: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    ) -> Result<T, RepositoryError> {
        let mut connection = self.lock()?;
        let transaction = connection.transaction().map_err(map_error)?;
        let value = work(&transaction).map_err(map_error)?;
        transaction.commit().map_err(map_error)?;
        Ok(value)
    }
}

/// `fold_case(text)`: full Unicode lowercasing. SQLite's own `lower()` only
/// folds ASCII.
fn register_fold_case(connection: &Connection) -> rusqlite::Result<()> {
    connection.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

/// Timestamps are stored as fixed-width RFC 3339 text so they sort lexically.
pub(crate) fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn map_error(error: rusqlite::Error) -> RepositoryError {
    match &error {
        rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound,
        rusqlite::Error::SqliteFailure(failure, message) => match failure.code {
            ErrorCode::ConstraintViolation => RepositoryError::Conflict,
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly => RepositoryError::Unavailable(error.to_string()),
            _ if message.as_deref().is_some_and(is_missing_schema) => {
                RepositoryError::Unavailable(error.to_string())
            }
            _ => RepositoryError::Query(error.to_string()),
        },
        _ => RepositoryError::Query(error.to_string()),
    }
}

fn is_missing_schema(message: &str) -> bool {
    message.starts_with("no such table") || message.starts_with("no such column")
}

fn count(value: i64) -> usize {
    usize::try_from(value).unwrap_or_default()
}

fn bound(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

macro_rules! text_column {
    ($($kind:ty),+ $(,)?) => {$(
        impl ToSql for $kind {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.label()))
            }
        }

        impl FromSql for $kind {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let raw = value.as_str()?;
                <$kind>::parse(raw).ok_or_else(|| {
                    FromSqlError::Other(
                        format!("unknown {} `{}`", stringify!($kind), raw).into(),
                    )
                })
            }
        }
    )+};
}

text_column!(Role, EmploymentType, WorkMode, ExperienceLevel, ApplicationStatus);

const IDENTITY_COLUMNS: &str =
    "i.id, i.username, i.email, i.first_name, i.last_name, i.is_staff, i.created_at";

fn identity_from_row(row: &Row<'_>) -> rusqlite::Result<Identity> {
    Ok(Identity {
        id: IdentityId(row.get(0)?),
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        is_staff: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        identity_id: IdentityId(row.get(0)?),
        role: row.get(1)?,
        phone: row.get(2)?,
        location: row.get(3)?,
        bio: row.get(4)?,
        company_name: row.get(5)?,
        website: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn fetch_profile(connection: &Connection, id: IdentityId) -> rusqlite::Result<Option<Profile>> {
    connection
        .query_row(
            "SELECT identity_id, role, phone, location, bio, company_name, website, created_at
             FROM profiles WHERE identity_id = ?1",
            [id.0],
            profile_from_row,
        )
        .optional()
}

fn fetch_identity(connection: &Connection, id: IdentityId) -> rusqlite::Result<Option<Identity>> {
    connection
        .query_row(
            &format!("SELECT {IDENTITY_COLUMNS} FROM identities i WHERE i.id = ?1"),
            [id.0],
            identity_from_row,
        )
        .optional()
}

const JOB_COLUMNS: &str = "j.id, j.title, j.description, j.requirements, j.responsibilities, \
     j.salary_min, j.salary_max, j.salary_currency, j.location, j.employment_type, j.work_mode, \
     j.experience_level, j.skills_required, c.id, c.name, cat.id, cat.name, cat.slug, \
     j.posted_by, j.is_active, j.application_deadline, j.created_at, j.updated_at";

/// Index of the first column selected after [`JOB_COLUMNS`].
const AFTER_JOB: usize = 23;

const JOB_JOINS: &str = "JOIN companies c ON c.id = j.company_id \
     LEFT JOIN categories cat ON cat.id = j.category_id";

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    let category = match row.get::<_, Option<i64>>(15)? {
        Some(id) => Some(Category {
            id: CategoryId(id),
            name: row.get(16)?,
            slug: row.get(17)?,
        }),
        None => None,
    };

    Ok(Job {
        id: JobId(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        requirements: row.get(3)?,
        responsibilities: row.get(4)?,
        salary_min: row.get(5)?,
        salary_max: row.get(6)?,
        salary_currency: row.get(7)?,
        location: row.get(8)?,
        employment_type: row.get(9)?,
        work_mode: row.get(10)?,
        experience_level: row.get(11)?,
        skills_required: row.get(12)?,
        company: Company {
            id: CompanyId(row.get(13)?),
            name: row.get(14)?,
        },
        category,
        posted_by: IdentityId(row.get(18)?),
        is_active: row.get(19)?,
        application_deadline: row.get(20)?,
        created_at: row.get(21)?,
        updated_at: row.get(22)?,
    })
}

fn fetch_job(connection: &Connection, id: JobId) -> rusqlite::Result<Job> {
    connection.query_row(
        &format!("SELECT {JOB_COLUMNS} FROM jobs j {JOB_JOINS} WHERE j.id = ?1"),
        [id.0],
        job_from_row,
    )
}

fn search_column(field: SearchField) -> &'static str {
    match field {
        SearchField::Title => "j.title",
        SearchField::Description => "j.description",
        SearchField::CompanyName => "c.name",
        SearchField::Skills => "j.skills_required",
    }
}

/// Translate the filter set into a `WHERE` clause plus its bound values.
fn job_conditions(filters: &JobFilters) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if filters.active_only {
        clauses.push("j.is_active = 1".to_string());
    }
    for text in &filters.text {
        let alternatives: Vec<String> = text
            .fields
            .iter()
            .map(|field| {
                format!(
                    "instr(fold_case({}), fold_case(?)) > 0",
                    search_column(*field)
                )
            })
            .collect();
        values.extend(text.fields.iter().map(|_| Value::Text(text.needle.clone())));
        clauses.push(format!("({})", alternatives.join(" OR ")));
    }
    match &filters.location {
        Some(LocationMatch::Contains(needle)) => {
            clauses.push("instr(fold_case(j.location), fold_case(?)) > 0".to_string());
            values.push(Value::Text(needle.clone()));
        }
        Some(LocationMatch::Exact(location)) => {
            clauses.push("j.location = ?".to_string());
            values.push(Value::Text(location.clone()));
        }
        None => {}
    }
    let exact = [
        ("cat.slug", &filters.category_slug),
        ("j.employment_type", &filters.employment_type),
        ("j.work_mode", &filters.work_mode),
        ("j.experience_level", &filters.experience_level),
    ];
    for (column, value) in exact {
        if let Some(value) = value {
            clauses.push(format!("{column} = ?"));
            values.push(Value::Text(value.clone()));
        }
    }
    if let Some(floor) = filters.salary_at_least {
        clauses.push("j.salary_min IS NOT NULL AND j.salary_min >= ?".to_string());
        values.push(Value::Integer(floor));
    }

    let clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (clause, values)
}

fn order_clause(ordering: JobOrdering) -> &'static str {
    match ordering {
        JobOrdering::NewestFirst => "ORDER BY j.created_at DESC, j.id DESC",
        JobOrdering::OldestFirst => "ORDER BY j.created_at ASC, j.id ASC",
        JobOrdering::SalaryAscending => "ORDER BY j.salary_min ASC, j.id ASC",
        JobOrdering::SalaryDescending => "ORDER BY j.salary_min DESC, j.id DESC",
    }
}

const APPLICATION_SELECT: &str = "SELECT a.id, a.job_id, j.title, c.name, j.posted_by, \
     a.applicant_id, u.username, a.cover_letter, a.status, a.created_at, a.updated_at \
     FROM applications a \
     JOIN jobs j ON j.id = a.job_id \
     JOIN companies c ON c.id = j.company_id \
     JOIN identities u ON u.id = a.applicant_id";

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<Application> {
    Ok(Application {
        id: ApplicationId(row.get(0)?),
        job_id: JobId(row.get(1)?),
        job_title: row.get(2)?,
        company_name: row.get(3)?,
        job_owner: IdentityId(row.get(4)?),
        applicant: IdentityId(row.get(5)?),
        applicant_username: row.get(6)?,
        cover_letter: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn fetch_application(
    connection: &Connection,
    id: ApplicationId,
) -> rusqlite::Result<Option<Application>> {
    connection
        .query_row(
            &format!("{APPLICATION_SELECT} WHERE a.id = ?1"),
            [id.0],
            application_from_row,
        )
        .optional()
}

fn scope_condition(scope: &ApplicationScope) -> (String, Vec<Value>) {
    match scope {
        ApplicationScope::Applicant(applicant) => (
            "WHERE a.applicant_id = ?".to_string(),
            vec![Value::Integer(applicant.0)],
        ),
        ApplicationScope::Job { job, status: None } => {
            ("WHERE a.job_id = ?".to_string(), vec![Value::Integer(job.0)])
        }
        ApplicationScope::Job {
            job,
            status: Some(status),
        } => (
            "WHERE a.job_id = ? AND a.status = ?".to_string(),
            vec![Value::Integer(job.0), Value::Text(status.clone())],
        ),
        ApplicationScope::JobOwner(owner) => (
            "WHERE j.posted_by = ?".to_string(),
            vec![Value::Integer(owner.0)],
        ),
    }
}

fn testimonial_from_row(row: &Row<'_>) -> rusqlite::Result<Testimonial> {
    Ok(Testimonial {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        company: row.get(3)?,
        content: row.get(4)?,
        rating: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn faq_from_row(row: &Row<'_>) -> rusqlite::Result<Faq> {
    Ok(Faq {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        order: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const TESTIMONIAL_SELECT: &str = "SELECT id, name, position, company, content, rating, \
     is_active, created_at FROM testimonials WHERE is_active = 1";

const FAQ_SELECT: &str =
    "SELECT id, question, answer, sort_order, is_active, created_at FROM faqs WHERE is_active = 1";

impl IdentityRepository for SqliteStore {
    fn create_identity(&self, identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let now = stamp(Utc::now());
        self.write(|tx| {
            tx.execute(
                "INSERT INTO identities
                 (username, email, first_name, last_name, password_hash, is_staff, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    identity.username,
                    identity.email,
                    identity.first_name,
                    identity.last_name,
                    identity.password_hash,
                    identity.is_staff,
                    now,
                ],
            )?;
            let id = IdentityId(tx.last_insert_rowid());
            let details = &identity.profile;
            tx.execute(
                "INSERT INTO profiles
                 (identity_id, role, phone, location, bio, company_name, website, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.0,
                    identity.role,
                    details.phone,
                    details.location,
                    details.bio,
                    details.company_name,
                    details.website,
                    now,
                ],
            )?;
            fetch_identity(tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    fn identity(&self, id: IdentityId) -> Result<Option<Identity>, RepositoryError> {
        self.read(|connection| fetch_identity(connection, id))
    }

    fn credentials(&self, username: &str) -> Result<Option<Credentials>, RepositoryError> {
        self.read(|connection| {
            connection
                .query_row(
                    &format!(
                        "SELECT {IDENTITY_COLUMNS}, i.password_hash
                         FROM identities i WHERE i.username = ?1"
                    ),
                    [username],
                    |row| {
                        Ok(Credentials {
                            identity: identity_from_row(row)?,
                            password_hash: row.get(7)?,
                        })
                    },
                )
                .optional()
        })
    }

    fn username_taken(&self, username: &str) -> Result<bool, RepositoryError> {
        self.read(|connection| {
            connection.query_row(
                "SELECT EXISTS (SELECT 1 FROM identities WHERE username = ?1)",
                [username],
                |row| row.get(0),
            )
        })
    }

    fn profile(&self, id: IdentityId) -> Result<Option<Profile>, RepositoryError> {
        self.read(|connection| fetch_profile(connection, id))
    }

    fn update_profile(
        &self,
        id: IdentityId,
        details: &ProfileDetails,
    ) -> Result<Profile, RepositoryError> {
        self.write(|tx| {
            let changed = tx.execute(
                "UPDATE profiles
                 SET phone = ?2, location = ?3, bio = ?4, company_name = ?5, website = ?6
                 WHERE identity_id = ?1",
                params![
                    id.0,
                    details.phone,
                    details.location,
                    details.bio,
                    details.company_name,
                    details.website,
                ],
            )?;
            if changed == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            fetch_profile(tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    fn create_session(&self, id: IdentityId, token: &str) -> Result<(), RepositoryError> {
        self.write(|tx| {
            tx.execute(
                "INSERT INTO sessions (token, identity_id, created_at) VALUES (?1, ?2, ?3)",
                params![token, id.0, stamp(Utc::now())],
            )
        })
        .map(|_| ())
    }

    fn identity_for_token(&self, token: &str) -> Result<Option<Identity>, RepositoryError> {
        self.read(|connection| {
            connection
                .query_row(
                    &format!(
                        "SELECT {IDENTITY_COLUMNS} FROM sessions s
                         JOIN identities i ON i.id = s.identity_id
                         WHERE s.token = ?1"
                    ),
                    [token],
                    identity_from_row,
                )
                .optional()
        })
    }
}

impl CatalogRepository for SqliteStore {
    fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
        self.read(|connection| {
            let mut statement = connection.prepare("SELECT id, name FROM companies ORDER BY name")?;
            let rows = statement.query_map([], |row| {
                Ok(Company {
                    id: CompanyId(row.get(0)?),
                    name: row.get(1)?,
                })
            })?;
            rows.collect()
        })
    }

    fn company(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        self.read(|connection| {
            connection
                .query_row("SELECT id, name FROM companies WHERE id = ?1", [id.0], |row| {
                    Ok(Company {
                        id: CompanyId(row.get(0)?),
                        name: row.get(1)?,
                    })
                })
                .optional()
        })
    }

    fn ensure_company(&self, name: &str) -> Result<(Company, bool), RepositoryError> {
        self.write(|tx| {
            let existing: Option<i64> = tx
                .query_row("SELECT id FROM companies WHERE name = ?1", [name], |row| {
                    row.get(0)
                })
                .optional()?;
            let (id, created) = match existing {
                Some(id) => (id, false),
                None => {
                    tx.execute("INSERT INTO companies (name) VALUES (?1)", [name])?;
                    (tx.last_insert_rowid(), true)
                }
            };
            Ok((
                Company {
                    id: CompanyId(id),
                    name: name.to_string(),
                },
                created,
            ))
        })
    }

    fn total_companies(&self) -> Result<usize, RepositoryError> {
        self.read(|connection| {
            connection.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get::<_, i64>(0))
        })
        .map(count)
    }

    fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.read(|connection| {
            let mut statement =
                connection.prepare("SELECT id, name, slug FROM categories ORDER BY name")?;
            let rows = statement.query_map([], |row| {
                Ok(Category {
                    id: CategoryId(row.get(0)?),
                    name: row.get(1)?,
                    slug: row.get(2)?,
                })
            })?;
            rows.collect()
        })
    }

    fn category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        self.read(|connection| {
            connection
                .query_row(
                    "SELECT id, name, slug FROM categories WHERE id = ?1",
                    [id.0],
                    |row| {
                        Ok(Category {
                            id: CategoryId(row.get(0)?),
                            name: row.get(1)?,
                            slug: row.get(2)?,
                        })
                    },
                )
                .optional()
        })
    }

    fn ensure_category(
        &self,
        name: &str,
        slug: &str,
    ) -> Result<(Category, bool), RepositoryError> {
        self.write(|tx| {
            let existing: Option<(i64, String)> = tx
                .query_row(
                    "SELECT id, slug FROM categories WHERE name = ?1",
                    [name],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let (id, slug, created) = match existing {
                Some((id, stored)) => (id, stored, false),
                None => {
                    tx.execute(
                        "INSERT INTO categories (name, slug) VALUES (?1, ?2)",
                        [name, slug],
                    )?;
                    (tx.last_insert_rowid(), slug.to_string(), true)
                }
            };
            Ok((
                Category {
                    id: CategoryId(id),
                    name: name.to_string(),
                    slug,
                },
                created,
            ))
        })
    }

    fn testimonials(&self) -> Result<Vec<Testimonial>, RepositoryError> {
        self.read(|connection| {
            let mut statement = connection.prepare(&format!(
                "{TESTIMONIAL_SELECT} ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = statement.query_map([], testimonial_from_row)?;
            rows.collect()
        })
    }

    fn testimonial(&self, id: i64) -> Result<Option<Testimonial>, RepositoryError> {
        self.read(|connection| {
            connection
                .query_row(
                    &format!("{TESTIMONIAL_SELECT} AND id = ?1"),
                    [id],
                    testimonial_from_row,
                )
                .optional()
        })
    }

    fn ensure_testimonial(&self, testimonial: &NewTestimonial) -> Result<bool, RepositoryError> {
        self.write(|tx| {
            let exists: bool = tx.query_row(
                "SELECT EXISTS (SELECT 1 FROM testimonials WHERE name = ?1)",
                [&testimonial.name],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO testimonials
                 (name, position, company, content, rating, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
                params![
                    testimonial.name,
                    testimonial.position,
                    testimonial.company,
                    testimonial.content,
                    testimonial.rating,
                    stamp(Utc::now()),
                ],
            )?;
            Ok(true)
        })
    }

    fn faqs(&self) -> Result<Vec<Faq>, RepositoryError> {
        self.read(|connection| {
            let mut statement = connection.prepare(&format!(
                "{FAQ_SELECT} ORDER BY sort_order ASC, created_at DESC, id DESC"
            ))?;
            let rows = statement.query_map([], faq_from_row)?;
            rows.collect()
        })
    }

    fn faq(&self, id: i64) -> Result<Option<Faq>, RepositoryError> {
        self.read(|connection| {
            connection
                .query_row(&format!("{FAQ_SELECT} AND id = ?1"), [id], faq_from_row)
                .optional()
        })
    }

    fn ensure_faq(&self, faq: &NewFaq) -> Result<bool, RepositoryError> {
        self.write(|tx| {
            let exists: bool = tx.query_row(
                "SELECT EXISTS (SELECT 1 FROM faqs WHERE question = ?1)",
                [&faq.question],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO faqs (question, answer, sort_order, is_active, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![faq.question, faq.answer, faq.order, stamp(Utc::now())],
            )?;
            Ok(true)
        })
    }
}

impl JobRepository for SqliteStore {
    fn insert_job(&self, owner: IdentityId, draft: &JobDraft) -> Result<Job, RepositoryError> {
        let now = stamp(Utc::now());
        self.write(|tx| {
            tx.execute(
                "INSERT INTO jobs
                 (title, description, requirements, responsibilities, salary_min, salary_max,
                  salary_currency, location, employment_type, work_mode, experience_level,
                  skills_required, company_id, category_id, posted_by, is_active,
                  application_deadline, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 1,
                         ?16, ?17, ?17)",
                params![
                    draft.title,
                    draft.description,
                    draft.requirements,
                    draft.responsibilities,
                    draft.salary_min,
                    draft.salary_max,
                    draft.salary_currency,
                    draft.location,
                    draft.employment_type,
                    draft.work_mode,
                    draft.experience_level,
                    draft.skills_required,
                    draft.company_id.0,
                    draft.category_id.map(|category| category.0),
                    owner.0,
                    draft.application_deadline,
                    now,
                ],
            )?;
            fetch_job(tx, JobId(tx.last_insert_rowid()))
        })
    }

    fn update_job(&self, id: JobId, draft: &JobDraft) -> Result<Job, RepositoryError> {
        self.write(|tx| {
            let changed = tx.execute(
                "UPDATE jobs SET
                 title = ?2, description = ?3, requirements = ?4, responsibilities = ?5,
                 salary_min = ?6, salary_max = ?7, salary_currency = ?8, location = ?9,
                 employment_type = ?10, work_mode = ?11, experience_level = ?12,
                 skills_required = ?13, company_id = ?14, category_id = ?15,
                 application_deadline = ?16, updated_at = ?17
                 WHERE id = ?1",
                params![
                    id.0,
                    draft.title,
                    draft.description,
                    draft.requirements,
                    draft.responsibilities,
                    draft.salary_min,
                    draft.salary_max,
                    draft.salary_currency,
                    draft.location,
                    draft.employment_type,
                    draft.work_mode,
                    draft.experience_level,
                    draft.skills_required,
                    draft.company_id.0,
                    draft.category_id.map(|category| category.0),
                    draft.application_deadline,
                    stamp(Utc::now()),
                ],
            )?;
            if changed == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            fetch_job(tx, id)
        })
    }

    fn set_job_active(&self, id: JobId, active: bool) -> Result<Job, RepositoryError> {
        self.write(|tx| {
            let changed = tx.execute(
                "UPDATE jobs SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.0, active, stamp(Utc::now())],
            )?;
            if changed == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            fetch_job(tx, id)
        })
    }

    fn delete_job(&self, id: JobId) -> Result<(), RepositoryError> {
        self.write(|tx| {
            match tx.execute("DELETE FROM jobs WHERE id = ?1", [id.0])? {
                0 => Err(rusqlite::Error::QueryReturnedNoRows),
                _ => Ok(()),
            }
        })
    }

    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        self.read(|connection| fetch_job(connection, id).optional())
    }

    fn count_jobs(&self, filters: &JobFilters) -> Result<usize, RepositoryError> {
        let (clause, values) = job_conditions(filters);
        self.read(|connection| {
            connection.query_row(
                &format!("SELECT COUNT(*) FROM jobs j {JOB_JOINS} {clause}"),
                params_from_iter(values.iter()),
                |row| row.get::<_, i64>(0),
            )
        })
        .map(count)
    }

    fn find_jobs(
        &self,
        filters: &JobFilters,
        ordering: JobOrdering,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>, RepositoryError> {
        let (clause, mut values) = job_conditions(filters);
        values.push(Value::Integer(bound(limit)));
        values.push(Value::Integer(bound(offset)));
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs j {JOB_JOINS} {clause} {} LIMIT ? OFFSET ?",
            order_clause(ordering)
        );

        self.read(|connection| {
            let mut statement = connection.prepare(&sql)?;
            let rows = statement.query_map(params_from_iter(values.iter()), job_from_row)?;
            rows.collect()
        })
    }

    fn owner_jobs(&self, owner: IdentityId) -> Result<Vec<JobSummary>, RepositoryError> {
        self.read(|connection| {
            let mut statement = connection.prepare(&format!(
                "SELECT {JOB_COLUMNS},
                   (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.id)
                 FROM jobs j {JOB_JOINS}
                 WHERE j.posted_by = ?1
                 ORDER BY j.created_at DESC, j.id DESC"
            ))?;
            let rows = statement.query_map([owner.0], |row| {
                Ok(JobSummary {
                    job: job_from_row(row)?,
                    application_count: count(row.get(AFTER_JOB)?),
                })
            })?;
            rows.collect()
        })
    }

    fn total_jobs(&self) -> Result<usize, RepositoryError> {
        self.read(|connection| {
            connection.query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get::<_, i64>(0))
        })
        .map(count)
    }
}

impl ApplicationRepository for SqliteStore {
    fn insert_application(
        &self,
        job: JobId,
        applicant: IdentityId,
        cover_letter: &str,
    ) -> Result<Application, RepositoryError> {
        let now = stamp(Utc::now());
        self.write(|tx| {
            tx.execute(
                "INSERT INTO applications
                 (job_id, applicant_id, cover_letter, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![job.0, applicant.0, cover_letter, ApplicationStatus::Pending, now],
            )?;
            fetch_application(tx, ApplicationId(tx.last_insert_rowid()))?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.read(|connection| fetch_application(connection, id))
    }

    fn application_for(
        &self,
        job: JobId,
        applicant: IdentityId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.read(|connection| {
            connection
                .query_row(
                    &format!("{APPLICATION_SELECT} WHERE a.job_id = ?1 AND a.applicant_id = ?2"),
                    [job.0, applicant.0],
                    application_from_row,
                )
                .optional()
        })
    }

    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        self.write(|tx| {
            let changed = tx.execute(
                "UPDATE applications SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.0, status, stamp(Utc::now())],
            )?;
            if changed == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            fetch_application(tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    fn count_applications(&self, scope: &ApplicationScope) -> Result<usize, RepositoryError> {
        let (clause, values) = scope_condition(scope);
        self.read(|connection| {
            connection.query_row(
                &format!(
                    "SELECT COUNT(*) FROM applications a
                     JOIN jobs j ON j.id = a.job_id {clause}"
                ),
                params_from_iter(values.iter()),
                |row| row.get::<_, i64>(0),
            )
        })
        .map(count)
    }

    fn applications(
        &self,
        scope: &ApplicationScope,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Application>, RepositoryError> {
        let (clause, mut values) = scope_condition(scope);
        values.push(Value::Integer(bound(limit)));
        values.push(Value::Integer(bound(offset)));
        let sql = format!(
            "{APPLICATION_SELECT} {clause} ORDER BY a.created_at DESC, a.id DESC LIMIT ? OFFSET ?"
        );

        self.read(|connection| {
            let mut statement = connection.prepare(&sql)?;
            let rows =
                statement.query_map(params_from_iter(values.iter()), application_from_row)?;
            rows.collect()
        })
    }
}

impl BookmarkRepository for SqliteStore {
    fn save_job(&self, user: IdentityId, job: JobId) -> Result<bool, RepositoryError> {
        self.write(|tx| {
            tx.execute(
                "INSERT OR IGNORE INTO saved_jobs (user_id, job_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![user.0, job.0, stamp(Utc::now())],
            )
        })
        .map(|inserted| inserted > 0)
    }

    fn unsave_job(&self, user: IdentityId, job: JobId) -> Result<bool, RepositoryError> {
        self.write(|tx| {
            tx.execute(
                "DELETE FROM saved_jobs WHERE user_id = ?1 AND job_id = ?2",
                [user.0, job.0],
            )
        })
        .map(|removed| removed > 0)
    }

    fn is_saved(&self, user: IdentityId, job: JobId) -> Result<bool, RepositoryError> {
        self.read(|connection| {
            connection.query_row(
                "SELECT EXISTS (SELECT 1 FROM saved_jobs WHERE user_id = ?1 AND job_id = ?2)",
                [user.0, job.0],
                |row| row.get(0),
            )
        })
    }

    fn count_saved(&self, user: IdentityId) -> Result<usize, RepositoryError> {
        self.read(|connection| {
            connection.query_row(
                "SELECT COUNT(*) FROM saved_jobs WHERE user_id = ?1",
                [user.0],
                |row| row.get::<_, i64>(0),
            )
        })
        .map(count)
    }

    fn saved_jobs(
        &self,
        user: IdentityId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SavedJob>, RepositoryError> {
        self.read(|connection| {
            let mut statement = connection.prepare(&format!(
                "SELECT {JOB_COLUMNS}, s.user_id, s.created_at
                 FROM saved_jobs s
                 JOIN jobs j ON j.id = s.job_id {JOB_JOINS}
                 WHERE s.user_id = ?1
                 ORDER BY s.created_at DESC, s.id DESC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = statement.query_map(params![user.0, bound(limit), bound(offset)], |row| {
                Ok(SavedJob {
                    job: job_from_row(row)?,
                    user: IdentityId(row.get(AFTER_JOB)?),
                    created_at: row.get(AFTER_JOB + 1)?,
                })
            })?;
            rows.collect()
        })
    }
}

impl StorageProbe for SqliteStore {
    fn engine_version(&self) -> Result<String, RepositoryError> {
        self.read(|connection| {
            connection.query_row("SELECT sqlite_version()", [], |row| row.get(0))
        })
    }

    fn table_names(&self) -> Result<Vec<String>, RepositoryError> {
        self.read(|connection| {
            let mut statement = connection.prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )?;
            let rows = statement.query_map([], |row| row.get(0))?;
            rows.collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::search::TextSearch;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        store.migrate().expect("migrations apply");
        store
    }

    fn employer(store: &SqliteStore, username: &str) -> Identity {
        store
            .create_identity(NewIdentity {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "Erin".to_string(),
                last_name: "Okafor".to_string(),
                password_hash: "not-a-real-hash".to_string(),
                is_staff: false,
                role: Role::Employer,
                profile: ProfileDetails::default(),
            })
            .expect("identity created")
    }

    fn draft(store: &SqliteStore, title: &str) -> JobDraft {
        let (company, _) = store.ensure_company("Acme Robotics").expect("company");
        JobDraft {
            title: title.to_string(),
            description: "Build firmware".to_string(),
            requirements: String::new(),
            responsibilities: String::new(),
            salary_min: Some(90000),
            salary_max: None,
            salary_currency: "USD".to_string(),
            location: "Berlin".to_string(),
            employment_type: EmploymentType::Contract,
            work_mode: WorkMode::Hybrid,
            experience_level: ExperienceLevel::Mid,
            skills_required: "Rust, Embedded".to_string(),
            company_id: company.id,
            category_id: None,
            application_deadline: None,
        }
    }

    #[test]
    fn unmigrated_database_reports_unavailable() {
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        let error = store
            .count_jobs(&JobFilters::default())
            .expect_err("jobs table missing");
        assert!(matches!(error, RepositoryError::Unavailable(_)));
    }

    #[test]
    fn identity_and_profile_are_created_together() {
        let store = store();
        let identity = employer(&store, "erin");
        let profile = store
            .profile(identity.id)
            .expect("profile query")
            .expect("profile exists");
        assert!(profile.is_employer());

        let duplicate = store.create_identity(NewIdentity {
            username: "erin".to_string(),
            email: "other@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "x".to_string(),
            is_staff: false,
            role: Role::JobSeeker,
            profile: ProfileDetails::default(),
        });
        assert!(matches!(duplicate, Err(RepositoryError::Conflict)));
    }

    #[test]
    fn job_round_trips_through_storage() {
        let store = store();
        let owner = employer(&store, "erin");
        let job = store
            .insert_job(owner.id, &draft(&store, "Firmware Engineer"))
            .expect("job inserted");

        let loaded = store.job(job.id).expect("query").expect("job exists");
        assert_eq!(loaded.title, "Firmware Engineer");
        assert_eq!(loaded.company.name, "Acme Robotics");
        assert_eq!(loaded.employment_type, EmploymentType::Contract);
        assert!(loaded.is_active);
        assert!(loaded.category.is_none());
    }

    #[test]
    fn text_search_is_case_insensitive_across_fields() {
        let store = store();
        let owner = employer(&store, "erin");
        store
            .insert_job(owner.id, &draft(&store, "Firmware Engineer"))
            .expect("job inserted");

        let filters = JobFilters {
            active_only: true,
            text: vec![TextSearch {
                needle: "EMBEDDED".to_string(),
                fields: crate::board::search::WEB_SEARCH_FIELDS,
            }],
            ..JobFilters::default()
        };
        assert_eq!(store.count_jobs(&filters).expect("count"), 1);

        let api_filters = JobFilters {
            text: vec![TextSearch {
                needle: "embedded".to_string(),
                fields: crate::board::search::API_SEARCH_FIELDS,
            }],
            ..filters
        };
        assert_eq!(store.count_jobs(&api_filters).expect("count"), 0);
    }

    #[test]
    fn deleting_a_job_cascades_to_bookmarks() {
        let store = store();
        let owner = employer(&store, "erin");
        let job = store
            .insert_job(owner.id, &draft(&store, "Firmware Engineer"))
            .expect("job inserted");

        assert!(store.save_job(owner.id, job.id).expect("save"));
        assert!(!store.save_job(owner.id, job.id).expect("save again"));
        store.delete_job(job.id).expect("delete");

        assert_eq!(store.count_saved(owner.id).expect("count"), 0);
        assert!(matches!(store.delete_job(job.id), Err(RepositoryError::NotFound)));
    }

    #[test]
    fn duplicate_application_is_a_conflict() {
        let store = store();
        let owner = employer(&store, "erin");
        let job = store
            .insert_job(owner.id, &draft(&store, "Firmware Engineer"))
            .expect("job inserted");

        store
            .insert_application(job.id, owner.id, "hello")
            .expect("first application");
        let second = store.insert_application(job.id, owner.id, "again");
        assert!(matches!(second, Err(RepositoryError::Conflict)));
    }

    #[test]
    fn table_names_exclude_sqlite_internals() {
        let store = store();
        let tables = store.table_names().expect("tables");
        assert!(tables.contains(&"jobs".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
        assert!(tables.iter().all(|name| !name.starts_with("sqlite_")));
    }
}
