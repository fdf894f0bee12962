use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;

/// A forward-only schema step, applied at most once per database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "accounts",
        sql: r#"
CREATE TABLE identities (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT    NOT NULL UNIQUE,
    email         TEXT    NOT NULL,
    first_name    TEXT    NOT NULL DEFAULT '',
    last_name     TEXT    NOT NULL DEFAULT '',
    password_hash TEXT    NOT NULL,
    is_staff      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT    NOT NULL
);

CREATE TABLE profiles (
    identity_id  INTEGER PRIMARY KEY REFERENCES identities(id) ON DELETE CASCADE,
    role         TEXT    NOT NULL DEFAULT 'job_seeker',
    phone        TEXT    NOT NULL DEFAULT '',
    location     TEXT    NOT NULL DEFAULT '',
    bio          TEXT    NOT NULL DEFAULT '',
    company_name TEXT    NOT NULL DEFAULT '',
    website      TEXT    NOT NULL DEFAULT '',
    created_at   TEXT    NOT NULL
);

CREATE TABLE sessions (
    token       TEXT    PRIMARY KEY,
    identity_id INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    created_at  TEXT    NOT NULL
);
"#,
    },
    Migration {
        version: 2,
        name: "catalog",
        sql: r#"
CREATE TABLE companies (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT    NOT NULL UNIQUE
);

CREATE TABLE categories (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT    NOT NULL UNIQUE,
    slug TEXT    NOT NULL UNIQUE
);
"#,
    },
    Migration {
        version: 3,
        name: "jobs",
        sql: r#"
CREATE TABLE jobs (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    title                TEXT    NOT NULL,
    description          TEXT    NOT NULL,
    requirements         TEXT    NOT NULL DEFAULT '',
    responsibilities     TEXT    NOT NULL DEFAULT '',
    salary_min           INTEGER,
    salary_max           INTEGER,
    salary_currency      TEXT    NOT NULL DEFAULT 'USD',
    location             TEXT    NOT NULL,
    employment_type      TEXT    NOT NULL DEFAULT 'full_time',
    work_mode            TEXT    NOT NULL DEFAULT 'onsite',
    experience_level     TEXT    NOT NULL DEFAULT 'entry',
    skills_required      TEXT    NOT NULL DEFAULT '',
    company_id           INTEGER NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    category_id          INTEGER REFERENCES categories(id) ON DELETE SET NULL,
    posted_by            INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    is_active            INTEGER NOT NULL DEFAULT 1,
    application_deadline TEXT,
    created_at           TEXT    NOT NULL,
    updated_at           TEXT    NOT NULL
);

CREATE INDEX jobs_active_created ON jobs (is_active, created_at DESC);
CREATE INDEX jobs_posted_by ON jobs (posted_by);
CREATE INDEX jobs_category ON jobs (category_id);
"#,
    },
    Migration {
        version: 4,
        name: "applications_and_bookmarks",
        sql: r#"
CREATE TABLE applications (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id       INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    applicant_id INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    cover_letter TEXT    NOT NULL DEFAULT '',
    status       TEXT    NOT NULL DEFAULT 'pending',
    created_at   TEXT    NOT NULL,
    updated_at   TEXT    NOT NULL,
    UNIQUE (job_id, applicant_id)
);

CREATE TABLE saved_jobs (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    job_id     INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    created_at TEXT    NOT NULL,
    UNIQUE (user_id, job_id)
);

CREATE INDEX applications_applicant ON applications (applicant_id);
"#,
    },
    Migration {
        version: 5,
        name: "content",
        sql: r#"
CREATE TABLE testimonials (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    NOT NULL,
    position   TEXT    NOT NULL,
    company    TEXT    NOT NULL,
    content    TEXT    NOT NULL,
    rating     INTEGER NOT NULL DEFAULT 5 CHECK (rating BETWEEN 1 AND 5),
    is_active  INTEGER NOT NULL DEFAULT 1,
    created_at TEXT    NOT NULL
);

CREATE TABLE faqs (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    question   TEXT    NOT NULL,
    answer     TEXT    NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    is_active  INTEGER NOT NULL DEFAULT 1,
    created_at TEXT    NOT NULL
);
"#,
    },
];

const LEDGER: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    name       TEXT    NOT NULL,
    applied_at TEXT    NOT NULL
);
"#;

/// Apply every migration newer than the recorded ledger, each in its own
/// transaction. Returns the migrations applied by this call.
pub(crate) fn apply_pending(
    connection: &mut Connection,
) -> rusqlite::Result<Vec<&'static Migration>> {
    connection.execute_batch(LEDGER)?;

    let current: Option<i64> =
        connection.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    let current = current.unwrap_or(0);

    let mut applied = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let transaction = connection.transaction()?;
        transaction.execute_batch(migration.sql)?;
        transaction.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![migration.version, migration.name, super::sqlite::stamp(Utc::now())],
        )?;
        transaction.commit()?;

        info!(version = migration.version, name = migration.name, "migration applied");
        applied.push(migration);
    }

    Ok(applied)
}
