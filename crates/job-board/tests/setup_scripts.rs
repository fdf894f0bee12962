use std::path::PathBuf;

use chrono::NaiveDate;
use job_board::board::{CatalogRepository, IdentityRepository, JobRepository};
use job_board::config::DatabaseLocation;
use job_board::setup::{
    create_admin, run_migrations, seed_sample_data, setup_database, AdminOutcome,
    SampleDataOutcome, ADMIN_USERNAME, SAMPLE_EMPLOYERS, SAMPLE_JOBS, SAMPLE_JOB_SEEKERS,
};
use job_board::storage::{SqliteStore, MIGRATIONS};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

fn fresh_store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("in-memory store")
}

/// Removes the database file when the test finishes.
struct ScratchDatabase(PathBuf);

impl ScratchDatabase {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "job-board-{}-{}.sqlite3",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Self(path)
    }

    fn location(&self) -> DatabaseLocation {
        DatabaseLocation::File(self.0.clone())
    }
}

impl Drop for ScratchDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[test]
fn migrations_report_tables_and_run_once() {
    let store = fresh_store();

    let first = run_migrations(&store).expect("first run");
    assert!(first.tables_before.is_empty());
    assert_eq!(first.applied.len(), MIGRATIONS.len());
    for table in ["identities", "profiles", "companies", "categories", "jobs", "applications"] {
        assert!(
            first.tables_after.iter().any(|name| name == table),
            "{table} created"
        );
    }

    let second = run_migrations(&store).expect("second run");
    assert!(second.applied.is_empty());
    assert_eq!(second.tables_before, second.tables_after);
}

#[test]
fn seeding_twice_does_not_duplicate_rows() {
    let store = fresh_store();
    store.migrate().expect("migrations apply");

    let first = seed_sample_data(&store, today()).expect("first seed");
    assert_eq!(first.companies_created, 20);
    assert_eq!(first.categories_created, 10);
    assert_eq!(first.employers_created, SAMPLE_EMPLOYERS);
    assert_eq!(first.job_seekers_created, SAMPLE_JOB_SEEKERS);
    assert_eq!(first.jobs_created, SAMPLE_JOBS);
    assert_eq!(first.testimonials_created, 3);
    assert_eq!(first.faqs_created, 6);

    let second = seed_sample_data(&store, today()).expect("second seed");
    assert_eq!(second.companies_created, 0);
    assert_eq!(second.employers_created, 0);
    assert_eq!(second.jobs_created, 0);
    assert_eq!(second.faqs_created, 0);

    assert_eq!(store.total_jobs().expect("jobs"), SAMPLE_JOBS);
    assert_eq!(store.total_companies().expect("companies"), 20);
    assert_eq!(store.testimonials().expect("testimonials").len(), 3);
}

#[test]
fn sample_accounts_carry_their_roles() {
    let store = fresh_store();
    store.migrate().expect("migrations apply");
    seed_sample_data(&store, today()).expect("seed");

    let employer = store
        .credentials("employer1")
        .expect("lookup")
        .expect("employer1 exists");
    let profile = store
        .profile(employer.identity.id)
        .expect("lookup")
        .expect("profile");
    assert!(profile.is_employer());
    assert!(!profile.company_name.is_empty());

    let seeker = store
        .credentials("jobseeker10")
        .expect("lookup")
        .expect("jobseeker10 exists");
    let profile = store
        .profile(seeker.identity.id)
        .expect("lookup")
        .expect("profile");
    assert!(profile.is_job_seeker());
}

#[test]
fn admin_is_created_once() {
    let store = fresh_store();
    store.migrate().expect("migrations apply");

    let created = create_admin(&store, "Adm1n#Secret").expect("admin");
    let AdminOutcome::Created(identity) = created else {
        panic!("expected a new admin");
    };
    assert_eq!(identity.username, ADMIN_USERNAME);
    assert!(identity.is_staff);

    let again = create_admin(&store, "Adm1n#Secret").expect("second call");
    assert_eq!(again, AdminOutcome::AlreadyExists);
}

#[test]
fn setup_skips_seeding_when_jobs_exist() {
    let scratch = ScratchDatabase::new("setup");

    {
        let store = SqliteStore::open(&scratch.location()).expect("file store");
        let report = setup_database(&store, "Adm1n#Secret", today()).expect("first setup");
        assert!(matches!(report.admin, Ok(AdminOutcome::Created(_))));
        assert!(matches!(report.sample_data, SampleDataOutcome::Seeded(_)));
    }

    let store = SqliteStore::open(&scratch.location()).expect("reopened store");
    let report = setup_database(&store, "Adm1n#Secret", today()).expect("second setup");
    assert!(report.migrations.applied.is_empty());
    assert_eq!(report.admin, Ok(AdminOutcome::AlreadyExists));
    assert_eq!(
        report.sample_data,
        SampleDataOutcome::AlreadyPresent(SAMPLE_JOBS)
    );
    assert_eq!(store.total_jobs().expect("jobs"), SAMPLE_JOBS);
}
