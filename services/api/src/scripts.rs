use crate::infra::{parse_database, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use job_board::config::{AppConfig, DatabaseLocation};
use job_board::error::AppError;
use job_board::setup::{
    self, AdminOutcome, MigrationReport, SampleDataOutcome, SeedReport, ADMIN_EMAIL,
    ADMIN_USERNAME, SAMPLE_PASSWORD,
};
use job_board::storage::SqliteStore;
use job_board::telemetry;

#[derive(Args, Debug, Default)]
pub(crate) struct DatabaseArgs {
    /// Database path or sqlite:// URL (defaults to DATABASE_URL)
    #[arg(long, value_parser = parse_database)]
    pub(crate) database: Option<DatabaseLocation>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    #[command(flatten)]
    pub(crate) target: DatabaseArgs,
    /// Date application deadlines are computed from (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AdminArgs {
    #[command(flatten)]
    pub(crate) target: DatabaseArgs,
    /// Admin password (defaults to ADMIN_PASSWORD)
    #[arg(long)]
    pub(crate) password: Option<String>,
}

/// Configuration, telemetry, and an open store for a one-shot script.
fn prepare(target: DatabaseArgs) -> Result<(AppConfig, SqliteStore), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(location) = target.database {
        config.database.location = location;
    }
    telemetry::init(&config.telemetry)?;

    let store = SqliteStore::open(&config.database.location)?;
    println!("Database: {}", config.database.location);
    Ok((config, store))
}

pub(crate) fn run_migrate(args: DatabaseArgs) -> Result<(), AppError> {
    let (_, store) = prepare(args)?;
    let report = setup::run_migrations(&store)?;
    render_migrations(&report);
    Ok(())
}

pub(crate) fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let SeedArgs { target, today } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let (_, store) = prepare(target)?;

    let report = setup::seed_sample_data(&store, today)?;
    render_seed(&report);
    Ok(())
}

pub(crate) fn run_create_admin(args: AdminArgs) -> Result<(), AppError> {
    let AdminArgs { target, password } = args;
    let (config, store) = prepare(target)?;
    let password = password.unwrap_or(config.database.admin_password);

    match setup::create_admin(&store, &password)? {
        AdminOutcome::Created(identity) => {
            println!("Admin user created: {} <{}>", identity.username, identity.email);
        }
        AdminOutcome::AlreadyExists => println!("Admin user '{ADMIN_USERNAME}' already exists"),
    }
    Ok(())
}

pub(crate) fn run_setup(args: SeedArgs) -> Result<(), AppError> {
    let SeedArgs { target, today } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let (config, store) = prepare(target)?;

    println!("Starting database setup");
    let report = setup::setup_database(&store, &config.database.admin_password, today)?;
    render_migrations(&report.migrations);

    match &report.admin {
        Ok(AdminOutcome::Created(_)) => {
            println!("Admin user created: {ADMIN_USERNAME} <{ADMIN_EMAIL}>");
        }
        Ok(AdminOutcome::AlreadyExists) => println!("Admin user already exists"),
        Err(err) => println!("Admin creation failed: {err}"),
    }

    match &report.sample_data {
        SampleDataOutcome::Seeded(seed) => render_seed(seed),
        SampleDataOutcome::AlreadyPresent(jobs) => {
            println!("Sample data already exists ({jobs} jobs)");
        }
        SampleDataOutcome::Skipped(reason) => {
            println!("Sample data population skipped: {reason}");
        }
    }

    println!("Database setup completed");
    Ok(())
}

fn render_migrations(report: &MigrationReport) {
    println!("Tables before migrating: {}", listing(&report.tables_before));
    if report.applied.is_empty() {
        println!("No pending migrations");
    }
    for migration in &report.applied {
        println!("- applied {:04} {}", migration.version, migration.name);
    }
    println!("Tables after migrating: {}", listing(&report.tables_after));
}

fn render_seed(report: &SeedReport) {
    println!("Sample data populated");
    println!("- {} companies", report.companies_created);
    println!("- {} categories", report.categories_created);
    println!(
        "- {} employers | {} job seekers (password: {SAMPLE_PASSWORD})",
        report.employers_created, report.job_seekers_created
    );
    println!("- {} jobs", report.jobs_created);
    println!(
        "- {} testimonials | {} FAQs",
        report.testimonials_created, report.faqs_created
    );
}

fn listing(tables: &[String]) -> String {
    if tables.is_empty() {
        "(none)".to_string()
    } else {
        tables.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_listing_is_explicit() {
        assert_eq!(listing(&[]), "(none)");
        assert_eq!(
            listing(&["jobs".to_string(), "faqs".to_string()]),
            "jobs, faqs"
        );
    }
}
