use std::collections::BTreeMap;
use std::env;

use serde::Serialize;
use tracing::warn;

use super::repository::BoardRepository;
use super::service::JobBoardService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    Error,
}

/// Deployment diagnostics. Always rendered, even when storage is down.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub database: String,
    pub tables: Vec<String>,
    pub environment: BTreeMap<&'static str, String>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_count: Option<usize>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// Snapshot of the process variables that matter when diagnosing a deploy.
pub fn environment_snapshot() -> BTreeMap<&'static str, String> {
    let mut snapshot = BTreeMap::new();
    let database = if env::var("DATABASE_URL").is_ok() {
        "set"
    } else {
        "not set"
    };
    snapshot.insert("DATABASE_URL", database.to_string());
    for key in ["APP_ENV", "APP_LOG_LEVEL"] {
        snapshot.insert(key, env::var(key).unwrap_or_else(|_| "not set".to_string()));
    }
    snapshot
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    pub fn health(&self) -> HealthReport {
        let mut report = HealthReport {
            status: HealthStatus::Ok,
            database: "unknown".to_string(),
            tables: Vec::new(),
            environment: environment_snapshot(),
            errors: Vec::new(),
            job_count: None,
            company_count: None,
        };

        match self.repository.engine_version() {
            Ok(version) => report.database = format!("connected: sqlite {version}"),
            Err(error) => {
                report.database = format!("error: {error}");
                report.errors.push(format!("Database connection: {error}"));
                report.status = HealthStatus::Error;
            }
        }

        match self.repository.table_names() {
            Ok(tables) => report.tables = tables,
            Err(error) => report.errors.push(format!("Table listing: {error}")),
        }

        match self.repository.total_jobs() {
            Ok(count) => report.job_count = Some(count),
            Err(error) => {
                report.errors.push(format!("Job table: {error}"));
                report.status = HealthStatus::Error;
            }
        }

        match self.repository.total_companies() {
            Ok(count) => report.company_count = Some(count),
            Err(error) => report.errors.push(format!("Company table: {error}")),
        }

        if !report.is_healthy() {
            warn!(errors = ?report.errors, "health check degraded");
        }
        report
    }
}
