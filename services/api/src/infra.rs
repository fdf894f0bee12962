use chrono::NaiveDate;
use job_board::config::DatabaseLocation;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_database(raw: &str) -> Result<DatabaseLocation, String> {
    DatabaseLocation::parse(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_date_reports_the_expected_format() {
        assert_eq!(
            parse_date(" 2025-03-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"))
        );
        let err = parse_date("03/01/2025").expect_err("wrong format");
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn parse_database_accepts_urls_and_paths() {
        assert_eq!(parse_database(":memory:"), Ok(DatabaseLocation::InMemory));
        assert_eq!(
            parse_database("sqlite://data/board.db"),
            Ok(DatabaseLocation::File(PathBuf::from("data/board.db")))
        );
        assert!(parse_database("  ").is_err());
    }
}
