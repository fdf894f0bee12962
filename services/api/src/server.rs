use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_board::board::JobBoardService;
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::setup;
use job_board::storage::SqliteStore;
use job_board::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(SqliteStore::open(&config.database.location)?);
    if args.migrate {
        setup::run_migrations(&store)?;
    }
    if let Err(err) = store.check_connection() {
        warn!(error = %err, "database not reachable; pages will report setup in progress");
    }
    let board_service = Arc::new(JobBoardService::new(store));

    let app = with_board_routes(board_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = config.environment.label(),
        database = %config.database.location,
        %addr,
        "job board ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
