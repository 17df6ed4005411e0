use crate::cli::ServeArgs;
use crate::infra::{seed_demo_shelter, AppState, InMemoryPresenceStore, InMemoryPresenceTracker};
use crate::routes::with_presence_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use site_presence::config::AppConfig;
use site_presence::error::AppError;
use site_presence::presence::PresenceService;
use site_presence::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let store = Arc::new(InMemoryPresenceStore::default());
    let tracker = Arc::new(InMemoryPresenceTracker::default());
    if args.seed_demo {
        seed_demo_shelter(&store, &tracker);
    }
    let presence_service = Arc::new(PresenceService::new(
        store,
        tracker,
        config.presence.evaluation(),
    ));

    let app = with_presence_routes(presence_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, seeded = args.seed_demo, "site presence service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
