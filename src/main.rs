use axum::{extract::Request, Router, ServiceExt};
use gridnet::{
    apply_migrations, common_routes, connect_pool, endpoint_routes, ensure_database_exists,
    entity_routes, network_model, registry::store::ensure_endpoint_table, AppState,
    EndpointRegistry, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    limit::RequestBodyLimitLayer, normalize_path::NormalizePathLayer, trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();

    let default_directive = if settings.debug { "gridnet=debug" } else { "gridnet=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
        .init();

    ensure_database_exists(&settings.database_url).await?;
    let pool = connect_pool(&settings).await?;

    let model = Arc::new(network_model());
    apply_migrations(&pool, &model).await?;
    ensure_endpoint_table(&pool).await?;

    // Replays persisted registrations into the in-memory registry.
    let registry = EndpointRegistry::load(pool.clone(), &settings.api_prefix).await?;

    let state = AppState {
        pool,
        model,
        registry: Arc::new(registry),
        settings: Arc::new(settings.clone()),
    };

    let api = Router::new()
        .merge(endpoint_routes(state.clone()))
        .merge(entity_routes(state.clone()));
    let router = Router::new()
        .merge(common_routes(state.clone()))
        .nest(&settings.api_prefix, api)
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    // The original API used trailing-slash paths; accept both forms.
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}
