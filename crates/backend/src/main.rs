pub mod api;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::http::{header, Method};
    use axum::middleware;
    use contracts::usecases::common::UseCaseMetadata;
    use contracts::usecases::u101_import_items::ImportItems;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};
    use usecases::u101_import_items::{
        spawn_session_cleanup, HttpItemsApi, ImportExecutor, SessionStore,
    };

    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    tracing::info!("Items API: {}", config.items_api.base_url);

    let api = Arc::new(HttpItemsApi::new(&config.items_api)?);
    let store = SessionStore::new();
    let executor = Arc::new(ImportExecutor::new(
        api,
        store.clone(),
        config.import.file_limits(),
    ));
    spawn_session_cleanup(store, config.import.session_ttl_hours);
    tracing::info!(
        "UseCase {} ready: {}",
        ImportItems::full_name(),
        ImportItems::display_name()
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = routes::configure_routes(executor)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
