//! NoSQL Console Web Server
//!
//! Axum-based server for the four-panel console page and its REST API.

pub mod error;
pub mod routes;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session
        .route("/session", get(routes::session::get_session))
        .route("/session/panel", put(routes::session::navigate))
        // Documents
        .route("/documents/{db}/{coll}/find", post(routes::documents::find))
        .route("/documents/{db}/{coll}/insert", post(routes::documents::insert))
        .route("/documents/{db}/{coll}/update", post(routes::documents::update))
        .route("/documents/{db}/{coll}/delete", post(routes::documents::delete))
        .route("/documents/{db}/{coll}/aggregate", post(routes::documents::aggregate))
        .route("/documents/{db}/{coll}/chart", post(routes::documents::chart))
        // Graph
        .route("/graph/nodes", post(routes::graph::create_node))
        .route("/graph/nodes/search", post(routes::graph::search_nodes))
        .route("/graph/relationships", post(routes::graph::create_relationship))
        .route("/graph/relationships/search", post(routes::graph::search_relationships))
        .route("/graph/query", post(routes::graph::run_query))
        .route("/graph/path", post(routes::graph::shortest_path))
        // Visualization
        .route("/graph/stats", get(routes::graph::stats))
        .route("/graph/view", get(routes::graph::view))
        .with_state(state.clone());

    Router::new()
        .route("/", get(routes::dashboard::index))
        .route("/health", get(routes::health::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server on `host:port` until the process is stopped.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
