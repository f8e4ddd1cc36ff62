//! API server assembly and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use super::v0;
use crate::api_client::types::TankStatus;
use crate::error::Result;
use crate::report::ReportGenerator;
use crate::tracing::prelude::*;

/// State shared by all handlers.
#[derive(Clone)]
pub struct SharedState {
    pub generator: Arc<dyn ReportGenerator>,
    /// Live monitor status published by the monitor task.
    pub tanks_rx: watch::Receiver<Vec<TankStatus>>,
}

#[derive(OpenApi)]
#[openapi(info(
    title = "aquamon API",
    description = "Water tank monitoring and water-quality reports"
))]
struct ApiDoc;

/// Serve the API until the token is cancelled.
pub async fn serve(
    addr: SocketAddr,
    state: SharedState,
    cancellation: CancellationToken,
) -> Result<()> {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/v0", v0::routes())
        .split_for_parts();

    let router = router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancellation.cancelled().await })
        .await?;

    Ok(())
}
