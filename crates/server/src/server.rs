use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};

use std::{future::Future, sync::Arc, time::Instant};

use crate::{records, reports, tags};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/organizations/{org_id}/tags",
            post(tags::create).get(tags::list),
        )
        .route(
            "/organizations/{org_id}/financial-records",
            post(records::create).get(records::list),
        )
        .route(
            "/organizations/{org_id}/financial-records/bulk",
            post(records::create_bulk),
        )
        .route(
            "/organizations/{org_id}/financial-records/reports/cash-flow",
            get(reports::cash_flow),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// The full HTTP application over `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine))
        .with_graceful_shutdown(shutdown)
        .await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener, std::future::pending()).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
