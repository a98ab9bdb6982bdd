//! API module providing the gateway's HTTP endpoints.
//!
//! Submodules:
//! - `accounts` - signup and authentication endpoints (/api/auth/*)
//! - `auth` - API error responses and the bearer-token extractor
//! - `health` - health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod accounts;
pub mod auth;
pub mod health;
pub mod openapi;

pub use accounts::{ACCOUNTS_TAG, AppState};
pub use health::MISC_TAG;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

use crate::AppResources;
use crate::directory::ClientDirectory;
use crate::identity::IdentityProvider;

/// Assembles the full application router.
///
/// Split out of [`start_webserver`] so tests can drive the exact production
/// routing stack in-process.
pub fn build_router<I, C>(state: AppState<I, C>, resources: AppResources) -> Router
where
    I: IdentityProvider + 'static,
    C: ClientDirectory + 'static,
{
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest("/api/auth", accounts::router(state))
        .routes(routes!(health::health))
        .layer(axum::Extension(resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server with all configured routes.
#[tracing::instrument(skip(state, resources))]
pub async fn start_webserver<I, C>(
    state: AppState<I, C>,
    resources: AppResources,
) -> color_eyre::Result<()>
where
    I: IdentityProvider + 'static,
    C: ClientDirectory + 'static,
{
    let bind_addr = resources.config.bind_addr.clone();
    let router = build_router(state, resources);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "server listening");
    axum::serve(listener, router)
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
