use std::sync::Arc;
use std::time::Duration;

use account_gateway::AppResources;
use account_gateway::api::{AppState, start_webserver};
use account_gateway::auth::AuthOrchestrator;
use account_gateway::config::load_config_or_panic;
use account_gateway::directory::HttpClientDirectory;
use account_gateway::identity::HttpIdentityProvider;
use account_gateway::saga::SignupOrchestrator;
use account_gateway::token::TokenCodec;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "account_gateway=info,tower_http=info,hyper=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install().expect("Failed to install `color_eyre::install`");
    dotenvy::dotenv().ok();

    initialize_tracing();

    // Missing or invalid configuration is startup-fatal, never a per-request
    // error.
    let config = Arc::new(load_config_or_panic());

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let identity = Arc::new(HttpIdentityProvider::new(
        http.clone(),
        config.identity.base_url.clone(),
        config.identity.pool_id.clone(),
        config.identity.client_id.clone(),
    ));
    let directory = Arc::new(HttpClientDirectory::new(
        http,
        config.order_service.base_url.clone(),
    ));
    let tokens = Arc::new(TokenCodec::new(config.auth.token_secret.as_bytes()));

    let state = AppState {
        signup: Arc::new(SignupOrchestrator::new(identity.clone(), directory.clone())),
        auth: Arc::new(AuthOrchestrator::new(
            identity,
            directory,
            tokens.clone(),
            time::Duration::seconds(config.auth.token_ttl_secs),
        )),
    };
    let resources = AppResources { config, tokens };

    start_webserver(state, resources).await?;
    Ok(())
}
