mod config;
mod error;
mod model;
#[cfg(test)]
mod testing;
mod web;

use std::sync::Arc;

use actix_web::{middleware, web::Data, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::info;

use config::AppConfig;
use model::auth::acquire_token;
use model::{ChatCompletion, ChatForwarder};
use web::middleware::{trusted_host, TrustedHosts};
use web::routes;

// App state structure
pub struct AppState {
    pub backend: Arc<dyn ChatCompletion>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("The server is starting up");

    let config = AppConfig::from_env().context("invalid configuration")?;
    let client = model::http_client(config.timeouts).context("failed to build HTTP client")?;

    // Fetched once; the service does not start without it.
    let token = acquire_token(&client, &config.token_url, &config.credentials)
        .await
        .context("failed to acquire access token")?;

    let forwarder = ChatForwarder::from_config(client, &config, token);
    info!(
        "Forwarding to {} with a {}-message window",
        config.completions_url, config.history_window
    );

    let app_state = Data::new(AppState {
        backend: Arc::new(forwarder),
    });
    let trusted_hosts = Data::new(TrustedHosts::new(config.trusted_hosts.clone()));

    info!("Listening on {}:{}", config.host, config.port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(trusted_hosts.clone())
            .wrap(middleware::from_fn(trusted_host))
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    info!("The server is shutting down");
    Ok(())
}
