use clap::Parser;
use credential_cache::cache::credential::RenewalPolicy;
use credential_cache::cache::credential_cache::CredentialCache;
use credential_cache::server;
use credential_cache::sources::oauth2::OAuth2Source;
use credential_cache::utils::config_loader;
use credential_cache::utils::logging;
use anyhow::Result;
use credential_cache::utils::logging::LogLevel;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "credential-cache.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);
    info!(provider = ?service_config.provider, "config loaded");

    // -------------------------------
    // 2. Build identity provider
    // -------------------------------

    let provider = OAuth2Source::new(service_config.provider.clone())?;

    // -------------------------------
    // 3. Start credential cache (first fetch happens right away)
    // -------------------------------

    let policy = RenewalPolicy::from_settings(&service_config.settings);
    let cache = CredentialCache::start(provider, policy);

    // -------------------------------
    // 4. Serve token, health and metrics until SIGINT
    // -------------------------------

    info!("Service starting...");
    let served = server::server::start(&service_config.settings, cache.source(), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("shutdown signal received");
    })
    .await;

    // -------------------------------
    // 5. Stop the coordinating task
    // -------------------------------

    cache.shutdown().await;
    info!("Service stopped");
    served
}
