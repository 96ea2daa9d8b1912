mod geocode;
mod serve;
mod weather;

use std::future::Future;

use stratus_core::{StratusConfig, WeatherCache, WeatherService};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli, config: &StratusConfig) -> Result<(), CliError> {
    match &cli.command {
        Command::Weather(args) => {
            with_service(config, |service| weather::run(args, service)).await
        }
        Command::Geocode(args) => {
            with_service(config, |service| geocode::run(args, service)).await
        }
        Command::Serve(args) => serve::run(args, config).await,
    }
}

/// Run a one-shot command against a freshly connected cache, disconnecting
/// it afterwards whatever the outcome.
async fn with_service<F, Fut>(config: &StratusConfig, command: F) -> Result<(), CliError>
where
    F: FnOnce(WeatherService) -> Fut,
    Fut: Future<Output = Result<(), CliError>>,
{
    let cache = WeatherCache::disconnected();
    cache.connect_configured(config.redis_url.as_deref()).await;

    let service = WeatherService::with_default_transport(config, cache.clone());
    let result = command(service).await;

    cache.disconnect().await;
    result
}
