use stratus_core::WeatherService;
use tracing::debug;

use crate::cli::WeatherArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(args: &WeatherArgs, service: WeatherService) -> Result<(), CliError> {
    let resolution = service.resolve(&args.city).await?;
    debug!(cache_hit = resolution.cache_hit, "rendering snapshot");
    output::render(&resolution.snapshot, args.pretty)
}
