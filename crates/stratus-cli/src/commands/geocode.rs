use stratus_core::WeatherService;

use crate::cli::GeocodeArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(args: &GeocodeArgs, service: WeatherService) -> Result<(), CliError> {
    let coord = service.geocode(&args.city).await?;
    output::render(&coord, args.pretty)
}
