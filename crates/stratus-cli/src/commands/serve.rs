use stratus_core::StratusConfig;

use crate::cli::ServeArgs;
use crate::error::CliError;

pub async fn run(args: &ServeArgs, config: &StratusConfig) -> Result<(), CliError> {
    stratus_web::serve(config, args.addr).await?;
    Ok(())
}
