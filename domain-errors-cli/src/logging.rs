use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::settings::Settings;

// stdout занят результатом команды, поэтому логи идут в stderr.
pub(crate) fn init_logging(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .map_err(|e| anyhow!("invalid log level `{}`: {e}", settings.log_level))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}
