use super::{types::Config, ConfigError};
use crate::download::is_supported_client;

/// Validate configuration
/// Currently validates:
/// - Default download client is one we can dispatch to
/// - Store path is not empty
/// - Fetcher timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !is_supported_client(&config.download.client) {
        return Err(ConfigError::ValidationError(format!(
            "download.client '{}' is not supported",
            config.download.client
        )));
    }

    if config.store.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "store.path cannot be empty".to_string(),
        ));
    }

    if let Some(fetcher) = &config.fetcher {
        if fetcher.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "fetcher.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}
