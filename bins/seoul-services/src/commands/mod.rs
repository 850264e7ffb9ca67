//! Subcommand implementations

pub mod clusters;
pub mod favorites;
pub mod geo;
pub mod nearby;

use seoul_services_api_client::{ClientConfig, SeoulServicesClient};
use seoul_services_core::config::Config;

/// Client built from the loaded configuration.
pub(crate) fn client(config: &Config) -> anyhow::Result<SeoulServicesClient> {
    let client_config = ClientConfig::from_schema(&config.schema);
    Ok(SeoulServicesClient::with_config(client_config)?)
}
