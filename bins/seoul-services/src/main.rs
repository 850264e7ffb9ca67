//! seoul-services: find public services around a point in Seoul.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::Status;
use seoul_services_api_client::{ApiError, LocationError};
use seoul_services_catalog::{CatalogError, Category};
use seoul_services_cluster::ClusterError;
use seoul_services_core::config::Config;
use seoul_services_core::error::{exit_codes, Error as CoreError};
use seoul_services_geo::GeoError;
use seoul_services_search::{SearchError, SortBy};
use seoul_services_telemetry::{metrics, LogFormat, TelemetryConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seoul-services")]
#[command(about = "Discover cultural events, libraries and other public services in Seoul")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a seoul-services.toml
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print collected metrics to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List services near a point, an address, or the default location
    Nearby {
        /// Reference latitude
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Reference longitude
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Geocode this address and search around it
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        address: Option<String>,
        /// Search radius in meters
        #[arg(long)]
        radius: Option<u32>,
        /// Only these categories (repeatable)
        #[arg(long = "category", value_name = "CATEGORY")]
        categories: Vec<Category>,
        /// distance, name or date
        #[arg(long, default_value_t = SortBy::Distance)]
        sort: SortBy,
        /// Pages of results to show
        #[arg(long, default_value_t = 1)]
        pages: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cluster the records in a JSON file into map markers
    Clusters {
        /// Array of backend records, or a response with a `locations` array
        file: PathBuf,
        /// Clustering distance in meters
        #[arg(long)]
        threshold: Option<f64>,
        /// Click a marker or entity by id and show what happens
        #[arg(long)]
        click: Option<String>,
        /// Zoom level the map is at when clicking
        #[arg(long)]
        zoom: Option<u8>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Great-circle distance between two points
    #[command(allow_negative_numbers = true)]
    Distance {
        from_lat: f64,
        from_lon: f64,
        to_lat: f64,
        to_lon: f64,
    },

    /// Look up the coordinate of an address
    Geocode {
        address: String,
        #[arg(long)]
        json: bool,
    },

    /// Look up the address of a coordinate
    #[command(allow_negative_numbers = true)]
    Reverse {
        lat: f64,
        lon: f64,
        #[arg(long)]
        json: bool,
    },

    /// Manage saved services
    Favorites {
        /// Favorites file (defaults to the configured location)
        #[arg(long, env = "SEOUL_SERVICES_FAVORITES")]
        file: Option<PathBuf>,

        #[command(subcommand)]
        action: commands::favorites::Action,
    },
}

fn main() {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig::default()
        .with_verbosity(cli.verbose)
        .with_format(if cli.json_logs { LogFormat::Json } else { LogFormat::Compact });
    if let Err(e) = seoul_services_telemetry::init_with_config(telemetry) {
        Status::warning(&format!("Logging disabled: {e}"));
    }

    let code = match run(&cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            match e.chain().find_map(|cause| cause.downcast_ref::<CoreError>()) {
                Some(core) if cli.json_logs => {
                    eprintln!("{}", serde_json::to_string(&core.to_report()).unwrap_or_default());
                }
                _ => Status::error(&format!("{e:#}")),
            }
            exit_code(&e)
        }
    };

    if cli.metrics {
        eprintln!("{}", metrics().export_json());
    }
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Nearby {
            lat,
            lon,
            address,
            radius,
            categories,
            sort,
            pages,
            json,
        } => {
            let args = commands::nearby::NearbyArgs {
                point: lat.zip(*lon),
                address: address.clone(),
                radius_m: *radius,
                categories: categories.clone(),
                sort: *sort,
                pages: *pages,
                json: *json,
            };
            block_on(commands::nearby::run(&config, args))
        }
        Commands::Clusters {
            file,
            threshold,
            click,
            zoom,
            json,
        } => commands::clusters::run(&config, file, *threshold, click.as_deref(), *zoom, *json),
        Commands::Distance {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
        } => commands::geo::distance((*from_lat, *from_lon), (*to_lat, *to_lon)),
        Commands::Geocode { address, json } => block_on(commands::geo::geocode(&config, address, *json)),
        Commands::Reverse { lat, lon, json } => block_on(commands::geo::reverse(&config, (*lat, *lon), *json)),
        Commands::Favorites { file, action } => {
            let path = file
                .clone()
                .unwrap_or_else(|| config.schema.favorites.resolved_path());
            commands::favorites::run(&path, action)
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(future)
}

/// Exit code for the first recognised error in the chain.
fn exit_code(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<CoreError>() {
            return exit_codes::for_code(e.code);
        }
        if let Some(e) = cause.downcast_ref::<ApiError>() {
            return match e {
                ApiError::InvalidInput(_) => exit_codes::VALIDATION_ERROR,
                ApiError::Config(_) => exit_codes::CONFIG_ERROR,
                _ => exit_codes::UPSTREAM_ERROR,
            };
        }
        if cause.downcast_ref::<LocationError>().is_some() {
            return exit_codes::LOCATION_ERROR;
        }
        if cause.is::<GeoError>()
            || cause.is::<ClusterError>()
            || cause.is::<CatalogError>()
            || cause.is::<SearchError>()
        {
            return exit_codes::VALIDATION_ERROR;
        }
    }
    exit_codes::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_codes() {
        let geo: anyhow::Error = GeoError::InvalidDistance(-1.0).into();
        assert_eq!(exit_code(&geo), exit_codes::VALIDATION_ERROR);

        let core: anyhow::Error = CoreError::config_invalid("bad").into();
        assert_eq!(exit_code(&core), exit_codes::CONFIG_ERROR);

        let api: anyhow::Error = ApiError::NotFound("x".into()).into();
        assert_eq!(exit_code(&api), exit_codes::UPSTREAM_ERROR);

        let other = anyhow::anyhow!("boom");
        assert_eq!(exit_code(&other), exit_codes::FAILURE);
    }

    #[test]
    fn test_parse_nearby_args() {
        let cli = Cli::try_parse_from([
            "seoul-services",
            "nearby",
            "--lat",
            "37.5665",
            "--lon",
            "126.978",
            "--category",
            "libraries",
            "--sort",
            "name",
        ])
        .unwrap();

        match cli.command {
            Commands::Nearby { lat, categories, sort, .. } => {
                assert_eq!(lat, Some(37.5665));
                assert_eq!(categories, vec![Category::Library]);
                assert_eq!(sort, SortBy::Name);
            }
            _ => panic!("expected nearby"),
        }
    }

    #[test]
    fn test_address_conflicts_with_point() {
        let parsed = Cli::try_parse_from([
            "seoul-services",
            "nearby",
            "--lat",
            "37.5",
            "--lon",
            "127.0",
            "--address",
            "시청",
        ]);
        assert!(parsed.is_err());
    }
}
