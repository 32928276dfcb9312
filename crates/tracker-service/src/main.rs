//! Main entry point for the order tracker service.
//!
//! Loads the configuration, builds the tracker with the configured storage
//! backend, and serves the HTTP API.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracker_config::Config;

mod apis;
mod factory_registry;
mod server;

/// Command-line arguments for the order tracker service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started order tracker");

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Invalid config path: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.tracker.id);

	let api_config = config.enabled_api().cloned();
	let tracker = Arc::new(factory_registry::build_tracker_from_config(config)?);

	match api_config {
		Some(api_config) => server::start_server(api_config, tracker).await?,
		None => tracing::warn!("API server disabled, nothing to serve"),
	}

	tracing::info!("Stopped order tracker");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_args_default_values() {
		let args = Args::parse_from(["order-tracker"]);
		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn test_args_custom_values() {
		let args =
			Args::parse_from(["order-tracker", "--config", "custom.toml", "-l", "debug"]);
		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert_eq!(args.log_level, "debug");
	}
}
