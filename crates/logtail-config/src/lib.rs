// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the logtail server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Validation of buffer capacity and threshold before the service starts
//! - Consistent environment variable naming (`LOGTAIL_*`)
//!
//! # Usage
//!
//! ```ignore
//! use logtail_config::load_config;
//!
//! let config = load_config()?;
//! println!("Serving the log tail on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::LogTailConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct LogTailConfig {
	pub http: HttpConfig,
	pub buffer: BufferConfig,
	pub logging: LoggingConfig,
}

impl LogTailConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LOGTAIL_*`)
/// 2. Config file (`/etc/logtail/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<LogTailConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<LogTailConfig, ConfigError> {
	let mut merged = LogTailConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<LogTailConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<LogTailConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = LogTailConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: LogTailConfigLayer) -> Result<LogTailConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let buffer = layer.buffer.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&http)?;

	info!(
		host = %http.host,
		port = http.port,
		capacity = buffer.capacity,
		threshold = %buffer.threshold,
		"Log tail configuration loaded"
	);

	Ok(LogTailConfig {
		http,
		buffer,
		logging,
	})
}

fn validate_config(http: &HttpConfig) -> Result<(), ConfigError> {
	if http.host.trim().is_empty() {
		return Err(ConfigError::Validation(
			"http.host must not be blank".to_string(),
		));
	}

	Ok(())
}
