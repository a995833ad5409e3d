// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::LogTailConfigLayer;
use crate::sections::{BufferConfigLayer, HttpConfigLayer, LoggingConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<LogTailConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<LogTailConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(LogTailConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/logtail/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<LogTailConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(LogTailConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: LogTailConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LOGTAIL_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<LogTailConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(LogTailConfigLayer {
			http: Some(HttpConfigLayer {
				host: env_var("LOGTAIL_HOST"),
				port: env_parse("LOGTAIL_PORT")?,
			}),
			buffer: Some(BufferConfigLayer {
				capacity: env_parse("LOGTAIL_BUFFER_CAPACITY")?,
				threshold: env_var("LOGTAIL_BUFFER_THRESHOLD"),
				initial_sequence: env_parse("LOGTAIL_BUFFER_INITIAL_SEQUENCE")?,
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var("LOGTAIL_LOG_LEVEL"),
				json: env_bool("LOGTAIL_LOG_JSON"),
			}),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {} value '{v}'", std::any::type_name::<T>()),
		}),
		None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_missing_file_is_skipped() {
		let source = TomlSource::new("/nonexistent/logtail/server.toml");
		let layer = source.load().unwrap();
		assert!(layer.buffer.is_none());
	}

	#[test]
	fn test_toml_file_is_loaded() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http]\nport = 7000\n\n[buffer]\ncapacity = 32").unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(7000));
		assert_eq!(layer.buffer.unwrap().capacity, Some(32));
	}

	#[test]
	fn test_invalid_toml_reports_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[buffer\ncapacity = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
		assert!(err.to_string().contains(&file.path().display().to_string()));
	}

	#[test]
	fn test_env_parse_values() {
		std::env::set_var("LOGTAIL_TEST_PARSE_OK", "42");
		std::env::set_var("LOGTAIL_TEST_PARSE_BAD", "many");
		std::env::set_var("LOGTAIL_TEST_PARSE_EMPTY", "");

		assert_eq!(env_parse::<usize>("LOGTAIL_TEST_PARSE_OK").unwrap(), Some(42));
		assert_eq!(env_parse::<usize>("LOGTAIL_TEST_PARSE_EMPTY").unwrap(), None);
		assert_eq!(env_parse::<u16>("LOGTAIL_TEST_PARSE_UNSET").unwrap(), None);

		let err = env_parse::<u64>("LOGTAIL_TEST_PARSE_BAD").unwrap_err();
		assert!(err.to_string().contains("LOGTAIL_TEST_PARSE_BAD"));
	}

	#[test]
	fn test_env_bool_values() {
		std::env::set_var("LOGTAIL_TEST_BOOL_TRUE", "TRUE");
		std::env::set_var("LOGTAIL_TEST_BOOL_ONE", "1");
		std::env::set_var("LOGTAIL_TEST_BOOL_NO", "no");

		assert_eq!(env_bool("LOGTAIL_TEST_BOOL_TRUE"), Some(true));
		assert_eq!(env_bool("LOGTAIL_TEST_BOOL_ONE"), Some(true));
		assert_eq!(env_bool("LOGTAIL_TEST_BOOL_NO"), Some(false));
		assert_eq!(env_bool("LOGTAIL_TEST_BOOL_UNSET"), None);
	}
}
