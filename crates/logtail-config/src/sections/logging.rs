// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use serde::Deserialize;

fn default_level() -> String {
	"info,tower_http::trace=debug".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	/// `EnvFilter` directive for the stdout subscriber.
	pub level: Option<String>,
	/// Emit JSON lines instead of human-readable output.
	pub json: Option<bool>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.json.is_some() {
			self.json = other.json;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(default_level),
			json: self.json.unwrap_or(false),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
	pub level: String,
	pub json: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_level(),
			json: false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_layer_finalize_defaults() {
		let config = LoggingConfigLayer::default().finalize();
		assert_eq!(config, LoggingConfig::default());
		assert_eq!(config.level, "info,tower_http::trace=debug");
		assert!(!config.json);
	}

	#[test]
	fn test_merge_keeps_unset_fields() {
		let mut base = LoggingConfigLayer {
			level: Some("debug".to_string()),
			json: Some(true),
		};
		base.merge(LoggingConfigLayer {
			level: Some("warn".to_string()),
			json: None,
		});
		assert_eq!(base.level.as_deref(), Some("warn"));
		assert_eq!(base.json, Some(true));
	}
}
