// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Log entry types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseLevelError;

/// Severity scale.
///
/// Numeric values leave room so that `Audit` sits between `Info` and `Warn`.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	Audit,
	Warn,
	Error,
	Fatal,
}

impl LogLevel {
	/// Convert from tracing Level.
	///
	/// Tracing has no audit level; the capture layer promotes `Info` events
	/// flagged with `audit = true` separately.
	pub fn from_tracing(level: &tracing::Level) -> Self {
		match *level {
			tracing::Level::TRACE => LogLevel::Trace,
			tracing::Level::DEBUG => LogLevel::Debug,
			tracing::Level::INFO => LogLevel::Info,
			tracing::Level::WARN => LogLevel::Warn,
			tracing::Level::ERROR => LogLevel::Error,
		}
	}

	/// Integer severity value.
	pub fn value(&self) -> u32 {
		match self {
			LogLevel::Trace => 300,
			LogLevel::Debug => 500,
			LogLevel::Info => 800,
			LogLevel::Audit => 850,
			LogLevel::Warn => 900,
			LogLevel::Error => 1000,
			LogLevel::Fatal => 1100,
		}
	}

	/// Get the string representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Trace => "TRACE",
			LogLevel::Debug => "DEBUG",
			LogLevel::Info => "INFO",
			LogLevel::Audit => "AUDIT",
			LogLevel::Warn => "WARN",
			LogLevel::Error => "ERROR",
			LogLevel::Fatal => "FATAL",
		}
	}
}

impl std::fmt::Display for LogLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for LogLevel {
	type Err = ParseLevelError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"trace" => Ok(LogLevel::Trace),
			"debug" => Ok(LogLevel::Debug),
			"info" => Ok(LogLevel::Info),
			"audit" => Ok(LogLevel::Audit),
			"warn" | "warning" => Ok(LogLevel::Warn),
			"error" => Ok(LogLevel::Error),
			"fatal" => Ok(LogLevel::Fatal),
			_ => Err(ParseLevelError(s.to_string())),
		}
	}
}

/// The (application, module, component) triple a record is tagged with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attribution {
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub application: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub module: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub component: Option<String>,
}

impl Attribution {
	pub fn is_empty(&self) -> bool {
		self.application.is_none() && self.module.is_none() && self.component.is_none()
	}
}

/// A stored log entry. Immutable once it has been assigned a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
	/// Position in the global insertion order.
	pub sequence: u64,
	/// Timestamp when the record was emitted.
	pub timestamp: DateTime<Utc>,
	pub level: LogLevel,
	/// The logger/target that emitted the record.
	pub logger: String,
	#[serde(default)]
	pub attribution: Attribution,
	/// The message with all parameters substituted.
	pub message: String,
	/// Captured error or stack representation.
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub throwable: Option<String>,
}

/// An entry that has passed admission and attribution but has not yet been
/// sequenced. The ring store turns it into a [`LogEntry`].
#[derive(Debug, Clone)]
pub struct PendingEntry {
	pub timestamp: DateTime<Utc>,
	pub level: LogLevel,
	pub logger: String,
	pub attribution: Attribution,
	pub message: String,
	pub throwable: Option<String>,
}

impl PendingEntry {
	pub(crate) fn sequenced(self, sequence: u64) -> LogEntry {
		LogEntry {
			sequence,
			timestamp: self.timestamp,
			level: self.level,
			logger: self.logger,
			attribution: self.attribution,
			message: self.message,
			throwable: self.throwable,
		}
	}
}

/// A record as handed over by a logging facility.
#[derive(Debug, Clone)]
pub struct RawRecord {
	pub level: LogLevel,
	pub timestamp: DateTime<Utc>,
	pub logger: String,
	/// Message template with `{0}`, `{1}`, ... placeholders.
	pub template: String,
	pub params: Vec<String>,
	pub error: Option<String>,
}

impl RawRecord {
	/// Create a record stamped with the current time.
	pub fn new(level: LogLevel, logger: impl Into<String>, template: impl Into<String>) -> Self {
		Self {
			level,
			timestamp: Utc::now(),
			logger: logger.into(),
			template: template.into(),
			params: Vec::new(),
			error: None,
		}
	}

	pub fn with_params<I, S>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.params = params.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_error(mut self, error: impl Into<String>) -> Self {
		self.error = Some(error.into());
		self
	}

	pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
		self.timestamp = timestamp;
		self
	}

	/// Render the message text with parameters substituted.
	pub fn render(&self) -> String {
		render_message(&self.template, &self.params)
	}
}

/// Substitute positional `{n}` placeholders in `template`.
///
/// Placeholders that do not name an existing parameter are kept verbatim.
/// Parameters the template never references are appended, one per line.
pub fn render_message(template: &str, params: &[String]) -> String {
	let mut out = String::with_capacity(template.len());
	let mut used = vec![false; params.len()];
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);
		let after = &rest[open + 1..];
		let Some(close) = after.find('}') else {
			out.push_str(&rest[open..]);
			rest = "";
			break;
		};

		let key = &after[..close];
		let index = key
			.bytes()
			.all(|b| b.is_ascii_digit())
			.then(|| key.parse::<usize>().ok())
			.flatten()
			.filter(|i| *i < params.len());

		match index {
			Some(i) => {
				out.push_str(&params[i]);
				used[i] = true;
			}
			None => {
				out.push('{');
				out.push_str(key);
				out.push('}');
			}
		}
		rest = &after[close + 1..];
	}
	out.push_str(rest);

	for (param, used) in params.iter().zip(used) {
		if !used {
			out.push('\n');
			out.push_str(param);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params(values: &[&str]) -> Vec<String> {
		values.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_log_level_ordering() {
		assert!(LogLevel::Trace < LogLevel::Debug);
		assert!(LogLevel::Debug < LogLevel::Info);
		assert!(LogLevel::Info < LogLevel::Audit);
		assert!(LogLevel::Audit < LogLevel::Warn);
		assert!(LogLevel::Warn < LogLevel::Error);
		assert!(LogLevel::Error < LogLevel::Fatal);
	}

	#[test]
	fn test_ordering_matches_values() {
		let levels = [
			LogLevel::Trace,
			LogLevel::Debug,
			LogLevel::Info,
			LogLevel::Audit,
			LogLevel::Warn,
			LogLevel::Error,
			LogLevel::Fatal,
		];
		for pair in levels.windows(2) {
			assert!(pair[0].value() < pair[1].value());
		}
	}

	#[test]
	fn test_log_level_display_and_parse() {
		assert_eq!(LogLevel::Audit.to_string(), "AUDIT");
		assert_eq!("audit".parse::<LogLevel>().unwrap(), LogLevel::Audit);
		assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
		assert!("verbose".parse::<LogLevel>().is_err());
	}

	#[test]
	fn test_render_substitutes_positional_params() {
		let out = render_message("user {0} logged in from {1}", &params(&["alice", "10.0.0.1"]));
		assert_eq!(out, "user alice logged in from 10.0.0.1");
	}

	#[test]
	fn test_render_appends_unused_params() {
		let out = render_message("started {1}", &params(&["first", "second", "third"]));
		assert_eq!(out, "started second\nfirst\nthird");
	}

	#[test]
	fn test_render_keeps_unknown_placeholders() {
		let out = render_message("{5} and {name} and {", &params(&["a"]));
		assert_eq!(out, "{5} and {name} and {\na");
	}

	#[test]
	fn test_render_repeated_placeholder() {
		let out = render_message("{0}-{0}", &params(&["x"]));
		assert_eq!(out, "x-x");
	}

	#[test]
	fn test_log_entry_serialization() {
		let entry = PendingEntry {
			timestamp: Utc::now(),
			level: LogLevel::Audit,
			logger: "test::module".to_string(),
			attribution: Attribution {
				application: Some("shop".to_string()),
				..Default::default()
			},
			message: "Test message".to_string(),
			throwable: None,
		}
		.sequenced(7);

		let json = serde_json::to_string(&entry).unwrap();
		assert!(json.contains("\"level\":\"audit\""));
		assert!(json.contains("\"sequence\":7"));
		assert!(json.contains("\"application\":\"shop\""));
		assert!(!json.contains("\"module\""));
		assert!(!json.contains("throwable"));
	}
}
