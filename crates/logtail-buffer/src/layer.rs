// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Tracing layer that publishes events into a [`LoggingService`].

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::context::ExecutionContext;
use crate::entry::{LogLevel, RawRecord};
use crate::service::LoggingService;

/// Events from this crate are never captured.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// A tracing Layer that feeds events into a [`LoggingService`].
///
/// `INFO` events carrying `audit = true` are stored at [`LogLevel::Audit`].
/// An `error` field becomes the entry's throwable and any other fields are
/// appended to the message as `key=value`. Attribution uses the context
/// entered on the emitting thread via [`ExecutionContext::enter`].
#[derive(Clone)]
pub struct CaptureLayer {
	service: LoggingService,
}

impl CaptureLayer {
	pub fn new(service: LoggingService) -> Self {
		Self { service }
	}

	/// Get a reference to the underlying service.
	pub fn service(&self) -> &LoggingService {
		&self.service
	}
}

impl<S> Layer<S> for CaptureLayer
where
	S: Subscriber + for<'a> LookupSpan<'a>,
{
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();
		if is_own_target(metadata.target()) {
			return;
		}

		let mut visitor = FieldVisitor::new();
		event.record(&mut visitor);

		let mut level = LogLevel::from_tracing(metadata.level());
		if visitor.audit && level == LogLevel::Info {
			level = LogLevel::Audit;
		}

		let mut template = visitor.message.unwrap_or_default();
		for (key, value) in &visitor.fields {
			template.push(' ');
			template.push_str(key);
			template.push('=');
			template.push_str(value);
		}

		let mut record = RawRecord::new(level, metadata.target(), template);
		record.error = visitor.error;

		// Dropped records are already reported by the service.
		let _ = self.service.publish(record, &ExecutionContext::current());
	}
}

fn is_own_target(target: &str) -> bool {
	target
		.strip_prefix(OWN_TARGET)
		.is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Visitor that extracts fields from a tracing event.
struct FieldVisitor {
	message: Option<String>,
	fields: Vec<(String, String)>,
	audit: bool,
	error: Option<String>,
}

impl FieldVisitor {
	fn new() -> Self {
		Self {
			message: None,
			fields: Vec::new(),
			audit: false,
			error: None,
		}
	}

	fn record_value(&mut self, name: &str, value: String) {
		match name {
			"message" => self.message = Some(value),
			"error" => self.error = Some(value),
			_ => self.fields.push((name.to_string(), value)),
		}
	}
}

impl Visit for FieldVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		self.record_value(field.name(), format!("{:?}", value));
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		self.record_value(field.name(), value.to_string());
	}

	fn record_i64(&mut self, field: &Field, value: i64) {
		self.record_value(field.name(), value.to_string());
	}

	fn record_u64(&mut self, field: &Field, value: u64) {
		self.record_value(field.name(), value.to_string());
	}

	fn record_bool(&mut self, field: &Field, value: bool) {
		if field.name() == "audit" {
			self.audit = value;
		} else {
			self.record_value(field.name(), value.to_string());
		}
	}

	fn record_f64(&mut self, field: &Field, value: f64) {
		self.record_value(field.name(), value.to_string());
	}

	fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
		let mut rendered = value.to_string();
		let mut source = value.source();
		while let Some(cause) = source {
			rendered.push_str("\ncaused by: ");
			rendered.push_str(&cause.to_string());
			source = cause.source();
		}
		self.record_value(field.name(), rendered);
	}
}
