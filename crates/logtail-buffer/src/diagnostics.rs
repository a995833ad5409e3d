// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Last-resort reporting for records the publish path had to drop.
//!
//! Sinks must not log through `tracing`: the failing publish may itself be
//! running inside the subscriber.

use std::io::Write;

use crate::error::PublishError;

pub trait DiagnosticSink: Send + Sync {
	fn report(&self, error: &PublishError);
}

/// Writes one line per dropped record to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrDiagnostics;

impl DiagnosticSink for StderrDiagnostics {
	fn report(&self, error: &PublishError) {
		let mut stderr = std::io::stderr().lock();
		let _ = writeln!(stderr, "logtail: dropped log record: {error}");
	}
}
