// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for the log tail API.

use logtail_buffer::{Attribution, LogEntry, LogLevel};
use utoipa::OpenApi;

use crate::routes::{health, logs};

#[derive(OpenApi)]
#[openapi(
	info(
		title = "logtail",
		description = "Sequenced tail of recent log records"
	),
	paths(
		health::health_check,
		logs::next_sequence,
		logs::get_messages,
		logs::list_entries,
	),
	components(schemas(
		health::HealthResponse,
		logs::NextSequenceResponse,
		logs::MessagesResponse,
		logs::EntriesResponse,
		LogEntry,
		LogLevel,
		Attribution,
	)),
	tags(
		(name = "logs", description = "Log tail queries"),
		(name = "health", description = "Service health")
	)
)]
pub struct ApiDoc;
