// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Log tail query endpoints.
//!
//! - GET /api/logs/next-sequence - Sequence the next stored record will get
//! - GET /api/logs/messages - Formatted messages from a sequence onward
//! - GET /api/logs/entries - Structured entries from a sequence onward
//!
//! Pollers remember `next_sequence` from each response and pass it back as
//! `from` on the next call.

use axum::{
	extract::{Query, State},
	Json,
};
use logtail_buffer::LogEntry;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;

/// Response for the next-sequence endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NextSequenceResponse {
	/// Sequence the next stored record will receive
	pub next_sequence: u64,
}

/// Query parameters for fetching formatted messages.
#[derive(Debug, Serialize, Deserialize, IntoParams)]
pub struct MessagesParams {
	/// Return messages with a sequence number at or after this value.
	/// Values before the oldest retained record read from the oldest.
	pub from: i64,
	/// Cut each formatted message to at most this many characters.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_length: Option<usize>,
}

/// Response for the messages endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessagesResponse {
	/// Formatted messages, oldest first
	pub messages: Vec<String>,
	/// Pass this as `from` on the next poll
	pub next_sequence: u64,
}

/// Query parameters for fetching structured entries.
#[derive(Debug, Serialize, Deserialize, IntoParams)]
pub struct EntriesParams {
	/// Return entries with a sequence number at or after this value.
	pub from: i64,
	/// Maximum number of entries to return, oldest first.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub limit: Option<usize>,
}

/// Response for the entries endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntriesResponse {
	/// Entries, oldest first
	pub entries: Vec<LogEntry>,
	/// Pass this as `from` on the next poll
	pub next_sequence: u64,
	/// Sequence of the oldest retained entry
	pub earliest_sequence: u64,
}

/// GET /api/logs/next-sequence - Sequence the next stored record will get.
#[utoipa::path(
    get,
    path = "/api/logs/next-sequence",
    responses(
        (status = 200, description = "Next sequence number", body = NextSequenceResponse)
    ),
    tag = "logs"
)]
pub async fn next_sequence(State(state): State<AppState>) -> Json<NextSequenceResponse> {
	Json(NextSequenceResponse {
		next_sequence: state.service.next_sequence(),
	})
}

/// GET /api/logs/messages - Formatted messages from a sequence onward.
#[utoipa::path(
    get,
    path = "/api/logs/messages",
    params(MessagesParams),
    responses(
        (status = 200, description = "Formatted log messages", body = MessagesResponse),
        (status = 400, description = "Missing or malformed query parameters")
    ),
    tag = "logs"
)]
#[tracing::instrument(skip(state), fields(from = params.from, max_length = ?params.max_length))]
pub async fn get_messages(
	State(state): State<AppState>,
	Query(params): Query<MessagesParams>,
) -> Json<MessagesResponse> {
	let batch = state.service.poll_messages(params.from, params.max_length);

	Json(MessagesResponse {
		messages: batch.messages,
		next_sequence: batch.next_sequence,
	})
}

/// GET /api/logs/entries - Structured entries from a sequence onward.
#[utoipa::path(
    get,
    path = "/api/logs/entries",
    params(EntriesParams),
    responses(
        (status = 200, description = "Structured log entries", body = EntriesResponse),
        (status = 400, description = "Missing or malformed query parameters")
    ),
    tag = "logs"
)]
#[tracing::instrument(skip(state), fields(from = params.from, limit = ?params.limit))]
pub async fn list_entries(
	State(state): State<AppState>,
	Query(params): Query<EntriesParams>,
) -> Json<EntriesResponse> {
	let batch = state.service.poll_entries(params.from, params.limit);

	Json(EntriesResponse {
		entries: batch.entries.iter().map(|entry| LogEntry::clone(entry)).collect(),
		next_sequence: batch.next_sequence,
		earliest_sequence: state.service.earliest_sequence(),
	})
}
