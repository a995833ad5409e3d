// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP query surface tests driven through the router.

use axum::{
	body::Body,
	http::{Request, StatusCode},
	Router,
};
use logtail_buffer::{
	DeploymentMetadata, ExecutionContext, LogLevel, LoggingService, RawRecord, SequenceSeed,
};
use logtail_server::{
	create_router, AppState, EntriesResponse, HealthResponse, MessagesResponse,
	NextSequenceResponse,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

fn service(capacity: usize) -> LoggingService {
	LoggingService::builder()
		.capacity(capacity)
		.seed(SequenceSeed::Fixed(0))
		.build()
}

fn publish(service: &LoggingService, count: usize) {
	for i in 0..count {
		service.publish(
			RawRecord::new(LogLevel::Audit, "api", "event {0}").with_params([i.to_string()]),
			&ExecutionContext::none(),
		);
	}
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
	let response = app
		.clone()
		.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
		.await
		.unwrap();
	let status = response.status();
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	(status, body.to_vec())
}

async fn get_json<T: DeserializeOwned>(app: &Router, uri: &str) -> T {
	let (status, body) = get(app, uri).await;
	assert_eq!(status, StatusCode::OK, "GET {uri}");
	serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_next_sequence_tracks_appends() {
	let service = service(4);
	let app = create_router(AppState::new(service.clone()));

	let response: NextSequenceResponse = get_json(&app, "/api/logs/next-sequence").await;
	assert_eq!(response.next_sequence, 0);

	publish(&service, 6);
	let response: NextSequenceResponse = get_json(&app, "/api/logs/next-sequence").await;
	assert_eq!(response.next_sequence, 6);
}

#[tokio::test]
async fn test_messages_window_after_wrap() {
	let service = service(4);
	publish(&service, 6);
	let app = create_router(AppState::new(service));

	let response: MessagesResponse = get_json(&app, "/api/logs/messages?from=0").await;
	assert_eq!(response.messages.len(), 4);
	assert!(response.messages[0].ends_with("api: event 2"));
	assert!(response.messages[3].ends_with("api: event 5"));
	assert_eq!(response.next_sequence, 6);

	let response: MessagesResponse = get_json(&app, "/api/logs/messages?from=5").await;
	assert_eq!(response.messages.len(), 1);
	assert!(response.messages[0].ends_with("event 5"));

	let response: MessagesResponse = get_json(&app, "/api/logs/messages?from=10").await;
	assert!(response.messages.is_empty());
	assert_eq!(response.next_sequence, 6);
}

#[tokio::test]
async fn test_negative_from_reads_whole_window() {
	let service = service(4);
	publish(&service, 3);
	let app = create_router(AppState::new(service));

	let response: MessagesResponse = get_json(&app, "/api/logs/messages?from=-100").await;
	assert_eq!(response.messages.len(), 3);
}

#[tokio::test]
async fn test_messages_are_truncated() {
	let service = service(4);
	service.publish(
		RawRecord::new(LogLevel::Error, "svc", "x".repeat(500)),
		&ExecutionContext::none(),
	);
	let app = create_router(AppState::new(service));

	let response: MessagesResponse =
		get_json(&app, "/api/logs/messages?from=0&max_length=60").await;
	let message = &response.messages[0];
	assert_eq!(message.chars().count(), 60);
	assert!(message.ends_with("..."));
	assert!(message.contains(" ERROR [||] svc: "));
}

#[tokio::test]
async fn test_missing_from_is_rejected() {
	let app = create_router(AppState::new(service(4)));

	let (status, _) = get(&app, "/api/logs/messages").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = get(&app, "/api/logs/entries?from=abc").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entries_are_structured_and_limited() {
	let service = service(8);
	let metadata = Arc::new(DeploymentMetadata::Application(
		DeploymentMetadata::application("shop"),
	));
	let ctx = ExecutionContext::with_metadata(metadata);
	for i in 0..5 {
		service.publish(
			RawRecord::new(LogLevel::Warn, "orders", "order {0}").with_params([i.to_string()]),
			&ctx,
		);
	}
	let app = create_router(AppState::new(service));

	let response: EntriesResponse = get_json(&app, "/api/logs/entries?from=1&limit=2").await;
	assert_eq!(response.entries.len(), 2);
	assert_eq!(response.entries[0].sequence, 1);
	assert_eq!(response.entries[1].sequence, 2);
	assert_eq!(response.entries[0].message, "order 1");
	assert_eq!(response.entries[0].level, LogLevel::Warn);
	assert_eq!(
		response.entries[0].attribution.application.as_deref(),
		Some("shop")
	);
	// Resuming from next_sequence continues where the limited page ended.
	assert_eq!(response.next_sequence, 3);
	assert_eq!(response.earliest_sequence, 0);
}

#[tokio::test]
async fn test_filtered_records_are_not_served() {
	let service = service(8);
	service.publish(
		RawRecord::new(LogLevel::Info, "noise", "ignored"),
		&ExecutionContext::none(),
	);
	let app = create_router(AppState::new(service));

	let response: MessagesResponse = get_json(&app, "/api/logs/messages?from=0").await;
	assert!(response.messages.is_empty());
	assert_eq!(response.next_sequence, 0);
}

#[tokio::test]
async fn test_health_reports_occupancy() {
	let service = service(16);
	publish(&service, 3);
	let app = create_router(AppState::new(service));

	let response: HealthResponse = get_json(&app, "/health").await;
	assert_eq!(response.status, "ok");
	assert_eq!(response.buffered, 3);
	assert_eq!(response.capacity, 16);
}

#[tokio::test]
async fn test_openapi_document_lists_log_paths() {
	let app = create_router(AppState::new(service(4)));

	let doc: serde_json::Value = get_json(&app, "/api/openapi.json").await;
	let paths = doc["paths"].as_object().unwrap();
	assert!(paths.contains_key("/api/logs/messages"));
	assert!(paths.contains_key("/api/logs/next-sequence"));
	assert!(paths.contains_key("/api/logs/entries"));
	assert!(paths.contains_key("/health"));

	let params = doc["paths"]["/api/logs/messages"]["get"]["parameters"]
		.as_array()
		.unwrap();
	let from = params.iter().find(|p| p["name"] == "from").unwrap();
	assert_eq!(from["required"], true);
	assert!(from["description"].as_str().unwrap().contains("sequence"));
}
