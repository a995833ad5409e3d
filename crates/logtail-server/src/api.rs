// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Router and shared state.

use std::future::Future;

use axum::{routing::get, Router};
use logtail_buffer::LoggingService;
use tokio::net::TcpListener;

use crate::error::ServerError;
use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub service: LoggingService,
}

impl AppState {
	pub fn new(service: LoggingService) -> Self {
		Self { service }
	}
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/logs/next-sequence", get(routes::logs::next_sequence))
		.route("/api/logs/messages", get(routes::logs::get_messages))
		.route("/api/logs/entries", get(routes::logs::list_entries))
		.route("/api/openapi.json", get(routes::docs::openapi_json))
		.with_state(state)
}

pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
	TcpListener::bind(addr)
		.await
		.map_err(|source| ServerError::Bind {
			addr: addr.to_string(),
			source,
		})
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServerError>
where
	F: Future<Output = ()> + Send + 'static,
{
	let addr = listener.local_addr().map_err(ServerError::Io)?;
	tracing::info!(%addr, "listening");

	axum::serve(listener, router)
		.with_graceful_shutdown(shutdown)
		.await
		.map_err(ServerError::Io)?;

	tracing::info!("server shutdown complete");
	Ok(())
}
