// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP query surface for the logtail buffer.
//!
//! This crate serves a [`LoggingService`](logtail_buffer::LoggingService) over
//! HTTP and provides [`LogTailClient`] for polling it from elsewhere.

pub mod api;
pub mod api_docs;
pub mod client;
pub mod error;
pub mod routes;
pub mod version;

pub use api::{bind, create_router, serve, AppState};
pub use api_docs::ApiDoc;
pub use client::LogTailClient;
pub use error::ServerError;
pub use routes::health::HealthResponse;
pub use routes::logs::{EntriesResponse, MessagesResponse, NextSequenceResponse};
