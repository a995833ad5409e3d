// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Sequenced in-memory log tail.
//!
//! This crate provides:
//! - [`LoggingService`] - admits records at or above a threshold, attributes them to
//!   the deployed unit that emitted them and serves them back by sequence
//! - [`RingStore`] - the fixed-capacity, mutex-guarded ring that assigns sequences
//! - [`AttributionResolver`] and [`ContextRegistry`] - (application, module, component)
//!   attribution, with the registry kept current by lifecycle events
//! - [`format_entry`] - human-readable rendering with optional truncation
//! - [`CaptureLayer`] - a tracing Layer that publishes events into the service
//!
//! # Usage
//!
//! ```ignore
//! use logtail_buffer::{CaptureLayer, LogLevel, LoggingService};
//! use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
//!
//! let service = LoggingService::new(1024, LogLevel::Audit);
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(CaptureLayer::new(service.clone()))
//!     .init();
//!
//! tracing::info!(audit = true, "application started");
//! let since = service.next_sequence();
//! let messages = service.get_messages(since as i64);
//! ```

mod attribution;
mod buffer;
mod context;
mod diagnostics;
mod entry;
mod error;
mod format;
mod layer;
mod registry;
mod service;

pub use attribution::{
	ApplicationMetadata, AttributionResolver, ComponentKind, ComponentMetadata, DeploymentMetadata,
	ModuleMetadata, WebComponent,
};
pub use buffer::{RingStore, SequenceSeed, DEFAULT_CAPACITY, MAX_INITIAL_SEQUENCE};
pub use context::{ContextGuard, ContextHandle, ExecutionContext};
pub use diagnostics::{DiagnosticSink, StderrDiagnostics};
pub use entry::{render_message, Attribution, LogEntry, LogLevel, PendingEntry, RawRecord};
pub use error::{ParseLevelError, ParseStateError, PublishError};
pub use format::format_entry;
pub use layer::CaptureLayer;
pub use registry::{ContextRegistry, LifecycleEvent, LifecycleListener, UnitState};
pub use service::{
	Attributor, EntryBatch, LoggingService, LoggingServiceBuilder, MessageBatch, PublishOutcome,
	DEFAULT_THRESHOLD,
};
