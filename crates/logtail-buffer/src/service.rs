// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Publish and query boundary over the ring store.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::attribution::AttributionResolver;
use crate::buffer::{RingStore, SequenceSeed, DEFAULT_CAPACITY};
use crate::context::ExecutionContext;
use crate::diagnostics::{DiagnosticSink, StderrDiagnostics};
use crate::entry::{Attribution, LogEntry, LogLevel, PendingEntry, RawRecord};
use crate::error::PublishError;
use crate::format::format_entry;
use crate::registry::{ContextRegistry, LifecycleEvent, LifecycleListener};

/// Default admission threshold.
pub const DEFAULT_THRESHOLD: LogLevel = LogLevel::Audit;

/// Strategy that attributes a record to a deployed unit.
pub trait Attributor: Send + Sync {
	fn attribute(&self, ctx: &ExecutionContext) -> Attribution;
}

impl Attributor for AttributionResolver {
	fn attribute(&self, ctx: &ExecutionContext) -> Attribution {
		self.resolve(ctx)
	}
}

/// What happened to a published record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
	/// Stored under the given sequence.
	Stored(u64),
	/// Below the admission threshold.
	Filtered,
	/// Failed unexpectedly; reported to the diagnostic sink.
	Dropped(PublishError),
}

/// Formatted messages from one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBatch {
	pub messages: Vec<String>,
	/// Pass this as `from` on the next poll.
	pub next_sequence: u64,
}

/// Structured entries from one poll.
#[derive(Debug, Clone)]
pub struct EntryBatch {
	pub entries: Vec<Arc<LogEntry>>,
	/// Pass this as `from` on the next poll.
	pub next_sequence: u64,
}

/// In-process log tail: admits records at or above a threshold, attributes
/// and sequences them, and serves them back to polling consumers.
///
/// Cloning is cheap; all clones share the same buffer.
#[derive(Clone)]
pub struct LoggingService {
	inner: Arc<ServiceInner>,
}

struct ServiceInner {
	store: RingStore,
	registry: Arc<ContextRegistry>,
	attributor: Arc<dyn Attributor>,
	threshold: LogLevel,
	diagnostics: Arc<dyn DiagnosticSink>,
}

impl LoggingService {
	/// Create a service with the given capacity and threshold, seeded from
	/// the wall clock.
	pub fn new(capacity: usize, threshold: LogLevel) -> Self {
		Self::builder().capacity(capacity).threshold(threshold).build()
	}

	pub fn builder() -> LoggingServiceBuilder {
		LoggingServiceBuilder::default()
	}

	/// Admit, attribute and store a record.
	///
	/// Never panics: any failure past the admission filter is reported to
	/// the diagnostic sink and the record is dropped.
	pub fn publish(&self, record: RawRecord, ctx: &ExecutionContext) -> PublishOutcome {
		if record.level < self.inner.threshold {
			return PublishOutcome::Filtered;
		}

		match self.try_publish(record, ctx) {
			Ok(sequence) => PublishOutcome::Stored(sequence),
			Err(error) => {
				self.inner.diagnostics.report(&error);
				PublishOutcome::Dropped(error)
			}
		}
	}

	fn try_publish(&self, record: RawRecord, ctx: &ExecutionContext) -> Result<u64, PublishError> {
		let inner = &self.inner;

		let attribution = guarded(|| inner.attributor.attribute(ctx))
			.map_err(|reason| PublishError::Attribution {
				logger: record.logger.clone(),
				reason,
			})?;

		let message = guarded(|| record.render()).map_err(|reason| PublishError::Render {
			logger: record.logger.clone(),
			reason,
		})?;

		let logger = record.logger;
		let pending = PendingEntry {
			timestamp: record.timestamp,
			level: record.level,
			logger: logger.clone(),
			attribution,
			message,
			throwable: record.error,
		};

		guarded(move || inner.store.append(pending))
			.map_err(|reason| PublishError::Append { logger, reason })
	}

	/// The sequence the next stored record will receive.
	pub fn next_sequence(&self) -> u64 {
		let next = self.inner.store.latest_sequence();
		debug!(next_sequence = next, "returning next sequence");
		next
	}

	/// Formatted messages with `sequence >= from`, oldest first.
	pub fn get_messages(&self, from: i64) -> Vec<String> {
		self.get_messages_truncated(from, None)
	}

	/// Formatted messages with `sequence >= from`, each cut to at most
	/// `max_message_length` characters.
	pub fn get_messages_truncated(
		&self,
		from: i64,
		max_message_length: Option<usize>,
	) -> Vec<String> {
		self.poll_messages(from, max_message_length).messages
	}

	/// Like [`get_messages_truncated`](Self::get_messages_truncated), plus the
	/// sequence a poller should pass as `from` next time.
	///
	/// The snapshot is taken under the buffer lock; formatting happens after
	/// it is released.
	pub fn poll_messages(&self, from: i64, max_message_length: Option<usize>) -> MessageBatch {
		debug!(from, ?max_message_length, "fetching messages");
		let batch = self.poll_entries(from, None);

		match (batch.entries.first(), batch.entries.last()) {
			(Some(first), Some(last)) => debug!(
				count = batch.entries.len(),
				first = first.sequence,
				last = last.sequence,
				"returning messages"
			),
			_ => debug!("no messages returned"),
		}

		MessageBatch {
			messages: batch
				.entries
				.iter()
				.map(|entry| format_entry(entry, max_message_length))
				.collect(),
			next_sequence: batch.next_sequence,
		}
	}

	/// Structured snapshot of entries with `sequence >= from`.
	///
	/// Negative `from` values read from the start of the retained window.
	pub fn entries(&self, from: i64, max_count: Option<usize>) -> Vec<Arc<LogEntry>> {
		let from = u64::try_from(from).unwrap_or(0);
		self.inner.store.query(from, max_count)
	}

	/// Like [`entries`](Self::entries), plus the sequence to resume from.
	///
	/// The resume point comes from the snapshot itself, so records stored
	/// between the query and the caller's next poll are neither skipped nor
	/// repeated.
	pub fn poll_entries(&self, from: i64, max_count: Option<usize>) -> EntryBatch {
		let before = self.inner.store.latest_sequence();
		let entries = self.entries(from, max_count);
		let next_sequence = entries.last().map_or(before, |entry| entry.sequence + 1);
		EntryBatch {
			entries,
			next_sequence,
		}
	}

	/// Context registry fed by lifecycle events.
	pub fn registry(&self) -> &Arc<ContextRegistry> {
		&self.inner.registry
	}

	pub fn threshold(&self) -> LogLevel {
		self.inner.threshold
	}

	/// Number of entries currently retained.
	pub fn len(&self) -> usize {
		self.inner.store.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.store.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.inner.store.capacity()
	}

	/// Sequence of the oldest retained entry.
	pub fn earliest_sequence(&self) -> u64 {
		self.inner.store.earliest_retained_sequence()
	}
}

impl Default for LoggingService {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl LifecycleListener for LoggingService {
	fn state_changed(&self, event: &LifecycleEvent) {
		self.inner.registry.state_changed(event);
	}
}

/// Builder for [`LoggingService`].
pub struct LoggingServiceBuilder {
	capacity: usize,
	seed: SequenceSeed,
	threshold: LogLevel,
	registry: Option<Arc<ContextRegistry>>,
	attributor: Option<Arc<dyn Attributor>>,
	diagnostics: Arc<dyn DiagnosticSink>,
}

impl Default for LoggingServiceBuilder {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CAPACITY,
			seed: SequenceSeed::WallClock,
			threshold: DEFAULT_THRESHOLD,
			registry: None,
			attributor: None,
			diagnostics: Arc::new(StderrDiagnostics),
		}
	}
}

impl LoggingServiceBuilder {
	pub fn capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;
		self
	}

	pub fn seed(mut self, seed: SequenceSeed) -> Self {
		self.seed = seed;
		self
	}

	pub fn threshold(mut self, threshold: LogLevel) -> Self {
		self.threshold = threshold;
		self
	}

	/// Share an existing registry instead of creating one.
	pub fn registry(mut self, registry: Arc<ContextRegistry>) -> Self {
		self.registry = Some(registry);
		self
	}

	/// Replace the registry-backed [`AttributionResolver`].
	pub fn attributor(mut self, attributor: Arc<dyn Attributor>) -> Self {
		self.attributor = Some(attributor);
		self
	}

	pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
		self.diagnostics = diagnostics;
		self
	}

	pub fn build(self) -> LoggingService {
		let registry = self.registry.unwrap_or_default();
		let attributor = self
			.attributor
			.unwrap_or_else(|| Arc::new(AttributionResolver::new(Arc::clone(&registry))));

		LoggingService {
			inner: Arc::new(ServiceInner {
				store: RingStore::new(self.capacity, self.seed),
				registry,
				attributor,
				threshold: self.threshold,
				diagnostics: self.diagnostics,
			}),
		}
	}
}

fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, String> {
	panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic".to_string()
	}
}
