// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Fixed-capacity ring of sequenced log entries.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::entry::{LogEntry, PendingEntry};

/// Default buffer capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Largest starting sequence. Leaves 2^62 appends before sequences stop being
/// addressable through the signed `from` of the query surface.
pub const MAX_INITIAL_SEQUENCE: u64 = (i64::MAX as u64) / 2;

/// Where the sequence counter starts.
///
/// Fixed values above [`MAX_INITIAL_SEQUENCE`] are lowered to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceSeed {
	/// Milliseconds since the Unix epoch at construction time. Sequences
	/// issued after a restart are then greater than the ones issued before
	/// it, as long as the wall clock did not go backwards.
	#[default]
	WallClock,
	/// A fixed starting value.
	Fixed(u64),
}

impl SequenceSeed {
	fn resolve(self) -> u64 {
		match self {
			SequenceSeed::WallClock => u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0),
			SequenceSeed::Fixed(value) => value.min(MAX_INITIAL_SEQUENCE),
		}
	}
}

/// A thread-safe ring buffer that sequences and retains the most recent
/// `capacity` entries.
///
/// Sequence assignment, slot writes and snapshots all go through one mutex,
/// so a reader never observes a high-water mark it cannot then retrieve.
pub struct RingStore {
	state: Mutex<RingState>,
	capacity: usize,
	initial_sequence: u64,
}

struct RingState {
	slots: Box<[Option<Arc<LogEntry>>]>,
	/// Next slot to write. Always one past the most recent write.
	head: usize,
	next_sequence: u64,
}

impl RingStore {
	/// Create a store with the given capacity. A capacity of zero is raised
	/// to one.
	pub fn new(capacity: usize, seed: SequenceSeed) -> Self {
		let capacity = capacity.max(1);
		let initial_sequence = seed.resolve();
		Self {
			state: Mutex::new(RingState {
				slots: vec![None; capacity].into_boxed_slice(),
				head: 0,
				next_sequence: initial_sequence,
			}),
			capacity,
			initial_sequence,
		}
	}

	/// Create a store with default capacity, seeded from the wall clock.
	pub fn with_default_capacity() -> Self {
		Self::new(DEFAULT_CAPACITY, SequenceSeed::WallClock)
	}

	/// Sequence and store an entry, overwriting the oldest one when full.
	///
	/// Returns the assigned sequence.
	pub fn append(&self, pending: PendingEntry) -> u64 {
		let mut state = self.state.lock();
		let sequence = state.next_sequence;
		state.next_sequence += 1;
		let head = state.head;
		state.slots[head] = Some(Arc::new(pending.sequenced(sequence)));
		state.head = (head + 1) % self.capacity;
		sequence
	}

	/// The sequence the next appended entry will receive.
	pub fn latest_sequence(&self) -> u64 {
		self.state.lock().next_sequence
	}

	/// The value the sequence counter was seeded with.
	pub fn initial_sequence(&self) -> u64 {
		self.initial_sequence
	}

	/// Sequence of the oldest entry still retained, or the next sequence
	/// when nothing has been appended.
	pub fn earliest_retained_sequence(&self) -> u64 {
		let state = self.state.lock();
		state.next_sequence - self.retained(&state) as u64
	}

	/// Snapshot all retained entries with `sequence >= from`, oldest first.
	///
	/// `from` values before the retained window are clamped to its start and
	/// values at or past the high-water mark yield nothing. With `max_count`
	/// only the oldest `max_count` entries of the window are returned, so a
	/// poller resuming after the last one it saw misses nothing.
	pub fn query(&self, from: u64, max_count: Option<usize>) -> Vec<Arc<LogEntry>> {
		let state = self.state.lock();
		let from = from.max(self.initial_sequence);
		if from >= state.next_sequence {
			return Vec::new();
		}

		let delta = state.next_sequence - from;
		let (mut position, window) = if delta > self.capacity as u64 {
			(state.head, self.capacity)
		} else {
			let count = delta as usize;
			((state.head + self.capacity - count) % self.capacity, count)
		};
		let count = max_count.map_or(window, |max| window.min(max));

		let mut entries = Vec::with_capacity(count);
		for _ in 0..count {
			if let Some(entry) = &state.slots[position] {
				entries.push(Arc::clone(entry));
			}
			position += 1;
			if position == self.capacity {
				position = 0;
			}
		}
		entries
	}

	/// Number of entries currently retained.
	pub fn len(&self) -> usize {
		let state = self.state.lock();
		self.retained(&state)
	}

	/// Check if nothing has been appended yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Get the buffer capacity.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	fn retained(&self, state: &RingState) -> usize {
		let written = state.next_sequence - self.initial_sequence;
		written.min(self.capacity as u64) as usize
	}
}

impl Default for RingStore {
	fn default() -> Self {
		Self::with_default_capacity()
	}
}
