// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Execution context handed to the publish path.
//!
//! Callers pass an [`ExecutionContext`] to [`crate::LoggingService::publish`]
//! explicitly. For code that logs through `tracing`, an RAII guard scopes a
//! context to the current thread so the capture layer can pick it up.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::attribution::DeploymentMetadata;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of an execution context (the unit whose code is running).
///
/// Handles are never derived from a value: each call to [`ContextHandle::new`]
/// yields a distinct handle, so two contexts that happen to look alike are
/// never collapsed into one mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(u64);

impl ContextHandle {
	/// Allocate a fresh, process-unique handle.
	#[allow(clippy::new_without_default)]
	pub fn new() -> Self {
		Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
	}

	pub fn id(&self) -> u64 {
		self.0
	}
}

impl std::fmt::Display for ContextHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ctx-{}", self.0)
	}
}

/// What is known about the code emitting a record.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
	/// Metadata bound to the current unit of work, if any.
	pub metadata: Option<Arc<DeploymentMetadata>>,
	/// Handle used to look up metadata registered by lifecycle events.
	pub context_handle: Option<ContextHandle>,
	/// Set for threads owned by a managed worker pool. A missing `metadata`
	/// on such a thread is trusted and no handle lookup is attempted.
	pub pooled_worker: bool,
}

thread_local! {
	static CURRENT: RefCell<Option<ExecutionContext>> = const { RefCell::new(None) };
}

impl ExecutionContext {
	/// A context with nothing known about the caller.
	pub fn none() -> Self {
		Self::default()
	}

	pub fn with_metadata(metadata: Arc<DeploymentMetadata>) -> Self {
		Self {
			metadata: Some(metadata),
			..Self::default()
		}
	}

	pub fn with_handle(handle: ContextHandle) -> Self {
		Self {
			context_handle: Some(handle),
			..Self::default()
		}
	}

	pub fn pooled(mut self) -> Self {
		self.pooled_worker = true;
		self
	}

	/// Make this the current context of the calling thread until the guard
	/// is dropped.
	pub fn enter(self) -> ContextGuard {
		let previous = CURRENT.with(|ctx| ctx.borrow_mut().replace(self));
		ContextGuard {
			previous,
			_not_send: PhantomData,
		}
	}

	/// The context entered on this thread, or an empty one.
	pub fn current() -> Self {
		CURRENT.with(|ctx| ctx.borrow().clone()).unwrap_or_default()
	}
}

/// Restores the previously entered context on drop.
///
/// The guard is tied to the thread that entered it and cannot be sent to
/// another one, so it cannot be held across an `.await` on a multi-threaded
/// runtime:
///
/// ```compile_fail
/// use logtail_buffer::{ContextHandle, ExecutionContext};
///
/// let guard = ExecutionContext::with_handle(ContextHandle::new()).enter();
/// std::thread::spawn(move || drop(guard));
/// ```
pub struct ContextGuard {
	previous: Option<ExecutionContext>,
	_not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
	fn drop(&mut self) {
		let previous = self.previous.take();
		CURRENT.with(|ctx| *ctx.borrow_mut() = previous);
	}
}
