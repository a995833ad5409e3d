// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Mapping from execution contexts to deployed units, kept in sync by
//! lifecycle events.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::attribution::DeploymentMetadata;
use crate::context::ContextHandle;
use crate::error::ParseStateError;

/// Lifecycle state a deployed unit transitions into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
	Starting,
	Started,
	Stopping,
	Stopped,
}

impl FromStr for UnitState {
	type Err = ParseStateError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"STARTING" => Ok(UnitState::Starting),
			"STARTED" => Ok(UnitState::Started),
			"STOPPING" => Ok(UnitState::Stopping),
			"STOPPED" => Ok(UnitState::Stopped),
			_ => Err(ParseStateError(s.to_string())),
		}
	}
}

/// A deployed unit changed state.
#[derive(Debug, Clone)]
pub struct LifecycleEvent {
	/// Execution context owned by the unit. Units without one are ignored.
	pub handle: Option<ContextHandle>,
	pub metadata: Arc<DeploymentMetadata>,
	pub state: UnitState,
}

/// Receives deployment lifecycle notifications.
pub trait LifecycleListener: Send + Sync {
	fn state_changed(&self, event: &LifecycleEvent);
}

/// Identity-keyed map from [`ContextHandle`] to the metadata of the unit that
/// owns it.
///
/// Stored metadata is compared by pointer, never by value: a stop event only
/// removes the mapping if it carries the very `Arc` that was registered.
#[derive(Debug, Default)]
pub struct ContextRegistry {
	units: RwLock<HashMap<ContextHandle, Arc<DeploymentMetadata>>>,
}

impl ContextRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `metadata` for `handle` unless a mapping already exists.
	///
	/// Returns `true` if the mapping was inserted.
	pub fn on_unit_starting(
		&self,
		handle: ContextHandle,
		metadata: Arc<DeploymentMetadata>,
	) -> bool {
		let mut units = self.units.write();
		if units.contains_key(&handle) {
			return false;
		}
		debug!(unit = metadata.name(), context = %handle, "adding context mapping");
		units.insert(handle, metadata);
		true
	}

	/// Remove the mapping for `handle` if it still points at `metadata`.
	///
	/// Returns `true` if a mapping was removed.
	pub fn on_unit_stopped(
		&self,
		handle: ContextHandle,
		metadata: &Arc<DeploymentMetadata>,
	) -> bool {
		let mut units = self.units.write();
		match units.get(&handle) {
			Some(current) if Arc::ptr_eq(current, metadata) => {
				debug!(unit = metadata.name(), context = %handle, "removing context mapping");
				units.remove(&handle);
				true
			}
			_ => false,
		}
	}

	pub fn lookup(&self, handle: ContextHandle) -> Option<Arc<DeploymentMetadata>> {
		self.units.read().get(&handle).cloned()
	}

	pub fn len(&self) -> usize {
		self.units.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.units.read().is_empty()
	}
}

impl LifecycleListener for ContextRegistry {
	fn state_changed(&self, event: &LifecycleEvent) {
		let Some(handle) = event.handle else {
			return;
		};
		match event.state {
			UnitState::Starting => {
				self.on_unit_starting(handle, Arc::clone(&event.metadata));
			}
			UnitState::Stopped => {
				self.on_unit_stopped(handle, &event.metadata);
			}
			UnitState::Started | UnitState::Stopping => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn app(name: &str) -> Arc<DeploymentMetadata> {
		Arc::new(DeploymentMetadata::Application(DeploymentMetadata::application(name)))
	}

	#[test]
	fn test_start_is_insert_if_absent() {
		let registry = ContextRegistry::new();
		let handle = ContextHandle::new();
		let first = app("first");
		let second = app("second");

		assert!(registry.on_unit_starting(handle, Arc::clone(&first)));
		assert!(!registry.on_unit_starting(handle, Arc::clone(&first)));
		assert!(!registry.on_unit_starting(handle, second));
		assert!(Arc::ptr_eq(&registry.lookup(handle).unwrap(), &first));
	}

	#[test]
	fn test_stop_requires_same_instance() {
		let registry = ContextRegistry::new();
		let handle = ContextHandle::new();
		let registered = app("shop");
		let lookalike = app("shop");
		assert_eq!(registered, lookalike);

		registry.on_unit_starting(handle, Arc::clone(&registered));
		assert!(!registry.on_unit_stopped(handle, &lookalike));
		assert_eq!(registry.len(), 1);

		assert!(registry.on_unit_stopped(handle, &registered));
		assert!(registry.is_empty());
		assert!(!registry.on_unit_stopped(handle, &registered));
	}

	#[test]
	fn test_equal_handles_never_collapse() {
		let registry = ContextRegistry::new();
		let a = ContextHandle::new();
		let b = ContextHandle::new();
		registry.on_unit_starting(a, app("a"));
		registry.on_unit_starting(b, app("b"));
		assert_eq!(registry.len(), 2);
		assert_eq!(registry.lookup(b).unwrap().name(), "b");
	}

	#[test]
	fn test_interleaved_reuse_of_handle() {
		let registry = ContextRegistry::new();
		let handle = ContextHandle::new();
		let old_unit = app("old");
		let new_unit = app("new");

		registry.on_unit_starting(handle, Arc::clone(&old_unit));
		registry.on_unit_stopped(handle, &old_unit);
		registry.on_unit_starting(handle, Arc::clone(&new_unit));
		// A late stop for the old unit must not evict the new one.
		registry.on_unit_stopped(handle, &old_unit);
		assert_eq!(registry.lookup(handle).unwrap().name(), "new");
	}

	#[test]
	fn test_listener_ignores_other_states_and_missing_handles() {
		let registry = ContextRegistry::new();
		let handle = ContextHandle::new();
		let metadata = app("shop");

		for state in [UnitState::Started, UnitState::Stopping] {
			registry.state_changed(&LifecycleEvent {
				handle: Some(handle),
				metadata: Arc::clone(&metadata),
				state,
			});
		}
		registry.state_changed(&LifecycleEvent {
			handle: None,
			metadata: Arc::clone(&metadata),
			state: UnitState::Starting,
		});
		assert!(registry.is_empty());

		registry.state_changed(&LifecycleEvent {
			handle: Some(handle),
			metadata: Arc::clone(&metadata),
			state: UnitState::Starting,
		});
		assert_eq!(registry.len(), 1);

		registry.state_changed(&LifecycleEvent {
			handle: Some(handle),
			metadata,
			state: UnitState::Stopped,
		});
		assert!(registry.is_empty());
	}

	#[test]
	fn test_parse_unit_state() {
		assert_eq!("STARTING".parse::<UnitState>().unwrap(), UnitState::Starting);
		assert_eq!("stopped".parse::<UnitState>().unwrap(), UnitState::Stopped);
		assert!("RUNNING".parse::<UnitState>().is_err());
	}
}
