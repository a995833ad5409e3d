// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Log buffer configuration.

use logtail_buffer::{
	LogLevel, SequenceSeed, DEFAULT_CAPACITY, DEFAULT_THRESHOLD, MAX_INITIAL_SEQUENCE,
};
use serde::Deserialize;

use crate::error::ConfigError;

/// Buffer configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq)]
pub struct BufferConfig {
	/// Number of entries retained.
	pub capacity: usize,
	/// Records below this level are discarded.
	pub threshold: LogLevel,
	pub seed: SequenceSeed,
}

impl Default for BufferConfig {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CAPACITY,
			threshold: DEFAULT_THRESHOLD,
			seed: SequenceSeed::WallClock,
		}
	}
}

/// Buffer configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BufferConfigLayer {
	#[serde(default)]
	pub capacity: Option<usize>,
	#[serde(default)]
	pub threshold: Option<String>,
	/// Fixed starting sequence. Unset seeds from the wall clock.
	#[serde(default)]
	pub initial_sequence: Option<u64>,
}

impl BufferConfigLayer {
	pub fn merge(&mut self, other: BufferConfigLayer) {
		if other.capacity.is_some() {
			self.capacity = other.capacity;
		}
		if other.threshold.is_some() {
			self.threshold = other.threshold;
		}
		if other.initial_sequence.is_some() {
			self.initial_sequence = other.initial_sequence;
		}
	}

	pub fn finalize(self) -> Result<BufferConfig, ConfigError> {
		let capacity = self.capacity.unwrap_or(DEFAULT_CAPACITY);
		if capacity == 0 {
			return Err(ConfigError::InvalidValue {
				key: "buffer.capacity".to_string(),
				message: "capacity must be at least 1".to_string(),
			});
		}

		let threshold = match self.threshold {
			Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
				key: "buffer.threshold".to_string(),
				message: format!("{e}"),
			})?,
			None => DEFAULT_THRESHOLD,
		};

		let seed = match self.initial_sequence {
			Some(value) if value > MAX_INITIAL_SEQUENCE => {
				return Err(ConfigError::InvalidValue {
					key: "buffer.initial_sequence".to_string(),
					message: format!("must be at most {MAX_INITIAL_SEQUENCE}, got {value}"),
				});
			}
			Some(value) => SequenceSeed::Fixed(value),
			None => SequenceSeed::WallClock,
		};

		Ok(BufferConfig {
			capacity,
			threshold,
			seed,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_defaults() {
		let config = BufferConfigLayer::default().finalize().unwrap();
		assert_eq!(config, BufferConfig::default());
		assert_eq!(config.capacity, 1024);
		assert_eq!(config.threshold, LogLevel::Audit);
		assert_eq!(config.seed, SequenceSeed::WallClock);
	}

	#[test]
	fn test_custom_values() {
		let layer = BufferConfigLayer {
			capacity: Some(16),
			threshold: Some("warn".to_string()),
			initial_sequence: Some(0),
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.capacity, 16);
		assert_eq!(config.threshold, LogLevel::Warn);
		assert_eq!(config.seed, SequenceSeed::Fixed(0));
	}

	#[test]
	fn test_zero_capacity_rejected() {
		let layer = BufferConfigLayer {
			capacity: Some(0),
			..Default::default()
		};
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("buffer.capacity"));
	}

	#[test]
	fn test_unknown_threshold_rejected() {
		let layer = BufferConfigLayer {
			threshold: Some("loud".to_string()),
			..Default::default()
		};
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("unknown log level: loud"));
	}

	#[test]
	fn test_initial_sequence_upper_bound() {
		let at_limit = BufferConfigLayer {
			initial_sequence: Some(MAX_INITIAL_SEQUENCE),
			..Default::default()
		};
		assert_eq!(
			at_limit.finalize().unwrap().seed,
			SequenceSeed::Fixed(MAX_INITIAL_SEQUENCE)
		);

		for value in [MAX_INITIAL_SEQUENCE + 1, i64::MAX as u64 + 10, u64::MAX] {
			let layer = BufferConfigLayer {
				initial_sequence: Some(value),
				..Default::default()
			};
			let err = layer.finalize().unwrap_err();
			assert!(err.to_string().contains("buffer.initial_sequence"));
		}
	}

	proptest! {
		#[test]
		fn prop_merge_prefers_overlay(base in proptest::option::of(1usize..10_000), overlay in proptest::option::of(1usize..10_000)) {
			let mut layer = BufferConfigLayer { capacity: base, ..Default::default() };
			layer.merge(BufferConfigLayer { capacity: overlay, ..Default::default() });
			prop_assert_eq!(layer.capacity, overlay.or(base));
		}
	}
}
