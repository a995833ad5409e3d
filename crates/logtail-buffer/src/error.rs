// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Why a record that passed admission was not stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
	#[error("attribution failed for logger '{logger}': {reason}")]
	Attribution { logger: String, reason: String },

	#[error("message rendering failed for logger '{logger}': {reason}")]
	Render { logger: String, reason: String },

	#[error("buffer append failed for logger '{logger}': {reason}")]
	Append { logger: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown lifecycle state: {0}")]
pub struct ParseStateError(pub String);
