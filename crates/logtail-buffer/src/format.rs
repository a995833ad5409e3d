// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Human-readable rendering of stored entries.

use crate::entry::LogEntry;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const ELLIPSIS: &str = "...";

/// Render an entry as
/// `{timestamp} {LEVEL} [{application}|{module}|{component}] {logger}: {message}`
/// followed by the throwable on the next line, if any.
///
/// With `max_length`, the result is at most `max_length` characters. The
/// header is kept and the message/throwable body is cut, ending in `...`
/// when there is room for it. A header longer than `max_length` is itself cut.
pub fn format_entry(entry: &LogEntry, max_length: Option<usize>) -> String {
	let header = header(entry);
	let mut body = entry.message.clone();
	if let Some(throwable) = &entry.throwable {
		body.push('\n');
		body.push_str(throwable);
	}

	let Some(max) = max_length else {
		return header + &body;
	};

	let header_len = header.chars().count();
	if header_len >= max {
		return header.chars().take(max).collect();
	}

	let room = max - header_len;
	if body.chars().count() <= room {
		return header + &body;
	}

	let mut out = header;
	if room >= ELLIPSIS.len() {
		out.extend(body.chars().take(room - ELLIPSIS.len()));
		out.push_str(ELLIPSIS);
	} else {
		out.extend(body.chars().take(room));
	}
	out
}

fn header(entry: &LogEntry) -> String {
	let attribution = &entry.attribution;
	format!(
		"{} {} [{}|{}|{}] {}: ",
		entry.timestamp.format(TIMESTAMP_FORMAT),
		entry.level,
		attribution.application.as_deref().unwrap_or_default(),
		attribution.module.as_deref().unwrap_or_default(),
		attribution.component.as_deref().unwrap_or_default(),
		entry.logger,
	)
}
