// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Polling client for a remote log tail.

use std::ops::ControlFlow;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use url::Url;

use crate::routes::logs::{
	EntriesParams, EntriesResponse, MessagesParams, MessagesResponse, NextSequenceResponse,
};

pub struct LogTailClient {
	base_url: Url,
	http: reqwest::Client,
	max_length: Option<usize>,
}

impl LogTailClient {
	pub fn new(base_url: &str) -> Result<Self> {
		let base_url = Url::parse(base_url).context("invalid server URL")?;
		let http = reqwest::Client::builder()
			.user_agent(concat!("logtail/", env!("CARGO_PKG_VERSION")))
			.build()
			.context("failed to build HTTP client")?;
		Ok(Self {
			base_url,
			http,
			max_length: None,
		})
	}

	/// Truncate every message fetched by [`follow`](Self::follow).
	pub fn with_max_length(mut self, max_length: usize) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub async fn next_sequence(&self) -> Result<u64> {
		let response: NextSequenceResponse = self.get("api/logs/next-sequence", &()).await?;
		Ok(response.next_sequence)
	}

	pub async fn messages(&self, from: i64, max_length: Option<usize>) -> Result<MessagesResponse> {
		self.get("api/logs/messages", &MessagesParams { from, max_length })
			.await
	}

	pub async fn entries(&self, from: i64, limit: Option<usize>) -> Result<EntriesResponse> {
		self.get("api/logs/entries", &EntriesParams { from, limit })
			.await
	}

	/// Poll for new messages starting at `from`, handing each one to
	/// `on_message` in sequence order.
	///
	/// Returns the sequence to resume from once `on_message` breaks.
	pub async fn follow<F>(&self, from: i64, interval: Duration, mut on_message: F) -> Result<i64>
	where
		F: FnMut(&str) -> ControlFlow<()>,
	{
		let mut from = from;
		loop {
			let batch = self.messages(from, self.max_length).await?;
			let next = i64::try_from(batch.next_sequence).unwrap_or(i64::MAX);
			tracing::debug!(from, next, count = batch.messages.len(), "polled log tail");

			// A batch is gap-free and ends just below `next`.
			let first = next - batch.messages.len() as i64;
			for (offset, message) in batch.messages.iter().enumerate() {
				if on_message(message).is_break() {
					return Ok(first + offset as i64 + 1);
				}
			}
			from = next;

			tokio::time::sleep(interval).await;
		}
	}

	async fn get<Q, T>(&self, path: &str, query: &Q) -> Result<T>
	where
		Q: serde::Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let url = self.base_url.join(path)?;
		let response = self.http.get(url).query(query).send().await?;

		if !response.status().is_success() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			anyhow::bail!("Failed to fetch {path}: {status} - {body}");
		}

		Ok(response.json().await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rejects_invalid_url() {
		assert!(LogTailClient::new("not a url").is_err());
	}

	#[test]
	fn test_max_length_builder() {
		let client = LogTailClient::new("http://127.0.0.1:9250").unwrap().with_max_length(80);
		assert_eq!(client.max_length, Some(80));
	}
}
