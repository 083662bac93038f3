//! Full channel history retrieval

use std::time::Duration;

use tracing::{debug, info};

use crate::client::{ChannelRef, ProtocolClient};
use crate::config::{DEFAULT_PAGE_LIMIT, DEFAULT_REQUEST_DELAY_MS};
use crate::error::Result;
use crate::message::Message;
use crate::retry::{retry_with, RetryPolicy, Sleeper};

/// Pages through a channel from the newest post to the oldest.
pub struct HistoryFetcher<'a, C, P, S> {
    client: &'a C,
    policy: P,
    sleeper: S,
    page_limit: i32,
    request_delay: Duration,
}

impl<'a, C, P, S> HistoryFetcher<'a, C, P, S>
where
    C: ProtocolClient,
    P: RetryPolicy,
    S: Sleeper,
{
    pub fn new(client: &'a C, policy: P, sleeper: S) -> Self {
        Self {
            client,
            policy,
            sleeper,
            page_limit: DEFAULT_PAGE_LIMIT,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        }
    }

    /// Maximum number of entries asked for per request.
    pub fn page_limit(mut self, limit: i32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Pause before every request except the very first.
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Collect every regular message of the channel, newest first.
    ///
    /// Flood-control and timeouts are retried according to the policy; any
    /// other error aborts the fetch and nothing collected so far is returned.
    pub async fn fetch_all(&self, channel: &ChannelRef) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        let mut offset_id = 0;
        let mut first_request = true;

        loop {
            let paced = !first_request;
            let page = retry_with(&self.policy, &self.sleeper, |attempt| async move {
                if paced || attempt.get() > 1 {
                    self.sleeper.sleep(self.request_delay).await;
                }
                self.client
                    .history_page(channel, offset_id, self.page_limit)
                    .await
            })
            .await?;
            first_request = false;

            let Some(last_id) = page.last_id() else {
                break;
            };

            let before = messages.len();
            messages.extend(page.entries.iter().filter_map(|e| e.message()));
            debug!(
                "Page before {}: {} entries, {} kept",
                offset_id,
                page.entries.len(),
                messages.len() - before
            );
            info!("Progress {} out of {}", messages.len(), page.total);

            offset_id = last_id;
        }

        Ok(messages)
    }
}
