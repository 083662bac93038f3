//! Channel views export: resolve, fetch, rank, write.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::auth::{authorize_if_necessary, TerminalCredentials};
use crate::chat::{normalize_username, resolve_channel};
use crate::client::ProtocolClient;
use crate::config::{
    Config, DEFAULT_PAGE_LIMIT, DEFAULT_REQUEST_DELAY_MS, DEFAULT_TIMEOUT_RETRY_MS, LINK_HOST,
    OUTPUT_FILE,
};
use crate::error::Result;
use crate::history::HistoryFetcher;
use crate::ranking::rank_by_views;
use crate::report::write_report;
use crate::retry::{FloodWaitRetry, Sleeper, TokioSleeper};
use crate::session::{open_session, SessionLock, TelegramClient};

/// Tunables of a single export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output: PathBuf,
    pub link_host: String,
    pub page_limit: i32,
    pub request_delay: Duration,
    pub timeout_retry: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(OUTPUT_FILE),
            link_host: LINK_HOST.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            timeout_retry: Duration::from_millis(DEFAULT_TIMEOUT_RETRY_MS),
        }
    }
}

impl From<&Config> for ExportOptions {
    fn from(config: &Config) -> Self {
        Self {
            output: config.output_file.clone(),
            link_host: config.link_host.clone(),
            page_limit: config.page_limit,
            request_delay: config.request_delay,
            timeout_retry: config.timeout_retry,
        }
    }
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub channel: String,
    pub messages: usize,
    pub output: PathBuf,
}

/// Resolve `channel_name`, collect its whole history, rank it by views and
/// write the links to `options.output`.
///
/// Nothing is written unless the history was fetched completely.
pub async fn export_ranked_links<C, S>(
    client: &C,
    sleeper: S,
    channel_name: &str,
    options: &ExportOptions,
) -> Result<ExportSummary>
where
    C: ProtocolClient,
    S: Sleeper,
{
    let username = normalize_username(channel_name);
    let channel = resolve_channel(client, username).await?;

    info!("Fetching history of @{}", username);
    let policy = FloodWaitRetry {
        timeout_delay: options.timeout_retry,
    };
    let mut messages = HistoryFetcher::new(client, policy, sleeper)
        .page_limit(options.page_limit)
        .request_delay(options.request_delay)
        .fetch_all(&channel)
        .await?;

    rank_by_views(&mut messages);
    write_report(&options.output, &options.link_host, username, &messages)?;
    info!(
        "Wrote {} links to {}",
        messages.len(),
        options.output.display()
    );

    Ok(ExportSummary {
        channel: username.to_string(),
        messages: messages.len(),
        output: options.output.clone(),
    })
}

/// Full run against Telegram: lock the session, connect, sign in if needed,
/// then export.
pub async fn run(config: &Config, channel_name: &str) -> Result<ExportSummary> {
    config.validate()?;

    let _lock = SessionLock::acquire(&config.lock_file)?;
    let session = open_session(&config.session_file)?;
    let client = TelegramClient::connect(session, config.api_id).await?;

    let credentials = TerminalCredentials::new(config.phone.as_str());
    authorize_if_necessary(&client.client, &config.api_hash, &credentials).await?;

    export_ranked_links(
        &client.client,
        TokioSleeper,
        channel_name,
        &ExportOptions::from(config),
    )
    .await
}
