//! Telegram channel views exporter
//!
//! This library provides tools to:
//! - Resolve a public channel by username
//! - Page through its full history, sleeping off flood-control waits
//! - Rank posts by view count
//! - Write the ranked post links to a text file

pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod message;
pub mod ranking;
pub mod report;
pub mod retry;
pub mod session;

// Re-export common types
pub use client::{ChannelRef, ProtocolClient, ResolvedPeer};
pub use config::Config;
pub use error::{Error, Result};
pub use history::HistoryFetcher;
pub use message::{HistoryEntry, HistoryPage, Message};
pub use ranking::rank_by_views;
pub use retry::{FloodWaitRetry, RetryPolicy, Sleeper, TokioSleeper};
pub use session::{SessionLock, TelegramClient};

// Commands use the re-exported types, so they are declared last
pub mod commands;
