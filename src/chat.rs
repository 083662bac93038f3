//! Channel resolution

use tracing::debug;

use crate::client::{ChannelRef, ProtocolClient};
use crate::error::{Error, Result};

/// Strip the optional leading `@` from a channel username.
pub fn normalize_username(name: &str) -> &str {
    name.trim().trim_start_matches('@')
}

/// Resolve a public username to a broadcast channel.
pub async fn resolve_channel<C: ProtocolClient>(client: &C, name: &str) -> Result<ChannelRef> {
    let username = normalize_username(name);
    if username.is_empty() {
        return Err(Error::InvalidArgument("channel name is empty".to_string()));
    }

    let peer = client
        .resolve_peer(username)
        .await?
        .ok_or_else(|| Error::ChannelNotFound(username.to_string()))?;

    let channel = peer.broadcast_channel().ok_or_else(|| Error::NotAChannel {
        name: username.to_string(),
        kind: peer.kind(),
    })?;

    debug!("Resolved @{} to channel {}", username, channel.id);
    Ok(channel)
}
