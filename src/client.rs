//! Protocol client seam
//!
//! Everything the exporter needs from Telegram goes through [`ProtocolClient`],
//! implemented for `grammers_client::Client` and for test doubles.

use std::future::Future;

use grammers_client::types::peer::Peer;
use grammers_client::Client;
use grammers_tl_types as tl;

use crate::error::Result;
use crate::message::HistoryPage;

/// Addressing key of a resolved channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: i64,
    pub access_hash: i64,
}

impl ChannelRef {
    pub fn new(id: i64, access_hash: i64) -> Self {
        Self { id, access_hash }
    }

    fn input_peer(&self) -> tl::enums::InputPeer {
        tl::enums::InputPeer::Channel(tl::types::InputPeerChannel {
            channel_id: self.id,
            access_hash: self.access_hash,
        })
    }
}

/// Result of resolving a public username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPeer {
    /// Broadcast channel.
    Channel(ChannelRef),
    /// Megagroup, channel-backed but not a broadcast.
    Supergroup,
    /// Basic group.
    Group,
    User,
}

impl ResolvedPeer {
    /// The channel reference, if this peer is a broadcast channel.
    pub fn broadcast_channel(&self) -> Option<ChannelRef> {
        match self {
            ResolvedPeer::Channel(channel) => Some(*channel),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedPeer::Channel(_) => "channel",
            ResolvedPeer::Supergroup => "supergroup",
            ResolvedPeer::Group => "group",
            ResolvedPeer::User => "user",
        }
    }
}

impl From<&Peer> for ResolvedPeer {
    fn from(peer: &Peer) -> Self {
        match peer {
            Peer::Channel(c) if c.raw.broadcast => ResolvedPeer::Channel(ChannelRef::new(
                c.raw.id,
                c.raw.access_hash.unwrap_or_default(),
            )),
            Peer::Channel(_) => ResolvedPeer::Supergroup,
            Peer::Group(g) => match &g.raw {
                tl::enums::Chat::Channel(_) | tl::enums::Chat::ChannelForbidden(_) => {
                    ResolvedPeer::Supergroup
                }
                _ => ResolvedPeer::Group,
            },
            Peer::User(_) => ResolvedPeer::User,
        }
    }
}

/// Operations the exporter performs against Telegram.
///
/// A client is used by one pipeline at a time; callers must not issue
/// requests concurrently on the same session.
pub trait ProtocolClient {
    /// Resolve a username (without `@`). `None` when nothing matches.
    fn resolve_peer(&self, username: &str) -> impl Future<Output = Result<Option<ResolvedPeer>>>;

    /// Fetch up to `limit` history entries older than `offset_id`
    /// (`0` means the newest ones).
    fn history_page(
        &self,
        channel: &ChannelRef,
        offset_id: i32,
        limit: i32,
    ) -> impl Future<Output = Result<HistoryPage>>;
}

impl ProtocolClient for Client {
    async fn resolve_peer(&self, username: &str) -> Result<Option<ResolvedPeer>> {
        let peer = self.resolve_username(username).await?;
        Ok(peer.as_ref().map(ResolvedPeer::from))
    }

    async fn history_page(
        &self,
        channel: &ChannelRef,
        offset_id: i32,
        limit: i32,
    ) -> Result<HistoryPage> {
        let request = tl::functions::messages::GetHistory {
            peer: channel.input_peer(),
            offset_id,
            offset_date: 0,
            add_offset: 0,
            limit,
            max_id: 0,
            min_id: 0,
            hash: 0,
        };
        let response = self.invoke(&request).await?;
        Ok(HistoryPage::from(response))
    }
}
