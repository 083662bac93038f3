//! Channel message records

use grammers_tl_types as tl;

/// A channel post reduced to what the report needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Message {
    pub id: i32,
    pub views: u32,
}

impl Message {
    pub fn new(id: i32, views: u32) -> Self {
        Self { id, views }
    }
}

impl From<&tl::types::Message> for Message {
    fn from(raw: &tl::types::Message) -> Self {
        // Messages without a view counter (or a bogus negative one) count as unseen.
        let views = raw
            .views
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0);
        Self { id: raw.id, views }
    }
}

/// One entry of a history page as delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// A regular post.
    Message(Message),
    /// Service entries (pins, title changes, ...).
    Service { id: i32 },
    /// Deleted or inaccessible entries.
    Empty { id: i32 },
}

impl HistoryEntry {
    pub fn id(&self) -> i32 {
        match self {
            HistoryEntry::Message(m) => m.id,
            HistoryEntry::Service { id } | HistoryEntry::Empty { id } => *id,
        }
    }

    /// The post carried by this entry, if it is a regular message.
    pub fn message(&self) -> Option<Message> {
        match self {
            HistoryEntry::Message(m) => Some(*m),
            _ => None,
        }
    }
}

impl From<&tl::enums::Message> for HistoryEntry {
    fn from(raw: &tl::enums::Message) -> Self {
        match raw {
            tl::enums::Message::Message(m) => HistoryEntry::Message(Message::from(m)),
            tl::enums::Message::Service(m) => HistoryEntry::Service { id: m.id },
            tl::enums::Message::Empty(m) => HistoryEntry::Empty { id: m.id },
        }
    }
}

/// A single page of channel history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    /// Total number of entries the server claims the channel has. Advisory only.
    pub total: usize,
}

impl HistoryPage {
    pub fn new(entries: Vec<HistoryEntry>, total: usize) -> Self {
        Self { entries, total }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id of the oldest entry, used as the cursor for the next request.
    pub fn last_id(&self) -> Option<i32> {
        self.entries.last().map(HistoryEntry::id)
    }
}

impl From<tl::enums::messages::Messages> for HistoryPage {
    fn from(raw: tl::enums::messages::Messages) -> Self {
        let (messages, total) = match raw {
            tl::enums::messages::Messages::Messages(m) => {
                let total = m.messages.len();
                (m.messages, total)
            }
            tl::enums::messages::Messages::Slice(m) => {
                let total = usize::try_from(m.count).unwrap_or(0);
                (m.messages, total)
            }
            tl::enums::messages::Messages::ChannelMessages(m) => {
                let total = usize::try_from(m.count).unwrap_or(0);
                (m.messages, total)
            }
            tl::enums::messages::Messages::NotModified(m) => {
                (Vec::new(), usize::try_from(m.count).unwrap_or(0))
            }
        };

        Self {
            entries: messages.iter().map(HistoryEntry::from).collect(),
            total,
        }
    }
}
