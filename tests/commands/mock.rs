//! Scripted protocol client and recording clock for pipeline tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use channel_views::{
    ChannelRef, Error, HistoryEntry, HistoryPage, Message, ProtocolClient, ResolvedPeer, Result,
    Sleeper,
};

pub const NEWS: ChannelRef = ChannelRef {
    id: 1001,
    access_hash: 42,
};

pub struct MockClient {
    peer: Option<ResolvedPeer>,
    pages: RefCell<VecDeque<Result<HistoryPage>>>,
    pub resolved: RefCell<Vec<String>>,
    pub page_requests: RefCell<Vec<(i32, i32)>>,
    pub resolve_calls: Cell<usize>,
}

impl MockClient {
    pub fn new(peer: Option<ResolvedPeer>, pages: Vec<Result<HistoryPage>>) -> Self {
        Self {
            peer,
            pages: RefCell::new(pages.into()),
            resolved: RefCell::new(Vec::new()),
            page_requests: RefCell::new(Vec::new()),
            resolve_calls: Cell::new(0),
        }
    }

    pub fn channel(pages: Vec<Result<HistoryPage>>) -> Self {
        Self::new(Some(ResolvedPeer::Channel(NEWS)), pages)
    }

    pub fn request_count(&self) -> usize {
        self.page_requests.borrow().len()
    }
}

impl ProtocolClient for MockClient {
    async fn resolve_peer(&self, username: &str) -> Result<Option<ResolvedPeer>> {
        self.resolve_calls.set(self.resolve_calls.get() + 1);
        self.resolved.borrow_mut().push(username.to_string());
        Ok(self.peer.clone())
    }

    async fn history_page(
        &self,
        channel: &ChannelRef,
        offset_id: i32,
        limit: i32,
    ) -> Result<HistoryPage> {
        assert_eq!(*channel, NEWS, "page requested for an unexpected channel");
        self.page_requests.borrow_mut().push((offset_id, limit));
        match self.pages.borrow_mut().pop_front() {
            Some(page) => page,
            None => Err(Error::TelegramError("no more scripted pages".into())),
        }
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    pub slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn total(&self) -> Duration {
        self.slept.borrow().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

pub fn page(messages: &[(i32, u32)]) -> Result<HistoryPage> {
    let entries = messages
        .iter()
        .map(|&(id, views)| HistoryEntry::Message(Message::new(id, views)))
        .collect();
    Ok(HistoryPage::new(entries, 3))
}

pub fn empty_page() -> Result<HistoryPage> {
    Ok(HistoryPage::new(Vec::new(), 3))
}
