//! Ranking of channel posts by view count

use std::cmp::Reverse;

use crate::message::Message;

/// Reorder `messages` so the most viewed post comes first.
///
/// Ties keep no particular order.
pub fn rank_by_views(messages: &mut [Message]) {
    messages.sort_unstable_by_key(|m| Reverse(m.views));
}

/// Whether every adjacent pair is ordered by descending views.
pub fn is_ranked(messages: &[Message]) -> bool {
    messages.windows(2).all(|w| w[0].views >= w[1].views)
}
