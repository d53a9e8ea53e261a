//! Conversation-related types.

use arxiv_agent_model::ModelMessage;

/// An ordered sequence of messages, insertion order significant.
///
/// A conversation is owned exclusively by one [`Agent`](crate::Agent)
/// for the duration of a run; across runs it may be persisted by a
/// [`CheckpointStore`](crate::checkpoint::CheckpointStore).
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    items: Vec<ModelMessage>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the messages in insertion order.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.items
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the conversation has no messages yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub(crate) fn push(&mut self, msg: ModelMessage) {
        self.items.push(msg);
    }
}
