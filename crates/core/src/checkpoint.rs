//! Conversation persistence across agent runs.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Mutex;

use crate::conversation::Conversation;

/// A key identifying one persisted conversation across multiple runs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ThreadId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ThreadId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Display for ThreadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External persistence of conversation state, keyed by thread.
///
/// The agent saves the conversation after every completed round, and
/// restores it when it is built with a thread that has prior state. How
/// (and for how long) the store retains conversations is up to the
/// implementation.
pub trait CheckpointStore: Send + Sync {
    /// Loads the conversation for a thread, if one was saved.
    fn load(&self, thread: &ThreadId) -> Option<Conversation>;

    /// Saves the conversation for a thread, replacing any prior state.
    fn save(&self, thread: &ThreadId, conversation: &Conversation);
}

/// An in-memory checkpoint store.
///
/// Conversations live as long as the store itself; share it between
/// agents to resume threads within one process.
#[derive(Default)]
pub struct MemorySaver {
    threads: Mutex<HashMap<ThreadId, Conversation>>,
}

impl MemorySaver {
    /// Creates an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemorySaver {
    fn load(&self, thread: &ThreadId) -> Option<Conversation> {
        self.threads.lock().unwrap().get(thread).cloned()
    }

    fn save(&self, thread: &ThreadId, conversation: &Conversation) {
        self.threads
            .lock()
            .unwrap()
            .insert(thread.clone(), conversation.clone());
    }
}

#[cfg(test)]
mod tests {
    use arxiv_agent_model::ModelMessage;

    use super::*;

    #[test]
    fn test_save_and_load() {
        let store = MemorySaver::new();
        let thread = ThreadId::from("thread:1");
        assert!(store.load(&thread).is_none());

        let mut conversation = Conversation::new();
        conversation.push(ModelMessage::User("hello".to_owned()));
        store.save(&thread, &conversation);

        let restored = store.load(&thread).unwrap();
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn test_threads_are_independent() {
        let store = MemorySaver::new();
        let mut conversation = Conversation::new();
        conversation.push(ModelMessage::User("hello".to_owned()));
        store.save(&ThreadId::from("a"), &conversation);

        assert!(store.load(&ThreadId::from("b")).is_none());
    }
}
