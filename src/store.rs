//! Conversation state: the ordered message log and the pending flag.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::events::Message;

/// Store handle shared by the controller, its in-flight task and the UI
pub type SharedStore = Arc<Mutex<ConversationStore>>;

/// Owns the conversation log and the pending flag.
///
/// Every mutation bumps a revision published on a watch channel so a
/// presentation layer can redraw and scroll to the bottom.
pub struct ConversationStore {
    messages: Vec<Message>,
    pending: bool,
    revision: watch::Sender<u64>,
}

impl ConversationStore {
    /// A store seeded with the greeting message
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            messages: vec![Message::greeting()],
            pending: false,
            revision,
        }
    }

    /// Wrap a fresh store for sharing
    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Add a message to the end of the log
    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
        self.bump();
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
        self.bump();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that wakes whenever the store changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock the store, recovering the state if a previous holder panicked
pub fn lock(store: &SharedStore) -> MutexGuard<'_, ConversationStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
