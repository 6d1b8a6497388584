use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

use crate::llm::ChatMessage;

pub(crate) type SessionHandle = Arc<AsyncMutex<Conversation>>;

/// Ordered message log for one session, capped at `max_messages` entries.
#[derive(Debug)]
pub struct Conversation {
    messages: VecDeque<ChatMessage>,
    max_messages: usize,
}

impl Conversation {
    fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_messages,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Last `n` messages in their original order.
    pub fn window(&self, n: usize) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// In-memory conversation history keyed by session id.
///
/// Each session is guarded by its own async mutex so callers can hold one
/// session across an await point without blocking any other session. The
/// outer map lock is only held for lookup and insertion.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
    max_stored_messages: usize,
}

impl SessionStore {
    pub fn new(max_stored_messages: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            max_stored_messages: max_stored_messages.max(1),
        }
    }

    pub async fn append(&self, session_id: &str, message: ChatMessage) {
        let session = self.session(session_id);
        session.lock().await.push(message);
    }

    /// Clears an existing session. Unknown sessions are left untouched.
    pub async fn reset(&self, session_id: &str) {
        if let Some(session) = self.existing(session_id) {
            session.lock().await.clear();
        }
    }

    pub async fn window(&self, session_id: &str, n: usize) -> Vec<ChatMessage> {
        match self.existing(session_id) {
            Some(session) => session.lock().await.window(n),
            None => Vec::new(),
        }
    }

    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        match self.existing(session_id) {
            Some(session) => session.lock().await.messages(),
            None => Vec::new(),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn session(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let max_stored_messages = self.max_stored_messages;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(Conversation::new(max_stored_messages))));
        Arc::clone(session)
    }

    fn existing(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }
}
