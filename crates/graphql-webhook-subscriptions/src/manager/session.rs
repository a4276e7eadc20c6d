use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use futures_util::future::AbortHandle;
use url::Url;

/// Identifies an active subscription session. Generated as a random UUID on start.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub(crate) fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        SessionId(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId(id.to_owned())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A snapshot of an active session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub field: String,
    pub url: Url,
}

pub(super) struct Session {
    pub field: String,
    pub url: Url,
    /// Cancels the session's pump, dropping its stream.
    pub abort: AbortHandle,
}

/// Active sessions by id. The lock is never held across an await point.
#[derive(Default)]
pub(super) struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl SessionStore {
    pub fn insert(&self, id: SessionId, session: Session) {
        self.lock().insert(id, session);
    }

    pub fn remove(&self, id: &SessionId) -> Option<Session> {
        self.lock().remove(id)
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionInfo> {
        self.lock().get(id).map(|session| SessionInfo {
            id: id.clone(),
            field: session.field.clone(),
            url: session.url.clone(),
        })
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn drain(&self) -> Vec<(SessionId, Session)> {
        self.lock().drain().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        // Critical sections never panic half-way, so a poisoned map is still consistent.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
