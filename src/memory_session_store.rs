use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use anyhow::anyhow;
use tokio::sync::Mutex;
use uuid::Uuid;

type SessionState = HashMap<String, String>;

// In-memory session store. Clones share the same map, so one store can back
// every worker's SessionMiddleware.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, (SessionState, Instant)>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        MemorySessionStore::default()
    }

    /// Number of stored sessions. Expired ones count until the next write purges them.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn purge_expired(sessions: &mut HashMap<String, (SessionState, Instant)>, now: Instant) {
    sessions.retain(|_, (_, expiry)| now < *expiry);
}

impl SessionStore for MemorySessionStore {
    fn load(
        &self,
        session_key: &SessionKey,
    ) -> impl Future<Output = Result<Option<SessionState>, LoadError>> {
        let key_str = session_key.as_ref().to_owned();
        let sessions = self.sessions.clone();
        async move {
            let mut sessions = sessions.lock().await;
            match sessions.get(&key_str) {
                Some((state, expiry)) if Instant::now() < *expiry => Ok(Some(state.clone())),
                Some(_) => {
                    sessions.remove(&key_str);
                    Ok(None)
                }
                None => Ok(None),
            }
        }
    }

    fn save(
        &self,
        session_state: SessionState,
        ttl: &Duration,
    ) -> impl Future<Output = Result<SessionKey, SaveError>> {
        let ttl = *ttl;
        let sessions = self.sessions.clone();
        async move {
            let key = Uuid::new_v4().to_string();
            let session_key = SessionKey::try_from(key.clone())
                .map_err(|e| SaveError::Other(anyhow!("Invalid session key: {}", e)))?;
            let mut sessions = sessions.lock().await;
            let now = Instant::now();
            purge_expired(&mut sessions, now);
            sessions.insert(key, (session_state, now + ttl));
            Ok(session_key)
        }
    }

    fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> impl Future<Output = Result<SessionKey, UpdateError>> {
        let ttl = *ttl;
        let sessions = self.sessions.clone();
        async move {
            let mut sessions = sessions.lock().await;
            let now = Instant::now();
            purge_expired(&mut sessions, now);
            let key_str = session_key.as_ref().to_owned();
            sessions.insert(key_str, (session_state, now + ttl));
            Ok(session_key)
        }
    }

    fn update_ttl(
        &self,
        session_key: &SessionKey,
        ttl: &Duration,
    ) -> impl Future<Output = Result<(), anyhow::Error>> {
        let ttl = *ttl;
        let key_str = session_key.as_ref().to_owned();
        let sessions = self.sessions.clone();
        async move {
            let mut sessions = sessions.lock().await;
            match sessions.get_mut(&key_str) {
                Some((_, expiry)) => {
                    *expiry = Instant::now() + ttl;
                    Ok(())
                }
                None => Err(anyhow!("Session not found")),
            }
        }
    }

    fn delete(&self, session_key: &SessionKey) -> impl Future<Output = Result<(), anyhow::Error>> {
        let key_str = session_key.as_ref().to_owned();
        let sessions = self.sessions.clone();
        async move {
            sessions.lock().await.remove(&key_str);
            Ok(())
        }
    }
}
