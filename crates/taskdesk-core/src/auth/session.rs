use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::User;
use crate::storage::{
    KeyValueStore, StorageResult, ACCESS_CREDENTIAL_KEY, IDENTITY_KEY, RENEWAL_CREDENTIAL_KEY,
};

/// The signed-in user as returned by the login endpoint.
pub type Identity = User;

/// Snapshot of the client session. An empty session is `Session::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_credential: Option<String>,
    pub renewal_credential: Option<String>,
    pub identity: Option<Identity>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.access_credential.is_none()
            && self.renewal_credential.is_none()
            && self.identity.is_none()
    }

    /// Authenticated means an access credential is present; identity alone is not enough.
    pub fn is_authenticated(&self) -> bool {
        self.access_credential.is_some()
    }

    /// Identity is only trusted while an access credential is present
    pub fn identity(&self) -> Option<&Identity> {
        if self.is_authenticated() {
            self.identity.as_ref()
        } else {
            None
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.identity().map(|i| i.id)
    }

    pub fn is_admin(&self) -> bool {
        self.identity().map(|i| i.is_admin()).unwrap_or(false)
    }
}

/// Process-wide session state, persisted through a [`KeyValueStore`].
///
/// Mutations are serialized by `mutation` and do their backend I/O before
/// publishing the result under a short write lock on `state`, so readers
/// never wait on storage and observe either the whole previous session or
/// the whole new one.
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    state: RwLock<Session>,
    mutation: Mutex<()>,
}

impl SessionStore {
    /// Restore the session persisted in `backend`. Unreadable values are
    /// logged and treated as absent.
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let access_credential = read_key(backend.as_ref(), ACCESS_CREDENTIAL_KEY);
        let renewal_credential = read_key(backend.as_ref(), RENEWAL_CREDENTIAL_KEY);
        let identity = read_key(backend.as_ref(), IDENTITY_KEY).and_then(|raw| {
            serde_json::from_str::<Identity>(&raw)
                .map_err(|e| warn!(error = %e, "Discarding unparsable stored identity"))
                .ok()
        });

        let session = Session {
            access_credential,
            renewal_credential,
            identity,
        };
        debug!(
            authenticated = session.is_authenticated(),
            has_renewal = session.renewal_credential.is_some(),
            "Session loaded"
        );

        Self {
            backend,
            state: RwLock::new(session),
            mutation: Mutex::new(()),
        }
    }

    pub fn read(&self) -> Session {
        self.read_state().clone()
    }

    pub fn access_credential(&self) -> Option<String> {
        self.read_state().access_credential.clone()
    }

    pub fn renewal_credential(&self) -> Option<String> {
        self.read_state().renewal_credential.clone()
    }

    /// Persist a freshly issued session. Nothing changes if the backend write fails.
    pub fn write(&self, access: &str, renewal: &str, identity: &Identity) -> StorageResult<()> {
        let identity_json = serde_json::to_string(identity)?;

        let _mutation = self.lock_mutation();
        self.backend.set_many(&[
            (ACCESS_CREDENTIAL_KEY, access),
            (RENEWAL_CREDENTIAL_KEY, renewal),
            (IDENTITY_KEY, identity_json.as_str()),
        ])?;
        *self.write_state() = Session {
            access_credential: Some(access.to_string()),
            renewal_credential: Some(renewal.to_string()),
            identity: Some(identity.clone()),
        };

        info!(user_id = identity.id, "Session stored");
        Ok(())
    }

    /// Replace only the access credential, provided the session still holds
    /// the renewal credential `renewed_with` that produced it.
    ///
    /// Returns `Ok(false)` and changes nothing when the session was cleared or
    /// replaced while the renewal was in flight.
    pub fn update_access_credential(&self, renewed_with: &str, access: &str) -> StorageResult<bool> {
        let _mutation = self.lock_mutation();
        if self.read_state().renewal_credential.as_deref() != Some(renewed_with) {
            debug!("Session changed during renewal, discarding renewed credential");
            return Ok(false);
        }

        self.backend.set(ACCESS_CREDENTIAL_KEY, access)?;
        self.write_state().access_credential = Some(access.to_string());
        debug!("Access credential replaced");
        Ok(true)
    }

    /// Drop every session field. The in-memory session is emptied even when
    /// the backend fails to remove its keys.
    pub fn clear(&self) -> StorageResult<()> {
        let _mutation = self.lock_mutation();
        *self.write_state() = Session::default();
        self.backend
            .remove_many(&[ACCESS_CREDENTIAL_KEY, RENEWAL_CREDENTIAL_KEY, IDENTITY_KEY])?;
        info!("Session cleared");
        Ok(())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_mutation(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn read_key(backend: &dyn KeyValueStore, key: &str) -> Option<String> {
    match backend.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Failed to read session key");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use crate::testing::{identity, FailingStore, FlakyStore};

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let backend = Arc::new(MemoryStore::new());
        let sessions = SessionStore::load(backend.clone());
        (backend, sessions)
    }

    #[test]
    fn test_empty_backend_loads_empty_session() {
        let (_, sessions) = store();
        let session = sessions.read();
        assert!(session.is_empty());
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_write_then_read() {
        let (backend, sessions) = store();
        sessions.write("A1", "R1", &identity(7, false)).unwrap();

        let session = sessions.read();
        assert_eq!(session.access_credential.as_deref(), Some("A1"));
        assert_eq!(session.renewal_credential.as_deref(), Some("R1"));
        assert_eq!(session.user_id(), Some(7));
        assert_eq!(backend.get(ACCESS_CREDENTIAL_KEY).unwrap().as_deref(), Some("A1"));
        assert!(backend.get(IDENTITY_KEY).unwrap().unwrap().contains("\"is_staff\":false"));
    }

    #[test]
    fn test_update_access_credential_keeps_other_fields() {
        let (_, sessions) = store();
        sessions.write("A1", "R1", &identity(7, true)).unwrap();
        assert!(sessions.update_access_credential("R1", "A2").unwrap());

        let session = sessions.read();
        assert_eq!(session.access_credential.as_deref(), Some("A2"));
        assert_eq!(session.renewal_credential.as_deref(), Some("R1"));
        assert_eq!(session.identity, Some(identity(7, true)));
    }

    #[test]
    fn test_update_access_credential_after_clear_is_discarded() {
        let (backend, sessions) = store();
        sessions.write("A1", "R1", &identity(7, false)).unwrap();
        sessions.clear().unwrap();

        assert!(!sessions.update_access_credential("R1", "A2").unwrap());
        assert!(sessions.read().is_empty());
        assert_eq!(backend.get(ACCESS_CREDENTIAL_KEY).unwrap(), None);
    }

    #[test]
    fn test_update_access_credential_for_replaced_session_is_discarded() {
        let (_, sessions) = store();
        sessions.write("A1", "R1", &identity(7, false)).unwrap();
        sessions.write("B1", "S1", &identity(8, false)).unwrap();

        assert!(!sessions.update_access_credential("R1", "A2").unwrap());
        assert_eq!(sessions.access_credential().as_deref(), Some("B1"));
    }

    #[test]
    fn test_partial_backend_failure_keeps_stored_session() {
        // The first write takes three sets; the second fails on its renewal key
        let backend = Arc::new(FlakyStore::failing_on_set(5));
        let sessions = SessionStore::load(backend.clone());
        sessions.write("A1", "R1", &identity(1, false)).unwrap();

        assert!(sessions.write("A9", "R9", &identity(9, false)).is_err());
        assert_eq!(sessions.access_credential().as_deref(), Some("A1"));

        let reloaded = SessionStore::load(backend).read();
        assert_eq!(reloaded.access_credential.as_deref(), Some("A1"));
        assert_eq!(reloaded.renewal_credential.as_deref(), Some("R1"));
        assert_eq!(reloaded.user_id(), Some(1));
    }

    #[test]
    fn test_clear_removes_everything() {
        let (backend, sessions) = store();
        backend.set("uiTheme", "dark").unwrap();
        sessions.write("A1", "R1", &identity(7, false)).unwrap();

        sessions.clear().unwrap();

        assert!(sessions.read().is_empty());
        assert_eq!(backend.get(ACCESS_CREDENTIAL_KEY).unwrap(), None);
        assert_eq!(backend.get(RENEWAL_CREDENTIAL_KEY).unwrap(), None);
        assert_eq!(backend.get(IDENTITY_KEY).unwrap(), None);
        // Unrelated keys share the backend and are left alone
        assert_eq!(backend.get("uiTheme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_session_survives_reload() {
        let (backend, sessions) = store();
        sessions.write("A1", "R1", &identity(3, true)).unwrap();
        drop(sessions);

        let reloaded = SessionStore::load(backend);
        let session = reloaded.read();
        assert_eq!(session.access_credential.as_deref(), Some("A1"));
        assert!(session.is_admin());
    }

    #[test]
    fn test_identity_without_access_is_not_trusted() {
        let json = serde_json::to_string(&identity(3, true)).unwrap();
        let backend = Arc::new(MemoryStore::with_entries([(IDENTITY_KEY, json.as_str())]));
        let session = SessionStore::load(backend).read();

        assert!(session.identity.is_some());
        assert!(session.identity().is_none());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_corrupt_identity_is_dropped() {
        let backend = Arc::new(MemoryStore::with_entries([
            (ACCESS_CREDENTIAL_KEY, "A1"),
            (IDENTITY_KEY, "{not json"),
        ]));
        let session = SessionStore::load(backend).read();
        assert!(session.is_authenticated());
        assert!(session.identity.is_none());
    }

    #[test]
    fn test_failed_write_leaves_previous_session() {
        let backend = Arc::new(FailingStore::default());
        let sessions = SessionStore::load(backend);
        let result = sessions.write("A1", "R1", &identity(1, false));

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(sessions.read().is_empty());
    }

    #[test]
    fn test_failed_clear_still_empties_memory() {
        let backend = Arc::new(FailingStore::default());
        let sessions = SessionStore::load(backend);
        sessions.write_state().access_credential = Some("A1".to_string());

        assert!(sessions.clear().is_err());
        assert!(sessions.read().is_empty());
    }

    /// Backend that reads the session from inside its own writes
    #[derive(Default)]
    struct ReadingStore {
        inner: MemoryStore,
        sessions: std::sync::OnceLock<std::sync::Weak<SessionStore>>,
        seen: Mutex<Vec<Session>>,
    }

    impl KeyValueStore for ReadingStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if let Some(sessions) = self.sessions.get().and_then(|w| w.upgrade()) {
                self.seen.lock().unwrap().push(sessions.read());
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_reads_do_not_wait_on_backend_io() {
        let backend = Arc::new(ReadingStore::default());
        let sessions = Arc::new(SessionStore::load(backend.clone()));
        let _ = backend.sessions.set(Arc::downgrade(&sessions));

        sessions.write("A1", "R1", &identity(1, false)).unwrap();

        // Reads during the backend write see the previous, empty session
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(Session::is_empty));
        assert_eq!(sessions.access_credential().as_deref(), Some("A1"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_never_see_mixed_sessions() {
        let (_, sessions) = store();
        let sessions = Arc::new(sessions);
        sessions.write("A0", "R0", &identity(0, false)).unwrap();

        let writer = {
            let sessions = sessions.clone();
            tokio::spawn(async move {
                for i in 1..200i64 {
                    let access = format!("A{}", i);
                    let renewal = format!("R{}", i);
                    sessions.write(&access, &renewal, &identity(i, false)).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let sessions = sessions.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    let session = sessions.read();
                    let access = session.access_credential.unwrap();
                    let renewal = session.renewal_credential.unwrap();
                    let id = session.identity.unwrap().id;
                    assert_eq!(&access[1..], &renewal[1..]);
                    assert_eq!(access[1..].parse::<i64>().unwrap(), id);
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
