//! Per-user session storage.
//!
//! Sessions live only in memory; losing them on restart is acceptable.
//! Each entry is owned exclusively by the one user it belongs to. The
//! per-user gate serializes that user's events (the session record is not
//! safe for concurrent mutation) while events for different users run
//! fully in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::UserId;

use super::state::SessionState;

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, SessionState>,
    gates: DashMap<UserId, Arc<Mutex<()>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: UserId) -> Option<SessionState> {
        self.sessions.get(&user).map(|entry| entry.clone())
    }

    pub fn set(&self, user: UserId, state: SessionState) {
        self.sessions.insert(user, state);
    }

    pub fn remove(&self, user: UserId) {
        self.sessions.remove(&user);
    }

    /// The lock serializing this user's event dispatch.
    pub fn user_gate(&self, user: UserId) -> Arc<Mutex<()>> {
        self.gates.entry(user).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn set_get_remove_roundtrip() {
        let store = SessionStore::new();

        assert!(store.get(7).is_none());

        store.set(7, SessionState::AwaitingBuyAmount { price: dec!(61500) });
        assert_eq!(
            store.get(7),
            Some(SessionState::AwaitingBuyAmount { price: dec!(61500) })
        );

        store.remove(7);
        assert!(store.get(7).is_none());
    }

    #[test]
    fn users_do_not_share_sessions() {
        let store = SessionStore::new();
        store.set(1, SessionState::AwaitingBuyAmount { price: dec!(61500) });

        assert!(store.get(2).is_none());
    }

    #[test]
    fn user_gate_is_stable_per_user() {
        let store = SessionStore::new();

        let first = store.user_gate(7);
        let second = store.user_gate(7);
        assert!(Arc::ptr_eq(&first, &second));

        let other = store.user_gate(8);
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
