#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use users_store::client::RemoteUsersApi;
use users_store::error::RemoteError;
use users_store::model::{ListParams, RawUser, UserId, UserList, UserPatch};
use users_store::UsersCache;

/// Scriptable in-memory remote collection.
///
/// With `gated` set, every call signals `entered` and then parks until the
/// test calls `release.notify_one()`, so optimistic state can be inspected
/// while the request is in flight.
#[derive(Default)]
pub struct MockRemote {
    pub users: Mutex<Vec<RawUser>>,
    pub fail: AtomicBool,
    pub gated: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
    pub server_id: AtomicI64,

    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub created_bodies: Mutex<Vec<RawUser>>,
}

impl MockRemote {
    pub fn with_users(users: Vec<RawUser>) -> Self {
        Self {
            users: Mutex::new(users),
            server_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_gated(&self, gated: bool) {
        self.gated.store(gated, Ordering::SeqCst);
    }

    pub fn set_server_id(&self, id: UserId) {
        self.server_id.store(id, Ordering::SeqCst);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn pass_gate(&self) {
        if self.gated.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    fn outcome<T>(&self, ok: T) -> Result<T, RemoteError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(RemoteError::status(500))
        } else {
            Ok(ok)
        }
    }
}

#[async_trait]
impl RemoteUsersApi for MockRemote {
    async fn list(&self, params: ListParams) -> Result<UserList, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        let users: Vec<RawUser> = self
            .users
            .lock()
            .iter()
            .take(params.limit as usize)
            .cloned()
            .collect();
        let total = self.users.lock().len() as u64;
        self.outcome(UserList { users, total })
    }

    async fn get_by_id(&self, id: UserId) -> Result<RawUser, RemoteError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        let found = self.users.lock().iter().find(|u| u.id == Some(id)).cloned();
        match found {
            Some(user) => self.outcome(user),
            None => Err(RemoteError::status(404)),
        }
    }

    async fn create(&self, body: RawUser) -> Result<RawUser, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.created_bodies.lock().push(body.clone());
        self.pass_gate().await;
        let mut created = body;
        created.id = Some(self.server_id.load(Ordering::SeqCst));
        self.outcome(created)
    }

    async fn update(&self, _id: UserId, patch: UserPatch) -> Result<Option<RawUser>, RemoteError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.outcome(Some(patch))
    }

    async fn delete(&self, _id: UserId) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.outcome(())
    }
}

pub fn raw(id: UserId, first: &str, last: &str) -> RawUser {
    RawUser {
        id: Some(id),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        email: Some(format!("{}@example.com", first.to_lowercase())),
        role: Some("user".to_string()),
        ..Default::default()
    }
}

pub fn seeded(ids: &[UserId]) -> Arc<MockRemote> {
    Arc::new(MockRemote::with_users(
        ids.iter().map(|id| raw(*id, &format!("User{id}"), "Test")).collect(),
    ))
}

pub fn cache_over(remote: &Arc<MockRemote>) -> Arc<UsersCache> {
    Arc::new(UsersCache::new(remote.clone(), 100))
}
