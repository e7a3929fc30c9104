use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::UsersStoreConfig;
use crate::contract::client::RemoteUsersApi;
use crate::contract::model::{ListParams, RawUser, User, UserId, UserPatch};
use crate::domain::error::CacheError;
use crate::domain::normalize::{merge_patch, normalize_user, optimistic_user};

/// Authoritative in-memory collection plus the shared status surface.
///
/// `by_id` and `all_ids` always hold the same id set.
#[derive(Debug, Default)]
struct CacheState {
    by_id: HashMap<UserId, User>,
    all_ids: Vec<UserId>,
    is_fetching: bool,
    error: Option<CacheError>,
    version: u64,
}

impl CacheState {
    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Insert or replace; new ids go to the end of the order list.
    fn upsert_back(&mut self, user: User) {
        if self.by_id.insert(user.id, user.clone()).is_none() {
            self.all_ids.push(user.id);
        }
        self.bump();
    }

    fn remove(&mut self, id: UserId) -> Option<User> {
        let removed = self.by_id.remove(&id);
        self.all_ids.retain(|x| *x != id);
        if removed.is_some() {
            self.bump();
        }
        removed
    }
}

/// Normalized user cache with optimistic create/update/delete.
///
/// State lives behind a mutex that is only held for the synchronous part of
/// each operation, so readers observe optimistic changes while the remote call
/// is still pending. Concurrent operations share `is_fetching` and the last
/// error on a last-writer-wins basis.
pub struct UsersCache {
    remote: Arc<dyn RemoteUsersApi>,
    state: Mutex<CacheState>,
    // Temporary ids are negative so they never collide with server ids.
    next_temp_id: AtomicI64,
    fetch_limit: u32,
}

impl UsersCache {
    pub fn new(remote: Arc<dyn RemoteUsersApi>, fetch_limit: u32) -> Self {
        Self {
            remote,
            state: Mutex::new(CacheState::default()),
            next_temp_id: AtomicI64::new(-1),
            fetch_limit,
        }
    }

    pub fn from_config(remote: Arc<dyn RemoteUsersApi>, cfg: &UsersStoreConfig) -> Self {
        Self::new(remote, cfg.fetch_limit)
    }

    // --- read accessors ---

    /// Cached users in list order.
    pub fn users(&self) -> Vec<User> {
        let st = self.state.lock();
        st.all_ids
            .iter()
            .filter_map(|id| st.by_id.get(id).cloned())
            .collect()
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.state.lock().by_id.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<UserId> {
        self.state.lock().all_ids.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().all_ids.is_empty()
    }

    pub fn is_fetching(&self) -> bool {
        self.state.lock().is_fetching
    }

    pub fn last_error(&self) -> Option<CacheError> {
        self.state.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    /// Bumped on every entity change; used to memoize derived views.
    pub fn version(&self) -> u64 {
        self.state.lock().version
    }

    // --- operations ---

    /// Populate the cache from the first page of the remote collection.
    /// Does nothing once the cache holds any entity.
    #[instrument(name = "users_store.cache.fetch_all_once", skip(self))]
    pub async fn fetch_all_once(&self) {
        {
            let mut st = self.state.lock();
            if !st.all_ids.is_empty() {
                debug!("Cache already populated; skipping fetch");
                return;
            }
            st.is_fetching = true;
            st.error = None;
        }

        let res = self.remote.list(ListParams::first(self.fetch_limit)).await;

        let mut st = self.state.lock();
        match res {
            Ok(list) => {
                for raw in &list.users {
                    st.upsert_back(normalize_user(raw));
                }
                info!("Loaded {} users (remote total {})", list.users.len(), list.total);
            }
            Err(e) => {
                warn!(error = %e, "Fetching users failed");
                st.error = Some(CacheError::fetch_users());
            }
        }
        st.is_fetching = false;
    }

    /// Discard every cached entity and fetch the first page again.
    #[instrument(name = "users_store.cache.reload", skip(self))]
    pub async fn reload(&self) {
        {
            let mut st = self.state.lock();
            st.by_id.clear();
            st.all_ids.clear();
            st.bump();
        }
        self.fetch_all_once().await;
    }

    /// Cache-first lookup. Returns `None` when the remote call fails.
    #[instrument(name = "users_store.cache.fetch_by_id", skip(self), fields(user_id = id))]
    pub async fn fetch_by_id(&self, id: UserId) -> Option<User> {
        {
            let mut st = self.state.lock();
            if let Some(user) = st.by_id.get(&id) {
                return Some(user.clone());
            }
            st.is_fetching = true;
        }

        let res = self.remote.get_by_id(id).await;

        let mut st = self.state.lock();
        st.is_fetching = false;
        match res {
            Ok(raw) => {
                let user = normalize_user(&raw);
                st.upsert_back(user.clone());
                debug!("Fetched user");
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "Fetching user failed");
                st.error = Some(CacheError::fetch_user(id));
                None
            }
        }
    }

    /// Insert an optimistic placeholder at the front, then reconcile it with
    /// the server response. Returns the created user on success.
    #[instrument(name = "users_store.cache.create", skip_all)]
    pub async fn create(&self, payload: RawUser) -> Option<User> {
        let temp_id = self.next_temp_id.fetch_sub(1, Ordering::Relaxed);
        let optimistic = optimistic_user(&payload, temp_id);
        {
            let mut st = self.state.lock();
            st.by_id.insert(temp_id, optimistic.clone());
            st.all_ids.insert(0, temp_id);
            st.bump();
        }
        debug!(temp_id, "Inserted optimistic user");

        let mut body = RawUser::from(&optimistic);
        body.id = None;
        let res = self.remote.create(body).await;

        let mut st = self.state.lock();
        match res {
            Ok(raw) => {
                let created = normalize_user(&raw);
                st.by_id.remove(&temp_id);
                let slot = st.all_ids.iter().position(|x| *x == temp_id);
                let already_listed = st.by_id.contains_key(&created.id);
                match slot {
                    Some(pos) if !already_listed => st.all_ids[pos] = created.id,
                    Some(_) => {
                        // the server id is already cached; keep its existing slot
                        st.all_ids.retain(|x| *x != temp_id);
                    }
                    None => {
                        debug!(temp_id, "Placeholder removed while create was in flight");
                        return Some(created);
                    }
                }
                st.by_id.insert(created.id, created.clone());
                st.bump();
                info!(user_id = created.id, temp_id, "Created user");
                Some(created)
            }
            Err(e) => {
                warn!(error = %e, temp_id, "Creating user failed; rolling back");
                st.remove(temp_id);
                st.error = Some(CacheError::create_user());
                None
            }
        }
    }

    /// Apply `patch` locally, then send it. No-op for unknown ids.
    ///
    /// On failure the patch is merged again onto whatever the entity looks like
    /// at that moment; the pre-update value is not restored.
    #[instrument(name = "users_store.cache.update", skip(self, patch), fields(user_id = id))]
    pub async fn update(&self, id: UserId, patch: UserPatch) {
        {
            let mut st = self.state.lock();
            let Some(current) = st.by_id.get(&id) else {
                debug!("Update for unknown user ignored");
                return;
            };
            let mut next = merge_patch(current, &patch);
            next.id = id;
            st.by_id.insert(id, next);
            st.bump();
        }

        match self.remote.update(id, patch.clone()).await {
            Ok(_) => info!("Updated user"),
            Err(e) => {
                warn!(error = %e, "Updating user failed; re-applying patch");
                let mut st = self.state.lock();
                if let Some(current) = st.by_id.get(&id) {
                    let mut next = merge_patch(current, &patch);
                    next.id = id;
                    st.by_id.insert(id, next);
                    st.bump();
                }
                st.error = Some(CacheError::update_user(id));
            }
        }
    }

    /// Remove locally, then delete remotely. A failed delete restores the
    /// entity at the end of the list.
    #[instrument(name = "users_store.cache.delete", skip(self), fields(user_id = id))]
    pub async fn delete(&self, id: UserId) {
        let backup = self.state.lock().remove(id);

        match self.remote.delete(id).await {
            Ok(()) => info!("Deleted user"),
            Err(e) => {
                warn!(error = %e, "Deleting user failed; restoring");
                let mut st = self.state.lock();
                if let Some(user) = backup {
                    st.upsert_back(user);
                }
                st.error = Some(CacheError::delete_user(id));
            }
        }
    }
}
