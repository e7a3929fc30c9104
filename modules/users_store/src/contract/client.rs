use async_trait::async_trait;

use crate::contract::{
    error::RemoteError,
    model::{ListParams, RawUser, UserId, UserList, UserPatch},
};

/// Port to the remote user collection consumed by the cache.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait RemoteUsersApi: Send + Sync {
    /// Paged listing; sort parameters are only sent when a sort field is set.
    async fn list(&self, params: ListParams) -> Result<UserList, RemoteError>;

    /// Fetch a single record. A missing record is an error.
    async fn get_by_id(&self, id: UserId) -> Result<RawUser, RemoteError>;

    /// Create a record; the response carries the server-assigned id.
    async fn create(&self, body: RawUser) -> Result<RawUser, RemoteError>;

    /// Apply a partial update. Servers may answer without a body.
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<RawUser>, RemoteError>;

    async fn delete(&self, id: UserId) -> Result<(), RemoteError>;
}
