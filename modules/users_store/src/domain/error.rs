use thiserror::Error;

use crate::contract::model::UserId;

/// Last-error values recorded by the cache when a remote call fails.
///
/// Remote faults are converted into one of these at the cache boundary and
/// never propagated to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Failed to fetch users")]
    FetchUsers,

    #[error("Failed to fetch user")]
    FetchUser { id: UserId },

    #[error("Failed to create user")]
    CreateUser,

    #[error("Failed to update user")]
    UpdateUser { id: UserId },

    #[error("Failed to delete user")]
    DeleteUser { id: UserId },
}

impl CacheError {
    pub fn fetch_users() -> Self {
        Self::FetchUsers
    }

    pub fn fetch_user(id: UserId) -> Self {
        Self::FetchUser { id }
    }

    pub fn create_user() -> Self {
        Self::CreateUser
    }

    pub fn update_user(id: UserId) -> Self {
        Self::UpdateUser { id }
    }

    pub fn delete_user(id: UserId) -> Self {
        Self::DeleteUser { id }
    }
}
