//! Filter → sort → paginate pipeline over the cached users.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::trace;

use crate::contract::model::{SortField, SortOrder, User};
use crate::domain::cache::UsersCache;
use crate::domain::query::UsersQuery;

/// One page of the derived view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsersView {
    /// Entities on the requested page.
    pub items: Vec<User>,
    /// Size of the filtered set, before pagination.
    pub total: usize,
}

impl UsersView {
    /// Number of pages for navigation controls; never less than one.
    pub fn page_count(&self, limit: u32) -> usize {
        let limit = limit.max(1) as usize;
        self.total.div_ceil(limit).max(1)
    }
}

fn matches(user: &User, needle: &str, role: &str) -> bool {
    let search_ok = needle.is_empty()
        || format!("{} {} {}", user.first_name, user.last_name, user.email)
            .to_lowercase()
            .contains(needle);
    let role_ok = role.is_empty() || user.role == role;
    search_ok && role_ok
}

fn compare(a: &User, b: &User, field: SortField) -> Ordering {
    match field {
        SortField::Name => format!("{} {}", a.first_name, a.last_name)
            .to_lowercase()
            .cmp(&format!("{} {}", b.first_name, b.last_name).to_lowercase()),
        SortField::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        SortField::Age => a.age.cmp(&b.age),
    }
}

/// Pure derivation of the current page and the filtered total.
pub fn derive_view(users: &[User], query: &UsersQuery) -> UsersView {
    let needle = query.search.to_lowercase();
    let mut filtered: Vec<&User> = users
        .iter()
        .filter(|u| matches(u, &needle, &query.role))
        .collect();
    let total = filtered.len();

    if let Some(field) = query.sort_by {
        filtered.sort_by(|a, b| {
            let ord = compare(a, b, field);
            match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    let items = filtered
        .into_iter()
        .skip(query.offset())
        .take(query.limit as usize)
        .cloned()
        .collect();

    UsersView { items, total }
}

/// Memoizes [`derive_view`] on the cache version and the query snapshot.
#[derive(Debug, Default)]
pub struct ViewDeriver {
    last: Option<(u64, UsersQuery, UsersView)>,
}

impl ViewDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view; recomputed only when the cache or the query changed.
    pub fn derive(&mut self, cache: &UsersCache, query: &UsersQuery) -> &UsersView {
        let version = cache.version();
        let fresh = matches!(&self.last, Some((v, q, _)) if *v == version && q == query);
        if !fresh {
            self.last = None;
        }
        let (_, _, view) = self.last.get_or_insert_with(|| {
            trace!(version, "Recomputing users view");
            (version, query.clone(), derive_view(&cache.users(), query))
        });
        view
    }
}
