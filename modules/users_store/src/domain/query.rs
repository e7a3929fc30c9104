use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::contract::model::{SortField, SortOrder};

/// Shareable key/value state (e.g. URL query parameters).
pub type QueryParams = BTreeMap<String, String>;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

pub const KEY_PAGE: &str = "page";
pub const KEY_LIMIT: &str = "limit";
pub const KEY_SEARCH: &str = "search";
pub const KEY_ROLE: &str = "role";
pub const KEY_SORT_BY: &str = "sortBy";
pub const KEY_ORDER: &str = "order";

/// External channel the query state is mirrored into.
///
/// Writes happen on every local mutation; reads happen at construction and
/// whenever the owner is told the channel changed underneath it.
pub trait QueryChannel: Send + Sync {
    fn read(&self) -> QueryParams;
    fn write(&self, params: QueryParams);
}

/// Snapshot of the filter/sort/pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsersQuery {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub search: String,
    /// Empty means no role filter.
    pub role: String,
    /// `None` means unsorted.
    pub sort_by: Option<SortField>,
    pub order: SortOrder,
}

impl Default for UsersQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            role: String::new(),
            sort_by: None,
            order: SortOrder::Asc,
        }
    }
}

fn parse_positive(params: &QueryParams, key: &str, default: u32) -> u32 {
    params
        .get(key)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

impl UsersQuery {
    /// Absent or unparsable entries fall back to their defaults; an unknown
    /// `sortBy` reads as unsorted.
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            page: parse_positive(params, KEY_PAGE, DEFAULT_PAGE),
            limit: parse_positive(params, KEY_LIMIT, DEFAULT_LIMIT),
            search: params.get(KEY_SEARCH).cloned().unwrap_or_default(),
            role: params.get(KEY_ROLE).cloned().unwrap_or_default(),
            sort_by: params.get(KEY_SORT_BY).and_then(|s| s.parse().ok()),
            order: params
                .get(KEY_ORDER)
                .map(|s| SortOrder::parse_lenient(s))
                .unwrap_or_default(),
        }
    }

    /// Minimal encoding: defaults are omitted, and `order` only appears
    /// alongside a sort field.
    pub fn to_params(&self) -> QueryParams {
        let mut out = QueryParams::new();
        if self.page != DEFAULT_PAGE {
            out.insert(KEY_PAGE.into(), self.page.to_string());
        }
        if self.limit != DEFAULT_LIMIT {
            out.insert(KEY_LIMIT.into(), self.limit.to_string());
        }
        if !self.search.is_empty() {
            out.insert(KEY_SEARCH.into(), self.search.clone());
        }
        if !self.role.is_empty() {
            out.insert(KEY_ROLE.into(), self.role.clone());
        }
        if let Some(field) = self.sort_by {
            out.insert(KEY_SORT_BY.into(), field.as_str().into());
            out.insert(KEY_ORDER.into(), self.order.as_str().into());
        }
        out
    }

    /// Index of the first entity on the current page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1).saturating_mul(self.limit as usize)
    }
}

/// Bulk update; only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub role: Option<String>,
    /// `Some(None)` clears the sort field.
    pub sort_by: Option<Option<SortField>>,
    pub order: Option<SortOrder>,
}

/// Query state mirrored into a [`QueryChannel`].
///
/// Local mutation writes the channel; [`QueryState::sync_from_channel`]
/// overwrites local state from it. The two directions never share a reference.
pub struct QueryState {
    query: UsersQuery,
    channel: Arc<dyn QueryChannel>,
}

impl fmt::Debug for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl QueryState {
    /// Initializes from the channel's current contents.
    pub fn new(channel: Arc<dyn QueryChannel>) -> Self {
        let query = UsersQuery::from_params(&channel.read());
        Self { query, channel }
    }

    pub fn query(&self) -> &UsersQuery {
        &self.query
    }

    /// Re-read the channel after an external change (e.g. back/forward navigation).
    pub fn sync_from_channel(&mut self) -> &UsersQuery {
        self.query = UsersQuery::from_params(&self.channel.read());
        debug!(query = ?self.query, "Query state re-read from channel");
        &self.query
    }

    pub fn update(&mut self, patch: QueryPatch) {
        let q = &mut self.query;
        if let Some(page) = patch.page {
            q.page = page.max(1);
        }
        if let Some(limit) = patch.limit {
            q.limit = limit.max(1);
        }
        if let Some(search) = patch.search {
            q.search = search;
        }
        if let Some(role) = patch.role {
            q.role = role;
        }
        if let Some(sort_by) = patch.sort_by {
            q.sort_by = sort_by;
        }
        if let Some(order) = patch.order {
            q.order = order;
        }
        self.sync_to_channel();
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
        self.sync_to_channel();
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.query.limit = limit.max(1);
        self.query.page = DEFAULT_PAGE;
        self.sync_to_channel();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.query.page = DEFAULT_PAGE;
        self.sync_to_channel();
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.query.role = role.into();
        self.query.page = DEFAULT_PAGE;
        self.sync_to_channel();
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        self.query.sort_by = Some(field);
        self.query.order = order;
        self.query.page = DEFAULT_PAGE;
        self.sync_to_channel();
    }

    pub fn reset_sort(&mut self) {
        self.query.sort_by = None;
        self.query.order = SortOrder::Asc;
        self.query.page = DEFAULT_PAGE;
        self.sync_to_channel();
    }

    fn sync_to_channel(&self) {
        self.channel.write(self.query.to_params());
    }
}
