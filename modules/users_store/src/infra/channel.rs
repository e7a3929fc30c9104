//! Shareable-state channels the query state mirrors itself into.

use parking_lot::{Mutex, RwLock};
use tracing::trace;
use url::Url;

use crate::domain::query::{QueryChannel, QueryParams};

/// Keeps the query in the query string of a URL, so it survives copy/paste.
///
/// Only the query component is touched; scheme, host, path and fragment are
/// left as they are.
#[derive(Debug)]
pub struct UrlQueryChannel {
    url: RwLock<Url>,
}

impl UrlQueryChannel {
    pub fn new(url: Url) -> Self {
        Self {
            url: RwLock::new(url),
        }
    }

    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self::new)
    }

    /// Snapshot of the current URL.
    pub fn url(&self) -> Url {
        self.url.read().clone()
    }

    /// External navigation, e.g. back/forward. Returns the parameters now in
    /// the channel; follow with `QueryState::sync_from_channel` to pick the
    /// change up.
    pub fn navigate(&self, url: Url) -> QueryParams {
        let params = url.query_pairs().into_owned().collect();
        *self.url.write() = url;
        params
    }
}

impl QueryChannel for UrlQueryChannel {
    fn read(&self) -> QueryParams {
        // repeated keys: the last one wins
        self.url.read().query_pairs().into_owned().collect()
    }

    fn write(&self, params: QueryParams) {
        let mut url = self.url.write();
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params.iter());
        }
        trace!(url = %url.as_str(), "Query written to URL");
    }
}

/// In-process channel, for embedding without a URL.
#[derive(Debug, Default)]
pub struct MemoryQueryChannel {
    params: Mutex<QueryParams>,
}

impl MemoryQueryChannel {
    pub fn new(params: QueryParams) -> Self {
        Self {
            params: Mutex::new(params),
        }
    }

    /// Replace the stored parameters from outside the query state.
    pub fn set(&self, params: QueryParams) {
        *self.params.lock() = params;
    }
}

impl QueryChannel for MemoryQueryChannel {
    fn read(&self) -> QueryParams {
        self.params.lock().clone()
    }

    fn write(&self, params: QueryParams) {
        *self.params.lock() = params;
    }
}
