pub mod channel;
pub mod http;

pub use channel::{MemoryQueryChannel, UrlQueryChannel};
pub use http::HttpUsersClient;
