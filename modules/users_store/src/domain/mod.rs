pub mod cache;
pub mod error;
pub mod normalize;
pub mod query;
pub mod view;
