pub mod client;

pub use client::HttpUsersClient;
