//! Utilities shared by the client and the server.
//!
//! - [`HttpClient`]: reqwest connection pool configured from [`HttpConfig`](crate::config::HttpConfig)

mod http;

pub use http::{HttpClient, USER_AGENT};
