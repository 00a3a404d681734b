#![forbid(unsafe_code)]

pub mod error;
pub mod http;
pub mod session_api;

pub use error::ApiError;
pub use http::{ApiConfig, HttpApi};
pub use session_api::{InMemoryApi, SessionApi};
