// Service abstractions consumed by the stores

pub mod api;

pub use api::{ApiService, HttpMethod, RequestOptions};
