pub mod api;

pub use api::{RecordedRequest, ResponseGate, TestApiService};
