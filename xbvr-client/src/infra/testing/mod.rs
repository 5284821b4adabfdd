//! Testing infrastructure
//!
//! In-memory stand-ins for the media server so stores and the remote
//! session can be exercised without a network.

pub mod stubs;

pub use stubs::{RecordedRequest, ResponseGate, TestApiService};
