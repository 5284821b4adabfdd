//! Remote player session mirroring.

pub mod session;

pub use session::{REMOTE_STATE_TOPIC, RemoteSession, SyncOutcome};
