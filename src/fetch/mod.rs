//! Fetch layer: the pooled HTTP transport and the user-agent table.

mod agents;
mod transport;

pub use agents::UserAgentPool;
pub use transport::{FetchedBody, Transport, MAX_BODY_SIZE};
