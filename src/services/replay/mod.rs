pub mod memory;
pub mod store;
pub mod valkey;

pub use memory::InMemoryReplayStore;
pub use store::{ReplayError, ReplayStore};
pub use valkey::ValkeyReplayStore;
