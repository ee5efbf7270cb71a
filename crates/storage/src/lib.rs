pub mod kv;
pub mod state;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use state::StateStore;
