pub mod in_memory;
pub mod sqlite_store;

pub use in_memory::InMemoryModerationStore;
pub use sqlite_store::SqliteModerationStore;
